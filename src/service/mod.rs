pub mod openai;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;

use self::openai::OpenAIAssistantService;
use crate::config::assistant::AssistantSpec;
use crate::models::chat::{ Assistant, Conversation, FileHandle, Message, MessageRole };
use crate::models::run::Run;

pub type ServiceError = Box<dyn StdError + Send + Sync>;

/// The remote conversational-assistant service, reduced to the logical
/// operations this crate drives. Conversations are append-only message
/// logs; runs are created against them and advance status on the remote
/// side only.
#[async_trait]
pub trait AssistantService: Send + Sync {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant, ServiceError>;

    async fn create_conversation(&self) -> Result<Conversation, ServiceError>;

    async fn upload_file(&self, path: &Path) -> Result<FileHandle, ServiceError>;

    async fn create_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str
    ) -> Result<Message, ServiceError>;

    async fn create_run(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        instruction: &str
    ) -> Result<Run, ServiceError>;

    async fn get_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ServiceError>;

    async fn cancel_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ServiceError>;

    /// Full message log for the conversation, oldest first.
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub base_url: Option<String>,
}

pub fn new_service(config: &ServiceConfig) -> Result<Arc<dyn AssistantService>, ServiceError> {
    let client = OpenAIAssistantService::from_config(config)?;
    Ok(Arc::new(client))
}
