use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::path::Path;

use super::{ AssistantService, ServiceConfig, ServiceError };
use crate::config::assistant::AssistantSpec;
use crate::models::chat::{ Assistant, Conversation, FileHandle, Message, MessageRole };
use crate::models::run::{ Run, RunStatus };

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const LIST_PAGE_SIZE: &str = "100";

pub struct OpenAIAssistantService {
    http: HttpClient,
    base_url: String,
}

#[derive(Serialize)]
struct CreateAssistantRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    file_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    tool_type: String,
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    instructions: &'a str,
}

#[derive(Deserialize)]
struct AssistantObject {
    id: String,
    model: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ThreadObject {
    id: String,
    created_at: i64,
}

#[derive(Deserialize)]
struct FileObject {
    id: String,
    filename: String,
}

#[derive(Deserialize)]
struct MessageObject {
    id: String,
    role: MessageRole,
    content: Vec<ContentPart>,
    created_at: i64,
}

// Message bodies arrive as typed content parts; only the text parts carry
// the transcript we expose.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: TextValue },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    thread_id: String,
    assistant_id: String,
    status: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
    #[serde(default)]
    has_more: bool,
}

impl From<MessageObject> for Message {
    fn from(object: MessageObject) -> Self {
        let content = object.content
            .into_iter()
            .filter_map(|part| {
                match part {
                    ContentPart::Text { text } => Some(text.value),
                    ContentPart::Unsupported => None,
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Message {
            id: object.id,
            role: object.role,
            content,
            created_at: object.created_at,
        }
    }
}

impl From<RunObject> for Run {
    fn from(object: RunObject) -> Self {
        Run {
            id: object.id,
            conversation_id: object.thread_id,
            assistant_id: object.assistant_id,
            status: RunStatus::parse(&object.status),
        }
    }
}

impl OpenAIAssistantService {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, ServiceError> {
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?
        );
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v1"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        if config.api_key.is_empty() {
            return Err("Assistant service API key is required".to_string().into());
        }
        Self::new(config.api_key.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl AssistantService for OpenAIAssistantService {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant, ServiceError> {
        let req = CreateAssistantRequest {
            model: &spec.model,
            name: spec.name.as_deref(),
            instructions: spec.instructions.as_deref(),
            tools: spec.tools
                .iter()
                .map(|tool| ToolSpec { tool_type: tool.as_str().to_string() })
                .collect(),
            file_ids: spec.file_ids.iter().map(String::as_str).collect(),
        };

        let resp = self.http
            .post(format!("{}/assistants", self.base_url))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<AssistantObject>()
            .await?;

        Ok(Assistant {
            id: resp.id,
            model: resp.model,
            name: resp.name,
        })
    }

    async fn create_conversation(&self) -> Result<Conversation, ServiceError> {
        let resp = self.http
            .post(format!("{}/threads", self.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await?
            .error_for_status()?
            .json::<ThreadObject>()
            .await?;

        Ok(Conversation {
            id: resp.id,
            created_at: resp.created_at,
        })
    }

    async fn upload_file(&self, path: &Path) -> Result<FileHandle, ServiceError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(filename));

        let resp = self.http
            .post(format!("{}/files", self.base_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<FileObject>()
            .await?;

        Ok(FileHandle {
            id: resp.id,
            filename: resp.filename,
        })
    }

    async fn create_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str
    ) -> Result<Message, ServiceError> {
        let req = CreateMessageRequest { role, content };

        let resp = self.http
            .post(format!("{}/threads/{}/messages", self.base_url, conversation_id))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<MessageObject>()
            .await?;

        Ok(resp.into())
    }

    async fn create_run(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        instruction: &str
    ) -> Result<Run, ServiceError> {
        let req = CreateRunRequest {
            assistant_id,
            instructions: instruction,
        };

        let resp = self.http
            .post(format!("{}/threads/{}/runs", self.base_url, conversation_id))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<RunObject>()
            .await?;

        debug!("Created run {} on conversation {}", resp.id, conversation_id);
        Ok(resp.into())
    }

    async fn get_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ServiceError> {
        let resp = self.http
            .get(format!("{}/threads/{}/runs/{}", self.base_url, conversation_id, run_id))
            .send()
            .await?
            .error_for_status()?
            .json::<RunObject>()
            .await?;

        Ok(resp.into())
    }

    async fn cancel_run(&self, conversation_id: &str, run_id: &str) -> Result<Run, ServiceError> {
        let resp = self.http
            .post(format!("{}/threads/{}/runs/{}/cancel", self.base_url, conversation_id, run_id))
            .send()
            .await?
            .error_for_status()?
            .json::<RunObject>()
            .await?;

        Ok(resp.into())
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ServiceError> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut req = self.http
                .get(format!("{}/threads/{}/messages", self.base_url, conversation_id))
                .query(&[("order", "asc"), ("limit", LIST_PAGE_SIZE)]);
            if let Some(cursor) = &after {
                req = req.query(&[("after", cursor.as_str())]);
            }

            let page = req
                .send()
                .await?
                .error_for_status()?
                .json::<MessageList>()
                .await?;

            let has_more = page.has_more;
            after = page.data.last().map(|m| m.id.clone());
            messages.extend(page.data.into_iter().map(Message::from));

            if !has_more || after.is_none() {
                break;
            }
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_content_parts_flatten_to_text() {
        let object: MessageObject = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "role": "assistant",
                "created_at": 1729400000,
                "content": [
                    {"type": "image_file", "image_file": {"file_id": "file-1"}},
                    {"type": "text", "text": {"value": "x = 120", "annotations": []}},
                    {"type": "text", "text": {"value": "(two real roots)", "annotations": []}}
                ]
            }"#,
        )
        .unwrap();

        let message = Message::from(object);
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.content, "x = 120\n(two real roots)");
        assert_eq!(message.created_at, 1729400000);
    }

    #[test]
    fn run_object_maps_unknown_status_to_other() {
        let object: RunObject = serde_json::from_str(
            r#"{
                "id": "run_1",
                "thread_id": "thread_1",
                "assistant_id": "asst_1",
                "status": "deferred"
            }"#,
        )
        .unwrap();

        let run = Run::from(object);
        assert_eq!(run.conversation_id, "thread_1");
        assert_eq!(run.status, RunStatus::Other("deferred".to_string()));
    }

    #[test]
    fn run_request_omits_blank_instruction() {
        let blank = serde_json::to_value(CreateRunRequest {
            assistant_id: "asst_1",
            instructions: "",
        })
        .unwrap();
        assert!(blank.get("instructions").is_none());

        let with_override = serde_json::to_value(CreateRunRequest {
            assistant_id: "asst_1",
            instructions: "Address the user as Uncle Crow",
        })
        .unwrap();
        assert_eq!(
            with_override.get("instructions").and_then(|v| v.as_str()),
            Some("Address the user as Uncle Crow")
        );
    }

    #[test]
    fn assistant_request_omits_empty_collections() {
        let req = serde_json::to_value(CreateAssistantRequest {
            model: "gpt-4o",
            name: None,
            instructions: None,
            tools: Vec::new(),
            file_ids: Vec::new(),
        })
        .unwrap();
        assert_eq!(req.as_object().unwrap().len(), 1);
        assert_eq!(req.get("model").and_then(|v| v.as_str()), Some("gpt-4o"));
    }

    #[test]
    fn message_list_defaults_has_more_to_false() {
        let page: MessageList = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(!page.has_more);
        assert!(page.data.is_empty());
    }
}
