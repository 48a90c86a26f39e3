use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry in a conversation's append-only log. A message's position in
/// the conversation is its index in the ordered list returned by
/// `AssistantService::list_messages`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: i64,
}

/// Handle to a remote append-only message log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub created_at: i64,
}

/// Handle to a remote assistant persona (model, instructions, tools).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub model: String,
    pub name: Option<String>,
}

/// Handle to a file uploaded for assistant document retrieval.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileHandle {
    pub id: String,
    pub filename: String,
}
