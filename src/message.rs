// src/message.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// System-role instruction placed before the user message.
    #[serde(default)]
    pub personality: Option<String>,
    /// Overrides the configured mode for this request.
    #[serde(default)]
    pub stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendMessage {
    pub role: Role,
    pub content: String,
}

/// Body posted to the backend's `/api/chat`.
#[derive(Debug, Serialize)]
pub struct BackendRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [BackendMessage],
    pub stream: bool,
}

/// One backend reply, or one NDJSON line of a streamed reply. Extra fields
/// such as `done` or eval counters are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub message: Option<BackendReplyMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl BackendReply {
    pub fn into_content(self) -> Option<String> {
        self.message.and_then(|m| m.content)
    }
}
