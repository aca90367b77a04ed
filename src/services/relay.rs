use tracing::{info, warn};

use crate::message::{BackendMessage, ChatRequest, ChatResponse, Role};
use crate::state::AppState;

pub const ERROR_PREFIX: &str = "Error communicating with AI model:";
pub const NO_RESPONSE: &str = "Sorry, no response.";
pub const NO_REPLY: &str = "No reply from model.";

/// Optional system message first, then the user message.
pub fn build_messages(request: &ChatRequest) -> Vec<BackendMessage> {
    let mut messages = Vec::with_capacity(2);

    if let Some(personality) = request.personality.as_deref().filter(|p| !p.is_empty()) {
        messages.push(BackendMessage {
            role: Role::System,
            content: personality.to_string(),
        });
    }

    messages.push(BackendMessage {
        role: Role::User,
        content: request.message.clone(),
    });

    messages
}

/// Forwards one chat turn to the backend. Never fails: backend errors come
/// back as reply text.
pub async fn relay_chat(state: &AppState, request: &ChatRequest) -> ChatResponse {
    let stream = request.stream.unwrap_or(state.config.stream);
    let messages = build_messages(request);

    let result = if stream {
        state.backend.chat_stream(&messages).await.map(|text| {
            if text.is_empty() { NO_REPLY.to_string() } else { text }
        })
    } else {
        state
            .backend
            .chat(&messages)
            .await
            .map(|content| content.unwrap_or_else(|| NO_RESPONSE.to_string()))
    };

    match result {
        Ok(reply) => {
            info!(stream, chars = reply.len(), "relayed reply");
            ChatResponse::new(reply)
        }
        Err(e) => {
            warn!(stream, error = %e, "backend call failed");
            ChatResponse::new(format!("{ERROR_PREFIX} {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str, personality: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            personality: personality.map(str::to_string),
            stream: None,
        }
    }

    #[test]
    fn user_message_only() {
        let messages = build_messages(&request("hello", None));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
    }

    #[test]
    fn personality_goes_first_as_system() {
        let messages = build_messages(&request("hello", Some("You are a pirate.")));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "You are a pirate.");
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn empty_personality_is_ignored() {
        let messages = build_messages(&request("hello", Some("")));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(build_messages(&request("hi", Some("be nice")))).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"], "hi");
    }
}
