use axum::{Json, extract::State};

use crate::{
    message::{ChatRequest, ChatResponse},
    services::relay::relay_chat,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    Json(relay_chat(&state, &payload).await)
}
