//! The single-shot prompt endpoints: `/stress_chat` and `/task_breakdown`.
//!
//! Both are stateless: the caller owns whatever history exists, the server
//! wraps it in a persona template and makes one generation call. Provider
//! failure here is reported structurally, never papered over with fallback
//! text.

use crate::{error::ApiError, AppState};
use axum::{extract::Extension, Json};
use cadence_chat::{prompts, ChatTurn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StressChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct StressChatResponse {
    pub success: bool,
    pub reply: String,
}

/// Handler for `POST /stress_chat`.
pub async fn stress_chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<StressChatRequest>,
) -> Result<Json<StressChatResponse>, ApiError> {
    if payload.messages.is_empty() {
        return Err(ApiError::BadRequest(
            "'messages' must not be empty".to_string(),
        ));
    }

    let prompt = prompts::stress_chat_prompt(&payload.messages);
    let reply = state.gemini.reply_once(&prompt).await.map_err(|e| {
        tracing::error!("stress chat generation failed: {}", e);
        ApiError::Upstream(format!("reply generation failed: {}", e))
    })?;

    Ok(Json(StressChatResponse {
        success: true,
        reply,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TaskBreakdownRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TaskBreakdownResponse {
    pub success: bool,
    pub task_breakdown: String,
}

/// Handler for `POST /task_breakdown`.
///
/// The five-bullet output shape lives in the prompt text only; the raw
/// generated text is returned without validation.
pub async fn task_breakdown_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TaskBreakdownRequest>,
) -> Result<Json<TaskBreakdownResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("'text' must not be empty".to_string()));
    }

    let prompt = prompts::task_breakdown_prompt(&payload.text);
    let task_breakdown = state.gemini.reply_once(&prompt).await.map_err(|e| {
        tracing::error!("task breakdown generation failed: {}", e);
        ApiError::Upstream(format!("reply generation failed: {}", e))
    })?;

    Ok(Json(TaskBreakdownResponse {
        success: true,
        task_breakdown,
    }))
}
