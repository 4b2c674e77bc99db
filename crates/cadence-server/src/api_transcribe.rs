//! The `/transcribe` endpoint and its turn pipeline.
//!
//! One request is one turn: ingest the upload, transcribe it, generate
//! tutoring feedback against the shared conversation, kick off best-effort
//! speech playback, and answer with the transcript and feedback. Each
//! provider is called exactly once; only transcription failure kills the
//! request.

use crate::{error::ApiError, AppState};
use axum::{
    body::Bytes,
    extract::{Extension, Multipart},
    Json,
};
use cadence_chat::prompts;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub transcription: String,
    pub feedback: String,
    pub message: String,
}

/// Outcome of one fully processed turn.
pub struct TurnOutcome {
    pub transcription: String,
    pub feedback: String,
}

/// Handler for `POST /transcribe`.
pub async fn transcribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut audio: Option<(Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
    {
        if field.name() == Some("audio") {
            let content_type = field
                .content_type()
                .unwrap_or("audio/webm")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
            audio = Some((data, content_type));
            break;
        }
    }

    let (data, content_type) =
        audio.ok_or_else(|| ApiError::BadRequest("missing 'audio' field".to_string()))?;

    if data.is_empty() {
        return Err(ApiError::BadRequest("empty audio upload".to_string()));
    }

    // Oversize is the caller's problem, not an upstream failure; reject it
    // here so it never reaches the STT client.
    if data.len() > cadence_voice::stt::MAX_STT_INPUT_BYTES {
        return Err(ApiError::BadRequest(format!(
            "audio upload exceeds {} bytes",
            cadence_voice::stt::MAX_STT_INPUT_BYTES
        )));
    }

    let outcome = run_turn(&state, data, &content_type).await?;

    Ok(Json(TranscribeResponse {
        success: true,
        transcription: outcome.transcription,
        feedback: outcome.feedback,
        message: "Transcription successful!".to_string(),
    }))
}

/// Runs the turn pipeline for one uploaded recording.
pub(crate) async fn run_turn(
    state: &AppState,
    data: Bytes,
    content_type: &str,
) -> Result<TurnOutcome, ApiError> {
    // Ingest: per-request scratch file, unique name, removed on drop
    // whichever way this function exits.
    let scratch = {
        let dir = state.scratch_dir.clone();
        let data = data.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<tempfile::NamedTempFile> {
            std::fs::create_dir_all(&dir)?;
            let mut file = tempfile::Builder::new()
                .prefix("voice_note_")
                .suffix(".webm")
                .tempfile_in(&dir)?;
            file.write_all(&data)?;
            Ok(file)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("failed to save upload: {}", e)))?
    };

    // Transcribe: critical. No fallback transcript, no retry.
    let transcription = state
        .stt
        .transcribe(&data, content_type)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    drop(scratch);

    tracing::info!(chars = transcription.len(), "transcription complete");

    // Generate feedback: stateful turn against the shared session. The
    // session lock is held across the provider call so concurrent turns
    // append in a consistent order. Provider failure falls back to the
    // deterministic template; the fallback is local output, so it is not
    // recorded as an assistant turn.
    let feedback = {
        let mut session = state.session.lock().await;
        match state
            .gemini
            .reply_in_session(&mut session, prompts::FEEDBACK_PERSONA, &transcription)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("feedback generation failed, using fallback: {}", e);
                prompts::fallback_feedback(&transcription)
            }
        }
    };

    // Synthesize: best-effort, fire-and-forget. The response never waits
    // on playback and never learns whether it worked.
    if state.playback_enabled {
        let tts = state.tts.clone();
        let player = state.player.clone();
        let text = feedback.clone();
        tokio::spawn(async move {
            match tts.synthesize(&text).await {
                Ok(audio) => {
                    if let Err(e) = player.play(&audio).await {
                        tracing::warn!("feedback playback failed: {}", e);
                    }
                }
                Err(e) => tracing::warn!("feedback synthesis failed: {}", e),
            }
        });
    }

    Ok(TurnOutcome {
        transcription,
        feedback,
    })
}
