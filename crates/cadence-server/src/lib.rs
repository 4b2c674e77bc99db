//! Cadence server library logic.
//!
//! HTTP surface for the voice-practice backend: audio uploads go through
//! the turn pipeline in [`api_transcribe`], the two single-shot prompt
//! endpoints live in [`api_chat`], and unmatched paths fall back to the
//! bundled frontend when one is present.

pub mod api_chat;
pub mod api_transcribe;
pub mod config;
pub mod error;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use cadence_chat::{ChatSession, GeminiClient};
use cadence_voice::{Player, SttClient, TtsClient};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Maximum request body size (12 MiB): the 10 MiB audio cap plus multipart
/// overhead.
const MAX_REQUEST_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Speech-to-text client.
    pub stt: Arc<SttClient>,
    /// Text-to-speech client.
    pub tts: Arc<TtsClient>,
    /// Local audio player for synthesized feedback.
    pub player: Arc<Player>,
    /// Reply generation client.
    pub gemini: Arc<GeminiClient>,
    /// The one process-wide tutoring conversation. Single writer at a
    /// time; turns survive until the process exits.
    pub session: Arc<Mutex<ChatSession>>,
    /// Directory for per-request scratch copies of uploaded audio.
    pub scratch_dir: String,
    /// Whether to synthesize and play feedback after each turn.
    pub playback_enabled: bool,
    /// Directory holding the bundled frontend, if any.
    pub client_dir: String,
}

/// Builds application state from loaded configuration.
pub fn build_state(config: &config::Config) -> AppState {
    let mut stt = SttClient::new(&config.providers.elevenlabs_api_key);
    if let Some(url) = &config.providers.elevenlabs_base_url {
        stt = stt.with_base_url(url);
    }
    if let Some(model) = &config.providers.stt_model {
        stt = stt.with_model(model);
    }

    let mut tts = TtsClient::new(&config.providers.elevenlabs_api_key);
    if let Some(url) = &config.providers.elevenlabs_base_url {
        tts = tts.with_base_url(url);
    }
    if let Some(voice) = &config.providers.tts_voice_id {
        tts = tts.with_voice(voice);
    }
    if let Some(model) = &config.providers.tts_model {
        tts = tts.with_model(model);
    }

    let mut gemini = GeminiClient::new(&config.providers.gemini_api_key);
    if let Some(url) = &config.providers.gemini_base_url {
        gemini = gemini.with_base_url(url);
    }
    if let Some(model) = &config.providers.chat_model {
        gemini = gemini.with_model(model);
    }

    AppState {
        stt: Arc::new(stt),
        tts: Arc::new(tts),
        player: Arc::new(Player::new(&config.audio.player_bin)),
        gemini: Arc::new(gemini),
        session: Arc::new(Mutex::new(ChatSession::new())),
        scratch_dir: config.audio.scratch_dir.clone(),
        playback_enabled: config.audio.playback_enabled,
        client_dir: config.server.client_dir.clone(),
    }
}

/// Liveness/info handler for `GET /`. The frontend's health probe hits
/// this and checks only for a 200.
async fn home() -> Json<Value> {
    Json(json!({
        "message": "Cadence backend is running!",
        "status": "success"
    }))
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/transcribe", post(api_transcribe::transcribe_handler))
        .route("/stress_chat", post(api_chat::stress_chat_handler))
        .route("/task_breakdown", post(api_chat::task_breakdown_handler));

    // Serve the bundled frontend for any unmatched path, when it exists.
    let client_dir = state.client_dir.clone();
    let router = if std::path::Path::new(&client_dir).join("index.html").exists() {
        tracing::info!(path = %client_dir, "serving client static files");
        let index = format!("{}/index.html", client_dir);
        router.fallback_service(ServeDir::new(&client_dir).fallback(ServeFile::new(index)))
    } else {
        tracing::info!(path = %client_dir, "client directory not found, skipping static file serving");
        router
    };

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
