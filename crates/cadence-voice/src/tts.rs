use crate::error::VoiceError;
use serde::Serialize;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_VOICE_ID: &str = "cgSgspJ2msm6clMCkdW9";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Client for the ElevenLabs text-to-speech API.
///
/// Synthesized audio is returned as encoded bytes (MP3 by default) for the
/// caller to play or discard. This client never touches the audio device
/// itself; see [`crate::playback::Player`].
#[derive(Debug, Clone)]
pub struct TtsClient {
    api_key: String,
    base_url: String,
    voice_id: String,
    model: String,
    output_format: String,
    client: reqwest::Client,
}

impl TtsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model: DEFAULT_MODEL.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Builder method: set a custom API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder method: set the voice identifier.
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Builder method: set the synthesis model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url.trim_end_matches('/'),
            self.voice_id,
            self.output_format
        )
    }

    /// Synthesizes speech from the given text, returning encoded audio bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let body = TtsRequest {
            text,
            model_id: &self.model,
        };

        tracing::debug!(voice = %self.voice_id, model = %self.model, "sending TTS request");

        let response = self
            .client
            .post(self.api_url())
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("TTS request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "TTS API error ({}): {}",
                status, body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Tts(format!("failed to read TTS response: {}", e)))?;

        Ok(audio.to_vec())
    }
}
