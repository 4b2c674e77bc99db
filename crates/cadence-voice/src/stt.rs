use crate::error::VoiceError;
use serde::Deserialize;

/// Maximum audio input size for STT (10 MiB). Prevents OOM from oversized payloads.
pub const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_MODEL: &str = "scribe_v1";

/// Response body of the speech-to-text endpoint. Only the transcript text
/// is consumed; word timings and language metadata are ignored.
#[derive(Debug, Deserialize)]
struct SttResponse {
    text: String,
}

/// Client for the ElevenLabs speech-to-text API.
#[derive(Debug, Clone)]
pub struct SttClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl SttClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Builder method: set a custom API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder method: set the transcription model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn api_url(&self) -> String {
        format!("{}/v1/speech-to-text", self.base_url.trim_end_matches('/'))
    }

    /// Transcribes the given audio bytes to text.
    ///
    /// One attempt, no retry. Any transport or API failure is returned as
    /// `VoiceError::Stt` and is not recovered here; the caller decides
    /// whether the request dies with it.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        content_type: &str,
    ) -> Result<String, VoiceError> {
        if audio.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        let file_part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("voice_note.webm")
            .mime_str(content_type)
            .map_err(|e| VoiceError::Stt(format!("invalid audio content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model_id", self.model.clone());

        tracing::debug!(model = %self.model, bytes = audio.len(), "sending STT request");

        let response = self
            .client
            .post(self.api_url())
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(format!("STT request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!(
                "STT API error ({}): {}",
                status, body
            )));
        }

        let parsed: SttResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("failed to parse STT response: {}", e)))?;

        Ok(parsed.text.trim().to_string())
    }
}
