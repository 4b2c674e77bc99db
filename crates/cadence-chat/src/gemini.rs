//! Gemini `generateContent` client.
//!
//! Non-streaming: one POST per reply, auth via the `x-goog-api-key`
//! header. The request/response shapes follow the `v1beta` generative
//! language API.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::session::{ChatSession, ChatTurn, Role};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// --- Gemini request/response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Maps conversation turns onto Gemini `contents`. Gemini names the
/// assistant role "model".
fn format_contents(turns: &[ChatTurn]) -> Vec<Content> {
    turns
        .iter()
        .map(|turn| Content {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "model",
            },
            parts: vec![Part {
                text: turn.content.clone(),
            }],
        })
        .collect()
}

/// Client for the Gemini chat API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
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

    /// Builder method: set the generation model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    // The key goes in the `x-goog-api-key` header, never the URL:
    // transport errors carry the request URL verbatim, and those strings
    // reach callers and logs.
    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Generates a reply for the given turns, with an optional system
    /// instruction steering the persona. Returns the trimmed text of the
    /// first candidate.
    pub async fn generate(
        &self,
        system: Option<&str>,
        turns: &[ChatTurn],
    ) -> Result<String, ChatError> {
        let body = GenerateRequest {
            contents: format_contents(turns),
            system_instruction: system.map(|s| SystemInstruction {
                parts: vec![Part {
                    text: s.to_string(),
                }],
            }),
        };

        tracing::debug!(model = %self.model, turns = turns.len(), "sending chat request");

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        Ok(text.trim().to_string())
    }

    /// Stateless mode: a single prompt with no history.
    pub async fn reply_once(&self, prompt: &str) -> Result<String, ChatError> {
        self.generate(None, &[ChatTurn::user(prompt)]).await
    }

    /// Stateful mode: appends the transcript as a user turn, generates
    /// against the full accumulated history with the persona as system
    /// instruction, and records the reply as an assistant turn.
    ///
    /// The user turn stays in the session even when generation fails, so a
    /// later turn still carries what the user said.
    pub async fn reply_in_session(
        &self,
        session: &mut ChatSession,
        persona: &str,
        transcript: &str,
    ) -> Result<String, ChatError> {
        session.push_user(transcript);
        let reply = self.generate(Some(persona), session.turns()).await?;
        session.push_assistant(reply.clone());
        Ok(reply)
    }
}
