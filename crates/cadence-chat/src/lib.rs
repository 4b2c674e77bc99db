//! Conversational text generation for the Cadence backend.
//!
//! Wraps the Gemini `generateContent` API, keeps the single process-wide
//! tutoring conversation, and owns the persona templates the endpoints
//! build their prompts from.

pub mod error;
pub mod gemini;
pub mod prompts;
pub mod session;

pub use error::ChatError;
pub use gemini::GeminiClient;
pub use session::{ChatSession, ChatTurn, Role};
