//! Speech provider adapters for the Cadence backend.
//!
//! Wraps the ElevenLabs speech-to-text and text-to-speech HTTP APIs and
//! provides local audio playback through an external player binary.
//! Transcription failures are hard errors for the caller; synthesis and
//! playback are best-effort side effects the server fires and forgets.

pub mod error;
pub mod playback;
pub mod stt;
pub mod tts;

pub use error::VoiceError;
pub use playback::Player;
pub use stt::SttClient;
pub use tts::TtsClient;
