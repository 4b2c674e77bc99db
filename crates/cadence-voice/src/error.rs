use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
