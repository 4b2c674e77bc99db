//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech and chat provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Local audio settings.
    #[serde(default)]
    pub audio: AudioConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the bundled single-page frontend. Unmatched paths
    /// fall back to its index.html when it exists.
    #[serde(default = "default_client_dir")]
    pub client_dir: String,
}

/// Provider credentials and endpoint overrides.
///
/// Keys are not validated at startup; a missing key surfaces as a provider
/// error on the first call that needs it.
#[derive(Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    /// ElevenLabs API key (speech-to-text and text-to-speech).
    #[serde(default)]
    pub elevenlabs_api_key: String,

    /// Gemini API key (reply generation).
    #[serde(default)]
    pub gemini_api_key: String,

    /// Override for the ElevenLabs API base URL.
    #[serde(default)]
    pub elevenlabs_base_url: Option<String>,

    /// Override for the Gemini API base URL.
    #[serde(default)]
    pub gemini_base_url: Option<String>,

    /// Override for the transcription model identifier.
    #[serde(default)]
    pub stt_model: Option<String>,

    /// Override for the synthesis voice identifier.
    #[serde(default)]
    pub tts_voice_id: Option<String>,

    /// Override for the synthesis model identifier.
    #[serde(default)]
    pub tts_model: Option<String>,

    /// Override for the chat model identifier.
    #[serde(default)]
    pub chat_model: Option<String>,
}

impl fmt::Debug for ProvidersConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidersConfig")
            .field("elevenlabs_api_key", &"[REDACTED]")
            .field("gemini_api_key", &"[REDACTED]")
            .field("elevenlabs_base_url", &self.elevenlabs_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("stt_model", &self.stt_model)
            .field("tts_voice_id", &self.tts_voice_id)
            .field("tts_model", &self.tts_model)
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

/// Local audio configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Directory for per-request scratch copies of uploaded audio.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,

    /// Player binary used to play synthesized feedback locally.
    #[serde(default = "default_player_bin")]
    pub player_bin: String,

    /// Whether to synthesize and play feedback at all.
    #[serde(default = "default_true")]
    pub playback_enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "cadence_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_client_dir() -> String {
    "client/dist".to_string()
}

fn default_scratch_dir() -> String {
    "uploads".to_string()
}

fn default_player_bin() -> String {
    "ffplay".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_dir: default_client_dir(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            player_bin: default_player_bin(),
            playback_enabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CADENCE_HOST` overrides `server.host`
/// - `CADENCE_PORT` overrides `server.port`
/// - `CADENCE_CLIENT_DIR` overrides `server.client_dir`
/// - `ELEVENLABS_API_KEY` overrides `providers.elevenlabs_api_key`
/// - `GEMINI_API_KEY` overrides `providers.gemini_api_key`
/// - `CADENCE_SCRATCH_DIR` overrides `audio.scratch_dir`
/// - `CADENCE_PLAYER_BIN` overrides `audio.player_bin`
/// - `CADENCE_LOG_LEVEL` overrides `logging.level`
/// - `CADENCE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// The two API key variables are conventionally kept in a local `.env`
/// file; `main` loads that file before calling this.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("CADENCE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("CADENCE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(client_dir) = std::env::var("CADENCE_CLIENT_DIR") {
        config.server.client_dir = client_dir;
    }
    if let Ok(key) = std::env::var("ELEVENLABS_API_KEY") {
        config.providers.elevenlabs_api_key = key;
    }
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config.providers.gemini_api_key = key;
    }
    if let Ok(dir) = std::env::var("CADENCE_SCRATCH_DIR") {
        config.audio.scratch_dir = dir;
    }
    if let Ok(bin) = std::env::var("CADENCE_PLAYER_BIN") {
        config.audio.player_bin = bin;
    }
    if let Ok(level) = std::env::var("CADENCE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("CADENCE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.audio.scratch_dir, "uploads");
        assert!(config.audio.playback_enabled);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml = r#"
            [server]
            port = 8080

            [providers]
            elevenlabs_api_key = "el-key"
            chat_model = "gemini-2.0-flash"

            [audio]
            playback_enabled = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.providers.elevenlabs_api_key, "el-key");
        assert_eq!(config.providers.chat_model.as_deref(), Some("gemini-2.0-flash"));
        assert!(config.providers.gemini_base_url.is_none());
        assert!(!config.audio.playback_enabled);
        assert_eq!(config.audio.player_bin, "ffplay");
    }

    #[test]
    fn env_vars_override_defaults() {
        // One test owns all the override variables so parallel tests
        // never race on the process environment.
        std::env::set_var("CADENCE_HOST", "0.0.0.0");
        std::env::set_var("CADENCE_PORT", "9100");
        std::env::set_var("CADENCE_CLIENT_DIR", "/srv/cadence/client");
        std::env::set_var("CADENCE_SCRATCH_DIR", "/tmp/cadence-scratch");
        std::env::set_var("CADENCE_PLAYER_BIN", "mpv");
        std::env::set_var("CADENCE_LOG_LEVEL", "debug");
        std::env::set_var("CADENCE_LOG_JSON", "true");
        std::env::set_var("ELEVENLABS_API_KEY", "el-from-env");
        std::env::set_var("GEMINI_API_KEY", "gm-from-env");

        let config = load_config(None).unwrap();

        for var in [
            "CADENCE_HOST",
            "CADENCE_PORT",
            "CADENCE_CLIENT_DIR",
            "CADENCE_SCRATCH_DIR",
            "CADENCE_PLAYER_BIN",
            "CADENCE_LOG_LEVEL",
            "CADENCE_LOG_JSON",
            "ELEVENLABS_API_KEY",
            "GEMINI_API_KEY",
        ] {
            std::env::remove_var(var);
        }

        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.client_dir, "/srv/cadence/client");
        assert_eq!(config.audio.scratch_dir, "/tmp/cadence-scratch");
        assert_eq!(config.audio.player_bin, "mpv");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.providers.elevenlabs_api_key, "el-from-env");
        assert_eq!(config.providers.gemini_api_key, "gm-from-env");

        // Unparseable values are skipped, not fatal.
        std::env::set_var("CADENCE_PORT", "not-a-port");
        let config = load_config(None).unwrap();
        std::env::remove_var("CADENCE_PORT");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn api_keys_are_redacted_in_debug_output() {
        let config = Config {
            providers: ProvidersConfig {
                elevenlabs_api_key: "super-secret".to_string(),
                gemini_api_key: "also-secret".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
