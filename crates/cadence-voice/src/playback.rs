use crate::error::VoiceError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Timeout for the player process. Feedback clips are short; anything still
/// running after this is wedged and gets killed.
const PLAYBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Plays encoded audio by piping it to a local player binary over stdin.
///
/// The default arguments suit `ffplay` (`-autoexit -nodisp`); any player
/// that reads an encoded stream from stdin works.
#[derive(Debug, Clone)]
pub struct Player {
    binary: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl Player {
    pub fn new(binary: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            args: ["-autoexit", "-nodisp", "-loglevel", "quiet", "-i", "-"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: PLAYBACK_TIMEOUT,
        }
    }

    /// Builder method: replace the player arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Builder method: replace the playback timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Plays the given audio bytes to completion.
    ///
    /// Callers that must not block on playback should spawn this on a task;
    /// the server treats every error here as log-and-ignore.
    pub async fn play(&self, audio: &[u8]) -> Result<(), VoiceError> {
        if self.binary.as_os_str().is_empty() {
            return Err(VoiceError::Config(
                "player binary path is not configured".to_string(),
            ));
        }

        let mut command = Command::new(&self.binary);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // A timeout drops the wait future; the child must die with it
            // or a wedged player leaks.
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| VoiceError::Playback(format!("failed to spawn player: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| VoiceError::Playback("failed to open player stdin".to_string()))?;
        let audio_owned = audio.to_vec();

        // Write on a task so a player that stops reading cannot deadlock us.
        let write_task =
            tokio::spawn(async move { stdin.write_all(&audio_owned).await });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                VoiceError::Playback(format!(
                    "player timed out after {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e| VoiceError::Playback(format!("failed to wait for player: {}", e)))?;

        match write_task.await {
            Ok(Ok(_)) => {}
            // Player exiting early closes the pipe; only report it if the
            // process itself also failed.
            Ok(Err(e)) if output.status.success() => {
                tracing::debug!("player stdin closed early: {}", e);
            }
            Ok(Err(e)) => {
                return Err(VoiceError::Playback(format!(
                    "failed to write to player stdin: {}",
                    e
                )))
            }
            Err(e) => return Err(VoiceError::Playback(format!("stdin task failed: {}", e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Playback(format!(
                "player failed: {}",
                stderr
            )));
        }

        Ok(())
    }
}
