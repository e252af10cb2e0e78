use super::{Playback, SpeechOutput, default_voice_model_path};
use crate::{Error, Result, config::SpeechConfig};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Text-to-speech through the `piper` CLI, played with a platform player.
pub struct PiperSpeech {
    piper_command: String,
    voice_model: PathBuf,
    playback: Playback,
}

impl PiperSpeech {
    pub fn new(config: &SpeechConfig) -> Self {
        let voice_model = config
            .voice_model
            .clone()
            .unwrap_or_else(default_voice_model_path);
        Self::with_playback(
            config.piper_command.clone(),
            voice_model,
            Playback::resolve(config.player.as_deref()),
        )
    }

    pub fn with_playback(
        piper_command: impl Into<String>,
        voice_model: impl Into<PathBuf>,
        playback: Playback,
    ) -> Self {
        Self {
            piper_command: piper_command.into(),
            voice_model: voice_model.into(),
            playback,
        }
    }

    pub fn voice_model(&self) -> &Path {
        &self.voice_model
    }

    /// Reports whether the voice model is in place. Checked once at startup;
    /// fetching it is left to whoever provisions the machine.
    pub fn ensure_voice_model(&self) -> bool {
        if self.voice_model.exists() {
            debug!("Voice model found at {}", self.voice_model.display());
            true
        } else {
            warn!(
                "Voice model not found at {}; speech synthesis will likely fail",
                self.voice_model.display()
            );
            false
        }
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let mut child = Command::new(&self.piper_command)
            .arg("--model")
            .arg(&self.voice_model)
            .arg("--output_file")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::speech(format!("Failed to spawn {}: {}", self.piper_command, e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::speech("Failed to get stdin for piper"))?;
        if let Err(e) = stdin.write_all(text.as_bytes()).await {
            // An early exit shows up in the status below with a better message
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(Error::speech(format!("Failed to write text to piper: {}", e)));
            }
            debug!("piper closed its input early");
        }
        // piper synthesizes once its input is closed
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::speech(format!("Failed to wait for piper: {}", e)))?;
        if !output.status.success() {
            return Err(Error::speech(format!(
                "piper exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn play(&self, player: &str, audio: &Path) -> Result<()> {
        let status = Command::new(player)
            .arg(audio)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| Error::speech(format!("Failed to run {}: {}", player, e)))?;
        if !status.success() {
            return Err(Error::speech(format!("{} exited with {}", player, status)));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechOutput for PiperSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        // Removed when dropped, whichever way this function returns
        let artifact = tempfile::Builder::new()
            .prefix("vision-tts-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| Error::speech(format!("Failed to create audio file: {}", e)))?;

        info!("Speaking the generated text...");
        self.synthesize(text, artifact.path()).await?;

        match self.playback {
            Playback::Command(ref player) => self.play(player, artifact.path()).await?,
            Playback::Unsupported => warn!("Unsupported OS, skipping speech playback"),
        }

        remove_artifact(artifact);
        Ok(())
    }
}

fn remove_artifact(artifact: NamedTempFile) {
    let path = artifact.path().to_path_buf();
    if let Err(e) = artifact.close() {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}
