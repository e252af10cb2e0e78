mod piper;

pub use piper::PiperSpeech;

use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

const VOICE_MODEL_RELATIVE_PATH: &str =
    "piper/voices/en_US-lessac-medium/en_US-lessac-medium.onnx";

/// Speaks generated text aloud. Callers treat every failure as non-fatal.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// How synthesized audio reaches the speakers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// Run this program with the audio file as its only argument.
    Command(String),
    /// No known player on this platform; playback is skipped.
    Unsupported,
}

impl Playback {
    pub fn for_platform() -> Self {
        if cfg!(target_os = "linux") {
            Playback::Command("paplay".to_string())
        } else if cfg!(target_os = "macos") {
            Playback::Command("afplay".to_string())
        } else {
            Playback::Unsupported
        }
    }

    /// A configured player wins over the platform default.
    pub fn resolve(configured: Option<&str>) -> Self {
        match configured {
            Some(player) if !player.trim().is_empty() => Playback::Command(player.to_string()),
            _ => Self::for_platform(),
        }
    }
}

/// Expected location of the piper voice under the user's data directory.
pub fn default_voice_model_path() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(VOICE_MODEL_RELATIVE_PATH)
}
