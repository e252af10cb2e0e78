use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/vision.sock";

pub const DEFAULT_PROMPT: &str = "<|im_start|>system\nYou are a helpful assistant.<|im_end|>\n<|im_start|>user\n<img_placement>\nDescribe the image in one short sentence.<|im_end|>\n<|im_start|>assistant\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Fixed image to describe. `None` selects live camera mode.
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_n_predict")]
    pub n_predict: u32,
    #[serde(default)]
    pub use_tts: bool,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device_index: i32,
    #[serde(default = "default_capture_path")]
    pub capture_path: PathBuf,
    #[serde(default = "default_window_title")]
    pub window_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_piper_command")]
    pub piper_command: String,
    /// Overrides the voice model under the user's data directory.
    #[serde(default)]
    pub voice_model: Option<PathBuf>,
    /// Overrides the platform audio player (`paplay` / `afplay`).
    #[serde(default)]
    pub player: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            model_path: default_model_path(),
            image_path: None,
            prompt: default_prompt(),
            n_predict: default_n_predict(),
            use_tts: false,
            rpc: RpcConfig::default(),
            camera: CameraConfig::default(),
            speech: SpeechConfig::default(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            capture_path: default_capture_path(),
            window_title: default_window_title(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            piper_command: default_piper_command(),
            voice_model: None,
            player: None,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}

fn default_model_path() -> String {
    "dummy".to_string()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_n_predict() -> u32 {
    64
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_max_response_bytes() -> usize {
    65536
}

fn default_capture_path() -> PathBuf {
    PathBuf::from(".image.png")
}

fn default_window_title() -> String {
    "Preview".to_string()
}

fn default_piper_command() -> String {
    "piper".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
