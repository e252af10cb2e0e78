use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Describe images with a local vision-inference server.
///
/// Flags override values from the config file.
#[derive(Debug, Parser)]
#[command(name = "vision-client", version, about = "Vision Client")]
pub struct Cli {
    /// Path to the UNIX socket [default: /tmp/vision.sock]
    #[arg(long = "socket", env = "VISION_SOCKET")]
    pub socket: Option<PathBuf>,

    /// Path to the image file; omit to capture from the camera
    #[arg(long = "image_path")]
    pub image_path: Option<PathBuf>,

    /// Prompt for the model; must contain the <img_placement> marker
    #[arg(long)]
    pub prompt: Option<String>,

    /// Number of tokens to predict [default: 64]
    #[arg(long = "n_predict", value_parser = clap::value_parser!(u32).range(1..))]
    pub n_predict: Option<u32>,

    /// Use piper-tts to speak the generated text
    #[arg(long = "use_tts")]
    pub use_tts: bool,

    /// Model path sent with the init request [default: dummy]
    #[arg(long = "model_path")]
    pub model_path: Option<String>,

    /// Camera device index for live capture [default: 0]
    #[arg(long = "camera_index")]
    pub camera_index: Option<i32>,

    /// YAML configuration file
    #[arg(long, env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long = "log_level")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref socket) = self.socket {
            config.socket_path = socket.clone();
        }
        if let Some(ref image_path) = self.image_path {
            config.image_path = Some(image_path.clone());
        }
        if let Some(ref prompt) = self.prompt {
            config.prompt = prompt.clone();
        }
        if let Some(n_predict) = self.n_predict {
            config.n_predict = n_predict;
        }
        if self.use_tts {
            config.use_tts = true;
        }
        if let Some(ref model_path) = self.model_path {
            config.model_path = model_path.clone();
        }
        if let Some(camera_index) = self.camera_index {
            config.camera.device_index = camera_index;
        }
        if let Some(ref level) = self.log_level {
            config.logs.level = level.clone();
        }
    }
}
