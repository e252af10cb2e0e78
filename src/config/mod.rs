mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "vision-client.yaml";

/// Loads the YAML config file, falling back to defaults.
///
/// An explicitly named file (argument or `CONFIG_PATH`) must exist; the
/// default `vision-client.yaml` in the working directory is optional.
pub async fn load(path: Option<&Path>) -> Result<Config> {
    let (config_path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match env::var("CONFIG_PATH") {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        },
    };

    if !required && !config_path.exists() {
        debug!("No configuration file at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }

    debug!("Loading configuration from: {}", config_path.display());

    let config_str = tokio::fs::read_to_string(&config_path).await.map_err(|e| {
        Error::config(format!(
            "Cannot read configuration file {}: {}",
            config_path.display(),
            e
        ))
    })?;
    parse(&config_str)
}

pub fn parse(config_str: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to a defaulted struct
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

impl Config {
    /// Checks everything that must hold before the first connection attempt.
    pub fn validate(&self) -> Result<()> {
        if !self.socket_path.exists() {
            return Err(Error::config(format!(
                "Socket {} does not exist. Make sure the server is running.",
                self.socket_path.display()
            )));
        }

        if let Some(ref image_path) = self.image_path {
            if !image_path.exists() {
                return Err(Error::config(format!(
                    "Image file {} does not exist.",
                    image_path.display()
                )));
            }
        }

        if self.n_predict == 0 {
            return Err(Error::config("n_predict must be greater than zero"));
        }

        if self.rpc.max_response_bytes == 0 {
            return Err(Error::config("rpc.max_response_bytes must be greater than zero"));
        }

        Ok(())
    }

    pub fn is_camera_mode(&self) -> bool {
        self.image_path.is_none()
    }
}
