use super::connection::Connection;
use super::session::Session;
use super::types::{Command, Response};
use crate::{Error, Result, config::RpcConfig};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Operations the inference server exposes.
///
/// A `success=false` reply is still `Ok`; transport and decoding failures
/// are `Err(Error::Transport)` / `Err(Error::Protocol)`.
#[async_trait]
pub trait VisionClient: Send {
    async fn initialize(&mut self, model_path: &str) -> Result<Response>;

    async fn clear_kv_cache(&mut self) -> Result<Response>;

    async fn infer(&mut self, image_path: &str, prompt: &str, n_predict: u32) -> Result<Response>;
}

pub struct UnixSocketClient {
    session: Session,
    connect_timeout: Duration,
    max_response_bytes: usize,
}

impl UnixSocketClient {
    pub fn new(socket_path: impl Into<PathBuf>, config: &RpcConfig) -> Self {
        Self {
            session: Session::new(socket_path),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            max_response_bytes: config.max_response_bytes,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn send_request(&mut self, command: Command) -> Result<Response> {
        let request = self.session.request(command);
        let payload = serde_json::to_vec(&request)?;

        debug!(
            "Sending request {} ({}) to {}",
            request.id,
            request.command.operation(),
            self.session.socket_path().display()
        );

        let connection = Connection::open(
            self.session.socket_path(),
            self.connect_timeout,
            self.max_response_bytes,
        )
        .await?;
        let bytes = connection.exchange(&payload).await?;

        let response = parse_response(&bytes)?;
        debug!(
            "Request {} answered with success={}",
            request.id, response.success
        );
        Ok(response)
    }
}

fn parse_response(bytes: &[u8]) -> Result<Response> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::protocol(format!("Response is not valid UTF-8: {}", e)))?;
    serde_json::from_str(text)
        .map_err(|e| Error::protocol(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl VisionClient for UnixSocketClient {
    async fn initialize(&mut self, model_path: &str) -> Result<Response> {
        self.send_request(Command::Init {
            model_path: model_path.to_string(),
        })
        .await
    }

    async fn clear_kv_cache(&mut self) -> Result<Response> {
        self.send_request(Command::ClearKvCache {}).await
    }

    async fn infer(&mut self, image_path: &str, prompt: &str, n_predict: u32) -> Result<Response> {
        self.send_request(Command::Infer {
            image_path: image_path.to_string(),
            prompt: prompt.to_string(),
            n_predict,
        })
        .await
    }
}
