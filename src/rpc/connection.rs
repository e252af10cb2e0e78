use crate::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::debug;

const READ_CHUNK_SIZE: usize = 8192;

/// A single request/response exchange with the server.
///
/// The server speaks one request per connection with no framing, so every
/// call opens a fresh connection and closes it when the exchange is over.
pub struct Connection {
    stream: UnixStream,
    max_response_bytes: usize,
}

impl Connection {
    pub async fn open(
        socket_path: &Path,
        connect_timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<Self> {
        if !socket_path.exists() {
            return Err(Error::transport(format!(
                "Socket {} does not exist",
                socket_path.display()
            )));
        }

        let stream = tokio::time::timeout(connect_timeout, UnixStream::connect(socket_path))
            .await
            .map_err(|_| {
                Error::transport(format!(
                    "Timed out after {:?} connecting to {}",
                    connect_timeout,
                    socket_path.display()
                ))
            })?
            .map_err(|e| {
                Error::transport(format!(
                    "Failed to connect to {}: {}",
                    socket_path.display(),
                    e
                ))
            })?;

        debug!("Connected to {}", socket_path.display());

        Ok(Self {
            stream,
            max_response_bytes,
        })
    }

    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.stream
            .write_all(payload)
            .await
            .map_err(|e| Error::transport(format!("Failed to send request: {}", e)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| Error::transport(format!("Failed to flush request: {}", e)))
    }

    /// Reads until the server closes the stream or the bytes received so far
    /// form one complete JSON document.
    pub async fn receive(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;
            if n == 0 {
                break;
            }

            response.extend_from_slice(&chunk[..n]);
            if response.len() > self.max_response_bytes {
                return Err(Error::protocol(format!(
                    "Response exceeds {} bytes",
                    self.max_response_bytes
                )));
            }

            if is_complete_document(&response) {
                break;
            }
        }

        if response.is_empty() {
            return Err(Error::transport(
                "Server closed the connection without a response",
            ));
        }

        Ok(response)
    }

    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            // The peer may already have closed its end
            debug!("Connection shutdown: {}", e);
        }
    }

    /// Runs send and receive, closing the connection on every path.
    pub async fn exchange(mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let outcome = match self.send(payload).await {
            Ok(()) => self.receive().await,
            Err(e) => Err(e),
        };
        if let Err(ref e) = outcome {
            debug!("Exchange failed: {}", e);
        }
        self.close().await;
        outcome
    }
}

fn is_complete_document(bytes: &[u8]) -> bool {
    serde_json::from_slice::<serde::de::IgnoredAny>(bytes).is_ok()
}
