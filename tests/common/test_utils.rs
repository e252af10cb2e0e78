use super::mocks::SharedBuffer;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tracing::subscriber::DefaultGuard;
use vision_client::{
    config::Config,
    rpc::{Command, Request},
};

type Handler = Arc<dyn Fn(&Request) -> String + Send + Sync>;

/// A stand-in for the inference server, listening on a socket in a temp dir.
///
/// Each connection carries one request; the reply is produced by the
/// handler as raw text so tests can also send malformed payloads.
pub struct FakeVisionServer {
    pub dir: TempDir,
    pub socket_path: PathBuf,
    pub requests: Arc<Mutex<Vec<Request>>>,
    pub connections: Arc<Mutex<usize>>,
    task: JoinHandle<()>,
}

impl FakeVisionServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        let dir = create_temp_dir();
        let socket_path = dir.path().join("vision.sock");
        let listener = UnixListener::bind(&socket_path).expect("Failed to bind fake server");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(Mutex::new(0));
        let handler: Handler = Arc::new(handler);

        let task = {
            let requests = requests.clone();
            let connections = connections.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    *connections.lock().unwrap() += 1;
                    serve_one(stream, handler.clone(), requests.clone()).await;
                }
            })
        };

        Self {
            dir,
            socket_path,
            requests,
            connections,
            task,
        }
    }

    /// Answers init and clear_kv_cache with success and every infer with
    /// the given text.
    pub async fn describing(text: &str) -> Self {
        let text = text.to_string();
        Self::start(move |request| match request.command {
            Command::Infer { .. } => json!({"success": true, "result": {"text": text}}).to_string(),
            _ => json!({"success": true, "result": {}}).to_string(),
        })
        .await
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connection_count(&self) -> usize {
        *self.connections.lock().unwrap()
    }

    pub fn config(&self) -> Config {
        Config {
            socket_path: self.socket_path.clone(),
            ..Config::default()
        }
    }
}

impl Drop for FakeVisionServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_one(mut stream: UnixStream, handler: Handler, requests: Arc<Mutex<Vec<Request>>>) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let request = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);
        if let Ok(request) = serde_json::from_slice::<Request>(&buffer) {
            break request;
        }
    };

    let reply = handler(&request);
    requests.lock().unwrap().push(request);
    let _ = stream.write_all(reply.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a small placeholder image file
pub fn create_test_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x89PNG\r\n\x1a\n").expect("Failed to write test image");
    path
}

/// Request ids in the order the server received them
pub fn request_ids(requests: &[Request]) -> Vec<u64> {
    requests.iter().map(|r| r.id).collect()
}

/// Captures log output on the current thread until the guard is dropped
pub fn capture_logs() -> (SharedBuffer, DefaultGuard) {
    let logs = SharedBuffer::new();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
