use super::types::{Command, Request};
use std::path::{Path, PathBuf};

/// Client-side state for one run: where the server lives and which request
/// id comes next.
#[derive(Debug)]
pub struct Session {
    socket_path: PathBuf,
    next_request_id: u64,
}

impl Session {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            next_request_id: 0,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Id of the most recently issued request, 0 before the first one.
    pub fn last_request_id(&self) -> u64 {
        self.next_request_id
    }

    /// The only place the counter moves. Ids start at 1.
    pub fn allocate_id(&mut self) -> u64 {
        self.next_request_id += 1;
        self.next_request_id
    }

    pub fn request(&mut self, command: Command) -> Request {
        Request {
            id: self.allocate_id(),
            command,
        }
    }
}
