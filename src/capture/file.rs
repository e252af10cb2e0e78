use super::{CaptureOutcome, CaptureSource};
use crate::Result;
use std::path::PathBuf;

/// A fixed, already validated image. Every capture yields the same path.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureSource for FileSource {
    fn capture(&mut self) -> Result<CaptureOutcome> {
        Ok(CaptureOutcome::Image(self.path.clone()))
    }

    fn is_continuous(&self) -> bool {
        false
    }

    fn release(&mut self) {}
}
