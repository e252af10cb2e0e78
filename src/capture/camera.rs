use super::{CaptureOutcome, CaptureSource};
use crate::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const KEY_LF: i32 = 10;
const KEY_CR: i32 = 13;
const KEY_ESC: i32 = 27;

const READ_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Operator input observed while previewing the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Keep the current frame and run inference on it.
    Commit,
    /// End the session.
    Quit,
    /// No decision yet; show the next frame.
    Retry,
}

/// Maps a preview-window key code to a gesture.
pub fn gesture_from_key(key: i32) -> Gesture {
    match key {
        KEY_LF | KEY_CR => Gesture::Commit,
        KEY_ESC => Gesture::Quit,
        k if k == i32::from(b'q') || k == i32::from(b'Q') => Gesture::Quit,
        _ => Gesture::Retry,
    }
}

/// A frame-producing device with a preview window.
pub trait CameraDevice {
    type Frame;

    fn read_frame(&mut self) -> Result<Self::Frame>;

    fn show(&mut self, frame: &Self::Frame) -> Result<()>;

    /// The single point where the loop waits for the operator.
    fn poll_gesture(&mut self) -> Result<Gesture>;

    fn save(&mut self, frame: &Self::Frame, path: &Path) -> Result<()>;

    fn release(&mut self);
}

pub struct CameraSource<D: CameraDevice> {
    device: Option<D>,
    capture_path: PathBuf,
    failed_reads: u64,
}

impl<D: CameraDevice> CameraSource<D> {
    pub fn new(device: D, capture_path: impl Into<PathBuf>) -> Self {
        Self {
            device: Some(device),
            capture_path: capture_path.into(),
            failed_reads: 0,
        }
    }

    pub fn failed_reads(&self) -> u64 {
        self.failed_reads
    }

    pub fn is_released(&self) -> bool {
        self.device.is_none()
    }
}

impl<D: CameraDevice> CaptureSource for CameraSource<D> {
    fn capture(&mut self) -> Result<CaptureOutcome> {
        let Some(device) = self.device.as_mut() else {
            // Released devices behave like a quit so the loop winds down
            return Ok(CaptureOutcome::Quit);
        };

        eprintln!("Press Enter to capture the frame or q to quit...");

        loop {
            let frame = match device.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    self.failed_reads += 1;
                    warn!("Cam read error: {}", e);
                    std::thread::sleep(READ_RETRY_DELAY);
                    continue;
                }
            };

            if let Err(e) = device.show(&frame) {
                warn!("Preview failed: {}", e);
                continue;
            }

            let gesture = match device.poll_gesture() {
                Ok(gesture) => gesture,
                Err(e) => {
                    warn!("Failed to poll operator input: {}", e);
                    continue;
                }
            };

            match gesture {
                Gesture::Commit => {
                    if let Err(e) = device.save(&frame, &self.capture_path) {
                        warn!("Failed to save frame: {}", e);
                        continue;
                    }
                    let path = std::path::absolute(&self.capture_path)?;
                    info!("Image captured and saved to {}", path.display());
                    return Ok(CaptureOutcome::Image(path));
                }
                Gesture::Quit => {
                    info!("Quitting...");
                    self.release();
                    return Ok(CaptureOutcome::Quit);
                }
                Gesture::Retry => continue,
            }
        }
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn release(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            debug!("Camera released");
        }
    }
}

impl<D: CameraDevice> Drop for CameraSource<D> {
    fn drop(&mut self) {
        self.release();
    }
}
