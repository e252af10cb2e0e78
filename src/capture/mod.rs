mod camera;
mod file;
#[cfg(feature = "camera")]
mod webcam;

pub use camera::{CameraDevice, CameraSource, Gesture, gesture_from_key};
pub use file::FileSource;
#[cfg(feature = "camera")]
pub use webcam::OpenCvCamera;

use crate::{Result, config::Config};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// An image is ready for inference at this path.
    Image(PathBuf),
    /// The operator asked to end the session.
    Quit,
}

/// Where the images to describe come from.
pub trait CaptureSource {
    /// Blocks until an image is ready or the operator quits.
    fn capture(&mut self) -> Result<CaptureOutcome>;

    /// Whether the control loop should run again after a completed cycle.
    fn is_continuous(&self) -> bool;

    /// Releases any held device. Safe to call more than once.
    fn release(&mut self);
}

/// Picks the file source when an image path is configured, the camera
/// otherwise.
pub fn open_source(config: &Config) -> Result<Box<dyn CaptureSource>> {
    match config.image_path {
        Some(ref path) => Ok(Box::new(FileSource::new(path.clone()))),
        None => open_camera(config),
    }
}

#[cfg(feature = "camera")]
fn open_camera(config: &Config) -> Result<Box<dyn CaptureSource>> {
    let device = OpenCvCamera::open(config.camera.device_index, &config.camera.window_title)?;
    Ok(Box::new(CameraSource::new(
        device,
        config.camera.capture_path.clone(),
    )))
}

#[cfg(not(feature = "camera"))]
fn open_camera(_config: &Config) -> Result<Box<dyn CaptureSource>> {
    Err(crate::Error::config(
        "No --image_path given and camera support is not built in (rebuild with --features camera)",
    ))
}
