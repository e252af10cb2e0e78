//! Webcam capture and preview through OpenCV.
//!
//! Only compiled with the `camera` feature.

use super::camera::{CameraDevice, Gesture, gesture_from_key};
use crate::{Error, Result};
use opencv::{
    core::{Mat, Vector},
    highgui, imgcodecs,
    prelude::*,
    videoio,
};
use std::path::Path;
use tracing::info;

const PREVIEW_WAIT_MS: i32 = 1;

pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    window_title: String,
}

impl OpenCvCamera {
    pub fn open(device_index: i32, window_title: &str) -> Result<Self> {
        let capture = videoio::VideoCapture::new(device_index, videoio::CAP_ANY).map_err(|e| {
            Error::capture(format!("Failed to open camera {}: {:?}", device_index, e))
        })?;

        let opened = capture
            .is_opened()
            .map_err(|e| Error::capture(format!("Failed to query camera state: {:?}", e)))?;
        if !opened {
            return Err(Error::capture(format!(
                "Camera {} could not be opened",
                device_index
            )));
        }

        info!("Camera {} opened", device_index);

        Ok(Self {
            capture,
            window_title: window_title.to_string(),
        })
    }
}

impl CameraDevice for OpenCvCamera {
    type Frame = Mat;

    fn read_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .map_err(|e| Error::capture(format!("{:?}", e)))?;
        if !grabbed || frame.empty() {
            return Err(Error::capture("camera returned no frame"));
        }
        Ok(frame)
    }

    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.window_title, frame)
            .map_err(|e| Error::capture(format!("Failed to show preview: {:?}", e)))
    }

    fn poll_gesture(&mut self) -> Result<Gesture> {
        let key = highgui::wait_key(PREVIEW_WAIT_MS)
            .map_err(|e| Error::capture(format!("Failed to wait for key: {:?}", e)))?;
        if key < 0 {
            return Ok(Gesture::Retry);
        }
        Ok(gesture_from_key(key & 0xFF))
    }

    fn save(&mut self, frame: &Mat, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::capture(format!("Non UTF-8 path: {}", path.display())))?;
        let written = imgcodecs::imwrite(path_str, frame, &Vector::new())
            .map_err(|e| Error::capture(format!("Failed to write {}: {:?}", path_str, e)))?;
        if !written {
            return Err(Error::capture(format!("Failed to write {}", path_str)));
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            tracing::warn!("Failed to release camera: {:?}", e);
        }
        let _ = highgui::destroy_all_windows();
    }
}
