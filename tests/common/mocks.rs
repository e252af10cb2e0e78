use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use vision_client::{
    Error, Result,
    capture::{CameraDevice, CaptureOutcome, CaptureSource, Gesture},
    rpc::{Response, VisionClient},
    speech::SpeechOutput,
};

/// One call observed by the mock client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    Initialize { model_path: String },
    ClearKvCache,
    Infer {
        image_path: String,
        prompt: String,
        n_predict: u32,
    },
}

/// Mock vision client for testing
pub struct MockVisionClient {
    pub calls: Arc<Mutex<Vec<ClientCall>>>,
    pub init_response: Response,
    pub clear_response: Response,
    pub infer_responses: VecDeque<Response>,
    pub transport_error: Option<String>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            init_response: Response::ok(json!({})),
            clear_response: Response::ok(json!({})),
            infer_responses: VecDeque::new(),
            transport_error: None,
        }
    }

    pub fn with_init_response(mut self, response: Response) -> Self {
        self.init_response = response;
        self
    }

    pub fn with_clear_response(mut self, response: Response) -> Self {
        self.clear_response = response;
        self
    }

    pub fn with_infer_text(mut self, text: &str) -> Self {
        self.infer_responses
            .push_back(Response::ok(json!({ "text": text })));
        self
    }

    pub fn with_infer_response(mut self, response: Response) -> Self {
        self.infer_responses.push_back(response);
        self
    }

    pub fn with_transport_error(mut self, error: &str) -> Self {
        self.transport_error = Some(error.to_string());
        self
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<ClientCall>>> {
        self.calls.clone()
    }

    fn record(&self, call: ClientCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.transport_error {
            Some(ref error) => Err(Error::transport(error.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn initialize(&mut self, model_path: &str) -> Result<Response> {
        self.record(ClientCall::Initialize {
            model_path: model_path.to_string(),
        })?;
        Ok(self.init_response.clone())
    }

    async fn clear_kv_cache(&mut self) -> Result<Response> {
        self.record(ClientCall::ClearKvCache)?;
        Ok(self.clear_response.clone())
    }

    async fn infer(&mut self, image_path: &str, prompt: &str, n_predict: u32) -> Result<Response> {
        self.record(ClientCall::Infer {
            image_path: image_path.to_string(),
            prompt: prompt.to_string(),
            n_predict,
        })?;
        self.infer_responses
            .pop_front()
            .ok_or_else(|| Error::transport("No more mock infer responses available"))
    }
}

/// Mock capture source replaying scripted outcomes
pub struct MockCaptureSource {
    pub outcomes: VecDeque<CaptureOutcome>,
    pub continuous: bool,
    pub released: Arc<Mutex<bool>>,
}

impl MockCaptureSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            outcomes: VecDeque::from(vec![CaptureOutcome::Image(path.into())]),
            continuous: false,
            released: Arc::new(Mutex::new(false)),
        }
    }

    pub fn camera(outcomes: Vec<CaptureOutcome>) -> Self {
        Self {
            outcomes: VecDeque::from(outcomes),
            continuous: true,
            released: Arc::new(Mutex::new(false)),
        }
    }

    pub fn released_handle(&self) -> Arc<Mutex<bool>> {
        self.released.clone()
    }
}

impl CaptureSource for MockCaptureSource {
    fn capture(&mut self) -> Result<CaptureOutcome> {
        Ok(self.outcomes.pop_front().unwrap_or(CaptureOutcome::Quit))
    }

    fn is_continuous(&self) -> bool {
        self.continuous
    }

    fn release(&mut self) {
        *self.released.lock().unwrap() = true;
    }
}

/// One scripted step of the mock camera.
#[derive(Debug, Clone, Copy)]
pub enum CameraStep {
    ReadError,
    Frame(Gesture),
}

/// Everything the mock camera saw, shared with the test.
#[derive(Debug, Default)]
pub struct CameraLog {
    pub frames_shown: usize,
    pub saved: Vec<PathBuf>,
    pub released: usize,
}

/// Mock camera device for testing
pub struct MockCameraDevice {
    pub steps: VecDeque<CameraStep>,
    pub pending_gesture: Option<Gesture>,
    pub log: Arc<Mutex<CameraLog>>,
    next_frame: u32,
}

impl MockCameraDevice {
    pub fn new(steps: Vec<CameraStep>) -> Self {
        Self {
            steps: VecDeque::from(steps),
            pending_gesture: None,
            log: Arc::new(Mutex::new(CameraLog::default())),
            next_frame: 0,
        }
    }

    pub fn log_handle(&self) -> Arc<Mutex<CameraLog>> {
        self.log.clone()
    }
}

impl CameraDevice for MockCameraDevice {
    type Frame = u32;

    fn read_frame(&mut self) -> Result<u32> {
        // An exhausted script quits so a test can never spin forever
        let step = self
            .steps
            .pop_front()
            .unwrap_or(CameraStep::Frame(Gesture::Quit));
        match step {
            CameraStep::ReadError => Err(Error::capture("mock read failure")),
            CameraStep::Frame(gesture) => {
                self.pending_gesture = Some(gesture);
                self.next_frame += 1;
                Ok(self.next_frame)
            }
        }
    }

    fn show(&mut self, _frame: &u32) -> Result<()> {
        self.log.lock().unwrap().frames_shown += 1;
        Ok(())
    }

    fn poll_gesture(&mut self) -> Result<Gesture> {
        Ok(self.pending_gesture.take().unwrap_or(Gesture::Retry))
    }

    fn save(&mut self, frame: &u32, path: &Path) -> Result<()> {
        std::fs::write(path, format!("frame-{frame}"))?;
        self.log.lock().unwrap().saved.push(path.to_path_buf());
        Ok(())
    }

    fn release(&mut self) {
        self.log.lock().unwrap().released += 1;
    }
}

/// Mock speech output recording every text it was asked to speak
#[derive(Default)]
pub struct MockSpeech {
    pub spoken: Arc<Mutex<Vec<String>>>,
    pub error: Option<String>,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: &str) -> Self {
        Self {
            spoken: Arc::new(Mutex::new(Vec::new())),
            error: Some(error.to_string()),
        }
    }

    pub fn spoken_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.spoken.clone()
    }
}

#[async_trait]
impl SpeechOutput for MockSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        match self.error {
            Some(ref error) => Err(Error::speech(error.clone())),
            None => Ok(()),
        }
    }
}

/// In-memory report sink standing in for stdout
#[derive(Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
