use super::fsm::{LoopEvent, LoopState, LoopStateMachine};
use crate::{
    Error, Result,
    capture::{CaptureOutcome, CaptureSource},
    config::Config,
    rpc::VisionClient,
    speech::SpeechOutput,
};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// What the loop sends to the server on every cycle.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub model_path: String,
    pub prompt: String,
    pub n_predict: u32,
}

impl From<&Config> for LoopSettings {
    fn from(config: &Config) -> Self {
        Self {
            model_path: config.model_path.clone(),
            prompt: config.prompt.clone(),
            n_predict: config.n_predict,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: usize,
    pub last_text: Option<String>,
}

/// Drives capture, cache reset, inference, reporting and speech in order.
pub struct Orchestrator {
    client: Box<dyn VisionClient>,
    source: Box<dyn CaptureSource>,
    speech: Option<Box<dyn SpeechOutput>>,
    report: Box<dyn Write + Send>,
    settings: LoopSettings,
    fsm: LoopStateMachine,
}

impl Orchestrator {
    pub fn new(
        client: Box<dyn VisionClient>,
        source: Box<dyn CaptureSource>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            client,
            source,
            speech: None,
            report: Box::new(std::io::stdout()),
            settings,
            fsm: LoopStateMachine::new(),
        }
    }

    pub fn with_speech(mut self, speech: Box<dyn SpeechOutput>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Where generated text is written. Defaults to stdout.
    pub fn with_report(mut self, report: Box<dyn Write + Send>) -> Self {
        self.report = report;
        self
    }

    pub fn state(&self) -> LoopState {
        self.fsm.current_state()
    }

    /// Runs until the loop reaches `Done` or a fatal error. The capture
    /// source is released either way.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let outcome = self.drive().await;
        self.source.release();

        if let Err(ref e) = outcome {
            if !self.fsm.is_terminal() {
                self.fsm.transition(LoopEvent::Failed)?;
            }
            debug!("Control loop stopped: {}", e);
        }
        outcome
    }

    async fn drive(&mut self) -> Result<RunSummary> {
        info!("Initializing model...");
        self.client
            .initialize(&self.settings.model_path)
            .await?
            .into_result("Initialization")?;
        info!("Model initialized successfully!");
        self.fsm.transition(LoopEvent::Initialized)?;

        let mut last_text = None;
        loop {
            self.fsm.transition(LoopEvent::CaptureStarted)?;
            let image_path = match self.source.capture()? {
                CaptureOutcome::Image(path) => path,
                CaptureOutcome::Quit => {
                    self.fsm.transition(LoopEvent::QuitRequested)?;
                    break;
                }
            };
            self.fsm.transition(LoopEvent::ImageCaptured)?;

            // Every image starts from a clean model context
            self.client
                .clear_kv_cache()
                .await?
                .into_result("Clearing KV cache")?;
            self.fsm.transition(LoopEvent::CacheCleared)?;

            let text = self.infer(&image_path).await?;
            self.fsm.transition(LoopEvent::InferenceCompleted)?;

            self.report_text(&text)?;

            if let Some(ref speech) = self.speech {
                self.fsm.transition(LoopEvent::SpeechRequested)?;
                if let Err(e) = speech.speak(&text).await {
                    warn!("Speech output failed: {}", e);
                }
            }
            last_text = Some(text);

            if self.source.is_continuous() {
                self.fsm.transition(LoopEvent::CycleCompleted)?;
            } else {
                self.fsm.transition(LoopEvent::Finished)?;
                break;
            }
        }

        Ok(RunSummary {
            cycles: self.fsm.completed_cycles(),
            last_text,
        })
    }

    async fn infer(&mut self, image_path: &Path) -> Result<String> {
        let image_abspath = resolve_image_path(image_path)?;
        let image_abspath = image_abspath.to_str().ok_or_else(|| {
            Error::config(format!(
                "Image path {} is not valid UTF-8",
                image_abspath.display()
            ))
        })?;

        info!("Running inference on {}", image_abspath);
        self.client
            .infer(image_abspath, &self.settings.prompt, self.settings.n_predict)
            .await?
            .infer_text()
    }

    fn report_text(&mut self, text: &str) -> Result<()> {
        info!("Generated text ready ({} bytes)", text.len());
        writeln!(self.report, "{}", text)?;
        self.report.flush()?;
        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` folded away, without touching
/// the filesystem. Symlinks are left as they are.
fn resolve_image_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}
