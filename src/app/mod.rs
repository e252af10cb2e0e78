pub mod fsm;
mod orchestrator;

pub use fsm::{LoopEvent, LoopState, LoopStateMachine};
pub use orchestrator::{LoopSettings, Orchestrator, RunSummary};

use crate::{
    Result,
    capture::open_source,
    config::Config,
    rpc::UnixSocketClient,
    speech::{PiperSpeech, SpeechOutput},
};
use tracing::info;

/// Validates the configuration, wires the real collaborators together and
/// runs the control loop.
pub async fn run(config: Config) -> Result<RunSummary> {
    config.validate()?;

    let speech: Option<Box<dyn SpeechOutput>> = if config.use_tts {
        info!("Initializing TTS...");
        let speech = PiperSpeech::new(&config.speech);
        speech.ensure_voice_model();
        Some(Box::new(speech))
    } else {
        None
    };

    let client = UnixSocketClient::new(config.socket_path.clone(), &config.rpc);
    let source = open_source(&config)?;

    let mut orchestrator =
        Orchestrator::new(Box::new(client), source, LoopSettings::from(&config));
    if let Some(speech) = speech {
        orchestrator = orchestrator.with_speech(speech);
    }

    orchestrator.run().await
}
