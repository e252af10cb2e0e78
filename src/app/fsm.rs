use crate::{Error, Result};
use tracing::{debug, info, warn};

// Control loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Idle,
    Capturing,
    ClearingCache,
    Inferring,
    Reporting,
    Speaking,
    Done,
    Error,
}

// Control loop events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Initialized,
    CaptureStarted,
    ImageCaptured,
    QuitRequested,
    CacheCleared,
    InferenceCompleted,
    SpeechRequested,
    /// Cycle over, go back for another image.
    CycleCompleted,
    /// Cycle over, no more images.
    Finished,
    Failed,
}

pub struct LoopStateMachine {
    state: LoopState,
    cycles: usize,
}

impl Default for LoopStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopStateMachine {
    pub fn new() -> Self {
        Self {
            state: LoopState::Init,
            cycles: 0,
        }
    }

    pub fn current_state(&self) -> LoopState {
        self.state
    }

    /// Number of cycles that reached the end of reporting.
    pub fn completed_cycles(&self) -> usize {
        self.cycles
    }

    pub fn transition(&mut self, event: LoopEvent) -> Result<LoopState> {
        let old_state = self.state;
        debug!("FSM processing event {:?} in state {:?}", event, old_state);

        let new_state = match (old_state, event) {
            (LoopState::Init, LoopEvent::Initialized) => LoopState::Idle,
            (LoopState::Idle, LoopEvent::CaptureStarted) => LoopState::Capturing,
            (LoopState::Capturing, LoopEvent::ImageCaptured) => LoopState::ClearingCache,
            (LoopState::Capturing, LoopEvent::QuitRequested) => LoopState::Done,
            (LoopState::ClearingCache, LoopEvent::CacheCleared) => LoopState::Inferring,
            (LoopState::Inferring, LoopEvent::InferenceCompleted) => LoopState::Reporting,
            (LoopState::Reporting, LoopEvent::SpeechRequested) => LoopState::Speaking,
            (LoopState::Reporting | LoopState::Speaking, LoopEvent::CycleCompleted) => {
                LoopState::Idle
            }
            (LoopState::Reporting | LoopState::Speaking, LoopEvent::Finished) => LoopState::Done,
            (state, LoopEvent::Failed) if !Self::is_terminal_state(state) => LoopState::Error,
            _ => {
                warn!(
                    "Invalid FSM transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(Error::fsm(format!(
                    "Invalid transition from {:?} with event {:?}",
                    old_state, event
                )));
            }
        };

        if matches!(event, LoopEvent::CycleCompleted | LoopEvent::Finished) {
            self.cycles += 1;
        }

        info!(
            "FSM state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        Ok(new_state)
    }

    pub fn is_terminal(&self) -> bool {
        Self::is_terminal_state(self.state)
    }

    fn is_terminal_state(state: LoopState) -> bool {
        matches!(state, LoopState::Done | LoopState::Error)
    }
}
