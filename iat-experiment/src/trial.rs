use iat_core::{Stimulus, TrialState};

/// The trial in flight: one stimulus shown until answered correctly.
#[derive(Debug, Clone)]
pub struct Trial<T> {
    /// 1-based position within the block.
    pub number: usize,
    pub stimulus: Stimulus,
    /// Stimulus onset; reaction time is measured from here.
    pub started_at: T,
    pub state: TrialState,
    /// Wrong presses so far.
    pub mistakes: u32,
}

impl<T> Trial<T> {
    pub fn new(number: usize, stimulus: Stimulus, started_at: T) -> Self {
        Self {
            number,
            stimulus,
            started_at,
            state: TrialState::AwaitingResponse,
            mistakes: 0,
        }
    }

    /// Mistake flag: has the subject already erred on this stimulus.
    pub fn has_mistake(&self) -> bool {
        self.state == TrialState::AwaitingCorrection
    }

    pub fn record_mistake(&mut self) {
        self.state = TrialState::AwaitingCorrection;
        self.mistakes += 1;
    }
}
