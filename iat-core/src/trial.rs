use serde::{Deserialize, Serialize};

use crate::Category;

/// Per-trial response state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    /// Stimulus shown, no key pressed yet.
    AwaitingResponse,
    /// At least one wrong press; the subject must still answer correctly.
    AwaitingCorrection,
}

/// Recorded result per completed trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub block_id: u32,
    pub stimulus_id: String,
    pub category: Category,
    /// False if any wrong press preceded the correct one.
    pub is_correct: bool,
    /// Stimulus onset to correct press, mistake dwell included.
    pub reaction_time_ms: f64,
    /// Wall clock, milliseconds since the Unix epoch.
    pub timestamp: i64,
}
