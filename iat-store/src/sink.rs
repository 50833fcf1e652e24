use async_trait::async_trait;
use iat_core::TrialResult;
use serde::{Deserialize, Serialize};

/// Value written to a row's `status` column once a test is saved.
pub const STATUS_COMPLETED: &str = "completed";

/// Identity handed over by session bootstrap. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub referrer: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            referrer: referrer.into(),
        }
    }
}

/// Acknowledgement from a sink that a result set was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub user_id: String,
    pub records: usize,
    /// True if an earlier row for the same user was overwritten.
    pub replaced: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Backend rejected the write
    #[error("{0}")]
    Backend(String),

    /// No storage location configured
    #[error("{0}")]
    NotConfigured(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed results store: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persists a finished result set keyed by session. Writes are upserts on
/// `user_id`: saving twice for the same user overwrites.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Sink name, for logs
    fn name(&self) -> &str;

    async fn save_results(
        &self,
        session: &Session,
        results: &[TrialResult],
    ) -> Result<SaveReceipt, SaveError>;
}

/// Sink used when no storage location was given. Every save fails.
pub struct UnconfiguredSink;

pub const UNCONFIGURED_MESSAGE: &str =
    "Results storage is not configured. Pass --results <FILE> to choose where results are saved.";

#[async_trait]
impl ResultSink for UnconfiguredSink {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn save_results(
        &self,
        session: &Session,
        _results: &[TrialResult],
    ) -> Result<SaveReceipt, SaveError> {
        tracing::warn!(user_id = %session.user_id, "Result sink not configured");
        Err(SaveError::NotConfigured(UNCONFIGURED_MESSAGE.to_string()))
    }
}
