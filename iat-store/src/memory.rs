use std::collections::HashMap;

use async_trait::async_trait;
use iat_core::TrialResult;
use parking_lot::RwLock;

use crate::json_file::StoredRow;
use crate::sink::{ResultSink, SaveError, SaveReceipt, Session};

/// In-memory upsert table. Counts every call, and can be set up to fail
/// with a fixed message.
#[derive(Default)]
pub struct MemorySink {
    rows: RwLock<HashMap<String, StoredRow>>,
    calls: RwLock<Vec<usize>>,
    failure: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every save fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of `save_results` invocations, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Result-list length passed on each invocation, in call order.
    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.read().clone()
    }

    pub fn row(&self, user_id: &str) -> Option<StoredRow> {
        self.rows.read().get(user_id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save_results(
        &self,
        session: &Session,
        results: &[TrialResult],
    ) -> Result<SaveReceipt, SaveError> {
        self.calls.write().push(results.len());

        if let Some(message) = &self.failure {
            return Err(SaveError::Backend(message.clone()));
        }

        let replaced = self
            .rows
            .write()
            .insert(session.user_id.clone(), StoredRow::completed(session, results))
            .is_some();

        Ok(SaveReceipt {
            user_id: session.user_id.clone(),
            records: results.len(),
            replaced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iat_core::Category;

    fn result(stimulus_id: &str) -> TrialResult {
        TrialResult {
            block_id: 1,
            stimulus_id: stimulus_id.into(),
            category: Category::Russian,
            is_correct: true,
            reaction_time_ms: 640.0,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_same_user() {
        let sink = MemorySink::new();
        let session = Session::new("user-1", "https://example.org/");

        let first = sink
            .save_results(&session, &[result("rus_0")])
            .await
            .unwrap();
        assert!(!first.replaced);

        let second = sink
            .save_results(&session, &[result("rus_1"), result("rus_2")])
            .await
            .unwrap();
        assert!(second.replaced);
        assert_eq!(second.records, 2);

        assert_eq!(sink.row_count(), 1);
        let row = sink.row("user-1").unwrap();
        assert_eq!(row.results.len(), 2);
        assert_eq!(row.status, "completed");
        assert_eq!(row.referrer, "https://example.org/");
        assert_eq!(sink.call_sizes(), vec![1, 2]);
    }

    #[tokio::test]
    async fn failing_sink_stores_nothing() {
        let sink = MemorySink::failing("database unreachable");
        let err = sink
            .save_results(&Session::new("u", ""), &[result("rus_0")])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "database unreachable");
        assert_eq!(sink.row_count(), 0);
        assert_eq!(sink.call_count(), 1);
    }
}
