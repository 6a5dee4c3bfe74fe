//! Durable append-only vote log plus aggregation, keyed by session and
//! question. Votes are never mutated or removed; counting is idempotent with
//! respect to re-aggregation, which is what makes at-least-once broadcast
//! delivery acceptable upstream.

mod postgres;

pub use postgres::PgVoteStore;

use crate::error::StoreError;
use crate::types::{OptionId, QuestionId, SessionId, VoteCounts};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Durably append one vote, then return the fresh aggregate for that
    /// question. On failure the vote must be treated as not recorded.
    async fn record_vote(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<VoteCounts, StoreError>;

    /// Group all recorded votes for `(session, question)` by option.
    async fn aggregate_votes(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<VoteCounts, StoreError>;
}

/// Degraded mode when no DATABASE_URL is configured: every operation is an
/// explicit no-op returning empty counts. The live display synchronization
/// keeps working; only persistence is lost.
pub struct DisabledVoteStore;

#[async_trait]
impl VoteStore for DisabledVoteStore {
    async fn record_vote(
        &self,
        _session_id: &SessionId,
        _question_id: QuestionId,
        _option_id: &OptionId,
    ) -> Result<VoteCounts, StoreError> {
        tracing::debug!("Vote not saved - no vote store configured");
        Ok(VoteCounts::new())
    }

    async fn aggregate_votes(
        &self,
        _session_id: &SessionId,
        _question_id: QuestionId,
    ) -> Result<VoteCounts, StoreError> {
        Ok(VoteCounts::new())
    }
}

#[derive(Debug, Clone)]
struct VoteRow {
    session_id: SessionId,
    question_id: QuestionId,
    option_id: OptionId,
    #[allow(dead_code)]
    created_at: String,
}

/// In-memory append-only store. Backs the test suite and ephemeral runs
/// where durability across restarts is not needed.
#[derive(Default)]
pub struct MemoryVoteStore {
    rows: RwLock<Vec<VoteRow>>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn aggregate(&self, session_id: &SessionId, question_id: QuestionId) -> VoteCounts {
        let rows = self.rows.read().await;
        let mut counts = VoteCounts::new();
        for row in rows.iter() {
            if row.session_id == *session_id && row.question_id == question_id {
                *counts.entry(row.option_id.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn record_vote(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<VoteCounts, StoreError> {
        {
            let mut rows = self.rows.write().await;
            rows.push(VoteRow {
                session_id: session_id.clone(),
                question_id,
                option_id: option_id.clone(),
                created_at: chrono::Utc::now().to_rfc3339(),
            });
        }
        Ok(self.aggregate(session_id, question_id).await)
    }

    async fn aggregate_votes(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<VoteCounts, StoreError> {
        Ok(self.aggregate(session_id, question_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_sum_to_recorded_votes_partitioned_by_option() {
        let store = MemoryVoteStore::new();
        let session = "session-a".to_string();

        for option in ["opt1", "opt1", "opt2", "opt3", "opt1"] {
            store
                .record_vote(&session, 1, &option.to_string())
                .await
                .unwrap();
        }

        let counts = store.aggregate_votes(&session, 1).await.unwrap();
        assert_eq!(counts.get("opt1"), Some(&3));
        assert_eq!(counts.get("opt2"), Some(&1));
        assert_eq!(counts.get("opt3"), Some(&1));
        // Zero-vote options are absent, not zero-valued.
        assert_eq!(counts.get("opt4"), None);
        assert_eq!(counts.values().sum::<u32>(), 5);
    }

    #[tokio::test]
    async fn aggregates_are_scoped_by_session_and_question() {
        let store = MemoryVoteStore::new();
        let a = "session-a".to_string();
        let b = "session-b".to_string();

        store.record_vote(&a, 1, &"opt1".to_string()).await.unwrap();
        store.record_vote(&a, 2, &"opt2".to_string()).await.unwrap();
        store.record_vote(&b, 1, &"opt3".to_string()).await.unwrap();

        let counts = store.aggregate_votes(&b, 1).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("opt3"), Some(&1));

        let counts = store.aggregate_votes(&a, 1).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("opt1"), Some(&1));
    }

    #[tokio::test]
    async fn record_returns_the_fresh_aggregate() {
        let store = MemoryVoteStore::new();
        let session = "session-a".to_string();

        let counts = store.record_vote(&session, 7, &"opt2".to_string()).await.unwrap();
        assert_eq!(counts.get("opt2"), Some(&1));

        let counts = store.record_vote(&session, 7, &"opt2".to_string()).await.unwrap();
        assert_eq!(counts.get("opt2"), Some(&2));
    }

    #[tokio::test]
    async fn concurrent_writers_lose_no_votes() {
        use std::sync::Arc;

        let store = Arc::new(MemoryVoteStore::new());
        let session = "session-a".to_string();

        let mut tasks = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            let session = session.clone();
            tasks.push(tokio::spawn(async move {
                let option = format!("opt{}", (i % 4) + 1);
                store.record_vote(&session, 1, &option).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let counts = store.aggregate_votes(&session, 1).await.unwrap();
        assert_eq!(counts.values().sum::<u32>(), 50);
    }

    #[tokio::test]
    async fn disabled_store_is_an_explicit_noop() {
        let store = DisabledVoteStore;
        let session = "session-a".to_string();

        let counts = store.record_vote(&session, 1, &"opt1".to_string()).await.unwrap();
        assert!(counts.is_empty());
        let counts = store.aggregate_votes(&session, 1).await.unwrap();
        assert!(counts.is_empty());
    }
}
