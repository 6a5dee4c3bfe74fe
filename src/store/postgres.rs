//! Postgres-backed vote log. One row per vote, append-only; aggregation is a
//! plain GROUP BY so concurrent writers rely on the database's own
//! concurrency control and no application-level locking is needed.

use crate::error::StoreError;
use crate::types::{OptionId, QuestionId, SessionId, VoteCounts};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::VoteStore;

const CREATE_VOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS votes (
    id BIGSERIAL PRIMARY KEY,
    session_id TEXT NOT NULL,
    question_id INT NOT NULL,
    option_id VARCHAR(50) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

pub struct PgVoteStore {
    pool: PgPool,
}

impl PgVoteStore {
    /// Connect and ensure the votes table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query(CREATE_VOTES_TABLE).execute(&pool).await?;
        tracing::info!("Vote store initialized");

        Ok(Self { pool })
    }
}

#[async_trait]
impl VoteStore for PgVoteStore {
    async fn record_vote(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        option_id: &OptionId,
    ) -> Result<VoteCounts, StoreError> {
        sqlx::query("INSERT INTO votes (session_id, question_id, option_id) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(question_id as i32)
            .bind(option_id)
            .execute(&self.pool)
            .await?;

        self.aggregate_votes(session_id, question_id).await
    }

    async fn aggregate_votes(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
    ) -> Result<VoteCounts, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT option_id, COUNT(*) FROM votes \
             WHERE session_id = $1 AND question_id = $2 GROUP BY option_id",
        )
        .bind(session_id)
        .bind(question_id as i32)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = VoteCounts::new();
        for (option_id, count) in rows {
            counts.insert(option_id, count as u32);
        }
        Ok(counts)
    }
}
