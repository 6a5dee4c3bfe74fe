//! Vote recording and aggregate resync. Store failures degrade to empty
//! tallies; the live session never halts over persistence.

use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::{OptionId, QuestionId, VoteCounts};

impl AppState {
    /// Record one player vote against the current session, then broadcast
    /// the fresh aggregate to all connected parties. A store failure leaves
    /// the vote unrecorded and broadcasts an empty tally instead.
    pub async fn record_vote(&self, question_id: QuestionId, option_id: OptionId) -> VoteCounts {
        let session_id = self.session.read().await.id.clone();
        let counts = match self
            .store
            .record_vote(&session_id, question_id, &option_id)
            .await
        {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!("Error processing vote for question {}: {}", question_id, e);
                VoteCounts::new()
            }
        };

        self.publish_votes(question_id, counts.clone()).await;
        counts
    }

    /// Explicit aggregate resync, issued when entering READING for a
    /// question or by a host catching up after a reconnect. Idempotent:
    /// with no intervening votes, repeated calls broadcast identical counts.
    pub async fn resync_votes(&self, question_id: QuestionId) -> VoteCounts {
        let session_id = self.session.read().await.id.clone();
        let counts = match self.store.aggregate_votes(&session_id, question_id).await {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!("Error fetching votes for question {}: {}", question_id, e);
                VoteCounts::new()
            }
        };

        self.publish_votes(question_id, counts.clone()).await;
        counts
    }

    /// Refresh the `answers` cache when the counts concern the question
    /// currently on screen, then fan the tally out to everyone.
    async fn publish_votes(&self, question_id: QuestionId, counts: VoteCounts) {
        {
            let mut game = self.game.write().await;
            if self.questions.question_id(game.question_index) == Some(question_id) {
                game.answers = counts.clone();
            }
        }
        self.fanout.publish(ServerMessage::HostVotesUpdate { counts });
    }
}
