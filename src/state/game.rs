//! Tick handling: the phase clock calls into here once per second.

use super::AppState;
use crate::types::{GamePhase, Step};

impl AppState {
    /// Advance the state machine by one second and perform the resulting
    /// side effects. Returns whether the clock should keep running.
    ///
    /// Broadcast policy: a full snapshot on every phase transition, plus the
    /// 5-second cadence while counting down. Broadcasting every tick is
    /// deliberately avoided to bound network traffic; players interpolate
    /// the countdown locally between syncs.
    pub async fn tick(&self) -> bool {
        let timers = *self.timers.read().await;
        let question_count = self.questions.len();
        let step = self.game.write().await.step(&timers, question_count);

        match step {
            Step::Idle => false,
            Step::Counted { sync_due } => {
                if sync_due {
                    self.publish_snapshot().await;
                }
                true
            }
            Step::Entered(phase) => {
                tracing::debug!("Phase transition -> {:?}", phase);
                self.publish_snapshot().await;
                if phase == GamePhase::Reading {
                    // Fresh question: recover any votes already in the store.
                    self.spawn_resync_current().await;
                }
                !phase.is_clock_exempt()
            }
        }
    }

    /// Detached aggregate resync for the current question, so persistence
    /// latency never blocks the timer loop.
    pub(crate) async fn spawn_resync_current(&self) {
        let index = self.game.read().await.question_index;
        let Some(question_id) = self.questions.question_id(index) else {
            return;
        };
        let state = self.clone();
        tokio::spawn(async move {
            state.resync_votes(question_id).await;
        });
    }
}
