//! The per-session phase clock: a cancellable 1 Hz task that drives the
//! state machine. At most one handle is live per process; starting a new
//! session or resetting cancels the previous task deterministically.

use crate::state::AppState;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct ClockHandle {
    task: JoinHandle<()>,
}

impl ClockHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the countdown task. It ticks once per second until the state
/// machine reports a clock-exempt phase, then exits on its own. Vote
/// resyncs and snapshot writes triggered by a tick are spawned separately
/// so a slow store can never stall phase advancement.
pub fn spawn_phase_clock(state: AppState) -> ClockHandle {
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick resolves immediately; consume it so the countdown
        // starts a full second after the phase began.
        interval.tick().await;

        loop {
            interval.tick().await;
            if !state.tick().await {
                break;
            }
        }
        tracing::debug!("Phase clock stopped");
    });

    ClockHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use crate::types::GamePhase;

    #[tokio::test(start_paused = true)]
    async fn clock_task_advances_phases_in_virtual_time() {
        let state = test_state();
        state.start_game().await;
        {
            // READING lasts 5s with the default config.
            let game = state.game.read().await;
            assert_eq!(game.phase, GamePhase::Reading);
            assert_eq!(game.time_left, 5);
        }

        tokio::time::sleep(Duration::from_secs(6)).await;

        let game = state.game.read().await;
        assert_eq!(game.phase, GamePhase::Answering);
        assert!(game.time_left <= 20);

        state.stop_clock().await;
    }

    #[tokio::test(start_paused = true)]
    async fn starting_a_new_game_replaces_the_old_clock() {
        let state = test_state();
        state.start_game().await;
        let first = state.session.read().await.id.clone();

        state.start_game().await;
        let second = state.session.read().await.id.clone();
        assert_ne!(first, second);

        // Exactly one clock is live; six virtual seconds advance the phase
        // once, not twice.
        tokio::time::sleep(Duration::from_secs(6)).await;
        let phase = state.game.read().await.phase;
        assert_eq!(phase, GamePhase::Answering);

        state.stop_clock().await;
    }
}
