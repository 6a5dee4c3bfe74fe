//! Session lifecycle: starting a fresh run, applying host snapshot pushes,
//! recovery after a process restart, and operator timer edits.

use super::AppState;
use crate::clock::spawn_phase_clock;
use crate::config;
use crate::error::ConfigError;
use crate::protocol::ServerMessage;
use crate::recovery::{self, RecoverySnapshot};
use crate::types::{GamePhase, GameState, Session, SessionId, TimerConfig};

impl AppState {
    /// Full authoritative snapshot for one client (connect catch-up) or the
    /// broadcast channel.
    pub async fn snapshot_message(&self) -> ServerMessage {
        let session_id = self.session.read().await.id.clone();
        let game = self.game.read().await;
        ServerMessage::StateSync {
            session_id,
            phase: game.phase,
            question_index: game.question_index,
            time_left: game.time_left,
        }
    }

    /// Push the current snapshot to every connected client and persist the
    /// recovery file. The file write runs detached so it can never stall a
    /// clock tick.
    pub async fn publish_snapshot(&self) {
        let msg = self.snapshot_message().await;
        self.fanout.publish(msg);
        self.persist_snapshot().await;
    }

    pub(crate) async fn persist_snapshot(&self) {
        let Some(path) = self.files().snapshot.clone() else {
            return;
        };
        let snapshot = RecoverySnapshot {
            session: self.session.read().await.clone(),
            state: self.game.read().await.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = recovery::save(&path, &snapshot).await {
                tracing::warn!("Failed to persist recovery snapshot: {}", e);
            }
        });
    }

    /// Explicit operator start: mint a new session, enter READING on the
    /// first question, and hand the countdown to a fresh clock task.
    pub async fn start_game(&self) {
        let session = Session::mint();
        tracing::info!("New game session: {}", session.id);
        *self.session.write().await = session;

        {
            let timers = *self.timers.read().await;
            let mut game = self.game.write().await;
            game.begin(&timers);
        }

        self.start_clock().await;
        self.publish_snapshot().await;
        // Pick up any votes already recorded for the first question.
        self.spawn_resync_current().await;
    }

    /// Back to LOBBY. The previous session's votes stay queryable in the
    /// store; they are just no longer the aggregation target.
    pub async fn reset_game(&self) {
        self.stop_clock().await;
        *self.game.write().await = GameState::new();
        if let Some(path) = &self.files().snapshot {
            recovery::clear(path).await;
        }
        let msg = self.snapshot_message().await;
        self.fanout.publish(msg);
    }

    /// Apply an authoritative snapshot pushed by the host display.
    ///
    /// The coordinator trusts its single host source of truth and performs
    /// no consistency validation beyond the session guard: an update tagged
    /// with a stale session token is rejected with a warning instead of
    /// silently overwriting the live run. Concurrent same-session hosts are
    /// last-writer-wins by design.
    pub async fn apply_host_update(
        &self,
        session_id: Option<SessionId>,
        phase: GamePhase,
        question_index: u32,
        time_left: u32,
    ) -> Result<(), String> {
        if let Some(stale) = session_id {
            let current = self.session.read().await.id.clone();
            if stale != current {
                tracing::warn!(
                    "Rejecting state update from stale session {} (current {})",
                    stale,
                    current
                );
                return Err(format!("state update from stale session {stale}"));
            }
        }

        {
            let mut game = self.game.write().await;
            game.phase = phase;
            game.question_index = question_index;
            game.time_left = time_left;
        }

        // A reloading host may push a mid-run snapshot while no clock is
        // running; a push into LOBBY/FINISHED must tear the countdown down.
        if phase.is_clock_exempt() {
            self.stop_clock().await;
        } else if !self.clock_running().await {
            self.start_clock().await;
        }

        self.publish_snapshot().await;
        Ok(())
    }

    /// Restore the recovery snapshot on startup. Returns whether a mid-run
    /// state was resumed.
    pub async fn restore_from_snapshot(&self) -> bool {
        let Some(path) = &self.files().snapshot else {
            return false;
        };
        let Some(snapshot) = recovery::load(path) else {
            return false;
        };
        if !snapshot.is_resumable() {
            tracing::debug!("Recovery snapshot is not mid-run, starting fresh");
            return false;
        }

        tracing::info!(
            "Resuming session {} in phase {:?} with {}s left",
            snapshot.session.id,
            snapshot.state.phase,
            snapshot.state.time_left
        );
        *self.session.write().await = snapshot.session;
        *self.game.write().await = snapshot.state;

        self.start_clock().await;
        self.publish_snapshot().await;
        self.spawn_resync_current().await;
        true
    }

    /// Validate and apply a timer edit. A malformed edit is rejected as a
    /// whole; the previous configuration stays in force. The new values take
    /// effect on the next phase transition.
    pub async fn set_timers(
        &self,
        reading: i64,
        answering: i64,
        buffer: i64,
        results: i64,
    ) -> Result<TimerConfig, ConfigError> {
        let timers = TimerConfig::try_new(reading, answering, buffer, results)?;
        *self.timers.write().await = timers;

        if let Some(path) = &self.files().timers {
            if let Err(e) = config::save_timer_config(path, &timers).await {
                tracing::warn!("Failed to persist timer config: {}", e);
            }
        }

        self.fanout.publish(ServerMessage::TimersUpdate { timers });
        Ok(timers)
    }

    pub(crate) async fn start_clock(&self) {
        let mut guard = self.clock.lock().await;
        if let Some(old) = guard.take() {
            old.cancel();
        }
        *guard = Some(spawn_phase_clock(self.clone()));
    }

    pub async fn stop_clock(&self) {
        if let Some(old) = self.clock.lock().await.take() {
            old.cancel();
        }
    }

    async fn clock_running(&self) -> bool {
        self.clock
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}
