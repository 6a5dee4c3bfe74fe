//! Shared application state: the game session coordinator.
//!
//! `AppState` is the single owner of the authoritative snapshot. The phase
//! clock mutates time/phase, vote aggregation mutates the `answers` cache,
//! and everything else only reads. All connected clients observe the state
//! exclusively through the fan-out channel.

mod game;
mod session;
mod votes;

use crate::broadcast::Fanout;
use crate::clock::ClockHandle;
use crate::content::QuestionSet;
use crate::store::VoteStore;
use crate::types::{GameState, Session, TimerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Local files the host process persists to. Either may be absent, which
/// disables that persistence (used by tests and ephemeral runs).
#[derive(Debug, Clone, Default)]
pub struct LocalFiles {
    pub snapshot: Option<PathBuf>,
    pub timers: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub game: Arc<RwLock<GameState>>,
    pub timers: Arc<RwLock<TimerConfig>>,
    pub questions: Arc<QuestionSet>,
    pub store: Arc<dyn VoteStore>,
    pub fanout: Fanout,
    /// At most one live phase clock per process.
    pub(crate) clock: Arc<Mutex<Option<ClockHandle>>>,
    files: Arc<LocalFiles>,
}

impl AppState {
    pub fn new(
        questions: QuestionSet,
        store: Arc<dyn VoteStore>,
        timers: TimerConfig,
        files: LocalFiles,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::mint())),
            game: Arc::new(RwLock::new(GameState::new())),
            timers: Arc::new(RwLock::new(timers)),
            questions: Arc::new(questions),
            store,
            fanout: Fanout::default(),
            clock: Arc::new(Mutex::new(None)),
            files: Arc::new(files),
        }
    }

    pub(crate) fn files(&self) -> &LocalFiles {
        &self.files
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::ServerMessage;
    use crate::store::MemoryVoteStore;
    use crate::types::{GamePhase, VoteCounts};

    pub(crate) fn test_state() -> AppState {
        AppState::new(
            QuestionSet::builtin(),
            Arc::new(MemoryVoteStore::new()),
            TimerConfig::default(),
            LocalFiles::default(),
        )
    }

    #[tokio::test]
    async fn connect_snapshot_reflects_mid_phase_state() {
        let state = test_state();
        {
            let mut game = state.game.write().await;
            game.phase = GamePhase::Answering;
            game.question_index = 2;
            game.time_left = 12;
        }

        match state.snapshot_message().await {
            ServerMessage::StateSync {
                phase,
                question_index,
                time_left,
                ..
            } => {
                assert_eq!(phase, GamePhase::Answering);
                assert_eq!(question_index, 2);
                assert_eq!(time_left, 12);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn stale_session_updates_are_rejected() {
        let state = test_state();
        state.start_game().await;
        state.stop_clock().await;
        let current = state.session.read().await.id.clone();

        let result = state
            .apply_host_update(
                Some("01OLDSESSIONXXXXXXXXXXXXXX".to_string()),
                GamePhase::Answering,
                0,
                10,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(state.game.read().await.phase, GamePhase::Reading);

        // The current session token and an omitted one are both accepted.
        state
            .apply_host_update(Some(current), GamePhase::Answering, 0, 10)
            .await
            .unwrap();
        assert_eq!(state.game.read().await.phase, GamePhase::Answering);

        state
            .apply_host_update(None, GamePhase::Buffer, 0, 5)
            .await
            .unwrap();
        assert_eq!(state.game.read().await.phase, GamePhase::Buffer);

        state.stop_clock().await;
    }

    #[tokio::test]
    async fn host_update_manages_the_clock() {
        let state = test_state();

        // A pushed mid-run snapshot restarts the clock after a host reload.
        state
            .apply_host_update(None, GamePhase::Answering, 1, 12)
            .await
            .unwrap();
        assert!(state.clock.lock().await.is_some());

        // Pushing a clock-exempt phase tears it down.
        state
            .apply_host_update(None, GamePhase::Lobby, 0, 0)
            .await
            .unwrap();
        assert!(state.clock.lock().await.is_none());
    }

    #[tokio::test]
    async fn restore_honors_only_mid_run_snapshots() {
        use crate::recovery::{self, RecoverySnapshot};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_state.json");

        let mut mid_run = GameState::new();
        mid_run.phase = GamePhase::Answering;
        mid_run.question_index = 3;
        mid_run.time_left = 12;
        let session = Session::mint();
        recovery::save(
            &path,
            &RecoverySnapshot {
                session: session.clone(),
                state: mid_run.clone(),
            },
        )
        .await
        .unwrap();

        let state = AppState::new(
            QuestionSet::builtin(),
            Arc::new(MemoryVoteStore::new()),
            TimerConfig::default(),
            LocalFiles {
                snapshot: Some(path.clone()),
                timers: None,
            },
        );
        assert!(state.restore_from_snapshot().await);
        assert_eq!(state.session.read().await.id, session.id);
        assert_eq!(*state.game.read().await, mid_run);
        assert!(state.clock.lock().await.is_some());
        state.stop_clock().await;

        // A LOBBY snapshot starts fresh instead.
        let mut lobby = mid_run;
        lobby.phase = GamePhase::Lobby;
        recovery::save(&path, &RecoverySnapshot { session, state: lobby })
            .await
            .unwrap();
        let state = AppState::new(
            QuestionSet::builtin(),
            Arc::new(MemoryVoteStore::new()),
            TimerConfig::default(),
            LocalFiles {
                snapshot: Some(path),
                timers: None,
            },
        );
        assert!(!state.restore_from_snapshot().await);
        assert_eq!(state.game.read().await.phase, GamePhase::Lobby);
    }

    #[tokio::test]
    async fn malformed_timer_edit_retains_previous_config() {
        let state = test_state();

        let err = state.set_timers(5, -3, 10, 20).await.unwrap_err();
        assert!(err.to_string().contains("non-negative"));
        assert_eq!(*state.timers.read().await, TimerConfig::default());

        state.set_timers(3, 30, 5, 15).await.unwrap();
        assert_eq!(state.timers.read().await.answering, 30);
    }

    #[tokio::test]
    async fn vote_updates_answers_cache_for_current_question_only() {
        let state = test_state();
        state.start_game().await;
        state.stop_clock().await;

        // Current question is index 0 (id 1).
        let counts = state.record_vote(1, "opt2".to_string()).await;
        assert_eq!(counts.get("opt2"), Some(&1));
        assert_eq!(state.game.read().await.answers.get("opt2"), Some(&1));

        // A vote for a different question never pollutes the live tally.
        let mut expected = VoteCounts::new();
        expected.insert("opt2".to_string(), 1);
        state.record_vote(5, "opt4".to_string()).await;
        assert_eq!(state.game.read().await.answers, expected);
    }

    #[tokio::test]
    async fn reset_returns_to_lobby_and_stops_the_clock() {
        let state = test_state();
        state.start_game().await;
        assert!(state.clock.lock().await.is_some());

        state.reset_game().await;
        assert!(state.clock.lock().await.is_none());
        let game = state.game.read().await;
        assert_eq!(game.phase, GamePhase::Lobby);
        assert_eq!(game.question_index, 0);
        assert!(game.answers.is_empty());
    }
}
