//! Wire protocol for the real-time channel.
//!
//! Messages are internally tagged with `t`; payload fields use camelCase to
//! match what the host and player frontends send (`questionIndex`,
//! `timeLeft`, `optionId`).

use crate::types::{GamePhase, OptionId, QuestionId, SessionId, TimerConfig, VoteCounts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Mint a new session and start the phase clock.
    HostStartGame,
    /// Authoritative snapshot pushed by the host display, e.g. after a
    /// reload restored its local recovery state. Updates carrying a stale
    /// `sessionId` are rejected; omitting it is accepted for compatibility.
    #[serde(rename_all = "camelCase")]
    HostUpdateState {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        phase: GamePhase,
        question_index: u32,
        time_left: u32,
    },
    /// Explicit aggregate resync for one question.
    #[serde(rename_all = "camelCase")]
    HostRequestVotes { question_id: QuestionId },
    /// Replace the timer configuration (settings form). Values are validated
    /// server-side; a malformed edit is rejected as a whole.
    HostSetTimers {
        reading: i64,
        answering: i64,
        buffer: i64,
        results: i64,
    },
    /// Back to LOBBY: cancel the clock and drop the recovery snapshot.
    HostResetGame,
    /// Cast one vote for the current question.
    #[serde(rename_all = "camelCase")]
    PlayerVote {
        question_id: QuestionId,
        option_id: OptionId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full authoritative snapshot. Sent to a newly connected client and
    /// broadcast on every phase transition plus the 5-second cadence.
    #[serde(rename_all = "camelCase")]
    StateSync {
        session_id: SessionId,
        phase: GamePhase,
        question_index: u32,
        time_left: u32,
    },
    /// Live tally for the current question, sent to all parties whenever
    /// votes change or are resynced. The payload is the flattened
    /// optionId -> count map.
    HostVotesUpdate {
        #[serde(flatten)]
        counts: VoteCounts,
    },
    /// Broadcast after a successful timer edit.
    TimersUpdate { timers: TimerConfig },
    Error { code: String, msg: String },
}
