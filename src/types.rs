use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type OptionId = String;
pub type QuestionId = u32;

/// Per-option vote counts for one question within one session.
/// Options with zero votes are absent, not zero-valued entries.
pub type VoteCounts = HashMap<OptionId, u32>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Reading,
    Answering,
    Buffer,
    Results,
    Finished,
}

impl GamePhase {
    /// LOBBY and FINISHED carry no countdown; the phase clock must not run there.
    pub fn is_clock_exempt(&self) -> bool {
        matches!(self, GamePhase::Lobby | GamePhase::Finished)
    }
}

/// One live quiz run. Minted on host_start_game, scopes all votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub created_at: String,
}

impl Session {
    pub fn mint() -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Durations in seconds for each timed phase. Edits take effect on the
/// next phase transition, never retroactively on an in-progress one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub struct TimerConfig {
    pub reading: u32,
    pub answering: u32,
    pub buffer: u32,
    pub results: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            reading: 5,
            answering: 20,
            buffer: 10,
            results: 20,
        }
    }
}

impl TimerConfig {
    /// Validate raw operator input. Rejects the whole edit on any negative
    /// value so a bad form submission never partially applies.
    pub fn try_new(reading: i64, answering: i64, buffer: i64, results: i64) -> Result<Self, ConfigError> {
        let field = |name: &str, value: i64| -> Result<u32, ConfigError> {
            u32::try_from(value)
                .map_err(|_| ConfigError::Malformed(format!("{name} must be a non-negative integer, got {value}")))
        };
        Ok(Self {
            reading: field("READING", reading)?,
            answering: field("ANSWERING", answering)?,
            buffer: field("BUFFER", buffer)?,
            results: field("RESULTS", results)?,
        })
    }
}

/// Outcome of one clock tick against the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Phase is clock-exempt; nothing happened.
    Idle,
    /// Countdown decremented. `sync_due` marks the 5-second broadcast cadence.
    Counted { sync_due: bool },
    /// The countdown hit zero and exactly one transition was performed.
    Entered(GamePhase),
}

/// The authoritative snapshot. Mutated only by the phase clock (time/phase)
/// and by vote-aggregation events (`answers`). `answers` is a cache of the
/// vote store's aggregate for the current question, not a source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub phase: GamePhase,
    pub question_index: u32,
    pub time_left: u32,
    pub answers: VoteCounts,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Lobby,
            question_index: 0,
            time_left: 0,
            answers: VoteCounts::new(),
        }
    }

    /// Explicit operator start: LOBBY -> READING on question 0 with a clean tally.
    pub fn begin(&mut self, timers: &TimerConfig) {
        self.phase = GamePhase::Reading;
        self.question_index = 0;
        self.time_left = timers.reading;
        self.answers.clear();
    }

    /// Advance the countdown by one second. When `time_left` reaches zero this
    /// performs exactly one phase transition and reloads the countdown from
    /// `timers`, so config edits only apply from the next transition onward.
    pub fn step(&mut self, timers: &TimerConfig, question_count: usize) -> Step {
        if self.phase.is_clock_exempt() {
            return Step::Idle;
        }

        if self.time_left > 0 {
            self.time_left -= 1;
        }
        if self.time_left > 0 {
            return Step::Counted {
                sync_due: self.time_left % 5 == 0,
            };
        }

        match self.phase {
            GamePhase::Reading => {
                self.phase = GamePhase::Answering;
                self.time_left = timers.answering;
            }
            GamePhase::Answering => {
                self.phase = GamePhase::Buffer;
                self.time_left = timers.buffer;
            }
            GamePhase::Buffer => {
                self.phase = GamePhase::Results;
                self.time_left = timers.results;
            }
            GamePhase::Results => {
                let next_index = self.question_index + 1;
                self.answers.clear();
                if (next_index as usize) < question_count {
                    self.question_index = next_index;
                    self.phase = GamePhase::Reading;
                    self.time_left = timers.reading;
                } else {
                    self.phase = GamePhase::Finished;
                    self.time_left = 0;
                }
            }
            GamePhase::Lobby | GamePhase::Finished => unreachable!("clock-exempt phases return early"),
        }

        Step::Entered(self.phase)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection role. The host display drives the clock; players only vote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Player,
}
