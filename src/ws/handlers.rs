//! WebSocket message dispatch
//!
//! Authorization is checked here, then each message is routed to the state
//! coordinator. Most handlers return `None`: the resulting broadcast reaches
//! the sender through the fan-out channel like everyone else.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::Role;
use std::sync::Arc;

/// Macro to check host authorization and return early if unauthorized
macro_rules! check_host {
    ($role:expr, $action:expr) => {
        if *$role != Role::Host {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only host can {}", $action),
            });
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Player messages
        ClientMessage::PlayerVote {
            question_id,
            option_id,
        } => {
            tracing::debug!("Vote for question {}: {}", question_id, option_id);
            state.record_vote(question_id, option_id).await;
            None
        }

        // Host-only commands (authorization checked before dispatch)
        ClientMessage::HostStartGame => {
            check_host!(role, "start the game");
            state.start_game().await;
            None
        }

        ClientMessage::HostUpdateState {
            session_id,
            phase,
            question_index,
            time_left,
        } => {
            check_host!(role, "update game state");
            match state
                .apply_host_update(session_id, phase, question_index, time_left)
                .await
            {
                Ok(()) => None,
                Err(msg) => Some(ServerMessage::Error {
                    code: "STALE_SESSION".to_string(),
                    msg,
                }),
            }
        }

        ClientMessage::HostRequestVotes { question_id } => {
            check_host!(role, "request vote tallies");
            state.resync_votes(question_id).await;
            None
        }

        ClientMessage::HostSetTimers {
            reading,
            answering,
            buffer,
            results,
        } => {
            check_host!(role, "edit timers");
            match state.set_timers(reading, answering, buffer, results).await {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::Error {
                    code: "MALFORMED_CONFIG".to_string(),
                    msg: e.to_string(),
                }),
            }
        }

        ClientMessage::HostResetGame => {
            check_host!(role, "reset the game");
            state.reset_game().await;
            None
        }
    }
}
