//! Local recovery snapshot for the host process. The serialized state is
//! written after every broadcast-worthy mutation and restored on startup,
//! but only honored when it captures a run in progress (neither LOBBY nor
//! FINISHED).

use crate::types::{GamePhase, GameState, Session};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySnapshot {
    pub session: Session,
    pub state: GameState,
}

impl RecoverySnapshot {
    /// A snapshot is only worth restoring mid-run; LOBBY and FINISHED start fresh.
    pub fn is_resumable(&self) -> bool {
        !matches!(self.state.phase, GamePhase::Lobby | GamePhase::Finished)
    }
}

pub async fn save(path: &Path, snapshot: &RecoverySnapshot) -> std::io::Result<()> {
    let json = serde_json::to_vec(snapshot).map_err(std::io::Error::other)?;
    tokio::fs::write(path, json).await
}

/// Read the snapshot at startup. Absent or malformed files yield `None`.
pub fn load(path: &Path) -> Option<RecoverySnapshot> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read recovery snapshot {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!("Ignoring malformed recovery snapshot {}: {}", path.display(), e);
            None
        }
    }
}

pub async fn clear(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to clear recovery snapshot {}: {}", path.display(), e);
        }
    }
}
