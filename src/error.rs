//! Error taxonomy for the live session core.
//!
//! Transport drops are deliberately not modeled as errors: a disconnected
//! client simply misses broadcasts until its reconnect catch-up snapshot.

use thiserror::Error;

/// Failures of the durable vote store. Callers on the live path catch these,
/// log, and continue with empty aggregates; the session never halts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] sqlx::Error),
}

/// Failures of local operator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A timer edit with a non-integer or negative value. The edit is
    /// rejected as a whole and the previous config is retained.
    #[error("malformed timer config: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
