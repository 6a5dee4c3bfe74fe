//! Process configuration from environment variables and local persistence
//! of the operator's timer configuration.

use crate::error::ConfigError;
use crate::types::TimerConfig;
use std::path::{Path, PathBuf};

/// Server settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Absent means degraded mode: votes are not persisted.
    pub database_url: Option<String>,
    /// Optional JSON question deck overriding the built-in one.
    pub questions_path: Option<PathBuf>,
    pub timers_path: PathBuf,
    pub snapshot_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring malformed PORT value: {}", raw);
                3000
            }),
            Err(_) => 3000,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set - votes will not be persisted");
        }

        let questions_path = std::env::var("QUESTIONS_PATH").ok().map(PathBuf::from);
        let timers_path = std::env::var("TIMERS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("timers.json"));
        let snapshot_path = std::env::var("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("game_state.json"));

        Self {
            port,
            database_url,
            questions_path,
            timers_path,
            snapshot_path,
        }
    }
}

/// Load the operator timer configuration, defaulting to the built-in values
/// when the file is absent or malformed. A bad file never takes down the
/// session; it just loses the customization.
pub fn load_timer_config(path: &Path) -> TimerConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return TimerConfig::default(),
        Err(e) => {
            tracing::warn!("Failed to read timer config {}: {}", path.display(), e);
            return TimerConfig::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring malformed timer config {}: {}", path.display(), e);
            TimerConfig::default()
        }
    }
}

pub async fn save_timer_config(path: &Path, config: &TimerConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_vec(config).map_err(|e| ConfigError::Malformed(e.to_string()))?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    async fn timer_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");

        let config = TimerConfig {
            reading: 3,
            answering: 30,
            buffer: 5,
            results: 15,
        };
        save_timer_config(&path, &config).await.unwrap();

        assert_eq!(load_timer_config(&path), config);

        // The persisted keys match the frontend's settings form.
        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["READING"], 3);
        assert_eq!(json["RESULTS"], 15);
    }

    #[test]
    fn absent_or_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");
        assert_eq!(load_timer_config(&path), TimerConfig::default());

        std::fs::write(&path, r#"{"READING": "soon"}"#).unwrap();
        assert_eq!(load_timer_config(&path), TimerConfig::default());
    }

    #[test]
    #[serial]
    fn server_config_defaults() {
        std::env::remove_var("PORT");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("QUESTIONS_PATH");
        std::env::remove_var("TIMERS_PATH");
        std::env::remove_var("SNAPSHOT_PATH");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert!(config.questions_path.is_none());
        assert_eq!(config.timers_path, PathBuf::from("timers.json"));
        assert_eq!(config.snapshot_path, PathBuf::from("game_state.json"));
    }

    #[test]
    #[serial]
    fn server_config_reads_env_overrides() {
        std::env::set_var("PORT", "8080");
        std::env::set_var("DATABASE_URL", "postgres://localhost/quiz");
        std::env::set_var("TIMERS_PATH", "/tmp/t.json");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/quiz"));
        assert_eq!(config.timers_path, PathBuf::from("/tmp/t.json"));

        std::env::remove_var("PORT");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("TIMERS_PATH");
    }
}
