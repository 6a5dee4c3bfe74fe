// Public API for integration tests and potential library usage

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod protocol;
pub mod recovery;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;
