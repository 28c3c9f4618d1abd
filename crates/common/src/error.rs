//! Unified error type for the polls server.

use thiserror::Error;

/// All variants carry plain strings and the enum is `Clone`, so a single
/// refresh outcome can be delivered to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Upstream fetch failed: {0}")]
    Upstream(String),

    #[error("Malformed feed response: {0}")]
    Malformed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}
