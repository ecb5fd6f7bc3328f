//! Error taxonomy shared across the poll client.
//!
//! Callers branch on the variant: validation failures never reach the
//! network, vote errors roll the session back, and the live sync loop
//! treats every error as transient.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PollError {
    /// Draft rejected before any request was issued
    #[error("invalid poll: {0}")]
    Validation(String),

    /// Poll or choice id unknown to the backend
    #[error("not found: {0}")]
    NotFound(String),

    /// Create or vote attempted without a valid identity
    #[error("authentication required")]
    Unauthorized,

    /// Backend unreachable or response malformed
    #[error("backend error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        PollError::Transport(err.to_string())
    }
}
