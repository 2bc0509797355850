use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("invalid sync endpoint '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The connection closed or failed. Terminal for the session.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}
