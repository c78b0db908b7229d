use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Failure talking to the remote authority.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RemoteError {
    #[error("no active session")]
    SessionRequired,
    #[error("transport failure: {message}")]
    Transport { message: String },
    #[error("authority rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response: {message}")]
    Decode { message: String },
}

impl RemoteError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Transport { .. } => true,
            RemoteError::Rejected { status, .. } => *status >= 500,
            RemoteError::SessionRequired | RemoteError::Decode { .. } => false,
        }
    }
}
