use std::io;
use thiserror::Error;

use crate::error;

/// Enum for client errors
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The server refused a command; carries the reason from the
    /// failure reply
    #[error("{0}")]
    Refused(String),
    /// Any errors related to I/O
    #[error("I/O: {0}")]
    IO(String),
    /// The session-opening token announcement was missing or malformed
    #[error("Handshake: {0}")]
    Handshake(String),
    /// A reply frame that could not be decoded
    #[error("Unexpected reply")]
    UnexpectedReply,
    /// Transport-level failure underneath the session
    #[error("{0}")]
    Transport(String),
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::IO(error.to_string())
    }
}

impl From<error::Error> for Error {
    fn from(error: error::Error) -> Self {
        Self::Transport(error.to_string())
    }
}
