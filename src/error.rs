use std::io;
use thiserror::Error;

/// Transport-level failures. Any of these ends the session that hit it;
/// none of them outlives that session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    IO(String),
    #[error("Unexpected EOF on stream")]
    UnexpectedEof,
    #[error("Malformed delimiter token")]
    MalformedToken,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::IO(err.to_string()),
        }
    }
}
