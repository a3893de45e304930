use bytes::Bytes;

/// Failure replies carry this prefix so the client can tell a refusal
/// apart from a listing; listings always open with `Current Directory:`.
const FAILURE_PREFIX: &str = "error: ";

/// Per-command response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A rendered [`DirListing`](super::DirListing); the command took
    /// effect (or was `cd`-like and changed nothing to list).
    Listing(String),
    /// The command was refused for the carried reason; server state is
    /// unchanged and the session stays open.
    Failure(String),
}

impl From<&Reply> for Bytes {
    fn from(reply: &Reply) -> Self {
        match reply {
            Reply::Listing(text) => Bytes::copy_from_slice(text.as_bytes()),
            Reply::Failure(reason) => Bytes::from(format!("{FAILURE_PREFIX}{reason}")),
        }
    }
}

impl TryFrom<&[u8]> for Reply {
    type Error = std::str::Utf8Error;

    fn try_from(frame: &[u8]) -> Result<Self, Self::Error> {
        let text = std::str::from_utf8(frame)?;

        Ok(match text.strip_prefix(FAILURE_PREFIX) {
            Some(reason) => Self::Failure(reason.to_owned()),
            None => Self::Listing(text.to_owned()),
        })
    }
}
