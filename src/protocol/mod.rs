mod command;
mod listing;
mod reply;

pub use self::{
    command::{Command, CommandError},
    listing::DirListing,
    reply::Reply,
};

/// Sent in place of file content when a download target cannot be read.
pub const INVALID_MARKER: &[u8] = b"invalid";
