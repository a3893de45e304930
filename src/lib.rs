#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

/// Client side
pub mod client;
mod error;
/// Token-delimited message framing
pub mod framing;
/// Protocol implementation
pub mod protocol;
/// Server side
pub mod server;
mod token;

pub use error::Error;
pub use token::{EofToken, TOKEN_LEN};
