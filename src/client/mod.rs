pub mod error;
mod session;

pub use self::session::RemoteSession;
