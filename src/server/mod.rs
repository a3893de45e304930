mod fs;
mod session;

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use tokio::net::{TcpListener, ToSocketAddrs};

pub use self::{
    fs::{EntryKind, Filesystem, LocalFs},
    session::Session,
};

use crate::error::Error;

/// Accepts connections and spawns one [`Session`] task per client.
pub struct Server<F = LocalFs> {
    listener: TcpListener,
    root: PathBuf,
    fs: F,
}

impl Server<LocalFs> {
    /// Bind to `addr`, serving `root` from the local filesystem.
    pub async fn bind(addr: impl ToSocketAddrs, root: impl AsRef<Path>) -> Result<Self, Error> {
        Self::bind_with(addr, root, LocalFs).await
    }
}

impl<F> Server<F>
where
    F: Filesystem + Clone + Send + Sync + 'static,
{
    /// Bind with a custom [`Filesystem`]. The root must exist; it is
    /// resolved up front so every session starts from the same absolute
    /// path.
    pub async fn bind_with(
        addr: impl ToSocketAddrs,
        root: impl AsRef<Path>,
        fs: F,
    ) -> Result<Self, Error> {
        let root = fs.canonicalize(root.as_ref()).await?;
        let listener = TcpListener::bind(addr).await?;

        Ok(Self { listener, root, fs })
    }

    /// The address actually bound, for callers binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Each connection gets its own task, its own token,
    /// and its own working directory starting at the server root.
    pub async fn serve(self) -> Result<(), Error> {
        info!(
            "serving {} on {}",
            self.root.display(),
            self.listener.local_addr()?
        );

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!("accept failed: {}", err);
                    continue;
                }
            };

            let session = Session::new(stream, peer, self.root.clone(), self.fs.clone());

            tokio::spawn(async move {
                if let Err(err) = session.run().await {
                    warn!("session for {} ended: {}", peer, err);
                }
            });
        }
    }
}
