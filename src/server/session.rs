use std::{net::SocketAddr, path::PathBuf};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    error::Error,
    framing::FramedStream,
    protocol::{Command, CommandError, DirListing, Reply, INVALID_MARKER},
    server::fs::{EntryKind, Filesystem},
    token::EofToken,
};

/// One client connection: a framed stream with a fresh session token,
/// the session's own working directory, and the filesystem it acts on.
///
/// The working directory lives here and nowhere else, so concurrent
/// sessions never observe each other's `cd`.
pub struct Session<S, F> {
    framed: FramedStream<S>,
    peer: SocketAddr,
    cwd: PathBuf,
    fs: F,
}

impl<S, F> Session<S, F>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Filesystem,
{
    pub fn new(stream: S, peer: SocketAddr, root: PathBuf, fs: F) -> Self {
        Self {
            framed: FramedStream::new(stream, EofToken::generate()),
            peer,
            cwd: root,
            fs,
        }
    }

    /// Drive the session to completion: announce the token, send the
    /// opening listing, then answer commands until `exit` or a transport
    /// failure.
    pub async fn run(mut self) -> Result<(), Error> {
        info!("session opened for {}", self.peer);
        debug!("{}: token {}", self.peer, self.framed.token());

        self.framed.send_token().await?;

        let opening = self.listing_reply().await;
        self.send_reply(&opening).await?;

        loop {
            let line = self.framed.recv().await?;

            let step = match Command::try_from(&line[..]) {
                Ok(command) => {
                    debug!("{}: {}", self.peer, command);
                    self.dispatch(command).await?
                }
                Err(refused) => {
                    debug!("{}: refused: {}", self.peer, refused);
                    Some(Reply::Failure(refused.to_string()))
                }
            };

            match step {
                Some(reply) => self.send_reply(&reply).await?,
                None => break,
            }
        }

        self.framed.shutdown().await?;
        info!("session closed for {}", self.peer);

        Ok(())
    }

    /// Run one command. `None` means `exit`: no reply, close the
    /// session. Anything the command refuses becomes a failure reply;
    /// anything it changes is reflected in the fresh listing.
    async fn dispatch(&mut self, command: Command) -> Result<Option<Reply>, Error> {
        let outcome = match command {
            Command::Cd(path) => self.change_dir(&path).await,
            Command::Mkdir(name) => self.make_dir(&name).await,
            Command::Rm(name) => self.remove(&name).await,
            Command::Ul(name) => self.receive_file(&name).await?,
            Command::Dl(name) => self.send_file(&name).await?,
            Command::Exit => return Ok(None),
        };

        Ok(Some(match outcome {
            Ok(()) => self.listing_reply().await,
            Err(refused) => {
                debug!("{}: refused: {}", self.peer, refused);
                Reply::Failure(refused.to_string())
            }
        }))
    }

    async fn send_reply(&mut self, reply: &Reply) -> Result<(), Error> {
        self.framed.send(&Bytes::from(reply)).await
    }

    /// Render the working directory. A listing failure is a refusal,
    /// not the end of the session.
    async fn listing_reply(&mut self) -> Reply {
        match self.fs.list_dir(&self.cwd).await {
            Ok((dirs, files)) => {
                Reply::Listing(DirListing::new(self.cwd.clone(), dirs, files).to_string())
            }
            Err(err) => {
                warn!("{}: cannot list {}: {}", self.peer, self.cwd.display(), err);
                let shown = self.cwd.display().to_string();
                Reply::Failure(CommandError::io(err, &shown).to_string())
            }
        }
    }

    async fn change_dir(&mut self, path: &str) -> Result<(), CommandError> {
        let target = self.cwd.join(path);

        let resolved = self
            .fs
            .canonicalize(&target)
            .await
            .map_err(|err| CommandError::io(err, path))?;

        match self.fs.kind_of(&resolved).await {
            Ok(EntryKind::Directory) => {
                self.cwd = resolved;
                Ok(())
            }
            Ok(EntryKind::File) => Err(CommandError::NotDirectory(path.to_owned())),
            Err(err) => Err(CommandError::io(err, path)),
        }
    }

    async fn make_dir(&mut self, name: &str) -> Result<(), CommandError> {
        let target = self.cwd.join(name);

        self.fs
            .create_dir(&target)
            .await
            .map_err(|err| CommandError::io(err, name))
    }

    /// Remove a file or an empty directory. Non-empty directories are
    /// refused by the filesystem.
    async fn remove(&mut self, name: &str) -> Result<(), CommandError> {
        let target = self.cwd.join(name);

        let removal = match self.fs.kind_of(&target).await {
            Ok(EntryKind::File) => self.fs.remove_file(&target).await,
            Ok(EntryKind::Directory) => self.fs.remove_dir(&target).await,
            Err(err) => Err(err),
        };

        removal.map_err(|err| CommandError::io(err, name))
    }

    /// An `ul` line is always followed by one payload frame, so the
    /// frame is consumed before the write is judged; otherwise the two
    /// sides would fall out of step on a refused upload.
    async fn receive_file(&mut self, name: &str) -> Result<Result<(), CommandError>, Error> {
        let content = self.framed.recv().await?;
        debug!("{}: received {} bytes for '{}'", self.peer, content.len(), name);

        let target = self.cwd.join(name);

        Ok(self
            .fs
            .write_file(&target, &content)
            .await
            .map_err(|err| CommandError::io(err, name)))
    }

    /// Send the named file's content as one frame. An unreadable target
    /// still gets its frame, carrying the invalid marker, so the client
    /// always has exactly one payload frame to read before the reply.
    async fn send_file(&mut self, name: &str) -> Result<Result<(), CommandError>, Error> {
        let target = self.cwd.join(name);

        match self.fs.read_file(&target).await {
            Ok(content) => {
                debug!("{}: sending {} bytes of '{}'", self.peer, content.len(), name);
                self.framed.send(&content).await?;
                Ok(Ok(()))
            }
            Err(err) => {
                self.framed.send(INVALID_MARKER).await?;
                Ok(Err(CommandError::io(err, name)))
            }
        }
    }
}
