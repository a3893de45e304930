use bytes::Bytes;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, ToSocketAddrs},
};

use super::error::Error;
use crate::{
    framing::{read_token, FramedStream},
    protocol::{Command, Reply},
    token::EofToken,
};

/// Client end of a session.
///
/// Construction performs the handshake: the server's unframed token
/// announcement is adopted for all subsequent framing, and the opening
/// listing of the server's root comes back alongside the session.
/// Every command method returns the fresh working-directory listing the
/// server sends after the command takes effect; a refusal surfaces as
/// [`Error::Refused`] with the server's reason.
pub struct RemoteSession<S> {
    framed: FramedStream<S>,
}

impl RemoteSession<TcpStream> {
    /// Connect over TCP and perform the handshake.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<(Self, String), Error> {
        let stream = TcpStream::connect(addr).await?;
        Self::handshake(stream).await
    }
}

impl<S> RemoteSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Adopt the server's token from `stream`, then read the opening
    /// listing.
    pub async fn handshake(mut stream: S) -> Result<(Self, String), Error> {
        let token = read_token(&mut stream)
            .await
            .map_err(|err| Error::Handshake(err.to_string()))?;
        debug!("adopted session token {}", token);

        let mut session = Self {
            framed: FramedStream::new(stream, token),
        };
        let listing = session.recv_listing().await?;

        Ok((session, listing))
    }

    /// The token adopted from the server's announcement.
    pub fn token(&self) -> &EofToken {
        self.framed.token()
    }

    async fn send_command(&mut self, command: &Command) -> Result<(), Error> {
        self.framed.send(command.to_string().as_bytes()).await?;
        Ok(())
    }

    async fn recv_reply(&mut self) -> Result<Reply, Error> {
        let frame = self.framed.recv().await?;
        Reply::try_from(&frame[..]).map_err(|_| Error::UnexpectedReply)
    }

    async fn recv_listing(&mut self) -> Result<String, Error> {
        match self.recv_reply().await? {
            Reply::Listing(listing) => Ok(listing),
            Reply::Failure(reason) => Err(Error::Refused(reason)),
        }
    }

    async fn round_trip(&mut self, command: Command) -> Result<String, Error> {
        self.send_command(&command).await?;
        self.recv_listing().await
    }

    /// `cd`: move this session's working directory on the server.
    pub async fn change_dir(&mut self, path: impl Into<String>) -> Result<String, Error> {
        self.round_trip(Command::Cd(path.into())).await
    }

    /// `mkdir`: create a directory under the working directory.
    pub async fn make_dir(&mut self, name: impl Into<String>) -> Result<String, Error> {
        self.round_trip(Command::Mkdir(name.into())).await
    }

    /// `rm`: remove a file or an empty directory.
    pub async fn remove(&mut self, name: impl Into<String>) -> Result<String, Error> {
        self.round_trip(Command::Rm(name.into())).await
    }

    /// `ul`: store `content` under `name` in the server's working
    /// directory. The content frame follows the command line
    /// unconditionally, mirroring what the server expects.
    pub async fn upload(
        &mut self,
        name: impl Into<String>,
        content: &[u8],
    ) -> Result<String, Error> {
        self.send_command(&Command::Ul(name.into())).await?;
        self.framed.send(content).await?;
        self.recv_listing().await
    }

    /// `dl`: fetch the named file's content along with the listing that
    /// follows it. On a refused download the payload frame carries the
    /// invalid marker and is discarded here; the refusal reason from
    /// the reply is what comes back.
    pub async fn download(&mut self, name: impl Into<String>) -> Result<(Bytes, String), Error> {
        self.send_command(&Command::Dl(name.into())).await?;

        let content = self.framed.recv().await?;

        match self.recv_reply().await? {
            Reply::Listing(listing) => Ok((content, listing)),
            Reply::Failure(reason) => Err(Error::Refused(reason)),
        }
    }

    /// `exit`: ask the server to close this session, then shut the
    /// stream down. No reply is expected.
    pub async fn exit(mut self) -> Result<(), Error> {
        self.send_command(&Command::Exit).await?;
        self.framed.shutdown().await?;

        Ok(())
    }
}
