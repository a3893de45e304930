use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    error::Error,
    token::{EofToken, TOKEN_LEN},
};

/// Read size of each chunk pulled off the stream.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Read the unframed token announcement that opens a session. The token
/// has a fixed wire length, so an exact read needs no delimiter and
/// cannot swallow bytes of the framed message that follows it.
pub async fn read_token<S>(stream: &mut S) -> Result<EofToken, Error>
where
    S: AsyncRead + Unpin,
{
    let mut raw = [0; TOKEN_LEN];
    stream.read_exact(&mut raw).await?;

    EofToken::try_from(raw.as_slice())
}

/// Token-delimited message transport over a duplex byte stream.
///
/// Sending appends the session token to the payload; receiving
/// accumulates chunks until the token shows up and strips it. Bytes that
/// arrive beyond a message boundary are kept for the next receive, so two
/// messages coalesced by the network into one read are still returned one
/// at a time.
pub struct FramedStream<S> {
    stream: S,
    token: EofToken,
    residual: BytesMut,
    // Windows of `residual` starting before this offset are known not to
    // match the token, so a rescan after a short read skips them.
    scanned: usize,
    buffer_size: usize,
}

impl<S> FramedStream<S> {
    pub fn new(stream: S, token: EofToken) -> Self {
        Self::with_buffer_size(stream, token, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(stream: S, token: EofToken, buffer_size: usize) -> Self {
        Self {
            stream,
            token,
            residual: BytesMut::new(),
            scanned: 0,
            buffer_size,
        }
    }

    pub fn token(&self) -> &EofToken {
        &self.token
    }

    /// Split the first complete message off the front of `residual`.
    fn pop_message(&mut self) -> Option<Bytes> {
        let delimiter = self.token.as_bytes();
        if self.residual.len() < delimiter.len() {
            return None;
        }

        match self.residual[..]
            .windows(delimiter.len())
            .skip(self.scanned)
            .position(|window| window == delimiter)
        {
            Some(found) => {
                let at = self.scanned + found;
                let mut message = self.residual.split_to(at + delimiter.len());
                message.truncate(at);
                self.scanned = 0;
                Some(message.freeze())
            }
            None => {
                self.scanned = self.residual.len() - delimiter.len() + 1;
                None
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> FramedStream<S> {
    /// Write one framed message: the payload followed by the session
    /// token. The writes land in order, which is all the receiver needs.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.stream.write_all(payload).await?;
        self.stream.write_all(self.token.as_bytes()).await?;
        self.stream.flush().await?;

        Ok(())
    }

    /// Announce the session token itself, unframed. Counterpart of
    /// [`read_token`]; only valid as the first bytes of a session.
    pub async fn send_token(&mut self) -> Result<(), Error> {
        self.stream.write_all(self.token.as_bytes()).await?;
        self.stream.flush().await?;

        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), Error> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

impl<S: AsyncRead + Unpin> FramedStream<S> {
    /// Read one framed message, stripped of its trailing token.
    ///
    /// A peer that closes the stream before the token arrives is a fatal
    /// transport error, never retried. A token split across two reads is
    /// still found, since the scan runs over the accumulated bytes rather
    /// than the newest chunk alone.
    pub async fn recv(&mut self) -> Result<Bytes, Error> {
        let mut chunk = vec![0; self.buffer_size];

        loop {
            if let Some(message) = self.pop_message() {
                return Ok(message);
            }

            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::UnexpectedEof);
            }

            self.residual.extend_from_slice(&chunk[..n]);
        }
    }
}

#[cfg(test)]
mod test_framing {
    use super::*;

    fn token() -> EofToken {
        EofToken::try_from(b"<aB3dE9fZ>".as_slice()).unwrap()
    }

    fn pair(
        buffer_size: usize,
    ) -> (FramedStream<tokio::io::DuplexStream>, FramedStream<tokio::io::DuplexStream>) {
        let (a, b) = tokio::io::duplex(64 * 1024);
        (
            FramedStream::with_buffer_size(a, token(), buffer_size),
            FramedStream::with_buffer_size(b, token(), buffer_size),
        )
    }

    async fn roundtrip(payload: &[u8], buffer_size: usize) -> Bytes {
        let (mut tx, mut rx) = pair(buffer_size);
        tx.send(payload).await.unwrap();
        rx.recv().await.unwrap()
    }

    #[tokio::test]
    async fn test_roundtrip_short_text() {
        let got = roundtrip(b"mkdir out", DEFAULT_BUFFER_SIZE).await;
        assert_eq!(&got[..], b"mkdir out");
    }

    #[tokio::test]
    async fn test_roundtrip_empty_payload() {
        let got = roundtrip(b"", DEFAULT_BUFFER_SIZE).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_roundtrip_spans_many_chunks() {
        let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let got = roundtrip(&payload, 256).await;
        assert_eq!(&got[..], &payload[..]);
    }

    // A buffer smaller than the token forces the delimiter across chunk
    // boundaries; the scan over accumulated bytes must still find it.
    #[tokio::test]
    async fn test_token_split_across_chunks() {
        let got = roundtrip(b"hello", 4).await;
        assert_eq!(&got[..], b"hello");
    }

    #[tokio::test]
    async fn test_payload_of_token_alphabet_bytes() {
        let payload = b"<Zf9Ed3Ba><aB3dE9fz>aB3dE9fZ<>";
        let got = roundtrip(payload, 8).await;
        assert_eq!(&got[..], payload);
    }

    #[tokio::test]
    async fn test_binary_payload() {
        let payload: Vec<u8> = (0..=255).collect();
        let got = roundtrip(&payload, 16).await;
        assert_eq!(&got[..], &payload[..]);
    }

    // Two messages sent before the first receive coalesce into one read;
    // they must still come out as two messages.
    #[tokio::test]
    async fn test_coalesced_messages_split_apart() {
        let (mut tx, mut rx) = pair(DEFAULT_BUFFER_SIZE);

        tx.send(b"first").await.unwrap();
        tx.send(b"second").await.unwrap();

        assert_eq!(&rx.recv().await.unwrap()[..], b"first");
        assert_eq!(&rx.recv().await.unwrap()[..], b"second");
    }

    #[tokio::test]
    async fn test_peer_close_before_token_is_fatal() {
        let (a, b) = tokio::io::duplex(64);
        let mut rx = FramedStream::new(b, token());

        {
            let mut raw = a;
            raw.write_all(b"partial message").await.unwrap();
        }

        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_token_handshake() {
        let (a, mut b) = tokio::io::duplex(64);
        let mut server = FramedStream::new(a, token());

        server.send_token().await.unwrap();
        server.send(b"greetings").await.unwrap();

        let seen = read_token(&mut b).await.unwrap();
        assert_eq!(seen, token());

        let mut client = FramedStream::new(b, seen);
        assert_eq!(&client.recv().await.unwrap()[..], b"greetings");
    }

    #[tokio::test]
    async fn test_garbage_token_refused() {
        let (a, mut b) = tokio::io::duplex(64);
        let mut raw = a;
        raw.write_all(b"0123456789").await.unwrap();

        let err = read_token(&mut b).await.unwrap_err();
        assert!(matches!(err, Error::MalformedToken));
    }
}
