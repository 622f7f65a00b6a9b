use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{split, AsyncRead, AsyncWrite, ReadHalf};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::codec::{MessageDecoder, MessageKind, ResponseEncoder};
use crate::connection::ResponseWriter;
use crate::protocol::{Message, ParseError};

/// Fixed read buffer size per connection
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// One established connection plus its in-flight parse state.
///
/// A session owns its transport exclusively: the read half drives the
/// [`MessageDecoder`] through a `FramedRead`, the write half lives inside a
/// shared [`ResponseWriter`] so deferred handles can outlive the read loop.
/// The server side parses requests, the client pipeline reuses the same
/// machinery with [`MessageKind::Response`].
#[derive(Debug)]
pub struct Session<S> {
    framed_read: FramedRead<ReadHalf<S>, MessageDecoder>,
    writer: Arc<ResponseWriter>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S, kind: MessageKind) -> Self {
        let (reader, writer) = split(stream);
        Self {
            framed_read: FramedRead::with_capacity(reader, MessageDecoder::new(kind), READ_BUFFER_SIZE),
            writer: Arc::new(ResponseWriter::new(FramedWrite::new(writer, ResponseEncoder::new()))),
        }
    }

    /// Reads until one complete message is parsed.
    ///
    /// `Ok(None)` is the zero-byte clean disconnect: the peer closed before
    /// sending anything. End of stream (or the transport's short-read
    /// equivalent) finalizes a close-terminated body through the decoder; a
    /// stream ending mid-message surfaces as a bad-message error.
    pub async fn read_message(&mut self) -> Result<Option<Message>, ParseError> {
        match self.framed_read.next().await {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// Total bytes received on this connection.
    pub fn bytes_received(&self) -> u64 {
        self.framed_read.decoder().bytes_received()
    }

    /// Shared write path for this connection.
    pub fn writer(&self) -> Arc<ResponseWriter> {
        Arc::clone(&self.writer)
    }

    /// Shuts the transport down without writing a response.
    pub async fn close(self) {
        self.writer.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn reads_one_request_from_a_duplex_peer() {
        let (client, server) = tokio::io::duplex(1024);
        let mut session = Session::new(server, MessageKind::Request);

        let mut client = client;
        client.write_all(b"GET /hello HTTP/1.0\r\nHost: test\r\n\r\n").await.unwrap();
        drop(client);

        let message = session.read_message().await.expect("read failed").expect("no message");
        assert_eq!(message.method(), "GET");
        assert_eq!(message.target(), "/hello");
        assert_eq!(message.headers().get("host"), Some("test"));
        assert!(session.bytes_received() > 0);
    }

    #[tokio::test]
    async fn zero_byte_disconnect_is_not_an_error() {
        let (client, server) = tokio::io::duplex(64);
        let mut session = Session::new(server, MessageKind::Request);
        drop(client);

        let message = session.read_message().await.expect("clean disconnect");
        assert!(message.is_none());
        assert_eq!(session.bytes_received(), 0);
    }

    #[tokio::test]
    async fn truncated_request_surfaces_a_bad_message() {
        let (client, server) = tokio::io::duplex(64);
        let mut session = Session::new(server, MessageKind::Request);

        let mut client = client;
        client.write_all(b"GET / HTTP/1.0\r\nHost: unfini").await.unwrap();
        drop(client);

        let err = session.read_message().await.unwrap_err();
        assert!(matches!(err, ParseError::BadMessage { .. }));
    }
}
