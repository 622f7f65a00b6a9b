use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, trace};

use crate::codec::MessageKind;
use crate::connection::{DeferredResponse, Session};
use crate::handler::Handler;
use crate::protocol::{HttpError, Response};

/// Server-side dispatch for one connection.
///
/// Drives the session read loop, classifies the outcome and invokes the
/// application handler exactly once:
///
/// - parsed request → handler gets `(Ok(request), response, deferred)`; a
///   `true` result writes the response and shuts the connection down, a
///   `false` result leaves the connection alive only through an outstanding
///   deferred handle
/// - parse or transport failure → handler gets the error, its result is
///   ignored, the connection closes
/// - zero-byte disconnect → the handler is never invoked
pub struct HttpConnection<S, H> {
    session: Session<S>,
    handler: Arc<H>,
}

impl<S, H> HttpConnection<S, H>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>) -> Self {
        Self { session: Session::new(stream, MessageKind::Request), handler }
    }

    pub async fn process(self) -> Result<(), HttpError> {
        let Self { mut session, handler } = self;
        let writer = session.writer();

        match session.read_message().await {
            Ok(Some(request)) => {
                let deferred = DeferredResponse::new(Arc::clone(&writer));
                let mut response = Response::new();
                if handler.call(Ok(&request), &mut response, &deferred).await {
                    writer.finish(response).await?;
                } else {
                    trace!("handler deferred, connection stays alive through its handle");
                }
                Ok(())
            }
            Ok(None) => {
                trace!("connection closed before any bytes arrived");
                writer.close().await;
                Ok(())
            }
            Err(e) => {
                let e = HttpError::from(e);
                error!(cause = %e, "failed to read request");
                let deferred = DeferredResponse::new(Arc::clone(&writer));
                let mut response = Response::new();
                let _ = handler.call(Err(&e), &mut response, &deferred).await;
                writer.close().await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::{SendError, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn read_to_end(mut stream: tokio::io::DuplexStream) -> String {
        let mut out = Vec::new();
        let _ = stream.read_to_end(&mut out).await;
        String::from_utf8_lossy(&out).into_owned()
    }

    #[tokio::test]
    async fn immediate_response_is_written_and_connection_closed() {
        let (mut client, server) = tokio::io::duplex(4096);
        let handler = Arc::new(make_handler(|request, response, _deferred| {
            let request = request.expect("expected a parsed request");
            assert_eq!(request.target(), "/greet");
            response.set_body("hello");
            true
        }));

        let task = tokio::spawn(HttpConnection::new(server, handler).process());
        client.write_all(b"GET /greet HTTP/1.0\r\nHost: t\r\n\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let wire = read_to_end(client).await;
        assert!(wire.starts_with("HTTP/1.0 200 OK\r\n"), "got: {wire}");
        assert!(wire.contains("Content-Length: 5\r\n"));
        assert!(wire.contains("Content-Type: text/html\r\n"));
        assert!(wire.ends_with("hello"));
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn deferred_response_finishes_later_exactly_once() {
        let (mut client, server) = tokio::io::duplex(4096);
        let (handle_tx, mut handle_rx) = tokio::sync::mpsc::unbounded_channel();
        let handler = Arc::new(make_handler(move |_request, _response, deferred: &DeferredResponse| {
            handle_tx.send(deferred.handle()).unwrap();
            false
        }));

        let task = tokio::spawn(HttpConnection::new(server, handler).process());
        client.write_all(b"GET /later HTTP/1.0\r\n\r\n").await.unwrap();
        client.shutdown().await.unwrap();
        task.await.unwrap().unwrap();

        // the connection outlived the read loop; finish it now
        let handle = handle_rx.recv().await.unwrap();
        let mut response = Response::new();
        response.set_status(StatusCode::ACCEPTED);
        response.set_body("queued");
        handle.finish(response).await.expect("first finish");

        let wire = read_to_end(client).await;
        assert!(wire.starts_with("HTTP/1.0 202 Accepted\r\n"), "got: {wire}");
        assert!(wire.ends_with("queued"));

        // a second finish must fail loudly, not silently no-op
        let err = handle.finish(Response::new()).await.unwrap_err();
        assert!(matches!(err, HttpError::Send { source: SendError::AlreadyFinished }));
    }

    #[tokio::test]
    async fn zero_byte_connection_never_reaches_the_handler() {
        let (client, server) = tokio::io::duplex(64);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = Arc::new(make_handler(move |_request, _response, _deferred| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        }));

        drop(client);
        HttpConnection::new(server, handler).process().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_request_invokes_handler_once_with_bad_message() {
        let (mut client, server) = tokio::io::duplex(1024);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = Arc::new(make_handler(move |request: Result<&crate::protocol::Message, &HttpError>, _response, _deferred| {
            assert!(request.is_err_and(HttpError::is_bad_message));
            seen.fetch_add(1, Ordering::SeqCst);
            true // ignored on the error path
        }));

        let task = tokio::spawn(HttpConnection::new(server, handler).process());
        client.write_all(b"this is not http\r\n\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        assert!(task.await.unwrap().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // nothing was written back
        let wire = read_to_end(client).await;
        assert!(wire.is_empty());
    }
}
