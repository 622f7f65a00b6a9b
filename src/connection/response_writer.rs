//! The once-guarded terminal write path of a connection.
//!
//! Serialize → write → shutdown happens in exactly one place, whether the
//! handler answered synchronously or through a deferred handle. The writer is
//! shared by `Arc`: every scheduled continuation and every outstanding
//! [`ResponseHandle`] keeps the connection alive, and the socket is torn down
//! when the last reference drops.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::SinkExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;

use crate::codec::ResponseEncoder;
use crate::protocol::{HttpError, Response, SendError};

/// Debug counter of live connections.
static LIVE_SESSIONS: AtomicUsize = AtomicUsize::new(0);

/// Number of connections currently alive (including deferred ones).
pub fn live_sessions() -> usize {
    LIVE_SESSIONS.load(Ordering::Relaxed)
}

/// Write half of a connection, erased over the concrete transport.
#[async_trait]
trait ResponseSink: Send {
    async fn send_response(&mut self, response: Response) -> Result<(), SendError>;
    async fn shutdown_transport(&mut self) -> io::Result<()>;
}

#[async_trait]
impl<W> ResponseSink for FramedWrite<W, ResponseEncoder>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_response(&mut self, response: Response) -> Result<(), SendError> {
        self.send(response).await
    }

    async fn shutdown_transport(&mut self) -> io::Result<()> {
        self.get_mut().shutdown().await
    }
}

pub struct ResponseWriter {
    sink: Mutex<Option<Box<dyn ResponseSink>>>,
}

impl ResponseWriter {
    pub(crate) fn new<W>(framed: FramedWrite<W, ResponseEncoder>) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        LIVE_SESSIONS.fetch_add(1, Ordering::Relaxed);
        Self { sink: Mutex::new(Some(Box::new(framed))) }
    }

    /// A writer whose connection is already gone, e.g. after a failed server
    /// handshake. Any `finish` against it fails with the already-finished
    /// error.
    pub(crate) fn closed() -> Self {
        LIVE_SESSIONS.fetch_add(1, Ordering::Relaxed);
        Self { sink: Mutex::new(None) }
    }

    /// Serializes and writes the response, then shuts the transport down
    /// regardless of the write outcome. Valid at most once per connection.
    pub async fn finish(&self, response: Response) -> Result<(), HttpError> {
        let mut sink = self.sink.lock().await.take().ok_or(SendError::AlreadyFinished)?;
        let sent = sink.send_response(response).await;
        // shutdown is best-effort, non-fatal
        let _ = sink.shutdown_transport().await;
        sent.map_err(HttpError::from)
    }

    /// Shuts the transport down without writing anything.
    pub(crate) async fn close(&self) {
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.shutdown_transport().await;
        }
    }
}

impl Drop for ResponseWriter {
    fn drop(&mut self) {
        LIVE_SESSIONS.fetch_sub(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter").finish_non_exhaustive()
    }
}

/// Handed to every handler invocation; taking a [`ResponseHandle`] from it is
/// how a handler that returned `false` finishes the exchange later.
#[derive(Debug)]
pub struct DeferredResponse {
    writer: Arc<ResponseWriter>,
}

impl DeferredResponse {
    pub(crate) fn new(writer: Arc<ResponseWriter>) -> Self {
        Self { writer }
    }

    /// A handle that keeps the connection alive until `finish` is called.
    pub fn handle(&self) -> ResponseHandle {
        ResponseHandle { writer: Arc::clone(&self.writer) }
    }
}

/// Keeps a deferred connection alive; exposes exactly one terminal operation.
#[derive(Debug, Clone)]
pub struct ResponseHandle {
    writer: Arc<ResponseWriter>,
}

impl ResponseHandle {
    /// Performs the serialize/write/shutdown sequence. A second call, whether
    /// from this handle, a clone, or after the handler already answered, fails
    /// with [`SendError::AlreadyFinished`].
    pub async fn finish(&self, response: Response) -> Result<(), HttpError> {
        self.writer.finish(response).await
    }
}
