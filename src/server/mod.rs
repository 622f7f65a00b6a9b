//! The acceptor loop.
//!
//! [`Server`] binds a listener and hands every accepted connection to a
//! spawned task, so the next accept is issued before per-connection setup
//! finishes and connections are served concurrently. With a `TlsAcceptor`
//! configured, the server-side handshake runs before the session starts; a
//! handshake failure invokes the handler once with the error and discards the
//! connection.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, trace, warn};

use crate::connection::{DeferredResponse, HttpConnection, ResponseWriter};
use crate::handler::Handler;
use crate::protocol::{HttpError, Response};
use crate::transport::Stream;

pub struct Server<H> {
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    handler: Arc<H>,
}

impl<H: Handler> Server<H> {
    /// Binds a plain HTTP server.
    pub async fn bind(addr: impl ToSocketAddrs, handler: Arc<H>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, tls: None, handler })
    }

    /// Switches accepted connections to TLS using the given acceptor.
    /// Certificate and key loading stays with the caller.
    pub fn with_tls(mut self, acceptor: TlsAcceptor) -> Self {
        self.tls = Some(acceptor);
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop forever.
    pub async fn run(self) -> io::Result<()> {
        info!(addr = ?self.listener.local_addr(), tls = self.tls.is_some(), "server listening");
        loop {
            let (tcp, remote_addr) = match self.listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };
            trace!(%remote_addr, "accepted connection");

            let tls = self.tls.clone();
            let handler = Arc::clone(&self.handler);
            // spawn before touching the connection so the next accept is
            // already pending while this one handshakes and parses
            tokio::spawn(async move {
                serve_connection(tcp, tls, handler).await;
            });
        }
    }
}

async fn serve_connection<H: Handler>(tcp: TcpStream, tls: Option<TlsAcceptor>, handler: Arc<H>) {
    let stream = match tls {
        Some(acceptor) => match acceptor.accept(tcp).await {
            Ok(tls_stream) => Stream::from(tls_stream),
            Err(e) => {
                let e = HttpError::handshake(e);
                error!(cause = %e, "server handshake failed, discarding connection");
                let deferred = DeferredResponse::new(Arc::new(ResponseWriter::closed()));
                let mut response = Response::new();
                let _ = handler.call(Err(&e), &mut response, &deferred).await;
                return;
            }
        },
        None => Stream::Plain(tcp),
    };

    match HttpConnection::new(stream, handler).process().await {
        Ok(()) => trace!("connection finished"),
        Err(e) => error!(cause = %e, "connection failed"),
    }
}
