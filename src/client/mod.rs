//! The client request pipeline.
//!
//! [`AsyncHttpClient`] runs resolve → connect → handshake → write → read/parse
//! for one request; every step is gated on the previous one succeeding and
//! any failure short-circuits. The response side reuses the session machinery;
//! a client session only reads, it never auto-writes. [`HttpClient`] is the
//! synchronous convenience wrapper around a dedicated current-thread runtime.

use tokio::io::AsyncWriteExt;
use tracing::trace;

use crate::codec::MessageKind;
use crate::connection::Session;
use crate::protocol::{HttpError, Message, ParseError, SendError};
use crate::transport;
use crate::uri::Uri;

#[derive(Debug, Clone)]
pub struct AsyncHttpClient {
    uri: Uri,
}

impl AsyncHttpClient {
    pub fn new(uri: Uri) -> Self {
        Self { uri }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.uri = uri;
    }

    pub async fn get(&self) -> Result<Message, HttpError> {
        self.request("GET", None).await
    }

    pub async fn post(&self, body: &[u8], content_type: &str) -> Result<Message, HttpError> {
        self.request("POST", Some((body, content_type))).await
    }

    /// Callback flavor of [`get`](Self::get): invoked exactly once, with the
    /// parsed response or an empty message plus the error.
    pub async fn get_with<F>(&self, callback: F)
    where
        F: FnOnce(&Uri, Message, Option<HttpError>),
    {
        match self.get().await {
            Ok(message) => callback(&self.uri, message, None),
            Err(e) => callback(&self.uri, Message::new(), Some(e)),
        }
    }

    /// Callback flavor of [`post`](Self::post).
    pub async fn post_with<F>(&self, body: &[u8], content_type: &str, callback: F)
    where
        F: FnOnce(&Uri, Message, Option<HttpError>),
    {
        match self.post(body, content_type).await {
            Ok(message) => callback(&self.uri, message, None),
            Err(e) => callback(&self.uri, Message::new(), Some(e)),
        }
    }

    async fn request(&self, method: &str, payload: Option<(&[u8], &str)>) -> Result<Message, HttpError> {
        let mut stream = transport::connect(&self.uri).await?;
        trace!(method, uri = %self.uri, "connected, writing request");

        let request = build_request(&self.uri, method, payload);
        stream.write_all(&request).await.map_err(SendError::io)?;
        stream.flush().await.map_err(SendError::io)?;

        let mut session = Session::new(stream, MessageKind::Response);
        let result = session.read_message().await;
        session.close().await;
        match result {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(ParseError::bad_message("connection closed before any response bytes").into()),
            Err(e) => Err(e.into()),
        }
    }
}

fn build_request(uri: &Uri, method: &str, payload: Option<(&[u8], &str)>) -> Vec<u8> {
    let mut head = format!("{} {} HTTP/1.0\r\n", method, uri.request_target());
    head.push_str(&format!("Host: {}\r\n", uri.host()));
    head.push_str("Accept: */*\r\n");
    if let Some((body, content_type)) = payload {
        head.push_str(&format!("Content-Type: {}\r\n", content_type));
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");

    let mut request = head.into_bytes();
    if let Some((body, _)) = payload {
        request.extend_from_slice(body);
    }
    request
}

/// Synchronous wrapper driving a dedicated event loop until the single
/// asynchronous result arrives.
#[derive(Debug)]
pub struct HttpClient {
    client: AsyncHttpClient,
    runtime: tokio::runtime::Runtime,
}

impl HttpClient {
    pub fn new(uri: Uri) -> Result<Self, HttpError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self { client: AsyncHttpClient::new(uri), runtime })
    }

    pub fn uri(&self) -> &Uri {
        self.client.uri()
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.client.set_uri(uri);
    }

    /// Blocks until the response arrives or a pipeline step fails.
    pub fn get(&self) -> Result<Message, HttpError> {
        self.runtime.block_on(self.client.get())
    }

    pub fn post(&self, body: &[u8], content_type: &str) -> Result<Message, HttpError> {
        self.runtime.block_on(self.client.post(body, content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::{Response, StatusCode};
    use crate::server::Server;
    use std::net::SocketAddr;
    use std::sync::Arc;

    fn echo_handler() -> Arc<impl crate::handler::Handler> {
        Arc::new(make_handler(|request: Result<&Message, &HttpError>, response: &mut Response, _deferred| {
            let request = request.expect("parsed request");
            match request.method() {
                "POST" => {
                    response.set_status(StatusCode::CREATED);
                    response.set_content_type(request.content_type().unwrap_or("text/plain"));
                    response.set_body(request.body().to_vec());
                }
                _ => {
                    response.set_content_type("text/plain");
                    response.set_body(format!("GET {}", request.target()));
                }
            }
            true
        }))
    }

    async fn spawn_echo_server() -> SocketAddr {
        let server = Server::bind("127.0.0.1:0", echo_handler()).await.expect("bind failed");
        let addr = server.local_addr().expect("local addr");
        tokio::spawn(server.run());
        addr
    }

    fn uri_for(addr: SocketAddr, path: &str) -> Uri {
        format!("http://{addr}{path}").parse().expect("uri parses")
    }

    #[tokio::test]
    async fn get_round_trips_through_a_live_server() {
        let addr = spawn_echo_server().await;
        let client = AsyncHttpClient::new(uri_for(addr, "/hello?q=1"));

        let response = client.get().await.expect("get failed");
        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(response.body(), b"GET /hello?q=1");
    }

    #[tokio::test]
    async fn post_carries_body_and_content_type() {
        let addr = spawn_echo_server().await;
        let client = AsyncHttpClient::new(uri_for(addr, "/submit"));

        let response = client.post(b"name=value", "application/x-www-form-urlencoded").await.expect("post failed");
        assert_eq!(response.status(), Some(StatusCode::CREATED));
        assert_eq!(response.content_type(), Some("application/x-www-form-urlencoded"));
        assert_eq!(response.body(), b"name=value");
    }

    #[tokio::test]
    async fn callback_gets_the_error_and_an_empty_message_on_failure() {
        // grab a port that nothing is listening on
        let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = unused.local_addr().unwrap();
        drop(unused);

        let client = AsyncHttpClient::new(uri_for(addr, "/"));
        let mut invocations = 0;
        client
            .get_with(|uri, message, error| {
                invocations += 1;
                assert_eq!(uri.host(), "127.0.0.1");
                assert!(message.body().is_empty());
                assert!(matches!(error, Some(HttpError::Connect { .. })));
            })
            .await;
        assert_eq!(invocations, 1);
    }

    #[test]
    fn sync_client_drives_its_own_event_loop() {
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async {
                let server = Server::bind("127.0.0.1:0", echo_handler()).await.expect("bind failed");
                addr_tx.send(server.local_addr().unwrap()).unwrap();
                let _ = server.run().await;
            });
        });
        let addr = addr_rx.recv().unwrap();

        let client = HttpClient::new(uri_for(addr, "/sync")).expect("client");
        let response = client.get().expect("get failed");
        assert_eq!(response.body(), b"GET /sync");
    }
}
