//! An embeddable asynchronous HTTP/1.0 engine
//!
//! This crate provides both a server role and a client role over plain TCP
//! and TLS transports, built on top of tokio. The engine speaks one request
//! per connection: the response ends the exchange, and bodies are framed by
//! `Content-Length` or terminated by connection close.
//!
//! # Features
//!
//! - Asynchronous I/O using tokio, one spawned task per connection
//! - Plain TCP and TLS transports behind one stream type
//! - Incremental chunk-boundary-independent message parsing
//! - Immediate or deferred responses: a handler may hold a handle and
//!   finish the exchange later, from any task
//! - Client pipeline with async and blocking front ends
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracing::Level;
//! use tracing_subscriber::FmtSubscriber;
//! use nano_http::handler::make_handler;
//! use nano_http::protocol::{HttpError, Message, Response, StatusCode};
//! use nano_http::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let handler = Arc::new(make_handler(
//!         |request: Result<&Message, &HttpError>, response: &mut Response, _deferred| {
//!             let Ok(request) = request else { return false };
//!             response.set_status(StatusCode::OK);
//!             response.set_content_type("text/plain");
//!             response.set_body(format!("hello, {}", request.target()));
//!             true
//!         },
//!     ));
//!
//!     Server::bind("127.0.0.1:8080", handler).await?.run().await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`transport`]: the plain/TLS stream type and client connection
//!   establishment
//! - [`protocol`]: the message model, status codes, errors and the form codec
//! - [`codec`]: the streaming parser and the framing adapters
//! - [`connection`]: session lifecycle and the deferred-response write path
//! - [`server`]: the acceptor loop
//! - [`client`]: the request pipeline, async and blocking
//! - [`Uri`]: the URI value type shared by both roles

pub mod client;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod transport;

mod uri;
mod utils;

pub use uri::Uri;
pub(crate) use utils::ensure;
