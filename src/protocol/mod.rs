//! Core protocol types: the message model, status codes and error types.
//!
//! The components here are plain value types shared by the server and client
//! sides of the engine:
//!
//! - [`Message`]: mutable accumulator for one HTTP message, filled by parse
//!   events
//! - [`Response`]: a response under construction by a handler
//! - [`Headers`]: case-insensitive mapping with concatenating append semantics
//! - [`StatusCode`]: the HTTP/1.0 status line table
//! - [`HttpError`] / [`ParseError`] / [`SendError`]: layered error types
//! - [`query`]: percent-encoding and form name/value codec

mod headers;
pub use headers::Headers;

mod message;
pub use message::Message;
pub use message::Response;

mod status;
pub use status::StatusCode;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod query;
