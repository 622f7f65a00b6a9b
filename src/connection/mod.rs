//! Connection lifecycle: sessions, server dispatch and the deferred-response
//! write path.

mod session;
pub use session::Session;

mod http_connection;
pub use http_connection::HttpConnection;

mod response_writer;
pub use response_writer::{live_sessions, DeferredResponse, ResponseHandle, ResponseWriter};
