//! Response serialization.
//!
//! [`ResponseEncoder`] writes the HTTP/1.0 status line, the header block and
//! the body into the outbound buffer. The wire format always carries a
//! computed `Content-Length`, and `Content-Type` defaults to `text/html` when
//! the handler did not set one.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{Response, SendError};

/// Initial buffer reservation for the serialized header block
const INIT_HEADER_SIZE: usize = 4 * 1024;

#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (status, mut headers, body) = response.into_parts();

        // required headers: a computed length always, a default type if unset
        headers.set("Content-Length", body.len().to_string());
        if !headers.contains("Content-Type") {
            headers.set("Content-Type", "text/html");
        }

        dst.reserve(INIT_HEADER_SIZE + body.len());
        dst.put_slice(status.status_line().as_bytes());
        for (name, value) in headers.iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        dst.put_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StatusCode;

    fn encode(response: Response) -> String {
        let mut buf = BytesMut::new();
        ResponseEncoder::new().encode(response, &mut buf).expect("encode failed");
        String::from_utf8(buf.to_vec()).expect("response was not utf-8")
    }

    #[test]
    fn default_headers_are_computed() {
        let mut response = Response::new();
        response.set_body("hello");
        let wire = encode(response);

        assert!(wire.starts_with("HTTP/1.0 200 OK\r\n"), "got: {wire}");
        assert!(wire.contains("Content-Length: 5\r\n"));
        assert!(wire.contains("Content-Type: text/html\r\n"));
        assert!(wire.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn explicit_content_type_is_kept_and_length_recomputed() {
        let mut response = Response::new();
        response.set_content_type("application/json");
        response.headers_mut().set("Content-Length", "999");
        response.set_body("{}");
        let wire = encode(response);

        assert!(wire.contains("Content-Type: application/json\r\n"));
        assert!(wire.contains("Content-Length: 2\r\n"));
        assert!(!wire.contains("999"));
    }

    #[test]
    fn unsupported_status_serializes_as_500() {
        let mut response = Response::new();
        response.set_status(StatusCode::from_u16(418));
        let wire = encode(response);
        assert!(wire.starts_with("HTTP/1.0 500 Internal Server Error\r\n"));
    }
}
