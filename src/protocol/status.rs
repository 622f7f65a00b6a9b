use std::fmt;

/// HTTP status code carried by a response.
///
/// The engine speaks HTTP/1.0 and serializes the sixteen status lines below;
/// any other value falls back to the 500 line on the wire. The code itself is
/// kept verbatim so a parsed upstream status survives a round trip through
/// [`as_u16`](StatusCode::as_u16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const MULTIPLE_CHOICES: StatusCode = StatusCode(300);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const MOVED_TEMPORARILY: StatusCode = StatusCode(302);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub const fn from_u16(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// The full HTTP/1.0 status line for this code, CRLF included.
    /// Codes outside the supported set map to the 500 line.
    pub fn status_line(&self) -> &'static str {
        match self.0 {
            200 => "HTTP/1.0 200 OK\r\n",
            201 => "HTTP/1.0 201 Created\r\n",
            202 => "HTTP/1.0 202 Accepted\r\n",
            204 => "HTTP/1.0 204 No Content\r\n",
            300 => "HTTP/1.0 300 Multiple Choices\r\n",
            301 => "HTTP/1.0 301 Moved Permanently\r\n",
            302 => "HTTP/1.0 302 Moved Temporarily\r\n",
            304 => "HTTP/1.0 304 Not Modified\r\n",
            400 => "HTTP/1.0 400 Bad Request\r\n",
            401 => "HTTP/1.0 401 Unauthorized\r\n",
            403 => "HTTP/1.0 403 Forbidden\r\n",
            404 => "HTTP/1.0 404 Not Found\r\n",
            500 => "HTTP/1.0 500 Internal Server Error\r\n",
            501 => "HTTP/1.0 501 Not Implemented\r\n",
            502 => "HTTP/1.0 502 Bad Gateway\r\n",
            503 => "HTTP/1.0 503 Service Unavailable\r\n",
            _ => "HTTP/1.0 500 Internal Server Error\r\n",
        }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_their_own_status_line() {
        assert_eq!(StatusCode::OK.status_line(), "HTTP/1.0 200 OK\r\n");
        assert_eq!(StatusCode::MOVED_TEMPORARILY.status_line(), "HTTP/1.0 302 Moved Temporarily\r\n");
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE.status_line(), "HTTP/1.0 503 Service Unavailable\r\n");
    }

    #[test]
    fn unknown_codes_serialize_as_internal_server_error() {
        assert_eq!(StatusCode::from_u16(418).status_line(), "HTTP/1.0 500 Internal Server Error\r\n");
        assert_eq!(StatusCode::from_u16(0).status_line(), "HTTP/1.0 500 Internal Server Error\r\n");
        // the raw value itself is preserved
        assert_eq!(StatusCode::from_u16(418).as_u16(), 418);
    }
}
