use crate::protocol::{Headers, StatusCode};

/// Mutable accumulator for one HTTP message.
///
/// A `Message` is filled incrementally as parse events arrive: the target and
/// body grow by appending, header values for repeated names concatenate, and
/// the status is only present on the response side. Server handlers see a
/// `Message` as the parsed request; the client pipeline returns one as the
/// parsed response.
#[derive(Debug, Clone, Default)]
pub struct Message {
    method: String,
    target: String,
    status: Option<StatusCode>,
    headers: Headers,
    body: Vec<u8>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request method, empty on the response side.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: &str) {
        self.method = method.to_string();
    }

    /// Request target (path plus optional query), empty on the response side.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn append_target(&mut self, fragment: &str) {
        self.target.push_str(fragment);
    }

    /// Response status, `None` on the request side.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body bytes as UTF-8, lossy for non-text payloads.
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn append_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    /// Replaces the body wholesale. Parsing only ever appends; replacement is
    /// an explicit caller decision.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }
}

/// A response under construction by a server handler.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.headers.set("Content-Type", content_type);
    }

    pub(crate) fn into_parts(self) -> (StatusCode, Headers, Vec<u8>) {
        (self.status, self.headers, self.body)
    }
}
