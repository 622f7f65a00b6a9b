//! Streaming message parser.
//!
//! [`MessageParser`] is an incremental state machine turning raw bytes into
//! [`ParseEvent`]s. It never touches a [`Message`](crate::protocol::Message)
//! itself; the owner applies the events, keeping parser and message explicitly
//! composed. Header bytes accumulate internally until the header block is
//! complete, so the produced events are independent of how the input was
//! chunked.
//!
//! State machine: `Start → Headers → Body → Complete`, with `Failed` as the
//! absorbing error state. Body framing follows HTTP/1.0 single-message rules:
//! a request without `Content-Length` has no body and completes at the end of
//! the header block; a declared length completes after exactly that many body
//! bytes; a response without a declared length runs until end of stream and is
//! finalized by [`finish`](MessageParser::finish).

use bytes::{Buf, BytesMut};
use httparse::Status;

use crate::ensure;
use crate::protocol::{ParseError, StatusCode};

/// Maximum number of headers allowed in a message
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header block
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Which side of the exchange is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

/// One mutation of the target message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    Method(String),
    Target(String),
    Status(StatusCode),
    Header { name: String, value: String },
    Body(Vec<u8>),
    Complete,
}

#[derive(Debug)]
enum State {
    Start,
    Headers,
    Body { remaining: Option<u64> },
    Complete,
    Failed,
}

#[derive(Debug)]
pub struct MessageParser {
    kind: MessageKind,
    state: State,
    buffer: BytesMut,
    bytes_fed: u64,
}

impl MessageParser {
    pub fn new(kind: MessageKind) -> Self {
        Self { kind, state: State::Start, buffer: BytesMut::new(), bytes_fed: 0 }
    }

    /// Total bytes ever offered to the parser. A zero total at end of stream
    /// distinguishes a clean disconnect from a truncated message.
    pub fn bytes_fed(&self) -> u64 {
        self.bytes_fed
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Complete)
    }

    /// Consumes `chunk` in full and returns the resulting events.
    ///
    /// Bytes arriving after completion are discarded: the engine speaks one
    /// message per connection. Any failure poisons the parser.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<ParseEvent>, ParseError> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }
        self.bytes_fed += chunk.len() as u64;

        let mut events = Vec::new();
        match self.state {
            State::Start | State::Headers => {
                self.state = State::Headers;
                self.buffer.extend_from_slice(chunk);
                self.parse_headers(&mut events)?;
            }
            State::Body { .. } => self.consume_body(chunk, &mut events),
            State::Complete => {}
            State::Failed => return Err(ParseError::bad_message("parser already failed")),
        }
        Ok(events)
    }

    /// The finalizing empty chunk, fed when the transport signals end of
    /// stream (clean EOF or the truncation signal that conventionally marks a
    /// close-terminated body).
    ///
    /// Completes a declared-length-less response body. Nothing-ever-received
    /// is a clean disconnect and yields no events; end of stream inside the
    /// header block or inside a declared-length body is a failure.
    pub fn finish(&mut self) -> Result<Vec<ParseEvent>, ParseError> {
        let mut events = Vec::new();
        match self.state {
            State::Start | State::Complete => {}
            State::Headers => {
                self.state = State::Failed;
                return Err(ParseError::bad_message("end of stream inside header block"));
            }
            State::Body { remaining: None } => {
                self.state = State::Complete;
                events.push(ParseEvent::Complete);
            }
            State::Body { remaining: Some(_) } => {
                self.state = State::Failed;
                return Err(ParseError::bad_message("end of stream before declared body length"));
            }
            State::Failed => return Err(ParseError::bad_message("parser already failed")),
        }
        Ok(events)
    }

    fn parse_headers(&mut self, events: &mut Vec<ParseEvent>) -> Result<(), ParseError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];

        let parsed = match self.kind {
            MessageKind::Request => {
                let mut req = httparse::Request::new(&mut headers);
                match req.parse(&self.buffer) {
                    Ok(Status::Complete(offset)) => {
                        let mut head = Vec::with_capacity(2);
                        // method and path are always present on Complete
                        if let Some(method) = req.method {
                            head.push(ParseEvent::Method(method.to_string()));
                        }
                        if let Some(path) = req.path {
                            head.push(ParseEvent::Target(path.to_string()));
                        }
                        Some((offset, head, header_events(req.headers)))
                    }
                    Ok(Status::Partial) => None,
                    Err(e) => {
                        self.state = State::Failed;
                        return Err(map_httparse_error(e));
                    }
                }
            }
            MessageKind::Response => {
                let mut res = httparse::Response::new(&mut headers);
                match res.parse(&self.buffer) {
                    Ok(Status::Complete(offset)) => {
                        let mut head = Vec::with_capacity(1);
                        if let Some(code) = res.code {
                            head.push(ParseEvent::Status(StatusCode::from_u16(code)));
                        }
                        Some((offset, head, header_events(res.headers)))
                    }
                    Ok(Status::Partial) => None,
                    Err(e) => {
                        self.state = State::Failed;
                        return Err(map_httparse_error(e));
                    }
                }
            }
        };

        let Some((offset, head, headers)) = parsed else {
            if self.buffer.len() > MAX_HEADER_BYTES {
                self.state = State::Failed;
                return Err(ParseError::too_large_header(self.buffer.len(), MAX_HEADER_BYTES));
            }
            return Ok(());
        };
        ensure!(offset <= MAX_HEADER_BYTES, ParseError::too_large_header(offset, MAX_HEADER_BYTES));

        let content_length = match declared_length(&headers) {
            Ok(length) => length,
            Err(e) => {
                self.state = State::Failed;
                return Err(e);
            }
        };
        events.extend(head);
        events.extend(headers);

        // requests without a declared length have no body at all;
        // responses without one are close-terminated
        let remaining = match self.kind {
            MessageKind::Request => Some(content_length.unwrap_or(0)),
            MessageKind::Response => content_length,
        };

        self.buffer.advance(offset);
        let rest = self.buffer.split();
        self.state = State::Body { remaining };
        self.consume_body(&rest, events);
        Ok(())
    }

    fn consume_body(&mut self, chunk: &[u8], events: &mut Vec<ParseEvent>) {
        let State::Body { remaining } = &mut self.state else {
            return;
        };
        match remaining {
            None => {
                if !chunk.is_empty() {
                    events.push(ParseEvent::Body(chunk.to_vec()));
                }
            }
            Some(remaining) => {
                let take = (*remaining).min(chunk.len() as u64) as usize;
                if take > 0 {
                    events.push(ParseEvent::Body(chunk[..take].to_vec()));
                    *remaining -= take as u64;
                }
                if *remaining == 0 {
                    self.state = State::Complete;
                    events.push(ParseEvent::Complete);
                }
            }
        }
    }
}

fn header_events(headers: &[httparse::Header<'_>]) -> Vec<ParseEvent> {
    headers
        .iter()
        .map(|header| ParseEvent::Header {
            name: header.name.to_string(),
            value: String::from_utf8_lossy(header.value).into_owned(),
        })
        .collect()
}

fn declared_length(headers: &[ParseEvent]) -> Result<Option<u64>, ParseError> {
    for event in headers {
        if let ParseEvent::Header { name, value } = event {
            if name.eq_ignore_ascii_case("content-length") {
                let length =
                    value.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(value.trim()))?;
                return Ok(Some(length));
            }
        }
    }
    Ok(None)
}

fn map_httparse_error(e: httparse::Error) -> ParseError {
    match e {
        httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
        e => ParseError::bad_message(e),
    }
}
