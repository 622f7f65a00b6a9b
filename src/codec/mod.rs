//! Codec layer: the streaming parser plus the framing adapters used by
//! sessions.
//!
//! [`MessageDecoder`] plugs the event-producing [`MessageParser`] into
//! `tokio_util`'s [`Decoder`] so a session can drive it with a `FramedRead`.
//! `decode` drains the read buffer through the parser; `decode_eof` routes any
//! trailing bytes and then feeds the finalizing empty chunk, so a
//! close-terminated body completes exactly when the transport ends.
//! [`ResponseEncoder`] is the matching [`Encoder`](tokio_util::codec::Encoder)
//! for the write side.

mod parser;
pub use parser::{MessageKind, MessageParser, ParseEvent};

mod response_encoder;
pub use response_encoder::ResponseEncoder;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{Message, ParseError};

/// Decoder yielding one complete [`Message`] per connection.
#[derive(Debug)]
pub struct MessageDecoder {
    parser: MessageParser,
    message: Message,
    emitted: bool,
}

impl MessageDecoder {
    pub fn new(kind: MessageKind) -> Self {
        Self { parser: MessageParser::new(kind), message: Message::new(), emitted: false }
    }

    /// Total bytes received from the transport so far.
    pub fn bytes_received(&self) -> u64 {
        self.parser.bytes_fed()
    }

    /// Applies events to the accumulating message; true once complete.
    fn apply(&mut self, events: Vec<ParseEvent>) -> bool {
        let mut complete = false;
        for event in events {
            match event {
                ParseEvent::Method(method) => self.message.set_method(&method),
                ParseEvent::Target(target) => self.message.append_target(&target),
                ParseEvent::Status(status) => self.message.set_status(status),
                ParseEvent::Header { name, value } => self.message.headers_mut().append(&name, &value),
                ParseEvent::Body(chunk) => self.message.append_body(&chunk),
                ParseEvent::Complete => complete = true,
            }
        }
        complete
    }

    fn take_message(&mut self) -> Message {
        self.emitted = true;
        std::mem::take(&mut self.message)
    }
}

impl Decoder for MessageDecoder {
    type Item = Message;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let chunk = src.split_to(src.len());
        let events = self.parser.feed(&chunk)?;
        if self.apply(events) {
            return Ok(Some(self.take_message()));
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.emitted {
            src.clear();
            return Ok(None);
        }
        if !src.is_empty() {
            let chunk = src.split_to(src.len());
            let events = self.parser.feed(&chunk)?;
            if self.apply(events) {
                return Ok(Some(self.take_message()));
            }
        }
        let events = self.parser.finish()?;
        if self.apply(events) {
            return Ok(Some(self.take_message()));
        }
        // nothing ever received: clean disconnect
        Ok(None)
    }
}
