use std::io;
use thiserror::Error;

/// Top level error type for the engine.
///
/// Parse and send failures keep their own enums so sessions can classify them;
/// everything that happens before a session exists (resolve, connect, TLS
/// handshake, URI construction) gets its own variant here.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("invalid uri: {reason}")]
    InvalidUri { reason: String },

    #[error("connect error: {source}")]
    Connect { source: io::Error },

    #[error("tls handshake error: {source}")]
    Handshake { source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HttpError {
    pub fn invalid_uri<S: ToString>(reason: S) -> Self {
        Self::InvalidUri { reason: reason.to_string() }
    }

    pub fn connect(source: io::Error) -> Self {
        Self::Connect { source }
    }

    pub fn handshake(source: io::Error) -> Self {
        Self::Handshake { source }
    }

    /// True for the bad-message failure produced when the parser could not
    /// consume the bytes offered to it.
    pub fn is_bad_message(&self) -> bool {
        matches!(self, Self::Parse { source: ParseError::BadMessage { .. } })
    }
}

/// Errors raised while parsing an inbound message.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("bad message: {reason}")]
    BadMessage { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn bad_message<S: ToString>(reason: S) -> Self {
        Self::BadMessage { reason: reason.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised while writing a response.
#[derive(Error, Debug)]
pub enum SendError {
    /// The once-guarded write path was used a second time. A deferred response
    /// may be finished at most once.
    #[error("response already finished for this connection")]
    AlreadyFinished,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
