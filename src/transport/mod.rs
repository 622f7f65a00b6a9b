//! Byte-stream transports: plain TCP and TLS.
//!
//! [`Stream`] is the one polymorphic transport the rest of the engine is
//! written against; which variant a connection gets is decided at
//! establishment time (the URI scheme on the client side, the presence of a
//! `TlsAcceptor` on the server side).
//!
//! Two transport details matter to sessions:
//!
//! - a TLS peer that closes without a proper close_notify surfaces as
//!   `UnexpectedEof` from rustls; that truncation conventionally terminates a
//!   close-terminated body, so reads map it to a clean end of stream
//! - shutdown is best-effort: the TLS variant writes close_notify before
//!   closing the socket, the plain variant just shuts the socket down
//!
//! The client side keeps one process-wide TLS connector built on first use.
//! Its configuration does not assert peer identity; certificate and key
//! handling for servers stays with the caller, who passes a ready
//! `TlsAcceptor`.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{lookup_host, TcpStream};
use tokio_rustls::client::TlsStream as ClientTlsStream;
use tokio_rustls::rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::crypto::{aws_lc_rs, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio_rustls::TlsConnector;
use tokio_rustls::TlsStream;
use tracing::trace;

use crate::protocol::HttpError;
use crate::uri::Uri;

/// A connected byte stream, plain or encrypted.
#[derive(Debug)]
pub enum Stream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for Stream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Stream::Tls(s) => match Pin::new(s).poll_read(cx, buf) {
                // missing close_notify: the short read that marks the end of a
                // close-terminated body
                Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Poll::Ready(Ok(())),
                other => other,
            },
        }
    }
}

impl AsyncWrite for Stream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Stream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_flush(cx),
            Stream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            // tokio-rustls sends close_notify before closing the socket
            Stream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Well-known service table used when the URI carries no explicit port.
fn scheme_port(schema: &str) -> Option<u16> {
    match schema {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Establishes a transport for the given URI: resolve, connect to the first
/// endpoint that accepts, then handshake when the scheme selects TLS.
pub async fn connect(uri: &Uri) -> Result<Stream, HttpError> {
    let host = uri.host();
    if host.is_empty() {
        return Err(HttpError::invalid_uri("missing host"));
    }
    let port = match uri.port() {
        Some(port) => port,
        None => scheme_port(uri.schema())
            .ok_or_else(|| HttpError::invalid_uri(format!("unknown service: {}", uri.schema())))?,
    };

    let addrs = lookup_host((host, port)).await.map_err(HttpError::connect)?;
    let mut last_error = None;
    let mut tcp = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                tcp = Some(stream);
                break;
            }
            Err(e) => last_error = Some(e),
        }
    }
    let tcp = match tcp {
        Some(tcp) => tcp,
        None => {
            let e = last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"));
            return Err(HttpError::connect(e));
        }
    };

    if uri.schema() != "https" {
        // plain transport: handshake is a no-op success
        return Ok(Stream::Plain(tcp));
    }

    trace!(host, port, "starting client tls handshake");
    let server_name = ServerName::try_from(host.to_string()).map_err(|_| HttpError::invalid_uri("invalid host name"))?;
    let tls = default_connector().connect(server_name, tcp).await.map_err(HttpError::handshake)?;
    Ok(Stream::Tls(Box::new(TlsStream::Client(tls))))
}

impl From<ClientTlsStream<TcpStream>> for Stream {
    fn from(tls: ClientTlsStream<TcpStream>) -> Self {
        Stream::Tls(Box::new(TlsStream::Client(tls)))
    }
}

impl From<tokio_rustls::server::TlsStream<TcpStream>> for Stream {
    fn from(tls: tokio_rustls::server::TlsStream<TcpStream>) -> Self {
        Stream::Tls(Box::new(TlsStream::Server(tls)))
    }
}

static DEFAULT_CONNECTOR: OnceLock<TlsConnector> = OnceLock::new();

/// Shared default client connector, built once per process.
fn default_connector() -> &'static TlsConnector {
    DEFAULT_CONNECTOR.get_or_init(|| {
        let provider = aws_lc_rs::default_provider();
        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoPeerIdentity::new(provider)))
            .with_no_client_auth();
        TlsConnector::from(Arc::new(config))
    })
}

/// Accepts any server certificate: the engine contract is to negotiate
/// encryption without asserting peer identity. Signatures are still checked
/// against the presented certificate.
#[derive(Debug)]
struct NoPeerIdentity {
    provider: CryptoProvider,
}

impl NoPeerIdentity {
    fn new(provider: CryptoProvider) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for NoPeerIdentity {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_port_covers_the_service_table() {
        assert_eq!(scheme_port("http"), Some(80));
        assert_eq!(scheme_port("https"), Some(443));
        assert_eq!(scheme_port("gopher"), None);
    }

    #[tokio::test]
    async fn unknown_scheme_without_port_fails_before_resolving() {
        let uri: Uri = "ftp://example.invalid/file".parse().expect("uri parses");
        let err = connect(&uri).await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidUri { .. }));
    }
}
