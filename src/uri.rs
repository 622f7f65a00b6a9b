//! Lightweight URI value type.
//!
//! Parses `scheme://host[:port][/path][?query][#fragment]` once at
//! construction; malformed input fails synchronously with
//! [`HttpError::InvalidUri`], distinct from the engine's asynchronous failure
//! paths.

use std::fmt;
use std::str::FromStr;

use crate::protocol::HttpError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    schema: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
    fragment: String,
}

impl Uri {
    /// Parses a URI string. Scheme and host are required.
    pub fn parse(input: &str) -> Result<Self, HttpError> {
        let (schema, rest) =
            input.split_once("://").ok_or_else(|| HttpError::invalid_uri("missing scheme separator"))?;
        if schema.is_empty() || !schema.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
            return Err(HttpError::invalid_uri(format!("bad scheme: {schema:?}")));
        }

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, rest) = rest.split_at(authority_end);

        let (host, port) = split_authority(authority)?;
        if host.is_empty() {
            return Err(HttpError::invalid_uri("missing host"));
        }

        let (path, rest) = match rest.find(['?', '#']) {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let (query, fragment) = match rest.strip_prefix('?') {
            Some(after_query) => match after_query.split_once('#') {
                Some((q, f)) => (q, f),
                None => (after_query, ""),
            },
            None => ("", rest.strip_prefix('#').unwrap_or("")),
        };

        Ok(Self {
            schema: schema.to_string(),
            host: host.to_string(),
            port,
            path: path.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Reconstructs the URI string from its parts.
    pub fn to_uri_string(&self) -> String {
        let mut out = format!("{}://{}", self.schema, self.host);
        if let Some(port) = self.port {
            out.push(':');
            out.push_str(&port.to_string());
        }
        out.push_str(&self.path);
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(&self.fragment);
        }
        out
    }

    /// Holds iff re-parsing the reconstructed string succeeds.
    pub fn valid(&self) -> bool {
        Uri::parse(&self.to_uri_string()).is_ok()
    }

    /// The request-line target: path (or `/`) plus optional query.
    pub fn request_target(&self) -> String {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        if self.query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.query)
        }
    }
}

/// Splits `host[:port]`, accepting bracketed IPv6 hosts.
fn split_authority(authority: &str) -> Result<(&str, Option<u16>), HttpError> {
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, rest) = rest.split_once(']').ok_or_else(|| HttpError::invalid_uri("unterminated ipv6 host"))?;
        let port = match rest.strip_prefix(':') {
            Some(port) => Some(parse_port(port)?),
            None if rest.is_empty() => None,
            None => return Err(HttpError::invalid_uri("garbage after ipv6 host")),
        };
        return Ok((host, port));
    }
    match authority.split_once(':') {
        Some((host, port)) => Ok((host, Some(parse_port(port)?))),
        None => Ok((authority, None)),
    }
}

fn parse_port(port: &str) -> Result<u16, HttpError> {
    port.parse::<u16>().map_err(|_| HttpError::invalid_uri(format!("bad port: {port:?}")))
}

impl FromStr for Uri {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_uri_parses_into_parts() {
        let uri = Uri::parse("https://example.com:8443/a/b?x=1&y=2#frag").expect("parse failed");
        assert_eq!(uri.schema(), "https");
        assert_eq!(uri.host(), "example.com");
        assert_eq!(uri.port(), Some(8443));
        assert_eq!(uri.path(), "/a/b");
        assert_eq!(uri.query(), "x=1&y=2");
        assert_eq!(uri.fragment(), "frag");
        assert!(uri.valid());
    }

    #[test]
    fn reconstruction_round_trips() {
        let input = "http://example.com:9090/path?q=1#top";
        let uri = Uri::parse(input).expect("parse failed");
        assert_eq!(uri.to_uri_string(), input);
        assert_eq!(Uri::parse(&uri.to_uri_string()).expect("reparse"), uri);
    }

    #[test]
    fn bare_host_defaults() {
        let uri = Uri::parse("http://example.com").expect("parse failed");
        assert_eq!(uri.path(), "");
        assert_eq!(uri.port(), None);
        assert_eq!(uri.request_target(), "/");
    }

    #[test]
    fn request_target_includes_query_but_not_fragment() {
        let uri = Uri::parse("http://h/p?a=1#frag").expect("parse failed");
        assert_eq!(uri.request_target(), "/p?a=1");
    }

    #[test]
    fn ipv6_hosts_are_accepted() {
        let uri = Uri::parse("http://[::1]:8080/x").expect("parse failed");
        assert_eq!(uri.host(), "::1");
        assert_eq!(uri.port(), Some(8080));
    }

    #[test]
    fn malformed_input_fails_at_construction() {
        assert!(Uri::parse("no-scheme-here").is_err());
        assert!(Uri::parse("http://").is_err());
        assert!(Uri::parse("http://host:notaport/").is_err());
        assert!(Uri::parse("ht tp://host/").is_err());
    }
}
