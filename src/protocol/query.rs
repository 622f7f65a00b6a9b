//! Percent-encoding and form-style name/value codec.
//!
//! The unreserved alphabet is `A-Z a-z 0-9 - _ . ~`; every other byte is
//! percent-encoded. Form strings are `&`-joined `=`-separated percent-encoded
//! pairs, optionally emitted in canonical ascending order.

use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the unreserved set gets encoded.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encodes arbitrary bytes.
pub fn url_encode(input: &[u8]) -> String {
    percent_encode(input, ENCODE_SET).to_string()
}

/// Decodes a percent-encoded string back to raw bytes. Stray `%` sequences
/// that do not form a valid escape are passed through unchanged.
pub fn url_decode(input: &str) -> Vec<u8> {
    percent_decode_str(input).collect()
}

/// Parses a form-encoded string into name/value pairs in arrival order.
///
/// Pairs with an empty name are skipped; a pair without `=` gets an empty
/// value.
pub fn parse_query(input: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for piece in input.split('&') {
        let (name, value) = match piece.split_once('=') {
            Some((n, v)) => (n, v),
            None => (piece, ""),
        };
        if name.is_empty() {
            continue;
        }
        let name = String::from_utf8_lossy(&url_decode(name)).into_owned();
        let value = String::from_utf8_lossy(&url_decode(value)).into_owned();
        pairs.push((name, value));
    }
    pairs
}

/// Serializes name/value pairs into a form-encoded string. With `sort` the
/// encoded pairs are emitted in ascending order, giving a canonical form
/// independent of the original field order.
pub fn query_to_string(pairs: &[(String, String)], sort: bool) -> String {
    let mut encoded: Vec<String> =
        pairs.iter().map(|(name, value)| format!("{}={}", url_encode(name.as_bytes()), url_encode(value.as_bytes()))).collect();
    if sort {
        encoded.sort();
    }
    encoded.join("&")
}
