//! Named string parameter decoding.
//!
//! Requests arrive as a flat `name → value` map. Numeric parameters are
//! decimal, address-like parameters are hexadecimal with an optional
//! `0x` prefix, and byte lists are comma-separated hex literals.

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;

/// Flat parameter map handed to every endpoint.
pub type Params = HashMap<String, String>;

/// Why a request was rejected before reaching the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// At least one required parameter is absent.
    Missing,
    /// The named parameter is present but malformed or out of range.
    Invalid(&'static str),
    /// A byte list parsed to nothing.
    NoData,
    /// Requested transfer exceeds the configured limit.
    TooLong { max: usize },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "Missing required parameters"),
            Self::Invalid(name) => write!(f, "Invalid parameter: {}", name),
            Self::NoData => write!(f, "No valid data bytes provided"),
            Self::TooLong { max } => write!(f, "Length too large (max {} bytes)", max),
        }
    }
}

impl core::error::Error for ParamError {}

// ───────────────────────────────────────────────────────────────
// Scalar parsers
// ───────────────────────────────────────────────────────────────

/// Parse one hex byte: `"0x48"`, `"0X48"`, `"48"`, surrounding blanks allowed.
pub fn parse_hex_u8(s: &str) -> Option<u8> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

/// Parse a comma-separated hex byte list. Empty and whitespace-only
/// tokens are skipped; any other malformed token rejects the whole list.
pub fn parse_hex_list(s: &str) -> Option<Vec<u8>> {
    s.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_hex_u8)
        .collect()
}

/// Render a byte the way responses show it: lowercase, no padding.
pub fn hex(byte: u8) -> String {
    format!("0x{:x}", byte)
}

// ───────────────────────────────────────────────────────────────
// Map accessors
// ───────────────────────────────────────────────────────────────

/// `Err(Missing)` unless every name in `names` is present.
pub fn require(params: &Params, names: &[&str]) -> Result<(), ParamError> {
    if names.iter().all(|name| params.contains_key(*name)) {
        Ok(())
    } else {
        Err(ParamError::Missing)
    }
}

/// Required decimal parameter.
pub fn decimal<T: FromStr>(params: &Params, name: &'static str) -> Result<T, ParamError> {
    let raw = params.get(name).ok_or(ParamError::Missing)?;
    raw.trim().parse().map_err(|_| ParamError::Invalid(name))
}

/// Optional decimal parameter with a fallback.
pub fn decimal_or<T: FromStr>(params: &Params, name: &'static str, default: T) -> Result<T, ParamError> {
    match params.get(name) {
        Some(_) => decimal(params, name),
        None => Ok(default),
    }
}

/// Required hex byte parameter.
pub fn hex_u8(params: &Params, name: &'static str) -> Result<u8, ParamError> {
    let raw = params.get(name).ok_or(ParamError::Missing)?;
    parse_hex_u8(raw).ok_or(ParamError::Invalid(name))
}

/// Required hex byte list parameter; an empty list is [`ParamError::NoData`].
pub fn hex_list(params: &Params, name: &'static str) -> Result<Vec<u8>, ParamError> {
    let raw = params.get(name).ok_or(ParamError::Missing)?;
    let bytes = parse_hex_list(raw).ok_or(ParamError::Invalid(name))?;
    if bytes.is_empty() {
        return Err(ParamError::NoData);
    }
    Ok(bytes)
}

// ───────────────────────────────────────────────────────────────
// Query strings
// ───────────────────────────────────────────────────────────────

/// Split a URI into its path and decoded query parameters.
pub fn split_uri(uri: &str) -> (&str, Params) {
    match uri.split_once('?') {
        Some((path, query)) => (path, parse_query(query)),
        None => (uri, Params::new()),
    }
}

/// Decode `a=1&b=0x02` into a parameter map. Later duplicates win.
pub fn parse_query(query: &str) -> Params {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
