//! Canonical CBOR encoding and strict decoding of metadata payloads.
//!
//! Encoding follows RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison, no duplicates
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats, no tags
//!
//! Decoding is strict: input must be exactly one well-formed item using
//! definite lengths. Anything else is a [`DecodeError`], before any grammar
//! is consulted.

use ciborium::value::{Integer, Value};

use crate::error::{CoreError, DecodeError};
use crate::types::MetadataKind;

/// Maximum nesting of arrays and maps accepted by [`decode`].
pub const MAX_DEPTH: usize = 64;

/// Encode a structured value to canonical bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value(&mut buf, value)?;
    Ok(buf)
}

/// Wrap a payload body under its label and encode it canonically.
///
/// Produces `{label: body}`.
pub fn encode_metadata(kind: MetadataKind, body: &Value) -> Result<Vec<u8>, CoreError> {
    encode(&labeled(kind, body.clone()))
}

/// Build the top-level `{label: body}` map.
pub fn labeled(kind: MetadataKind, body: Value) -> Value {
    Value::Map(vec![(uint(kind.label()), body)])
}

/// Borrow the body stored under `kind`'s label.
///
/// Returns `None` unless the value is a map holding that label.
pub fn metadata_body(value: &Value, kind: MetadataKind) -> Option<&Value> {
    map_get(value, kind.label())
}

/// Look up an unsigned integer key in a map value.
pub fn map_get(value: &Value, key: u64) -> Option<&Value> {
    let Value::Map(entries) = value else {
        return None;
    };
    entries
        .iter()
        .find(|(k, _)| as_u64(k) == Some(key))
        .map(|(_, v)| v)
}

/// Read a value as an unsigned integer.
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(i) => u64::try_from(*i).ok(),
        _ => None,
    }
}

/// Unsigned integer value.
pub fn uint(n: u64) -> Value {
    Value::Integer(Integer::from(n))
}

fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => return Err(CoreError::Encoding("floats are not canonical".into())),
        Value::Tag(tag, _) => return Err(CoreError::Encoding(format!("unsupported tag {tag}"))),
        _ => return Err(CoreError::Encoding("unsupported value type".into())),
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n = i128::from(i);
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned argument with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CoreError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item)?;
    }
    Ok(())
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value(&mut key_buf, k)?;
        pairs.push((key_buf, v));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(CoreError::Encoding("duplicate map key".into()));
    }

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, value)?;
    }
    Ok(())
}

/// Decode exactly one well-formed, definite-length item.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut scanner = Scanner { bytes, pos: 0 };
    scanner.item(0)?;
    if scanner.pos < bytes.len() {
        return Err(DecodeError::TrailingBytes {
            count: bytes.len() - scanner.pos,
        });
    }

    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    check_unique_keys(&value)?;
    Ok(value)
}

/// Decode a hex-encoded payload.
pub fn decode_hex(s: &str) -> Result<Value, DecodeError> {
    decode(&hex_to_bytes(s)?)
}

/// Parse hex text, ignoring whitespace and an optional `0x` prefix.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}

fn check_unique_keys(value: &Value) -> Result<(), DecodeError> {
    match value {
        Value::Array(items) => items.iter().try_for_each(check_unique_keys),
        Value::Map(entries) => {
            let mut keys = Vec::with_capacity(entries.len());
            for (key, v) in entries {
                let mut encoded = Vec::new();
                encode_value(&mut encoded, key)
                    .map_err(|e| DecodeError::Malformed(e.to_string()))?;
                keys.push(encoded);
                check_unique_keys(v)?;
            }
            keys.sort_unstable();
            if keys.windows(2).any(|w| w[0] == w[1]) {
                return Err(DecodeError::Malformed("duplicate map key".into()));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Well-formedness walk over raw bytes, run before building a value.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.bytes.len() - self.pos;
        if n > remaining {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn argument(&mut self, offset: usize, major: u8, info: u8) -> Result<u64, DecodeError> {
        let width = match info {
            0..=23 => return Ok(u64::from(info)),
            24 => 1,
            25 => 2,
            26 => 4,
            27 => 8,
            28..=30 => return Err(DecodeError::ReservedAdditionalInfo { offset, info }),
            _ if (2..=5).contains(&major) => return Err(DecodeError::IndefiniteLength { offset }),
            _ => return Err(DecodeError::Malformed(format!("unexpected break at offset {offset}"))),
        };
        let raw = self.take(width)?;
        Ok(raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    fn item(&mut self, depth: usize) -> Result<(), DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep { max: MAX_DEPTH });
        }

        let offset = self.pos;
        let initial = self.take(1)?[0];
        let major = initial >> 5;
        let info = initial & 0x1f;

        if major == 7 {
            return match info {
                20..=22 => Ok(()),
                25..=27 => Err(DecodeError::UnsupportedItem { offset, what: "float" }),
                31 => Err(DecodeError::Malformed(format!("unexpected break at offset {offset}"))),
                28..=30 => Err(DecodeError::ReservedAdditionalInfo { offset, info }),
                _ => Err(DecodeError::UnsupportedItem { offset, what: "simple value" }),
            };
        }

        let arg = self.argument(offset, major, info)?;
        match major {
            0 | 1 => Ok(()),
            2 => self.take(length(arg, offset)?).map(|_| ()),
            3 => {
                let text = self.take(length(arg, offset)?)?;
                std::str::from_utf8(text)
                    .map(|_| ())
                    .map_err(|_| DecodeError::Malformed(format!("invalid utf-8 at offset {offset}")))
            }
            4 => (0..arg).try_for_each(|_| self.item(depth + 1)),
            5 => (0..arg).try_for_each(|_| {
                self.item(depth + 1)?;
                self.item(depth + 1)
            }),
            _ => Err(DecodeError::UnsupportedItem { offset, what: "tag" }),
        }
    }
}

fn length(arg: u64, offset: usize) -> Result<usize, DecodeError> {
    usize::try_from(arg)
        .map_err(|_| DecodeError::Malformed(format!("length {arg} at offset {offset} overflows")))
}
