//! Error types for CIP-36 core primitives.

use thiserror::Error;

/// Errors raised while turning raw input into a structured value.
///
/// Every variant means the input is not well-formed at the format level.
/// Grammar violations are reported separately by the schema layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("truncated input: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("{count} trailing bytes after the top-level item")]
    TrailingBytes { count: usize },

    #[error("indefinite-length item at offset {offset}")]
    IndefiniteLength { offset: usize },

    #[error("reserved additional information {info} at offset {offset}")]
    ReservedAdditionalInfo { offset: usize, info: u8 },

    #[error("unsupported item at offset {offset}: {what}")]
    UnsupportedItem { offset: usize, what: &'static str },

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("malformed cbor: {0}")]
    Malformed(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid json metadata: {0}")]
    InvalidJson(String),
}

/// Core errors for key handling and encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("missing or invalid field {field} in {payload}")]
    MissingField { payload: &'static str, field: u64 },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
