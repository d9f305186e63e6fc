//! Error types for grammar loading and validation.

use std::path::PathBuf;

use cip36_core::{DecodeError, MetadataKind};
use thiserror::Error;

/// A payload was rejected by the grammar for its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The bytes are not well-formed CBOR.
    #[error("{kind} payload is not well-formed: {source}")]
    Malformed {
        kind: MetadataKind,
        #[source]
        source: DecodeError,
    },

    /// Well-formed bytes that do not match the grammar.
    #[error("{kind} payload violates its grammar: {reason}")]
    Violation { kind: MetadataKind, reason: String },
}

impl SchemaError {
    /// The metadata kind whose grammar rejected the payload.
    pub fn kind(&self) -> MetadataKind {
        match self {
            SchemaError::Malformed { kind, .. } | SchemaError::Violation { kind, .. } => *kind,
        }
    }
}

/// Grammar files could not be loaded. Fatal: nothing can be validated.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("cannot read {kind} grammar at {}: {source}", path.display())]
    Io {
        kind: MetadataKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {kind} grammar: {reason}")]
    InvalidGrammar { kind: MetadataKind, reason: String },
}
