//! Error types for registration records.

use cip36_core::{CoreError, DecodeError, MetadataKind};
use cip36_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while driving a registration record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Input could not be decoded; the slot was left unchanged.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Key material or encoding failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A payload was rejected by its grammar.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The operation needs a payload in this slot.
    #[error("{0} slot is absent")]
    SlotAbsent(MetadataKind),

    /// The operation needs this slot to have passed validation.
    #[error("{0} slot has not been validated")]
    SlotNotValidated(MetadataKind),

    /// Witness generation needs signing keys.
    #[error("no key set bound to the record")]
    NoKeys,

    /// One or more slots failed validation.
    #[error("{} slot(s) failed validation", .0.len())]
    ValidationFailed(Vec<SchemaError>),
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
