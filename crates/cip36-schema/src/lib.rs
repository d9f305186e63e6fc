//! # CIP-36 Schema
//!
//! Loads the CDDL grammars for the three CIP-36 payloads and validates
//! payload bytes against them.
//!
//! The grammar text is input data: this crate never writes or derives it.
//! Grammars are read once, from [`SchemaConfig::dir`], and the resulting
//! [`SchemaSet`] is shared read-only.
//!
//! ```rust,no_run
//! use cip36_schema::{SchemaConfig, SchemaSet};
//! use cip36_core::MetadataKind;
//!
//! let schemas = SchemaSet::load(&SchemaConfig::default()).unwrap();
//! let payload = hex::decode("a119ef65a1015840...").unwrap_or_default();
//! let _ = schemas.validate(MetadataKind::Witness, &payload);
//! ```

pub mod config;
pub mod error;
pub mod schema;

pub use config::{SchemaConfig, DEFAULT_SCHEMA_DIR};
pub use error::{SchemaError, SchemaLoadError};
pub use schema::{Schema, SchemaSet};
