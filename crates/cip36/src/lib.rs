//! # CIP-36
//!
//! Validation and test-vector generation for CIP-36 voter registrations.
//!
//! ## Overview
//!
//! A CIP-36 registration is up to three transaction-metadata payloads:
//!
//! - **Registration** (61284): vote key or delegations, stake key, payment
//!   address, nonce and voting purpose
//! - **Witness** (61285): stake and vote signatures over the BLAKE2b-256 hash
//!   of the registration bytes
//! - **Deregistration** (61286): stake key, nonce and voting purpose
//!
//! A [`RegistrationRecord`] holds one of each, validates them against the
//! CDDL grammars in a shared [`SchemaSet`], and generates or verifies the
//! witness.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cip36::{MetadataKind, RegistrationRecord, SchemaConfig, SchemaSet};
//!
//! fn example(registration_hex: &str, witness_hex: &str) -> cip36::Result<()> {
//!     let schemas = SchemaSet::load(&SchemaConfig::default()).unwrap();
//!
//!     let mut record =
//!         RegistrationRecord::from_hex(&schemas, Some(registration_hex), Some(witness_hex), None)?;
//!     record.validate_all()?;
//!
//!     let verification = record.verify_signatures()?;
//!     println!("stake signature: {:?}", verification.stake.as_option());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `cip36::core` - Codec, hashing, keys and payload layouts
//! - `cip36::schema` - Grammar loading and validation

pub mod config;
pub mod error;
pub mod record;

pub use cip36_core as core;
pub use cip36_schema as schema;

pub use config::RecordConfig;
pub use error::{RecordError, Result};
pub use record::{Payload, RegistrationRecord, SlotState};

pub use cip36_core::{
    Blake2b256Hash, Ed25519PublicKey, Ed25519Signature, KeyPairSet, KeyRole, Keypair,
    MetadataKind, SignatureCheck, Value, Verification, Witness,
};
pub use cip36_schema::{SchemaConfig, SchemaError, SchemaSet};
