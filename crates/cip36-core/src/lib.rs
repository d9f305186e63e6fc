//! # CIP-36 Core
//!
//! Pure primitives for CIP-36 voter-registration metadata: canonical CBOR,
//! BLAKE2b-256 content hashing, and two-role Ed25519 witnesses.
//!
//! This crate contains no I/O. Grammar validation lives in `cip36-schema`;
//! the per-registration workflow lives in `cip36`.
//!
//! ## Key Types
//!
//! - [`MetadataKind`] - Registration (61284), witness (61285), deregistration (61286)
//! - [`Blake2b256Hash`] - Content hash that witnesses sign
//! - [`KeyPairSet`] - Stake and vote keys; produces and checks [`Witness`]es
//! - [`Registration`] - Typed view of a registration body
//!
//! ## Encoding
//!
//! Payloads are encoded with deterministic CBOR and decoded strictly. See
//! the [`codec`] module.

pub mod codec;
pub mod crypto;
pub mod diag;
pub mod error;
pub mod hash;
pub mod json;
pub mod metadata;
pub mod types;

pub use ciborium::value::Value;

pub use codec::{decode, decode_hex, encode, encode_metadata, metadata_body};
pub use crypto::{
    generate_keys, Ed25519PublicKey, Ed25519Signature, KeyPairSet, KeyRole, Keypair, RoleKey,
    SignatureCheck, Verification, Witness,
};
pub use diag::diagnostic;
pub use error::{CoreError, DecodeError};
pub use hash::{content_hash, Blake2b256Hash};
pub use json::{value_from_json, value_from_json_str, value_to_json};
pub use metadata::{
    registration_keys, witness_body, witness_signatures, Delegation, DeregistrationBuilder,
    Registration, RegistrationBuilder, RegistrationKeys, VoteTarget,
};
pub use types::{MetadataKind, DEREGISTRATION_LABEL, REGISTRATION_LABEL, WITNESS_LABEL};
