//! # CIP-36 Testkit
//!
//! Testing utilities for CIP-36 registrations.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Network-captured registrations and deterministic
//!   generated ones with exact expected bytes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Voters with keys, and the workspace grammars
//!
//! ## Golden Vectors
//!
//! ```rust
//! use cip36_testkit::{fixtures::schemas, vectors::{all_vectors, generate_vector}};
//!
//! for vector in all_vectors() {
//!     let generated = generate_vector(&vector, schemas()).unwrap();
//!     println!("{}: {}", generated.name, generated.witness);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cip36_testkit::generators::{registration_from_params, RegistrationParams};
//!
//! proptest! {
//!     #[test]
//!     fn encoding_is_deterministic(params: RegistrationParams) {
//!         let a = registration_from_params(&params).unwrap();
//!         let b = registration_from_params(&params).unwrap();
//!         prop_assert_eq!(a.encode().unwrap(), b.encode().unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use cip36_testkit::fixtures::{schemas, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let mut record = fixture.record(schemas(), 1).unwrap();
//! record.generate_witness(true, true).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, multi_party_fixtures, schema_dir, schemas, TestFixture};
pub use generators::{registration_from_params, RegistrationParams};
pub use vectors::{
    all_vectors, generate_record, generate_vector, verify_all_vectors, GeneratedVector,
    GoldenVector,
};
