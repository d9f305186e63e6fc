//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::Path;
use std::sync::OnceLock;

use cip36::core::{CoreError, DeregistrationBuilder, Registration, RegistrationBuilder};
use cip36::{
    Ed25519PublicKey, KeyPairSet, KeyRole, Keypair, MetadataKind, RegistrationRecord, Result,
    SchemaConfig, SchemaSet,
};

/// The grammar directory shipped with the workspace.
pub fn schema_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../schema"))
}

/// Workspace grammars, loaded once per test binary.
///
/// Panics if the grammar files are missing.
pub fn schemas() -> &'static SchemaSet {
    static SCHEMAS: OnceLock<SchemaSet> = OnceLock::new();
    SCHEMAS.get_or_init(|| {
        SchemaSet::load(&SchemaConfig::new(schema_dir()))
            .unwrap_or_else(|e| panic!("workspace grammars must load: {e}"))
    })
}

/// Install a test-writer subscriber so `RUST_LOG`-style output shows up
/// under `cargo test -- --nocapture`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A voter: stake and vote signing keys plus a payment address.
pub struct TestFixture {
    pub stake: Keypair,
    pub vote: Keypair,
    pub payment_address: Vec<u8>,
}

impl TestFixture {
    /// Create a new test fixture with random keys.
    pub fn new() -> Self {
        Self::from_keypairs(Keypair::generate(), Keypair::generate())
    }

    /// Create with deterministic keys; the vote seed is the stake seed with
    /// its last byte inverted.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let mut vote_seed = seed;
        vote_seed[31] = !vote_seed[31];
        Self::from_keypairs(Keypair::from_seed(&seed), Keypair::from_seed(&vote_seed))
    }

    fn from_keypairs(stake: Keypair, vote: Keypair) -> Self {
        // Enterprise mainnet header, stake key bytes as filler credential.
        let mut payment_address = vec![0x61];
        payment_address.extend_from_slice(&stake.public_key().as_bytes()[..28]);
        Self {
            stake,
            vote,
            payment_address,
        }
    }

    pub fn public_key(&self, role: KeyRole) -> Ed25519PublicKey {
        match role {
            KeyRole::Stake => self.stake.public_key(),
            KeyRole::Vote => self.vote.public_key(),
        }
    }

    /// Signing keys for both roles.
    pub fn keys(&self) -> KeyPairSet {
        KeyPairSet::from_seeds(&self.stake.seed(), &self.vote.seed())
    }

    /// Verification-only keys for both roles.
    pub fn public_keys(&self) -> KeyPairSet {
        KeyPairSet::new()
            .with_stake(cip36::core::RoleKey::VerifyOnly(self.stake.public_key()))
            .with_vote(cip36::core::RoleKey::VerifyOnly(self.vote.public_key()))
    }

    /// A Catalyst registration with the vote key in legacy form.
    pub fn make_registration(&self, nonce: u64) -> std::result::Result<Registration, CoreError> {
        RegistrationBuilder::new(self.stake.public_key(), self.payment_address.clone(), nonce)
            .legacy_vote_key(self.vote.public_key())
            .voting_purpose(0)
            .build()
    }

    /// A deregistration for this voter's stake key.
    pub fn make_deregistration(&self, nonce: u64) -> DeregistrationBuilder {
        DeregistrationBuilder::new(self.stake.public_key(), nonce).voting_purpose(0)
    }

    /// A record with a validated registration and this fixture's keys
    /// bound, ready to witness.
    pub fn record<'s>(&self, schemas: &'s SchemaSet, nonce: u64) -> Result<RegistrationRecord<'s>> {
        let mut record = RegistrationRecord::new(schemas).with_keys(self.keys());
        record.load_body(MetadataKind::Registration, self.make_registration(nonce)?.to_body())?;
        record.validate_all()?;
        Ok(record)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: u8) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cip36::SignatureCheck;

    #[test]
    fn test_fixture_record_ready_to_witness() {
        init_tracing();
        let fixture = TestFixture::new();
        let mut record = fixture.record(schemas(), 42).unwrap();

        assert!(record.slot(MetadataKind::Registration).is_validated());
        record.generate_witness(true, true).unwrap();
        record.validate_all().unwrap();

        let verification = record.verify_signatures().unwrap();
        assert_eq!(verification.stake, SignatureCheck::Valid);
        assert_eq!(verification.vote, SignatureCheck::Valid);
    }

    #[test]
    fn test_fixture_deregistration_validates() {
        let fixture = TestFixture::with_seed([3; 32]);
        let mut record = RegistrationRecord::new(schemas());
        record
            .load_body(MetadataKind::Deregistration, fixture.make_deregistration(9).build())
            .unwrap();
        record.validate_all().unwrap();
    }

    #[test]
    fn test_public_keys_cannot_sign() {
        let fixture = TestFixture::with_seed([5; 32]);
        let mut record = RegistrationRecord::new(schemas()).with_keys(fixture.public_keys());
        record
            .load_body(
                MetadataKind::Registration,
                fixture.make_registration(1).unwrap().to_body(),
            )
            .unwrap();
        record.validate_all().unwrap();

        let witness = record.generate_witness(true, true).unwrap();
        assert!(witness.is_empty());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has unique keys
        let pks: Vec<_> = parties.iter().map(|p| p.public_key(KeyRole::Stake)).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
        assert_ne!(parties[0].public_key(KeyRole::Vote), pks[0]);
    }
}
