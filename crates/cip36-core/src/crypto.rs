//! Ed25519 keys and the two-role witness protocol.
//!
//! A registration carries two independent roles: the stake key (proves
//! control of the staking credential) and the vote key (the key voting
//! power is delegated to). Either role may be signed, verified, or left
//! out; a missing role is reported as such and never as a failure.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::hash::Blake2b256Hash;

/// A 32-byte Ed25519 public key.
///
/// Construction through [`Ed25519PublicKey::from_slice`] checks that the bytes
/// decompress to a curve point. Deserialization goes through the same check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 32]", into = "[u8; 32]")]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Parse and validate externally supplied key bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CoreError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Self::from_bytes(arr)
    }

    /// Validate a raw 32-byte key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CoreError> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| CoreError::InvalidKey("not a valid curve point".into()))?;
        Ok(Self(bytes))
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        // Bytes were validated at construction.
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        key.verify(message, &Signature::from_bytes(&signature.0)).is_ok()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({}...)", &self.to_hex()[..16])
    }
}

impl TryFrom<[u8; 32]> for Ed25519PublicKey {
    type Error = CoreError;

    fn try_from(bytes: [u8; 32]) -> Result<Self, CoreError> {
        Self::from_bytes(bytes)
    }
}

impl From<Ed25519PublicKey> for [u8; 32] {
    fn from(key: Ed25519PublicKey) -> Self {
        key.0
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// An Ed25519 signing keypair.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair from the OS-seeded CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Ed25519 signatures are deterministic.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// Generate a fresh keypair and return it with its public half.
pub fn generate_keys() -> (Keypair, Ed25519PublicKey) {
    let keypair = Keypair::generate();
    let public = keypair.public_key();
    (keypair, public)
}

/// Key material for one role.
#[derive(Debug, Clone)]
pub enum RoleKey {
    /// Full keypair: can sign and verify.
    Signing(Keypair),
    /// Externally supplied public key: verify only.
    VerifyOnly(Ed25519PublicKey),
}

impl RoleKey {
    pub fn public_key(&self) -> Ed25519PublicKey {
        match self {
            RoleKey::Signing(kp) => kp.public_key(),
            RoleKey::VerifyOnly(pk) => *pk,
        }
    }

    pub fn keypair(&self) -> Option<&Keypair> {
        match self {
            RoleKey::Signing(kp) => Some(kp),
            RoleKey::VerifyOnly(_) => None,
        }
    }
}

/// The two signing roles of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Stake,
    Vote,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Stake => f.write_str("stake"),
            KeyRole::Vote => f.write_str("vote"),
        }
    }
}

/// Signatures produced for one payload hash. Unsigned roles are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Witness {
    pub stake: Option<Ed25519Signature>,
    pub vote: Option<Ed25519Signature>,
}

impl Witness {
    pub fn get(&self, role: KeyRole) -> Option<&Ed25519Signature> {
        match role {
            KeyRole::Stake => self.stake.as_ref(),
            KeyRole::Vote => self.vote.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stake.is_none() && self.vote.is_none()
    }
}

/// Outcome of checking one role.
///
/// `NotChecked` means no key was available or the role was not requested.
/// It is not a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureCheck {
    Valid,
    Invalid,
    #[default]
    NotChecked,
}

impl SignatureCheck {
    /// `Some(true)`, `Some(false)`, or `None` for not checked.
    pub fn as_option(self) -> Option<bool> {
        match self {
            SignatureCheck::Valid => Some(true),
            SignatureCheck::Invalid => Some(false),
            SignatureCheck::NotChecked => None,
        }
    }

    pub fn is_valid(self) -> bool {
        self == SignatureCheck::Valid
    }

    /// Prefer a checked result over `NotChecked`.
    pub fn or(self, other: SignatureCheck) -> SignatureCheck {
        match self {
            SignatureCheck::NotChecked => other,
            checked => checked,
        }
    }
}

impl From<bool> for SignatureCheck {
    fn from(valid: bool) -> Self {
        if valid {
            SignatureCheck::Valid
        } else {
            SignatureCheck::Invalid
        }
    }
}

/// Per-role verification results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub stake: SignatureCheck,
    pub vote: SignatureCheck,
}

impl Verification {
    pub fn get(&self, role: KeyRole) -> SignatureCheck {
        match role {
            KeyRole::Stake => self.stake,
            KeyRole::Vote => self.vote,
        }
    }

    /// Merge two partial verifications, keeping checked results.
    pub fn merge(self, other: Verification) -> Verification {
        Verification {
            stake: self.stake.or(other.stake),
            vote: self.vote.or(other.vote),
        }
    }

    /// True when no checked role failed and at least one role passed.
    pub fn all_checked_valid(&self) -> bool {
        let checks = [self.stake, self.vote];
        !checks.contains(&SignatureCheck::Invalid) && checks.contains(&SignatureCheck::Valid)
    }
}

/// Stake and vote keys for one registration.
#[derive(Debug, Clone, Default)]
pub struct KeyPairSet {
    stake: Option<RoleKey>,
    vote: Option<RoleKey>,
}

impl KeyPairSet {
    /// An empty set; nothing is signed or checked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh signing keys for both roles.
    pub fn generate() -> Self {
        Self {
            stake: Some(RoleKey::Signing(Keypair::generate())),
            vote: Some(RoleKey::Signing(Keypair::generate())),
        }
    }

    /// Deterministic signing keys for both roles.
    pub fn from_seeds(stake_seed: &[u8; 32], vote_seed: &[u8; 32]) -> Self {
        Self {
            stake: Some(RoleKey::Signing(Keypair::from_seed(stake_seed))),
            vote: Some(RoleKey::Signing(Keypair::from_seed(vote_seed))),
        }
    }

    /// Verification-only set from raw public key bytes.
    ///
    /// A `None` input leaves that role absent.
    pub fn from_public_keys(stake: Option<&[u8]>, vote: Option<&[u8]>) -> Result<Self, CoreError> {
        let stake = stake
            .map(Ed25519PublicKey::from_slice)
            .transpose()?
            .map(RoleKey::VerifyOnly);
        let vote = vote
            .map(Ed25519PublicKey::from_slice)
            .transpose()?
            .map(RoleKey::VerifyOnly);
        Ok(Self { stake, vote })
    }

    pub fn with_stake(mut self, key: RoleKey) -> Self {
        self.stake = Some(key);
        self
    }

    pub fn with_vote(mut self, key: RoleKey) -> Self {
        self.vote = Some(key);
        self
    }

    pub fn key(&self, role: KeyRole) -> Option<&RoleKey> {
        match role {
            KeyRole::Stake => self.stake.as_ref(),
            KeyRole::Vote => self.vote.as_ref(),
        }
    }

    pub fn public_key(&self, role: KeyRole) -> Option<Ed25519PublicKey> {
        self.key(role).map(RoleKey::public_key)
    }

    /// Sign a payload hash with each requested role that can sign.
    ///
    /// A requested role without a signing key yields `None` for that slot.
    pub fn witness(&self, payload_hash: &Blake2b256Hash, sign_stake: bool, sign_vote: bool) -> Witness {
        let sign = |requested: bool, role: KeyRole| {
            if !requested {
                return None;
            }
            self.key(role)
                .and_then(RoleKey::keypair)
                .map(|kp| kp.sign(payload_hash.as_bytes()))
        };

        Witness {
            stake: sign(sign_stake, KeyRole::Stake),
            vote: sign(sign_vote, KeyRole::Vote),
        }
    }

    /// Check one signature over a payload hash against the requested roles.
    ///
    /// A mismatch is reported as `Invalid`; roles without a key or not
    /// requested are `NotChecked`.
    pub fn verify(
        &self,
        payload_hash: &Blake2b256Hash,
        signature: &Ed25519Signature,
        check_stake: bool,
        check_vote: bool,
    ) -> Verification {
        let check = |requested: bool, role: KeyRole| {
            if !requested {
                return SignatureCheck::NotChecked;
            }
            match self.public_key(role) {
                Some(pk) => pk.verify(payload_hash.as_bytes(), signature).into(),
                None => SignatureCheck::NotChecked,
            }
        };

        Verification {
            stake: check(check_stake, KeyRole::Stake),
            vote: check(check_vote, KeyRole::Vote),
        }
    }

    /// Check each present witness signature against its own role.
    pub fn verify_witness(&self, payload_hash: &Blake2b256Hash, witness: &Witness) -> Verification {
        let stake = witness
            .stake
            .map(|sig| self.verify(payload_hash, &sig, true, false))
            .unwrap_or_default();
        let vote = witness
            .vote
            .map(|sig| self.verify(payload_hash, &sig, false, true))
            .unwrap_or_default();
        stake.merge(vote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::content_hash;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"hello world");

        assert!(keypair.public_key().verify(b"hello world", &signature));
        assert!(!keypair.public_key().verify(b"hello worlD", &signature));
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"msg"), kp2.sign(b"msg"));
    }

    #[test]
    fn test_generate_keys_fresh() {
        let (kp1, pk1) = generate_keys();
        let (_, pk2) = generate_keys();
        assert_eq!(kp1.public_key(), pk1);
        assert_ne!(pk1, pk2);
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        assert!(matches!(
            Ed25519PublicKey::from_slice(&[0u8; 31]),
            Err(CoreError::InvalidKey(_))
        ));
        assert!(matches!(
            Ed25519PublicKey::from_slice(&[0u8; 33]),
            Err(CoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_public_key_rejects_off_curve_point() {
        // y = 2 has no valid x on edwards25519.
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        assert!(matches!(
            Ed25519PublicKey::from_bytes(bytes),
            Err(CoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_public_key_deserialize_checks_curve_point() {
        let pk = Keypair::from_seed(&[4; 32]).public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(serde_json::from_str::<Ed25519PublicKey>(&json).unwrap(), pk);

        let mut off_curve = [0u8; 32];
        off_curve[0] = 2;
        let json = serde_json::to_string(&off_curve).unwrap();
        assert!(serde_json::from_str::<Ed25519PublicKey>(&json).is_err());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Keypair::generate().public_key();
        assert_eq!(Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
    }

    #[test]
    fn test_witness_verify_both_roles() {
        let keys = KeyPairSet::generate();
        let hash = content_hash(b"payload");

        let witness = keys.witness(&hash, true, true);
        let verification = keys.verify_witness(&hash, &witness);

        assert_eq!(verification.stake, SignatureCheck::Valid);
        assert_eq!(verification.vote, SignatureCheck::Valid);
    }

    #[test]
    fn test_partial_witness_stake_only() {
        let keys = KeyPairSet::generate();
        let hash = content_hash(b"payload");

        let witness = keys.witness(&hash, true, false);
        assert!(witness.stake.is_some());
        assert!(witness.vote.is_none());

        let sig = witness.stake.unwrap();
        let verification = keys.verify(&hash, &sig, true, true);
        assert_eq!(verification.stake, SignatureCheck::Valid);
        // The stake signature does not verify under the vote key.
        assert_eq!(verification.vote, SignatureCheck::Invalid);

        let verification = keys.verify_witness(&hash, &witness);
        assert_eq!(verification.vote, SignatureCheck::NotChecked);
    }

    #[test]
    fn test_requested_but_absent_key_is_not_an_error() {
        let stake = Keypair::from_seed(&[1; 32]);
        let keys = KeyPairSet::new().with_stake(RoleKey::Signing(stake));
        let hash = content_hash(b"payload");

        let witness = keys.witness(&hash, true, true);
        assert!(witness.stake.is_some());
        assert_eq!(witness.vote, None);

        let verification = keys.verify(&hash, &witness.stake.unwrap(), true, true);
        assert_eq!(verification.stake, SignatureCheck::Valid);
        assert_eq!(verification.vote, SignatureCheck::NotChecked);
    }

    #[test]
    fn test_verify_only_keys_cannot_sign() {
        let signer = KeyPairSet::from_seeds(&[1; 32], &[2; 32]);
        let stake_pk = signer.public_key(KeyRole::Stake).unwrap();
        let vote_pk = signer.public_key(KeyRole::Vote).unwrap();

        let verifier =
            KeyPairSet::from_public_keys(Some(stake_pk.as_bytes()), Some(vote_pk.as_bytes()))
                .unwrap();
        let hash = content_hash(b"payload");

        assert!(verifier.witness(&hash, true, true).is_empty());

        let witness = signer.witness(&hash, true, true);
        let verification = verifier.verify_witness(&hash, &witness);
        assert!(verification.all_checked_valid());
        assert_eq!(verification.vote, SignatureCheck::Valid);
    }

    #[test]
    fn test_signature_over_other_hash_is_invalid() {
        let keys = KeyPairSet::generate();
        let witness = keys.witness(&content_hash(b"one"), true, true);
        let verification = keys.verify_witness(&content_hash(b"two"), &witness);

        assert_eq!(verification.stake, SignatureCheck::Invalid);
        assert_eq!(verification.vote, SignatureCheck::Invalid);
        assert!(!verification.all_checked_valid());
    }

    #[test]
    fn test_signature_check_as_option() {
        assert_eq!(SignatureCheck::Valid.as_option(), Some(true));
        assert_eq!(SignatureCheck::Invalid.as_option(), Some(false));
        assert_eq!(SignatureCheck::NotChecked.as_option(), None);
    }
}
