//! CIP-36 payload layouts: builders for the three bodies and typed views
//! over decoded values.
//!
//! Builders produce the body stored under the label; use
//! [`codec::encode_metadata`](crate::codec::encode_metadata) or the builders'
//! `encode` to get canonical payload bytes.

use ciborium::value::Value;

use crate::codec::{as_u64, encode_metadata, map_get, uint};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Witness};
use crate::error::CoreError;
use crate::types::MetadataKind;

/// Integer field tags inside each payload body.
pub mod keys {
    /// Fields of the 61284 registration body.
    pub mod registration {
        pub const VOTE_KEY: u64 = 1;
        pub const STAKE_KEY: u64 = 2;
        pub const PAYMENT_ADDRESS: u64 = 3;
        pub const NONCE: u64 = 4;
        pub const VOTING_PURPOSE: u64 = 5;
    }

    /// Fields of the 61285 witness body.
    pub mod witness {
        pub const STAKE_WITNESS: u64 = 1;
        pub const VOTE_WITNESS: u64 = 2;
    }

    /// Fields of the 61286 deregistration body.
    pub mod deregistration {
        pub const STAKE_KEY: u64 = 1;
        pub const NONCE: u64 = 2;
        pub const VOTING_PURPOSE: u64 = 3;
    }
}

/// Voting purpose 0 is Catalyst.
pub const CATALYST_VOTING_PURPOSE: u64 = 0;

/// One weighted delegation of voting power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delegation {
    pub key: [u8; 32],
    pub weight: u32,
}

/// Where voting power goes: a single legacy key or weighted delegations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteTarget {
    Legacy([u8; 32]),
    Delegations(Vec<Delegation>),
}

impl VoteTarget {
    /// The key that can sign for the vote role, if there is exactly one.
    pub fn single_key(&self) -> Option<[u8; 32]> {
        match self {
            VoteTarget::Legacy(key) => Some(*key),
            VoteTarget::Delegations(d) if d.len() == 1 => Some(d[0].key),
            VoteTarget::Delegations(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            VoteTarget::Legacy(key) => Value::Bytes(key.to_vec()),
            VoteTarget::Delegations(delegations) => Value::Array(
                delegations
                    .iter()
                    .map(|d| Value::Array(vec![Value::Bytes(d.key.to_vec()), uint(d.weight.into())]))
                    .collect(),
            ),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => key32(b).map(VoteTarget::Legacy),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Array(pair) if pair.len() == 2 => {
                        let key = match &pair[0] {
                            Value::Bytes(b) => key32(b)?,
                            _ => return None,
                        };
                        let weight = u32::try_from(as_u64(&pair[1])?).ok()?;
                        Some(Delegation { key, weight })
                    }
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(VoteTarget::Delegations),
            _ => None,
        }
    }
}

/// Typed view of a 61284 registration body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub vote: VoteTarget,
    pub stake_key: [u8; 32],
    pub payment_address: Vec<u8>,
    pub nonce: u64,
    pub voting_purpose: Option<u64>,
}

impl Registration {
    /// Read the registration fields from a body value.
    pub fn from_body(body: &Value) -> Result<Self, CoreError> {
        use keys::registration::*;

        let missing = |field| CoreError::MissingField {
            payload: MetadataKind::Registration.name(),
            field,
        };

        let vote = map_get(body, VOTE_KEY)
            .and_then(VoteTarget::from_value)
            .ok_or_else(|| missing(VOTE_KEY))?;
        let stake_key = bytes_field(body, STAKE_KEY)
            .and_then(key32)
            .ok_or_else(|| missing(STAKE_KEY))?;
        let payment_address = bytes_field(body, PAYMENT_ADDRESS)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| missing(PAYMENT_ADDRESS))?;
        let nonce = map_get(body, NONCE)
            .and_then(as_u64)
            .ok_or_else(|| missing(NONCE))?;
        let voting_purpose = match map_get(body, VOTING_PURPOSE) {
            Some(v) => Some(as_u64(v).ok_or_else(|| missing(VOTING_PURPOSE))?),
            None => None,
        };

        Ok(Self {
            vote,
            stake_key,
            payment_address,
            nonce,
            voting_purpose,
        })
    }

    /// Build the body value.
    pub fn to_body(&self) -> Value {
        use keys::registration::*;

        let mut entries = vec![
            (uint(VOTE_KEY), self.vote.to_value()),
            (uint(STAKE_KEY), Value::Bytes(self.stake_key.to_vec())),
            (uint(PAYMENT_ADDRESS), Value::Bytes(self.payment_address.clone())),
            (uint(NONCE), uint(self.nonce)),
        ];
        if let Some(purpose) = self.voting_purpose {
            entries.push((uint(VOTING_PURPOSE), uint(purpose)));
        }
        Value::Map(entries)
    }

    /// Canonical `{61284: body}` bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_metadata(MetadataKind::Registration, &self.to_body())
    }
}

/// Builder for registration bodies.
#[derive(Debug, Clone)]
pub struct RegistrationBuilder {
    stake_key: Ed25519PublicKey,
    payment_address: Vec<u8>,
    nonce: u64,
    legacy_key: Option<Ed25519PublicKey>,
    delegations: Vec<Delegation>,
    voting_purpose: Option<u64>,
}

impl RegistrationBuilder {
    /// Start building a registration.
    pub fn new(stake_key: Ed25519PublicKey, payment_address: impl Into<Vec<u8>>, nonce: u64) -> Self {
        Self {
            stake_key,
            payment_address: payment_address.into(),
            nonce,
            legacy_key: None,
            delegations: Vec::new(),
            voting_purpose: None,
        }
    }

    /// Register a single vote key (the CIP-15 form).
    pub fn legacy_vote_key(mut self, key: Ed25519PublicKey) -> Self {
        self.legacy_key = Some(key);
        self.delegations.clear();
        self
    }

    /// Add a weighted delegation.
    pub fn delegate(mut self, key: Ed25519PublicKey, weight: u32) -> Self {
        self.legacy_key = None;
        self.delegations.push(Delegation {
            key: *key.as_bytes(),
            weight,
        });
        self
    }

    /// Set the voting purpose.
    pub fn voting_purpose(mut self, purpose: u64) -> Self {
        self.voting_purpose = Some(purpose);
        self
    }

    /// Finish the registration. Fails if no vote key or delegation was set.
    pub fn build(self) -> Result<Registration, CoreError> {
        let vote = match self.legacy_key {
            Some(key) => VoteTarget::Legacy(*key.as_bytes()),
            None if !self.delegations.is_empty() => VoteTarget::Delegations(self.delegations),
            None => {
                return Err(CoreError::MissingField {
                    payload: MetadataKind::Registration.name(),
                    field: keys::registration::VOTE_KEY,
                })
            }
        };

        Ok(Registration {
            vote,
            stake_key: *self.stake_key.as_bytes(),
            payment_address: self.payment_address,
            nonce: self.nonce,
            voting_purpose: self.voting_purpose,
        })
    }
}

/// Builder for 61286 deregistration bodies.
#[derive(Debug, Clone)]
pub struct DeregistrationBuilder {
    stake_key: Ed25519PublicKey,
    nonce: u64,
    voting_purpose: Option<u64>,
}

impl DeregistrationBuilder {
    pub fn new(stake_key: Ed25519PublicKey, nonce: u64) -> Self {
        Self {
            stake_key,
            nonce,
            voting_purpose: None,
        }
    }

    pub fn voting_purpose(mut self, purpose: u64) -> Self {
        self.voting_purpose = Some(purpose);
        self
    }

    pub fn build(&self) -> Value {
        use keys::deregistration::*;

        let mut entries = vec![
            (uint(STAKE_KEY), Value::Bytes(self.stake_key.as_bytes().to_vec())),
            (uint(NONCE), uint(self.nonce)),
        ];
        if let Some(purpose) = self.voting_purpose {
            entries.push((uint(VOTING_PURPOSE), uint(purpose)));
        }
        Value::Map(entries)
    }

    /// Canonical `{61286: body}` bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_metadata(MetadataKind::Deregistration, &self.build())
    }
}

/// Raw public keys a registration names for each witness role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationKeys {
    pub stake: [u8; 32],
    /// Unset unless field 1 is a legacy key or a single delegation.
    pub vote: Option<[u8; 32]>,
}

/// Read the stake key (field 2) and, where unambiguous, the vote key
/// (field 1) from a registration body.
///
/// Only the stake key is required. The bytes are not checked to be curve
/// points here.
pub fn registration_keys(body: &Value) -> Result<RegistrationKeys, CoreError> {
    use keys::registration::*;

    let stake = bytes_field(body, STAKE_KEY)
        .and_then(key32)
        .ok_or(CoreError::MissingField {
            payload: MetadataKind::Registration.name(),
            field: STAKE_KEY,
        })?;
    let vote = map_get(body, VOTE_KEY)
        .and_then(VoteTarget::from_value)
        .and_then(|target| target.single_key());

    Ok(RegistrationKeys { stake, vote })
}

/// Witness body: `{1: stake_sig, 2: vote_sig}` with absent roles omitted.
pub fn witness_body(witness: &Witness) -> Value {
    use keys::witness::*;

    let mut entries = Vec::with_capacity(2);
    if let Some(sig) = &witness.stake {
        entries.push((uint(STAKE_WITNESS), Value::Bytes(sig.as_bytes().to_vec())));
    }
    if let Some(sig) = &witness.vote {
        entries.push((uint(VOTE_WITNESS), Value::Bytes(sig.as_bytes().to_vec())));
    }
    Value::Map(entries)
}

/// Read the signatures out of a witness body.
pub fn witness_signatures(body: &Value) -> Result<Witness, CoreError> {
    use keys::witness::*;

    let signature = |field| match map_get(body, field) {
        None => Ok(None),
        Some(Value::Bytes(b)) => Ed25519Signature::from_slice(b).map(Some).ok_or(
            CoreError::MissingField {
                payload: MetadataKind::Witness.name(),
                field,
            },
        ),
        Some(_) => Err(CoreError::MissingField {
            payload: MetadataKind::Witness.name(),
            field,
        }),
    };

    Ok(Witness {
        stake: signature(STAKE_WITNESS)?,
        vote: signature(VOTE_WITNESS)?,
    })
}

fn bytes_field(body: &Value, field: u64) -> Option<&[u8]> {
    match map_get(body, field)? {
        Value::Bytes(b) => Some(b.as_slice()),
        _ => None,
    }
}

fn key32(bytes: &[u8]) -> Option<[u8; 32]> {
    bytes.try_into().ok()
}
