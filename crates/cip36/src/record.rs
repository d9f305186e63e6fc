//! The per-registration workflow: three payload slots, validated
//! independently, witnessed and verified against one key set.

use bytes::Bytes;
use cip36_core::{
    codec, content_hash, diagnostic, metadata::CATALYST_VOTING_PURPOSE, registration_keys,
    value_from_json, value_to_json, witness_body, witness_signatures, Blake2b256Hash, CoreError,
    DecodeError, Ed25519PublicKey, KeyPairSet, KeyRole, MetadataKind, RegistrationBuilder,
    RoleKey, SignatureCheck, Value, Verification, Witness,
};
use cip36_schema::{SchemaError, SchemaSet};

use crate::config::RecordConfig;
use crate::error::{RecordError, Result};

/// One encoded payload and the value it decodes to.
///
/// The bytes are canonical when the payload was built from a value, and
/// exactly the input when it was loaded from bytes or hex.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    bytes: Bytes,
    value: Value,
}

impl Payload {
    /// Decode payload bytes strictly.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> std::result::Result<Self, DecodeError> {
        let bytes = bytes.into();
        let value = codec::decode(&bytes)?;
        Ok(Self { bytes, value })
    }

    /// Encode a full `{label: body}` value canonically.
    pub fn from_value(value: Value) -> Result<Self> {
        let bytes = codec::encode(&value)?;
        Ok(Self {
            bytes: Bytes::from(bytes),
            value,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The body stored under `kind`'s label, if present.
    pub fn body(&self, kind: MetadataKind) -> Option<&Value> {
        codec::metadata_body(&self.value, kind)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Cardano "no schema" metadata JSON.
    pub fn to_json(&self) -> serde_json::Value {
        value_to_json(&self.value)
    }

    /// CBOR diagnostic notation.
    pub fn diagnostic(&self) -> String {
        diagnostic(&self.value)
    }
}

/// Lifecycle of one metadata slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Absent,
    /// Well-formed but not yet checked against its grammar.
    Decoded(Payload),
    Validated(Payload),
    Failed { payload: Payload, error: SchemaError },
}

impl SlotState {
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            SlotState::Absent => None,
            SlotState::Decoded(p) | SlotState::Validated(p) => Some(p),
            SlotState::Failed { payload, .. } => Some(payload),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SlotState::Absent)
    }

    pub fn is_validated(&self) -> bool {
        matches!(self, SlotState::Validated(_))
    }

    fn name(&self) -> &'static str {
        match self {
            SlotState::Absent => "absent",
            SlotState::Decoded(_) => "decoded",
            SlotState::Validated(_) => "validated",
            SlotState::Failed { .. } => "failed",
        }
    }
}

/// Registration, witness and deregistration payloads for one voter.
///
/// Each slot moves `Absent -> Decoded -> Validated | Failed` on its own; a
/// failure in one slot never touches the others. Grammars are borrowed
/// from a shared [`SchemaSet`].
#[derive(Debug, Clone)]
pub struct RegistrationRecord<'s> {
    schemas: &'s SchemaSet,
    config: RecordConfig,
    slots: [SlotState; 3],
    keys: Option<KeyPairSet>,
}

impl<'s> RegistrationRecord<'s> {
    /// An empty record with default configuration.
    pub fn new(schemas: &'s SchemaSet) -> Self {
        Self::with_config(schemas, RecordConfig::default())
    }

    pub fn with_config(schemas: &'s SchemaSet, config: RecordConfig) -> Self {
        Self {
            schemas,
            config,
            slots: [SlotState::Absent, SlotState::Absent, SlotState::Absent],
            keys: None,
        }
    }

    /// Bind a key set used for witnessing and verification.
    pub fn with_keys(mut self, keys: KeyPairSet) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Bind freshly generated signing keys for both roles.
    pub fn with_new_keys(self) -> Self {
        self.with_keys(KeyPairSet::generate())
    }

    pub fn set_keys(&mut self, keys: KeyPairSet) {
        self.keys = Some(keys);
    }

    pub fn keys(&self) -> Option<&KeyPairSet> {
        self.keys.as_ref()
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    pub fn slot(&self, kind: MetadataKind) -> &SlotState {
        &self.slots[kind.index()]
    }

    pub fn payload(&self, kind: MetadataKind) -> Option<&Payload> {
        self.slot(kind).payload()
    }

    /// True when every present slot has passed validation.
    pub fn is_valid(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.is_absent() || slot.is_validated())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────

    /// Load raw payload bytes into a slot.
    ///
    /// On a decode error the slot keeps its previous state.
    pub fn load_bytes(&mut self, kind: MetadataKind, bytes: impl Into<Bytes>) -> Result<()> {
        let payload = Payload::from_bytes(bytes)?;
        self.install(kind, payload)
    }

    /// Load a hex-encoded payload into a slot.
    pub fn load_hex(&mut self, kind: MetadataKind, hex: &str) -> Result<()> {
        let bytes = codec::hex_to_bytes(hex)?;
        self.load_bytes(kind, bytes)
    }

    /// Load a full `{label: body}` value, encoding it canonically.
    pub fn load_value(&mut self, kind: MetadataKind, value: Value) -> Result<()> {
        let payload = Payload::from_value(value)?;
        self.install(kind, payload)
    }

    /// Load a body value, wrapping it under `kind`'s label.
    pub fn load_body(&mut self, kind: MetadataKind, body: Value) -> Result<()> {
        self.load_value(kind, codec::labeled(kind, body))
    }

    /// Load a payload from Cardano metadata JSON.
    pub fn load_json(&mut self, kind: MetadataKind, json: &serde_json::Value) -> Result<()> {
        let value = value_from_json(json)?;
        self.load_value(kind, value)
    }

    /// A record loaded from any subset of hex payloads.
    pub fn from_hex(
        schemas: &'s SchemaSet,
        registration: Option<&str>,
        witness: Option<&str>,
        deregistration: Option<&str>,
    ) -> Result<Self> {
        let mut record = Self::new(schemas);
        record.load_all_hex(registration, witness, deregistration)?;
        Ok(record)
    }

    /// A record loaded from any subset of metadata JSON payloads.
    pub fn from_json(
        schemas: &'s SchemaSet,
        registration: Option<&serde_json::Value>,
        witness: Option<&serde_json::Value>,
        deregistration: Option<&serde_json::Value>,
    ) -> Result<Self> {
        let mut record = Self::new(schemas);
        record.load_all_json(registration, witness, deregistration)?;
        Ok(record)
    }

    /// Load any subset of the three slots from hex.
    ///
    /// Every provided input is attempted; the first error is returned.
    pub fn load_all_hex(
        &mut self,
        registration: Option<&str>,
        witness: Option<&str>,
        deregistration: Option<&str>,
    ) -> Result<()> {
        self.load_each([registration, witness, deregistration], |record, kind, hex| {
            record.load_hex(kind, hex)
        })
    }

    /// Load any subset of the three slots from metadata JSON.
    pub fn load_all_json(
        &mut self,
        registration: Option<&serde_json::Value>,
        witness: Option<&serde_json::Value>,
        deregistration: Option<&serde_json::Value>,
    ) -> Result<()> {
        self.load_each([registration, witness, deregistration], |record, kind, json| {
            record.load_json(kind, json)
        })
    }

    fn load_each<T>(
        &mut self,
        inputs: [Option<T>; 3],
        mut load: impl FnMut(&mut Self, MetadataKind, T) -> Result<()>,
    ) -> Result<()> {
        let mut first_error = None;
        for (kind, input) in MetadataKind::ALL.into_iter().zip(inputs) {
            let Some(input) = input else { continue };
            if let Err(e) = load(self, kind, input) {
                tracing::debug!(%kind, error = %e, "load failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn install(&mut self, kind: MetadataKind, payload: Payload) -> Result<()> {
        tracing::debug!(%kind, len = payload.bytes().len(), "slot decoded");
        self.slots[kind.index()] = SlotState::Decoded(payload);
        if self.config.validate_on_load {
            self.validate_slot(kind)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────

    /// Validate one slot against its grammar.
    ///
    /// An absent slot passes. A slot that already failed reports its
    /// recorded error again.
    pub fn validate_slot(&mut self, kind: MetadataKind) -> std::result::Result<(), SchemaError> {
        let slot = &mut self.slots[kind.index()];
        let payload = match std::mem::replace(slot, SlotState::Absent) {
            SlotState::Decoded(payload) => payload,
            SlotState::Failed { payload, error } => {
                *slot = SlotState::Failed {
                    payload,
                    error: error.clone(),
                };
                return Err(error);
            }
            other => {
                *slot = other;
                return Ok(());
            }
        };

        match self.schemas.validate(kind, payload.bytes()) {
            Ok(()) => {
                tracing::debug!(%kind, "slot validated");
                *slot = SlotState::Validated(payload);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%kind, %error, "slot failed validation");
                *slot = SlotState::Failed {
                    payload,
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Validate every present slot.
    ///
    /// All slots are attempted. Succeeds when every non-absent slot ends
    /// `Validated`; otherwise every failure is returned.
    pub fn validate_all(&mut self) -> Result<()> {
        let failures: Vec<SchemaError> = MetadataKind::ALL
            .into_iter()
            .filter_map(|kind| self.validate_slot(kind).err())
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RecordError::ValidationFailed(failures))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Witnessing
    // ─────────────────────────────────────────────────────────────────────

    /// Hash of the registration payload bytes, which witnesses sign.
    pub fn registration_hash(&self) -> Option<Blake2b256Hash> {
        self.payload(MetadataKind::Registration)
            .map(|p| content_hash(p.bytes()))
    }

    /// Sign the validated registration and store the witness payload.
    ///
    /// Roles that are not requested, or whose key cannot sign, are left out
    /// of the witness. The witness slot becomes `Decoded`.
    pub fn generate_witness(&mut self, sign_stake: bool, sign_vote: bool) -> Result<Witness> {
        let registration = match self.slot(MetadataKind::Registration) {
            SlotState::Validated(payload) => payload,
            SlotState::Absent => return Err(RecordError::SlotAbsent(MetadataKind::Registration)),
            _ => return Err(RecordError::SlotNotValidated(MetadataKind::Registration)),
        };
        let keys = self.keys.as_ref().ok_or(RecordError::NoKeys)?;

        let hash = content_hash(registration.bytes());
        let witness = keys.witness(&hash, sign_stake, sign_vote);
        tracing::debug!(
            %hash,
            stake = witness.stake.is_some(),
            vote = witness.vote.is_some(),
            "generated witness"
        );

        self.load_body(MetadataKind::Witness, witness_body(&witness))?;
        Ok(witness)
    }

    /// Check the witness signatures against the registration hash.
    ///
    /// Uses the bound key set, or else the keys named in the registration.
    /// A signature that does not match is `Invalid`, never an error.
    pub fn verify_signatures(&self) -> Result<Verification> {
        let registration = self.present(MetadataKind::Registration)?;
        let witness = self.present(MetadataKind::Witness)?;

        let signatures = witness_signatures(body_of(witness, MetadataKind::Witness)?)?;
        let hash = content_hash(registration.bytes());

        let verification = match &self.keys {
            Some(keys) => keys.verify_witness(&hash, &signatures),
            None => {
                let named = registration_keys(body_of(registration, MetadataKind::Registration)?)?;
                verify_with_named_keys(&hash, &signatures, named.stake, named.vote)
            }
        };

        tracing::debug!(stake = ?verification.stake, vote = ?verification.vote, "verified witness");
        Ok(verification)
    }

    fn present(&self, kind: MetadataKind) -> Result<&Payload> {
        self.payload(kind).ok_or(RecordError::SlotAbsent(kind))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────────────

    /// Build, validate and witness a registration from `keys`.
    ///
    /// The stake key goes in field 2 and the vote key is registered as a
    /// legacy key for Catalyst. Both roles sign.
    pub fn generate(
        schemas: &'s SchemaSet,
        keys: KeyPairSet,
        payment_address: impl Into<Vec<u8>>,
        nonce: u64,
    ) -> Result<Self> {
        let stake = keys.public_key(KeyRole::Stake).ok_or(RecordError::NoKeys)?;
        let vote = keys.public_key(KeyRole::Vote).ok_or(RecordError::NoKeys)?;

        let registration = RegistrationBuilder::new(stake, payment_address, nonce)
            .legacy_vote_key(vote)
            .voting_purpose(CATALYST_VOTING_PURPOSE)
            .build()?;

        let mut record = Self::new(schemas).with_keys(keys);
        record.load_body(MetadataKind::Registration, registration.to_body())?;
        record.validate_all()?;
        record.generate_witness(true, true)?;
        record.validate_all()?;
        Ok(record)
    }

    /// One-line summary of slot states, for logs.
    pub fn summary(&self) -> String {
        MetadataKind::ALL
            .iter()
            .map(|kind| format!("{}={}", kind.name(), self.slot(*kind).name()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn body_of(payload: &Payload, kind: MetadataKind) -> Result<&Value> {
    payload.body(kind).ok_or_else(|| {
        RecordError::Core(CoreError::MissingField {
            payload: kind.name(),
            field: kind.label(),
        })
    })
}

/// Verify against keys read out of the registration.
///
/// A named key that is not a valid curve point cannot have produced a
/// signature, so a present signature for that role is `Invalid`.
fn verify_with_named_keys(
    hash: &Blake2b256Hash,
    signatures: &Witness,
    stake: [u8; 32],
    vote: Option<[u8; 32]>,
) -> Verification {
    let mut keys = KeyPairSet::new();
    let mut unusable = Vec::new();

    for (role, raw) in [(KeyRole::Stake, Some(stake)), (KeyRole::Vote, vote)] {
        let Some(raw) = raw else { continue };
        match Ed25519PublicKey::from_bytes(raw) {
            Ok(pk) => {
                keys = match role {
                    KeyRole::Stake => keys.with_stake(RoleKey::VerifyOnly(pk)),
                    KeyRole::Vote => keys.with_vote(RoleKey::VerifyOnly(pk)),
                };
            }
            Err(e) => {
                tracing::warn!(%role, error = %e, "registration names an unusable key");
                unusable.push(role);
            }
        }
    }

    let mut verification = keys.verify_witness(hash, signatures);
    for role in unusable {
        if signatures.get(role).is_some() {
            match role {
                KeyRole::Stake => verification.stake = SignatureCheck::Invalid,
                KeyRole::Vote => verification.vote = SignatureCheck::Invalid,
            }
        }
    }
    verification
}
