//! Golden vectors for cross-implementation verification.
//!
//! Every implementation must agree on:
//! - registration bytes for a given set of inputs
//! - the BLAKE2b-256 hash of those bytes
//! - witness bytes (Ed25519 signatures are deterministic)
//!
//! and must accept the registrations already posted on Cardano networks.

use cip36::core::{content_hash, metadata_body, Registration};
use cip36::{MetadataKind, RegistrationRecord, SignatureCheck, SlotState};
use cip36_testkit::vectors::{all_vectors, generate_record, generate_vector, mainnet, preprod};
use cip36_testkit::{init_tracing, schemas};

fn network_record(registration: &str, witness: &str) -> RegistrationRecord<'static> {
    let mut record =
        RegistrationRecord::from_hex(schemas(), Some(registration), Some(witness), None).unwrap();
    record.validate_all().unwrap();
    record
}

#[test]
fn mainnet_registration_verifies_over_hash() {
    init_tracing();
    let record = network_record(mainnet::REGISTRATION, mainnet::WITNESS);

    assert_eq!(
        record.registration_hash().unwrap().to_hex(),
        mainnet::REGISTRATION_HASH
    );

    // CIP-15 witnesses carry only the stake signature.
    let verification = record.verify_signatures().unwrap();
    assert_eq!(verification.stake, SignatureCheck::Valid);
    assert_eq!(verification.vote, SignatureCheck::NotChecked);
    assert_eq!(verification.vote.as_option(), None);
    assert!(verification.all_checked_valid());
}

#[test]
fn preprod_registration_verifies_over_hash() {
    let record = network_record(preprod::REGISTRATION, preprod::WITNESS);

    let verification = record.verify_signatures().unwrap();
    assert_eq!(verification.stake.as_option(), Some(true));
    assert_eq!(verification.vote, SignatureCheck::NotChecked);

    let body = record
        .payload(MetadataKind::Registration)
        .and_then(|p| p.body(MetadataKind::Registration))
        .unwrap();
    let registration = Registration::from_body(body).unwrap();
    assert_eq!(hex::encode(registration.stake_key), preprod::STAKE_KEY);
    assert_eq!(registration.nonce, preprod::NONCE);
    assert_eq!(registration.payment_address.len(), 57);
}

#[test]
fn network_fixtures_are_canonical() {
    for registration in [mainnet::REGISTRATION, preprod::REGISTRATION] {
        let bytes = hex::decode(registration).unwrap();
        let value = cip36::core::decode(&bytes).unwrap();
        assert_eq!(cip36::core::encode(&value).unwrap(), bytes);
    }
}

#[test]
fn mismatched_witness_is_invalid() {
    // Preprod witness against the mainnet registration.
    let record = network_record(mainnet::REGISTRATION, preprod::WITNESS);
    let verification = record.verify_signatures().unwrap();
    assert_eq!(verification.stake, SignatureCheck::Invalid);
    assert!(!verification.all_checked_valid());
}

#[test]
fn generated_vectors_match() {
    for vector in all_vectors() {
        let generated = generate_vector(&vector, schemas()).unwrap();
        assert_eq!(generated.registration, vector.expected_registration, "{}", vector.name);
        assert_eq!(generated.registration_hash, vector.expected_hash, "{}", vector.name);
        assert_eq!(generated.witness, vector.expected_witness, "{}", vector.name);

        let registration = hex::decode(&generated.registration).unwrap();
        assert_eq!(content_hash(&registration).to_hex(), vector.expected_hash);
    }
}

#[test]
fn generated_vectors_reload_from_hex() {
    for vector in all_vectors() {
        let mut record = RegistrationRecord::from_hex(
            schemas(),
            Some(vector.expected_registration),
            Some(vector.expected_witness),
            None,
        )
        .unwrap();
        record.validate_all().unwrap();

        let verification = record.verify_signatures().unwrap();
        assert_eq!(verification.stake, SignatureCheck::Valid, "{}", vector.name);

        // Multi-delegation registrations do not name a single vote key.
        let expected_vote = if vector.sign_vote {
            SignatureCheck::Valid
        } else {
            SignatureCheck::NotChecked
        };
        assert_eq!(verification.vote, expected_vote, "{}", vector.name);
    }
}

#[test]
fn generated_vector_exports_json() {
    let vector = &all_vectors()[1];
    let record = generate_record(vector, schemas()).unwrap();
    let registration = record.payload(MetadataKind::Registration).unwrap();

    let json = registration.to_json();
    let delegations = json["61284"]["1"].as_array().unwrap();
    assert_eq!(delegations.len(), 2);
    assert_eq!(delegations[1][1], 3);
    assert!(json["61284"]["3"].as_str().unwrap().starts_with("0x01"));

    let reloaded = RegistrationRecord::from_json(schemas(), Some(&json), None, None).unwrap();
    assert_eq!(
        reloaded.payload(MetadataKind::Registration).unwrap().bytes(),
        registration.bytes()
    );

    let value = metadata_body(registration.value(), MetadataKind::Registration);
    assert!(value.is_some());
}

#[test]
fn deregistration_slot_is_independent() {
    let fixture = cip36_testkit::TestFixture::with_seed([0x21; 32]);
    let dereg = hex::encode(fixture.make_deregistration(7).encode().unwrap());

    let mut record = RegistrationRecord::from_hex(
        schemas(),
        Some(mainnet::REGISTRATION),
        Some(mainnet::WITNESS),
        Some(&dereg),
    )
    .unwrap();
    record.validate_all().unwrap();

    for kind in MetadataKind::ALL {
        assert!(matches!(record.slot(kind), SlotState::Validated(_)), "{kind}");
    }
    assert!(record.verify_signatures().unwrap().stake.is_valid());
}
