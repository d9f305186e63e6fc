//! Property tests over generated registrations.

use proptest::prelude::*;

use cip36::{MetadataKind, RecordError, RegistrationRecord, SignatureCheck, SlotState};
use cip36_testkit::generators::{registration_from_params, signing_roles, RegistrationParams};
use cip36_testkit::{schemas, TestFixture};

fn witnessed(
    params: &RegistrationParams,
    sign_stake: bool,
    sign_vote: bool,
) -> RegistrationRecord<'static> {
    let registration = registration_from_params(params).unwrap();
    let mut record = RegistrationRecord::new(schemas()).with_keys(params.keys());
    record
        .load_body(MetadataKind::Registration, registration.to_body())
        .unwrap();
    record.validate_all().unwrap();
    record.generate_witness(sign_stake, sign_vote).unwrap();
    record.validate_all().unwrap();
    record
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_registrations_validate(params in any::<RegistrationParams>()) {
        let registration = registration_from_params(&params).unwrap();
        let mut record = RegistrationRecord::new(schemas());
        record.load_body(MetadataKind::Registration, registration.to_body()).unwrap();
        prop_assert!(record.validate_all().is_ok());
        prop_assert!(record.slot(MetadataKind::Registration).is_validated());
    }

    #[test]
    fn witness_verifies_with_signing_keys(params in any::<RegistrationParams>()) {
        let record = witnessed(&params, true, true);
        let verification = record.verify_signatures().unwrap();
        prop_assert_eq!(verification.stake, SignatureCheck::Valid);
        prop_assert_eq!(verification.vote, SignatureCheck::Valid);
    }

    #[test]
    fn witness_verifies_from_registration_keys(params in any::<RegistrationParams>()) {
        let record = witnessed(&params, true, true);

        let reloaded = RegistrationRecord::from_hex(
            schemas(),
            Some(&record.payload(MetadataKind::Registration).unwrap().to_hex()),
            Some(&record.payload(MetadataKind::Witness).unwrap().to_hex()),
            None,
        )
        .unwrap();
        let verification = reloaded.verify_signatures().unwrap();

        prop_assert_eq!(verification.stake, SignatureCheck::Valid);
        let expected_vote = if params.has_single_vote_key() {
            SignatureCheck::Valid
        } else {
            SignatureCheck::NotChecked
        };
        prop_assert_eq!(verification.vote, expected_vote);
    }

    #[test]
    fn partial_witness_checks_only_signed_roles(
        params in any::<RegistrationParams>(),
        (sign_stake, sign_vote) in signing_roles(),
    ) {
        let mut record = RegistrationRecord::new(schemas()).with_keys(params.keys());
        record
            .load_body(
                MetadataKind::Registration,
                registration_from_params(&params).unwrap().to_body(),
            )
            .unwrap();
        record.validate_all().unwrap();

        let witness = record.generate_witness(sign_stake, sign_vote).unwrap();
        prop_assert_eq!(witness.stake.is_some(), sign_stake);
        prop_assert_eq!(witness.vote.is_some(), sign_vote);

        let verification = record.verify_signatures().unwrap();
        let expect = |signed: bool| {
            if signed { SignatureCheck::Valid } else { SignatureCheck::NotChecked }
        };
        prop_assert_eq!(verification.stake, expect(sign_stake));
        prop_assert_eq!(verification.vote, expect(sign_vote));
    }

    #[test]
    fn tampered_registration_never_verifies(
        params in any::<RegistrationParams>(),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let record = witnessed(&params, true, false);
        let mut bytes = record.payload(MetadataKind::Registration).unwrap().bytes().to_vec();
        let i = index.index(bytes.len());
        bytes[i] ^= 1 << bit;

        let witness = record.payload(MetadataKind::Witness).unwrap().to_hex();
        let mut tampered = RegistrationRecord::new(schemas());
        if tampered.load_bytes(MetadataKind::Registration, bytes).is_err() {
            // Not well-formed any more: rejected before any signature check.
            return Ok(());
        }
        tampered.load_hex(MetadataKind::Witness, &witness).unwrap();

        // Against the keys that signed.
        let bound = tampered.clone().with_keys(params.keys());
        prop_assert_eq!(bound.verify_signatures().unwrap().stake, SignatureCheck::Invalid);

        // Against whatever keys the tampered payload names.
        match tampered.verify_signatures() {
            Ok(verification) => prop_assert_ne!(verification.stake, SignatureCheck::Valid),
            Err(e) => prop_assert!(matches!(e, RecordError::Core(_))),
        }
    }

    #[test]
    fn flipped_stake_key_bit_is_invalid(
        params in any::<RegistrationParams>(),
        byte in 0usize..32,
        bit in 0u8..8,
    ) {
        let record = witnessed(&params, true, true);
        let witness = record.payload(MetadataKind::Witness).unwrap().to_hex();

        let mut registration = registration_from_params(&params).unwrap();
        registration.stake_key[byte] ^= 1 << bit;

        let mut tampered = RegistrationRecord::new(schemas());
        tampered
            .load_body(MetadataKind::Registration, registration.to_body())
            .unwrap();
        tampered.load_hex(MetadataKind::Witness, &witness).unwrap();

        // The named key is either another point or no point at all.
        let verification = tampered.verify_signatures().unwrap();
        prop_assert_eq!(verification.stake, SignatureCheck::Invalid);
    }

    #[test]
    fn json_reload_preserves_bytes(params in any::<RegistrationParams>()) {
        let record = witnessed(&params, true, true);
        let registration = record.payload(MetadataKind::Registration).unwrap();
        let witness = record.payload(MetadataKind::Witness).unwrap();

        let reloaded = RegistrationRecord::from_json(
            schemas(),
            Some(&registration.to_json()),
            Some(&witness.to_json()),
            None,
        )
        .unwrap();
        prop_assert_eq!(
            reloaded.payload(MetadataKind::Registration).unwrap().bytes(),
            registration.bytes()
        );
        prop_assert_eq!(
            reloaded.payload(MetadataKind::Witness).unwrap().bytes(),
            witness.bytes()
        );
    }

    #[test]
    fn truncated_input_leaves_slot_absent(
        params in any::<RegistrationParams>(),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = registration_from_params(&params).unwrap().encode().unwrap();
        let truncated = bytes[..cut.index(bytes.len())].to_vec();

        let mut record = RegistrationRecord::new(schemas());
        let result = record.load_bytes(MetadataKind::Registration, truncated);
        prop_assert!(matches!(result, Err(RecordError::Decode(_))));
        prop_assert!(matches!(record.slot(MetadataKind::Registration), SlotState::Absent));
    }
}

#[test]
fn absent_slots_never_block_validation() {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let mut record = RegistrationRecord::new(schemas());
    record
        .load_body(
            MetadataKind::Deregistration,
            fixture.make_deregistration(3).build(),
        )
        .unwrap();

    record.validate_all().unwrap();
    assert!(record.slot(MetadataKind::Registration).is_absent());
    assert!(record.slot(MetadataKind::Witness).is_absent());
    assert!(record.is_valid());
}

#[test]
fn vote_only_witness_fails_grammar() {
    // The witness grammar requires the stake signature.
    let fixture = TestFixture::with_seed([0x43; 32]);
    let mut record = fixture.record(schemas(), 11).unwrap();
    record.generate_witness(false, true).unwrap();

    let err = record.validate_all().unwrap_err();
    assert!(matches!(err, RecordError::ValidationFailed(ref failures) if failures.len() == 1));
    assert!(matches!(
        record.slot(MetadataKind::Witness),
        SlotState::Failed { .. }
    ));
    assert!(record.slot(MetadataKind::Registration).is_validated());

    // The signature itself is still sound.
    let verification = record.verify_signatures().unwrap();
    assert_eq!(verification.vote, SignatureCheck::Valid);
    assert_eq!(verification.stake, SignatureCheck::NotChecked);
}
