//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cip36::core::{Blake2b256Hash, CoreError, Ed25519PublicKey, Registration, RegistrationBuilder};
use cip36::{KeyPairSet, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a signing key set for both roles.
pub fn key_pair_set() -> impl Strategy<Value = KeyPairSet> {
    (any::<[u8; 32]>(), any::<[u8; 32]>())
        .prop_map(|(stake, vote)| KeyPairSet::from_seeds(&stake, &vote))
}

/// Generate a random Blake2b256Hash.
pub fn blake2b_hash() -> impl Strategy<Value = Blake2b256Hash> {
    any::<[u8; 32]>().prop_map(Blake2b256Hash)
}

/// Generate a Shelley-style payment address: header byte plus 28 or 56
/// bytes of credentials.
pub fn payment_address() -> impl Strategy<Value = Vec<u8>> {
    (any::<u8>(), prop_oneof![Just(28usize), Just(56usize)])
        .prop_flat_map(|(header, len)| {
            prop::collection::vec(any::<u8>(), len).prop_map(move |body| {
                let mut address = Vec::with_capacity(len + 1);
                address.push(header);
                address.extend(body);
                address
            })
        })
}

/// Generate a nonce, biased toward slot-number sized values.
pub fn nonce() -> impl Strategy<Value = u64> {
    prop_oneof![0u64..=u64::from(u32::MAX), any::<u64>()]
}

/// Which roles sign: at least one.
pub fn signing_roles() -> impl Strategy<Value = (bool, bool)> {
    prop_oneof![Just((true, true)), Just((true, false)), Just((false, true))]
}

/// Parameters for generating a registration.
#[derive(Debug, Clone)]
pub struct RegistrationParams {
    pub stake_seed: [u8; 32],
    pub vote_seed: [u8; 32],
    /// Extra delegation seeds and weights. Empty means a legacy vote key.
    pub extra_delegations: Vec<([u8; 32], u32)>,
    pub payment_address: Vec<u8>,
    pub nonce: u64,
    pub voting_purpose: Option<u64>,
}

impl RegistrationParams {
    pub fn keys(&self) -> KeyPairSet {
        KeyPairSet::from_seeds(&self.stake_seed, &self.vote_seed)
    }

    /// Whether the vote key is recoverable from the registration alone.
    pub fn has_single_vote_key(&self) -> bool {
        self.extra_delegations.is_empty()
    }
}

impl Arbitrary for RegistrationParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            any::<[u8; 32]>(),
            prop::collection::vec((any::<[u8; 32]>(), any::<u32>()), 0..3),
            payment_address(),
            nonce(),
            proptest::option::of(0u64..=10),
        )
            .prop_map(
                |(stake_seed, vote_seed, extra_delegations, payment_address, nonce, purpose)| {
                    RegistrationParams {
                        stake_seed,
                        vote_seed,
                        extra_delegations,
                        payment_address,
                        nonce,
                        voting_purpose: purpose,
                    }
                },
            )
            .boxed()
    }
}

/// Build the registration described by `params`.
///
/// With extra delegations the vote key becomes the first of several
/// delegations, weighted 1.
pub fn registration_from_params(params: &RegistrationParams) -> Result<Registration, CoreError> {
    let stake = Keypair::from_seed(&params.stake_seed).public_key();
    let vote = Keypair::from_seed(&params.vote_seed).public_key();

    let mut builder = RegistrationBuilder::new(stake, params.payment_address.clone(), params.nonce);
    builder = if params.extra_delegations.is_empty() {
        builder.legacy_vote_key(vote)
    } else {
        params
            .extra_delegations
            .iter()
            .fold(builder.delegate(vote, 1), |b, (seed, weight)| {
                b.delegate(Keypair::from_seed(seed).public_key(), *weight)
            })
    };
    if let Some(purpose) = params.voting_purpose {
        builder = builder.voting_purpose(purpose);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cip36::core::{codec, metadata_body, MetadataKind};

    proptest! {
        #[test]
        fn test_registration_encoding_deterministic(params: RegistrationParams) {
            let r1 = registration_from_params(&params).unwrap();
            let r2 = registration_from_params(&params).unwrap();

            prop_assert_eq!(r1.encode().unwrap(), r2.encode().unwrap());
        }

        #[test]
        fn test_registration_decodes_to_itself(params: RegistrationParams) {
            let registration = registration_from_params(&params).unwrap();
            let bytes = registration.encode().unwrap();

            let value = codec::decode(&bytes).unwrap();
            let body = metadata_body(&value, MetadataKind::Registration).unwrap();
            prop_assert_eq!(Registration::from_body(body).unwrap(), registration);
        }

        #[test]
        fn test_payment_address_lengths(address in payment_address()) {
            prop_assert!(address.len() == 29 || address.len() == 57);
        }

        #[test]
        fn test_different_nonces_different_bytes(
            params in any::<RegistrationParams>(),
            other in nonce(),
        ) {
            prop_assume!(other != params.nonce);

            let a = registration_from_params(&params).unwrap();
            let changed = RegistrationParams { nonce: other, ..params.clone() };
            let b = registration_from_params(&changed).unwrap();
            prop_assert_ne!(a.encode().unwrap(), b.encode().unwrap());
        }
    }
}
