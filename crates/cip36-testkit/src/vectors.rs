//! Golden test vectors.
//!
//! Two kinds of vector live here: registrations captured from Cardano
//! networks (CIP-15 format, witnessed by the stake key only) and
//! deterministic vectors generated from fixed seeds. Ed25519 signing is
//! deterministic, so every generated vector has exact expected bytes.

use cip36::{
    core::{Delegation, RegistrationBuilder, VoteTarget},
    KeyPairSet, KeyRole, Keypair, MetadataKind, RegistrationRecord, Result, SchemaSet,
};
use serde::{Deserialize, Serialize};

/// CIP-15 registration and witness posted on mainnet.
pub mod mainnet {
    pub const REGISTRATION: &str = "A119EF64A401582021785819F73A4537AD9CC6C45D10B9520405187A1B3E02C7AF6CA54059939AC30258206FD5D1C6ED775C6A50AE17D9B1ABD2068960B420E252A3C6AD86555BC6137CCC03581DE10DD2E29E4BAB80F63B9927D22251E3FFC1E130F81B21A5048A37E862041A0491C3E4";
    pub const WITNESS: &str = "A119EF65A1015840D15C307727E279D1CFFBB0C64792CE50E226587E08529A9A5A7292075EB3D19D5AC0348B708F2FD3122D2CFD3E6216C0DFA9F7CF17C9B9B4D60E887F2AF6E907";
    pub const REGISTRATION_HASH: &str =
        "25ffd7e958ebc5a6e80ff5d74e9e21a441a74fccc8bfb72ff622bb1a0b4d1fb3";
    pub const STAKE_KEY: &str = "6fd5d1c6ed775c6a50ae17d9b1abd2068960b420e252a3c6ad86555bc6137ccc";
    pub const NONCE: u64 = 76_661_732;
}

/// CIP-15 registration and witness posted on preprod.
pub mod preprod {
    pub const REGISTRATION: &str = "A119EF64A40158208C2213261223B9E43A9679BFF15BF146A75328467DA01674AA6479CBAFBBE942025820421BB1D3180A5083A6883437EC8EAF5CB01D158A08AC7FA839D8C9CC623FFA89035839008B71F5CCB6AC9CF17BD8E60BB5992FEA96C81584AF9835C8ADEF86104E3D6A6F68A511E5D817466579474DA8641767AA1110E0D25597B77E041A01BE1308";
    pub const WITNESS: &str = "A119EF65A10158401F1C0AADF7459E8272A5EDE9834FCAFEC2FCF841F07A26F421F06E8FA9A71A7A3B417F0DF63BFA26D60DC444FB209B7729A88891DC861C7B2B831C35186AAC0E";
    pub const REGISTRATION_HASH: &str =
        "41b9b14a656824def731a2cfcd05c9690addef51b180963cb3ed99d84f814453";
    pub const STAKE_KEY: &str = "421bb1d3180a5083a6883437ec8eaf5cb01d158a08ac7fa839d8c9cc623ffa89";
    pub const NONCE: u64 = 29_233_928;
}

/// Inputs for one deterministic vector, plus its expected outputs.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    pub name: &'static str,
    pub stake_seed: [u8; 32],
    /// Seed of the key that signs for the vote role.
    pub vote_seed: [u8; 32],
    /// Weighted delegations by seed. Empty means a legacy vote key.
    pub delegations: &'static [([u8; 32], u32)],
    pub payment_address: Vec<u8>,
    pub nonce: u64,
    pub voting_purpose: Option<u64>,
    pub sign_stake: bool,
    pub sign_vote: bool,
    pub expected_registration: &'static str,
    pub expected_hash: &'static str,
    pub expected_witness: &'static str,
}

/// All deterministic vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "legacy-catalyst",
            stake_seed: [0x11; 32],
            vote_seed: [0x22; 32],
            delegations: &[],
            payment_address: address(0xe0, 0x33, 28),
            nonce: 1000,
            voting_purpose: Some(0),
            sign_stake: true,
            sign_vote: true,
            expected_registration: "a119ef64a5015820a09aa5f47a6759802ff955f8dc2d2a14a5c99d23be97f864127ff9383455a4f0025820d04ab232742bb4ab3a1368bd4615e4e6d0224ab71a016baf8520a332c977873703581de033333333333333333333333333333333333333333333333333333333041903e80500",
            expected_hash: "2422529bca0a208fbb022122e5168af0d2791b7dd4cac321d097d9aa24cb208b",
            expected_witness: "a119ef65a201584073bff28eb5e5610e0cf1739dbc8fbb1d8a138b8de34b6364f7af5852cbc1ee8ad7d5a25d153bbfe0cf48fadf068fad20835b027515f1231e61b36ec9e7ee230a0258400296ccf26a66c4f24fcba422d95776265d88faff6a8e3c6ad28f7bcedfec423a5a12ce3cad76bb1647f6c721f8d317847b6709a2c453577b74cf7bdd5703a70a",
        },
        GoldenVector {
            name: "weighted-delegations",
            stake_seed: [0x44; 32],
            vote_seed: [0x55; 32],
            delegations: &[([0x55; 32], 1), ([0x66; 32], 3)],
            payment_address: address(0x01, 0x77, 56),
            nonce: 76_661_732,
            voting_purpose: Some(0),
            sign_stake: true,
            sign_vote: false,
            expected_registration: "a119ef64a50182825820c6822637c7d310ec57627be00ba259d253749f4aaf644470cffbe53a35f732420182582034b4d9043156cb6dcf0beb0a2949b7559c940d2bcb6dbe8c53a9b30278e3a74603025820d759793bbc13a2819a827c76adb6fba8a49aee007f49f2d0992d99b825ad2c48035839017777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777777041a0491c3e40500",
            expected_hash: "7e0bbbee4fec6e4f2c41d58119a526fe09507cbb6e4c27e5292aa610fda245c8",
            expected_witness: "a119ef65a10158404fa20da91c6d0a652a6e6a7d9966c79a6079124c99d80abbad86a5a377d8572bd50bb368ec6d3ce8992986fc427028ccfb310ad1c86eb461272fc91790eb7c0c",
        },
        GoldenVector {
            name: "stake-only-no-purpose",
            stake_seed: [0x88; 32],
            vote_seed: [0x99; 32],
            delegations: &[],
            payment_address: address(0xe1, 0xaa, 28),
            nonce: 0,
            voting_purpose: None,
            sign_stake: true,
            sign_vote: false,
            expected_registration: "a119ef64a4015820332ebe8d27cb7323b3a401c1c13b5dd64bccc0e10ecda1c2b5d11a03779a85e5025820b2491d9502ae28630a2bacb2e0c74510ffcdd328c334ff3e1393e75b2d31e7dc03581de1aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa0400",
            expected_hash: "dc41656e23c02bdefed75e115a086188dbc408412d562c41bafa609e52b86db7",
            expected_witness: "a119ef65a1015840981e75c39b362f8bcee3f127acbfd732d3417a3ae9f52fa22210a6bfb2dc4a61546b849ae2940d1b1888fd7b1458028cee7cd0bf2cb94e5a16bf2b7bf8f3630f",
        },
    ]
}

/// Header byte followed by `len` copies of `fill`.
fn address(header: u8, fill: u8, len: usize) -> Vec<u8> {
    let mut bytes = vec![header];
    bytes.resize(len + 1, fill);
    bytes
}

impl GoldenVector {
    pub fn keys(&self) -> KeyPairSet {
        KeyPairSet::from_seeds(&self.stake_seed, &self.vote_seed)
    }

    pub fn vote_target(&self) -> VoteTarget {
        if self.delegations.is_empty() {
            VoteTarget::Legacy(*Keypair::from_seed(&self.vote_seed).public_key().as_bytes())
        } else {
            VoteTarget::Delegations(
                self.delegations
                    .iter()
                    .map(|(seed, weight)| Delegation {
                        key: *Keypair::from_seed(seed).public_key().as_bytes(),
                        weight: *weight,
                    })
                    .collect(),
            )
        }
    }
}

/// Output of generating one vector, in a form suitable for JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedVector {
    pub name: String,
    pub stake_seed: String,
    pub vote_seed: String,
    pub stake_public_key: String,
    pub vote_public_key: String,
    pub registration: String,
    pub registration_hash: String,
    pub witness: String,
    /// Registration as Cardano metadata JSON.
    pub registration_json: serde_json::Value,
    pub registration_diagnostic: String,
    pub witness_diagnostic: String,
}

/// Build, validate and witness a vector's registration.
pub fn generate_record<'s>(
    vector: &GoldenVector,
    schemas: &'s SchemaSet,
) -> Result<RegistrationRecord<'s>> {
    let keys = vector.keys();
    let stake = keys
        .public_key(KeyRole::Stake)
        .ok_or(cip36::RecordError::NoKeys)?;

    let mut builder =
        RegistrationBuilder::new(stake, vector.payment_address.clone(), vector.nonce);
    builder = match vector.vote_target() {
        VoteTarget::Legacy(key) => builder.legacy_vote_key(cip36::Ed25519PublicKey::from_bytes(key)?),
        VoteTarget::Delegations(delegations) => {
            for d in delegations {
                builder = builder.delegate(cip36::Ed25519PublicKey::from_bytes(d.key)?, d.weight);
            }
            builder
        }
    };
    if let Some(purpose) = vector.voting_purpose {
        builder = builder.voting_purpose(purpose);
    }

    let mut record = RegistrationRecord::new(schemas).with_keys(keys);
    record.load_body(MetadataKind::Registration, builder.build()?.to_body())?;
    record.validate_all()?;
    record.generate_witness(vector.sign_stake, vector.sign_vote)?;
    record.validate_all()?;
    Ok(record)
}

/// Generate the exportable form of a vector.
pub fn generate_vector(vector: &GoldenVector, schemas: &SchemaSet) -> Result<GeneratedVector> {
    let record = generate_record(vector, schemas)?;
    let keys = vector.keys();

    let registration = record
        .payload(MetadataKind::Registration)
        .ok_or(cip36::RecordError::SlotAbsent(MetadataKind::Registration))?;
    let witness = record
        .payload(MetadataKind::Witness)
        .ok_or(cip36::RecordError::SlotAbsent(MetadataKind::Witness))?;
    let public_hex = |role| keys.public_key(role).map(|pk| pk.to_hex()).unwrap_or_default();

    Ok(GeneratedVector {
        name: vector.name.to_string(),
        stake_seed: hex::encode(vector.stake_seed),
        vote_seed: hex::encode(vector.vote_seed),
        stake_public_key: public_hex(KeyRole::Stake),
        vote_public_key: public_hex(KeyRole::Vote),
        registration: registration.to_hex(),
        registration_hash: record
            .registration_hash()
            .map(|h| h.to_hex())
            .unwrap_or_default(),
        witness: witness.to_hex(),
        registration_json: registration.to_json(),
        registration_diagnostic: registration.diagnostic(),
        witness_diagnostic: witness.diagnostic(),
    })
}

/// Check every vector against its expected bytes.
///
/// Returns `(name, matches)` per vector.
pub fn verify_all_vectors(schemas: &SchemaSet) -> Result<Vec<(String, bool)>> {
    all_vectors()
        .iter()
        .map(|v| {
            let generated = generate_vector(v, schemas)?;
            let matches = generated.registration == v.expected_registration
                && generated.registration_hash == v.expected_hash
                && generated.witness == v.expected_witness;
            Ok((v.name.to_string(), matches))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::schemas;

    #[test]
    fn test_vectors_match_expected_bytes() {
        for vector in all_vectors() {
            let generated = generate_vector(&vector, schemas()).unwrap();
            assert_eq!(generated.registration, vector.expected_registration, "{}", vector.name);
            assert_eq!(generated.registration_hash, vector.expected_hash, "{}", vector.name);
            assert_eq!(generated.witness, vector.expected_witness, "{}", vector.name);
        }
    }

    #[test]
    fn test_verify_all_vectors() {
        let results = verify_all_vectors(schemas()).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|(_, ok)| *ok));
    }

    #[test]
    fn test_generated_vectors_verify() {
        for vector in all_vectors() {
            let record = generate_record(&vector, schemas()).unwrap();
            let verification = record.verify_signatures().unwrap();
            assert!(verification.stake.is_valid(), "{}", vector.name);
            assert_eq!(verification.vote.is_valid(), vector.sign_vote, "{}", vector.name);
        }
    }

    #[test]
    fn test_generated_vector_json_export() {
        let vector = &all_vectors()[0];
        let generated = generate_vector(vector, schemas()).unwrap();

        let json = serde_json::to_string_pretty(&generated).unwrap();
        let parsed: GeneratedVector = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, generated);

        assert_eq!(
            generated.stake_public_key,
            "d04ab232742bb4ab3a1368bd4615e4e6d0224ab71a016baf8520a332c9778737"
        );
        assert!(generated.registration_diagnostic.starts_with("{61284: {1: h'a09aa5f4"));
        assert_eq!(generated.registration_json["61284"]["4"], 1000);
    }

    #[test]
    fn test_network_fixture_hashes() {
        for (registration, expected) in [
            (mainnet::REGISTRATION, mainnet::REGISTRATION_HASH),
            (preprod::REGISTRATION, preprod::REGISTRATION_HASH),
        ] {
            let bytes = hex::decode(registration).unwrap();
            assert_eq!(cip36::core::content_hash(&bytes).to_hex(), expected);
        }
    }
}
