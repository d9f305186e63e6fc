//! Metadata kinds and their transaction-metadata labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the key registration payload.
pub const REGISTRATION_LABEL: u64 = 61284;
/// Label of the registration witness payload.
pub const WITNESS_LABEL: u64 = 61285;
/// Label of the deregistration payload.
pub const DEREGISTRATION_LABEL: u64 = 61286;

/// The three CIP-36 metadata payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetadataKind {
    Registration,
    Witness,
    Deregistration,
}

impl MetadataKind {
    /// All kinds, in label order.
    pub const ALL: [MetadataKind; 3] = [
        MetadataKind::Registration,
        MetadataKind::Witness,
        MetadataKind::Deregistration,
    ];

    /// The transaction-metadata label for this kind.
    pub const fn label(self) -> u64 {
        match self {
            MetadataKind::Registration => REGISTRATION_LABEL,
            MetadataKind::Witness => WITNESS_LABEL,
            MetadataKind::Deregistration => DEREGISTRATION_LABEL,
        }
    }

    pub fn from_label(label: u64) -> Option<Self> {
        match label {
            REGISTRATION_LABEL => Some(MetadataKind::Registration),
            WITNESS_LABEL => Some(MetadataKind::Witness),
            DEREGISTRATION_LABEL => Some(MetadataKind::Deregistration),
            _ => None,
        }
    }

    /// Short lowercase name used in errors and logs.
    pub const fn name(self) -> &'static str {
        match self {
            MetadataKind::Registration => "registration",
            MetadataKind::Witness => "witness",
            MetadataKind::Deregistration => "deregistration",
        }
    }

    /// Position of this kind in [`MetadataKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            MetadataKind::Registration => 0,
            MetadataKind::Witness => 1,
            MetadataKind::Deregistration => 2,
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.label())
    }
}
