// Path: crates/types/src/operation.rs

//! Anchored operations and the wire payloads they carry.
//!
//! An [`AnchoredOperation`] is the unit the ledger walk hands to the store:
//! the raw operation bytes plus the anchor coordinates that fix its place
//! in the canonical total order. The triple
//! `(transaction_time, transaction_number, operation_index)` is the anchor
//! key; it is the sole tiebreaker for otherwise indistinguishable
//! operations, so ordering and equality of anchored operations are defined
//! over the anchor key alone.

use crate::did::DidSuffix;
use crate::document::{Patch, PublicKeyJwk};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The four operation kinds of the protocol.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Establishes a DID and its initial commitments.
    Create,
    /// Patches the document; consumes the current update commitment.
    Update,
    /// Rotates both commitment chains and rebuilds the document.
    Recover,
    /// Terminates the DID. Absorbing: nothing applies afterwards.
    Deactivate,
}

impl core::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Recover => "recover",
            Self::Deactivate => "deactivate",
        };
        write!(f, "{s}")
    }
}

/// The canonical total order over anchored operations.
///
/// Lexicographic over `(transaction_time, transaction_number,
/// operation_index)`; the derived `Ord` relies on field declaration order.
#[derive(
    Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default,
)]
pub struct AnchorKey {
    /// Ledger time (block height) the operation was anchored at.
    pub transaction_time: u64,
    /// Position of the anchoring transaction within its ledger time.
    pub transaction_number: u64,
    /// Position of the operation within its batch.
    pub operation_index: u32,
}

/// A single operation as observed on the ledger.
///
/// Immutable once stored. The `operation_bytes` are kept verbatim; parsing
/// and semantic verification happen downstream so that an adversarial
/// submission can never displace a legitimate one at ingestion time.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnchoredOperation {
    /// The declared operation kind.
    pub kind: OperationKind,
    /// The DID this operation claims to act on.
    pub did_suffix: DidSuffix,
    /// The raw operation JSON as anchored.
    pub operation_bytes: Vec<u8>,
    /// Ledger time (block height) the operation was anchored at.
    pub transaction_time: u64,
    /// Position of the anchoring transaction within its ledger time.
    pub transaction_number: u64,
    /// Position of the operation within its batch.
    pub operation_index: u32,
}

impl AnchoredOperation {
    /// Returns the anchor key of this operation.
    pub fn anchor_key(&self) -> AnchorKey {
        AnchorKey {
            transaction_time: self.transaction_time,
            transaction_number: self.transaction_number,
            operation_index: self.operation_index,
        }
    }
}

// Identity of an anchored operation is its anchor key: the store is
// idempotent over it and the resolver breaks all ties with it.
impl PartialEq for AnchoredOperation {
    fn eq(&self, other: &Self) -> bool {
        self.anchor_key() == other.anchor_key()
    }
}

impl Eq for AnchoredOperation {}

impl PartialOrd for AnchoredOperation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnchoredOperation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.anchor_key().cmp(&other.anchor_key())
    }
}

/// The portion of a create operation that the DID suffix commits to.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct SuffixData {
    /// Encoded multihash binding the create delta.
    pub delta_hash: String,
    /// Commitment to the first recovery key.
    pub recovery_commitment: String,
}

/// A document mutation plus the commitment to the next update key.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct Delta {
    /// Patches applied in order.
    pub patches: Vec<Patch>,
    /// Commitment the next update operation must reveal against.
    pub update_commitment: String,
}

/// Signed payload of an update operation.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct UpdateSignedPayload {
    /// The revealed update key; its hash must equal the current update
    /// commitment.
    pub update_key: PublicKeyJwk,
    /// Encoded multihash binding the update delta.
    pub delta_hash: String,
}

/// Signed payload of a recover operation.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct RecoverSignedPayload {
    /// The revealed recovery key; its hash must equal the current recovery
    /// commitment.
    pub recovery_key: PublicKeyJwk,
    /// Commitment to the next recovery key.
    pub recovery_commitment: String,
    /// Encoded multihash binding the recover delta.
    pub delta_hash: String,
}

/// Signed payload of a deactivate operation.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct DeactivateSignedPayload {
    /// Must match the DID the operation is anchored against.
    pub did_suffix: DidSuffix,
    /// The revealed recovery key.
    pub recovery_key: PublicKeyJwk,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(kind: OperationKind, time: u64, number: u64, index: u32) -> AnchoredOperation {
        AnchoredOperation {
            kind,
            did_suffix: DidSuffix::from("EiTest"),
            operation_bytes: vec![],
            transaction_time: time,
            transaction_number: number,
            operation_index: index,
        }
    }

    #[test]
    fn anchor_key_order_is_lexicographic() {
        let a = op(OperationKind::Update, 1, 9, 9);
        let b = op(OperationKind::Update, 2, 0, 0);
        let c = op(OperationKind::Update, 2, 0, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn equality_ignores_payload() {
        let mut a = op(OperationKind::Update, 3, 1, 0);
        let mut b = op(OperationKind::Recover, 3, 1, 0);
        a.operation_bytes = vec![1, 2, 3];
        b.operation_bytes = vec![4, 5, 6];
        assert_eq!(a, b);
    }

    #[test]
    fn operation_kind_wire_tag_is_lowercase() {
        let json = serde_json::to_string(&OperationKind::Deactivate).unwrap();
        assert_eq!(json, "\"deactivate\"");
    }
}
