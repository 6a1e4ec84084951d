// Path: crates/test_utils/src/fixtures.rs

//! Wire-accurate operation generators.
//!
//! Each generator returns both the anchored bytes and the key material a
//! test needs to produce the *next* operation in a chain, mirroring how a
//! wallet would hold on to its upcoming reveal keys.

use rand::rngs::OsRng;
use serde_json::{json, Value};
use trellis_crypto::{canonicalize_then_hash_then_encode, CompactJws, JwsSigningKey};
use trellis_types::config::MULTIHASH_SHA2_256;
use trellis_types::did::DidSuffix;
use trellis_types::document::{
    Patch, PublicKeyEntry, PublicKeyJwk, PublicKeyPurpose, ServiceEndpointEntry,
};
use trellis_types::operation::{
    AnchoredOperation, DeactivateSignedPayload, Delta, OperationKind, RecoverSignedPayload,
    SuffixData, UpdateSignedPayload,
};

/// A signing key together with its public JWK and commitment.
pub struct GeneratedKey {
    /// The private half.
    pub signing_key: JwsSigningKey,
    /// The public JWK revealed on the wire.
    pub public_jwk: PublicKeyJwk,
    /// `canonicalize_then_hash_then_encode(public_jwk)`.
    pub commitment: String,
}

/// Everything a test needs from a generated create operation.
pub struct CreateParts {
    /// The raw operation bytes as they would be anchored.
    pub operation_bytes: Vec<u8>,
    /// The derived DID suffix.
    pub did_suffix: DidSuffix,
    /// Holder of the current recovery commitment's preimage.
    pub recovery_key: GeneratedKey,
    /// Holder of the current update commitment's preimage.
    pub update_key: GeneratedKey,
}

/// Everything a test needs from a generated update operation.
pub struct UpdateParts {
    /// The raw operation bytes.
    pub operation_bytes: Vec<u8>,
    /// Holder of the update commitment established by this operation.
    pub next_update_key: GeneratedKey,
}

/// Everything a test needs from a generated recover operation.
pub struct RecoverParts {
    /// The raw operation bytes.
    pub operation_bytes: Vec<u8>,
    /// Holder of the recovery commitment established by this operation.
    pub next_recovery_key: GeneratedKey,
    /// Holder of the update commitment established by this operation.
    pub next_update_key: GeneratedKey,
}

/// Generates wire-accurate, fully signed operations.
#[derive(Default)]
pub struct OperationGenerator;

impl OperationGenerator {
    /// Generates a fresh ES256K key with its commitment.
    pub fn generate_key() -> GeneratedKey {
        let signing_key = JwsSigningKey::Es256k(k256::ecdsa::SigningKey::random(&mut OsRng));
        Self::keyed(signing_key)
    }

    /// Generates a fresh Ed25519 key with its commitment.
    pub fn generate_ed25519_key() -> GeneratedKey {
        let signing_key = JwsSigningKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng));
        Self::keyed(signing_key)
    }

    fn keyed(signing_key: JwsSigningKey) -> GeneratedKey {
        let public_jwk = signing_key.public_jwk().unwrap();
        let commitment =
            canonicalize_then_hash_then_encode(&public_jwk, MULTIHASH_SHA2_256).unwrap();
        GeneratedKey {
            signing_key,
            public_jwk,
            commitment,
        }
    }

    fn delta_hash(delta: &Delta) -> String {
        let canonical = trellis_crypto::canonicalize(delta).unwrap();
        trellis_crypto::hash_then_encode(&canonical, MULTIHASH_SHA2_256).unwrap()
    }

    /// A ready-made public key entry for patches.
    pub fn public_key_entry(id: &str) -> PublicKeyEntry {
        PublicKeyEntry {
            id: id.to_owned(),
            key_type: "EcdsaSecp256k1VerificationKey2019".to_owned(),
            jwk: Self::generate_key().public_jwk,
            purposes: vec![PublicKeyPurpose::Authentication],
        }
    }

    /// A ready-made service endpoint entry for patches.
    pub fn service_endpoint_entry(id: &str) -> ServiceEndpointEntry {
        ServiceEndpointEntry {
            id: id.to_owned(),
            endpoint_type: "IdentityHub".to_owned(),
            endpoint: format!("https://hub.example.com/{id}"),
        }
    }

    /// Builds a create operation whose delta applies `patches`.
    pub fn create_operation(patches: Vec<Patch>) -> CreateParts {
        Self::create_operation_with_keys(patches, Self::generate_key(), Self::generate_key())
    }

    /// Like [`Self::create_operation`], committing to the supplied keys.
    /// Lets a test pin the curves or reuse key material across chains.
    pub fn create_operation_with_keys(
        patches: Vec<Patch>,
        recovery_key: GeneratedKey,
        update_key: GeneratedKey,
    ) -> CreateParts {
        let delta = Delta {
            patches,
            update_commitment: update_key.commitment.clone(),
        };
        let suffix_data = SuffixData {
            delta_hash: Self::delta_hash(&delta),
            recovery_commitment: recovery_key.commitment.clone(),
        };
        let did_suffix = DidSuffix(
            canonicalize_then_hash_then_encode(&suffix_data, MULTIHASH_SHA2_256).unwrap(),
        );
        let operation_bytes = serde_json::to_vec(&json!({
            "type": "create",
            "suffix_data": suffix_data,
            "delta": delta,
        }))
        .unwrap();
        CreateParts {
            operation_bytes,
            did_suffix,
            recovery_key,
            update_key,
        }
    }

    /// Builds an update revealing `current_update_key`, applying `patches`
    /// and committing to a fresh next update key.
    pub fn update_operation(
        did_suffix: &DidSuffix,
        current_update_key: &GeneratedKey,
        patches: Vec<Patch>,
    ) -> UpdateParts {
        let next_update_key = Self::generate_key();
        let delta = Delta {
            patches,
            update_commitment: next_update_key.commitment.clone(),
        };
        let payload = UpdateSignedPayload {
            update_key: current_update_key.public_jwk.clone(),
            delta_hash: Self::delta_hash(&delta),
        };
        let signed_data = CompactJws::sign(&payload, &current_update_key.signing_key).unwrap();
        let operation_bytes = serde_json::to_vec(&json!({
            "type": "update",
            "did_suffix": did_suffix,
            "signed_data": signed_data,
            "delta": delta,
        }))
        .unwrap();
        UpdateParts {
            operation_bytes,
            next_update_key,
        }
    }

    /// Builds a recover revealing `current_recovery_key`, rebuilding the
    /// document from `patches` and committing to fresh keys on both chains.
    pub fn recover_operation(
        did_suffix: &DidSuffix,
        current_recovery_key: &GeneratedKey,
        patches: Vec<Patch>,
    ) -> RecoverParts {
        let next_recovery_key = Self::generate_key();
        let next_update_key = Self::generate_key();
        let delta = Delta {
            patches,
            update_commitment: next_update_key.commitment.clone(),
        };
        let payload = RecoverSignedPayload {
            recovery_key: current_recovery_key.public_jwk.clone(),
            recovery_commitment: next_recovery_key.commitment.clone(),
            delta_hash: Self::delta_hash(&delta),
        };
        let signed_data = CompactJws::sign(&payload, &current_recovery_key.signing_key).unwrap();
        let operation_bytes = serde_json::to_vec(&json!({
            "type": "recover",
            "did_suffix": did_suffix,
            "signed_data": signed_data,
            "delta": delta,
        }))
        .unwrap();
        RecoverParts {
            operation_bytes,
            next_recovery_key,
            next_update_key,
        }
    }

    /// Builds a deactivate revealing `current_recovery_key`.
    pub fn deactivate_operation(
        did_suffix: &DidSuffix,
        current_recovery_key: &GeneratedKey,
    ) -> Vec<u8> {
        let payload = DeactivateSignedPayload {
            did_suffix: did_suffix.clone(),
            recovery_key: current_recovery_key.public_jwk.clone(),
        };
        let signed_data = CompactJws::sign(&payload, &current_recovery_key.signing_key).unwrap();
        serde_json::to_vec(&json!({
            "type": "deactivate",
            "did_suffix": did_suffix,
            "signed_data": signed_data,
        }))
        .unwrap()
    }

    /// Builds the `{did_suffix, signed_data}` map-file reference and the
    /// raw delta value for an update, as a batch writer would anchor them.
    pub fn update_reference_and_delta(
        did_suffix: &DidSuffix,
        current_update_key: &GeneratedKey,
        patches: Vec<Patch>,
    ) -> (String, Value, GeneratedKey) {
        let parts = Self::update_operation(did_suffix, current_update_key, patches);
        let value: Value = serde_json::from_slice(&parts.operation_bytes).unwrap();
        let signed_data = value["signed_data"].as_str().unwrap().to_owned();
        let delta = value["delta"].clone();
        (signed_data, delta, parts.next_update_key)
    }

    /// Wraps operation bytes in an anchored record.
    pub fn anchored(
        kind: OperationKind,
        did_suffix: &DidSuffix,
        operation_bytes: Vec<u8>,
        transaction_time: u64,
        transaction_number: u64,
        operation_index: u32,
    ) -> AnchoredOperation {
        AnchoredOperation {
            kind,
            did_suffix: did_suffix.clone(),
            operation_bytes,
            transaction_time,
            transaction_number,
            operation_index,
        }
    }
}
