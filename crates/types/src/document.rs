// Path: crates/types/src/document.rs

//! DID document content and the patches that mutate it.
//!
//! The document model is intentionally narrow: an ordered list of public
//! keys and an ordered list of service endpoints, both keyed by `id`.
//! Patches are the only mechanism by which documents change; they arrive
//! inside operation deltas and are applied by the document composer.

use serde::{Deserialize, Serialize};

/// A public key in JWK form.
///
/// Only the two curves the protocol signs with are representable:
/// `EC`/`secp256k1` (with both coordinates) and `OKP`/`Ed25519` (x only).
/// Structural validation and point decoding live in the crypto crate; this
/// is the pure wire shape, which is also the canonicalization input for
/// commitments and reveals.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct PublicKeyJwk {
    /// Key type, `EC` or `OKP`.
    pub kty: String,
    /// Curve name, `secp256k1` or `Ed25519`.
    pub crv: String,
    /// Base64url-encoded x coordinate (or raw key for `OKP`).
    pub x: String,
    /// Base64url-encoded y coordinate; present for `EC` keys only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// The purposes a public key may be registered for in a document.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "camelCase")]
pub enum PublicKeyPurpose {
    /// Usable for authentication challenges.
    Authentication,
    /// Usable for key agreement.
    KeyAgreement,
    /// Usable for assertions (verifiable credentials).
    AssertionMethod,
    /// Usable to delegate capabilities.
    CapabilityDelegation,
    /// Usable to invoke capabilities.
    CapabilityInvocation,
}

/// A single public key entry of a DID document.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct PublicKeyEntry {
    /// Document-unique identifier of the key.
    pub id: String,
    /// Verification method type string (e.g. `EcdsaSecp256k1VerificationKey2019`).
    #[serde(rename = "type")]
    pub key_type: String,
    /// The key material.
    pub jwk: PublicKeyJwk,
    /// What the key may be used for. Must be non-empty and free of duplicates.
    pub purposes: Vec<PublicKeyPurpose>,
}

/// A single service endpoint entry of a DID document.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct ServiceEndpointEntry {
    /// Document-unique identifier of the endpoint.
    pub id: String,
    /// Service type string (e.g. `IdentityHub`).
    #[serde(rename = "type")]
    pub endpoint_type: String,
    /// The endpoint URI.
    pub endpoint: String,
}

/// The mutable content of a DID document.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
#[serde(default)]
pub struct DocumentState {
    /// Registered public keys, in insertion order.
    pub public_keys: Vec<PublicKeyEntry>,
    /// Registered service endpoints, in insertion order.
    pub service_endpoints: Vec<ServiceEndpointEntry>,
}

impl DocumentState {
    /// Looks up a public key by id.
    pub fn public_key(&self, id: &str) -> Option<&PublicKeyEntry> {
        self.public_keys.iter().find(|k| k.id == id)
    }

    /// Looks up a service endpoint by id.
    pub fn service_endpoint(&self, id: &str) -> Option<&ServiceEndpointEntry> {
        self.service_endpoints.iter().find(|s| s.id == id)
    }
}

/// A single document mutation, tagged by its `action` property on the wire.
///
/// An unknown `action` fails deserialization, which downgrades the whole
/// delta to a document no-op at apply time.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "action")]
pub enum Patch {
    /// Overwrite the whole document with the supplied value.
    #[serde(rename = "replace")]
    Replace {
        /// The replacement document content.
        document: DocumentState,
    },
    /// Insert public keys by id.
    #[serde(rename = "add-public-keys")]
    AddPublicKeys {
        /// Keys to insert. Ids must not collide with existing keys.
        public_keys: Vec<PublicKeyEntry>,
    },
    /// Delete public keys by id. Unknown ids are ignored.
    #[serde(rename = "remove-public-keys")]
    RemovePublicKeys {
        /// Ids of keys to delete.
        ids: Vec<String>,
    },
    /// Insert service endpoints by id.
    #[serde(rename = "add-service-endpoints")]
    AddServiceEndpoints {
        /// Endpoints to insert. Ids must not collide with existing endpoints.
        service_endpoints: Vec<ServiceEndpointEntry>,
    },
    /// Delete service endpoints by id. Unknown ids are ignored.
    #[serde(rename = "remove-service-endpoints")]
    RemoveServiceEndpoints {
        /// Ids of endpoints to delete.
        ids: Vec<String>,
    },
}
