// Path: crates/crypto/src/jws/mod.rs

//! Compact JWS parsing, verification and signing.
//!
//! Signed operation data travels as `header.payload.signature` with a
//! protected header of exactly `{"alg": ...}`. Verification dispatches on
//! the key's curve: ES256K over secp256k1, EdDSA over Ed25519. The
//! signature covers the ASCII signing input `protected + "." + payload`,
//! exactly as submitted; canonicalization plays no role here.

use crate::hash;
use crate::jwk::{self, JwkCurve};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use trellis_types::document::PublicKeyJwk;
use trellis_types::error::CryptoError;

/// ECDSA over secp256k1 with SHA-256.
pub const ALG_ES256K: &str = "ES256K";
/// Ed25519.
pub const ALG_EDDSA: &str = "EdDSA";

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JwsHeader {
    alg: String,
}

/// A parsed compact JWS. Segments are kept in their encoded form; the
/// signing input must be reconstructible byte for byte.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CompactJws {
    /// Base64url protected header.
    pub protected: String,
    /// Base64url payload.
    pub payload: String,
    /// Base64url signature.
    pub signature: String,
}

impl CompactJws {
    /// Parses and structurally validates a compact JWS string.
    pub fn parse(compact: &str) -> Result<Self, CryptoError> {
        let mut segments = compact.split('.');
        let (Some(protected), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(CryptoError::JwsIncorrectCompactFormat);
        };
        if protected.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(CryptoError::JwsIncorrectCompactFormat);
        }
        let header_bytes =
            hash::decode(protected).map_err(|_| CryptoError::JwsIncorrectCompactFormat)?;
        hash::decode(payload).map_err(|_| CryptoError::JwsIncorrectCompactFormat)?;
        hash::decode(signature).map_err(|_| CryptoError::JwsIncorrectCompactFormat)?;
        let header: JwsHeader = serde_json::from_slice(&header_bytes)
            .map_err(|_| CryptoError::JwsProtectedHeaderInvalid)?;
        if header.alg != ALG_ES256K && header.alg != ALG_EDDSA {
            return Err(CryptoError::JwsProtectedHeaderInvalid);
        }
        Ok(Self {
            protected: protected.to_owned(),
            payload: payload.to_owned(),
            signature: signature.to_owned(),
        })
    }

    /// Renders the `header.payload.signature` form.
    pub fn to_compact(&self) -> String {
        format!("{}.{}.{}", self.protected, self.payload, self.signature)
    }

    /// Decodes the payload into the expected JSON shape. Unknown payload
    /// properties are rejected by the target types themselves.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, CryptoError> {
        let bytes = hash::decode(&self.payload)?;
        serde_json::from_slice(&bytes).map_err(|e| CryptoError::JwsPayloadNotJson(e.to_string()))
    }

    fn alg(&self) -> Result<String, CryptoError> {
        let header_bytes = hash::decode(&self.protected)?;
        let header: JwsHeader = serde_json::from_slice(&header_bytes)
            .map_err(|_| CryptoError::JwsProtectedHeaderInvalid)?;
        Ok(header.alg)
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.protected, self.payload)
    }

    /// Verifies the signature against a public JWK.
    ///
    /// The header algorithm must agree with the key's curve; a mismatch is
    /// reported distinctly from a bad signature.
    pub fn verify(&self, jwk: &PublicKeyJwk) -> Result<(), CryptoError> {
        let curve = jwk::validate_public_jwk(jwk)?;
        let alg = self.alg()?;
        let input = self.signing_input();
        let signature_bytes = hash::decode(&self.signature)?;
        match curve {
            JwkCurve::Secp256k1 => {
                if alg != ALG_ES256K {
                    return Err(CryptoError::JwsAlgorithmMismatch);
                }
                verify_es256k(jwk, input.as_bytes(), &signature_bytes)
            }
            JwkCurve::Ed25519 => {
                if alg != ALG_EDDSA {
                    return Err(CryptoError::JwsAlgorithmMismatch);
                }
                verify_eddsa(jwk, input.as_bytes(), &signature_bytes)
            }
        }
    }

    /// Signs a JSON payload, producing the compact serialization.
    pub fn sign<T: Serialize>(payload: &T, key: &JwsSigningKey) -> Result<String, CryptoError> {
        let header = JwsHeader {
            alg: key.alg().to_owned(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let payload_json =
            serde_json::to_vec(payload).map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let protected = hash::encode(&header_json);
        let encoded_payload = hash::encode(&payload_json);
        let input = format!("{protected}.{encoded_payload}");
        let signature = key.sign_raw(input.as_bytes());
        Ok(format!("{protected}.{encoded_payload}.{}", hash::encode(&signature)))
    }
}

fn verify_es256k(jwk: &PublicKeyJwk, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    use k256::ecdsa::signature::Verifier;
    use k256::ecdsa::{Signature, VerifyingKey};

    let x = jwk::decode_coordinate(&jwk.x)?;
    let y = jwk
        .y
        .as_deref()
        .ok_or_else(|| CryptoError::JwkMalformedKeyMaterial("missing y".into()))?;
    let y = jwk::decode_coordinate(y)?;
    let mut sec1 = Vec::with_capacity(65);
    sec1.push(0x04);
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);
    let key = VerifyingKey::from_sec1_bytes(&sec1)
        .map_err(|e| CryptoError::JwkMalformedKeyMaterial(e.to_string()))?;
    let signature =
        Signature::from_slice(signature).map_err(|_| CryptoError::JwsSignatureInvalid)?;
    key.verify(message, &signature)
        .map_err(|_| CryptoError::JwsSignatureInvalid)
}

fn verify_eddsa(jwk: &PublicKeyJwk, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    let x = jwk::decode_coordinate(&jwk.x)?;
    let key = VerifyingKey::from_bytes(&x)
        .map_err(|e| CryptoError::JwkMalformedKeyMaterial(e.to_string()))?;
    let signature =
        Signature::from_slice(signature).map_err(|_| CryptoError::JwsSignatureInvalid)?;
    key.verify(message, &signature)
        .map_err(|_| CryptoError::JwsSignatureInvalid)
}

/// A private signing key for the writer and test sides.
pub enum JwsSigningKey {
    /// secp256k1 ECDSA key, signs as ES256K.
    Es256k(k256::ecdsa::SigningKey),
    /// Ed25519 key, signs as EdDSA.
    Ed25519(ed25519_dalek::SigningKey),
}

impl JwsSigningKey {
    fn alg(&self) -> &'static str {
        match self {
            Self::Es256k(_) => ALG_ES256K,
            Self::Ed25519(_) => ALG_EDDSA,
        }
    }

    fn sign_raw(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Es256k(key) => {
                use k256::ecdsa::signature::Signer;
                let signature: k256::ecdsa::Signature = key.sign(message);
                signature.to_bytes().to_vec()
            }
            Self::Ed25519(key) => {
                use ed25519_dalek::Signer;
                key.sign(message).to_bytes().to_vec()
            }
        }
    }

    /// Derives the public JWK of this key.
    pub fn public_jwk(&self) -> Result<PublicKeyJwk, CryptoError> {
        match self {
            Self::Es256k(key) => {
                let point = key.verifying_key().to_encoded_point(false);
                let x = point
                    .x()
                    .ok_or_else(|| CryptoError::SigningFailed("point has no x".into()))?;
                let y = point
                    .y()
                    .ok_or_else(|| CryptoError::SigningFailed("point has no y".into()))?;
                Ok(PublicKeyJwk {
                    kty: "EC".into(),
                    crv: "secp256k1".into(),
                    x: hash::encode(x.as_slice()),
                    y: Some(hash::encode(y.as_slice())),
                })
            }
            Self::Ed25519(key) => Ok(PublicKeyJwk {
                kty: "OKP".into(),
                crv: "Ed25519".into(),
                x: hash::encode(&key.verifying_key().to_bytes()),
                y: None,
            }),
        }
    }
}
