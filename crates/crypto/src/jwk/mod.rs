// Path: crates/crypto/src/jwk/mod.rs

//! JWK structural validation and curve dispatch.

use crate::hash;
use trellis_types::document::PublicKeyJwk;
use trellis_types::error::CryptoError;

/// The curves the protocol signs with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JwkCurve {
    /// `EC`/`secp256k1`, verified as ES256K.
    Secp256k1,
    /// `OKP`/`Ed25519`, verified as EdDSA.
    Ed25519,
}

/// Validates a public JWK and returns the curve it belongs to.
///
/// Coordinates must decode to exactly 32 bytes each; an `OKP` key must not
/// carry a `y` coordinate. Point validity on the curve is checked later by
/// the verifier, which has to decode the key anyway.
pub fn validate_public_jwk(jwk: &PublicKeyJwk) -> Result<JwkCurve, CryptoError> {
    match (jwk.kty.as_str(), jwk.crv.as_str()) {
        ("EC", "secp256k1") => {
            decode_coordinate(&jwk.x)?;
            let y = jwk
                .y
                .as_deref()
                .ok_or_else(|| CryptoError::JwkMalformedKeyMaterial("missing y".into()))?;
            decode_coordinate(y)?;
            Ok(JwkCurve::Secp256k1)
        }
        ("OKP", "Ed25519") => {
            if jwk.y.is_some() {
                return Err(CryptoError::JwkMalformedKeyMaterial(
                    "unexpected y on OKP key".into(),
                ));
            }
            decode_coordinate(&jwk.x)?;
            Ok(JwkCurve::Ed25519)
        }
        ("EC", crv) | ("OKP", crv) => Err(CryptoError::JwkUnsupportedCurve(crv.to_owned())),
        (kty, _) => Err(CryptoError::JwkUnsupportedKeyType(kty.to_owned())),
    }
}

/// Decodes a base64url coordinate and enforces the 32-byte length.
pub fn decode_coordinate(encoded: &str) -> Result<[u8; 32], CryptoError> {
    let bytes = hash::decode(encoded)
        .map_err(|_| CryptoError::JwkMalformedKeyMaterial("coordinate not base64url".into()))?;
    bytes
        .try_into()
        .map_err(|_| CryptoError::JwkMalformedKeyMaterial("coordinate is not 32 bytes".into()))
}
