// Path: crates/crypto/src/hash/mod.rs

//! Canonical hashing for commitments, reveals and content identifiers.
//!
//! Every commitment in the protocol is the base64url encoding of a
//! self-describing multihash over the JCS (RFC 8785) canonical form of a
//! JSON value. Producing and checking them through this module guarantees
//! that two components can only ever compare like with like.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;
use sha2::{Digest, Sha256};
use trellis_types::config::MULTIHASH_SHA2_256;
use trellis_types::error::CryptoError;

/// Serializes a value to its JCS canonical JSON bytes.
pub fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    serde_jcs::to_vec(value).map_err(|e| CryptoError::CanonicalizationFailed(e.to_string()))
}

/// Computes the self-describing multihash of `data`.
///
/// The output is `code || digest_length || digest`. Only SHA2-256 (`0x12`)
/// is supported; any other code is rejected rather than silently
/// substituted, since a commitment hashed with the wrong algorithm could
/// never be revealed against.
pub fn multihash(data: &[u8], code: u64) -> Result<Vec<u8>, CryptoError> {
    if code != MULTIHASH_SHA2_256 {
        return Err(CryptoError::MultihashUnsupportedCode(code));
    }
    let digest = Sha256::digest(data);
    let mut out = Vec::with_capacity(2 + digest.len());
    out.push(MULTIHASH_SHA2_256 as u8);
    out.push(digest.len() as u8);
    out.extend_from_slice(&digest);
    Ok(out)
}

/// Encodes bytes as base64url without padding.
pub fn encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decodes a base64url string without padding.
pub fn decode(data: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(data)
        .map_err(|_| CryptoError::EncodedStringIncorrectEncoding)
}

/// Multihashes `data` and encodes the result.
pub fn hash_then_encode(data: &[u8], code: u64) -> Result<String, CryptoError> {
    Ok(encode(&multihash(data, code)?))
}

/// Canonicalizes a value, multihashes the canonical bytes and encodes the
/// result. This is the commitment/reveal derivation used everywhere.
pub fn canonicalize_then_hash_then_encode<T: Serialize>(
    value: &T,
    code: u64,
) -> Result<String, CryptoError> {
    hash_then_encode(&canonicalize(value)?, code)
}

/// Checks that `content` hashes to the declared encoded multihash.
///
/// The algorithm is taken from the declared hash itself, so a declaration
/// using an unsupported algorithm simply fails the check. Never errors:
/// a malformed declaration is just not a valid hash of anything.
pub fn is_valid_hash(content: &[u8], encoded_multihash: &str) -> bool {
    let Ok(declared) = decode(encoded_multihash) else {
        return false;
    };
    let Some((code, declared_digest)) = split_multihash(&declared) else {
        return false;
    };
    let Ok(recomputed) = multihash(content, code) else {
        return false;
    };
    match split_multihash(&recomputed) {
        Some((_, digest)) => digest == declared_digest,
        None => false,
    }
}

// Splits `code || length || digest`, returning None on any shape violation.
// Codes >= 0x80 would be multi-byte varints; none are supported.
fn split_multihash(bytes: &[u8]) -> Option<(u64, &[u8])> {
    let (&code, rest) = bytes.split_first()?;
    if code >= 0x80 {
        return None;
    }
    let (&length, digest) = rest.split_first()?;
    if digest.len() != length as usize {
        return None;
    }
    Some((code as u64, digest))
}
