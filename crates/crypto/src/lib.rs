// Path: crates/crypto/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented
    )
)]

//! # Trellis Crypto
//!
//! Canonicalization, multihashing, JWK handling and compact JWS
//! signing/verification for the Trellis DID kernel. Everything in this
//! crate is a pure function of its inputs; the commit-reveal discipline of
//! the protocol reduces entirely to the string equality of the encoded
//! multihashes produced here.

/// JCS canonicalization, multihash computation and base64url encoding.
pub mod hash;
/// JWK structural validation and curve dispatch.
pub mod jwk;
/// Compact JWS parsing, verification and signing.
pub mod jws;

pub use hash::{
    canonicalize, canonicalize_then_hash_then_encode, decode, encode, hash_then_encode,
    is_valid_hash, multihash,
};
pub use jwk::{validate_public_jwk, JwkCurve};
pub use jws::{CompactJws, JwsSigningKey, ALG_EDDSA, ALG_ES256K};
