// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! # Trellis Test Utilities
//!
//! Generators and mock collaborators for testing the Trellis kernel.
//! Operations produced here carry real keys and real signatures, so the
//! engine under test runs its full cryptographic path; `unwrap` is fair
//! game, this crate never ships in a node.

/// An in-memory content-addressable store.
pub mod cas_mock;
/// Wire-accurate operation generators.
pub mod fixtures;

pub use cas_mock::MockCas;
pub use fixtures::{
    CreateParts, GeneratedKey, OperationGenerator, RecoverParts, UpdateParts,
};
