// Path: crates/api/src/lib.rs

//! # Trellis API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Trellis API
//!
//! Core traits and interfaces for the Trellis DID kernel. This crate
//! defines the stable contract between the resolution engine and its
//! collaborators: the operation store, the content-addressable store, and
//! the per-epoch operation processors.

/// The content-addressable store contract.
pub mod cas;
/// Re-exports all core error types from the central `trellis-types` crate.
pub mod error;
/// The ledger adapter contract.
pub mod ledger;
/// The operation processor and version manager contracts.
pub mod processor;
/// The operation store contract.
pub mod store;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::cas::{ContentAddressableStore, FetchResult};
    pub use crate::error::{
        CasError, ErrorCode, IngestError, LedgerError, ResolveError, StoreError, VersionError,
    };
    pub use crate::ledger::LedgerAdapter;
    pub use crate::processor::{OperationProcessor, VersionManager};
    pub use crate::store::OperationStore;
}
