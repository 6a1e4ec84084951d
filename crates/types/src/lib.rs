// Path: crates/types/src/lib.rs

//! # Trellis Types
//!
//! Core data structures and error types for the Trellis DID kernel. This
//! crate defines the wire and in-memory model shared by every other
//! component: anchored operations and their canonical ordering, DID
//! document state, protocol configuration, and the stable error surface.

/// Anchor strings, content identifiers and ledger transaction records.
pub mod anchor;
/// Protocol parameters enforced by parsers and codecs.
pub mod config;
/// The canonical DID suffix identifier.
pub mod did;
/// DID document content: public keys, service endpoints and patches.
pub mod document;
/// Core error types with stable machine-readable codes.
pub mod error;
/// Anchored operations, suffix data, deltas and signed payloads.
pub mod operation;
/// The resolved state of a DID.
pub mod state;

/// A curated set of the most commonly used types.
pub mod prelude {
    pub use crate::anchor::{AnchoredData, Cid, LedgerTransaction};
    pub use crate::config::ProtocolConfig;
    pub use crate::did::DidSuffix;
    pub use crate::document::{
        DocumentState, Patch, PublicKeyEntry, PublicKeyJwk, PublicKeyPurpose,
        ServiceEndpointEntry,
    };
    pub use crate::error::ErrorCode;
    pub use crate::operation::{AnchorKey, AnchoredOperation, Delta, OperationKind, SuffixData};
    pub use crate::state::DidState;
}
