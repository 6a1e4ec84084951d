// Path: crates/api/src/error.rs

//! Re-exports all core error types from the central `trellis-types` crate.

pub use trellis_types::error::{
    CasError, ChunkFileError, CryptoError, ErrorCode, IngestError, LedgerError, MapFileError,
    OperationError, PatchError, ResolveError, StoreError, VersionError,
};
