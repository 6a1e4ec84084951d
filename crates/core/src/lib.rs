// Path: crates/core/src/lib.rs

//! # Trellis Core
//!
//! The resolution engine: operation parsers, the batch file codecs, the
//! document composer, the per-epoch operation processor, the version
//! manager, the batch ingester and the resolver itself.
//!
//! The engine is logically single-threaded per DID. A resolution is a pure
//! computation over a point-in-time snapshot of the operation store;
//! parsers and the processor are pure functions, and the only suspension
//! points are store and CAS I/O at the edges.

/// The chunk file codec: the deltas referenced by a map file.
pub mod chunk_file;
mod compress;
/// The document composer: patch validation and application.
pub mod composer;
/// The batch ingester: ledger transaction to stored operations.
pub mod ingester;
/// The map file codec: the batch container anchored on the ledger.
pub mod map_file;
/// Parsers for the four operation kinds.
pub mod operations;
/// The operation processor: one state transition per anchored operation.
pub mod processor;
/// The resolver: replay of a DID's operations along commitment chains.
pub mod resolver;
/// The version manager: epoch to processor lookup.
pub mod version;

pub use composer::DocumentComposer;
pub use ingester::{BatchIngester, IngestOutcome};
pub use processor::DefaultOperationProcessor;
pub use resolver::Resolver;
pub use version::EpochVersionManager;
