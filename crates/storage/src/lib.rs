// Path: crates/storage/src/lib.rs

//! # Trellis Storage
//!
//! Reference operation store backends. The spec deliberately leaves the
//! persistence engine open; this crate supplies the in-memory multimap
//! used by tests, tooling and single-process deployments. Anything that
//! satisfies the `OperationStore` contract (idempotent `put` by anchor
//! key, snapshot-consistent `get`) can replace it.

/// The in-memory operation store.
pub mod memory;

pub use memory::MemoryOperationStore;
