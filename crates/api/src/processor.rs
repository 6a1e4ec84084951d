// Path: crates/api/src/processor.rs

//! The operation processor and version manager contracts.

use std::sync::Arc;
use trellis_types::error::VersionError;
use trellis_types::operation::AnchoredOperation;
use trellis_types::state::DidState;

/// A per-epoch state transition function over anchored operations.
///
/// `apply` is total: it never panics and never errors. Every internal
/// failure (unparseable bytes, malformed keys, signature mismatch,
/// commitment mismatch) collapses to `None`, meaning "reject, state
/// unchanged". This is what lets the resolver skip adversarial operations
/// without ever aborting a resolution.
pub trait OperationProcessor: Send + Sync {
    /// Applies one anchored operation to the prior state.
    ///
    /// `prior` must be `None` exactly when the operation is expected to be
    /// a create. Returns the next state, or `None` to reject.
    fn apply(&self, prior: Option<&DidState>, operation: &AnchoredOperation) -> Option<DidState>;

    /// Returns the commitment this operation reveals against: the encoded
    /// multihash of the revealed update key (updates) or recovery key
    /// (recovers and deactivates). `None` for creates and for operations
    /// whose bytes do not parse far enough to expose a key.
    fn reveal_commitment(&self, operation: &AnchoredOperation) -> Option<String>;
}

/// Epoch lookup: which processor governs a given ledger time.
///
/// The resolver consults this per operation, not once per DID, so a
/// history spanning a protocol upgrade is replayed under the rules each
/// operation was anchored under.
pub trait VersionManager: Send + Sync {
    /// Returns the processor for operations anchored at `transaction_time`.
    fn processor_for(
        &self,
        transaction_time: u64,
    ) -> Result<Arc<dyn OperationProcessor>, VersionError>;
}
