// Path: crates/core/src/version.rs

//! Epoch to processor lookup.
//!
//! Protocol rules may change at a ledger height; operations must always be
//! replayed under the rules they were anchored under. The resolver asks
//! this lookup per operation, never once per DID.

use std::sync::Arc;
use trellis_api::processor::{OperationProcessor, VersionManager};
use trellis_types::error::VersionError;

/// A version manager over a sorted list of `(since_time, processor)` epochs.
pub struct EpochVersionManager {
    epochs: Vec<(u64, Arc<dyn OperationProcessor>)>,
}

impl EpochVersionManager {
    /// Creates a manager from epoch entries; entries are sorted by their
    /// starting time.
    pub fn new(mut epochs: Vec<(u64, Arc<dyn OperationProcessor>)>) -> Self {
        epochs.sort_by_key(|(since, _)| *since);
        Self { epochs }
    }

    /// Convenience constructor for a chain that has never changed rules.
    pub fn single(processor: Arc<dyn OperationProcessor>) -> Self {
        Self::new(vec![(0, processor)])
    }
}

impl VersionManager for EpochVersionManager {
    fn processor_for(
        &self,
        transaction_time: u64,
    ) -> Result<Arc<dyn OperationProcessor>, VersionError> {
        self.epochs
            .iter()
            .rev()
            .find(|(since, _)| *since <= transaction_time)
            .map(|(_, processor)| Arc::clone(processor))
            .ok_or(VersionError::VersionNotFound(transaction_time))
    }
}
