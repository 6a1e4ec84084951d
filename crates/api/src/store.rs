// Path: crates/api/src/store.rs

//! Defines the `OperationStore` trait: a persisted multimap from DID
//! suffix to the set of anchored operations observed for it.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_types::did::DidSuffix;
use trellis_types::error::StoreError;
use trellis_types::operation::AnchoredOperation;

/// A persisted multimap `DidSuffix -> Set<AnchoredOperation>`.
///
/// Implementations must be idempotent over the anchor key: re-putting an
/// operation whose `(transaction_time, transaction_number,
/// operation_index)` is already present is a no-op, and the first-stored
/// payload for a key is retained. Iteration order of `get` is
/// unspecified; the resolver sorts. A completed `put` must be visible to
/// any subsequent `get`.
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Inserts a batch of anchored operations.
    async fn put(&self, operations: Vec<AnchoredOperation>) -> Result<(), StoreError>;

    /// Returns all operations stored for a DID, in unspecified order.
    async fn get(&self, did_suffix: &DidSuffix) -> Result<Vec<AnchoredOperation>, StoreError>;

    /// Deletes update operations anchored strictly before the given
    /// ledger time. A pruning hook for use after checkpointing; never part
    /// of the normal ingestion or resolution path. Returns the number of
    /// operations removed.
    async fn delete_updates_earlier_than(
        &self,
        did_suffix: &DidSuffix,
        transaction_time: u64,
    ) -> Result<usize, StoreError>;
}

// Blanket implementation so stores can be shared behind an `Arc`.
#[async_trait]
impl<T: OperationStore + ?Sized> OperationStore for Arc<T> {
    async fn put(&self, operations: Vec<AnchoredOperation>) -> Result<(), StoreError> {
        (**self).put(operations).await
    }

    async fn get(&self, did_suffix: &DidSuffix) -> Result<Vec<AnchoredOperation>, StoreError> {
        (**self).get(did_suffix).await
    }

    async fn delete_updates_earlier_than(
        &self,
        did_suffix: &DidSuffix,
        transaction_time: u64,
    ) -> Result<usize, StoreError> {
        (**self)
            .delete_updates_earlier_than(did_suffix, transaction_time)
            .await
    }
}
