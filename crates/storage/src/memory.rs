// Path: crates/storage/src/memory.rs

//! An in-memory `OperationStore` backed by a `BTreeSet` per DID.
//!
//! `AnchoredOperation` orders and equates by anchor key, so the set gives
//! both the idempotence the contract requires and cheap sorted iteration.
//! The whole map sits behind a single `tokio::sync::RwLock`; a completed
//! `put` is visible to every subsequent `get`, and `get` hands back a
//! point-in-time snapshot.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use trellis_api::store::OperationStore;
use trellis_types::did::DidSuffix;
use trellis_types::error::StoreError;
use trellis_types::operation::{AnchoredOperation, OperationKind};

/// An in-memory multimap `DidSuffix -> BTreeSet<AnchoredOperation>`.
#[derive(Default)]
pub struct MemoryOperationStore {
    inner: RwLock<HashMap<DidSuffix, BTreeSet<AnchoredOperation>>>,
}

impl MemoryOperationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of operations stored across all DIDs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.values().map(BTreeSet::len).sum()
    }

    /// Returns true when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OperationStore for MemoryOperationStore {
    async fn put(&self, operations: Vec<AnchoredOperation>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for operation in operations {
            let entry = inner.entry(operation.did_suffix.clone()).or_default();
            // BTreeSet::insert keeps the first payload stored for an
            // anchor key, which is exactly the idempotence the contract
            // asks for.
            if !entry.insert(operation) {
                tracing::trace!("duplicate anchor key ignored");
            }
        }
        Ok(())
    }

    async fn get(&self, did_suffix: &DidSuffix) -> Result<Vec<AnchoredOperation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(did_suffix)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_updates_earlier_than(
        &self,
        did_suffix: &DidSuffix,
        transaction_time: u64,
    ) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(set) = inner.get_mut(did_suffix) else {
            return Ok(0);
        };
        let before = set.len();
        set.retain(|op| {
            !(op.kind == OperationKind::Update && op.transaction_time < transaction_time)
        });
        Ok(before - set.len())
    }
}
