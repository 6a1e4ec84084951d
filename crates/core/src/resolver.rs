// Path: crates/core/src/resolver.rs

//! The resolver: replay of a DID's operation history along its commitment
//! chains.
//!
//! Selection and ordering are driven by the chains themselves, not by
//! anchor order alone: after the earliest valid create, the resolver
//! repeatedly asks "which stored operations reveal against the commitment
//! the state currently expects?" and applies the earliest of them. Anchor
//! order breaks every remaining tie, which is what makes the result
//! deterministic no matter how adversarially the store was populated.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use trellis_api::processor::VersionManager;
use trellis_api::store::OperationStore;
use trellis_types::did::DidSuffix;
use trellis_types::error::ResolveError;
use trellis_types::operation::{AnchoredOperation, OperationKind};
use trellis_types::state::DidState;

/// Reveal-keyed buckets of operations, each bucket in anchor order.
type CommitmentBuckets = HashMap<String, VecDeque<AnchoredOperation>>;

/// Rebuilds `DidState` from the operation store.
pub struct Resolver<S> {
    store: S,
    versions: Arc<dyn VersionManager>,
}

impl<S: OperationStore> Resolver<S> {
    /// Creates a resolver over a store and a version manager.
    pub fn new(store: S, versions: Arc<dyn VersionManager>) -> Self {
        Self { store, versions }
    }

    /// Resolves the current state of a DID.
    ///
    /// Returns `Ok(None)` when no valid create exists for the suffix: a
    /// DID with only invalid operations is simply not found. Individual
    /// invalid operations are skipped, never fatal; only collaborator
    /// failures surface as errors.
    pub async fn resolve(&self, did_suffix: &DidSuffix) -> Result<Option<DidState>, ResolveError> {
        let mut operations = self.store.get(did_suffix).await?;
        operations.sort();

        let mut creates = Vec::new();
        let mut updates = Vec::new();
        let mut recoveries = Vec::new();
        for operation in operations {
            match operation.kind {
                OperationKind::Create => creates.push(operation),
                OperationKind::Update => updates.push(operation),
                OperationKind::Recover | OperationKind::Deactivate => recoveries.push(operation),
            }
        }

        let Some(mut state) = self.apply_earliest_valid_create(creates)? else {
            tracing::debug!(%did_suffix, "no valid create operation");
            return Ok(None);
        };

        let recovery_buckets = self.bucket_by_reveal(recoveries)?;
        self.apply_recover_and_deactivate_operations(&mut state, recovery_buckets)?;

        if !state.is_deactivated {
            let update_buckets = self.bucket_by_reveal(updates)?;
            self.apply_update_operations(&mut state, update_buckets)?;
        }

        Ok(Some(state))
    }

    /// Picks the earliest create (by anchor key) that applies validly.
    /// Later creates never overwrite an established state.
    fn apply_earliest_valid_create(
        &self,
        creates: Vec<AnchoredOperation>,
    ) -> Result<Option<DidState>, ResolveError> {
        for create in creates {
            let processor = self.versions.processor_for(create.transaction_time)?;
            if let Some(state) = processor.apply(None, &create) {
                return Ok(Some(state));
            }
            tracing::trace!("create candidate skipped");
        }
        Ok(None)
    }

    /// Groups operations by the commitment each one reveals against.
    /// Input is in anchor order, so every bucket is too.
    fn bucket_by_reveal(
        &self,
        operations: Vec<AnchoredOperation>,
    ) -> Result<CommitmentBuckets, ResolveError> {
        let mut buckets: CommitmentBuckets = HashMap::new();
        for operation in operations {
            let processor = self.versions.processor_for(operation.transaction_time)?;
            match processor.reveal_commitment(&operation) {
                Some(reveal) => buckets.entry(reveal).or_default().push_back(operation),
                None => tracing::trace!("operation exposes no reveal value; skipped"),
            }
        }
        Ok(buckets)
    }

    /// Walks the recovery commitment chain: while the current recovery
    /// commitment has a bucket, try its entries in anchor order, dropping
    /// failures one at a time. Stops on deactivation or when no bucket
    /// matches.
    fn apply_recover_and_deactivate_operations(
        &self,
        state: &mut DidState,
        mut buckets: CommitmentBuckets,
    ) -> Result<(), ResolveError> {
        while !state.is_deactivated {
            let Some(commitment) = state.next_recovery_commitment.clone() else {
                break;
            };
            let Some(operation) = Self::take_earliest(&mut buckets, &commitment) else {
                break;
            };
            let processor = self.versions.processor_for(operation.transaction_time)?;
            match processor.apply(Some(state), &operation) {
                Some(next) => *state = next,
                None => tracing::trace!("recovery-chain operation skipped"),
            }
        }
        Ok(())
    }

    /// Walks the update commitment chain with the same discipline. Only
    /// one update per commitment can succeed, since success moves the
    /// commitment forward; same-reveal rivals lose by anchor order.
    fn apply_update_operations(
        &self,
        state: &mut DidState,
        mut buckets: CommitmentBuckets,
    ) -> Result<(), ResolveError> {
        while !state.is_deactivated {
            let Some(commitment) = state.next_update_commitment.clone() else {
                break;
            };
            let Some(operation) = Self::take_earliest(&mut buckets, &commitment) else {
                break;
            };
            let processor = self.versions.processor_for(operation.transaction_time)?;
            match processor.apply(Some(state), &operation) {
                Some(next) => *state = next,
                None => tracing::trace!("update operation skipped"),
            }
        }
        Ok(())
    }

    /// Pops the earliest not-yet-consumed operation revealing against
    /// `commitment`, dropping the bucket once exhausted.
    fn take_earliest(
        buckets: &mut CommitmentBuckets,
        commitment: &str,
    ) -> Option<AnchoredOperation> {
        let bucket = buckets.get_mut(commitment)?;
        let operation = bucket.pop_front();
        if bucket.is_empty() {
            buckets.remove(commitment);
        }
        operation
    }
}
