// Path: crates/api/src/ledger.rs

//! The ledger adapter contract.
//!
//! The ledger yields a monotonic stream of anchoring transactions; the
//! kernel only ever reads it forward. Reorg handling, confirmation depth
//! and fee logic all live behind this interface.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_types::anchor::LedgerTransaction;
use trellis_types::error::LedgerError;

/// A read-forward view of the anchoring ledger.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    /// Returns anchoring transactions strictly after the given
    /// `(transaction_time, transaction_number)` cursor, oldest first.
    /// `None` starts from the beginning of the ledger.
    async fn transactions_since(
        &self,
        cursor: Option<(u64, u64)>,
    ) -> Result<Vec<LedgerTransaction>, LedgerError>;
}

// Blanket implementation so the adapter can be shared behind an `Arc`.
#[async_trait]
impl<T: LedgerAdapter + ?Sized> LedgerAdapter for Arc<T> {
    async fn transactions_since(
        &self,
        cursor: Option<(u64, u64)>,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        (**self).transactions_since(cursor).await
    }
}
