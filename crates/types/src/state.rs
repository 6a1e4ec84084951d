// Path: crates/types/src/state.rs

//! The resolved state of a DID.
//!
//! A `DidState` is ephemeral: the resolver rebuilds it from the store's
//! current contents on every resolution, so no incremental persistence is
//! required for correctness.

use crate::document::DocumentState;
use serde::{Deserialize, Serialize};

/// The authoritative state of a DID after replaying its operation history.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct DidState {
    /// Current document content.
    pub document: DocumentState,
    /// Commitment the next recover or deactivate must reveal against.
    /// `None` once the DID is deactivated.
    pub next_recovery_commitment: Option<String>,
    /// Commitment the next update must reveal against. `None` when update
    /// progress is locked (invalid create/recover delta) or the DID is
    /// deactivated.
    pub next_update_commitment: Option<String>,
    /// Transaction number of the last operation that changed this state.
    pub last_operation_transaction_number: u64,
    /// Whether the DID has been terminally deactivated.
    pub is_deactivated: bool,
}

impl DidState {
    /// A terminal state: empty document, no commitments.
    pub fn deactivated(last_operation_transaction_number: u64) -> Self {
        Self {
            document: DocumentState::default(),
            next_recovery_commitment: None,
            next_update_commitment: None,
            last_operation_transaction_number,
            is_deactivated: true,
        }
    }
}
