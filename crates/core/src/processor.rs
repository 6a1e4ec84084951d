// Path: crates/core/src/processor.rs

//! The default operation processor: one state transition per anchored
//! operation.
//!
//! `apply` is a total function of `(prior state, operation)`. It holds no
//! state of its own and never errors: every internal failure, whether
//! bytes that do not parse, a key that does not hash to the expected
//! commitment, or a delta whose patches will not compose, collapses into
//! either `None` (the operation is rejected outright) or a
//! degraded-but-valid next state (the commitment advances while the
//! document stays), exactly as the protocol's anti-deadlock rules demand.

use crate::composer::DocumentComposer;
use crate::operations::{
    self, CreateOperation, DeactivateOperation, ParsedOperation, RecoverOperation, UpdateOperation,
};
use trellis_api::processor::OperationProcessor;
use trellis_types::config::ProtocolConfig;
use trellis_types::document::{DocumentState, PublicKeyJwk};
use trellis_types::error::ErrorCode;
use trellis_types::operation::{AnchoredOperation, Delta};
use trellis_types::state::DidState;

/// The processor implementing the current protocol rules.
#[derive(Default)]
pub struct DefaultOperationProcessor {
    config: ProtocolConfig,
}

impl DefaultOperationProcessor {
    /// Creates a processor for the given protocol parameters.
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    /// Checks that a revealed key hashes to the expected commitment.
    fn reveals(&self, key: &PublicKeyJwk, commitment: &str) -> bool {
        match trellis_crypto::canonicalize(key) {
            Ok(canonical) => trellis_crypto::is_valid_hash(&canonical, commitment),
            Err(_) => false,
        }
    }

    /// Composes a delta's patches onto a base document.
    ///
    /// Returns the base unchanged when composition fails: a structurally
    /// valid but semantically empty delta must not block the operation,
    /// or a malformed patch could lock the update chain forever.
    fn compose(&self, base: &DocumentState, delta: &Delta) -> DocumentState {
        match DocumentComposer::apply_patches(base, &delta.patches) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(code = e.code(), "patch composition failed; document kept");
                base.clone()
            }
        }
    }

    fn apply_create(
        &self,
        operation: &AnchoredOperation,
        parsed: &CreateOperation,
    ) -> Option<DidState> {
        if parsed.did_unique_suffix != operation.did_suffix {
            tracing::debug!("create suffix does not match anchored DID");
            return None;
        }
        let (document, next_update_commitment) = match &parsed.delta {
            Some(delta) => (
                self.compose(&DocumentState::default(), delta),
                Some(delta.update_commitment.clone()),
            ),
            None => (DocumentState::default(), None),
        };
        Some(DidState {
            document,
            next_recovery_commitment: Some(parsed.suffix_data.recovery_commitment.clone()),
            next_update_commitment,
            last_operation_transaction_number: operation.transaction_number,
            is_deactivated: false,
        })
    }

    fn apply_update(
        &self,
        prior: &DidState,
        operation: &AnchoredOperation,
        parsed: &UpdateOperation,
    ) -> Option<DidState> {
        if parsed.did_suffix != operation.did_suffix {
            return None;
        }
        let commitment = prior.next_update_commitment.as_deref()?;
        if !self.reveals(&parsed.payload.update_key, commitment) {
            return None;
        }
        let (document, next_update_commitment) = match &parsed.delta {
            Some(delta) => (
                self.compose(&prior.document, delta),
                Some(delta.update_commitment.clone()),
            ),
            None => (prior.document.clone(), None),
        };
        Some(DidState {
            document,
            next_recovery_commitment: prior.next_recovery_commitment.clone(),
            next_update_commitment,
            last_operation_transaction_number: operation.transaction_number,
            is_deactivated: false,
        })
    }

    fn apply_recover(
        &self,
        prior: &DidState,
        operation: &AnchoredOperation,
        parsed: &RecoverOperation,
    ) -> Option<DidState> {
        if parsed.did_suffix != operation.did_suffix {
            return None;
        }
        let commitment = prior.next_recovery_commitment.as_deref()?;
        if !self.reveals(&parsed.payload.recovery_key, commitment) {
            return None;
        }
        // Recovery rebuilds from scratch; patches conventionally begin
        // with a replace.
        let (document, next_update_commitment) = match &parsed.delta {
            Some(delta) => (
                self.compose(&DocumentState::default(), delta),
                Some(delta.update_commitment.clone()),
            ),
            None => (DocumentState::default(), None),
        };
        Some(DidState {
            document,
            next_recovery_commitment: Some(parsed.payload.recovery_commitment.clone()),
            next_update_commitment,
            last_operation_transaction_number: operation.transaction_number,
            is_deactivated: false,
        })
    }

    fn apply_deactivate(
        &self,
        prior: &DidState,
        operation: &AnchoredOperation,
        parsed: &DeactivateOperation,
    ) -> Option<DidState> {
        if parsed.did_suffix != operation.did_suffix
            || parsed.payload.did_suffix != operation.did_suffix
        {
            return None;
        }
        let commitment = prior.next_recovery_commitment.as_deref()?;
        if !self.reveals(&parsed.payload.recovery_key, commitment) {
            return None;
        }
        Some(DidState::deactivated(operation.transaction_number))
    }
}

impl OperationProcessor for DefaultOperationProcessor {
    fn apply(&self, prior: Option<&DidState>, operation: &AnchoredOperation) -> Option<DidState> {
        let parsed = match operations::parse_anchored(operation, &self.config) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(code = e.code(), kind = %operation.kind, "operation rejected at parse");
                return None;
            }
        };
        if prior.is_some_and(|state| state.is_deactivated) {
            return None;
        }
        match (prior, &parsed) {
            (None, ParsedOperation::Create(create)) => self.apply_create(operation, create),
            (Some(prior), ParsedOperation::Update(update)) => {
                self.apply_update(prior, operation, update)
            }
            (Some(prior), ParsedOperation::Recover(recover)) => {
                self.apply_recover(prior, operation, recover)
            }
            (Some(prior), ParsedOperation::Deactivate(deactivate)) => {
                self.apply_deactivate(prior, operation, deactivate)
            }
            _ => None,
        }
    }

    fn reveal_commitment(&self, operation: &AnchoredOperation) -> Option<String> {
        let parsed = operations::parse_anchored(operation, &self.config).ok()?;
        let revealed_key = match &parsed {
            ParsedOperation::Create(_) => return None,
            ParsedOperation::Update(update) => &update.payload.update_key,
            ParsedOperation::Recover(recover) => &recover.payload.recovery_key,
            ParsedOperation::Deactivate(deactivate) => &deactivate.payload.recovery_key,
        };
        trellis_crypto::canonicalize_then_hash_then_encode(
            revealed_key,
            self.config.hash_algorithm_code,
        )
        .ok()
    }
}
