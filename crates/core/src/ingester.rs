// Path: crates/core/src/ingester.rs

//! The batch ingester: from one anchored ledger transaction to stored
//! operations.
//!
//! The walk is pure plumbing over the batch codecs: decode the anchor
//! string, fetch and parse the map file, fetch and parse the chunk file it
//! points at, assemble one full update operation per reference, and store
//! whatever parses. A single malformed operation is dropped and counted;
//! a malformed *container* rejects the whole transaction, because nothing
//! in it can be trusted to be positionally correct anymore.

use crate::chunk_file::ChunkFile;
use crate::map_file::MapFile;
use crate::operations::UpdateOperation;
use serde_json::json;
use trellis_api::cas::{ContentAddressableStore, FetchResult};
use trellis_api::store::OperationStore;
use trellis_types::anchor::{AnchoredData, Cid, LedgerTransaction};
use trellis_types::config::ProtocolConfig;
use trellis_types::error::{ChunkFileError, ErrorCode, IngestError};
use trellis_types::operation::{AnchoredOperation, OperationKind};

/// What one ingested transaction contributed to the store.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct IngestOutcome {
    /// Operations written to the store.
    pub stored: usize,
    /// Operations dropped because their bytes failed to parse.
    pub dropped: usize,
}

/// Ingests anchored batches into an operation store.
pub struct BatchIngester<C, S> {
    cas: C,
    store: S,
    config: ProtocolConfig,
}

impl<C: ContentAddressableStore, S: OperationStore> BatchIngester<C, S> {
    /// Creates an ingester over a CAS and an operation store.
    pub fn new(cas: C, store: S, config: ProtocolConfig) -> Self {
        Self { cas, store, config }
    }

    /// Processes one ledger transaction end to end.
    pub async fn ingest_transaction(
        &self,
        transaction: &LedgerTransaction,
    ) -> Result<IngestOutcome, IngestError> {
        let anchored = AnchoredData::parse(&transaction.anchor_string)?;
        if anchored.operation_count > self.config.max_operations_per_batch {
            return Err(IngestError::AnchorStringOperationCountExceedsLimit {
                got: anchored.operation_count,
                max: self.config.max_operations_per_batch,
            });
        }

        let map_bytes = self
            .fetch(&anchored.map_file_cid, self.config.max_map_file_bytes)
            .await?;
        let map_file = MapFile::parse(&map_bytes, &self.config)?;
        let updates = map_file.updates();
        if anchored.operation_count as usize != updates.len() {
            return Err(IngestError::AnchorStringOperationCountMismatch {
                declared: anchored.operation_count,
                got: updates.len(),
            });
        }

        let Some(chunk_file_uri) = map_file.chunk_file_uri() else {
            // Unreachable past `MapFile::parse`, which demands one chunk.
            return Err(IngestError::from(
                trellis_types::error::MapFileError::MapFileChunksPropertyMissingOrIncorrectType,
            ));
        };
        let chunk_bytes = self
            .fetch(&Cid::from(chunk_file_uri), self.config.max_chunk_file_bytes)
            .await?;
        let chunk_file = ChunkFile::parse(&chunk_bytes, &self.config)?;
        if chunk_file.deltas.len() != updates.len() {
            return Err(IngestError::from(ChunkFileError::ChunkFileDeltaCountMismatch {
                got: chunk_file.deltas.len(),
                expected: updates.len(),
            }));
        }

        let mut outcome = IngestOutcome::default();
        let mut batch = Vec::with_capacity(updates.len());
        for (index, (reference, delta)) in updates.iter().zip(&chunk_file.deltas).enumerate() {
            let operation_value = json!({
                "type": "update",
                "did_suffix": reference.did_suffix,
                "signed_data": reference.signed_data,
                "delta": delta,
            });
            let Ok(operation_bytes) = serde_json::to_vec(&operation_value) else {
                outcome.dropped += 1;
                continue;
            };
            match UpdateOperation::parse(&operation_bytes, &self.config) {
                Ok(_) => batch.push(AnchoredOperation {
                    kind: OperationKind::Update,
                    did_suffix: reference.did_suffix.clone(),
                    operation_bytes,
                    transaction_time: transaction.transaction_time,
                    transaction_number: transaction.transaction_number,
                    operation_index: index as u32,
                }),
                Err(e) => {
                    tracing::debug!(
                        code = e.code(),
                        did_suffix = %reference.did_suffix,
                        index,
                        "update operation dropped at ingestion"
                    );
                    outcome.dropped += 1;
                }
            }
        }

        outcome.stored = batch.len();
        self.store.put(batch).await?;
        tracing::info!(
            transaction_time = transaction.transaction_time,
            transaction_number = transaction.transaction_number,
            stored = outcome.stored,
            dropped = outcome.dropped,
            "batch ingested"
        );
        Ok(outcome)
    }

    async fn fetch(&self, cid: &Cid, max_size_bytes: usize) -> Result<Vec<u8>, IngestError> {
        match self.cas.read(cid, max_size_bytes).await? {
            FetchResult::Success(bytes) => Ok(bytes),
            FetchResult::NotFound => Err(IngestError::CasFileNotFound(cid.to_string())),
            FetchResult::MaxSizeExceeded => {
                Err(IngestError::CasFileExceedsMaximumSize(cid.to_string()))
            }
        }
    }
}
