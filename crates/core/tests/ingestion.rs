// Path: crates/core/tests/ingestion.rs

//! End-to-end ingestion: anchor string to CAS to map and chunk files to
//! stored operations to a resolvable state.

use std::sync::Arc;
use trellis_api::cas::ContentAddressableStore;
use trellis_api::store::OperationStore;
use trellis_core::chunk_file::ChunkFile;
use trellis_core::map_file::{MapFile, UpdateReference};
use trellis_core::{BatchIngester, DefaultOperationProcessor, EpochVersionManager, Resolver};
use trellis_storage::MemoryOperationStore;
use trellis_test_utils::{MockCas, OperationGenerator};
use trellis_types::anchor::LedgerTransaction;
use trellis_types::config::ProtocolConfig;
use trellis_types::did::DidSuffix;
use trellis_types::document::Patch;
use trellis_types::error::{ErrorCode, IngestError};
use trellis_types::operation::OperationKind;

fn add_key(id: &str) -> Patch {
    Patch::AddPublicKeys {
        public_keys: vec![OperationGenerator::public_key_entry(id)],
    }
}

struct Harness {
    cas: Arc<MockCas>,
    store: Arc<MemoryOperationStore>,
    ingester: BatchIngester<Arc<MockCas>, Arc<MemoryOperationStore>>,
    resolver: Resolver<Arc<MemoryOperationStore>>,
}

fn harness() -> Harness {
    let cas = Arc::new(MockCas::new());
    let store = Arc::new(MemoryOperationStore::new());
    let ingester = BatchIngester::new(
        Arc::clone(&cas),
        Arc::clone(&store),
        ProtocolConfig::default(),
    );
    let processor = Arc::new(DefaultOperationProcessor::default());
    let resolver = Resolver::new(
        Arc::clone(&store),
        Arc::new(EpochVersionManager::single(processor)),
    );
    Harness {
        cas,
        store,
        ingester,
        resolver,
    }
}

/// Anchors a batch of `(did_suffix, signed_data, delta)` updates and
/// returns the ledger transaction referencing it.
async fn anchor_batch(
    harness: &Harness,
    entries: Vec<(DidSuffix, String, serde_json::Value)>,
    transaction_time: u64,
    transaction_number: u64,
) -> LedgerTransaction {
    let deltas = entries.iter().map(|(_, _, delta)| delta.clone()).collect();
    let chunk_bytes = ChunkFile::build(deltas).unwrap();
    let chunk_cid = harness.cas.write(&chunk_bytes).await.unwrap();

    let references = entries
        .iter()
        .map(|(did_suffix, signed_data, _)| UpdateReference {
            did_suffix: did_suffix.clone(),
            signed_data: signed_data.clone(),
        })
        .collect();
    let map_bytes = MapFile::build(chunk_cid.as_str(), references).unwrap();
    let map_cid = harness.cas.write(&map_bytes).await.unwrap();

    LedgerTransaction {
        anchor_string: format!("{}.{}", entries.len(), map_cid),
        transaction_time,
        transaction_number,
    }
}

#[tokio::test]
async fn ingested_batch_resolves() {
    let harness = harness();
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();
    harness
        .store
        .put(vec![OperationGenerator::anchored(
            OperationKind::Create,
            &did,
            create.operation_bytes.clone(),
            1,
            1,
            0,
        )])
        .await
        .unwrap();

    let (signed_data, delta, _next) =
        OperationGenerator::update_reference_and_delta(&did, &create.update_key, vec![add_key("key2")]);
    let transaction = anchor_batch(&harness, vec![(did.clone(), signed_data, delta)], 2, 2).await;

    let outcome = harness.ingester.ingest_transaction(&transaction).await.unwrap();
    assert_eq!(outcome.stored, 1);
    assert_eq!(outcome.dropped, 0);

    let state = harness.resolver.resolve(&did).await.unwrap().unwrap();
    assert_eq!(state.document.public_keys.len(), 2);
    assert!(state.document.public_key("key2").is_some());
    assert_eq!(state.last_operation_transaction_number, 2);
}

#[tokio::test]
async fn malformed_update_is_dropped_but_batch_survives() {
    let harness = harness();
    let create_a = OperationGenerator::create_operation(vec![add_key("key1")]);
    let create_b = OperationGenerator::create_operation(vec![add_key("key1")]);
    for (time, create) in [(1, &create_a), (2, &create_b)] {
        harness
            .store
            .put(vec![OperationGenerator::anchored(
                OperationKind::Create,
                &create.did_suffix,
                create.operation_bytes.clone(),
                time,
                time,
                0,
            )])
            .await
            .unwrap();
    }

    let (good_signed, good_delta, _) = OperationGenerator::update_reference_and_delta(
        &create_a.did_suffix,
        &create_a.update_key,
        vec![add_key("key2")],
    );
    // The second entry's signed data is not even a JWS; it parses at the
    // map-file level but dies at operation parse.
    let transaction = anchor_batch(
        &harness,
        vec![
            (create_a.did_suffix.clone(), good_signed, good_delta),
            (
                create_b.did_suffix.clone(),
                "garbage".to_owned(),
                serde_json::json!({}),
            ),
        ],
        3,
        3,
    )
    .await;

    let outcome = harness.ingester.ingest_transaction(&transaction).await.unwrap();
    assert_eq!(outcome.stored, 1);
    assert_eq!(outcome.dropped, 1);

    let state_a = harness
        .resolver
        .resolve(&create_a.did_suffix)
        .await
        .unwrap()
        .unwrap();
    assert!(state_a.document.public_key("key2").is_some());

    // The dropped operation never reached the store.
    let stored_b = harness.store.get(&create_b.did_suffix).await.unwrap();
    assert_eq!(stored_b.len(), 1);
    assert_eq!(stored_b[0].kind, OperationKind::Create);
}

#[tokio::test]
async fn missing_map_file_is_a_typed_rejection() {
    let harness = harness();
    let transaction = LedgerTransaction {
        anchor_string: "1.EiNobodyWroteThis".to_owned(),
        transaction_time: 1,
        transaction_number: 1,
    };
    let err = harness
        .ingester
        .ingest_transaction(&transaction)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CasFileNotFound");
}

#[tokio::test]
async fn declared_count_must_match_batch_contents() {
    let harness = harness();
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();
    let (signed_data, delta, _) =
        OperationGenerator::update_reference_and_delta(&did, &create.update_key, vec![add_key("k2")]);

    let mut transaction = anchor_batch(&harness, vec![(did, signed_data, delta)], 2, 2).await;
    let map_cid = transaction.anchor_string.split_once('.').unwrap().1.to_owned();
    transaction.anchor_string = format!("2.{map_cid}");

    let err = harness
        .ingester
        .ingest_transaction(&transaction)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IngestError::AnchorStringOperationCountMismatch { declared: 2, got: 1 }
    ));
}

#[tokio::test]
async fn chunk_delta_count_must_match_update_references() {
    let harness = harness();
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();
    let (signed_data, _delta, _) =
        OperationGenerator::update_reference_and_delta(&did, &create.update_key, vec![add_key("k2")]);

    // Chunk file holds no deltas while the map file references one update.
    let chunk_bytes = ChunkFile::build(vec![]).unwrap();
    let chunk_cid = harness.cas.write(&chunk_bytes).await.unwrap();
    let map_bytes = MapFile::build(
        chunk_cid.as_str(),
        vec![UpdateReference {
            did_suffix: did.clone(),
            signed_data,
        }],
    )
    .unwrap();
    let map_cid = harness.cas.write(&map_bytes).await.unwrap();

    let transaction = LedgerTransaction {
        anchor_string: format!("1.{map_cid}"),
        transaction_time: 2,
        transaction_number: 2,
    };
    let err = harness
        .ingester
        .ingest_transaction(&transaction)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ChunkFileDeltaCountMismatch");
}

#[tokio::test]
async fn oversized_batch_declaration_is_rejected() {
    let cas = Arc::new(MockCas::new());
    let store = Arc::new(MemoryOperationStore::new());
    let config = ProtocolConfig {
        max_operations_per_batch: 3,
        ..ProtocolConfig::default()
    };
    let ingester = BatchIngester::new(Arc::clone(&cas), Arc::clone(&store), config);

    let transaction = LedgerTransaction {
        anchor_string: "4.EiSomeMapFile".to_owned(),
        transaction_time: 1,
        transaction_number: 1,
    };
    let err = ingester.ingest_transaction(&transaction).await.unwrap_err();
    assert_eq!(err.code(), "AnchorStringOperationCountExceedsLimit");
}
