// Path: crates/core/tests/resolution.rs

//! End-to-end resolution scenarios over a real store, with real keys and
//! signatures throughout.

use std::sync::Arc;
use trellis_api::store::OperationStore;
use trellis_core::{DefaultOperationProcessor, EpochVersionManager, Resolver};
use trellis_storage::MemoryOperationStore;
use trellis_test_utils::OperationGenerator;
use trellis_types::did::DidSuffix;
use trellis_types::document::Patch;
use trellis_types::operation::{AnchoredOperation, OperationKind};
use trellis_types::state::DidState;

fn resolver(store: Arc<MemoryOperationStore>) -> Resolver<Arc<MemoryOperationStore>> {
    let processor = Arc::new(DefaultOperationProcessor::default());
    Resolver::new(store, Arc::new(EpochVersionManager::single(processor)))
}

async fn resolve(
    store: &Arc<MemoryOperationStore>,
    did_suffix: &DidSuffix,
) -> Option<DidState> {
    resolver(Arc::clone(store))
        .resolve(did_suffix)
        .await
        .unwrap()
}

fn add_key(id: &str) -> Patch {
    Patch::AddPublicKeys {
        public_keys: vec![OperationGenerator::public_key_entry(id)],
    }
}

fn add_service(id: &str) -> Patch {
    Patch::AddServiceEndpoints {
        service_endpoints: vec![OperationGenerator::service_endpoint_entry(id)],
    }
}

// S1: a lone create operation with one key and one service endpoint.
#[tokio::test]
async fn create_only_yields_initial_document() {
    let store = Arc::new(MemoryOperationStore::new());
    let create =
        OperationGenerator::create_operation(vec![add_key("signingKey"), add_service("dummyHubUri1")]);
    store
        .put(vec![OperationGenerator::anchored(
            OperationKind::Create,
            &create.did_suffix,
            create.operation_bytes.clone(),
            1,
            1,
            1,
        )])
        .await
        .unwrap();

    let state = resolve(&store, &create.did_suffix).await.unwrap();
    assert_eq!(state.document.public_keys.len(), 1);
    assert_eq!(state.document.public_keys[0].id, "signingKey");
    assert_eq!(state.document.service_endpoints.len(), 1);
    assert_eq!(state.document.service_endpoints[0].id, "dummyHubUri1");
    assert!(!state.is_deactivated);
    assert_eq!(
        state.next_recovery_commitment.as_deref(),
        Some(create.recovery_key.commitment.as_str())
    );
    assert_eq!(
        state.next_update_commitment.as_deref(),
        Some(create.update_key.commitment.as_str())
    );
    assert_eq!(state.last_operation_transaction_number, 1);
}

// S2: create, two updates, a recover, two more updates.
#[tokio::test]
async fn full_lifecycle_across_a_recover() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1"), add_service("svc1")]);
    let did = create.did_suffix.clone();

    let update1 = OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("key2")]);
    let update2 = OperationGenerator::update_operation(
        &did,
        &update1.next_update_key,
        vec![add_service("svc2")],
    );

    store
        .put(vec![
            OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, update1.operation_bytes.clone(), 2, 2, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, update2.operation_bytes.clone(), 3, 3, 0),
        ])
        .await
        .unwrap();

    let before_recover = resolve(&store, &did).await.unwrap();
    assert_eq!(before_recover.document.public_keys.len(), 2);
    assert_eq!(before_recover.document.service_endpoints.len(), 2);

    let recover = OperationGenerator::recover_operation(
        &did,
        &create.recovery_key,
        vec![
            add_key("newKey1"),
            add_key("newKey2"),
            add_service("newDummyHubUri1"),
        ],
    );
    let update3 = OperationGenerator::update_operation(
        &did,
        &recover.next_update_key,
        vec![add_service("newDummyHubUri2")],
    );
    let update4 = OperationGenerator::update_operation(
        &did,
        &update3.next_update_key,
        vec![Patch::RemoveServiceEndpoints {
            ids: vec!["newDummyHubUri1".into()],
        }],
    );

    store
        .put(vec![
            OperationGenerator::anchored(OperationKind::Recover, &did, recover.operation_bytes.clone(), 4, 4, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, update3.operation_bytes.clone(), 5, 5, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, update4.operation_bytes.clone(), 6, 6, 0),
        ])
        .await
        .unwrap();

    let state = resolve(&store, &did).await.unwrap();
    assert_eq!(state.document.public_keys.len(), 2);
    assert!(state.document.public_key("newKey1").is_some());
    assert!(state.document.public_key("newKey2").is_some());
    assert_eq!(state.document.service_endpoints.len(), 1);
    assert_eq!(state.document.service_endpoints[0].id, "newDummyHubUri2");
    assert_eq!(state.last_operation_transaction_number, 6);
    // Pre-recover update keys are gone; the chain now hangs off update4.
    assert_eq!(
        state.next_update_commitment.as_deref(),
        Some(update4.next_update_key.commitment.as_str())
    );
}

// S3: three recovers with the same reveal, inserted out of order. The
// earliest anchor key wins and the rest are skipped.
#[tokio::test]
async fn same_reveal_recovers_resolve_to_earliest() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();

    let recover_at_4 =
        OperationGenerator::recover_operation(&did, &create.recovery_key, vec![add_key("a")]);
    let recover_at_2 =
        OperationGenerator::recover_operation(&did, &create.recovery_key, vec![add_key("b")]);
    let recover_at_3 =
        OperationGenerator::recover_operation(&did, &create.recovery_key, vec![add_key("c")]);

    store
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
    // Adversarial insertion order: 4, 2, 3.
    for (time, parts) in [(4, &recover_at_4), (2, &recover_at_2), (3, &recover_at_3)] {
        store
            .put(vec![OperationGenerator::anchored(
                OperationKind::Recover,
                &did,
                parts.operation_bytes.clone(),
                time,
                time,
                0,
            )])
            .await
            .unwrap();
    }

    let state = resolve(&store, &did).await.unwrap();
    assert_eq!(state.last_operation_transaction_number, 2);
    assert_eq!(
        state.next_recovery_commitment.as_deref(),
        Some(recover_at_2.next_recovery_key.commitment.as_str())
    );
    assert!(state.document.public_key("b").is_some());
    assert!(state.document.public_key("a").is_none());
    assert!(state.document.public_key("c").is_none());
}

// S4: three updates with the same reveal, inserted out of order.
#[tokio::test]
async fn same_reveal_updates_resolve_to_earliest() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();

    let update_at_4 =
        OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("a")]);
    let update_at_2 =
        OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("b")]);
    let update_at_3 =
        OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("c")]);

    store
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
    for (time, parts) in [(4, &update_at_4), (2, &update_at_2), (3, &update_at_3)] {
        store
            .put(vec![OperationGenerator::anchored(
                OperationKind::Update,
                &did,
                parts.operation_bytes.clone(),
                time,
                time,
                0,
            )])
            .await
            .unwrap();
    }

    let state = resolve(&store, &did).await.unwrap();
    assert_eq!(state.last_operation_transaction_number, 2);
    assert_eq!(
        state.next_update_commitment.as_deref(),
        Some(update_at_2.next_update_key.commitment.as_str())
    );
    assert!(state.document.public_key("b").is_some());
    assert!(state.document.public_key("a").is_none());
    assert!(state.document.public_key("c").is_none());
}

// S5: a DID whose only create blows up inside the processor resolves to
// None instead of surfacing an error.
#[tokio::test]
async fn internal_processor_errors_resolve_to_none() {
    let store = Arc::new(MemoryOperationStore::new());
    let did = DidSuffix::from("EiNotARealSuffix");
    store
        .put(vec![
            AnchoredOperation {
                kind: OperationKind::Create,
                did_suffix: did.clone(),
                operation_bytes: b"\xff\xfe not json".to_vec(),
                transaction_time: 1,
                transaction_number: 1,
                operation_index: 0,
            },
            AnchoredOperation {
                kind: OperationKind::Update,
                did_suffix: did.clone(),
                operation_bytes: br#"{"type":"update"}"#.to_vec(),
                transaction_time: 2,
                transaction_number: 2,
                operation_index: 0,
            },
        ])
        .await
        .unwrap();

    assert!(resolve(&store, &did).await.is_none());
}

// Invariant 1: resolution is independent of insertion order.
#[tokio::test]
async fn resolution_is_deterministic_under_permutation() {
    let create = OperationGenerator::create_operation(vec![add_key("key1"), add_service("svc1")]);
    let did = create.did_suffix.clone();
    let update1 = OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("key2")]);
    let recover = OperationGenerator::recover_operation(&did, &create.recovery_key, vec![add_key("rk")]);
    let update2 = OperationGenerator::update_operation(
        &did,
        &recover.next_update_key,
        vec![add_service("svc2")],
    );

    let history = vec![
        OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
        OperationGenerator::anchored(OperationKind::Update, &did, update1.operation_bytes.clone(), 2, 2, 0),
        OperationGenerator::anchored(OperationKind::Recover, &did, recover.operation_bytes.clone(), 3, 3, 0),
        OperationGenerator::anchored(OperationKind::Update, &did, update2.operation_bytes.clone(), 4, 4, 0),
    ];

    let mut reference: Option<DidState> = None;
    let permutations: [[usize; 4]; 6] = [
        [0, 1, 2, 3],
        [3, 2, 1, 0],
        [2, 0, 3, 1],
        [1, 3, 0, 2],
        [3, 0, 1, 2],
        [2, 3, 1, 0],
    ];
    for order in permutations {
        let store = Arc::new(MemoryOperationStore::new());
        for index in order {
            store.put(vec![history[index].clone()]).await.unwrap();
        }
        let state = resolve(&store, &did).await.unwrap();
        match &reference {
            None => reference = Some(state),
            Some(expected) => assert_eq!(&state, expected, "order {order:?} diverged"),
        }
    }

    let final_state = reference.unwrap();
    assert!(final_state.document.public_key("rk").is_some());
    assert!(final_state.document.service_endpoint("svc2").is_some());
    assert_eq!(final_state.last_operation_transaction_number, 4);
}

// Invariant 2: nothing applies without revealing the right preimage.
#[tokio::test]
async fn operations_without_the_committed_preimage_are_skipped() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();

    // Signed correctly, but revealing a key nobody committed to.
    let stranger = OperationGenerator::generate_key();
    let forged_update = OperationGenerator::update_operation(&did, &stranger, vec![add_key("evil")]);
    let forged_recover =
        OperationGenerator::recover_operation(&did, &stranger, vec![add_key("worse")]);

    store
        .put(vec![
            OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, forged_update.operation_bytes.clone(), 2, 2, 0),
            OperationGenerator::anchored(OperationKind::Recover, &did, forged_recover.operation_bytes.clone(), 3, 3, 0),
        ])
        .await
        .unwrap();

    let state = resolve(&store, &did).await.unwrap();
    assert_eq!(state.last_operation_transaction_number, 1);
    assert!(state.document.public_key("evil").is_none());
    assert!(state.document.public_key("worse").is_none());
    assert_eq!(
        state.next_update_commitment.as_deref(),
        Some(create.update_key.commitment.as_str())
    );
}

// Invariant 3: the anchored transaction number never regresses as the
// history grows.
#[tokio::test]
async fn last_transaction_number_is_monotone() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();
    let update1 = OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("k2")]);
    let update2 =
        OperationGenerator::update_operation(&did, &update1.next_update_key, vec![add_key("k3")]);

    let steps = vec![
        OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
        OperationGenerator::anchored(OperationKind::Update, &did, update1.operation_bytes.clone(), 2, 2, 0),
        OperationGenerator::anchored(OperationKind::Update, &did, update2.operation_bytes.clone(), 3, 3, 0),
    ];

    let mut last = 0;
    for step in steps {
        store.put(vec![step]).await.unwrap();
        let state = resolve(&store, &did).await.unwrap();
        assert!(state.last_operation_transaction_number >= last);
        last = state.last_operation_transaction_number;
    }
    assert_eq!(last, 3);
}

// Invariant 4: deactivation is absorbing.
#[tokio::test]
async fn nothing_applies_after_deactivation() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();
    let deactivate = OperationGenerator::deactivate_operation(&did, &create.recovery_key);
    // Anchored later but revealing the same recovery key: would be valid
    // if the deactivate had not landed first.
    let late_recover =
        OperationGenerator::recover_operation(&did, &create.recovery_key, vec![add_key("back")]);
    let late_update =
        OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("sneak")]);

    store
        .put(vec![
            OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
            OperationGenerator::anchored(OperationKind::Deactivate, &did, deactivate.clone(), 2, 2, 0),
            OperationGenerator::anchored(OperationKind::Recover, &did, late_recover.operation_bytes.clone(), 3, 3, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, late_update.operation_bytes.clone(), 4, 4, 0),
        ])
        .await
        .unwrap();

    let state = resolve(&store, &did).await.unwrap();
    assert!(state.is_deactivated);
    assert!(state.document.public_keys.is_empty());
    assert!(state.next_recovery_commitment.is_none());
    assert!(state.next_update_commitment.is_none());
    assert_eq!(state.last_operation_transaction_number, 2);
}

// A second create can never displace the first, even when it is valid in
// isolation: resolution keys off the suffix, and only the matching
// suffix-data hash applies.
#[tokio::test]
async fn first_valid_create_wins() {
    let store = Arc::new(MemoryOperationStore::new());
    let genuine = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = genuine.did_suffix.clone();
    // A different create anchored earlier under the same suffix: its
    // suffix data hashes elsewhere, so it can never match this DID.
    let impostor = OperationGenerator::create_operation(vec![add_key("fake")]);

    store
        .put(vec![
            OperationGenerator::anchored(
                OperationKind::Create,
                &did,
                impostor.operation_bytes.clone(),
                1,
                1,
                0,
            ),
            OperationGenerator::anchored(
                OperationKind::Create,
                &did,
                genuine.operation_bytes.clone(),
                2,
                2,
                0,
            ),
        ])
        .await
        .unwrap();

    let state = resolve(&store, &did).await.unwrap();
    assert!(state.document.public_key("key1").is_some());
    assert!(state.document.public_key("fake").is_none());
    assert_eq!(state.last_operation_transaction_number, 2);
}

// An update whose delta fails to compose still advances the commitment,
// so the chain cannot be deadlocked by a malformed patch.
#[tokio::test]
async fn failed_patch_composition_still_advances_the_update_commitment() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation(vec![add_key("key1")]);
    let did = create.did_suffix.clone();
    // Adding a key that already exists aborts the delta.
    let clashing = OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("key1")]);
    let follow_up = OperationGenerator::update_operation(
        &did,
        &clashing.next_update_key,
        vec![add_key("key2")],
    );

    store
        .put(vec![
            OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, clashing.operation_bytes.clone(), 2, 2, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, follow_up.operation_bytes.clone(), 3, 3, 0),
        ])
        .await
        .unwrap();

    let state = resolve(&store, &did).await.unwrap();
    // The clashing delta did not touch the document...
    assert_eq!(state.document.public_keys.len(), 2);
    assert!(state.document.public_key("key2").is_some());
    // ...but its commitment advanced, which is what let follow_up apply.
    assert_eq!(state.last_operation_transaction_number, 3);
    assert_eq!(
        state.next_update_commitment.as_deref(),
        Some(follow_up.next_update_key.commitment.as_str())
    );
}

// EdDSA commitment chains work end to end alongside ES256K ones.
#[tokio::test]
async fn eddsa_signed_chain_resolves() {
    let store = Arc::new(MemoryOperationStore::new());
    let create = OperationGenerator::create_operation_with_keys(
        vec![add_key("key1")],
        OperationGenerator::generate_ed25519_key(),
        OperationGenerator::generate_ed25519_key(),
    );
    let did = create.did_suffix.clone();
    // Reveals the Ed25519 update key and verifies its EdDSA signature.
    let update = OperationGenerator::update_operation(&did, &create.update_key, vec![add_key("key2")]);
    // Terminates the chain by revealing the Ed25519 recovery key.
    let deactivate = OperationGenerator::deactivate_operation(&did, &create.recovery_key);

    store
        .put(vec![
            OperationGenerator::anchored(OperationKind::Create, &did, create.operation_bytes.clone(), 1, 1, 0),
            OperationGenerator::anchored(OperationKind::Update, &did, update.operation_bytes.clone(), 2, 2, 0),
            OperationGenerator::anchored(OperationKind::Deactivate, &did, deactivate, 3, 3, 0),
        ])
        .await
        .unwrap();

    let state = resolve(&store, &did).await.unwrap();
    assert!(state.is_deactivated);
    assert_eq!(state.last_operation_transaction_number, 3);
}
