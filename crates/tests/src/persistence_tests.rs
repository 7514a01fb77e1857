use std::sync::Arc;

use shiftboard_db::models::{ModificationLedger, RosterSnapshot, tenant_document_key};
use shiftboard_db::{BlobStore, FsBlobStore};
use shiftboard_services::{DaoError, ManualClock};

use crate::fixtures::seed::{cell, roster, seed_tenant};
use crate::fixtures::test_app::{ACTOR, TestCore, epoch, state_over};

#[tokio::test]
async fn state_survives_restart() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .roster
        .update_cell(tenant_id, "E1", 2, "SL", ACTOR)
        .await
        .unwrap();
    state
        .requests
        .submit_change_request(tenant_id, "E3", "1Jan", "DO", "")
        .await
        .unwrap();

    let restarted = core.restart();
    assert_eq!(
        *restarted.roster.display(tenant_id).await.unwrap(),
        *state.roster.display(tenant_id).await.unwrap()
    );
    assert_eq!(restarted.roster.modifications(tenant_id).await.unwrap().len(), 1);
    assert_eq!(restarted.requests.counts(tenant_id).await.unwrap().pending, 1);
    assert_eq!(restarted.tenants.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn filesystem_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(epoch()));

    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()));
    let state = state_over(store, clock.clone());
    let tenant_id = seed_tenant(&state, "acme").await;
    state
        .roster
        .update_cell_by_date(tenant_id, "E2", "3Jan", "HL", ACTOR)
        .await
        .unwrap();
    drop(state);

    let reopened: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()));
    let state = state_over(reopened, clock);
    assert_eq!(cell(&state, tenant_id, "E2", "3Jan").await, "HL");
    assert_eq!(cell(&state, tenant_id, "E1", "1Jan").await, "D");
}

#[tokio::test]
async fn failed_write_leaves_cache_and_store_unchanged() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;
    let source_key = tenant_document_key(tenant_id, RosterSnapshot::SOURCE_DOCUMENT);
    let before = core.store.raw(&source_key);

    core.store.reject_writes_matching(Some("source_roster"));
    let err = state
        .roster
        .set_source(
            tenant_id,
            roster(&["5Jan"], &[("Team A", "E1", "Alice", &["HL"])]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Blob(_)));

    assert_eq!(cell(state, tenant_id, "E1", "1Jan").await, "D");
    assert_eq!(core.store.raw(&source_key), before);
}

#[tokio::test]
async fn partial_write_is_rolled_back() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;
    let override_key = tenant_document_key(tenant_id, RosterSnapshot::OVERRIDE_DOCUMENT);
    let ledger_key = tenant_document_key(tenant_id, ModificationLedger::DOCUMENT);

    // The override is written first, then the ledger write fails
    core.store.reject_writes_matching(Some("modifications"));
    let err = state
        .roster
        .update_cell(tenant_id, "E1", 0, "SL", ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Blob(_)));

    assert!(core.store.raw(&override_key).is_none());
    assert!(core.store.raw(&ledger_key).is_none());
    assert_eq!(cell(state, tenant_id, "E1", "1Jan").await, "D");

    // A fresh process sees the same thing
    let restarted = core.restart();
    assert_eq!(cell(&restarted, tenant_id, "E1", "1Jan").await, "D");
}

#[tokio::test]
async fn hard_reset_deletes_roster_blobs() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;
    state
        .roster
        .update_cell(tenant_id, "E1", 0, "SL", ACTOR)
        .await
        .unwrap();

    state.roster.hard_reset(tenant_id).await.unwrap();

    let keys = core.store.keys();
    assert!(keys.iter().all(|k| !k.contains("source_roster")));
    assert!(keys.iter().all(|k| !k.contains("override_roster")));
    assert!(keys.iter().all(|k| !k.contains("modifications")));
    assert!(keys.iter().any(|k| k == "tenants.json"));
}

#[tokio::test]
async fn evicted_tenant_reloads_from_store() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;
    state
        .roster
        .update_cell(tenant_id, "E3", 2, "EL", ACTOR)
        .await
        .unwrap();
    assert_eq!(state.cache.cached_tenants(), 1);

    state.cache.evict(tenant_id);
    assert_eq!(state.cache.cached_tenants(), 0);
    assert_eq!(cell(state, tenant_id, "E3", "3Jan").await, "EL");
}
