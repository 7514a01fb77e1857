use shiftboard_services::DaoError;

use crate::fixtures::seed::seed_tenant;
use crate::fixtures::test_app::TestCore;

#[tokio::test]
async fn links_are_kept_per_month() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;
    let links = &state.source_links;

    assert!(links.list(tenant_id).await.unwrap().is_empty());

    let month = links
        .set(tenant_id, "2025-01", "https://sheets.example/jan")
        .await
        .unwrap();
    assert_eq!(month, "2025-01");
    links
        .set(tenant_id, "2025-02", "https://sheets.example/feb")
        .await
        .unwrap();
    links
        .set(tenant_id, "2025-01", "https://sheets.example/jan-v2")
        .await
        .unwrap();

    let all = links.list(tenant_id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["2025-01"], "https://sheets.example/jan-v2");

    assert!(links.delete(tenant_id, "2025-02").await.unwrap());
    assert!(!links.delete(tenant_id, "2025-02").await.unwrap());

    let err = links
        .set(tenant_id, "January", "https://sheets.example/x")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Validation(_)));
}

#[tokio::test]
async fn links_survive_hard_reset_and_restart() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .source_links
        .set(tenant_id, "2025-01", "https://sheets.example/jan")
        .await
        .unwrap();
    state.roster.hard_reset(tenant_id).await.unwrap();

    let restarted = core.restart();
    let all = restarted.source_links.list(tenant_id).await.unwrap();
    assert_eq!(all["2025-01"], "https://sheets.example/jan");

    // An emptied map leaves nothing behind in storage
    restarted.source_links.delete(tenant_id, "2025-01").await.unwrap();
    assert!(core.store.keys().iter().all(|k| !k.contains("source_links")));
}
