use shiftboard_services::DaoError;

use crate::fixtures::seed::{HEADERS, cell, roster, sample_roster, seed_tenant};
use crate::fixtures::test_app::{ACTOR, TestCore};

#[tokio::test]
async fn display_equals_source_without_overrides() {
    let core = TestCore::new();
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let display = core.state.roster.display(tenant_id).await.unwrap();
    assert_eq!(*display, sample_roster());
    assert_eq!(display.headers(), HEADERS);
    assert!(core.state.roster.overrides(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn cell_edit_writes_override_and_logs_modification() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    let modification = state
        .roster
        .update_cell(tenant_id, "E1", 2, "  M2 ", ACTOR)
        .await
        .unwrap()
        .expect("edit differs from source");

    assert_eq!(modification.employee_id, "E1");
    assert_eq!(modification.employee_name, "Alice");
    assert_eq!(modification.team_name, "Team A");
    assert_eq!(modification.date_header, "3Jan");
    assert_eq!(modification.old_shift, "");
    assert_eq!(modification.new_shift, "M2");
    assert_eq!(modification.modified_by, ACTOR);
    assert_eq!(modification.month_year, "2025-01");

    assert_eq!(cell(state, tenant_id, "E1", "3Jan").await, "M2");
    let source = state.roster.source(tenant_id).await.unwrap();
    assert_eq!(source.shift("E1", 2), Some(""));
    assert_eq!(state.roster.modifications(tenant_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn old_shift_is_previous_override_value() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .roster
        .update_cell_by_date(tenant_id, "E2", "2Jan", "SL", ACTOR)
        .await
        .unwrap();
    let second = state
        .roster
        .update_cell_by_date(tenant_id, "E2", "2Jan", "CL", ACTOR)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(second.old_shift, "SL");
    assert_eq!(second.new_shift, "CL");
}

#[tokio::test]
async fn edits_matching_source_or_clearing_are_not_logged() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    let same = state
        .roster
        .update_cell(tenant_id, "E1", 0, "D", ACTOR)
        .await
        .unwrap();
    assert!(same.is_none());

    let cleared = state
        .roster
        .update_cell(tenant_id, "E3", 1, "", ACTOR)
        .await
        .unwrap();
    assert!(cleared.is_none());

    // The clear still lands in the display
    assert_eq!(cell(state, tenant_id, "E3", "2Jan").await, "");
    assert!(state.roster.modifications(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_date_or_employee_is_not_found() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    let err = state
        .roster
        .update_cell(tenant_id, "E1", 3, "D", ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::NotFound(_)));

    let err = state
        .roster
        .update_cell_by_date(tenant_id, "E1", "9Jan", "D", ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::NotFound(_)));

    let err = state
        .roster
        .update_cell(tenant_id, "NOPE", 0, "D", ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::NotFound(_)));
}

#[tokio::test]
async fn monthly_stats_aggregate_by_month_and_user() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .roster
        .update_cell(tenant_id, "E1", 0, "SL", ACTOR)
        .await
        .unwrap();
    state
        .roster
        .update_cell(tenant_id, "E1", 1, "SL", ACTOR)
        .await
        .unwrap();
    state
        .roster
        .update_cell(tenant_id, "E3", 2, "DO", "other@test")
        .await
        .unwrap();

    let stats = state
        .roster
        .monthly_stats(tenant_id, "2025-01")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.total_modifications, 3);
    assert_eq!(stats.employees_modified, vec!["E1", "E3"]);
    assert_eq!(stats.modifications_by_user.get(ACTOR), Some(&2));
    assert_eq!(stats.modifications_by_user.get("other@test"), Some(&1));

    let alice_in_jan = state
        .roster
        .modifications_matching(tenant_id, Some("2025-01"), Some("E1"))
        .await
        .unwrap();
    assert_eq!(alice_in_jan.len(), 2);
    let carol = state
        .roster
        .modifications_matching(tenant_id, None, Some("E3"))
        .await
        .unwrap();
    assert_eq!(carol.len(), 1);
    assert_eq!(carol[0].modified_by, "other@test");
    assert!(
        state
            .roster
            .modifications_matching(tenant_id, Some("2025-02"), None)
            .await
            .unwrap()
            .is_empty()
    );

    assert!(
        state
            .roster
            .monthly_stats(tenant_id, "2025-02")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn reset_to_source_drops_edits_but_keeps_ledger() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .roster
        .update_cell(tenant_id, "E2", 2, "EL", ACTOR)
        .await
        .unwrap();
    state.roster.reset_to_source(tenant_id).await.unwrap();

    assert_eq!(cell(state, tenant_id, "E2", "3Jan").await, "OFF");
    assert!(state.roster.overrides(tenant_id).await.unwrap().is_empty());
    assert_eq!(state.roster.modifications(tenant_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn hard_reset_clears_roster_data_but_not_vocabulary() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .shifts
        .upsert(tenant_id, "EV", "Evening")
        .await
        .unwrap();
    state
        .roster
        .update_cell(tenant_id, "E2", 2, "EL", ACTOR)
        .await
        .unwrap();
    state
        .requests
        .submit_change_request(tenant_id, "E1", "1Jan", "SL", "flu")
        .await
        .unwrap();

    state.roster.hard_reset(tenant_id).await.unwrap();

    let display = state.roster.display(tenant_id).await.unwrap();
    assert!(display.is_empty());
    assert!(state.roster.modifications(tenant_id).await.unwrap().is_empty());
    assert!(state.requests.list_all(tenant_id).await.unwrap().is_empty());
    assert_eq!(state.shifts.lookup(tenant_id, "ev").await.unwrap(), "Evening");
}

#[tokio::test]
async fn reimport_rekeys_edits_onto_new_dates() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state
        .roster
        .update_cell_by_date(tenant_id, "E2", "2Jan", "SL", ACTOR)
        .await
        .unwrap();

    let next_window = roster(
        &["2Jan", "3Jan", "4Jan"],
        &[
            ("Team A", "E1", "Alice", &["N", "", "D"]),
            ("Team A", "E2", "Bob", &["D", "OFF", "M3"]),
            ("Team B", "E3", "Carol", &["D", "D", "N"]),
        ],
    );
    state.roster.set_source(tenant_id, next_window).await.unwrap();

    let display = state.roster.display(tenant_id).await.unwrap();
    assert_eq!(display.headers(), ["2Jan", "3Jan", "4Jan"]);
    assert_eq!(cell(state, tenant_id, "E2", "2Jan").await, "SL");
    assert_eq!(cell(state, tenant_id, "E2", "3Jan").await, "OFF");
    // A date the override never saw comes from the new import
    assert_eq!(cell(state, tenant_id, "E2", "4Jan").await, "M3");
    assert_eq!(cell(state, tenant_id, "E3", "4Jan").await, "N");
}

#[tokio::test]
async fn tenants_do_not_share_rosters() {
    let core = TestCore::new();
    let state = &core.state;
    let acme = seed_tenant(state, "acme").await;
    let beta = seed_tenant(state, "beta").await;

    state
        .roster
        .update_cell(acme, "E1", 0, "HL", ACTOR)
        .await
        .unwrap();

    assert_eq!(cell(state, acme, "E1", "1Jan").await, "HL");
    assert_eq!(cell(state, beta, "E1", "1Jan").await, "D");
    assert!(state.roster.modifications(beta).await.unwrap().is_empty());
}

