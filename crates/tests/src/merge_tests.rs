use serde_json::json;
use shiftboard_db::models::RosterSnapshot;
use shiftboard_services::roster::merge;

use crate::fixtures::seed::{cell, roster, sample_roster, seed_tenant};
use crate::fixtures::test_app::TestCore;

#[tokio::test]
async fn override_moves_employee_and_adds_team() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    let overrides = roster(
        &["1Jan", "2Jan", "3Jan"],
        &[
            ("Team B", "E1", "Alice", &["D", "N", "M2"]),
            ("Night Desk", "E9", "Ivan", &["N", "N", "N"]),
        ],
    );
    state.roster.set_override(tenant_id, overrides).await.unwrap();

    let display = state.roster.display(tenant_id).await.unwrap();
    assert_eq!(display.team_of("E1"), Some("Team B"));
    assert!(display.teams()["Team A"].iter().all(|e| e.id != "E1"));
    assert_eq!(display.team_of("E9"), Some("Night Desk"));
    assert_eq!(display.employee_count(), 4);
    assert_eq!(cell(state, tenant_id, "E1", "3Jan").await, "M2");
    // Untouched employees keep their imported cells
    assert_eq!(cell(state, tenant_id, "E2", "3Jan").await, "OFF");
}

#[tokio::test]
async fn stale_override_is_realigned_by_date() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    // Recorded against an older window: 31Dec no longer exists, 3Jan is unseen
    let overrides = roster(
        &["31Dec", "1Jan", "2Jan"],
        &[("Team A", "E2", "Bob", &["X", "SL", "CL"])],
    );
    state.roster.set_override(tenant_id, overrides).await.unwrap();

    let display = state.roster.display(tenant_id).await.unwrap();
    assert_eq!(display.headers(), ["1Jan", "2Jan", "3Jan"]);
    assert_eq!(cell(state, tenant_id, "E2", "1Jan").await, "SL");
    assert_eq!(cell(state, tenant_id, "E2", "2Jan").await, "CL");
    assert_eq!(cell(state, tenant_id, "E2", "3Jan").await, "OFF");
}

#[test]
fn merge_without_override_is_source() {
    let source = sample_roster();
    let merged = merge(&source, &RosterSnapshot::default()).unwrap();
    assert_eq!(merged, source);
}

#[test]
fn stale_team_membership_is_repaired_on_load() {
    let raw = json!({
        "headers": ["1Jan"],
        "teams": {
            "Team A": [{ "id": "E1", "name": "Alice", "schedule": ["D"], "currentTeam": "Team B" }],
            "Team B": [{ "id": "E1", "name": "Alice", "schedule": ["N"], "current_team": "Team B" }]
        }
    });
    let snapshot: RosterSnapshot = serde_json::from_value(raw).unwrap();

    assert_eq!(snapshot.employee_count(), 1);
    assert_eq!(snapshot.team_of("E1"), Some("Team B"));
    assert_eq!(snapshot.shift("E1", 0), Some("N"));
}

#[test]
fn schedule_length_mismatch_is_rejected() {
    let raw = json!({
        "headers": ["1Jan", "2Jan"],
        "teams": { "Team A": [{ "id": "E1", "name": "Alice", "schedule": ["D"] }] }
    });
    assert!(serde_json::from_value::<RosterSnapshot>(raw).is_err());
}

#[test]
fn duplicate_headers_are_rejected() {
    let raw = json!({ "headers": ["1Jan", "1Jan"], "teams": {} });
    assert!(serde_json::from_value::<RosterSnapshot>(raw).is_err());
}
