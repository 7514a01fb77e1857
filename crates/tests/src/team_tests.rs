use shiftboard_db::models::{INACTIVE_TEAM, UNASSIGNED_TEAM};
use shiftboard_services::DaoError;

use crate::fixtures::seed::{cell, seed_tenant};
use crate::fixtures::test_app::{ACTOR, TestCore};

#[tokio::test]
async fn added_team_is_empty_and_idempotent() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state.roster.add_team(tenant_id, " Night Crew ").await.unwrap();
    state.roster.add_team(tenant_id, "Night Crew").await.unwrap();

    let display = state.roster.display(tenant_id).await.unwrap();
    assert!(display.teams()["Night Crew"].is_empty());
    assert_eq!(display.employee_count(), 3);

    let err = state.roster.add_team(tenant_id, INACTIVE_TEAM).await.unwrap_err();
    assert!(matches!(err, DaoError::Validation(_)));

    // Employees can be moved into the new team
    state
        .roster
        .update_employee(tenant_id, "E3", None, Some("Night Crew"))
        .await
        .unwrap();
    let display = state.roster.display(tenant_id).await.unwrap();
    assert_eq!(display.team_of("E3"), Some("Night Crew"));
}

#[tokio::test]
async fn rename_moves_members_and_their_edits() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;
    state
        .roster
        .update_cell_by_date(tenant_id, "E1", "3Jan", "SL", ACTOR)
        .await
        .unwrap();

    state
        .roster
        .rename_team(tenant_id, "Team A", "Front Desk")
        .await
        .unwrap();

    let display = state.roster.display(tenant_id).await.unwrap();
    assert!(!display.teams().contains_key("Team A"));
    assert_eq!(display.team_of("E1"), Some("Front Desk"));
    assert_eq!(display.team_of("E2"), Some("Front Desk"));
    assert_eq!(
        display.employee("E1").unwrap().current_team.as_deref(),
        Some("Front Desk")
    );
    assert_eq!(cell(state, tenant_id, "E1", "3Jan").await, "SL");
    assert_eq!(cell(state, tenant_id, "E2", "3Jan").await, "OFF");

    // The imported roster itself is untouched
    let source = state.roster.source(tenant_id).await.unwrap();
    assert_eq!(source.team_of("E1"), Some("Team A"));

    let err = state
        .roster
        .rename_team(tenant_id, "Front Desk", "Team B")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::InvalidState(_)));

    let err = state
        .roster
        .rename_team(tenant_id, "Team A", "Back Office")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::NotFound(_)));
}

#[tokio::test]
async fn deleted_team_members_become_unassigned() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    let moved = state.roster.delete_team(tenant_id, "Team A").await.unwrap();
    assert_eq!(moved, 2);

    let display = state.roster.display(tenant_id).await.unwrap();
    assert!(!display.teams().contains_key("Team A"));
    assert_eq!(display.team_of("E1"), Some(UNASSIGNED_TEAM));
    assert_eq!(display.team_of("E2"), Some(UNASSIGNED_TEAM));
    assert_eq!(display.employee_count(), 3);

    let err = state
        .roster
        .delete_team(tenant_id, UNASSIGNED_TEAM)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::InvalidState(_)));

    let err = state
        .roster
        .delete_team(tenant_id, INACTIVE_TEAM)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Validation(_)));

    // Re-creating the name brings back an empty team
    state.roster.add_team(tenant_id, "Team A").await.unwrap();
    let display = state.roster.display(tenant_id).await.unwrap();
    assert!(display.teams()["Team A"].is_empty());
}

#[tokio::test]
async fn team_changes_persist_and_undo_on_reset() {
    let core = TestCore::new();
    let state = &core.state;
    let tenant_id = seed_tenant(state, "acme").await;

    state.roster.delete_team(tenant_id, "Team B").await.unwrap();
    let restarted = core.restart();
    let display = restarted.roster.display(tenant_id).await.unwrap();
    assert!(!display.teams().contains_key("Team B"));
    assert_eq!(display.team_of("E3"), Some(UNASSIGNED_TEAM));

    restarted.roster.reset_to_source(tenant_id).await.unwrap();
    let display = restarted.roster.display(tenant_id).await.unwrap();
    assert_eq!(display.team_of("E3"), Some("Team B"));
    assert!(!display.teams().contains_key(UNASSIGNED_TEAM));
}
