use std::collections::BTreeMap;

use serde_json::{Value, json};
use shiftboard_api::state::AppState;
use shiftboard_db::models::{Employee, RosterSnapshot};
use uuid::Uuid;

use super::test_app::TestApp;

pub const HEADERS: [&str; 3] = ["1Jan", "2Jan", "3Jan"];

/// Three days, two teams:
///
/// | team   | id | name  | 1Jan | 2Jan | 3Jan |
/// |--------|----|-------|------|------|------|
/// | Team A | E1 | Alice | D    | N    |      |
/// | Team A | E2 | Bob   | N    | D    | OFF  |
/// | Team B | E3 | Carol | D    | D    | D    |
pub fn sample_roster() -> RosterSnapshot {
    roster(
        &HEADERS,
        &[
            ("Team A", "E1", "Alice", &["D", "N", ""]),
            ("Team A", "E2", "Bob", &["N", "D", "OFF"]),
            ("Team B", "E3", "Carol", &["D", "D", "D"]),
        ],
    )
}

/// Builds a snapshot from `(team, id, name, cells)` rows.
pub fn roster(headers: &[&str], rows: &[(&str, &str, &str, &[&str])]) -> RosterSnapshot {
    let mut teams: BTreeMap<String, Vec<Employee>> = BTreeMap::new();
    for (team, id, name, cells) in rows {
        let schedule = cells.iter().map(|c| c.to_string()).collect();
        teams
            .entry(team.to_string())
            .or_default()
            .push(Employee::new(*id, *name, schedule));
    }
    RosterSnapshot::new(headers.iter().map(|h| h.to_string()).collect(), teams)
        .expect("sample roster is valid")
}

/// Creates a tenant with the sample roster imported as its source.
pub async fn seed_tenant(state: &AppState, slug: &str) -> Uuid {
    let tenant = state
        .tenants
        .create(format!("{slug} Corp"), slug.to_string(), None)
        .await
        .expect("create tenant");
    state
        .roster
        .set_source(tenant.id, sample_roster())
        .await
        .expect("import source roster");
    tenant.id
}

/// Displayed cell of `employee_id` at `date`.
pub async fn cell(state: &AppState, tenant_id: Uuid, employee_id: &str, date: &str) -> String {
    let display = state.roster.display(tenant_id).await.expect("display");
    let index = display.header_position(date).expect("known date");
    display
        .shift(employee_id, index)
        .unwrap_or_default()
        .to_string()
}

impl TestApp {
    /// Creates a tenant over HTTP and imports the sample roster. Returns its id.
    pub async fn seed_tenant(&self, slug: &str) -> String {
        let resp = self
            .post("/api/tenant")
            .json(&json!({ "name": format!("{slug} Corp"), "slug": slug }))
            .send()
            .await
            .expect("Create tenant request failed");
        assert_eq!(
            resp.status().as_u16(),
            200,
            "Create tenant failed: {}",
            resp.text().await.unwrap_or_default()
        );
        let tenant: Value = resp.json().await.unwrap();
        let tenant_id = tenant["id"].as_str().unwrap().to_string();

        let resp = self
            .put(&format!("/api/tenant/{tenant_id}/roster/source"))
            .json(&sample_roster())
            .send()
            .await
            .expect("Import roster request failed");
        assert_eq!(
            resp.status().as_u16(),
            204,
            "Import roster failed: {}",
            resp.text().await.unwrap_or_default()
        );

        tenant_id
    }
}
