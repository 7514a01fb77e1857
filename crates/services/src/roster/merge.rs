use shiftboard_db::ValidationError;
use shiftboard_db::models::{INACTIVE_TEAM, RosterSnapshot};

/// Header sequence of the merged view: the source's, or the override's when
/// nothing has been imported yet.
pub fn base_headers<'a>(source: &'a RosterSnapshot, overrides: &'a RosterSnapshot) -> &'a [String] {
    if source.headers().is_empty() {
        overrides.headers()
    } else {
        source.headers()
    }
}

/// Builds the display snapshot: the source with every override employee laid
/// on top.
///
/// An override record replaces the source record of the same id and moves it
/// to the override's team. Teams that only exist in the override are created
/// (even when empty). When the override was recorded against a different
/// header sequence its cells are re-keyed by date label, with dates it never
/// saw taken from the source.
///
/// Inactive employees always end up in [`INACTIVE_TEAM`], whichever snapshot
/// placed them elsewhere. Teams retired in the override are dropped once
/// nobody is left in them.
pub fn merge(
    source: &RosterSnapshot,
    overrides: &RosterSnapshot,
) -> Result<RosterSnapshot, ValidationError> {
    let base = base_headers(source, overrides);

    let mut merged = if source.headers() == base {
        source.clone()
    } else {
        source.realigned(base, |_, _| String::new())?
    };

    let same_headers = overrides.headers() == base;
    for (team, members) in overrides.teams() {
        merged.ensure_team(team);
        for emp in members {
            let record = if same_headers {
                emp.clone()
            } else {
                emp.realigned(overrides.headers(), base, |header| {
                    source_cell(source, &emp.id, header)
                })
            };
            merged.upsert_employee(team, record)?;
        }
    }

    let stray: Vec<String> = merged
        .teams()
        .iter()
        .filter(|(team, _)| team.as_str() != INACTIVE_TEAM)
        .flat_map(|(_, members)| members.iter().filter(|e| e.is_inactive()))
        .map(|e| e.id.clone())
        .collect();
    for id in stray {
        if let Some((_, record)) = merged.remove_employee(&id) {
            merged.upsert_employee(INACTIVE_TEAM, record)?;
        }
    }

    for team in overrides.retired_teams() {
        if merged.teams().get(team).is_some_and(Vec::is_empty) {
            merged.remove_team(team);
        }
    }

    Ok(merged)
}

/// Source value for `employee_id` under the date label `header`, or empty.
pub(crate) fn source_cell(source: &RosterSnapshot, employee_id: &str, header: &str) -> String {
    source
        .header_position(header)
        .and_then(|i| source.shift(employee_id, i))
        .unwrap_or_default()
        .to_string()
}
