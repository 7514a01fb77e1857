use chrono::{DateTime, Utc};
use shiftboard_db::models::{Modification, month_bucket};

use super::merge::{base_headers, source_cell};
use crate::cache::TenantDocs;
use crate::dao::base::{DaoError, DaoResult};

/// One manual cell write against the merged header sequence.
#[derive(Debug, Clone, Copy)]
pub struct CellEdit<'a> {
    pub employee_id: &'a str,
    pub date_index: usize,
    pub new_shift: &'a str,
    pub actor: &'a str,
    pub now: DateTime<Utc>,
}

/// Position of `date` in the merged header sequence.
pub fn date_position(docs: &TenantDocs, date: &str) -> DaoResult<usize> {
    base_headers(&docs.source, &docs.overrides)
        .iter()
        .position(|h| h == date)
        .ok_or_else(|| DaoError::NotFound(format!("date '{date}'")))
}

/// Puts the override on the merged header sequence and copies the source
/// record of `employee_id` into it when the override does not hold one yet.
pub fn ensure_in_override(docs: &mut TenantDocs, employee_id: &str) -> DaoResult<()> {
    let base = base_headers(&docs.source, &docs.overrides).to_vec();
    if docs.overrides.headers() != base.as_slice() {
        let source = &docs.source;
        docs.overrides = docs
            .overrides
            .realigned(&base, |id, header| source_cell(source, id, header))?;
    }

    if docs.overrides.contains(employee_id) {
        return Ok(());
    }

    let (team, record) = match (
        docs.source.team_of(employee_id),
        docs.source.employee(employee_id),
    ) {
        (Some(team), Some(emp)) => (team.to_string(), emp.clone()),
        _ => return Err(DaoError::NotFound(format!("employee '{employee_id}'"))),
    };
    let record = if docs.source.headers() == base.as_slice() {
        record
    } else {
        record.realigned(docs.source.headers(), &base, |_| String::new())
    };
    docs.overrides.upsert_employee(&team, record)?;
    Ok(())
}

/// Writes one override cell and appends a ledger entry when the new value is
/// non-empty and differs from the imported baseline.
///
/// Shared by the roster DAO and request approval so that a swap's two edits
/// land on the same working copy.
pub fn apply_cell_edit(docs: &mut TenantDocs, edit: CellEdit<'_>) -> DaoResult<Option<Modification>> {
    let header = base_headers(&docs.source, &docs.overrides)
        .get(edit.date_index)
        .cloned()
        .ok_or_else(|| DaoError::NotFound(format!("date index {}", edit.date_index)))?;

    ensure_in_override(docs, edit.employee_id)?;

    let new_shift = edit.new_shift.trim();
    let baseline = source_cell(&docs.source, edit.employee_id, &header);
    let old_shift = docs
        .overrides
        .set_shift(edit.employee_id, edit.date_index, new_shift)
        .ok_or_else(|| DaoError::NotFound(format!("employee '{}'", edit.employee_id)))?;

    if new_shift.is_empty() || new_shift == baseline {
        return Ok(None);
    }

    let employee_name = docs
        .overrides
        .employee(edit.employee_id)
        .map(|e| e.name.clone())
        .unwrap_or_default();
    let team_name = docs
        .overrides
        .team_of(edit.employee_id)
        .unwrap_or_default()
        .to_string();

    let modification = Modification {
        employee_id: edit.employee_id.to_string(),
        employee_name,
        team_name,
        date_index: edit.date_index,
        month_year: month_bucket(&header, edit.now),
        date_header: header,
        old_shift,
        new_shift: new_shift.to_string(),
        modified_by: edit.actor.to_string(),
        timestamp: edit.now,
    };
    docs.ledger.append(modification.clone());
    Ok(Some(modification))
}
