use std::sync::Arc;

use shiftboard_db::models::{
    Employee, EmployeeStatus, INACTIVE_TEAM, Modification, MonthlyStats, RosterSnapshot,
    UNASSIGNED_TEAM,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::base::{DaoError, DaoResult};
use super::credential::{credential_mut, mark_active, mark_inactive};
use crate::auth::PasswordService;
use crate::cache::{DocSet, TenantCache, TenantDocs};
use crate::clock::Clock;
use crate::roster::{CellEdit, apply_cell_edit, base_headers, date_position, ensure_in_override};
use crate::roster::merge::source_cell;

/// Source/override rosters of a tenant, the merged display and the
/// modification ledger.
pub struct RosterDao {
    cache: Arc<TenantCache>,
    passwords: Arc<PasswordService>,
    clock: Arc<dyn Clock>,
}

impl RosterDao {
    pub fn new(
        cache: Arc<TenantCache>,
        passwords: Arc<PasswordService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            passwords,
            clock,
        }
    }

    /// Merged roster. Never blocks on a concurrent writer once the tenant is
    /// loaded.
    pub async fn display(&self, tenant_id: Uuid) -> DaoResult<Arc<RosterSnapshot>> {
        self.cache.display(tenant_id).await
    }

    pub async fn source(&self, tenant_id: Uuid) -> DaoResult<RosterSnapshot> {
        self.cache.read(tenant_id, |docs| docs.source.clone()).await
    }

    pub async fn overrides(&self, tenant_id: Uuid) -> DaoResult<RosterSnapshot> {
        self.cache.read(tenant_id, |docs| docs.overrides.clone()).await
    }

    pub async fn modifications(&self, tenant_id: Uuid) -> DaoResult<Vec<Modification>> {
        self.cache
            .read(tenant_id, |docs| docs.ledger.entries().to_vec())
            .await
    }

    /// Ledger entries, optionally narrowed to one month bucket and/or one
    /// employee.
    pub async fn modifications_matching(
        &self,
        tenant_id: Uuid,
        month_year: Option<&str>,
        employee_id: Option<&str>,
    ) -> DaoResult<Vec<Modification>> {
        self.cache
            .read(tenant_id, |docs| match (month_year, employee_id) {
                (Some(month), employee) => docs
                    .ledger
                    .for_month(month)
                    .filter(|m| employee.is_none_or(|id| m.employee_id == id))
                    .cloned()
                    .collect(),
                (None, Some(id)) => docs.ledger.for_employee(id).cloned().collect(),
                (None, None) => docs.ledger.entries().to_vec(),
            })
            .await
    }

    pub async fn monthly_stats(
        &self,
        tenant_id: Uuid,
        month_year: &str,
    ) -> DaoResult<Option<MonthlyStats>> {
        self.cache
            .read(tenant_id, |docs| docs.ledger.stats_for(month_year).cloned())
            .await
    }

    /// Replaces the imported roster. Existing override records are re-keyed
    /// onto the new dates so manual edits survive a re-import.
    pub async fn set_source(&self, tenant_id: Uuid, snapshot: RosterSnapshot) -> DaoResult<()> {
        let employees = snapshot.employee_count();
        self.cache
            .write(tenant_id, move |docs| {
                if !snapshot.headers().is_empty()
                    && !docs.overrides.is_empty()
                    && docs.overrides.headers() != snapshot.headers()
                {
                    docs.overrides = docs
                        .overrides
                        .realigned(snapshot.headers(), |id, header| {
                            source_cell(&snapshot, id, header)
                        })?;
                }
                docs.source = snapshot;
                Ok(((), DocSet::SOURCE | DocSet::OVERRIDE))
            })
            .await?;
        info!(%tenant_id, employees, "Source roster replaced");
        Ok(())
    }

    pub async fn set_override(&self, tenant_id: Uuid, snapshot: RosterSnapshot) -> DaoResult<()> {
        self.cache
            .write(tenant_id, move |docs| {
                docs.overrides = snapshot;
                Ok(((), DocSet::OVERRIDE))
            })
            .await?;
        info!(%tenant_id, "Override roster replaced");
        Ok(())
    }

    pub async fn update_cell(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        date_index: usize,
        new_shift: &str,
        actor: &str,
    ) -> DaoResult<Option<Modification>> {
        let now = self.clock.now();
        self.cache
            .write(tenant_id, |docs| {
                let modification = apply_cell_edit(
                    docs,
                    CellEdit {
                        employee_id,
                        date_index,
                        new_shift,
                        actor,
                        now,
                    },
                )?;
                let touched = if modification.is_some() {
                    DocSet::OVERRIDE | DocSet::LEDGER
                } else {
                    DocSet::OVERRIDE
                };
                Ok((modification, touched))
            })
            .await
    }

    pub async fn update_cell_by_date(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        date: &str,
        new_shift: &str,
        actor: &str,
    ) -> DaoResult<Option<Modification>> {
        let now = self.clock.now();
        self.cache
            .write(tenant_id, |docs| {
                let date_index = date_position(docs, date)?;
                let modification = apply_cell_edit(
                    docs,
                    CellEdit {
                        employee_id,
                        date_index,
                        new_shift,
                        actor,
                        now,
                    },
                )?;
                let touched = if modification.is_some() {
                    DocSet::OVERRIDE | DocSet::LEDGER
                } else {
                    DocSet::OVERRIDE
                };
                Ok((modification, touched))
            })
            .await
    }

    /// Drops every manual edit. The ledger keeps its history.
    pub async fn reset_to_source(&self, tenant_id: Uuid) -> DaoResult<()> {
        self.cache
            .write(tenant_id, |docs| {
                if docs.overrides.is_empty() {
                    return Ok(((), DocSet::empty()));
                }
                docs.overrides = RosterSnapshot::default();
                Ok(((), DocSet::OVERRIDE))
            })
            .await?;
        info!(%tenant_id, "Roster reset to source");
        Ok(())
    }

    /// Removes source, override, ledger and requests. Credentials, shift
    /// definitions and flags stay.
    pub async fn hard_reset(&self, tenant_id: Uuid) -> DaoResult<()> {
        self.cache
            .write(tenant_id, |docs| {
                docs.source = RosterSnapshot::default();
                docs.overrides = RosterSnapshot::default();
                docs.ledger = Default::default();
                docs.requests = Default::default();
                Ok((
                    (),
                    DocSet::SOURCE | DocSet::OVERRIDE | DocSet::LEDGER | DocSet::REQUESTS,
                ))
            })
            .await?;
        warn!(%tenant_id, "Hard reset of roster data");
        Ok(())
    }

    pub async fn add_employee(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        name: &str,
        team: &str,
    ) -> DaoResult<Employee> {
        let employee_id = employee_id.trim();
        let name = name.trim();
        let team = assignable_team(team)?;
        if employee_id.is_empty() || name.is_empty() {
            return Err(DaoError::Validation(
                "employee id and name are required".to_string(),
            ));
        }

        let employee = self
            .cache
            .write(tenant_id, |docs| {
                if docs.source.contains(employee_id)
                    || docs.overrides.contains(employee_id)
                    || docs.credentials.contains(employee_id)
                {
                    return Err(DaoError::InvalidState(format!(
                        "employee id '{employee_id}' is already in use"
                    )));
                }
                if docs.overrides.headers() != base_headers(&docs.source, &docs.overrides) {
                    align_override(docs)?;
                }
                let days = docs.overrides.headers().len();
                docs.overrides.restore_team(team);
                docs.overrides
                    .upsert_employee(team, Employee::blank(employee_id, name, days))?;
                let employee = docs
                    .overrides
                    .employee(employee_id)
                    .cloned()
                    .ok_or_else(|| DaoError::NotFound(format!("employee '{employee_id}'")))?;
                Ok((employee, DocSet::OVERRIDE))
            })
            .await?;

        info!(%tenant_id, employee_id, team, "Employee added");
        Ok(employee)
    }

    /// Renames and/or moves an employee in the override. Deactivated
    /// employees can be renamed but only leave the inactive bucket through
    /// [`RosterDao::reactivate_employee`].
    pub async fn update_employee(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        name: Option<&str>,
        team: Option<&str>,
    ) -> DaoResult<Employee> {
        let name = match name.map(str::trim) {
            Some("") => {
                return Err(DaoError::Validation("employee name is required".to_string()));
            }
            other => other,
        };
        let team = team.map(assignable_team).transpose()?;

        self.cache
            .write(tenant_id, |docs| {
                if team.is_some()
                    && docs
                        .display
                        .employee(employee_id)
                        .is_some_and(Employee::is_inactive)
                {
                    return Err(DaoError::InvalidState(format!(
                        "employee '{employee_id}' is inactive; reactivate them to change team"
                    )));
                }
                ensure_in_override(docs, employee_id)?;
                if let Some(name) = name {
                    docs.overrides.rename_employee(employee_id, name);
                }
                if let Some(team) = team {
                    docs.overrides.restore_team(team);
                    move_to_team(docs, &[employee_id.to_string()], team)?;
                }
                let employee = docs
                    .overrides
                    .employee(employee_id)
                    .cloned()
                    .ok_or_else(|| DaoError::NotFound(format!("employee '{employee_id}'")))?;
                Ok((employee, DocSet::OVERRIDE))
            })
            .await
    }

    /// Moves the employee into the inactive bucket, marks the source record
    /// and the credential inactive. Repeating it changes nothing.
    pub async fn deactivate_employee(&self, tenant_id: Uuid, employee_id: &str) -> DaoResult<()> {
        let now = self.clock.now();
        let passwords = self.passwords.clone();

        let changed = self
            .cache
            .write(tenant_id, |docs| {
                let already = docs.overrides.team_of(employee_id) == Some(INACTIVE_TEAM)
                    && docs
                        .overrides
                        .employee(employee_id)
                        .is_some_and(Employee::is_inactive)
                    && docs
                        .credentials
                        .get(employee_id)
                        .is_some_and(|c| !c.is_active());
                if already {
                    return Ok((false, DocSet::empty()));
                }

                ensure_in_override(docs, employee_id)?;
                if let Some((_, mut record)) = docs.overrides.remove_employee(employee_id) {
                    record.status = Some(EmployeeStatus::Inactive);
                    record.deleted_at = Some(now);
                    docs.overrides.upsert_employee(INACTIVE_TEAM, record)?;
                }

                let mut touched = DocSet::OVERRIDE | DocSet::CREDENTIALS;
                if docs
                    .source
                    .set_status(employee_id, Some(EmployeeStatus::Inactive), Some(now))
                {
                    touched |= DocSet::SOURCE;
                }

                let credential = credential_mut(docs, employee_id, now, || {
                    passwords.hash_password(employee_id)
                })?;
                mark_inactive(credential, now);

                Ok((true, touched))
            })
            .await?;

        if changed {
            info!(%tenant_id, employee_id, "Employee deactivated");
        }
        Ok(())
    }

    /// Brings a deactivated employee back into `team` and re-enables their
    /// credential.
    pub async fn reactivate_employee(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        team: &str,
    ) -> DaoResult<()> {
        let team = assignable_team(team)?;
        let now = self.clock.now();

        let changed = self
            .cache
            .write(tenant_id, |docs| {
                let inactive = docs.display.employee(employee_id).map(Employee::is_inactive);
                match inactive {
                    None => return Err(DaoError::NotFound(format!("employee '{employee_id}'"))),
                    Some(false) => return Ok((false, DocSet::empty())),
                    Some(true) => {}
                }

                ensure_in_override(docs, employee_id)?;
                if let Some((_, mut record)) = docs.overrides.remove_employee(employee_id) {
                    record.status = Some(EmployeeStatus::Active);
                    record.deleted_at = None;
                    docs.overrides.restore_team(team);
                    docs.overrides.upsert_employee(team, record)?;
                }

                let mut touched = DocSet::OVERRIDE;
                if docs
                    .source
                    .set_status(employee_id, Some(EmployeeStatus::Active), None)
                {
                    touched |= DocSet::SOURCE;
                }
                if let Some(credential) = docs.credentials.get_mut(employee_id) {
                    mark_active(credential, now);
                    touched |= DocSet::CREDENTIALS;
                }
                Ok((true, touched))
            })
            .await?;

        if changed {
            info!(%tenant_id, employee_id, team, "Employee reactivated");
        }
        Ok(())
    }

    /// Creates an empty team. Adding a team that is already displayed is a
    /// no-op.
    pub async fn add_team(&self, tenant_id: Uuid, team: &str) -> DaoResult<()> {
        let team = assignable_team(team)?;
        let added = self
            .cache
            .write(tenant_id, |docs| {
                if docs.display.teams().contains_key(team) {
                    return Ok((false, DocSet::empty()));
                }
                if docs.overrides.headers() != base_headers(&docs.source, &docs.overrides) {
                    align_override(docs)?;
                }
                docs.overrides.restore_team(team);
                docs.overrides.ensure_team(team);
                Ok((true, DocSet::OVERRIDE))
            })
            .await?;
        if added {
            info!(%tenant_id, team, "Team added");
        }
        Ok(())
    }

    /// Moves every member of `old` into `new` and retires `old`.
    pub async fn rename_team(&self, tenant_id: Uuid, old: &str, new: &str) -> DaoResult<()> {
        let old = old.trim();
        let new = assignable_team(new)?;
        if old == INACTIVE_TEAM {
            return Err(DaoError::Validation(format!(
                "'{INACTIVE_TEAM}' cannot be renamed"
            )));
        }

        let moved = self
            .cache
            .write(tenant_id, |docs| {
                let members = team_members(docs, old)?;
                if old == new {
                    return Ok((0, DocSet::empty()));
                }
                if docs.display.teams().contains_key(new) {
                    return Err(DaoError::InvalidState(format!("team '{new}' already exists")));
                }
                if docs.overrides.headers() != base_headers(&docs.source, &docs.overrides) {
                    align_override(docs)?;
                }
                docs.overrides.restore_team(new);
                docs.overrides.ensure_team(new);
                move_to_team(docs, &members, new)?;
                docs.overrides.remove_team(old);
                docs.overrides.retire_team(old);
                Ok((members.len(), DocSet::OVERRIDE))
            })
            .await?;

        info!(%tenant_id, old, new, moved, "Team renamed");
        Ok(())
    }

    /// Retires `team`; its members move to the unassigned team. Returns how
    /// many employees were moved.
    pub async fn delete_team(&self, tenant_id: Uuid, team: &str) -> DaoResult<usize> {
        let team = team.trim();
        if team == INACTIVE_TEAM {
            return Err(DaoError::Validation(format!(
                "'{INACTIVE_TEAM}' cannot be deleted"
            )));
        }

        let moved = self
            .cache
            .write(tenant_id, |docs| {
                let members = team_members(docs, team)?;
                if team == UNASSIGNED_TEAM && !members.is_empty() {
                    return Err(DaoError::InvalidState(format!(
                        "'{UNASSIGNED_TEAM}' still has members"
                    )));
                }
                if docs.overrides.headers() != base_headers(&docs.source, &docs.overrides) {
                    align_override(docs)?;
                }
                if !members.is_empty() {
                    docs.overrides.restore_team(UNASSIGNED_TEAM);
                    move_to_team(docs, &members, UNASSIGNED_TEAM)?;
                }
                docs.overrides.remove_team(team);
                docs.overrides.retire_team(team);
                Ok((members.len(), DocSet::OVERRIDE))
            })
            .await?;

        info!(%tenant_id, team, moved, "Team deleted");
        Ok(moved)
    }
}

/// Ids listed under `team` in the display.
fn team_members(docs: &TenantDocs, team: &str) -> DaoResult<Vec<String>> {
    docs.display
        .teams()
        .get(team)
        .map(|members| members.iter().map(|e| e.id.clone()).collect())
        .ok_or_else(|| DaoError::NotFound(format!("team '{team}'")))
}

/// Places each employee's override record under `team`, copying it from the
/// source first when needed.
fn move_to_team(docs: &mut TenantDocs, employee_ids: &[String], team: &str) -> DaoResult<()> {
    for id in employee_ids {
        ensure_in_override(docs, id)?;
        if let Some((_, record)) = docs.overrides.remove_employee(id) {
            docs.overrides.upsert_employee(team, record)?;
        }
    }
    Ok(())
}

fn align_override(docs: &mut TenantDocs) -> DaoResult<()> {
    let base = base_headers(&docs.source, &docs.overrides).to_vec();
    let source = &docs.source;
    docs.overrides = docs
        .overrides
        .realigned(&base, |id, header| source_cell(source, id, header))?;
    Ok(())
}

fn assignable_team(team: &str) -> DaoResult<&str> {
    let team = team.trim();
    if team.is_empty() {
        return Err(DaoError::Validation("team is required".to_string()));
    }
    if team == INACTIVE_TEAM {
        return Err(DaoError::Validation(format!(
            "'{INACTIVE_TEAM}' is reserved for deactivated employees"
        )));
    }
    Ok(team)
}
