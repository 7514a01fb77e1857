use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Reserved team bucket for deactivated employees.
pub const INACTIVE_TEAM: &str = "Inactive Employees";

/// Team that receives the members of a deleted team.
pub const UNASSIGNED_TEAM: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// One roster row. The schedule is positional against the owning snapshot's
/// headers; its length is checked whenever the row enters a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "currentTeam", skip_serializing_if = "Option::is_none")]
    pub current_team: Option<String>,
    schedule: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>, schedule: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_team: None,
            schedule,
            status: None,
            deleted_at: None,
        }
    }

    /// A row with `days` empty cells.
    pub fn blank(id: impl Into<String>, name: impl Into<String>, days: usize) -> Self {
        Self::new(id, name, vec![String::new(); days])
    }

    pub fn schedule(&self) -> &[String] {
        &self.schedule
    }

    pub fn shift(&self, index: usize) -> Option<&str> {
        self.schedule.get(index).map(String::as_str)
    }

    pub fn is_inactive(&self) -> bool {
        self.status == Some(EmployeeStatus::Inactive)
    }

    /// Re-keys the schedule from `from` headers onto `to` headers by date
    /// label. Dates missing from `from` are filled by `fill`.
    pub fn realigned(
        &self,
        from: &[String],
        to: &[String],
        mut fill: impl FnMut(&str) -> String,
    ) -> Employee {
        let positions: HashMap<&str, usize> = from
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        let schedule = to
            .iter()
            .map(|header| match positions.get(header.as_str()) {
                Some(&i) => self.schedule.get(i).cloned().unwrap_or_default(),
                None => fill(header),
            })
            .collect();
        Employee {
            schedule,
            ..self.clone()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterSnapshotRecord {
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    teams: BTreeMap<String, Vec<Employee>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    retired_teams: BTreeSet<String>,
}

/// Date headers plus team → employees, with an id index standing in for the
/// flat employee list.
///
/// Invariants held by every value of this type:
/// - headers are unique,
/// - every schedule has exactly `headers.len()` cells,
/// - an employee id is listed in exactly one team.
///
/// `retired_teams` only carries meaning in an override: it names teams the
/// merge should drop from the display once they are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RosterSnapshotRecord", into = "RosterSnapshotRecord")]
pub struct RosterSnapshot {
    headers: Vec<String>,
    teams: BTreeMap<String, Vec<Employee>>,
    retired_teams: BTreeSet<String>,
    header_index: HashMap<String, usize>,
    team_index: HashMap<String, String>,
}

impl TryFrom<RosterSnapshotRecord> for RosterSnapshot {
    type Error = ValidationError;

    fn try_from(record: RosterSnapshotRecord) -> Result<Self, Self::Error> {
        let mut snapshot = RosterSnapshot::new(record.headers, record.teams)?;
        snapshot.retired_teams = record.retired_teams;
        Ok(snapshot)
    }
}

impl From<RosterSnapshot> for RosterSnapshotRecord {
    fn from(snapshot: RosterSnapshot) -> Self {
        RosterSnapshotRecord {
            headers: snapshot.headers,
            teams: snapshot.teams,
            retired_teams: snapshot.retired_teams,
        }
    }
}

impl RosterSnapshot {
    pub const SOURCE_DOCUMENT: &'static str = "source_roster";
    pub const OVERRIDE_DOCUMENT: &'static str = "override_roster";

    /// Validates headers and schedule lengths, then repairs stale team
    /// membership via [`RosterSnapshot::deduplicate_team_membership`].
    pub fn new(
        headers: Vec<String>,
        teams: BTreeMap<String, Vec<Employee>>,
    ) -> Result<Self, ValidationError> {
        let mut header_index = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                return Err(ValidationError::new(format!("header {i} is blank")));
            }
            if header_index.insert(header.clone(), i).is_some() {
                return Err(ValidationError::new(format!("duplicate header '{header}'")));
            }
        }

        for (team, employees) in &teams {
            for emp in employees {
                if emp.schedule.len() != headers.len() {
                    return Err(ValidationError::new(format!(
                        "employee '{}' in team '{}' has {} cells, expected {}",
                        emp.id,
                        team,
                        emp.schedule.len(),
                        headers.len()
                    )));
                }
            }
        }

        let mut snapshot = Self {
            headers,
            teams,
            retired_teams: BTreeSet::new(),
            header_index,
            team_index: HashMap::new(),
        };
        snapshot.deduplicate_team_membership()?;
        Ok(snapshot)
    }

    /// Snapshot with headers and no employees.
    pub fn with_headers(headers: Vec<String>) -> Result<Self, ValidationError> {
        Self::new(headers, BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.teams.is_empty() && self.retired_teams.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header_position(&self, header: &str) -> Option<usize> {
        self.header_index.get(header).copied()
    }

    pub fn header_at(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    pub fn teams(&self) -> &BTreeMap<String, Vec<Employee>> {
        &self.teams
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        let team = self.team_index.get(id)?;
        self.teams.get(team)?.iter().find(|e| e.id == id)
    }

    pub fn team_of(&self, id: &str) -> Option<&str> {
        self.team_index.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.team_index.contains_key(id)
    }

    /// All employees in team order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.teams.values().flatten()
    }

    pub fn employee_count(&self) -> usize {
        self.team_index.len()
    }

    pub fn shift(&self, id: &str, index: usize) -> Option<&str> {
        self.employee(id)?.shift(index)
    }

    pub fn ensure_team(&mut self, team: &str) {
        self.teams.entry(team.to_string()).or_default();
    }

    /// Removes a team and returns whoever was listed in it.
    pub fn remove_team(&mut self, team: &str) -> Vec<Employee> {
        let members = self.teams.remove(team).unwrap_or_default();
        for emp in &members {
            self.team_index.remove(&emp.id);
        }
        members
    }

    pub fn retired_teams(&self) -> &BTreeSet<String> {
        &self.retired_teams
    }

    pub fn retire_team(&mut self, team: &str) {
        self.retired_teams.insert(team.to_string());
    }

    /// Returns whether `team` had been retired.
    pub fn restore_team(&mut self, team: &str) -> bool {
        self.retired_teams.remove(team)
    }

    /// Places `employee` in `team`, replacing its record there or moving it
    /// out of whichever team listed it before.
    pub fn upsert_employee(
        &mut self,
        team: &str,
        mut employee: Employee,
    ) -> Result<(), ValidationError> {
        if employee.schedule.len() != self.headers.len() {
            return Err(ValidationError::new(format!(
                "employee '{}' has {} cells, expected {}",
                employee.id,
                employee.schedule.len(),
                self.headers.len()
            )));
        }

        if let Some(previous) = self.team_index.get(&employee.id).cloned() {
            if previous != team {
                self.detach(&previous, &employee.id);
            }
        }

        employee.current_team = Some(team.to_string());
        let members = self.teams.entry(team.to_string()).or_default();
        match members.iter_mut().find(|e| e.id == employee.id) {
            Some(slot) => *slot = employee.clone(),
            None => members.push(employee.clone()),
        }
        self.team_index.insert(employee.id, team.to_string());
        Ok(())
    }

    pub fn remove_employee(&mut self, id: &str) -> Option<(String, Employee)> {
        let team = self.team_index.remove(id)?;
        let members = self.teams.get_mut(&team)?;
        let pos = members.iter().position(|e| e.id == id)?;
        Some((team, members.remove(pos)))
    }

    /// Overwrites one cell and returns the previous value, or `None` when the
    /// employee or index does not exist.
    pub fn set_shift(&mut self, id: &str, index: usize, value: &str) -> Option<String> {
        let emp = self.employee_mut(id)?;
        let cell = emp.schedule.get_mut(index)?;
        Some(std::mem::replace(cell, value.to_string()))
    }

    pub fn set_status(
        &mut self,
        id: &str,
        status: Option<EmployeeStatus>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> bool {
        match self.employee_mut(id) {
            Some(emp) => {
                emp.status = status;
                emp.deleted_at = deleted_at;
                true
            }
            None => false,
        }
    }

    pub fn rename_employee(&mut self, id: &str, name: &str) -> bool {
        match self.employee_mut(id) {
            Some(emp) => {
                emp.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Copy of this snapshot re-keyed onto `headers`. Cells for dates this
    /// snapshot lacks come from `fill(employee_id, header)`.
    pub fn realigned(
        &self,
        headers: &[String],
        mut fill: impl FnMut(&str, &str) -> String,
    ) -> Result<RosterSnapshot, ValidationError> {
        let teams = self
            .teams
            .iter()
            .map(|(team, members)| {
                let members = members
                    .iter()
                    .map(|emp| emp.realigned(&self.headers, headers, |h| fill(&emp.id, h)))
                    .collect();
                (team.clone(), members)
            })
            .collect();
        let mut snapshot = RosterSnapshot::new(headers.to_vec(), teams)?;
        snapshot.retired_teams = self.retired_teams.clone();
        Ok(snapshot)
    }

    /// Repairs rosters where an employee is still listed under a team they
    /// left. The correct team comes from `current_team` (an explicit value
    /// beats the team-key fallback; among explicit values the last in team
    /// order wins) and must be one of the teams that lists the employee,
    /// otherwise the last listing team is used. Two records with the same id
    /// inside one team are rejected rather than dropped.
    pub fn deduplicate_team_membership(&mut self) -> Result<(), ValidationError> {
        let mut listed_in: HashMap<String, Vec<String>> = HashMap::new();
        let mut voted: HashMap<String, (String, bool)> = HashMap::new();

        for (team, members) in &self.teams {
            let mut seen = HashSet::new();
            for emp in members {
                if !seen.insert(emp.id.as_str()) {
                    return Err(ValidationError::new(format!(
                        "employee '{}' listed twice in team '{}'",
                        emp.id, team
                    )));
                }
                listed_in
                    .entry(emp.id.clone())
                    .or_default()
                    .push(team.clone());

                let (candidate, explicit) = match &emp.current_team {
                    Some(t) => (t.clone(), true),
                    None => (team.clone(), false),
                };
                let keep_existing = matches!(voted.get(&emp.id), Some((_, true))) && !explicit;
                if !keep_existing {
                    voted.insert(emp.id.clone(), (candidate, explicit));
                }
            }
        }

        let mut correct: HashMap<String, String> = HashMap::with_capacity(voted.len());
        for (id, (team, _)) in voted {
            let teams = &listed_in[&id];
            let resolved = if teams.contains(&team) {
                team
            } else {
                teams.last().cloned().unwrap_or(team)
            };
            correct.insert(id, resolved);
        }

        for (team, members) in self.teams.iter_mut() {
            members.retain(|e| correct.get(&e.id) == Some(team));
            for emp in members.iter_mut() {
                if emp.current_team.as_deref().is_some_and(|t| t != team) {
                    emp.current_team = Some(team.clone());
                }
            }
        }

        self.team_index = correct;
        Ok(())
    }

    fn employee_mut(&mut self, id: &str) -> Option<&mut Employee> {
        let team = self.team_index.get(id)?;
        self.teams.get_mut(team)?.iter_mut().find(|e| e.id == id)
    }

    fn detach(&mut self, team: &str, id: &str) {
        if let Some(members) = self.teams.get_mut(team) {
            members.retain(|e| e.id != id);
        }
        self.team_index.remove(id);
    }
}
