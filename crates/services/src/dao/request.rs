use std::sync::Arc;

use shiftboard_db::models::{
    Decision, RequestCounts, RequestStatus, ScheduleRequest, ScheduleRequestChange,
    ScheduleRequestSwap,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::base::{DaoError, DaoResult};
use crate::cache::{DocSet, TenantCache, TenantDocs};
use crate::clock::Clock;
use crate::roster::{CellEdit, apply_cell_edit, date_position};

/// Shift-change and swap requests with their approval state machine.
///
/// Requests address cells by date label. Approval writes the override inside
/// the same tenant write that flips the request status, so a request is
/// never approved without its roster change or the other way round.
pub struct RequestDao {
    cache: Arc<TenantCache>,
    clock: Arc<dyn Clock>,
}

impl RequestDao {
    pub fn new(cache: Arc<TenantCache>, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }

    pub async fn submit_change_request(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        date: &str,
        requested_shift: &str,
        reason: &str,
    ) -> DaoResult<ScheduleRequestChange> {
        let requested_shift = requested_shift.trim();
        if requested_shift.is_empty() {
            return Err(DaoError::Validation("requested shift is required".to_string()));
        }
        let now = self.clock.now();

        let request = self
            .cache
            .write(tenant_id, |docs| {
                let (name, team, current) = displayed(docs, employee_id, date)?;
                let request = ScheduleRequestChange {
                    id: ScheduleRequestChange::new_id(),
                    employee_id: employee_id.to_string(),
                    employee_name: name,
                    team,
                    date: date.to_string(),
                    current_shift: current,
                    requested_shift: requested_shift.to_string(),
                    reason: reason.trim().to_string(),
                    status: RequestStatus::Pending,
                    created_at: now,
                    decided_at: None,
                    decided_by: None,
                    admin_message: None,
                };
                docs.requests.push_change(request.clone());
                Ok((request, DocSet::REQUESTS))
            })
            .await?;

        info!(%tenant_id, request_id = %request.id, employee_id, date, "Shift change requested");
        Ok(request)
    }

    pub async fn submit_swap_request(
        &self,
        tenant_id: Uuid,
        requester_id: &str,
        target_id: &str,
        date: &str,
        reason: &str,
    ) -> DaoResult<ScheduleRequestSwap> {
        if requester_id == target_id {
            return Err(DaoError::Validation(
                "cannot swap a shift with yourself".to_string(),
            ));
        }
        let now = self.clock.now();

        let request = self
            .cache
            .write(tenant_id, |docs| {
                let (requester_name, team, requester_shift) = displayed(docs, requester_id, date)?;
                let (target_name, _, target_shift) = displayed(docs, target_id, date)?;
                let request = ScheduleRequestSwap {
                    id: ScheduleRequestSwap::new_id(),
                    requester_id: requester_id.to_string(),
                    requester_name,
                    target_id: target_id.to_string(),
                    target_name,
                    team,
                    date: date.to_string(),
                    requester_shift,
                    target_shift,
                    reason: reason.trim().to_string(),
                    status: RequestStatus::Pending,
                    created_at: now,
                    decided_at: None,
                    decided_by: None,
                    admin_message: None,
                };
                docs.requests.push_swap(request.clone());
                Ok((request, DocSet::REQUESTS))
            })
            .await?;

        info!(
            %tenant_id,
            request_id = %request.id,
            requester_id,
            target_id,
            date,
            "Shift swap requested"
        );
        Ok(request)
    }

    /// Approves or rejects a pending request.
    ///
    /// Approval applies the values captured at submission. If any cell write
    /// fails the request stays pending and nothing is written.
    pub async fn decide(
        &self,
        tenant_id: Uuid,
        request_id: &str,
        decision: Decision,
        decided_by: &str,
        admin_message: Option<String>,
    ) -> DaoResult<ScheduleRequest> {
        let now = self.clock.now();

        let decided = self
            .cache
            .write(tenant_id, |docs| {
                let request = docs
                    .requests
                    .find(request_id)
                    .ok_or_else(|| DaoError::NotFound(format!("request '{request_id}'")))?;
                if request.status() != RequestStatus::Pending {
                    return Err(DaoError::InvalidState(format!(
                        "request '{request_id}' is already {:?}",
                        request.status()
                    )));
                }

                let mut touched = DocSet::REQUESTS;
                if decision == Decision::Approve {
                    touched |= DocSet::OVERRIDE;
                    if apply_approval(docs, &request, decided_by, now)? {
                        touched |= DocSet::LEDGER;
                    }
                }

                let status = decision.status();
                match request {
                    ScheduleRequest::ShiftChange(_) => {
                        if let Some(r) = docs.requests.change_mut(request_id) {
                            r.status = status;
                            r.decided_at = Some(now);
                            r.decided_by = Some(decided_by.to_string());
                            r.admin_message = admin_message;
                        }
                    }
                    ScheduleRequest::Swap(_) => {
                        if let Some(r) = docs.requests.swap_mut(request_id) {
                            r.status = status;
                            r.decided_at = Some(now);
                            r.decided_by = Some(decided_by.to_string());
                            r.admin_message = admin_message;
                        }
                    }
                }
                docs.requests.recount();

                let decided = docs
                    .requests
                    .find(request_id)
                    .ok_or_else(|| DaoError::NotFound(format!("request '{request_id}'")))?;
                Ok((decided, touched))
            })
            .await?;

        info!(%tenant_id, request_id, ?decision, decided_by, "Request decided");
        Ok(decided)
    }

    pub async fn list_all(&self, tenant_id: Uuid) -> DaoResult<Vec<ScheduleRequest>> {
        self.cache.read(tenant_id, |docs| docs.requests.all()).await
    }

    pub async fn list_pending(&self, tenant_id: Uuid) -> DaoResult<Vec<ScheduleRequest>> {
        self.list_with_status(tenant_id, RequestStatus::Pending).await
    }

    pub async fn list_approved(&self, tenant_id: Uuid) -> DaoResult<Vec<ScheduleRequest>> {
        self.list_with_status(tenant_id, RequestStatus::Approved).await
    }

    /// Requests where the employee is subject, requester or target.
    pub async fn list_for_employee(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
    ) -> DaoResult<Vec<ScheduleRequest>> {
        let all = self.list_all(tenant_id).await?;
        Ok(all.into_iter().filter(|r| r.involves(employee_id)).collect())
    }

    pub async fn get(&self, tenant_id: Uuid, request_id: &str) -> DaoResult<ScheduleRequest> {
        self.cache
            .read(tenant_id, |docs| docs.requests.find(request_id))
            .await?
            .ok_or_else(|| DaoError::NotFound(format!("request '{request_id}'")))
    }

    pub async fn counts(&self, tenant_id: Uuid) -> DaoResult<RequestCounts> {
        self.cache.read(tenant_id, |docs| docs.requests.counts()).await
    }

    async fn list_with_status(
        &self,
        tenant_id: Uuid,
        status: RequestStatus,
    ) -> DaoResult<Vec<ScheduleRequest>> {
        let all = self.list_all(tenant_id).await?;
        Ok(all.into_iter().filter(|r| r.status() == status).collect())
    }
}

/// Name, team and displayed shift of an active employee at `date`.
fn displayed(docs: &TenantDocs, employee_id: &str, date: &str) -> DaoResult<(String, String, String)> {
    let employee = docs
        .display
        .employee(employee_id)
        .ok_or_else(|| DaoError::NotFound(format!("employee '{employee_id}'")))?;
    if employee.is_inactive() {
        return Err(DaoError::InvalidState(format!(
            "employee '{employee_id}' is inactive"
        )));
    }
    let index = docs
        .display
        .header_position(date)
        .ok_or_else(|| DaoError::NotFound(format!("date '{date}'")))?;
    let team = docs.display.team_of(employee_id).unwrap_or_default().to_string();
    let shift = employee.shift(index).unwrap_or_default().to_string();
    Ok((employee.name.clone(), team, shift))
}

/// Writes the roster side of an approval. Returns whether the ledger grew.
fn apply_approval(
    docs: &mut TenantDocs,
    request: &ScheduleRequest,
    actor: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> DaoResult<bool> {
    let edits: Vec<(&str, &str, &str)> = match request {
        ScheduleRequest::ShiftChange(r) => {
            warn_if_drifted(docs, &r.id, &r.employee_id, &r.date, &r.current_shift);
            vec![(r.employee_id.as_str(), r.date.as_str(), r.requested_shift.as_str())]
        }
        ScheduleRequest::Swap(r) => {
            warn_if_drifted(docs, &r.id, &r.requester_id, &r.date, &r.requester_shift);
            warn_if_drifted(docs, &r.id, &r.target_id, &r.date, &r.target_shift);
            vec![
                (r.requester_id.as_str(), r.date.as_str(), r.target_shift.as_str()),
                (r.target_id.as_str(), r.date.as_str(), r.requester_shift.as_str()),
            ]
        }
    };

    let mut logged = false;
    for (employee_id, date, new_shift) in edits {
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
        logged |= modification.is_some();
    }
    Ok(logged)
}

fn warn_if_drifted(docs: &TenantDocs, request_id: &str, employee_id: &str, date: &str, captured: &str) {
    let live = docs
        .display
        .header_position(date)
        .and_then(|i| docs.display.shift(employee_id, i));
    if let Some(live) = live {
        if live != captured {
            warn!(
                request_id,
                employee_id,
                date,
                captured,
                live,
                "Roster changed since the request was submitted; applying captured values"
            );
        }
    }
}
