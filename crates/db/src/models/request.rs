use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// An admin's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequestChange {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub team: String,
    pub date: String,
    pub current_shift: String,
    pub requested_shift: String,
    pub reason: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequestSwap {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub target_id: String,
    pub target_name: String,
    pub team: String,
    pub date: String,
    pub requester_shift: String,
    pub target_shift: String,
    pub reason: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
}

impl ScheduleRequestChange {
    pub fn new_id() -> String {
        format!("shift_change_{}", Uuid::new_v4().simple())
    }
}

impl ScheduleRequestSwap {
    pub fn new_id() -> String {
        format!("swap_{}", Uuid::new_v4().simple())
    }
}

/// Either request kind, as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleRequest {
    ShiftChange(ScheduleRequestChange),
    Swap(ScheduleRequestSwap),
}

impl ScheduleRequest {
    pub fn id(&self) -> &str {
        match self {
            ScheduleRequest::ShiftChange(r) => &r.id,
            ScheduleRequest::Swap(r) => &r.id,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            ScheduleRequest::ShiftChange(r) => r.status,
            ScheduleRequest::Swap(r) => r.status,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ScheduleRequest::ShiftChange(r) => r.created_at,
            ScheduleRequest::Swap(r) => r.created_at,
        }
    }

    /// Whether `employee_id` is the subject, requester or target.
    pub fn involves(&self, employee_id: &str) -> bool {
        match self {
            ScheduleRequest::ShiftChange(r) => r.employee_id == employee_id,
            ScheduleRequest::Swap(r) => {
                r.requester_id == employee_id || r.target_id == employee_id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    pub pending: usize,
    pub approved: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequests {
    #[serde(default)]
    pub shift_change_requests: Vec<ScheduleRequestChange>,
    #[serde(default)]
    pub swap_requests: Vec<ScheduleRequestSwap>,
    #[serde(default)]
    pub pending_count: usize,
    #[serde(default)]
    pub approved_count: usize,
}

impl ScheduleRequests {
    pub const DOCUMENT: &'static str = "requests";

    pub fn recount(&mut self) {
        let statuses = self
            .shift_change_requests
            .iter()
            .map(|r| r.status)
            .chain(self.swap_requests.iter().map(|r| r.status));
        let (mut pending, mut approved) = (0, 0);
        for status in statuses {
            match status {
                RequestStatus::Pending => pending += 1,
                RequestStatus::Approved => approved += 1,
                RequestStatus::Rejected => {}
            }
        }
        self.pending_count = pending;
        self.approved_count = approved;
    }

    pub fn is_empty(&self) -> bool {
        self.shift_change_requests.is_empty() && self.swap_requests.is_empty()
    }

    pub fn counts(&self) -> RequestCounts {
        RequestCounts {
            pending: self.pending_count,
            approved: self.approved_count,
        }
    }

    pub fn push_change(&mut self, request: ScheduleRequestChange) {
        self.shift_change_requests.push(request);
        self.recount();
    }

    pub fn push_swap(&mut self, request: ScheduleRequestSwap) {
        self.swap_requests.push(request);
        self.recount();
    }

    pub fn change_mut(&mut self, id: &str) -> Option<&mut ScheduleRequestChange> {
        self.shift_change_requests.iter_mut().find(|r| r.id == id)
    }

    pub fn swap_mut(&mut self, id: &str) -> Option<&mut ScheduleRequestSwap> {
        self.swap_requests.iter_mut().find(|r| r.id == id)
    }

    pub fn find(&self, id: &str) -> Option<ScheduleRequest> {
        if let Some(r) = self.shift_change_requests.iter().find(|r| r.id == id) {
            return Some(ScheduleRequest::ShiftChange(r.clone()));
        }
        self.swap_requests
            .iter()
            .find(|r| r.id == id)
            .map(|r| ScheduleRequest::Swap(r.clone()))
    }

    /// Every request, newest first.
    pub fn all(&self) -> Vec<ScheduleRequest> {
        let mut all: Vec<ScheduleRequest> = self
            .shift_change_requests
            .iter()
            .cloned()
            .map(ScheduleRequest::ShiftChange)
            .chain(self.swap_requests.iter().cloned().map(ScheduleRequest::Swap))
            .collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        all
    }
}
