pub mod credential;
pub mod flags;
pub mod modification;
pub mod request;
pub mod roster;
pub mod shift_definition;
pub mod source_link;
pub mod tenant;

use thiserror::Error;
use uuid::Uuid;

pub use credential::{CredentialStatus, EmployeeCredential, EmployeeCredentials};
pub use flags::TenantFlags;
pub use modification::{Modification, ModificationLedger, MonthlyStats, month_bucket};
pub use request::{
    Decision, RequestCounts, RequestStatus, ScheduleRequest, ScheduleRequestChange,
    ScheduleRequestSwap, ScheduleRequests,
};
pub use roster::{Employee, EmployeeStatus, INACTIVE_TEAM, RosterSnapshot, UNASSIGNED_TEAM};
pub use shift_definition::{ShiftDefinitions, ShiftLabel};
pub use source_link::SourceLinks;
pub use tenant::{
    Plan, Subscription, SubscriptionStatus, Tenant, TenantPatch, TenantSettings,
    TenantSettingsPatch, Tenants,
};

/// A model invariant was violated while building or mutating a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Blob key of a per-tenant document.
pub fn tenant_document_key(tenant_id: Uuid, document: &str) -> String {
    format!("tenants/{}/{}.json", tenant_id.simple(), document)
}
