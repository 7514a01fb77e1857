use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    pub fn duration_days(self) -> i64 {
        match self {
            Plan::Monthly => 30,
            Plan::Yearly => 365,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::days(self.duration_days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn pending(plan: Plan, now: DateTime<Utc>) -> Self {
        Self {
            plan,
            status: SubscriptionStatus::Pending,
            created_at: now,
            started_at: None,
            expires_at: None,
        }
    }

    /// Starts (or restarts) the billing period at `now`.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Active;
        self.started_at = Some(now);
        self.expires_at = Some(now + self.plan.duration());
    }

    pub fn suspend(&mut self) {
        self.status = SubscriptionStatus::Pending;
        self.started_at = None;
        self.expires_at = None;
    }

    /// Recomputes `expires_at` from `started_at` for the current plan.
    pub fn recompute_expiry(&mut self, now: DateTime<Utc>) {
        let started = *self.started_at.get_or_insert(now);
        self.expires_at = Some(started + self.plan.duration());
    }

    /// Whole days until expiry, rounded up. Negative once expired.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let expires = self.expires_at?;
        let secs = (expires - now).num_seconds();
        Some((secs + 86_399).div_euclid(86_400))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_employees: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Shallow settings merge: only fields that are `Some` overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantSettingsPatch {
    #[serde(default)]
    pub max_users: Option<u32>,
    #[serde(default)]
    pub max_employees: Option<u32>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl TenantSettings {
    pub fn apply(&mut self, patch: TenantSettingsPatch) {
        if patch.max_users.is_some() {
            self.max_users = patch.max_users;
        }
        if patch.max_employees.is_some() {
            self.max_employees = patch.max_employees;
        }
        if patch.organization_name.is_some() {
            self.organization_name = patch.organization_name;
        }
        if patch.logo_url.is_some() {
            self.logo_url = patch.logo_url;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub settings: TenantSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

impl Tenant {
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.subscription.as_ref()?.days_remaining(now)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub settings: Option<TenantSettingsPatch>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// The shared registry document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tenants {
    #[serde(default)]
    pub tenants: Vec<Tenant>,
}

impl Tenants {
    pub const KEY: &'static str = "tenants.json";

    pub fn get(&self, id: Uuid) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Tenant> {
        self.tenants.iter_mut().find(|t| t.id == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.slug == slug)
    }

    /// True when `slug` is taken by a tenant other than `except`.
    pub fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.tenants
            .iter()
            .any(|t| t.slug == slug && Some(t.id) != except)
    }
}

/// Lower-cases and strips every character outside `[a-z0-9-]`.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
