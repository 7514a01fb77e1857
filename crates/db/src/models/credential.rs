use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeCredential {
    pub employee_id: String,
    /// argon2 PHC string.
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// SHA-256 hex digest of the outstanding reset token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: CredentialStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EmployeeCredential {
    pub fn new(employee_id: impl Into<String>, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            employee_id: employee_id.into(),
            password_hash,
            email: None,
            reset_token_hash: None,
            reset_token_expires: None,
            status: CredentialStatus::Active,
            created_at: now,
            last_updated: now,
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_token_expires = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeCredentials {
    #[serde(default)]
    pub credentials: BTreeMap<String, EmployeeCredential>,
}

impl EmployeeCredentials {
    pub const DOCUMENT: &'static str = "credentials";

    pub fn get(&self, employee_id: &str) -> Option<&EmployeeCredential> {
        self.credentials.get(employee_id)
    }

    pub fn get_mut(&mut self, employee_id: &str) -> Option<&mut EmployeeCredential> {
        self.credentials.get_mut(employee_id)
    }

    pub fn contains(&self, employee_id: &str) -> bool {
        self.credentials.contains_key(employee_id)
    }

    pub fn insert(&mut self, credential: EmployeeCredential) {
        self.credentials
            .insert(credential.employee_id.clone(), credential);
    }

    pub fn find_by_token_hash(&self, digest: &str) -> Option<&EmployeeCredential> {
        self.credentials
            .values()
            .find(|c| c.reset_token_hash.as_deref() == Some(digest))
    }
}
