use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use shiftboard_config::CredentialSettings;
use shiftboard_db::models::{CredentialStatus, EmployeeCredential};
use tracing::{info, warn};
use uuid::Uuid;

use super::base::{DaoError, DaoResult};
use crate::auth::PasswordService;
use crate::cache::{DocSet, TenantCache, TenantDocs};
use crate::clock::Clock;

/// Employee secrets, reset tokens and login eligibility.
///
/// An employee without a stored credential logs in with their employee id
/// as password until a real password is set.
pub struct CredentialDao {
    cache: Arc<TenantCache>,
    passwords: Arc<PasswordService>,
    clock: Arc<dyn Clock>,
    settings: CredentialSettings,
}

enum Check {
    Accepted,
    Rejected,
    Inactive,
}

impl CredentialDao {
    pub fn new(
        cache: Arc<TenantCache>,
        passwords: Arc<PasswordService>,
        clock: Arc<dyn Clock>,
        settings: CredentialSettings,
    ) -> Self {
        Self {
            cache,
            passwords,
            clock,
            settings,
        }
    }

    pub async fn get(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
    ) -> DaoResult<Option<EmployeeCredential>> {
        self.cache
            .read(tenant_id, |docs| docs.credentials.get(employee_id).cloned())
            .await
    }

    async fn check(&self, tenant_id: Uuid, employee_id: &str, password: &str) -> DaoResult<Check> {
        let password = password.trim();
        let credential = self.get(tenant_id, employee_id).await?;
        let Some(credential) = credential else {
            return Ok(if password == employee_id {
                Check::Accepted
            } else {
                Check::Rejected
            });
        };
        if !credential.is_active() {
            return Ok(Check::Inactive);
        }
        if self
            .passwords
            .verify_password(password, &credential.password_hash)?
        {
            Ok(Check::Accepted)
        } else {
            Ok(Check::Rejected)
        }
    }

    pub async fn verify(&self, tenant_id: Uuid, employee_id: &str, password: &str) -> DaoResult<bool> {
        Ok(matches!(
            self.check(tenant_id, employee_id, password).await?,
            Check::Accepted
        ))
    }

    /// Like [`CredentialDao::verify`] but tells the caller why a login failed.
    pub async fn authenticate(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        password: &str,
    ) -> DaoResult<()> {
        match self.check(tenant_id, employee_id, password).await? {
            Check::Accepted => Ok(()),
            Check::Rejected => {
                warn!(%tenant_id, employee_id, "Rejected employee login");
                Err(DaoError::InvalidCredentials)
            }
            Check::Inactive => Err(DaoError::InactiveCredential(employee_id.to_string())),
        }
    }

    pub async fn set_password(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        new_password: &str,
    ) -> DaoResult<()> {
        let hash = self.hash_new_password(new_password)?;
        let now = self.clock.now();
        self.cache
            .write(tenant_id, |docs| {
                let credential = credential_mut(docs, employee_id, now, || Ok(hash.clone()))?;
                if !credential.is_active() {
                    return Err(DaoError::InactiveCredential(employee_id.to_string()));
                }
                credential.password_hash = hash;
                credential.last_updated = now;
                Ok(((), DocSet::CREDENTIALS))
            })
            .await?;
        info!(%tenant_id, employee_id, "Password updated");
        Ok(())
    }

    pub async fn set_email(&self, tenant_id: Uuid, employee_id: &str, email: &str) -> DaoResult<()> {
        let email = required_email(email)?;
        let now = self.clock.now();
        self.cache
            .write(tenant_id, |docs| {
                let credential = credential_mut(docs, employee_id, now, || {
                    self.passwords.hash_password(employee_id)
                })?;
                credential.email = Some(email);
                credential.last_updated = now;
                Ok(((), DocSet::CREDENTIALS))
            })
            .await
    }

    /// Issues a fresh reset token, replacing any outstanding one. Only the
    /// token's digest is stored; the plain token is returned for delivery.
    pub async fn issue_reset_token(
        &self,
        tenant_id: Uuid,
        employee_id: &str,
        email: &str,
    ) -> DaoResult<String> {
        let email = required_email(email)?;
        let token = self
            .passwords
            .generate_reset_token(self.settings.reset_token_length);
        let digest = self.passwords.digest_token(&token);
        let now = self.clock.now();
        let expires = now + Duration::hours(self.settings.reset_token_ttl_hours);

        self.cache
            .write(tenant_id, |docs| {
                let credential = credential_mut(docs, employee_id, now, || {
                    self.passwords.hash_password(employee_id)
                })?;
                if !credential.is_active() {
                    return Err(DaoError::InactiveCredential(employee_id.to_string()));
                }
                credential.email = Some(email);
                credential.reset_token_hash = Some(digest);
                credential.reset_token_expires = Some(expires);
                credential.last_updated = now;
                Ok(((), DocSet::CREDENTIALS))
            })
            .await?;

        info!(%tenant_id, employee_id, %expires, "Issued password reset token");
        Ok(token)
    }

    /// Employee id the token belongs to, or why it cannot be used.
    pub async fn validate_reset_token(&self, tenant_id: Uuid, token: &str) -> DaoResult<String> {
        let digest = self.passwords.digest_token(token.trim());
        let now = self.clock.now();
        self.cache
            .read(tenant_id, |docs| {
                let credential = docs
                    .credentials
                    .find_by_token_hash(&digest)
                    .ok_or(DaoError::TokenInvalid)?;
                if token_expired(credential, now) {
                    return Err(DaoError::TokenExpired);
                }
                Ok(credential.employee_id.clone())
            })
            .await?
    }

    /// Sets a new password through a reset token. Returns `false` when the
    /// token is unknown or expired. A used token is cleared.
    pub async fn consume_reset_token(
        &self,
        tenant_id: Uuid,
        token: &str,
        new_password: &str,
    ) -> DaoResult<bool> {
        let digest = self.passwords.digest_token(token.trim());
        let hash = self.hash_new_password(new_password)?;
        let now = self.clock.now();

        let consumed = self
            .cache
            .write(tenant_id, |docs| {
                let Some(employee_id) = docs
                    .credentials
                    .find_by_token_hash(&digest)
                    .filter(|c| !token_expired(c, now))
                    .map(|c| c.employee_id.clone())
                else {
                    return Ok((None, DocSet::empty()));
                };
                let Some(credential) = docs.credentials.get_mut(&employee_id) else {
                    return Ok((None, DocSet::empty()));
                };
                credential.password_hash = hash;
                credential.clear_reset_token();
                credential.last_updated = now;
                Ok((Some(employee_id), DocSet::CREDENTIALS))
            })
            .await?;

        match consumed {
            Some(employee_id) => {
                info!(%tenant_id, employee_id = %employee_id, "Password reset via token");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn deactivate(&self, tenant_id: Uuid, employee_id: &str) -> DaoResult<()> {
        let now = self.clock.now();
        self.cache
            .write(tenant_id, |docs| {
                let credential = credential_mut(docs, employee_id, now, || {
                    self.passwords.hash_password(employee_id)
                })?;
                if !credential.is_active() {
                    return Ok(((), DocSet::empty()));
                }
                mark_inactive(credential, now);
                Ok(((), DocSet::CREDENTIALS))
            })
            .await
    }

    pub async fn reactivate(&self, tenant_id: Uuid, employee_id: &str) -> DaoResult<()> {
        let now = self.clock.now();
        self.cache
            .write(tenant_id, |docs| {
                match docs.credentials.get_mut(employee_id) {
                    Some(credential) if !credential.is_active() => {
                        mark_active(credential, now);
                        Ok(((), DocSet::CREDENTIALS))
                    }
                    Some(_) => Ok(((), DocSet::empty())),
                    None if docs.display.contains(employee_id) => Ok(((), DocSet::empty())),
                    None => Err(DaoError::NotFound(format!("employee '{employee_id}'"))),
                }
            })
            .await
    }

    fn hash_new_password(&self, new_password: &str) -> DaoResult<String> {
        let new_password = new_password.trim();
        if new_password.is_empty() {
            return Err(DaoError::Validation("password must not be empty".to_string()));
        }
        self.passwords.hash_password(new_password)
    }
}

/// Existing credential of `employee_id`, or a new one when the employee is
/// on the roster. `initial_hash` only runs in the second case; employees
/// still on the default password get a hash of their id.
pub(crate) fn credential_mut<'a>(
    docs: &'a mut TenantDocs,
    employee_id: &str,
    now: DateTime<Utc>,
    initial_hash: impl FnOnce() -> DaoResult<String>,
) -> DaoResult<&'a mut EmployeeCredential> {
    if !docs.credentials.contains(employee_id) {
        if !docs.display.contains(employee_id) {
            return Err(DaoError::NotFound(format!("employee '{employee_id}'")));
        }
        docs.credentials
            .insert(EmployeeCredential::new(employee_id, initial_hash()?, now));
    }
    docs.credentials
        .get_mut(employee_id)
        .ok_or_else(|| DaoError::NotFound(format!("employee '{employee_id}'")))
}

pub(crate) fn mark_inactive(credential: &mut EmployeeCredential, now: DateTime<Utc>) {
    credential.status = CredentialStatus::Inactive;
    credential.deleted_at = Some(now);
    credential.clear_reset_token();
    credential.last_updated = now;
}

pub(crate) fn mark_active(credential: &mut EmployeeCredential, now: DateTime<Utc>) {
    credential.status = CredentialStatus::Active;
    credential.deleted_at = None;
    credential.last_updated = now;
}

fn token_expired(credential: &EmployeeCredential, now: DateTime<Utc>) -> bool {
    credential.reset_token_expires.is_none_or(|expires| expires <= now)
}

fn required_email(email: &str) -> DaoResult<String> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DaoError::Validation(format!("invalid email '{email}'")));
    }
    Ok(email.to_string())
}
