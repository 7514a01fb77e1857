use std::sync::Arc;

use chrono::{DateTime, Utc};
use shiftboard_db::models::{
    Plan, Subscription, SubscriptionStatus, Tenant, TenantPatch, TenantSettings, Tenants,
    tenant::{is_valid_slug, normalize_slug},
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::clock::Clock;

/// Registry of organisations, kept in the single `tenants.json` document.
pub struct TenantDao {
    base: Arc<BaseDao>,
    clock: Arc<dyn Clock>,
    doc: Mutex<Option<Tenants>>,
}

impl TenantDao {
    pub fn new(base: Arc<BaseDao>, clock: Arc<dyn Clock>) -> Self {
        Self {
            base,
            clock,
            doc: Mutex::new(None),
        }
    }

    async fn read<T>(&self, f: impl FnOnce(&Tenants) -> T) -> DaoResult<T> {
        let mut guard = self.doc.lock().await;
        if guard.is_none() {
            *guard = Some(self.base.load(Tenants::KEY).await?.unwrap_or_default());
        }
        Ok(f(guard.get_or_insert_with(Tenants::default)))
    }

    /// Mutates a copy of the registry, persists it, then publishes it.
    async fn write<T>(&self, f: impl FnOnce(&mut Tenants) -> DaoResult<T>) -> DaoResult<T> {
        let mut guard = self.doc.lock().await;
        if guard.is_none() {
            *guard = Some(self.base.load(Tenants::KEY).await?.unwrap_or_default());
        }
        let mut working = guard.clone().unwrap_or_default();
        let value = f(&mut working)?;
        self.base.save(Tenants::KEY, &working).await?;
        *guard = Some(working);
        Ok(value)
    }

    pub async fn create(
        &self,
        name: String,
        slug: String,
        settings: Option<TenantSettings>,
    ) -> DaoResult<Tenant> {
        let name = required_name(name)?;
        if !is_valid_slug(&slug) {
            return Err(DaoError::Validation(format!(
                "slug '{slug}' must match [a-z0-9-]+"
            )));
        }

        let tenant = Tenant {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: self.clock.now(),
            is_active: true,
            settings: settings.unwrap_or_default(),
            subscription: None,
            contact_email: None,
            contact_phone: None,
        };

        let tenant = self
            .write(move |tenants| {
                if tenants.slug_taken(&tenant.slug, None) {
                    return Err(DaoError::DuplicateSlug(tenant.slug));
                }
                tenants.tenants.push(tenant.clone());
                Ok(tenant)
            })
            .await?;

        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Created tenant");
        Ok(tenant)
    }

    /// Self-service signup: inactive until an operator activates it.
    pub async fn create_pending(
        &self,
        name: String,
        slug: String,
        plan: Plan,
        contact_email: Option<String>,
        contact_phone: Option<String>,
    ) -> DaoResult<Tenant> {
        let name = required_name(name)?;
        let slug = normalize_slug(&slug);
        if slug.is_empty() {
            return Err(DaoError::Validation(
                "slug is empty after normalisation".to_string(),
            ));
        }

        let now = self.clock.now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: now,
            is_active: false,
            settings: TenantSettings::default(),
            subscription: Some(Subscription::pending(plan, now)),
            contact_email,
            contact_phone,
        };

        let tenant = self
            .write(move |tenants| {
                if tenants.slug_taken(&tenant.slug, None) {
                    return Err(DaoError::DuplicateSlug(tenant.slug));
                }
                tenants.tenants.push(tenant.clone());
                Ok(tenant)
            })
            .await?;

        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Created pending tenant");
        Ok(tenant)
    }

    pub async fn update(&self, tenant_id: Uuid, patch: TenantPatch) -> DaoResult<Tenant> {
        let now = self.clock.now();
        let tenant = self
            .write(|tenants| {
                if let Some(slug) = &patch.slug {
                    if !is_valid_slug(slug) {
                        return Err(DaoError::Validation(format!(
                            "slug '{slug}' must match [a-z0-9-]+"
                        )));
                    }
                    if tenants.slug_taken(slug, Some(tenant_id)) {
                        return Err(DaoError::DuplicateSlug(slug.clone()));
                    }
                }
                let tenant = tenants
                    .get_mut(tenant_id)
                    .ok_or_else(|| DaoError::NotFound(format!("tenant {tenant_id}")))?;
                apply_patch(tenant, patch, now)?;
                Ok(tenant.clone())
            })
            .await?;

        info!(
            tenant_id = %tenant.id,
            is_active = tenant.is_active,
            "Updated tenant"
        );
        Ok(tenant)
    }

    pub async fn get(&self, tenant_id: Uuid) -> DaoResult<Tenant> {
        self.read(|tenants| tenants.get(tenant_id).cloned())
            .await?
            .ok_or_else(|| DaoError::NotFound(format!("tenant {tenant_id}")))
    }

    pub async fn exists(&self, tenant_id: Uuid) -> DaoResult<bool> {
        self.read(|tenants| tenants.get(tenant_id).is_some()).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> DaoResult<Tenant> {
        self.read(|tenants| tenants.find_by_slug(slug).cloned())
            .await?
            .ok_or_else(|| DaoError::NotFound(format!("tenant slug '{slug}'")))
    }

    pub async fn list(&self) -> DaoResult<Vec<Tenant>> {
        self.read(|tenants| tenants.tenants.clone()).await
    }

    /// Soft delete. Deactivating an inactive tenant is a no-op.
    pub async fn deactivate(&self, tenant_id: Uuid) -> DaoResult<Tenant> {
        let tenant = self.get(tenant_id).await?;
        if !tenant.is_active {
            return Ok(tenant);
        }
        self.update(
            tenant_id,
            TenantPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_subscription_plan(&self, tenant_id: Uuid, plan: Plan) -> DaoResult<Tenant> {
        self.update(
            tenant_id,
            TenantPatch {
                plan: Some(plan),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn days_remaining(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> DaoResult<Option<i64>> {
        Ok(self.get(tenant_id).await?.days_remaining(now))
    }
}

fn required_name(name: String) -> DaoResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DaoError::Validation("tenant name is required".to_string()));
    }
    Ok(name)
}

/// Field updates plus the subscription transitions:
/// activation starts a billing period, deactivation clears it, and an
/// active tenant whose plan changed (or that has no expiry yet) gets its
/// expiry recomputed.
fn apply_patch(tenant: &mut Tenant, patch: TenantPatch, now: DateTime<Utc>) -> DaoResult<()> {
    let was_active = tenant.is_active;

    if let Some(name) = patch.name {
        tenant.name = required_name(name)?;
    }
    if let Some(slug) = patch.slug {
        tenant.slug = slug;
    }
    if let Some(settings) = patch.settings {
        tenant.settings.apply(settings);
    }
    if patch.contact_email.is_some() {
        tenant.contact_email = patch.contact_email;
    }
    if patch.contact_phone.is_some() {
        tenant.contact_phone = patch.contact_phone;
    }

    let mut plan_changed = false;
    if let Some(plan) = patch.plan {
        match tenant.subscription.as_mut() {
            Some(sub) => {
                plan_changed = sub.plan != plan;
                sub.plan = plan;
            }
            None => {
                tenant.subscription = Some(Subscription::pending(plan, now));
                plan_changed = true;
            }
        }
    }

    if let Some(active) = patch.is_active {
        tenant.is_active = active;
    }

    let Some(sub) = tenant.subscription.as_mut() else {
        return Ok(());
    };
    match (was_active, tenant.is_active) {
        (false, true) => sub.activate(now),
        (true, false) => sub.suspend(),
        (true, true) if plan_changed || sub.expires_at.is_none() => {
            sub.status = SubscriptionStatus::Active;
            sub.recompute_expiry(now);
        }
        _ => {}
    }
    Ok(())
}
