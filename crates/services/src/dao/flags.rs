use std::sync::Arc;

use shiftboard_db::models::TenantFlags;
use tracing::info;
use uuid::Uuid;

use super::base::DaoResult;
use crate::cache::{DocSet, TenantCache};

/// Tenant-scoped switches such as automatic source sync.
pub struct TenantFlagsDao {
    cache: Arc<TenantCache>,
}

impl TenantFlagsDao {
    pub fn new(cache: Arc<TenantCache>) -> Self {
        Self { cache }
    }

    pub async fn get(&self, tenant_id: Uuid) -> DaoResult<TenantFlags> {
        self.cache.read(tenant_id, |docs| docs.flags.clone()).await
    }

    pub async fn set_auto_sync(&self, tenant_id: Uuid, enabled: bool) -> DaoResult<TenantFlags> {
        let flags = self
            .cache
            .write(tenant_id, |docs| {
                docs.flags.auto_sync_enabled = enabled;
                Ok((docs.flags.clone(), DocSet::FLAGS))
            })
            .await?;
        info!(%tenant_id, enabled, "Set auto sync");
        Ok(flags)
    }
}
