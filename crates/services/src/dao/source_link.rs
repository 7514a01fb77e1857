use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::base::DaoResult;
use crate::cache::{DocSet, TenantCache};

/// Month → spreadsheet link recording where each imported month came from.
/// Survives a hard reset.
pub struct SourceLinkDao {
    cache: Arc<TenantCache>,
}

impl SourceLinkDao {
    pub fn new(cache: Arc<TenantCache>) -> Self {
        Self { cache }
    }

    pub async fn list(&self, tenant_id: Uuid) -> DaoResult<BTreeMap<String, String>> {
        self.cache
            .read(tenant_id, |docs| docs.links.as_map().clone())
            .await
    }

    pub async fn set(&self, tenant_id: Uuid, month: &str, link: &str) -> DaoResult<String> {
        let month = self
            .cache
            .write(tenant_id, |docs| {
                let month = docs.links.set(month, link)?;
                Ok((month, DocSet::LINKS))
            })
            .await?;
        info!(%tenant_id, month = %month, "Saved source link");
        Ok(month)
    }

    /// Returns whether a link was stored for `month`.
    pub async fn delete(&self, tenant_id: Uuid, month: &str) -> DaoResult<bool> {
        self.cache
            .write(tenant_id, |docs| {
                if docs.links.remove(month) {
                    Ok((true, DocSet::LINKS))
                } else {
                    Ok((false, DocSet::empty()))
                }
            })
            .await
    }
}
