use std::collections::BTreeMap;
use std::sync::Arc;

use shiftboard_db::models::ShiftDefinitions;
use tracing::info;
use uuid::Uuid;

use super::base::{DaoError, DaoResult};
use crate::cache::{DocSet, TenantCache};

pub struct ShiftDefinitionDao {
    cache: Arc<TenantCache>,
}

impl ShiftDefinitionDao {
    pub fn new(cache: Arc<TenantCache>) -> Self {
        Self { cache }
    }

    pub async fn list_all(&self, tenant_id: Uuid) -> DaoResult<BTreeMap<String, String>> {
        self.cache
            .read(tenant_id, |docs| docs.shifts.as_map().clone())
            .await
    }

    /// Adds or overwrites one code. Returns the normalised code.
    pub async fn upsert(&self, tenant_id: Uuid, code: &str, label: &str) -> DaoResult<String> {
        let (code, label) = normalize(code, label)?;
        let stored = code.clone();
        self.cache
            .write(tenant_id, move |docs| {
                docs.shifts.upsert(code, label);
                Ok(((), DocSet::SHIFTS))
            })
            .await?;
        info!(%tenant_id, code = %stored, "Upserted shift definition");
        Ok(stored)
    }

    /// Removes a code. Cells already holding it are left alone and render as
    /// a deleted shift. Returns whether the code existed.
    pub async fn delete(&self, tenant_id: Uuid, code: &str) -> DaoResult<bool> {
        let removed = self
            .cache
            .write(tenant_id, |docs| {
                let removed = docs.shifts.remove(code);
                let touched = if removed { DocSet::SHIFTS } else { DocSet::empty() };
                Ok((removed, touched))
            })
            .await?;
        if removed {
            info!(%tenant_id, code, "Deleted shift definition");
        }
        Ok(removed)
    }

    /// Replaces the whole vocabulary.
    pub async fn replace_all(
        &self,
        tenant_id: Uuid,
        definitions: BTreeMap<String, String>,
    ) -> DaoResult<BTreeMap<String, String>> {
        let mut replacement = ShiftDefinitions::empty();
        for (code, label) in &definitions {
            let (code, label) = normalize(code, label)?;
            replacement.upsert(code, label);
        }
        let map = replacement.as_map().clone();
        self.cache
            .write(tenant_id, move |docs| {
                docs.shifts = replacement;
                Ok(((), DocSet::SHIFTS))
            })
            .await?;
        info!(%tenant_id, count = map.len(), "Replaced shift definitions");
        Ok(map)
    }

    /// Display label for a stored cell value.
    pub async fn lookup(&self, tenant_id: Uuid, code: &str) -> DaoResult<String> {
        self.cache
            .read(tenant_id, |docs| docs.shifts.lookup(code).to_string())
            .await
    }
}

fn normalize(code: &str, label: &str) -> DaoResult<(String, String)> {
    let code = ShiftDefinitions::normalize_code(code);
    let label = label.trim().to_string();
    if code.is_empty() {
        return Err(DaoError::Validation("shift code is required".to_string()));
    }
    if label.is_empty() {
        return Err(DaoError::Validation(format!(
            "label for shift code '{code}' is required"
        )));
    }
    Ok((code, label))
}
