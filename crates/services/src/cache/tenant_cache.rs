use std::sync::Arc;

use bitflags::bitflags;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use shiftboard_db::models::{
    EmployeeCredentials, ModificationLedger, RosterSnapshot, ScheduleRequests, ShiftDefinitions,
    SourceLinks, TenantFlags, tenant_document_key,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::dao::base::{BaseDao, DaoError, DaoResult};
use crate::dao::tenant::TenantDao;
use crate::roster::merge;

bitflags! {
    /// Per-tenant documents touched by a write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DocSet: u8 {
        const SOURCE = 1;
        const OVERRIDE = 1 << 1;
        const LEDGER = 1 << 2;
        const REQUESTS = 1 << 3;
        const SHIFTS = 1 << 4;
        const CREDENTIALS = 1 << 5;
        const FLAGS = 1 << 6;
        const LINKS = 1 << 7;
    }
}

impl DocSet {
    /// Documents whose absence means "empty"; they are deleted instead of
    /// written once emptied.
    const ERASABLE: DocSet = DocSet::SOURCE
        .union(DocSet::OVERRIDE)
        .union(DocSet::LEDGER)
        .union(DocSet::REQUESTS)
        .union(DocSet::LINKS);

    fn document(self) -> &'static str {
        if self == DocSet::SOURCE {
            RosterSnapshot::SOURCE_DOCUMENT
        } else if self == DocSet::OVERRIDE {
            RosterSnapshot::OVERRIDE_DOCUMENT
        } else if self == DocSet::LEDGER {
            ModificationLedger::DOCUMENT
        } else if self == DocSet::REQUESTS {
            ScheduleRequests::DOCUMENT
        } else if self == DocSet::SHIFTS {
            ShiftDefinitions::DOCUMENT
        } else if self == DocSet::CREDENTIALS {
            EmployeeCredentials::DOCUMENT
        } else if self == DocSet::FLAGS {
            TenantFlags::DOCUMENT
        } else {
            SourceLinks::DOCUMENT
        }
    }
}

/// Everything one tenant owns, plus the merged display derived from it.
#[derive(Debug, Clone, Default)]
pub struct TenantDocs {
    pub source: RosterSnapshot,
    pub overrides: RosterSnapshot,
    pub ledger: ModificationLedger,
    pub requests: ScheduleRequests,
    pub shifts: ShiftDefinitions,
    pub credentials: EmployeeCredentials,
    pub flags: TenantFlags,
    pub links: SourceLinks,
    /// Merge of `source` and `overrides` as of the last commit.
    pub display: Arc<RosterSnapshot>,
}

impl TenantDocs {
    /// Serialised form of one document, `None` when it should not exist.
    fn encode(&self, doc: DocSet) -> DaoResult<Option<Vec<u8>>> {
        fn bytes<T: Serialize>(empty: bool, value: &T) -> DaoResult<(bool, Vec<u8>)> {
            Ok((empty, serde_json::to_vec_pretty(value)?))
        }

        let (empty, encoded) = if doc == DocSet::SOURCE {
            bytes(self.source.is_empty(), &self.source)?
        } else if doc == DocSet::OVERRIDE {
            bytes(self.overrides.is_empty(), &self.overrides)?
        } else if doc == DocSet::LEDGER {
            bytes(self.ledger.is_empty(), &self.ledger)?
        } else if doc == DocSet::REQUESTS {
            bytes(self.requests.is_empty(), &self.requests)?
        } else if doc == DocSet::SHIFTS {
            bytes(false, &self.shifts)?
        } else if doc == DocSet::CREDENTIALS {
            bytes(false, &self.credentials)?
        } else if doc == DocSet::FLAGS {
            bytes(false, &self.flags)?
        } else {
            bytes(self.links.is_empty(), &self.links)?
        };

        if empty && DocSet::ERASABLE.contains(doc) {
            Ok(None)
        } else {
            Ok(Some(encoded))
        }
    }
}

struct TenantSlot {
    docs: Mutex<Option<TenantDocs>>,
    display: RwLock<Option<Arc<RosterSnapshot>>>,
}

impl TenantSlot {
    fn new() -> Self {
        Self {
            docs: Mutex::new(None),
            display: RwLock::new(None),
        }
    }
}

/// Lazily loaded, write-through cache of every tenant's documents.
///
/// Writers of one tenant are serialised by the slot's async mutex and work on
/// a clone; nothing becomes visible in the cache until every touched document
/// has been persisted. Readers of the merged display only take a short
/// `RwLock` read to clone an `Arc`.
pub struct TenantCache {
    base: Arc<BaseDao>,
    tenants: Arc<TenantDao>,
    slots: DashMap<Uuid, Arc<TenantSlot>>,
}

impl TenantCache {
    pub fn new(base: Arc<BaseDao>, tenants: Arc<TenantDao>) -> Self {
        Self {
            base,
            tenants,
            slots: DashMap::new(),
        }
    }

    async fn slot(&self, tenant_id: Uuid) -> DaoResult<Arc<TenantSlot>> {
        if let Some(slot) = self.slots.get(&tenant_id) {
            return Ok(slot.clone());
        }
        if !self.tenants.exists(tenant_id).await? {
            return Err(DaoError::NotFound(format!("tenant {tenant_id}")));
        }
        Ok(self
            .slots
            .entry(tenant_id)
            .or_insert_with(|| Arc::new(TenantSlot::new()))
            .clone())
    }

    async fn load(&self, tenant_id: Uuid) -> DaoResult<TenantDocs> {
        let key = |doc: &str| tenant_document_key(tenant_id, doc);

        let source: RosterSnapshot = self
            .base
            .load(&key(RosterSnapshot::SOURCE_DOCUMENT))
            .await?
            .unwrap_or_default();
        let overrides: RosterSnapshot = self
            .base
            .load(&key(RosterSnapshot::OVERRIDE_DOCUMENT))
            .await?
            .unwrap_or_default();
        let display = Arc::new(merge(&source, &overrides)?);

        let docs = TenantDocs {
            ledger: self
                .base
                .load(&key(ModificationLedger::DOCUMENT))
                .await?
                .unwrap_or_default(),
            requests: self
                .base
                .load(&key(ScheduleRequests::DOCUMENT))
                .await?
                .unwrap_or_default(),
            shifts: self
                .base
                .load(&key(ShiftDefinitions::DOCUMENT))
                .await?
                .unwrap_or_default(),
            credentials: self
                .base
                .load(&key(EmployeeCredentials::DOCUMENT))
                .await?
                .unwrap_or_default(),
            flags: self
                .base
                .load(&key(TenantFlags::DOCUMENT))
                .await?
                .unwrap_or_default(),
            links: self
                .base
                .load(&key(SourceLinks::DOCUMENT))
                .await?
                .unwrap_or_default(),
            source,
            overrides,
            display,
        };

        info!(
            %tenant_id,
            employees = docs.display.employee_count(),
            "Loaded tenant documents"
        );
        Ok(docs)
    }

    async fn loaded<'a>(
        &self,
        tenant_id: Uuid,
        slot: &'a TenantSlot,
    ) -> DaoResult<tokio::sync::MutexGuard<'a, Option<TenantDocs>>> {
        let mut guard = slot.docs.lock().await;
        if guard.is_none() {
            let docs = self.load(tenant_id).await?;
            *slot.display.write() = Some(docs.display.clone());
            *guard = Some(docs);
        }
        Ok(guard)
    }

    /// Runs `f` against the committed documents of `tenant_id`.
    pub async fn read<T>(
        &self,
        tenant_id: Uuid,
        f: impl FnOnce(&TenantDocs) -> T,
    ) -> DaoResult<T> {
        let slot = self.slot(tenant_id).await?;
        let guard = self.loaded(tenant_id, &slot).await?;
        match guard.as_ref() {
            Some(docs) => Ok(f(docs)),
            None => Err(DaoError::NotFound(format!("tenant {tenant_id}"))),
        }
    }

    /// Current merged snapshot. Does not wait for writers once loaded.
    pub async fn display(&self, tenant_id: Uuid) -> DaoResult<Arc<RosterSnapshot>> {
        let slot = self.slot(tenant_id).await?;
        if let Some(display) = slot.display.read().clone() {
            return Ok(display);
        }
        let guard = self.loaded(tenant_id, &slot).await?;
        match guard.as_ref() {
            Some(docs) => Ok(docs.display.clone()),
            None => Err(DaoError::NotFound(format!("tenant {tenant_id}"))),
        }
    }

    /// Applies `f` to a working copy of the tenant's documents.
    ///
    /// `f` reports which documents it changed. When it succeeds the display
    /// is re-merged if a roster changed, the changed documents are persisted
    /// and the copy replaces the cached state. If `f` fails, the merge is
    /// invalid, or any blob write fails, the cache is left untouched and the
    /// documents already written are restored.
    pub async fn write<T>(
        &self,
        tenant_id: Uuid,
        f: impl FnOnce(&mut TenantDocs) -> DaoResult<(T, DocSet)>,
    ) -> DaoResult<T> {
        let slot = self.slot(tenant_id).await?;
        let mut guard = self.loaded(tenant_id, &slot).await?;
        let Some(current) = guard.as_ref() else {
            return Err(DaoError::NotFound(format!("tenant {tenant_id}")));
        };

        let mut working = current.clone();
        let (value, touched) = f(&mut working)?;
        if touched.is_empty() {
            return Ok(value);
        }

        if touched.intersects(DocSet::SOURCE | DocSet::OVERRIDE) {
            working.display = Arc::new(merge(&working.source, &working.overrides)?);
        }

        self.persist(tenant_id, current, &working, touched).await?;

        let display = working.display.clone();
        *guard = Some(working);
        *slot.display.write() = Some(display);
        debug!(%tenant_id, ?touched, "Committed tenant write");
        Ok(value)
    }

    async fn persist(
        &self,
        tenant_id: Uuid,
        previous: &TenantDocs,
        next: &TenantDocs,
        touched: DocSet,
    ) -> DaoResult<()> {
        let mut written: Vec<(String, Option<Vec<u8>>)> = Vec::new();

        for doc in touched.iter() {
            let key = tenant_document_key(tenant_id, doc.document());
            let result = match next.encode(doc)? {
                Some(bytes) => self.base.put_raw(&key, bytes).await,
                None => self.base.delete(&key).await,
            };
            match result {
                Ok(()) => written.push((key, previous.encode(doc)?)),
                Err(err) => {
                    error!(%tenant_id, key = %key, error = %err, "Tenant write failed, rolling back");
                    self.rollback(written).await;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    async fn rollback(&self, written: Vec<(String, Option<Vec<u8>>)>) {
        for (key, previous) in written.into_iter().rev() {
            let result = match previous {
                Some(bytes) => self.base.put_raw(&key, bytes).await,
                None => self.base.delete(&key).await,
            };
            if let Err(err) = result {
                error!(key = %key, error = %err, "Rollback of blob failed");
            }
        }
    }

    /// Drops the cached state of one tenant; the next access reloads it.
    pub fn evict(&self, tenant_id: Uuid) {
        self.slots.remove(&tenant_id);
    }

    pub fn cached_tenants(&self) -> usize {
        self.slots.len()
    }
}
