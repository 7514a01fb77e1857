use std::sync::Arc;
use std::time::Duration;

use shiftboard_config::Settings;
use shiftboard_db::BlobStore;
use shiftboard_services::{
    BaseDao, Clock, PasswordService, SystemClock, TenantCache,
    dao::{
        credential::CredentialDao, flags::TenantFlagsDao, request::RequestDao,
        roster::RosterDao, shift_definition::ShiftDefinitionDao, source_link::SourceLinkDao,
        tenant::TenantDao,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn BlobStore>,
    pub clock: Arc<dyn Clock>,
    pub cache: Arc<TenantCache>,
    pub tenants: Arc<TenantDao>,
    pub shifts: Arc<ShiftDefinitionDao>,
    pub credentials: Arc<CredentialDao>,
    pub roster: Arc<RosterDao>,
    pub requests: Arc<RequestDao>,
    pub flags: Arc<TenantFlagsDao>,
    pub source_links: Arc<SourceLinkDao>,
}

impl AppState {
    pub fn new(store: Arc<dyn BlobStore>, settings: Settings) -> Self {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn BlobStore>, settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let base = Arc::new(BaseDao::new(
            store.clone(),
            Duration::from_millis(settings.storage.io_timeout_ms),
        ));
        let passwords = Arc::new(PasswordService::new());

        let tenants = Arc::new(TenantDao::new(base.clone(), clock.clone()));
        let cache = Arc::new(TenantCache::new(base, tenants.clone()));
        let shifts = Arc::new(ShiftDefinitionDao::new(cache.clone()));
        let credentials = Arc::new(CredentialDao::new(
            cache.clone(),
            passwords.clone(),
            clock.clone(),
            settings.credentials.clone(),
        ));
        let roster = Arc::new(RosterDao::new(cache.clone(), passwords, clock.clone()));
        let requests = Arc::new(RequestDao::new(cache.clone(), clock.clone()));
        let flags = Arc::new(TenantFlagsDao::new(cache.clone()));
        let source_links = Arc::new(SourceLinkDao::new(cache.clone()));

        Self {
            settings,
            store,
            clock,
            cache,
            tenants,
            shifts,
            credentials,
            roster,
            requests,
            flags,
            source_links,
        }
    }
}
