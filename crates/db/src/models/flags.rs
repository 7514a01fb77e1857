use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantFlags {
    #[serde(default, alias = "autoSyncEnabled")]
    pub auto_sync_enabled: bool,
}

impl TenantFlags {
    pub const DOCUMENT: &'static str = "settings";
}
