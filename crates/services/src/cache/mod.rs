pub mod tenant_cache;

pub use tenant_cache::{DocSet, TenantCache, TenantDocs};
