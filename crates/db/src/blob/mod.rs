pub mod fs;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use thiserror::Error;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use mongo::MongoBlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),
    #[error("Write rejected for {0}")]
    Rejected(String),
}

/// Narrow persistence seam: named documents as opaque bytes.
///
/// Keys are `/`-separated relative paths such as
/// `tenants/<tenant_id>/source_roster.json`. Backends must make `put`
/// replace the whole value; partial writes must never become visible.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend_name(&self) -> &str;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError>;
    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), BlobError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}
