use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::{BlobError, BlobStore, validate_key};

/// In-memory blob store for tests and throwaway demos.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Vec<u8>>,
    /// Puts to keys containing this fragment fail with `BlobError::Rejected`.
    reject_fragment: Mutex<Option<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes to matching keys fail. `None` clears it.
    pub fn reject_writes_matching(&self, fragment: Option<&str>) {
        *self.reject_fragment.lock() = fragment.map(str::to_string);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.get(key).map(|b| b.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        validate_key(key)?;
        Ok(self.raw(key))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        validate_key(key)?;
        if let Some(fragment) = self.reject_fragment.lock().as_deref() {
            if key.contains(fragment) {
                return Err(BlobError::Rejected(key.to_string()));
            }
        }
        self.blobs.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.blobs.remove(key);
        Ok(())
    }
}
