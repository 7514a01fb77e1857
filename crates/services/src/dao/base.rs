use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use shiftboard_db::{BlobError, BlobStore, ValidationError};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Slug already taken: {0}")]
    DuplicateSlug(String),
    #[error("Validation: {0}")]
    Validation(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Reset token expired")]
    TokenExpired,
    #[error("Reset token invalid")]
    TokenInvalid,
    #[error("Credential inactive for employee {0}")]
    InactiveCredential(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Storage operation timed out")]
    Timeout,
    #[error("Storage error: {0}")]
    Blob(#[from] BlobError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Password hash error: {0}")]
    Hash(String),
}

impl From<ValidationError> for DaoError {
    fn from(err: ValidationError) -> Self {
        DaoError::Validation(err.0)
    }
}

pub type DaoResult<T> = Result<T, DaoError>;

/// Typed JSON documents on top of a [`BlobStore`], every call bounded by the
/// configured I/O timeout.
pub struct BaseDao {
    store: Arc<dyn BlobStore>,
    io_timeout: Duration,
}

impl BaseDao {
    pub fn new(store: Arc<dyn BlobStore>, io_timeout: Duration) -> Self {
        Self { store, io_timeout }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub async fn get_raw(&self, key: &str) -> DaoResult<Option<Vec<u8>>> {
        match timeout(self.io_timeout, self.store.get(key)).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(key, "Blob read timed out");
                Err(DaoError::Timeout)
            }
        }
    }

    pub async fn put_raw(&self, key: &str, bytes: Vec<u8>) -> DaoResult<()> {
        match timeout(self.io_timeout, self.store.put(key, bytes)).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(key, "Blob write timed out");
                Err(DaoError::Timeout)
            }
        }
    }

    pub async fn delete(&self, key: &str) -> DaoResult<()> {
        match timeout(self.io_timeout, self.store.delete(key)).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(key, "Blob delete timed out");
                Err(DaoError::Timeout)
            }
        }
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> DaoResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)?;
                debug!(key, size = bytes.len(), "Loaded document");
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> DaoResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.put_raw(key, bytes).await
    }
}
