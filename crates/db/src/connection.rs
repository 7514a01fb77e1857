use std::sync::Arc;

use mongodb::{Client, options::ClientOptions};
use shiftboard_config::{Settings, StorageBackend};
use tracing::info;

use crate::blob::{BlobError, BlobStore, FsBlobStore, MemoryBlobStore, MongoBlobStore};

/// Builds the blob store selected by `storage.backend`.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn BlobStore>, BlobError> {
    let storage = &settings.storage;
    match storage.backend {
        StorageBackend::Fs => {
            info!(data_dir = %storage.data_dir, "Using filesystem blob store");
            Ok(Arc::new(FsBlobStore::new(&storage.data_dir)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory blob store");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
        StorageBackend::Mongo => {
            let mut client_options = ClientOptions::parse(&storage.database.url).await?;

            if let Some(max_pool) = storage.database.max_pool_size {
                client_options.max_pool_size = Some(max_pool);
            }
            if let Some(min_pool) = storage.database.min_pool_size {
                client_options.min_pool_size = Some(min_pool);
            }

            let client = Client::with_options(client_options)?;

            // Verify connection
            client
                .database("admin")
                .run_command(bson::doc! { "ping": 1 })
                .await?;

            info!(
                db = %storage.database.name,
                collection = %storage.database.collection,
                "Connected to MongoDB"
            );

            let db = client.database(&storage.database.name);
            Ok(Arc::new(MongoBlobStore::new(&db, &storage.database.collection)))
        }
    }
}
