use async_trait::async_trait;
use bson::{Binary, DateTime, doc, spec::BinarySubtype};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BlobError, BlobStore, validate_key};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlobDocument {
    #[serde(rename = "_id")]
    key: String,
    data: Binary,
    updated_at: DateTime,
}

/// Keeps each blob as a single document keyed by `_id = key`.
///
/// `replace_one` with upsert swaps the whole document, which gives the
/// all-or-nothing `put` the trait requires.
pub struct MongoBlobStore {
    collection: Collection<BlobDocument>,
}

impl MongoBlobStore {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<BlobDocument>(collection_name),
        }
    }
}

#[async_trait]
impl BlobStore for MongoBlobStore {
    fn backend_name(&self) -> &str {
        "mongo"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        validate_key(key)?;
        let found = self.collection.find_one(doc! { "_id": key }).await?;
        Ok(found.map(|d| d.data.bytes))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        validate_key(key)?;
        let size = bytes.len();
        let document = BlobDocument {
            key: key.to_string(),
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            },
            updated_at: DateTime::now(),
        };
        self.collection
            .replace_one(doc! { "_id": key }, &document)
            .upsert(true)
            .await?;
        debug!(key, size, "Upserted blob");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.collection.delete_one(doc! { "_id": key }).await?;
        Ok(())
    }
}
