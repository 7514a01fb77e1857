pub mod blob;
pub mod connection;
pub mod models;

pub use blob::{BlobError, BlobStore, FsBlobStore, MemoryBlobStore, MongoBlobStore};
pub use connection::connect;
pub use models::ValidationError;
