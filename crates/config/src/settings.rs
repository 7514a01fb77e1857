use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub storage: StorageSettings,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON documents under `storage.data_dir`.
    Fs,
    /// One document per blob in a MongoDB collection.
    Mongo,
    /// Process-local, lost on restart. Used by tests and demos.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: String,
    /// Upper bound for a single blob get/put/delete.
    pub io_timeout_ms: u64,
    pub database: DatabaseSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub collection: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialSettings {
    pub reset_token_ttl_hours: i64,
    pub reset_token_length: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("SHIFTBOARD"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("storage.backend", "fs")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.io_timeout_ms", 5000)?
            .set_default("storage.database.url", "mongodb://localhost:27017")?
            .set_default("storage.database.name", "shiftboard")?
            .set_default("storage.database.collection", "blobs")?
            .set_default("credentials.reset_token_ttl_hours", 24)?
            .set_default("credentials.reset_token_length", 32)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
