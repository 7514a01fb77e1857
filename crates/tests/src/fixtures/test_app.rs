use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use shiftboard_api::{build_router, state::AppState};
use shiftboard_config::{
    AppSettings, CredentialSettings, DatabaseSettings, Settings, StorageBackend, StorageSettings,
};
use shiftboard_db::{BlobStore, MemoryBlobStore};
use shiftboard_services::ManualClock;
use tokio::net::TcpListener;

/// Header used by every request that records who made a change.
pub const ACTOR: &str = "admin@test";

/// Instant every test clock starts at.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

/// DAOs wired against an in-memory store and a pinned clock, without HTTP.
pub struct TestCore {
    pub state: AppState,
    pub store: Arc<MemoryBlobStore>,
    pub clock: Arc<ManualClock>,
}

impl TestCore {
    pub fn new() -> Self {
        let store = Arc::new(MemoryBlobStore::new());
        let clock = Arc::new(ManualClock::new(epoch()));
        let state = AppState::with_clock(store.clone(), test_settings(), clock.clone());
        Self {
            state,
            store,
            clock,
        }
    }

    /// A fresh state over the same store, as after a process restart.
    pub fn restart(&self) -> AppState {
        AppState::with_clock(self.store.clone(), test_settings(), self.clock.clone())
    }
}

/// State over an arbitrary backend, e.g. a filesystem store in a temp dir.
pub fn state_over(store: Arc<dyn BlobStore>, clock: Arc<ManualClock>) -> AppState {
    AppState::with_clock(store, test_settings(), clock)
}

/// A running test server backed by an in-memory blob store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub store: Arc<MemoryBlobStore>,
    pub clock: Arc<ManualClock>,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test server on a random local port.
    pub async fn spawn() -> Self {
        let core = TestCore::new();
        let app = build_router(core.state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            store: core.store,
            clock: core.clock,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// POST carrying the actor header.
    pub fn actor_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.post(path)
            .header(shiftboard_api::extractors::actor::ACTOR_HEADER, ACTOR)
    }
}

pub fn test_settings() -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        },
        storage: StorageSettings {
            backend: StorageBackend::Memory,
            data_dir: "data".to_string(),
            io_timeout_ms: 2000,
            database: DatabaseSettings {
                url: "mongodb://localhost:27017".to_string(),
                name: "shiftboard_test".to_string(),
                collection: "blobs".to_string(),
                max_pool_size: Some(5),
                min_pool_size: Some(1),
            },
        },
        credentials: CredentialSettings {
            reset_token_ttl_hours: 24,
            reset_token_length: 32,
        },
    }
}

impl Default for TestCore {
    fn default() -> Self {
        Self::new()
    }
}
