use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::watch;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db;
use crate::message::MessageBus;
use crate::rooms::{RoomSummary, RoomWatcher};
use crate::utils::AppResult;

/// Per-resource monotonic version counters.
///
/// Incremented on every broadcast so clients can discard stale
/// out-of-order deliveries. DashMap keeps increments lock-free across
/// handlers.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment and return the new version; starts at 1 for an unseen
    /// resource.
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version, 0 if the resource has never been broadcast.
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared server state, cheap to clone (everything is Arc or a handle).
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | db | Embedded SurrealDB handle |
/// | message_bus | Server-to-client broadcast bus |
/// | jwt_service | Token issuing/validation |
/// | resource_versions | Version counters for watcher broadcasts |
/// | rooms_tx | Latest derived room list, republished by the watcher |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub message_bus: Arc<MessageBus>,
    pub jwt_service: Arc<JwtService>,
    pub resource_versions: Arc<ResourceVersions>,
    rooms_tx: Arc<watch::Sender<Vec<RoomSummary>>>,
}

impl ServerState {
    /// Initialize state: working directories, database, seeding.
    ///
    /// Background tasks are started separately through
    /// [`start_background_tasks`](Self::start_background_tasks).
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config.ensure_work_dir_structure()?;

        let database = db::connect(&config.database_dir()).await?;
        db::seed::seed_if_empty(&database).await?;

        Ok(Self::with_db(config.clone(), database))
    }

    /// Build state around an existing database handle. Used by tests with
    /// an in-memory engine.
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let (rooms_tx, _) = watch::channel(Vec::new());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            db,
            message_bus: Arc::new(MessageBus::default()),
            jwt_service,
            resource_versions: Arc::new(ResourceVersions::new()),
            rooms_tx: Arc::new(rooms_tx),
        }
    }

    /// Start background tasks. Must be called before `Server::run()`.
    ///
    /// Currently only the room watcher; it stops when the bus shutdown
    /// token fires.
    pub fn start_background_tasks(&self) {
        let watcher = RoomWatcher::new(
            self.db.clone(),
            self.message_bus.clone(),
            self.resource_versions.clone(),
            self.rooms_tx.as_ref().clone(),
        );
        let shutdown = self.message_bus.shutdown_token().clone();
        tokio::spawn(async move {
            if let Err(e) = watcher.run(shutdown).await {
                tracing::error!(error = %e, "Room watcher exited with error");
            }
        });
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn message_bus(&self) -> &Arc<MessageBus> {
        &self.message_bus
    }

    /// Receiver over the latest derived room list.
    pub fn subscribe_rooms(&self) -> watch::Receiver<Vec<RoomSummary>> {
        self.rooms_tx.subscribe()
    }
}
