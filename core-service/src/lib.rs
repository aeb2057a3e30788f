//! Core service façade and bootstrap helpers.
//!
//! This crate turns a [`CoreConfig`] into a ready-to-use [`CoreService`]: it
//! opens the SQLite catalog, runs the embedded migrations and wires the
//! repositories into the [`AlbumService`]. Hosts that want the core to own
//! logging call [`bootstrap_with_logging`] instead of [`bootstrap`].

pub mod album_service;
pub mod error;

pub use album_service::{AlbumService, ANONYMOUS_USER_ID};
pub use core_runtime::config::CoreConfig;
pub use error::{CoreError, Result, ValidationError};

use std::sync::Arc;

use core_library::db::{create_pool, DatabaseConfig};
use core_library::repositories::{
    AlbumPlayRepository, SqliteAlbumPlayRepository, SqliteAlbumRepository, SqliteArtistRepository,
};
use core_runtime::logging::{init_logging, strip_path};
use sqlx::SqlitePool;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    albums: AlbumService,
    plays: Arc<dyn AlbumPlayRepository>,
    pool: SqlitePool,
    config: Arc<CoreConfig>,
}

impl CoreService {
    /// Album browsing, album writes and play statistics.
    pub fn albums(&self) -> &AlbumService {
        &self.albums
    }

    /// Direct access to the play history.
    pub fn plays(&self) -> Arc<dyn AlbumPlayRepository> {
        Arc::clone(&self.plays)
    }

    /// The configuration the service was bootstrapped with.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Close the connection pool, waiting for borrowed connections to return.
    pub async fn shutdown(&self) {
        self.pool.close().await;
        info!("Core service shut down");
    }
}

/// Open the catalog and build the service graph.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap, CoreConfig};
///
/// let config = CoreConfig::builder().database_path("catalog.db").build()?;
/// let core = bootstrap(config).await?;
/// let trending = core.albums().get_default_trending_albums().await?;
/// # Ok(())
/// # }
/// ```
pub async fn bootstrap(config: CoreConfig) -> Result<CoreService> {
    config.validate()?;

    let db_config = database_config(&config);
    match &config.database_path {
        Some(path) => info!(
            database = strip_path(&path.to_string_lossy()),
            max_connections = config.max_connections,
            "Opening catalog database"
        ),
        None => info!("Opening in-memory catalog database"),
    }

    let pool = create_pool(db_config).await?;

    let album_repository = Arc::new(SqliteAlbumRepository::new(pool.clone()));
    let artist_repository = Arc::new(SqliteArtistRepository::new(pool.clone()));
    let play_repository: Arc<dyn AlbumPlayRepository> =
        Arc::new(SqliteAlbumPlayRepository::new(pool.clone()));

    let albums = AlbumService::new(
        album_repository,
        artist_repository,
        Arc::clone(&play_repository),
    )
    .with_default_trending_days(config.default_trending_days);

    info!("Core service ready");
    Ok(CoreService {
        albums,
        plays: play_repository,
        pool,
        config: Arc::new(config),
    })
}

/// Install the global tracing subscriber described by `config.logging`, then
/// [`bootstrap`].
///
/// # Errors
/// `CoreError::InitializationFailed` if a global subscriber is already set
pub async fn bootstrap_with_logging(config: CoreConfig) -> Result<CoreService> {
    init_logging(config.logging.clone())
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    bootstrap(config).await
}

fn database_config(config: &CoreConfig) -> DatabaseConfig {
    let base = match &config.database_path {
        Some(path) => DatabaseConfig::new(path.clone()),
        None => DatabaseConfig::in_memory(),
    };

    base.max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}
