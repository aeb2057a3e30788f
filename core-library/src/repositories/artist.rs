//! Artist repository trait and implementation

use crate::error::Result;
use crate::models::Artist;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Artist repository interface for data access operations
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find an artist by its ID
    ///
    /// # Returns
    /// - `Ok(Some(artist))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn find_by_id(&self, artist_id: i64) -> Result<Option<Artist>>;

    /// List all artists ordered by name
    async fn find_all(&self) -> Result<Vec<Artist>>;

    /// Insert a new artist and return it with its generated ID
    async fn insert(&self, name: &str, primary_genre: Option<&str>) -> Result<Artist>;
}

/// SQLite implementation of ArtistRepository
pub struct SqliteArtistRepository {
    pool: SqlitePool,
}

impl SqliteArtistRepository {
    /// Create a new SqliteArtistRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtistRepository for SqliteArtistRepository {
    async fn find_by_id(&self, artist_id: i64) -> Result<Option<Artist>> {
        let artist = query_as::<_, Artist>(
            "SELECT artist_id, name, primary_genre FROM artists WHERE artist_id = ?",
        )
        .bind(artist_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    async fn find_all(&self) -> Result<Vec<Artist>> {
        let artists = query_as::<_, Artist>(
            "SELECT artist_id, name, primary_genre FROM artists ORDER BY name ASC, artist_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }

    async fn insert(&self, name: &str, primary_genre: Option<&str>) -> Result<Artist> {
        let artist = query_as::<_, Artist>(
            r#"
            INSERT INTO artists (name, primary_genre)
            VALUES (?, ?)
            RETURNING artist_id, name, primary_genre
            "#,
        )
        .bind(name)
        .bind(primary_genre)
        .fetch_one(&self.pool)
        .await?;

        debug!(artist_id = artist.artist_id, "Inserted artist");
        Ok(artist)
    }
}
