//! Album repository trait and implementation

use crate::error::Result;
use crate::models::{Album, AlbumDraft};
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, Executor, Sqlite, SqlitePool};
use tracing::debug;

/// Album repository interface for data access operations
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Find an album by its ID
    ///
    /// # Returns
    /// - `Ok(Some(album))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn find_by_id(&self, album_id: i64) -> Result<Option<Album>>;

    /// List all albums ordered by title
    async fn find_all(&self) -> Result<Vec<Album>>;

    /// List an artist's albums, oldest release first
    async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Album>>;

    /// List albums whose artist's primary genre matches, ignoring case
    async fn find_by_genre(&self, genre: &str) -> Result<Vec<Album>>;

    /// Search album titles and artist names for a substring, ignoring case
    async fn search(&self, term: &str) -> Result<Vec<Album>>;

    /// Insert a new album
    ///
    /// # Returns
    /// The stored album, or `Ok(None)` if the insert yielded no identifier
    async fn insert(&self, draft: &AlbumDraft) -> Result<Option<Album>>;

    /// Replace an album's fields
    ///
    /// # Returns
    /// - `Ok(Some(album))` with the stored values
    /// - `Ok(None)` if no album has that ID
    async fn update(&self, album_id: i64, draft: &AlbumDraft) -> Result<Option<Album>>;

    /// Delete an album by ID, cascading to its plays
    ///
    /// # Returns
    /// - `Ok(true)` if album was deleted
    /// - `Ok(false)` if album was not found
    async fn delete(&self, album_id: i64) -> Result<bool>;
}

/// SQLite implementation of AlbumRepository
pub struct SqliteAlbumRepository {
    pool: SqlitePool,
}

impl SqliteAlbumRepository {
    /// Create a new SqliteAlbumRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn fetch_album<'e, E>(executor: E, album_id: i64) -> Result<Option<Album>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let album = query_as::<_, Album>(
        r#"
        SELECT al.album_id, al.artist_id, al.title, al.release_year, ar.name AS artist_name
        FROM albums al
        JOIN artists ar ON al.artist_id = ar.artist_id
        WHERE al.album_id = ?
        "#,
    )
    .bind(album_id)
    .fetch_optional(executor)
    .await?;

    Ok(album)
}

/// Escape `LIKE` wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl AlbumRepository for SqliteAlbumRepository {
    async fn find_by_id(&self, album_id: i64) -> Result<Option<Album>> {
        fetch_album(&self.pool, album_id).await
    }

    async fn find_all(&self) -> Result<Vec<Album>> {
        let albums = query_as::<_, Album>(
            r#"
            SELECT al.album_id, al.artist_id, al.title, al.release_year, ar.name AS artist_name
            FROM albums al
            JOIN artists ar ON al.artist_id = ar.artist_id
            ORDER BY al.title ASC, al.album_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Album>> {
        let albums = query_as::<_, Album>(
            r#"
            SELECT al.album_id, al.artist_id, al.title, al.release_year, ar.name AS artist_name
            FROM albums al
            JOIN artists ar ON al.artist_id = ar.artist_id
            WHERE al.artist_id = ?
            ORDER BY al.release_year ASC, al.title ASC
            "#,
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    async fn find_by_genre(&self, genre: &str) -> Result<Vec<Album>> {
        let albums = query_as::<_, Album>(
            r#"
            SELECT al.album_id, al.artist_id, al.title, al.release_year, ar.name AS artist_name
            FROM albums al
            JOIN artists ar ON al.artist_id = ar.artist_id
            WHERE LOWER(ar.primary_genre) = LOWER(?)
            ORDER BY al.title ASC, al.album_id ASC
            "#,
        )
        .bind(genre.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    async fn search(&self, term: &str) -> Result<Vec<Album>> {
        let pattern = format!("%{}%", escape_like(term.trim()));

        let albums = query_as::<_, Album>(
            r#"
            SELECT al.album_id, al.artist_id, al.title, al.release_year, ar.name AS artist_name
            FROM albums al
            JOIN artists ar ON al.artist_id = ar.artist_id
            WHERE al.title LIKE ? ESCAPE '\' OR ar.name LIKE ? ESCAPE '\'
            ORDER BY al.title ASC, al.album_id ASC
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(term, matches = albums.len(), "Searched albums");
        Ok(albums)
    }

    async fn insert(&self, draft: &AlbumDraft) -> Result<Option<Album>> {
        let mut conn = self.pool.acquire().await?;

        let album_id: Option<i64> = query_scalar(
            r#"
            INSERT INTO albums (artist_id, title, release_year)
            VALUES (?, ?, ?)
            RETURNING album_id
            "#,
        )
        .bind(draft.artist_id)
        .bind(&draft.title)
        .bind(draft.release_year)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(album_id) = album_id else {
            return Ok(None);
        };

        debug!(album_id, "Inserted album");
        fetch_album(&mut *conn, album_id).await
    }

    async fn update(&self, album_id: i64, draft: &AlbumDraft) -> Result<Option<Album>> {
        let mut conn = self.pool.acquire().await?;

        let result = query(
            r#"
            UPDATE albums
            SET artist_id = ?, title = ?, release_year = ?
            WHERE album_id = ?
            "#,
        )
        .bind(draft.artist_id)
        .bind(&draft.title)
        .bind(draft.release_year)
        .bind(album_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        fetch_album(&mut *conn, album_id).await
    }

    async fn delete(&self, album_id: i64) -> Result<bool> {
        let result = query("DELETE FROM albums WHERE album_id = ?")
            .bind(album_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
