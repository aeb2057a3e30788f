//! Play-history repository trait and implementation
//!
//! Besides plain insert/read/delete of play events, this repository owns the
//! two aggregations the catalog exposes:
//!
//! - **Trending albums**: plays per album inside a trailing window of 1 to 30
//!   days, top 10, ranked from 1. Albums without plays in the window still
//!   take part with a count of zero.
//! - **Album play count**: lifetime plays of one album, zero when it was
//!   never played.

use crate::error::Result;
use crate::models::{AlbumPlay, AlbumPlayCount, TrendingAlbum};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{query, query_as, query_scalar, Executor, FromRow, Sqlite, SqlitePool};
use tracing::{debug, warn};

/// Shortest trending window in days
pub const MIN_TRENDING_DAYS: i32 = 1;
/// Longest trending window in days
pub const MAX_TRENDING_DAYS: i32 = 30;
/// Number of albums a trending query returns at most
pub const TRENDING_LIMIT: i64 = 10;

/// Play-history repository interface
#[async_trait]
pub trait AlbumPlayRepository: Send + Sync {
    /// Rank albums by plays within the last `days` days
    ///
    /// `days` is clamped to [`MIN_TRENDING_DAYS`, `MAX_TRENDING_DAYS`]. The
    /// window starts at midnight UTC `days` days before today. At most
    /// [`TRENDING_LIMIT`] entries are returned, ordered by play count
    /// descending; equal counts keep ascending album ID order.
    async fn get_trending_albums(&self, days: i32) -> Result<Vec<TrendingAlbum>>;

    /// A user's plays, most recent first
    ///
    /// `limit` is passed through unchanged.
    async fn get_user_recent_plays(&self, user_id: i64, limit: u32) -> Result<Vec<AlbumPlay>>;

    /// Every play of an album, most recent first
    async fn get_album_plays(&self, album_id: i64) -> Result<Vec<AlbumPlay>>;

    /// Lifetime play total of an album
    ///
    /// # Returns
    /// - `Ok(Some(count))`, with `play_count == 0` for an album nobody played
    /// - `Ok(None)` if the album does not exist
    async fn get_album_play_count(&self, album_id: i64) -> Result<Option<AlbumPlayCount>>;

    /// Find a play by its ID, enriched with album title and artist name
    async fn get_play_by_id(&self, play_id: i64) -> Result<Option<AlbumPlay>>;

    /// Record a play
    ///
    /// Only `user_id`, `album_id`, `played_at` and `completed` are written.
    ///
    /// # Returns
    /// The stored play read back by its new ID, or `Ok(None)` if the insert
    /// yielded no identifier
    async fn create_play(&self, play: &AlbumPlay) -> Result<Option<AlbumPlay>>;

    /// Delete a play by ID
    ///
    /// # Returns
    /// - `Ok(true)` if a row was removed
    /// - `Ok(false)` if no play has that ID
    async fn delete_play(&self, play_id: i64) -> Result<bool>;

    /// Count all recorded plays
    async fn count_plays(&self) -> Result<i64>;
}

/// Clamp a requested trending window to the supported range
pub fn clamp_trending_days(days: i32) -> i32 {
    days.clamp(MIN_TRENDING_DAYS, MAX_TRENDING_DAYS)
}

/// First instant counted by a `days`-day window ending today
pub fn trending_window_start(days: i32, today: NaiveDate) -> NaiveDateTime {
    (today - Duration::days(i64::from(days))).and_time(NaiveTime::MIN)
}

#[derive(Debug, FromRow)]
struct TrendingRow {
    album_id: i64,
    artist_id: i64,
    title: String,
    release_year: Option<i32>,
    artist_name: String,
    recent_play_count: i64,
}

impl TrendingRow {
    fn ranked(self, trending_rank: u32) -> TrendingAlbum {
        TrendingAlbum {
            album_id: self.album_id,
            artist_id: self.artist_id,
            title: self.title,
            release_year: self.release_year,
            artist_name: self.artist_name,
            recent_play_count: self.recent_play_count,
            trending_rank,
        }
    }
}

/// SQLite implementation of AlbumPlayRepository
pub struct SqliteAlbumPlayRepository {
    pool: SqlitePool,
}

impl SqliteAlbumPlayRepository {
    /// Create a new SqliteAlbumPlayRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn fetch_play<'e, E>(executor: E, play_id: i64) -> Result<Option<AlbumPlay>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let play = query_as::<_, AlbumPlay>(
        r#"
        SELECT ap.play_id, ap.user_id, ap.album_id, ap.played_at, ap.completed,
               al.title AS album_title, ar.name AS artist_name
        FROM album_plays ap
        JOIN albums al ON ap.album_id = al.album_id
        JOIN artists ar ON al.artist_id = ar.artist_id
        WHERE ap.play_id = ?
        "#,
    )
    .bind(play_id)
    .fetch_optional(executor)
    .await?;

    Ok(play)
}

#[async_trait]
impl AlbumPlayRepository for SqliteAlbumPlayRepository {
    async fn get_trending_albums(&self, days: i32) -> Result<Vec<TrendingAlbum>> {
        let days = clamp_trending_days(days);
        let window_start = trending_window_start(days, Utc::now().date_naive());

        let rows = query_as::<_, TrendingRow>(
            r#"
            SELECT al.album_id, al.artist_id, al.title, al.release_year, ar.name AS artist_name,
                   COUNT(ap.play_id) AS recent_play_count
            FROM albums al
            JOIN artists ar ON al.artist_id = ar.artist_id
            LEFT JOIN album_plays ap
                   ON al.album_id = ap.album_id AND ap.played_at >= ?
            GROUP BY al.album_id, al.artist_id, al.title, al.release_year, ar.name
            ORDER BY recent_play_count DESC, al.album_id ASC
            LIMIT ?
            "#,
        )
        .bind(window_start)
        .bind(TRENDING_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, days, "Failed to fetch trending albums");
            e
        })?;

        debug!(days, %window_start, rows = rows.len(), "Fetched trending albums");

        Ok(rows
            .into_iter()
            .zip(1u32..)
            .map(|(row, rank)| row.ranked(rank))
            .collect())
    }

    async fn get_user_recent_plays(&self, user_id: i64, limit: u32) -> Result<Vec<AlbumPlay>> {
        let plays = query_as::<_, AlbumPlay>(
            r#"
            SELECT ap.play_id, ap.user_id, ap.album_id, ap.played_at, ap.completed,
                   al.title AS album_title, ar.name AS artist_name
            FROM album_plays ap
            JOIN albums al ON ap.album_id = al.album_id
            JOIN artists ar ON al.artist_id = ar.artist_id
            WHERE ap.user_id = ?
            ORDER BY ap.played_at DESC, ap.play_id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(plays)
    }

    async fn get_album_plays(&self, album_id: i64) -> Result<Vec<AlbumPlay>> {
        let plays = query_as::<_, AlbumPlay>(
            r#"
            SELECT ap.play_id, ap.user_id, ap.album_id, ap.played_at, ap.completed,
                   al.title AS album_title, ar.name AS artist_name
            FROM album_plays ap
            JOIN albums al ON ap.album_id = al.album_id
            JOIN artists ar ON al.artist_id = ar.artist_id
            WHERE ap.album_id = ?
            ORDER BY ap.played_at DESC, ap.play_id DESC
            "#,
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(plays)
    }

    async fn get_album_play_count(&self, album_id: i64) -> Result<Option<AlbumPlayCount>> {
        let count = query_as::<_, AlbumPlayCount>(
            r#"
            SELECT al.album_id, al.title AS album_title, ar.name AS artist_name,
                   COUNT(ap.play_id) AS play_count
            FROM albums al
            JOIN artists ar ON al.artist_id = ar.artist_id
            LEFT JOIN album_plays ap ON al.album_id = ap.album_id
            WHERE al.album_id = ?
            GROUP BY al.album_id, al.title, ar.name
            "#,
        )
        .bind(album_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }

    async fn get_play_by_id(&self, play_id: i64) -> Result<Option<AlbumPlay>> {
        fetch_play(&self.pool, play_id).await
    }

    async fn create_play(&self, play: &AlbumPlay) -> Result<Option<AlbumPlay>> {
        let mut conn = self.pool.acquire().await?;

        let play_id: Option<i64> = query_scalar(
            r#"
            INSERT INTO album_plays (user_id, album_id, played_at, completed)
            VALUES (?, ?, ?, ?)
            RETURNING play_id
            "#,
        )
        .bind(play.user_id)
        .bind(play.album_id)
        .bind(play.played_at)
        .bind(play.completed)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(play_id) = play_id else {
            warn!(album_id = play.album_id, "Play insert returned no identifier");
            return Ok(None);
        };

        debug!(play_id, album_id = play.album_id, user_id = play.user_id, "Recorded play");
        fetch_play(&mut *conn, play_id).await
    }

    async fn delete_play(&self, play_id: i64) -> Result<bool> {
        let result = query("DELETE FROM album_plays WHERE play_id = ?")
            .bind(play_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_plays(&self) -> Result<i64> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM album_plays")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
