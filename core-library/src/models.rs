//! Domain models for the music catalog
//!
//! Persistent rows (`Artist`, `Album`, `AlbumPlay`) map straight from SQL via
//! `FromRow`. Derived records (`TrendingAlbum`, `AlbumPlayCount`) only exist
//! as query results. Every record serializes with camelCase keys for
//! presentation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Catalog
// =============================================================================

/// Artist with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Unique identifier
    pub artist_id: i64,
    /// Artist name
    pub name: String,
    /// Primary genre, used for genre browsing
    pub primary_genre: Option<String>,
}

/// Album joined with its artist's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Unique identifier
    pub album_id: i64,
    /// Album artist reference
    pub artist_id: i64,
    /// Album title
    pub title: String,
    /// Release year
    pub release_year: Option<i32>,
    /// Derived from the artists table
    pub artist_name: Option<String>,
}

/// Caller-supplied album fields for create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDraft {
    pub title: String,
    pub artist_id: i64,
    pub release_year: Option<i32>,
}

impl AlbumDraft {
    /// Create a draft without a release year
    pub fn new(title: impl Into<String>, artist_id: i64) -> Self {
        Self {
            title: title.into(),
            artist_id,
            release_year: None,
        }
    }

    /// Set the release year
    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }
}

// =============================================================================
// Play history
// =============================================================================

/// One record of a user playing an album at a point in time.
///
/// `album_title` and `artist_name` are filled in by the repository when the
/// play is read back; they are ignored on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPlay {
    /// Unique identifier, assigned on insert
    pub play_id: i64,
    /// Listener
    pub user_id: i64,
    /// Played album
    pub album_id: i64,
    /// When the play happened, unset if the row carries no timestamp
    pub played_at: Option<NaiveDateTime>,
    /// Whether the album was played to the end
    pub completed: bool,
    pub album_title: Option<String>,
    pub artist_name: Option<String>,
}

impl AlbumPlay {
    /// Create an unsaved play for the given user and album
    pub fn new(user_id: i64, album_id: i64) -> Self {
        Self {
            user_id,
            album_id,
            ..Default::default()
        }
    }

    /// Set the play timestamp
    pub fn played_at(mut self, played_at: NaiveDateTime) -> Self {
        self.played_at = Some(played_at);
        self
    }

    /// Set the completion flag
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Album ranked by plays within the trending window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingAlbum {
    pub album_id: i64,
    pub artist_id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub artist_name: String,
    /// Plays inside the window, zero for albums nobody played
    pub recent_play_count: i64,
    /// 1-based position in the ranking
    pub trending_rank: u32,
}

/// Lifetime play total for a single album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPlayCount {
    pub album_id: i64,
    pub album_title: String,
    pub artist_name: Option<String>,
    pub play_count: i64,
}

impl AlbumPlayCount {
    /// Zero-count record synthesized from the album itself
    pub fn zero_for(album: &Album) -> Self {
        Self {
            album_id: album.album_id,
            album_title: album.title.clone(),
            artist_name: album.artist_name.clone(),
            play_count: 0,
        }
    }
}
