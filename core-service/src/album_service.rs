//! # Album Service
//!
//! Combines album lookups with play-history aggregation and validates album
//! fields before they reach the database.
//!
//! ## Overview
//!
//! The `AlbumService` is responsible for:
//! - Ranking trending albums over a clamped 1 to 30 day window
//! - Reporting an album's play count, keeping "no such album" apart from
//!   "never played"
//! - Recording a play for an album on behalf of the anonymous listener
//! - Validating album drafts before create and update
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │    AlbumService    │
//! └──────────┬─────────┘
//!            │
//!            ├──> AlbumRepository      (album lookups and writes)
//!            ├──> ArtistRepository     (artist existence and name)
//!            └──> AlbumPlayRepository  (plays, trending, play counts)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_service::AlbumService;
//! use std::sync::Arc;
//!
//! let service = AlbumService::new(
//!     Arc::new(SqliteAlbumRepository::new(pool.clone())),
//!     Arc::new(SqliteArtistRepository::new(pool.clone())),
//!     Arc::new(SqliteAlbumPlayRepository::new(pool)),
//! );
//!
//! let trending = service.get_trending_albums(7).await?;
//! ```

use crate::error::{CoreError, Result, ValidationError};
use chrono::Utc;
use core_library::models::{Album, AlbumDraft, AlbumPlay, AlbumPlayCount, TrendingAlbum};
use core_library::repositories::{AlbumPlayRepository, AlbumRepository, ArtistRepository};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Listener recorded for plays that arrive without a user
pub const ANONYMOUS_USER_ID: i64 = 1;

/// Trending window used when none is configured
pub const DEFAULT_TRENDING_DAYS: i32 = 7;

const MIN_TRENDING_DAYS: i32 = 1;
const MAX_TRENDING_DAYS: i32 = 30;
const MIN_RELEASE_YEAR: i32 = 1900;
const MAX_RELEASE_YEAR: i32 = 2100;

/// Service for album browsing, album writes and play statistics
#[derive(Clone)]
pub struct AlbumService {
    album_repository: Arc<dyn AlbumRepository>,
    artist_repository: Arc<dyn ArtistRepository>,
    play_repository: Arc<dyn AlbumPlayRepository>,
    default_trending_days: i32,
}

impl AlbumService {
    /// Create a new album service
    ///
    /// # Arguments
    /// * `album_repository` - Repository for album data
    /// * `artist_repository` - Repository for artist data
    /// * `play_repository` - Repository for play history
    pub fn new(
        album_repository: Arc<dyn AlbumRepository>,
        artist_repository: Arc<dyn ArtistRepository>,
        play_repository: Arc<dyn AlbumPlayRepository>,
    ) -> Self {
        Self {
            album_repository,
            artist_repository,
            play_repository,
            default_trending_days: DEFAULT_TRENDING_DAYS,
        }
    }

    /// Set the window used by [`get_default_trending_albums`](Self::get_default_trending_albums)
    pub fn with_default_trending_days(mut self, days: i32) -> Self {
        self.default_trending_days = clamp_days(days);
        self
    }

    pub async fn get_all_albums(&self) -> Result<Vec<Album>> {
        Ok(self.album_repository.find_all().await?)
    }

    pub async fn get_album_by_id(&self, album_id: i64) -> Result<Option<Album>> {
        Ok(self.album_repository.find_by_id(album_id).await?)
    }

    pub async fn get_albums_by_artist(&self, artist_id: i64) -> Result<Vec<Album>> {
        Ok(self.album_repository.find_by_artist(artist_id).await?)
    }

    pub async fn get_albums_by_genre(&self, genre: &str) -> Result<Vec<Album>> {
        Ok(self.album_repository.find_by_genre(genre).await?)
    }

    /// Rank albums by plays in the last `days` days
    ///
    /// `days` is clamped to [1, 30] here as well as in the repository, so
    /// either layer stays safe on its own.
    #[instrument(skip(self))]
    pub async fn get_trending_albums(&self, days: i32) -> Result<Vec<TrendingAlbum>> {
        let days = clamp_days(days);
        let trending = self.play_repository.get_trending_albums(days).await?;

        debug!(days, entries = trending.len(), "Computed trending albums");
        Ok(trending)
    }

    /// Trending albums over the configured default window
    pub async fn get_default_trending_albums(&self) -> Result<Vec<TrendingAlbum>> {
        self.get_trending_albums(self.default_trending_days).await
    }

    /// Lifetime play count of an album
    ///
    /// # Returns
    /// - `Ok(None)` if the album does not exist
    /// - `Ok(Some(count))` otherwise, with a zero count built from the album
    ///   itself when the play history has nothing to report
    #[instrument(skip(self))]
    pub async fn get_album_play_count(&self, album_id: i64) -> Result<Option<AlbumPlayCount>> {
        let Some(album) = self.album_repository.find_by_id(album_id).await? else {
            debug!("Album not found");
            return Ok(None);
        };

        let count = match self.play_repository.get_album_play_count(album_id).await? {
            Some(count) => count,
            None => {
                debug!("No aggregate row, reporting zero plays");
                AlbumPlayCount::zero_for(&album)
            }
        };

        Ok(Some(count))
    }

    /// Record one play of an album by the anonymous listener
    ///
    /// The stored play carries [`ANONYMOUS_USER_ID`], the current UTC time and
    /// `completed = false`.
    ///
    /// # Errors
    /// `CoreError::NotFound` if the album does not exist
    #[instrument(skip(self))]
    pub async fn increment_play_count(&self, album_id: i64) -> Result<Option<AlbumPlay>> {
        if self.album_repository.find_by_id(album_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity_type: "Album".to_string(),
                id: album_id.to_string(),
            });
        }

        let play = AlbumPlay::new(ANONYMOUS_USER_ID, album_id)
            .played_at(Utc::now().naive_utc())
            .completed(false);

        let created = self.play_repository.create_play(&play).await?;
        if let Some(created) = &created {
            info!(play_id = created.play_id, "Recorded play");
        }

        Ok(created)
    }

    /// Search album titles and artist names
    ///
    /// A blank term lists every album.
    pub async fn search_albums(&self, term: &str) -> Result<Vec<Album>> {
        if term.trim().is_empty() {
            return self.get_all_albums().await;
        }

        Ok(self.album_repository.search(term).await?)
    }

    /// Validate and store a new album
    ///
    /// # Errors
    /// `CoreError::Validation` for a blank title, a non-positive artist ID, a
    /// release year outside 1900..=2100 or an unknown artist
    #[instrument(skip(self))]
    pub async fn create_album(&self, draft: &AlbumDraft) -> Result<Option<Album>> {
        let artist_name = self.validate_album(draft).await?;

        let created = self.album_repository.insert(draft).await?;
        Ok(created.map(|mut album| {
            album.artist_name = Some(artist_name);
            album
        }))
    }

    /// Validate and replace an existing album's fields
    ///
    /// # Returns
    /// `Ok(None)` if no album has that ID
    #[instrument(skip(self))]
    pub async fn update_album(&self, album_id: i64, draft: &AlbumDraft) -> Result<Option<Album>> {
        let artist_name = self.validate_album(draft).await?;

        let updated = self.album_repository.update(album_id, draft).await?;
        Ok(updated.map(|mut album| {
            album.artist_name = Some(artist_name);
            album
        }))
    }

    pub async fn delete_album(&self, album_id: i64) -> Result<bool> {
        Ok(self.album_repository.delete(album_id).await?)
    }

    /// Field checks first, then the artist lookup; yields the artist's name
    async fn validate_album(&self, draft: &AlbumDraft) -> Result<String> {
        validate_album_fields(draft)?;

        let artist = self
            .artist_repository
            .find_by_id(draft.artist_id)
            .await?
            .ok_or(ValidationError::ArtistNotFound(draft.artist_id))?;

        Ok(artist.name)
    }
}

fn clamp_days(days: i32) -> i32 {
    days.clamp(MIN_TRENDING_DAYS, MAX_TRENDING_DAYS)
}

fn validate_album_fields(draft: &AlbumDraft) -> std::result::Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    if draft.artist_id <= 0 {
        return Err(ValidationError::InvalidArtistId(draft.artist_id));
    }

    if let Some(year) = draft.release_year {
        if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) {
            return Err(ValidationError::ReleaseYearOutOfRange(year));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_library::models::Artist;
    use mockall::mock;
    use mockall::predicate::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        pub AlbumRepo {}

        #[async_trait]
        impl AlbumRepository for AlbumRepo {
            async fn find_by_id(&self, album_id: i64) -> core_library::Result<Option<Album>>;
            async fn find_all(&self) -> core_library::Result<Vec<Album>>;
            async fn find_by_artist(&self, artist_id: i64) -> core_library::Result<Vec<Album>>;
            async fn find_by_genre(&self, genre: &str) -> core_library::Result<Vec<Album>>;
            async fn search(&self, term: &str) -> core_library::Result<Vec<Album>>;
            async fn insert(&self, draft: &AlbumDraft) -> core_library::Result<Option<Album>>;
            async fn update(&self, album_id: i64, draft: &AlbumDraft) -> core_library::Result<Option<Album>>;
            async fn delete(&self, album_id: i64) -> core_library::Result<bool>;
        }
    }

    /// Artist lookups only; counts calls so tests can assert none happened
    struct StubArtists {
        known: Option<Artist>,
        lookups: AtomicUsize,
    }

    impl StubArtists {
        fn with(artist: Option<Artist>) -> Self {
            Self {
                known: artist,
                lookups: AtomicUsize::new(0),
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArtistRepository for StubArtists {
        async fn find_by_id(&self, artist_id: i64) -> core_library::Result<Option<Artist>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .known
                .clone()
                .filter(|artist| artist.artist_id == artist_id))
        }

        async fn find_all(&self) -> core_library::Result<Vec<Artist>> {
            Ok(self.known.clone().into_iter().collect())
        }

        async fn insert(&self, _name: &str, _primary_genre: Option<&str>) -> core_library::Result<Artist> {
            unimplemented!("artist writes are not part of album service tests")
        }
    }

    mock! {
        pub PlayRepo {}

        #[async_trait]
        impl AlbumPlayRepository for PlayRepo {
            async fn get_trending_albums(&self, days: i32) -> core_library::Result<Vec<TrendingAlbum>>;
            async fn get_user_recent_plays(&self, user_id: i64, limit: u32) -> core_library::Result<Vec<AlbumPlay>>;
            async fn get_album_plays(&self, album_id: i64) -> core_library::Result<Vec<AlbumPlay>>;
            async fn get_album_play_count(&self, album_id: i64) -> core_library::Result<Option<AlbumPlayCount>>;
            async fn get_play_by_id(&self, play_id: i64) -> core_library::Result<Option<AlbumPlay>>;
            async fn create_play(&self, play: &AlbumPlay) -> core_library::Result<Option<AlbumPlay>>;
            async fn delete_play(&self, play_id: i64) -> core_library::Result<bool>;
            async fn count_plays(&self) -> core_library::Result<i64>;
        }
    }

    fn album(album_id: i64) -> Album {
        Album {
            album_id,
            artist_id: 3,
            title: "Rumours".to_string(),
            release_year: Some(1977),
            artist_name: Some("Fleetwood Mac".to_string()),
        }
    }

    fn artist(artist_id: i64) -> Artist {
        Artist {
            artist_id,
            name: "Fleetwood Mac".to_string(),
            primary_genre: Some("Rock".to_string()),
        }
    }

    fn no_artists() -> Arc<StubArtists> {
        Arc::new(StubArtists::with(None))
    }

    fn service(albums: MockAlbumRepo, artists: Arc<StubArtists>, plays: MockPlayRepo) -> AlbumService {
        AlbumService::new(Arc::new(albums), artists, Arc::new(plays))
    }

    #[tokio::test]
    async fn test_trending_days_are_clamped_before_delegating() {
        for (requested, effective) in [(0, 1), (1, 1), (30, 30), (31, 30), (-7, 1), (14, 14)] {
            let mut plays = MockPlayRepo::new();
            plays
                .expect_get_trending_albums()
                .with(eq(effective))
                .times(1)
                .returning(|_| Ok(Vec::new()));

            let svc = service(MockAlbumRepo::new(), no_artists(), plays);
            svc.get_trending_albums(requested).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_default_trending_window() {
        let mut plays = MockPlayRepo::new();
        plays
            .expect_get_trending_albums()
            .with(eq(30))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let svc = service(MockAlbumRepo::new(), no_artists(), plays)
            .with_default_trending_days(45);
        svc.get_default_trending_albums().await.unwrap();
    }

    #[tokio::test]
    async fn test_play_count_for_missing_album_is_absent() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_find_by_id().returning(|_| Ok(None));
        let mut plays = MockPlayRepo::new();
        plays.expect_get_album_play_count().times(0);

        let svc = service(albums, no_artists(), plays);
        assert!(svc.get_album_play_count(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_play_count_falls_back_to_zero() {
        let mut albums = MockAlbumRepo::new();
        albums
            .expect_find_by_id()
            .with(eq(8))
            .returning(|id| Ok(Some(album(id))));
        let mut plays = MockPlayRepo::new();
        plays.expect_get_album_play_count().returning(|_| Ok(None));

        let svc = service(albums, no_artists(), plays);
        let count = svc.get_album_play_count(8).await.unwrap().unwrap();

        assert_eq!(count.album_id, 8);
        assert_eq!(count.album_title, "Rumours");
        assert_eq!(count.artist_name.as_deref(), Some("Fleetwood Mac"));
        assert_eq!(count.play_count, 0);
    }

    #[tokio::test]
    async fn test_play_count_passes_aggregate_through() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_find_by_id().returning(|id| Ok(Some(album(id))));
        let mut plays = MockPlayRepo::new();
        plays.expect_get_album_play_count().returning(|id| {
            Ok(Some(AlbumPlayCount {
                album_id: id,
                album_title: "Rumours".to_string(),
                artist_name: Some("Fleetwood Mac".to_string()),
                play_count: 12,
            }))
        });

        let svc = service(albums, no_artists(), plays);
        let count = svc.get_album_play_count(2).await.unwrap().unwrap();
        assert_eq!(count.play_count, 12);
    }

    #[tokio::test]
    async fn test_increment_missing_album_is_not_found() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_find_by_id().returning(|_| Ok(None));
        let mut plays = MockPlayRepo::new();
        plays.expect_create_play().times(0);

        let svc = service(albums, no_artists(), plays);
        let result = svc.increment_play_count(404).await;

        assert!(matches!(
            result,
            Err(CoreError::NotFound { ref entity_type, ref id }) if entity_type == "Album" && id == "404"
        ));
    }

    #[tokio::test]
    async fn test_increment_persists_populated_play() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_find_by_id().returning(|id| Ok(Some(album(id))));
        let mut plays = MockPlayRepo::new();
        plays
            .expect_create_play()
            .withf(|play: &AlbumPlay| {
                play.album_id == 5
                    && play.user_id == ANONYMOUS_USER_ID
                    && !play.completed
                    && play.played_at.is_some()
            })
            .times(1)
            .returning(|play| {
                Ok(Some(AlbumPlay {
                    play_id: 77,
                    ..play.clone()
                }))
            });

        let svc = service(albums, no_artists(), plays);
        let created = svc.increment_play_count(5).await.unwrap().unwrap();
        assert_eq!(created.play_id, 77);
    }

    #[tokio::test]
    async fn test_blank_search_lists_everything() {
        let mut albums = MockAlbumRepo::new();
        albums
            .expect_find_all()
            .times(2)
            .returning(|| Ok(vec![album(1), album(2)]));
        albums.expect_search().times(0);

        let svc = service(albums, no_artists(), MockPlayRepo::new());
        assert_eq!(svc.search_albums("").await.unwrap().len(), 2);
        assert_eq!(svc.search_albums("   ").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_delegates_term() {
        let mut albums = MockAlbumRepo::new();
        albums
            .expect_search()
            .withf(|term: &str| term == "rum")
            .times(1)
            .returning(|_| Ok(vec![album(1)]));

        let svc = service(albums, no_artists(), MockPlayRepo::new());
        assert_eq!(svc.search_albums("rum").await.unwrap().len(), 1);
    }

    fn invalid_drafts() -> Vec<(AlbumDraft, ValidationError)> {
        vec![
            (AlbumDraft::new("   ", 3), ValidationError::EmptyTitle),
            (AlbumDraft::new("Tusk", 0), ValidationError::InvalidArtistId(0)),
            (AlbumDraft::new("Tusk", -2), ValidationError::InvalidArtistId(-2)),
            (
                AlbumDraft::new("Tusk", 3).with_release_year(1899),
                ValidationError::ReleaseYearOutOfRange(1899),
            ),
            (
                AlbumDraft::new("Tusk", 3).with_release_year(2101),
                ValidationError::ReleaseYearOutOfRange(2101),
            ),
        ]
    }

    #[tokio::test]
    async fn test_create_album_field_validation_skips_storage() {
        for (draft, expected) in invalid_drafts() {
            let mut albums = MockAlbumRepo::new();
            albums.expect_insert().times(0);
            let artists = Arc::new(StubArtists::with(Some(artist(3))));

            let svc = service(albums, artists.clone(), MockPlayRepo::new());
            match svc.create_album(&draft).await {
                Err(CoreError::Validation(err)) => assert_eq!(err, expected),
                other => panic!("expected validation error, got {:?}", other),
            }
            assert_eq!(artists.lookups(), 0);
        }
    }

    #[tokio::test]
    async fn test_update_album_field_validation_skips_storage() {
        for (draft, expected) in invalid_drafts() {
            let mut albums = MockAlbumRepo::new();
            albums.expect_update().times(0);
            let artists = Arc::new(StubArtists::with(Some(artist(3))));

            let svc = service(albums, artists.clone(), MockPlayRepo::new());
            match svc.update_album(10, &draft).await {
                Err(CoreError::Validation(err)) => assert_eq!(err, expected),
                other => panic!("expected validation error, got {:?}", other),
            }
            assert_eq!(artists.lookups(), 0);
        }
    }

    #[tokio::test]
    async fn test_update_album_unknown_artist() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_update().times(0);
        let artists = Arc::new(StubArtists::with(Some(artist(3))));

        let svc = service(albums, artists.clone(), MockPlayRepo::new());
        let result = svc.update_album(10, &AlbumDraft::new("Tusk", 9)).await;

        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::ArtistNotFound(9)))
        ));
        assert_eq!(artists.lookups(), 1);
    }

    #[tokio::test]
    async fn test_create_album_unknown_artist() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_insert().times(0);
        let artists = Arc::new(StubArtists::with(Some(artist(3))));

        let svc = service(albums, artists.clone(), MockPlayRepo::new());
        let result = svc.create_album(&AlbumDraft::new("Tusk", 9)).await;

        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::ArtistNotFound(9)))
        ));
        assert_eq!(artists.lookups(), 1);
    }

    #[tokio::test]
    async fn test_create_album_sets_artist_name() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_insert().times(1).returning(|draft| {
            Ok(Some(Album {
                album_id: 10,
                artist_id: draft.artist_id,
                title: draft.title.clone(),
                release_year: draft.release_year,
                artist_name: None,
            }))
        });
        let artists = Arc::new(StubArtists::with(Some(artist(3))));

        let svc = service(albums, artists, MockPlayRepo::new());
        let created = svc
            .create_album(&AlbumDraft::new("Tusk", 3).with_release_year(1979))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.album_id, 10);
        assert_eq!(created.artist_name.as_deref(), Some("Fleetwood Mac"));
    }

    #[tokio::test]
    async fn test_update_album_validates_and_reports_absent() {
        let mut albums = MockAlbumRepo::new();
        albums.expect_update().times(1).returning(|_, _| Ok(None));
        let artists = Arc::new(StubArtists::with(Some(artist(3))));

        let svc = service(albums, artists, MockPlayRepo::new());

        let missing = svc.update_album(99, &AlbumDraft::new("Tusk", 3)).await.unwrap();
        assert!(missing.is_none());

        let invalid = svc.update_album(99, &AlbumDraft::new("", 3)).await;
        assert!(matches!(
            invalid,
            Err(CoreError::Validation(ValidationError::EmptyTitle))
        ));
    }

    #[test]
    fn test_release_year_bounds_are_inclusive() {
        assert!(validate_album_fields(&AlbumDraft::new("A", 1).with_release_year(1900)).is_ok());
        assert!(validate_album_fields(&AlbumDraft::new("A", 1).with_release_year(2100)).is_ok());
        assert!(validate_album_fields(&AlbumDraft::new("A", 1)).is_ok());
    }
}
