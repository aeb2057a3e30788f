//! # Repository Pattern Implementation
//!
//! This module provides repository traits and implementations for data access.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - SQLite implementations use sqlx for async database access
//! - Each call borrows one pooled connection and hands it back on every exit
//!   path when the borrow is dropped
//! - All operations return `Result<T>`; a missing row is `Ok(None)`, never an
//!   error
//!
//! ## Available Repositories
//!
//! - `AlbumRepository` - Albums with their artist's name joined in
//! - `ArtistRepository` - Artists with an optional primary genre
//! - `AlbumPlayRepository` - Play history, trending and play-count aggregation

pub mod album;
pub mod album_play;
pub mod artist;

pub use album::{AlbumRepository, SqliteAlbumRepository};
pub use album_play::{AlbumPlayRepository, SqliteAlbumPlayRepository};
pub use artist::{ArtistRepository, SqliteArtistRepository};
