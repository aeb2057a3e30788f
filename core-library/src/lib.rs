//! # Library Management Module
//!
//! Owns the music catalog database and provides repository patterns for data
//! access.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite connection pooling and embedded migrations
//! - Repository patterns for albums, artists and play history
//! - Play-history aggregation (trending albums, per-album play counts)

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use error::{LibraryError, Result};
