//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the music catalog core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the library and service
//! crates depend on. It establishes the logging conventions and the
//! configuration surface used to bootstrap the catalog.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
