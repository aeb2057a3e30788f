//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `mango-workspace` and
//! enable the `service` feature to pull in the catalog service without wiring
//! `core-service`, `core-library` and `core-runtime` individually.

#[cfg(feature = "service")]
pub use core_service;
