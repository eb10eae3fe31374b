//! Core types and trait definitions for the Podium standings engine.
//!
//! This crate is deliberately free of database and I/O dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod race;
pub mod registry;
pub mod standing;
pub mod store;

pub use error::{Error, Result};
