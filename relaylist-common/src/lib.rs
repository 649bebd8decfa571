//! # Relaylist Common Library
//!
//! Shared code for the Relaylist service and its tooling:
//! - Error type shared by database and configuration code
//! - Configuration loading (root folder, TOML file, Spotify credentials)
//! - SQLite initialization, migrations and shared row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
