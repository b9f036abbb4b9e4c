//! Engine layer for FormDB
//!
//! This crate owns the store's lifecycle:
//! - Controller: holds the database, routes entity values, load/save
//! - ControllerConfig: where the store lives and how it opens
//! - persist: the on-disk bundle with atomic replacement

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod persist;

pub use config::{default_cache_path, ControllerConfig, DEFAULT_DATABASE_NAME, DEFAULT_FILE_NAME};
pub use controller::{Controller, SharedDatabase};
