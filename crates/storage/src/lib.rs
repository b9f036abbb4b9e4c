//! Storage layer for FormDB
//!
//! This crate implements the in-memory store:
//! - Table: schema record plus member records of the same shape
//! - Database: named tables with name- and shape-based routing
//! - FormCallback: synchronous mutation observer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod callback;
pub mod database;
pub mod table;

pub use callback::{CallbackSlot, FormCallback, NoopCallback, SharedCallback};
pub use database::{Database, TablePut};
pub use table::{Table, TableCursor};
