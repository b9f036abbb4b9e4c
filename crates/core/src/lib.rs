//! Core types for FormDB
//!
//! This crate defines the foundational types used throughout the system:
//! - Value / UnitType: what a slot holds and what it is declared as
//! - Unit: a named, typed, valued atom
//! - Record: primary and normal unit sets with a structural TypeHash
//! - Entity: the contract consumed from the schema compiler
//! - FormError: error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod error;
pub mod record;
pub mod unit;
pub mod value;

pub use entity::{schema_from_fields, Entity, FieldSpec};
pub use error::{FormError, Result};
pub use record::Record;
pub use unit::{structural_hash, Unit};
pub use value::{UnitType, Value};
