//! Unit: the smallest stored value
//!
//! A unit is `(name, type, value)`. Two notions of identity exist:
//!
//! - **Slot identity** `(name, type)`: what `Eq`, `Ord` and `Hash` use.
//!   A record never holds two units with the same slot in one set.
//! - **Value identity** `(name, type, value)`: [`Unit::same_value`].
//!
//! Both hashes are xxh3 over a canonical encoding, so they are stable
//! across processes and survive a save/load cycle.

use crate::value::{UnitType, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::xxh3_64;

/// A named, typed, valued atom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    name: String,
    ty: UnitType,
    value: Value,
}

impl Unit {
    /// Create a unit
    pub fn new(name: impl Into<String>, ty: UnitType, value: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            value,
        }
    }

    /// Unit name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn unit_type(&self) -> UnitType {
        self.ty
    }

    /// Held value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Hash of `(name, type)`, ignoring the value
    pub fn structural_hash(&self) -> u64 {
        structural_hash(&self.name, self.ty)
    }

    /// Hash of `(name, type, value)`
    pub fn full_hash(&self) -> u64 {
        let mut buf = slot_bytes(&self.name, self.ty);
        self.value.write_canonical(&mut buf);
        xxh3_64(&buf)
    }

    /// Same slot holding the same value
    pub fn same_value(&self, other: &Unit) -> bool {
        self == other && self.value == other.value
    }
}

/// Structural hash of a slot without building a unit
pub fn structural_hash(name: &str, ty: UnitType) -> u64 {
    xxh3_64(&slot_bytes(name, ty))
}

fn slot_bytes(name: &str, ty: UnitType) -> Vec<u8> {
    let mut buf = Vec::with_capacity(name.len() + 10);
    buf.extend_from_slice(&(name.len() as u64).to_le_bytes());
    buf.extend_from_slice(name.as_bytes());
    buf.push(ty.tag());
    buf
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.name == other.name
    }
}

impl Eq for Unit {}

impl PartialOrd for Unit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Unit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.ty.cmp(&other.ty))
    }
}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} = {}", self.name, self.ty, self.value)
    }
}
