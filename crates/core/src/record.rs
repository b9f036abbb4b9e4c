//! Record: an unordered collection of units
//!
//! Units are split into a primary (key) set and a normal set. The sum of the
//! primary units' structural hashes is the record's TypeHash, which alone
//! decides the table a record belongs to.
//!
//! # Identity
//!
//! - `type_hash()`: shape of the primary set only.
//! - `==` / `Hash`: full-value comparison over both sets.
//!
//! The transient `origin_table` hint is never persisted and takes no part in
//! equality or hashing.

use crate::error::{FormError, Result};
use crate::unit::Unit;
use crate::value::{UnitType, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A record made of primary and normal units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    primary: BTreeSet<Unit>,
    normal: BTreeSet<Unit>,
    #[serde(skip)]
    origin_table: Option<String>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a unit into the primary or normal set
    ///
    /// Fails with `DuplicateEntry` if the `(name, type)` slot already exists
    /// in that set; the existing unit is left untouched. Fails with
    /// `TypeMismatch` if `value` cannot be held by `ty`.
    pub fn put(
        &mut self,
        name: impl Into<String>,
        ty: UnitType,
        is_primary: bool,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let name = name.into();
        let value = value.into();
        if !ty.accepts(&value) {
            return Err(FormError::TypeMismatch {
                name,
                expected: ty.to_string(),
                found: value.type_name().to_string(),
            });
        }

        let unit = Unit::new(name, ty, value);
        let (set, which) = if is_primary {
            (&mut self.primary, "primary")
        } else {
            (&mut self.normal, "normal")
        };
        if set.contains(&unit) {
            return Err(FormError::duplicate(format!(
                "{which} units: slot '{}' ({}) already present",
                unit.name(),
                unit.unit_type()
            )));
        }
        set.insert(unit);
        Ok(self)
    }

    /// Builder form of [`Record::put`] for primary units
    pub fn with_primary(mut self, name: &str, ty: UnitType, value: impl Into<Value>) -> Result<Self> {
        self.put(name, ty, true, value)?;
        Ok(self)
    }

    /// Builder form of [`Record::put`] for normal units
    pub fn with_normal(mut self, name: &str, ty: UnitType, value: impl Into<Value>) -> Result<Self> {
        self.put(name, ty, false, value)?;
        Ok(self)
    }

    /// Sum of the primary units' structural hashes
    pub fn type_hash(&self) -> u64 {
        self.primary
            .iter()
            .fold(0u64, |acc, u| acc.wrapping_add(u.structural_hash()))
    }

    /// Sum of full hashes across primary and normal units
    pub fn full_hash(&self) -> u64 {
        self.primary
            .iter()
            .chain(self.normal.iter())
            .fold(0u64, |acc, u| acc.wrapping_add(u.full_hash()))
    }

    /// Primary units, ordered by slot
    pub fn primary_units(&self) -> impl Iterator<Item = &Unit> {
        self.primary.iter()
    }

    /// Normal units, ordered by slot
    pub fn normal_units(&self) -> impl Iterator<Item = &Unit> {
        self.normal.iter()
    }

    /// Look up a unit by slot, primary set first
    pub fn get_unit(&self, name: &str, ty: UnitType) -> Option<&Unit> {
        let slot = Unit::new(name, ty, Value::Null);
        self.primary.get(&slot).or_else(|| self.normal.get(&slot))
    }

    /// Look up a value by name alone, primary set first
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.primary
            .iter()
            .chain(self.normal.iter())
            .find(|u| u.name() == name)
            .map(Unit::value)
    }

    /// True when both sets are empty
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.normal.is_empty()
    }

    /// Total number of units
    pub fn len(&self) -> usize {
        self.primary.len() + self.normal.len()
    }

    /// Transient table-name hint
    pub fn origin_table(&self) -> Option<&str> {
        self.origin_table.as_deref()
    }

    /// Set the transient table-name hint
    pub fn set_origin_table(&mut self, name: impl Into<String>) {
        self.origin_table = Some(name.into());
    }

    /// Builder form of [`Record::set_origin_table`]
    pub fn in_table(mut self, name: impl Into<String>) -> Self {
        self.set_origin_table(name);
        self
    }

    /// Drop the transient table-name hint
    pub fn clear_origin_table(&mut self) {
        self.origin_table = None;
    }

    /// Shape description, e.g. `[primary id: Int], [normal name: String]`
    pub fn type_string(&self) -> String {
        self.primary
            .iter()
            .map(|u| format!("[primary {}: {}]", u.name(), u.unit_type()))
            .chain(
                self.normal
                    .iter()
                    .map(|u| format!("[normal {}: {}]", u.name(), u.unit_type())),
            )
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn same_values(a: &BTreeSet<Unit>, b: &BTreeSet<Unit>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_value(y))
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        same_values(&self.primary, &other.primary) && same_values(&self.normal, &other.normal)
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.full_hash());
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for unit in self.primary.iter().chain(self.normal.iter()) {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{unit}")?;
        }
        f.write_str("}")
    }
}
