//! Schema-compiler contract
//!
//! Entity types are turned into schema templates and records by an external
//! code generator. This module only defines what the store consumes from it.

use crate::error::Result;
use crate::record::Record;
use crate::value::UnitType;

/// One field of an entity as seen by the schema compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Stored unit name (after any rename override)
    pub name: &'static str,
    /// Declared unit type
    pub ty: UnitType,
    /// Whether the field is part of the primary key
    pub primary: bool,
}

impl FieldSpec {
    /// Primary-key field
    pub const fn primary(name: &'static str, ty: UnitType) -> Self {
        Self {
            name,
            ty,
            primary: true,
        }
    }

    /// Non-key field
    pub const fn normal(name: &'static str, ty: UnitType) -> Self {
        Self {
            name,
            ty,
            primary: false,
        }
    }
}

/// Build the canonical schema template for an ordered field list
///
/// Every unit carries its type's zero value.
pub fn schema_from_fields(fields: &[FieldSpec]) -> Result<Record> {
    let mut schema = Record::new();
    for field in fields {
        schema.put(field.name, field.ty, field.primary, field.ty.zero_value())?;
    }
    Ok(schema)
}

/// A type the schema compiler knows how to map onto records
pub trait Entity {
    /// Table the entity's records are routed to
    const TABLE_NAME: &'static str;

    /// Ordered field enumeration
    fn fields() -> &'static [FieldSpec];

    /// Populated record for this value
    fn to_record(&self) -> Result<Record>;

    /// Schema template for the entity type
    fn schema() -> Result<Record> {
        let mut schema = schema_from_fields(Self::fields())?;
        schema.set_origin_table(Self::TABLE_NAME);
        Ok(schema)
    }
}
