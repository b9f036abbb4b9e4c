//! Unit types and values
//!
//! `UnitType` is the declared type of a slot; `Value` is what the slot holds.
//! Floating point values compare and hash by bit pattern so that equality
//! stays consistent with the record hashes built on top of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a unit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum UnitType {
    /// 64-bit float
    Double = 17,
    /// 32-bit float
    Float = 18,
    /// 32-bit signed integer
    Int = 19,
    /// 64-bit signed integer
    Long = 20,
    /// UTF-8 string
    String = 21,
    /// Opaque serialized object; accepts any value
    Object = 22,
    /// Boolean
    Bool = 23,
}

impl UnitType {
    /// Stable tag used in hashes
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Zero value used by schema templates
    pub fn zero_value(self) -> Value {
        match self {
            UnitType::Double => Value::Double(0.0),
            UnitType::Float => Value::Float(0.0),
            UnitType::Int => Value::Int(0),
            UnitType::Long => Value::Long(0),
            UnitType::String => Value::String(String::new()),
            UnitType::Bool => Value::Bool(false),
            UnitType::Object => Value::Null,
        }
    }

    /// Whether `value` may be stored in a slot of this type
    ///
    /// `Null` fits every type. `Object` accepts anything.
    pub fn accepts(self, value: &Value) -> bool {
        match value.unit_type() {
            None => true,
            Some(found) => self == UnitType::Object || found == self,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            UnitType::Double => "Double",
            UnitType::Float => "Float",
            UnitType::Int => "Int",
            UnitType::Long => "Long",
            UnitType::String => "String",
            UnitType::Object => "Object",
            UnitType::Bool => "Bool",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value held by a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    Null,
    /// 64-bit float
    Double(f64),
    /// 32-bit float
    Float(f32),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    String(String),
    /// Opaque bytes produced by an external serializer
    Object(Vec<u8>),
}

impl Value {
    /// The unit type this value naturally belongs to, `None` for `Null`
    pub fn unit_type(&self) -> Option<UnitType> {
        match self {
            Value::Null => None,
            Value::Double(_) => Some(UnitType::Double),
            Value::Float(_) => Some(UnitType::Float),
            Value::Int(_) => Some(UnitType::Int),
            Value::Long(_) => Some(UnitType::Long),
            Value::Bool(_) => Some(UnitType::Bool),
            Value::String(_) => Some(UnitType::String),
            Value::Object(_) => Some(UnitType::Object),
        }
    }

    /// Name of the value's type, "Null" for `Null`
    pub fn type_name(&self) -> &'static str {
        self.unit_type().map(UnitType::name).unwrap_or("Null")
    }

    /// Check for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as i64 (Int or Long)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Read as f64 (Double or Float)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Read as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Canonical byte encoding fed to the hash functions
    pub(crate) fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => out.push(0),
            Value::Double(v) => {
                out.push(1);
                out.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            Value::Float(v) => {
                out.push(2);
                out.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            Value::Int(v) => {
                out.push(3);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Value::Long(v) => {
                out.push(4);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Value::Bool(v) => {
                out.push(5);
                out.push(u8::from(*v));
            }
            Value::String(s) => {
                out.push(6);
                out.extend_from_slice(&(s.len() as u64).to_le_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            Value::Object(bytes) => {
                out.push(7);
                out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
                out.extend_from_slice(bytes);
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Object(v)
    }
}
