//! High-level values and bound parameters
//!
//! `Value` is the decoded, high-level representation the transport
//! layer hands to the bridge (the wire decoder is an external
//! collaborator). `BoundValue` is the tri-state a bound parameter can
//! take: null, unset, or an actual value. Null and unset are
//! semantically different: a null column is explicitly cleared, an
//! unset column is left untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use uuid::Uuid;

/// A decoded, high-level CQL value.
///
/// Types that have no dedicated variant (decimal, varint, duration)
/// travel as `Blob` in their serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// An absent value inside a tuple or UDT field
    Null,
    /// boolean
    Boolean(bool),
    /// tinyint
    TinyInt(i8),
    /// smallint
    SmallInt(i16),
    /// int
    Int(i32),
    /// bigint
    BigInt(i64),
    /// float
    Float(f32),
    /// double
    Double(f64),
    /// ascii or text
    Text(String),
    /// blob (also decimal/varint/duration in serialized form)
    Blob(Vec<u8>),
    /// uuid or timeuuid
    Uuid(Uuid),
    /// inet
    Inet(IpAddr),
    /// timestamp (milliseconds since the epoch) or time
    Timestamp(i64),
    /// list
    List(Vec<Value>),
    /// set (order of insertion preserved)
    Set(Vec<Value>),
    /// map, as ordered key/value pairs
    Map(Vec<(Value, Value)>),
    /// tuple, positional
    Tuple(Vec<Value>),
    /// user-defined type, as named fields
    Udt(Vec<(String, Value)>),
}

impl Value {
    /// The CQL-flavored name of this value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::TinyInt(_) => "tinyint",
            Value::SmallInt(_) => "smallint",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Uuid(_) => "uuid",
            Value::Inet(_) => "inet",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Tuple(_) => "tuple",
            Value::Udt(_) => "udt",
        }
    }

    /// Whether this is the null placeholder.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "'{}'", v),
            Value::Blob(v) => write!(f, "0x{}", hex(v)),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Inet(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::List(items) => render_seq(f, "[", items, "]"),
            Value::Set(items) => render_seq(f, "{", items, "}"),
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Tuple(items) => render_seq(f, "(", items, ")"),
            Value::Udt(fields) => {
                write!(f, "{{")?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn render_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// A bound parameter supplied for a prepared-statement execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundValue {
    /// Explicitly clear the column
    Null,
    /// Leave the column untouched
    Unset,
    /// Bind a concrete value
    Set(Value),
}

impl From<Value> for BoundValue {
    fn from(v: Value) -> Self {
        BoundValue::Set(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_different_numeric_widths_are_not_equal() {
        assert_ne!(Value::Int(1), Value::BigInt(1));
        assert_ne!(Value::TinyInt(1), Value::SmallInt(1));
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Text("hi".into())), "'hi'");
        assert_eq!(format!("{}", Value::Blob(vec![0xAB, 0x01])), "0xab01");
    }

    #[test]
    fn test_display_collections() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(format!("{}", list), "[1, 2]");
        let map = Value::Map(vec![(Value::Text("k".into()), Value::Int(1))]);
        assert_eq!(format!("{}", map), "{'k': 1}");
    }

    #[test]
    fn test_bound_value_states_are_distinct() {
        assert_ne!(BoundValue::Null, BoundValue::Unset);
        assert_ne!(BoundValue::Null, BoundValue::Set(Value::Null));
    }

    #[test]
    fn test_bound_value_from_value() {
        let bv: BoundValue = Value::Int(3).into();
        assert_eq!(bv, BoundValue::Set(Value::Int(3)));
    }

    #[test]
    fn test_float_ieee_equality() {
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_eq!(Value::Double(-0.0), Value::Double(0.0));
    }
}
