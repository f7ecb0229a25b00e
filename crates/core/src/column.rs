//! External column types and column metadata
//!
//! This module defines the client-visible column type model:
//! a closed set of scalar types plus five composite kinds (list, set,
//! map, tuple, user-defined type). Every composite carries a `frozen`
//! flag: a frozen composite is stored by the engine as a single opaque
//! cell rather than a multi-cell structure.
//!
//! ## Invariants
//!
//! - A user-defined type's field list preserves declaration order.
//! - Tuple element order is positional and significant.
//! - `SCALARS` is the complete enumeration of scalar variants; the
//!   type bridge builds its internal-to-external lookup table from it.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A client-visible CQL column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// US-ASCII string
    Ascii,
    /// 64-bit signed integer
    Bigint,
    /// Arbitrary bytes
    Blob,
    /// true/false
    Boolean,
    /// Distributed counter
    Counter,
    /// Date without time (days)
    Date,
    /// Arbitrary-precision decimal
    Decimal,
    /// 64-bit IEEE-754 float
    Double,
    /// Month/day/nanosecond duration
    Duration,
    /// 32-bit IEEE-754 float
    Float,
    /// IPv4 or IPv6 address
    Inet,
    /// 32-bit signed integer
    Int,
    /// 16-bit signed integer
    Smallint,
    /// UTF-8 string
    Text,
    /// Nanoseconds since midnight
    Time,
    /// Milliseconds since the epoch
    Timestamp,
    /// Version-1 (time-based) UUID
    Timeuuid,
    /// 8-bit signed integer
    Tinyint,
    /// Any UUID
    Uuid,
    /// Arbitrary-precision integer
    Varint,
    /// `list<element>`
    List {
        /// Element type
        element: Box<ColumnType>,
        /// Stored as a single cell when true
        frozen: bool,
    },
    /// `set<element>`
    Set {
        /// Element type
        element: Box<ColumnType>,
        /// Stored as a single cell when true
        frozen: bool,
    },
    /// `map<key, value>`
    Map {
        /// Key type
        key: Box<ColumnType>,
        /// Value type
        value: Box<ColumnType>,
        /// Stored as a single cell when true
        frozen: bool,
    },
    /// `tuple<t1, .., tn>` (always positional)
    Tuple {
        /// Element types, in positional order
        elements: Vec<ColumnType>,
        /// Stored as a single cell when true
        frozen: bool,
    },
    /// A user-defined type
    UserDefined {
        /// Keyspace the type is declared in
        keyspace: String,
        /// Type name
        name: String,
        /// Fields in declaration order
        fields: Vec<(String, ColumnType)>,
        /// Stored as a single cell when true
        frozen: bool,
    },
}

impl ColumnType {
    /// The complete enumeration of scalar variants.
    ///
    /// Composite kinds (list/set/map/tuple/UDT) are deliberately
    /// absent: the bridge handles those structurally, never through a
    /// lookup table.
    pub const SCALARS: [ColumnType; 20] = [
        ColumnType::Ascii,
        ColumnType::Bigint,
        ColumnType::Blob,
        ColumnType::Boolean,
        ColumnType::Counter,
        ColumnType::Date,
        ColumnType::Decimal,
        ColumnType::Double,
        ColumnType::Duration,
        ColumnType::Float,
        ColumnType::Inet,
        ColumnType::Int,
        ColumnType::Smallint,
        ColumnType::Text,
        ColumnType::Time,
        ColumnType::Timestamp,
        ColumnType::Timeuuid,
        ColumnType::Tinyint,
        ColumnType::Uuid,
        ColumnType::Varint,
    ];

    /// Build a `list<element>` type.
    pub fn list(element: ColumnType, frozen: bool) -> Self {
        ColumnType::List {
            element: Box::new(element),
            frozen,
        }
    }

    /// Build a `set<element>` type.
    pub fn set(element: ColumnType, frozen: bool) -> Self {
        ColumnType::Set {
            element: Box::new(element),
            frozen,
        }
    }

    /// Build a `map<key, value>` type.
    pub fn map(key: ColumnType, value: ColumnType, frozen: bool) -> Self {
        ColumnType::Map {
            key: Box::new(key),
            value: Box::new(value),
            frozen,
        }
    }

    /// Build a tuple type. Tuples are frozen in practice.
    pub fn tuple(elements: Vec<ColumnType>, frozen: bool) -> Self {
        ColumnType::Tuple { elements, frozen }
    }

    /// Build a user-defined type.
    pub fn user_defined(
        keyspace: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<(String, ColumnType)>,
        frozen: bool,
    ) -> Self {
        ColumnType::UserDefined {
            keyspace: keyspace.into(),
            name: name.into(),
            fields,
            frozen,
        }
    }

    /// Whether this is one of the five composite kinds.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            ColumnType::List { .. }
                | ColumnType::Set { .. }
                | ColumnType::Map { .. }
                | ColumnType::Tuple { .. }
                | ColumnType::UserDefined { .. }
        )
    }

    /// The `frozen` flag; always false for scalars.
    pub fn is_frozen(&self) -> bool {
        match self {
            ColumnType::List { frozen, .. }
            | ColumnType::Set { frozen, .. }
            | ColumnType::Map { frozen, .. }
            | ColumnType::Tuple { frozen, .. }
            | ColumnType::UserDefined { frozen, .. } => *frozen,
            _ => false,
        }
    }

    /// Render the CQL name of this type, e.g. `frozen<map<text, int>>`.
    pub fn cql_name(&self) -> String {
        let inner = match self {
            ColumnType::Ascii => "ascii".to_string(),
            ColumnType::Bigint => "bigint".to_string(),
            ColumnType::Blob => "blob".to_string(),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Counter => "counter".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::Decimal => "decimal".to_string(),
            ColumnType::Double => "double".to_string(),
            ColumnType::Duration => "duration".to_string(),
            ColumnType::Float => "float".to_string(),
            ColumnType::Inet => "inet".to_string(),
            ColumnType::Int => "int".to_string(),
            ColumnType::Smallint => "smallint".to_string(),
            ColumnType::Text => "text".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
            ColumnType::Timeuuid => "timeuuid".to_string(),
            ColumnType::Tinyint => "tinyint".to_string(),
            ColumnType::Uuid => "uuid".to_string(),
            ColumnType::Varint => "varint".to_string(),
            ColumnType::List { element, .. } => format!("list<{}>", element.cql_name_unfrozen()),
            ColumnType::Set { element, .. } => format!("set<{}>", element.cql_name_unfrozen()),
            ColumnType::Map { key, value, .. } => format!(
                "map<{}, {}>",
                key.cql_name_unfrozen(),
                value.cql_name_unfrozen()
            ),
            ColumnType::Tuple { elements, .. } => {
                let parts: Vec<String> =
                    elements.iter().map(|e| e.cql_name_unfrozen()).collect();
                format!("tuple<{}>", parts.join(", "))
            }
            ColumnType::UserDefined { keyspace, name, .. } => format!("{}.{}", keyspace, name),
        };
        if self.is_frozen() {
            format!("frozen<{}>", inner)
        } else {
            inner
        }
    }

    fn cql_name_unfrozen(&self) -> String {
        // Nested renderings elide the frozen wrapper, as CQL does.
        let mut unwrapped = self.clone();
        match &mut unwrapped {
            ColumnType::List { frozen, .. }
            | ColumnType::Set { frozen, .. }
            | ColumnType::Map { frozen, .. }
            | ColumnType::Tuple { frozen, .. }
            | ColumnType::UserDefined { frozen, .. } => *frozen = false,
            _ => {}
        }
        unwrapped.cql_name()
    }

    /// Validate (and possibly coerce) a value against this type.
    ///
    /// Returns the coerced value on success. Supported coercions:
    /// integer widening (tinyint → smallint → int → bigint), float →
    /// double, text for ascii, bigint for timestamp/time, int for
    /// date, uuid for timeuuid, and raw blobs for decimal, varint,
    /// duration and counter columns. `Value::Null` always validates;
    /// it is the codec's job to reject it where the protocol does.
    pub fn validate(&self, value: &Value, location: &str) -> Result<Value, ValidationError> {
        if matches!(value, Value::Null) {
            return Ok(Value::Null);
        }
        match self {
            ColumnType::Ascii | ColumnType::Text => match value {
                Value::Text(s) => {
                    if *self == ColumnType::Ascii && !s.is_ascii() {
                        return Err(self.mismatch(value, location, " Value contains non-ASCII characters."));
                    }
                    Ok(value.clone())
                }
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Bigint | ColumnType::Counter => match value {
                Value::BigInt(_) => Ok(value.clone()),
                Value::Int(i) => Ok(Value::BigInt(i64::from(*i))),
                Value::SmallInt(i) => Ok(Value::BigInt(i64::from(*i))),
                Value::TinyInt(i) => Ok(Value::BigInt(i64::from(*i))),
                Value::Blob(_) if *self == ColumnType::Counter => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Int => match value {
                Value::Int(_) => Ok(value.clone()),
                Value::SmallInt(i) => Ok(Value::Int(i32::from(*i))),
                Value::TinyInt(i) => Ok(Value::Int(i32::from(*i))),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Smallint => match value {
                Value::SmallInt(_) => Ok(value.clone()),
                Value::TinyInt(i) => Ok(Value::SmallInt(i16::from(*i))),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Tinyint => match value {
                Value::TinyInt(_) => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Double => match value {
                Value::Double(_) => Ok(value.clone()),
                Value::Float(f) => Ok(Value::Double(f64::from(*f))),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Float => match value {
                Value::Float(_) => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Boolean => match value {
                Value::Boolean(_) => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Blob | ColumnType::Decimal | ColumnType::Varint | ColumnType::Duration => {
                match value {
                    Value::Blob(_) => Ok(value.clone()),
                    _ => Err(self.mismatch(value, location, "")),
                }
            }
            ColumnType::Timestamp | ColumnType::Time => match value {
                Value::Timestamp(_) => Ok(value.clone()),
                Value::BigInt(v) => Ok(Value::Timestamp(*v)),
                Value::Int(v) => Ok(Value::Timestamp(i64::from(*v))),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Date => match value {
                Value::Int(_) => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Uuid | ColumnType::Timeuuid => match value {
                Value::Uuid(_) => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Inet => match value {
                Value::Inet(_) => Ok(value.clone()),
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::List { element, .. } => match value {
                Value::List(items) => {
                    let mut validated = Vec::with_capacity(items.len());
                    for item in items {
                        validated.push(element.validate(item, location)?);
                    }
                    Ok(Value::List(validated))
                }
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Set { element, .. } => match value {
                Value::Set(items) => {
                    // Coercion can make previously distinct elements
                    // equal; set semantics keep the first occurrence.
                    let mut validated: Vec<Value> = Vec::with_capacity(items.len());
                    for item in items {
                        let v = element.validate(item, location)?;
                        if !validated.contains(&v) {
                            validated.push(v);
                        }
                    }
                    Ok(Value::Set(validated))
                }
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Map { key, value: val_type, .. } => match value {
                Value::Map(entries) => {
                    let mut validated = Vec::with_capacity(entries.len());
                    for (k, v) in entries {
                        let key_location = format!("key of map {}", location);
                        let value_location =
                            format!("value of map {} for key {}", location, k);
                        validated.push((
                            key.validate(k, &key_location)?,
                            val_type.validate(v, &value_location)?,
                        ));
                    }
                    Ok(Value::Map(validated))
                }
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::Tuple { elements, .. } => match value {
                Value::Tuple(items) => {
                    if items.len() > elements.len() {
                        return Err(self.mismatch(
                            value,
                            location,
                            &format!(
                                " Tuple has {} declared elements but {} were provided.",
                                elements.len(),
                                items.len()
                            ),
                        ));
                    }
                    let mut validated = Vec::with_capacity(items.len());
                    for (item, element_type) in items.iter().zip(elements.iter()) {
                        validated.push(element_type.validate(item, location)?);
                    }
                    Ok(Value::Tuple(validated))
                }
                _ => Err(self.mismatch(value, location, "")),
            },
            ColumnType::UserDefined { fields, .. } => match value {
                Value::Udt(provided) => {
                    let mut validated = Vec::with_capacity(provided.len());
                    for (field_name, field_value) in provided {
                        let declared = fields.iter().find(|(n, _)| n == field_name);
                        match declared {
                            Some((_, field_type)) => validated.push((
                                field_name.clone(),
                                field_type.validate(field_value, location)?,
                            )),
                            None => {
                                return Err(self.mismatch(
                                    value,
                                    location,
                                    &format!(" Unknown field '{}'.", field_name),
                                ))
                            }
                        }
                    }
                    Ok(Value::Udt(validated))
                }
                _ => Err(self.mismatch(value, location, "")),
            },
        }
    }

    fn mismatch(&self, value: &Value, location: &str, details: &str) -> ValidationError {
        ValidationError {
            location: location.to_string(),
            provided_type: value.type_name().to_string(),
            expected_cql_type: self.cql_name(),
            details: details.to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cql_name())
    }
}

/// A value failed validation against a column type.
///
/// Carries exactly the location, provided-type and expected-type
/// detail that the bridge surfaces to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Provided type '{provided_type}' is not compatible with expected CQL type \
     '{expected_cql_type}' at {location}.{details}"
)]
pub struct ValidationError {
    /// Where the offending value sits, e.g. `key of map m`
    pub location: String,
    /// The type of the value the caller supplied
    pub provided_type: String,
    /// The declared CQL type
    pub expected_cql_type: String,
    /// Additional detail, empty when there is none
    pub details: String,
}

/// The kind of a column within its table or type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Partition key component
    PartitionKey,
    /// Clustering key component
    Clustering,
    /// Regular column (also used for UDT fields)
    Regular,
    /// Static column
    Static,
}

/// A column descriptor: where a column lives and what type it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Keyspace name, empty for unqualified descriptors
    pub keyspace: String,
    /// Table name, empty for unqualified descriptors
    pub table: String,
    /// Column name
    pub name: String,
    /// The column's type
    pub column_type: ColumnType,
    /// The column's kind
    pub kind: ColumnKind,
}

impl Column {
    /// Build a fully qualified column descriptor.
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        column_type: ColumnType,
        kind: ColumnKind,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            name: name.into(),
            column_type,
            kind,
        }
    }

    /// Build an unqualified regular column (used for UDT fields).
    pub fn regular(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new("", "", name, column_type, ColumnKind::Regular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_enumeration_is_scalar_only() {
        for t in &ColumnType::SCALARS {
            assert!(!t.is_composite(), "{} must not be composite", t.cql_name());
            assert!(!t.is_frozen());
        }
        assert_eq!(ColumnType::SCALARS.len(), 20);
    }

    #[test]
    fn test_cql_name_rendering() {
        assert_eq!(ColumnType::Bigint.cql_name(), "bigint");
        assert_eq!(
            ColumnType::list(ColumnType::Int, false).cql_name(),
            "list<int>"
        );
        assert_eq!(
            ColumnType::map(ColumnType::Text, ColumnType::Int, true).cql_name(),
            "frozen<map<text, int>>"
        );
        assert_eq!(
            ColumnType::tuple(vec![ColumnType::Int, ColumnType::Text], true).cql_name(),
            "frozen<tuple<int, text>>"
        );
        assert_eq!(
            ColumnType::user_defined("ks", "address", vec![], true).cql_name(),
            "frozen<ks.address>"
        );
    }

    #[test]
    fn test_validate_exact_scalar() {
        let v = ColumnType::Int.validate(&Value::Int(7), "x").unwrap();
        assert_eq!(v, Value::Int(7));
    }

    #[test]
    fn test_validate_integer_widening() {
        assert_eq!(
            ColumnType::Bigint.validate(&Value::Int(7), "x").unwrap(),
            Value::BigInt(7)
        );
        assert_eq!(
            ColumnType::Int.validate(&Value::SmallInt(7), "x").unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            ColumnType::Smallint
                .validate(&Value::TinyInt(7), "x")
                .unwrap(),
            Value::SmallInt(7)
        );
    }

    #[test]
    fn test_validate_no_narrowing() {
        let err = ColumnType::Int
            .validate(&Value::BigInt(7), "x")
            .unwrap_err();
        assert_eq!(err.provided_type, "bigint");
        assert_eq!(err.expected_cql_type, "int");
        assert_eq!(err.location, "x");
    }

    #[test]
    fn test_validate_float_to_double() {
        assert_eq!(
            ColumnType::Double
                .validate(&Value::Float(1.5), "x")
                .unwrap(),
            Value::Double(1.5)
        );
    }

    #[test]
    fn test_validate_ascii_rejects_non_ascii() {
        let err = ColumnType::Ascii
            .validate(&Value::Text("héllo".to_string()), "x")
            .unwrap_err();
        assert!(err.details.contains("non-ASCII"));
    }

    #[test]
    fn test_validate_list_recurses() {
        let t = ColumnType::list(ColumnType::Bigint, false);
        let v = t
            .validate(&Value::List(vec![Value::Int(1), Value::Int(2)]), "l")
            .unwrap();
        assert_eq!(v, Value::List(vec![Value::BigInt(1), Value::BigInt(2)]));
    }

    #[test]
    fn test_validate_set_coalesces_coerced_duplicates() {
        // Int(1) and TinyInt(1) both coerce to BigInt(1); the set keeps one.
        let t = ColumnType::set(ColumnType::Bigint, false);
        let v = t
            .validate(&Value::Set(vec![Value::Int(1), Value::TinyInt(1)]), "s")
            .unwrap();
        assert_eq!(v, Value::Set(vec![Value::BigInt(1)]));
    }

    #[test]
    fn test_validate_map_recurses_both_positions() {
        let t = ColumnType::map(ColumnType::Text, ColumnType::Bigint, false);
        let v = t
            .validate(
                &Value::Map(vec![(Value::Text("a".into()), Value::Int(1))]),
                "m",
            )
            .unwrap();
        assert_eq!(
            v,
            Value::Map(vec![(Value::Text("a".into()), Value::BigInt(1))])
        );
    }

    #[test]
    fn test_validate_map_locations_name_key_and_value() {
        let t = ColumnType::map(ColumnType::Text, ColumnType::Bigint, false);
        let key_err = t
            .validate(&Value::Map(vec![(Value::Int(1), Value::BigInt(1))]), "m")
            .unwrap_err();
        assert_eq!(key_err.location, "key of map m");
        let value_err = t
            .validate(
                &Value::Map(vec![(
                    Value::Text("a".into()),
                    Value::Text("oops".into()),
                )]),
                "m",
            )
            .unwrap_err();
        assert_eq!(value_err.location, "value of map m for key 'a'");
    }

    #[test]
    fn test_validate_tuple_too_many_elements() {
        let t = ColumnType::tuple(vec![ColumnType::Int], true);
        let err = t
            .validate(&Value::Tuple(vec![Value::Int(1), Value::Int(2)]), "t")
            .unwrap_err();
        assert!(err.details.contains("1 declared"));
    }

    #[test]
    fn test_validate_udt_unknown_field() {
        let t = ColumnType::user_defined(
            "ks",
            "addr",
            vec![("street".to_string(), ColumnType::Text)],
            true,
        );
        let err = t
            .validate(
                &Value::Udt(vec![("city".to_string(), Value::Text("x".into()))]),
                "u",
            )
            .unwrap_err();
        assert!(err.details.contains("Unknown field 'city'"));
    }

    #[test]
    fn test_validate_null_always_passes() {
        assert_eq!(
            ColumnType::Int.validate(&Value::Null, "x").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_udt_field_order_preserved() {
        let fields = vec![
            ("b".to_string(), ColumnType::Int),
            ("a".to_string(), ColumnType::Text),
        ];
        let t = ColumnType::user_defined("ks", "t", fields.clone(), true);
        match t {
            ColumnType::UserDefined { fields: f, .. } => assert_eq!(f, fields),
            _ => panic!("wrong variant"),
        }
    }
}
