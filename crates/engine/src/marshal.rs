//! Internal column type hierarchy
//!
//! Models the engine's marshal classes as a tagged union: a scalar
//! leaf set plus parameterized composites, with a reversed-order
//! wrapper that the bridge strips before mapping. Composite types
//! carry a `multi_cell` flag; a frozen type is simply one that is not
//! multi-cell.

use serde::{Deserialize, Serialize};

/// The engine's scalar marshal classes.
///
/// `EmptyType` is a real engine type with no external counterpart;
/// the bridge reports it as unmappable rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum InternalScalar {
    Ascii,
    Long,
    Bytes,
    Boolean,
    Counter,
    Decimal,
    Double,
    Duration,
    Float,
    InetAddress,
    Int32,
    Short,
    Byte,
    IntegerVarint,
    SimpleDate,
    Time,
    Timestamp,
    TimeUuid,
    Utf8,
    Uuid,
    EmptyType,
}

impl InternalScalar {
    /// The engine's class name for this scalar, used in diagnostics.
    pub fn class_name(&self) -> &'static str {
        match self {
            InternalScalar::Ascii => "AsciiType",
            InternalScalar::Long => "LongType",
            InternalScalar::Bytes => "BytesType",
            InternalScalar::Boolean => "BooleanType",
            InternalScalar::Counter => "CounterColumnType",
            InternalScalar::Decimal => "DecimalType",
            InternalScalar::Double => "DoubleType",
            InternalScalar::Duration => "DurationType",
            InternalScalar::Float => "FloatType",
            InternalScalar::InetAddress => "InetAddressType",
            InternalScalar::Int32 => "Int32Type",
            InternalScalar::Short => "ShortType",
            InternalScalar::Byte => "ByteType",
            InternalScalar::IntegerVarint => "IntegerType",
            InternalScalar::SimpleDate => "SimpleDateType",
            InternalScalar::Time => "TimeType",
            InternalScalar::Timestamp => "TimestampType",
            InternalScalar::TimeUuid => "TimeUUIDType",
            InternalScalar::Utf8 => "UTF8Type",
            InternalScalar::Uuid => "UUIDType",
            InternalScalar::EmptyType => "EmptyType",
        }
    }
}

/// A field of an internal user-defined type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalUdtField {
    /// Field name
    pub name: String,
    /// Field type
    pub field_type: InternalType,
}

/// The engine's column type hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InternalType {
    /// A scalar marshal class
    Scalar(InternalScalar),
    /// Reversed clustering order wrapper around another type
    Reversed(Box<InternalType>),
    /// List of elements
    List {
        /// Element type
        element: Box<InternalType>,
        /// Whether cells are stored individually (non-frozen)
        multi_cell: bool,
    },
    /// Set of elements
    Set {
        /// Element type
        element: Box<InternalType>,
        /// Whether cells are stored individually (non-frozen)
        multi_cell: bool,
    },
    /// Map of key/value pairs
    Map {
        /// Key type
        key: Box<InternalType>,
        /// Value type
        value: Box<InternalType>,
        /// Whether cells are stored individually (non-frozen)
        multi_cell: bool,
    },
    /// Fixed-arity heterogeneous tuple; always frozen in the engine
    Tuple {
        /// Element types, in declaration order
        elements: Vec<InternalType>,
    },
    /// User-defined type
    UserDefined {
        /// Keyspace the type is declared in
        keyspace: String,
        /// Type name
        name: String,
        /// Fields, in declaration order
        fields: Vec<InternalUdtField>,
        /// Whether cells are stored individually (non-frozen)
        multi_cell: bool,
    },
}

impl InternalType {
    /// Convenience constructor for a scalar.
    pub fn scalar(scalar: InternalScalar) -> Self {
        InternalType::Scalar(scalar)
    }

    /// Wrap a type in a reversed-order marker.
    pub fn reversed(inner: InternalType) -> Self {
        InternalType::Reversed(Box::new(inner))
    }

    /// Strip a reversed-order wrapper, if present. The wrapper only
    /// affects clustering order, never the value representation.
    pub fn unwrap_reversed(&self) -> &InternalType {
        match self {
            InternalType::Reversed(inner) => inner.unwrap_reversed(),
            other => other,
        }
    }

    /// Whether this type stores its cells individually. Scalars and
    /// tuples are never multi-cell.
    pub fn is_multi_cell(&self) -> bool {
        match self {
            InternalType::Scalar(_) | InternalType::Tuple { .. } => false,
            InternalType::Reversed(inner) => inner.is_multi_cell(),
            InternalType::List { multi_cell, .. }
            | InternalType::Set { multi_cell, .. }
            | InternalType::Map { multi_cell, .. }
            | InternalType::UserDefined { multi_cell, .. } => *multi_cell,
        }
    }

    /// The engine's class name for diagnostics.
    pub fn class_name(&self) -> &'static str {
        match self {
            InternalType::Scalar(s) => s.class_name(),
            InternalType::Reversed(_) => "ReversedType",
            InternalType::List { .. } => "ListType",
            InternalType::Set { .. } => "SetType",
            InternalType::Map { .. } => "MapType",
            InternalType::Tuple { .. } => "TupleType",
            InternalType::UserDefined { .. } => "UserType",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_reversed_is_recursive() {
        let t = InternalType::reversed(InternalType::reversed(InternalType::scalar(
            InternalScalar::Long,
        )));
        assert_eq!(
            t.unwrap_reversed(),
            &InternalType::Scalar(InternalScalar::Long)
        );
    }

    #[test]
    fn test_unwrap_reversed_passes_plain_types_through() {
        let t = InternalType::scalar(InternalScalar::Utf8);
        assert_eq!(t.unwrap_reversed(), &t);
    }

    #[test]
    fn test_multi_cell_through_reversed() {
        let t = InternalType::reversed(InternalType::List {
            element: Box::new(InternalType::scalar(InternalScalar::Int32)),
            multi_cell: true,
        });
        assert!(t.is_multi_cell());
    }

    #[test]
    fn test_scalars_and_tuples_are_single_cell() {
        assert!(!InternalType::scalar(InternalScalar::Boolean).is_multi_cell());
        assert!(!InternalType::Tuple {
            elements: vec![InternalType::scalar(InternalScalar::Int32)],
        }
        .is_multi_cell());
    }
}
