//! Type bridge between internal marshal types and client column types
//!
//! Scalars convert through a lookup table built once at first use;
//! composites convert structurally. A reversed-order wrapper is
//! stripped before mapping because it only affects clustering order.
//! The external `frozen` flag and the internal `multi_cell` flag are
//! the same fact seen from opposite sides: `frozen == !multi_cell`.

use gangway_core::column::{Column, ColumnKind, ColumnType};
use gangway_engine::marshal::{InternalScalar, InternalType, InternalUdtField};
use gangway_engine::result::InternalColumnSpec;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

/// An internal type with no client-visible counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal type {class_name} has no client-visible mapping")]
pub struct UnknownTypeMapping {
    /// Engine class name of the unmappable type
    pub class_name: String,
}

static SCALAR_TABLE: Lazy<HashMap<InternalScalar, ColumnType>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(InternalScalar::Ascii, ColumnType::Ascii);
    table.insert(InternalScalar::Long, ColumnType::Bigint);
    table.insert(InternalScalar::Bytes, ColumnType::Blob);
    table.insert(InternalScalar::Boolean, ColumnType::Boolean);
    table.insert(InternalScalar::Counter, ColumnType::Counter);
    table.insert(InternalScalar::Decimal, ColumnType::Decimal);
    table.insert(InternalScalar::Double, ColumnType::Double);
    table.insert(InternalScalar::Duration, ColumnType::Duration);
    table.insert(InternalScalar::Float, ColumnType::Float);
    table.insert(InternalScalar::InetAddress, ColumnType::Inet);
    table.insert(InternalScalar::Int32, ColumnType::Int);
    table.insert(InternalScalar::Short, ColumnType::Smallint);
    table.insert(InternalScalar::Byte, ColumnType::Tinyint);
    table.insert(InternalScalar::IntegerVarint, ColumnType::Varint);
    table.insert(InternalScalar::SimpleDate, ColumnType::Date);
    table.insert(InternalScalar::Time, ColumnType::Time);
    table.insert(InternalScalar::Timestamp, ColumnType::Timestamp);
    table.insert(InternalScalar::TimeUuid, ColumnType::Timeuuid);
    table.insert(InternalScalar::Utf8, ColumnType::Text);
    table.insert(InternalScalar::Uuid, ColumnType::Uuid);
    // EmptyType is deliberately absent: it has no client counterpart.
    table
});

/// Map an internal marshal type to its client-visible column type.
pub fn external_type(internal: &InternalType) -> Result<ColumnType, UnknownTypeMapping> {
    match internal.unwrap_reversed() {
        InternalType::Scalar(scalar) => {
            SCALAR_TABLE
                .get(scalar)
                .cloned()
                .ok_or_else(|| UnknownTypeMapping {
                    class_name: scalar.class_name().to_string(),
                })
        }
        InternalType::List {
            element,
            multi_cell,
        } => Ok(ColumnType::list(external_type(element)?, !multi_cell)),
        InternalType::Set {
            element,
            multi_cell,
        } => Ok(ColumnType::set(external_type(element)?, !multi_cell)),
        InternalType::Map {
            key,
            value,
            multi_cell,
        } => Ok(ColumnType::map(
            external_type(key)?,
            external_type(value)?,
            !multi_cell,
        )),
        InternalType::Tuple { elements } => {
            let mapped = elements
                .iter()
                .map(external_type)
                .collect::<Result<Vec<_>, _>>()?;
            // Tuples are single-cell in the engine, hence frozen here.
            Ok(ColumnType::tuple(mapped, true))
        }
        InternalType::UserDefined {
            keyspace,
            name,
            fields,
            multi_cell,
        } => {
            let mut mapped = Vec::with_capacity(fields.len());
            for field in fields {
                mapped.push((field.name.clone(), external_type(&field.field_type)?));
            }
            Ok(ColumnType::user_defined(
                keyspace.clone(),
                name.clone(),
                mapped,
                !multi_cell,
            ))
        }
        // unwrap_reversed never returns a Reversed node
        InternalType::Reversed(inner) => external_type(inner),
    }
}

/// Map a client column type back to the internal marshal type.
///
/// Total: every client type has an internal representation.
pub fn internal_type(external: &ColumnType) -> InternalType {
    match external {
        ColumnType::Ascii => InternalType::scalar(InternalScalar::Ascii),
        ColumnType::Bigint => InternalType::scalar(InternalScalar::Long),
        ColumnType::Blob => InternalType::scalar(InternalScalar::Bytes),
        ColumnType::Boolean => InternalType::scalar(InternalScalar::Boolean),
        ColumnType::Counter => InternalType::scalar(InternalScalar::Counter),
        ColumnType::Date => InternalType::scalar(InternalScalar::SimpleDate),
        ColumnType::Decimal => InternalType::scalar(InternalScalar::Decimal),
        ColumnType::Double => InternalType::scalar(InternalScalar::Double),
        ColumnType::Duration => InternalType::scalar(InternalScalar::Duration),
        ColumnType::Float => InternalType::scalar(InternalScalar::Float),
        ColumnType::Inet => InternalType::scalar(InternalScalar::InetAddress),
        ColumnType::Int => InternalType::scalar(InternalScalar::Int32),
        ColumnType::Smallint => InternalType::scalar(InternalScalar::Short),
        ColumnType::Text => InternalType::scalar(InternalScalar::Utf8),
        ColumnType::Time => InternalType::scalar(InternalScalar::Time),
        ColumnType::Timestamp => InternalType::scalar(InternalScalar::Timestamp),
        ColumnType::Timeuuid => InternalType::scalar(InternalScalar::TimeUuid),
        ColumnType::Tinyint => InternalType::scalar(InternalScalar::Byte),
        ColumnType::Uuid => InternalType::scalar(InternalScalar::Uuid),
        ColumnType::Varint => InternalType::scalar(InternalScalar::IntegerVarint),
        ColumnType::List { element, frozen } => InternalType::List {
            element: Box::new(internal_type(element)),
            multi_cell: !frozen,
        },
        ColumnType::Set { element, frozen } => InternalType::Set {
            element: Box::new(internal_type(element)),
            multi_cell: !frozen,
        },
        ColumnType::Map { key, value, frozen } => InternalType::Map {
            key: Box::new(internal_type(key)),
            value: Box::new(internal_type(value)),
            multi_cell: !frozen,
        },
        ColumnType::Tuple { elements, .. } => InternalType::Tuple {
            elements: elements.iter().map(internal_type).collect(),
        },
        ColumnType::UserDefined {
            keyspace,
            name,
            fields,
            frozen,
        } => InternalType::UserDefined {
            keyspace: keyspace.clone(),
            name: name.clone(),
            fields: fields
                .iter()
                .map(|(field_name, field_type)| InternalUdtField {
                    name: field_name.clone(),
                    field_type: internal_type(field_type),
                })
                .collect(),
            multi_cell: !frozen,
        },
    }
}

/// Map an internal column specification to a client column descriptor.
pub fn external_column(spec: &InternalColumnSpec) -> Result<Column, UnknownTypeMapping> {
    Ok(Column::new(
        spec.keyspace.clone(),
        spec.table.clone(),
        spec.name.clone(),
        external_type(&spec.column_type)?,
        ColumnKind::Regular,
    ))
}
