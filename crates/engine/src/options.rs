//! Engine-native execution options
//!
//! Plain owned data, populated field by field by the parameter
//! marshaller. Absent optionals use documented sentinels rather than
//! wrapper types because that is how the engine consumes them.

use crate::paging::PagingState;
use crate::types::{Consistency, EngineProtocolVersion};
use serde::{Deserialize, Serialize};

/// Sentinel timestamp meaning "no client-provided timestamp".
pub const NO_TIMESTAMP: i64 = i64::MIN;

/// Sentinel page size meaning "unbounded".
pub const NO_PAGE_SIZE: i32 = -1;

/// A single bound value crossing the boundary.
///
/// Null and unset are distinct states: null writes a tombstone, unset
/// leaves the column untouched. Making them separate variants keeps
/// the two from ever colliding in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundBytes {
    /// Explicit null
    Null,
    /// Value deliberately left unset
    Unset,
    /// A serialized value
    Value(Vec<u8>),
}

impl BoundBytes {
    /// The serialized payload, when one is present.
    pub fn as_value(&self) -> Option<&[u8]> {
        match self {
            BoundBytes::Value(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// The conditional (LWT) and timestamp options of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificOptions {
    /// Page size, `NO_PAGE_SIZE` when unbounded
    pub page_size: i32,
    /// Decoded continuation state from a previous page
    pub paging_state: Option<PagingState>,
    /// Serial consistency for conditional operations
    pub serial_consistency: Consistency,
    /// Mutation timestamp in microseconds, `NO_TIMESTAMP` when the
    /// engine should assign one
    pub timestamp: i64,
}

impl Default for SpecificOptions {
    fn default() -> Self {
        Self {
            page_size: NO_PAGE_SIZE,
            paging_state: None,
            serial_consistency: Consistency::Serial,
            timestamp: NO_TIMESTAMP,
        }
    }
}

/// Everything the engine needs to execute one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Consistency level for the request
    pub consistency: Consistency,
    /// Bound values, in marker order
    pub values: Vec<BoundBytes>,
    /// Bind names when values are bound by name; must be the same
    /// length as `values`
    pub names: Option<Vec<String>>,
    /// Whether to omit result metadata in the response
    pub skip_metadata: bool,
    /// Paging and conditional options
    pub specific: SpecificOptions,
    /// Protocol version the values were serialized with
    pub protocol_version: EngineProtocolVersion,
}

impl ExecutionOptions {
    /// Options with the given consistency and version, positional
    /// binding, no values, everything else defaulted.
    pub fn new(consistency: Consistency, protocol_version: EngineProtocolVersion) -> Self {
        Self {
            consistency,
            values: Vec::new(),
            names: None,
            skip_metadata: false,
            specific: SpecificOptions::default(),
            protocol_version,
        }
    }
}
