//! Internal execution results
//!
//! What the engine hands back after executing a statement: a closed
//! set of result kinds plus the column specifications and paging
//! metadata the result translator reads.

use crate::marshal::InternalType;
use crate::paging::PagingState;
use crate::types::{EngineProtocolVersion, Md5Digest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An internal column specification: where a column lives, what it is
/// called and how it is marshalled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalColumnSpec {
    /// Keyspace the column belongs to
    pub keyspace: String,
    /// Table the column belongs to
    pub table: String,
    /// Column name
    pub name: String,
    /// Marshal type of the column
    pub column_type: InternalType,
}

/// Metadata attached to an internal rows result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsMetadata {
    /// Column specifications, in selection order
    pub columns: Vec<InternalColumnSpec>,
    /// Continuation state when more pages exist
    pub paging_state: Option<PagingState>,
    /// Protocol version the paging state should be serialized with
    pub protocol_version: EngineProtocolVersion,
}

/// What kind of schema object a change affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TargetKind {
    Keyspace,
    Table,
    Type,
    Function,
    Aggregate,
}

impl TargetKind {
    /// The protocol spelling of this target.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Keyspace => "KEYSPACE",
            TargetKind::Table => "TABLE",
            TargetKind::Type => "TYPE",
            TargetKind::Function => "FUNCTION",
            TargetKind::Aggregate => "AGGREGATE",
        }
    }
}

/// What happened to the schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ChangeKind {
    Created,
    Updated,
    Dropped,
}

impl ChangeKind {
    /// The protocol spelling of this change.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "CREATED",
            ChangeKind::Updated => "UPDATED",
            ChangeKind::Dropped => "DROPPED",
        }
    }
}

/// An internal schema change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChangeEvent {
    /// What happened
    pub change: ChangeKind,
    /// What kind of object was affected
    pub target: TargetKind,
    /// Affected keyspace
    pub keyspace: String,
    /// Affected object name, absent for keyspace-level changes
    pub name: Option<String>,
    /// Argument types for function and aggregate targets
    pub arg_types: Vec<String>,
}

/// The kind-specific payload of an internal result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineResultKind {
    /// No payload
    Void,
    /// A page of rows
    Rows {
        /// Row data: one optional byte payload per column per row
        rows: Vec<Vec<Option<Vec<u8>>>>,
        /// Column and paging metadata
        metadata: RowsMetadata,
    },
    /// The session keyspace changed
    SetKeyspace(String),
    /// A schema change was applied
    SchemaChange(SchemaChangeEvent),
    /// A statement was prepared
    Prepared {
        /// Digest identifying the statement
        id: Md5Digest,
        /// Shape of the rows the statement will produce
        result_columns: Vec<InternalColumnSpec>,
        /// Bind-marker specifications, in marker order
        bind_columns: Vec<InternalColumnSpec>,
    },
}

/// An internal result plus its optional tracing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    /// The kind-specific payload
    pub kind: EngineResultKind,
    /// Tracing session identifier when tracing ran
    pub tracing_id: Option<Uuid>,
}

impl EngineResult {
    /// Wrap a kind with no tracing session.
    pub fn new(kind: EngineResultKind) -> Self {
        Self {
            kind,
            tracing_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_and_change_spellings() {
        assert_eq!(TargetKind::Keyspace.as_str(), "KEYSPACE");
        assert_eq!(TargetKind::Aggregate.as_str(), "AGGREGATE");
        assert_eq!(ChangeKind::Dropped.as_str(), "DROPPED");
    }

    #[test]
    fn test_new_result_has_no_tracing_id() {
        let r = EngineResult::new(EngineResultKind::Void);
        assert_eq!(r.tracing_id, None);
    }

    #[test]
    fn test_schema_change_survives_json_roundtrip() {
        let event = SchemaChangeEvent {
            change: ChangeKind::Updated,
            target: TargetKind::Function,
            keyspace: "ks".to_string(),
            name: Some("f".to_string()),
            arg_types: vec!["int".to_string()],
        };
        let json = serde_json::to_string(&event).expect("event should serialize");
        let back: SchemaChangeEvent =
            serde_json::from_str(&json).expect("event should deserialize");
        assert_eq!(back, event);
    }
}
