//! External result variants and metadata
//!
//! A closed set of result kinds mirroring the native protocol's
//! RESULT message: void, rows, set-keyspace, schema-change and
//! prepared. Rows carry column metadata, a has-more-pages flag and an
//! opaque continuation token when paging is active.

use crate::column::Column;
use crate::digest::StatementId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single row: one optional byte payload per selected column, in
/// column order. `None` is a null cell.
pub type Row = Vec<Option<Vec<u8>>>;

/// Flags attached to result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultFlag {
    /// All columns belong to the same (keyspace, table)
    GlobalTablesSpec,
    /// A continuation token is attached; more pages exist
    HasMorePages,
    /// Column metadata was omitted at the client's request
    NoMetadata,
}

/// Metadata describing a rows result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Result flags
    pub flags: Vec<ResultFlag>,
    /// Column descriptors, in selection order
    pub columns: Vec<Column>,
    /// Digest of the result shape, when assigned.
    ///
    /// Known gap: the bridge never assigns this today (the paged-rows
    /// path leaves it unassigned while still resolving partition-key
    /// bind indexes); clients relying on stable result-shape caching
    /// cannot use it yet.
    pub result_metadata_id: Option<StatementId>,
    /// Opaque continuation token, present iff `HasMorePages` is set
    pub paging_state: Option<Vec<u8>>,
}

impl ResultMetadata {
    /// Metadata with no columns and no paging.
    pub fn empty() -> Self {
        Self {
            flags: Vec::new(),
            columns: Vec::new(),
            result_metadata_id: None,
            paging_state: None,
        }
    }

    /// Whether a continuation token is attached.
    pub fn has_more_pages(&self) -> bool {
        self.flags.contains(&ResultFlag::HasMorePages)
    }
}

/// Metadata describing the bind markers of a prepared statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedMetadata {
    /// Flags (only `GlobalTablesSpec` applies here)
    pub flags: Vec<ResultFlag>,
    /// Bind-marker column descriptors, in marker order
    pub columns: Vec<Column>,
    /// Positions of the partition-key columns among the bind markers
    pub partition_key_bind_indexes: Vec<u16>,
}

/// A schema change notification, as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChangeMetadata {
    /// CREATED, UPDATED or DROPPED
    pub change: String,
    /// KEYSPACE, TABLE, TYPE, FUNCTION or AGGREGATE
    pub target: String,
    /// Affected keyspace
    pub keyspace: String,
    /// Affected object name, empty for keyspace-level changes
    pub name: String,
    /// Argument types, for function and aggregate targets
    pub arg_types: Vec<String>,
}

/// The kind-specific payload of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CqlResultKind {
    /// No payload
    Void,
    /// A page of rows
    Rows {
        /// Row data, one entry per row
        rows: Vec<Row>,
        /// Column and paging metadata
        metadata: ResultMetadata,
    },
    /// The session keyspace changed
    SetKeyspace(String),
    /// A schema change was applied
    SchemaChange(SchemaChangeMetadata),
    /// A statement was prepared
    Prepared {
        /// Content digest identifying the statement
        id: StatementId,
        /// Shape of the rows the statement will produce
        result_metadata: ResultMetadata,
        /// Bind-marker descriptors
        bind_metadata: PreparedMetadata,
    },
}

/// An external result: a kind plus an optional tracing identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CqlResult {
    /// The kind-specific payload
    pub kind: CqlResultKind,
    /// Tracing session identifier, when tracing was enabled
    pub tracing_id: Option<Uuid>,
}

impl CqlResult {
    /// Wrap a kind with no tracing identifier.
    pub fn new(kind: CqlResultKind) -> Self {
        Self {
            kind,
            tracing_id: None,
        }
    }

    /// Attach a tracing identifier (or none).
    pub fn with_tracing_id(mut self, tracing_id: Option<Uuid>) -> Self {
        self.tracing_id = tracing_id;
        self
    }
}
