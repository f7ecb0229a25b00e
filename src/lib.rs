//! Gangway - persistence bridge between a CQL-facing query surface
//! and an embedded storage engine
//!
//! Gangway translates, in both directions, everything that crosses
//! the boundary between a client-facing query protocol and the
//! engine that actually executes statements: column types, bound
//! values, query parameters, execution results and failures.
//!
//! # Quick Start
//!
//! ```ignore
//! use gangway::{PreparedStatement, QueryParameters, ProtocolVersion, ConsistencyLevel};
//!
//! let statement = PreparedStatement::new(id, bind_markers);
//! let params = QueryParameters::new(ProtocolVersion::V4, ConsistencyLevel::Quorum);
//! let result = statement
//!     .execute(&executor, &registry, &params, &values, None, started_at)
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! The external model lives in [`gangway_core`], the engine-side
//! model in [`gangway_engine`], and the translation between the two
//! in [`gangway_api`]. This crate re-exports the pieces a typical
//! caller touches.

pub use gangway_api::{
    marshal_options, translate, translate_result, ExecutionError, PreparedStatement, ResultSet,
};
pub use gangway_core::{
    BoundValue, Column, ColumnKind, ColumnType, ConsistencyLevel, CqlException, CqlResult,
    CqlResultKind, ProtocolVersion, QueryParameters, StatementId, Value,
};
pub use gangway_engine::{
    BoundStatement, EngineException, EngineResult, ExecutionOptions, Executor,
    PreparedStatementRegistry,
};
