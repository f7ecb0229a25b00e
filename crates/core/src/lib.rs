//! External (client-facing) data model for the gangway persistence bridge
//!
//! This crate defines the stable, client-visible half of the bridge:
//! - Column types and column metadata (`column`)
//! - High-level values and bound parameters (`value`)
//! - The native-protocol binary codec for values (`codec`)
//! - Consistency levels and write types (`consistency`)
//! - Protocol versions (`protocol`)
//! - Per-request query parameters (`params`)
//! - Result variants and result metadata (`result`)
//! - The external exception hierarchy (`error`)
//! - Prepared-statement digests (`digest`)
//!
//! Everything here is independent of the storage engine's internal
//! representation; the `gangway-api` crate performs the translation
//! between the two models.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod column;
pub mod consistency;
pub mod digest;
pub mod error;
pub mod params;
pub mod protocol;
pub mod result;
pub mod value;

pub use codec::CodecError;
pub use column::{Column, ColumnKind, ColumnType, ValidationError};
pub use consistency::{ConsistencyLevel, WriteType};
pub use digest::StatementId;
pub use error::{CqlException, Endpoint, FailureReason};
pub use params::QueryParameters;
pub use protocol::ProtocolVersion;
pub use result::{
    CqlResult, CqlResultKind, PreparedMetadata, ResultFlag, ResultMetadata, Row,
    SchemaChangeMetadata,
};
pub use value::{BoundValue, Value};
