//! Internal (engine-side) model for the gangway persistence bridge
//!
//! This crate models the embedded storage engine's half of the
//! boundary, exactly as the bridge consumes it:
//! - The internal column type hierarchy (`marshal`)
//! - The internal failure-code taxonomy (`error`)
//! - Engine-native execution options (`options`)
//! - Paging state and its single-use codec (`paging`)
//! - Internal results and column specifications (`result`)
//! - The executor and registry capabilities (`exec`)
//! - Foundational engine types: consistency, protocol version,
//!   write type, statement digest (`types`)
//!
//! The engine's query execution, replication and schema machinery are
//! external collaborators; nothing here executes anything.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod exec;
pub mod marshal;
pub mod options;
pub mod paging;
pub mod result;
pub mod types;

pub use error::{EngineException, ExceptionCode};
pub use exec::{BoundStatement, Executor, PreparedStatementRegistry};
pub use marshal::{InternalScalar, InternalType};
pub use options::{BoundBytes, ExecutionOptions, SpecificOptions, NO_PAGE_SIZE, NO_TIMESTAMP};
pub use paging::{PagingState, PagingStateError};
pub use result::{
    ChangeKind, EngineResult, EngineResultKind, InternalColumnSpec, RowsMetadata,
    SchemaChangeEvent, TargetKind,
};
pub use types::{Consistency, EngineProtocolVersion, EngineWriteType, Md5Digest};
