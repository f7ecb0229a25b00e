//! The gangway bridge: translation between the client-facing model
//! and the embedded storage engine
//!
//! Each module owns one direction or concern of the boundary:
//! - `typemap`: internal marshal types ↔ client column types
//! - `errors`: internal failure codes → the external exception
//!   hierarchy
//! - `params`: client query parameters → engine execution options
//! - `results`: internal execution results → external results
//! - `prepared`: bind-and-execute facade over prepared statements
//! - `resultset`: lazily-paged iteration over rows results
//!
//! The bridge holds no state of its own beyond a scalar type lookup
//! table built once at first use; everything else is a pure
//! translation driven by the inputs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod params;
pub mod prepared;
pub mod results;
pub mod resultset;
pub mod typemap;

pub use errors::{translate, ExecutionError};
pub use params::{
    external_consistency, external_write_type, internal_consistency, internal_version,
    marshal_options,
};
pub use prepared::PreparedStatement;
pub use results::{
    external_statement_id, to_prepared_metadata, to_result_metadata, to_schema_change,
    translate_result,
};
pub use resultset::ResultSet;
pub use typemap::{external_column, external_type, internal_type, UnknownTypeMapping};
