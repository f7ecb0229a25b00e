//! External exception hierarchy
//!
//! A closed set of failure kinds, each carrying exactly the
//! diagnostic fields relevant to that kind. The error-taxonomy
//! translator in `gangway-api` produces these from internal engine
//! failures; nothing in this module knows about the engine.

use crate::consistency::{ConsistencyLevel, WriteType};
use crate::digest::StatementId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

/// External identity of a cluster endpoint: address plus storage port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// IP address of the endpoint
    pub address: IpAddr,
    /// Storage port the endpoint listens on
    pub port: u16,
}

impl Endpoint {
    /// Build an endpoint identity.
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Why a specific replica failed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// No specific reason reported
    Unknown,
    /// The read scanned more tombstones than the failure threshold
    ReadTooManyTombstones,
    /// The replica timed out internally
    Timeout,
    /// The replica's schema disagrees with the coordinator's
    IncompatibleSchema,
}

impl FailureReason {
    /// The wire code for this reason.
    pub fn code(&self) -> u16 {
        match self {
            FailureReason::Unknown => 0,
            FailureReason::ReadTooManyTombstones => 1,
            FailureReason::Timeout => 2,
            FailureReason::IncompatibleSchema => 3,
        }
    }

    /// Decode a wire code; unknown codes collapse to `Unknown`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => FailureReason::ReadTooManyTombstones,
            2 => FailureReason::Timeout,
            3 => FailureReason::IncompatibleSchema,
            _ => FailureReason::Unknown,
        }
    }
}

/// The external exception hierarchy, keyed by failure kind.
///
/// Each variant carries exactly the diagnostic payload relevant to
/// its kind; the translator preserves every field verbatim when
/// crossing the boundary.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum CqlException {
    /// Generic server-side fault
    #[error("server error: {message}")]
    Server {
        /// Fault description
        message: String,
    },

    /// Authentication failed. Deliberately carries no internal cause.
    #[error("authentication error: {message}")]
    Authentication {
        /// Failure description, safe for unauthenticated callers
        message: String,
    },

    /// Not enough live replicas to satisfy the consistency level
    #[error(
        "cannot achieve consistency level {consistency}: {required} required but only {alive} alive"
    )]
    Unavailable {
        /// Requested consistency level
        consistency: ConsistencyLevel,
        /// Replicas required by the level
        required: u32,
        /// Replicas actually alive
        alive: u32,
    },

    /// The coordinator is shedding load
    #[error("request rejected, coordinator overloaded: {message}")]
    Overloaded {
        /// Fault description
        message: String,
    },

    /// The contacted node is still bootstrapping
    #[error("cannot process request, coordinator is bootstrapping")]
    IsBootstrapping,

    /// A truncate operation failed
    #[error("error during truncate: {message}")]
    Truncate {
        /// Original cause when known, the truncate message otherwise
        message: String,
    },

    /// A write did not gather enough acknowledgments in time
    #[error(
        "{write_type} write timeout at {consistency}: received {received} of {block_for} required acknowledgments"
    )]
    WriteTimeout {
        /// What kind of write timed out
        write_type: WriteType,
        /// Requested consistency level
        consistency: ConsistencyLevel,
        /// Acknowledgments received
        received: u32,
        /// Acknowledgments required
        block_for: u32,
    },

    /// A read did not gather enough responses in time
    #[error(
        "read timeout at {consistency}: received {received} of {block_for} required responses (data_present={data_present})"
    )]
    ReadTimeout {
        /// Requested consistency level
        consistency: ConsistencyLevel,
        /// Responses received
        received: u32,
        /// Responses required
        block_for: u32,
        /// Whether the data replica responded
        data_present: bool,
    },

    /// Replicas failed (rather than timed out) during a read
    #[error(
        "read failure at {consistency}: received {received} of {block_for} responses, {n} replica failure(s)",
        n = .failure_reasons.len()
    )]
    ReadFailure {
        /// Requested consistency level
        consistency: ConsistencyLevel,
        /// Responses received
        received: u32,
        /// Responses required
        block_for: u32,
        /// Whether the data replica responded
        data_present: bool,
        /// Per-endpoint failure reasons, every entry preserved
        failure_reasons: HashMap<Endpoint, FailureReason>,
    },

    /// A user-defined function failed during execution
    #[error("error executing function {keyspace}.{function}: {detail}")]
    FunctionFailure {
        /// Keyspace of the function
        keyspace: String,
        /// Function name
        function: String,
        /// Argument type names
        arg_types: Vec<String>,
        /// Failure detail
        detail: String,
    },

    /// Replicas failed (rather than timed out) during a write
    #[error(
        "{write_type} write failure at {consistency}: received {received} of {block_for} responses, {n} replica failure(s)",
        n = .failure_reasons.len()
    )]
    WriteFailure {
        /// What kind of write failed
        write_type: WriteType,
        /// Requested consistency level
        consistency: ConsistencyLevel,
        /// Acknowledgments received
        received: u32,
        /// Acknowledgments required
        block_for: u32,
        /// Per-endpoint failure reasons, every entry preserved
        failure_reasons: HashMap<Endpoint, FailureReason>,
    },

    /// The query could not be parsed
    #[error("syntax error: {message}")]
    Syntax {
        /// Parser message
        message: String,
    },

    /// The authenticated user may not perform the operation
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Authorization message
        message: String,
    },

    /// The request is syntactically valid but semantically wrong
    #[error("invalid request: {message}")]
    Invalid {
        /// Validation message
        message: String,
    },

    /// The request conflicts with server configuration
    #[error("configuration error: {message}")]
    Config {
        /// Configuration message
        message: String,
    },

    /// The keyspace or table to create already exists
    #[error("{}", already_exists_message(.keyspace, .table))]
    AlreadyExists {
        /// Conflicting keyspace
        keyspace: String,
        /// Conflicting table, absent for keyspace-only conflicts
        table: Option<String>,
    },

    /// The statement to execute is not prepared on this node
    #[error("prepared statement with id {id} not found")]
    Unprepared {
        /// Digest of the missing statement
        id: StatementId,
    },

    /// A protocol-level violation
    #[error("protocol error: {message}")]
    Protocol {
        /// Violation description
        message: String,
    },
}

fn already_exists_message(keyspace: &str, table: &Option<String>) -> String {
    match table {
        Some(t) => format!("table {}.{} already exists", keyspace, t),
        None => format!("keyspace {} already exists", keyspace),
    }
}

impl CqlException {
    /// Shorthand for an invalid-request exception.
    pub fn invalid(message: impl Into<String>) -> Self {
        CqlException::Invalid {
            message: message.into(),
        }
    }

    /// Shorthand for a protocol exception.
    pub fn protocol(message: impl Into<String>) -> Self {
        CqlException::Protocol {
            message: message.into(),
        }
    }
}
