//! Internal failure taxonomy
//!
//! The engine reports failures as exceptions tagged with a numeric
//! code. The bridge translates each code it knows into the external
//! hierarchy; codes it does not map (today only `CasWriteUnknown`)
//! pass through unchanged.

use crate::types::{Consistency, EngineWriteType, Md5Digest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

/// Numeric failure codes the engine tags its exceptions with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ExceptionCode {
    ServerError,
    ProtocolError,
    BadCredentials,
    Unavailable,
    Overloaded,
    IsBootstrapping,
    TruncateError,
    WriteTimeout,
    ReadTimeout,
    ReadFailure,
    FunctionFailure,
    WriteFailure,
    CdcWriteFailure,
    CasWriteUnknown,
    SyntaxError,
    Unauthorized,
    Invalid,
    ConfigError,
    AlreadyExists,
    Unprepared,
}

impl ExceptionCode {
    /// The wire value of this code.
    pub fn value(&self) -> u32 {
        match self {
            ExceptionCode::ServerError => 0x0000,
            ExceptionCode::ProtocolError => 0x000A,
            ExceptionCode::BadCredentials => 0x0100,
            ExceptionCode::Unavailable => 0x1000,
            ExceptionCode::Overloaded => 0x1001,
            ExceptionCode::IsBootstrapping => 0x1002,
            ExceptionCode::TruncateError => 0x1003,
            ExceptionCode::WriteTimeout => 0x1100,
            ExceptionCode::ReadTimeout => 0x1200,
            ExceptionCode::ReadFailure => 0x1300,
            ExceptionCode::FunctionFailure => 0x1400,
            ExceptionCode::WriteFailure => 0x1500,
            ExceptionCode::CdcWriteFailure => 0x1600,
            ExceptionCode::CasWriteUnknown => 0x1700,
            ExceptionCode::SyntaxError => 0x2000,
            ExceptionCode::Unauthorized => 0x2100,
            ExceptionCode::Invalid => 0x2200,
            ExceptionCode::ConfigError => 0x2300,
            ExceptionCode::AlreadyExists => 0x2400,
            ExceptionCode::Unprepared => 0x2500,
        }
    }
}

/// An internal engine failure, tagged by code and carrying the
/// diagnostic payload specific to that code.
///
/// Replica failure maps are keyed by plain address; the engine's
/// endpoint identity has no port.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum EngineException {
    /// Unexpected server-side fault
    #[error("server error: {message}")]
    Server {
        /// Fault description
        message: String,
    },

    /// Authentication failed
    #[error("bad credentials: {message}")]
    Authentication {
        /// Failure description
        message: String,
    },

    /// Not enough live replicas for the consistency level
    #[error("unavailable at {consistency}: {required} required, {alive} alive")]
    Unavailable {
        /// Requested consistency level
        consistency: Consistency,
        /// Replicas required
        required: u32,
        /// Replicas alive
        alive: u32,
    },

    /// The coordinator is shedding load
    #[error("overloaded: {message}")]
    Overloaded {
        /// Fault description
        message: String,
    },

    /// The node is still bootstrapping
    #[error("bootstrapping")]
    IsBootstrapping,

    /// A truncate failed; carries a cause message when one exists
    #[error("truncate error: {message}")]
    Truncate {
        /// The truncate message
        message: String,
        /// The underlying cause's message, when the engine captured one
        cause: Option<String>,
    },

    /// A write timed out waiting for acknowledgments
    #[error("{write_type:?} write timeout at {consistency}")]
    WriteTimeout {
        /// Kind of write
        write_type: EngineWriteType,
        /// Requested consistency level
        consistency: Consistency,
        /// Acknowledgments received
        received: u32,
        /// Acknowledgments required
        block_for: u32,
    },

    /// A read timed out waiting for responses
    #[error("read timeout at {consistency}")]
    ReadTimeout {
        /// Requested consistency level
        consistency: Consistency,
        /// Responses received
        received: u32,
        /// Responses required
        block_for: u32,
        /// Whether the data replica responded
        data_present: bool,
    },

    /// Replicas failed outright during a read
    #[error("read failure at {consistency}")]
    ReadFailure {
        /// Requested consistency level
        consistency: Consistency,
        /// Responses received
        received: u32,
        /// Responses required
        block_for: u32,
        /// Whether the data replica responded
        data_present: bool,
        /// Failure reason code per replica address
        failure_reasons: HashMap<IpAddr, u16>,
    },

    /// A user-defined function failed
    #[error("function failure in {keyspace}.{function}: {detail}")]
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

    /// Replicas failed outright during a write
    #[error("{write_type:?} write failure at {consistency}")]
    WriteFailure {
        /// Kind of write
        write_type: EngineWriteType,
        /// Requested consistency level
        consistency: Consistency,
        /// Acknowledgments received
        received: u32,
        /// Acknowledgments required
        block_for: u32,
        /// Failure reason code per replica address
        failure_reasons: HashMap<IpAddr, u16>,
    },

    /// A compare-and-set write landed in an unknown state
    #[error("CAS write unknown at {consistency}")]
    CasWriteUnknown {
        /// Requested consistency level
        consistency: Consistency,
        /// Acknowledgments received
        received: u32,
        /// Acknowledgments required
        block_for: u32,
    },

    /// The query could not be parsed
    #[error("syntax error: {message}")]
    Syntax {
        /// Parser message
        message: String,
    },

    /// The user may not perform the operation
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Authorization message
        message: String,
    },

    /// The request is semantically invalid
    #[error("invalid request: {message}")]
    Invalid {
        /// Validation message
        message: String,
    },

    /// The request conflicts with configuration
    #[error("configuration error: {message}")]
    Config {
        /// Configuration message
        message: String,
    },

    /// The keyspace or table already exists
    #[error("{}", already_exists_detail(.keyspace, .table))]
    AlreadyExists {
        /// Conflicting keyspace
        keyspace: String,
        /// Conflicting table, empty-equivalent for keyspace conflicts
        table: Option<String>,
    },

    /// The statement digest is not prepared on this node
    #[error("unprepared statement {id}")]
    Unprepared {
        /// Digest of the missing statement
        id: Md5Digest,
    },

    /// A protocol-level violation
    #[error("protocol error: {message}")]
    Protocol {
        /// Violation description
        message: String,
    },
}

fn already_exists_detail(keyspace: &str, table: &Option<String>) -> String {
    match table {
        Some(t) => format!("already exists: {}.{}", keyspace, t),
        None => format!("already exists: {}", keyspace),
    }
}

impl EngineException {
    /// The numeric code this exception is tagged with.
    pub fn code(&self) -> ExceptionCode {
        match self {
            EngineException::Server { .. } => ExceptionCode::ServerError,
            EngineException::Authentication { .. } => ExceptionCode::BadCredentials,
            EngineException::Unavailable { .. } => ExceptionCode::Unavailable,
            EngineException::Overloaded { .. } => ExceptionCode::Overloaded,
            EngineException::IsBootstrapping => ExceptionCode::IsBootstrapping,
            EngineException::Truncate { .. } => ExceptionCode::TruncateError,
            EngineException::WriteTimeout { .. } => ExceptionCode::WriteTimeout,
            EngineException::ReadTimeout { .. } => ExceptionCode::ReadTimeout,
            EngineException::ReadFailure { .. } => ExceptionCode::ReadFailure,
            EngineException::FunctionFailure { .. } => ExceptionCode::FunctionFailure,
            EngineException::WriteFailure { .. } => ExceptionCode::WriteFailure,
            EngineException::CasWriteUnknown { .. } => ExceptionCode::CasWriteUnknown,
            EngineException::Syntax { .. } => ExceptionCode::SyntaxError,
            EngineException::Unauthorized { .. } => ExceptionCode::Unauthorized,
            EngineException::Invalid { .. } => ExceptionCode::Invalid,
            EngineException::Config { .. } => ExceptionCode::ConfigError,
            EngineException::AlreadyExists { .. } => ExceptionCode::AlreadyExists,
            EngineException::Unprepared { .. } => ExceptionCode::Unprepared,
            EngineException::Protocol { .. } => ExceptionCode::ProtocolError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values_are_unique() {
        let codes = [
            ExceptionCode::ServerError,
            ExceptionCode::ProtocolError,
            ExceptionCode::BadCredentials,
            ExceptionCode::Unavailable,
            ExceptionCode::Overloaded,
            ExceptionCode::IsBootstrapping,
            ExceptionCode::TruncateError,
            ExceptionCode::WriteTimeout,
            ExceptionCode::ReadTimeout,
            ExceptionCode::ReadFailure,
            ExceptionCode::FunctionFailure,
            ExceptionCode::WriteFailure,
            ExceptionCode::CdcWriteFailure,
            ExceptionCode::CasWriteUnknown,
            ExceptionCode::SyntaxError,
            ExceptionCode::Unauthorized,
            ExceptionCode::Invalid,
            ExceptionCode::ConfigError,
            ExceptionCode::AlreadyExists,
            ExceptionCode::Unprepared,
        ];
        let mut values: Vec<u32> = codes.iter().map(|c| c.value()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), codes.len(), "duplicate exception code value");
    }

    #[test]
    fn test_exception_reports_its_code() {
        let e = EngineException::Syntax {
            message: "unexpected token".to_string(),
        };
        assert_eq!(e.code(), ExceptionCode::SyntaxError);
        assert_eq!(e.code().value(), 0x2000);
    }

    #[test]
    fn test_truncate_carries_optional_cause() {
        let e = EngineException::Truncate {
            message: "truncate failed".to_string(),
            cause: Some("disk error".to_string()),
        };
        match e {
            EngineException::Truncate { cause, .. } => {
                assert_eq!(cause.as_deref(), Some("disk error"))
            }
            _ => panic!("wrong variant"),
        }
    }
}
