//! Error taxonomy translation
//!
//! Every internal failure code the bridge knows converts to exactly
//! one external exception, field by field. The one the bridge does
//! not map (CAS-write-unknown) passes through unchanged so callers
//! still see the real failure. Authentication failures are the single
//! asymmetry: the internal cause is dropped so nothing engine-side
//! leaks to an unauthenticated caller.

use crate::params::{external_consistency, external_write_type};
use gangway_core::digest::StatementId;
use gangway_core::error::{CqlException, Endpoint, FailureReason};
use gangway_engine::error::EngineException;
use gangway_engine::types::DEFAULT_STORAGE_PORT;
use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

/// The outcome of translating an internal failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// A failure with an external mapping. The original internal
    /// exception rides along as the cause, except for authentication
    /// failures, which deliberately drop it.
    #[error("{exception}")]
    Cql {
        /// The translated external exception
        exception: CqlException,
        /// The internal failure that produced it
        cause: Option<EngineException>,
    },
    /// An internal failure with no external mapping, passed through.
    #[error(transparent)]
    Engine(EngineException),
}

impl ExecutionError {
    fn mapped(exception: CqlException, cause: EngineException) -> Self {
        ExecutionError::Cql {
            exception,
            cause: Some(cause),
        }
    }

    /// Shorthand for an already-external failure with no internal cause.
    pub fn external(exception: CqlException) -> Self {
        ExecutionError::Cql {
            exception,
            cause: None,
        }
    }
}

impl From<CqlException> for ExecutionError {
    fn from(exception: CqlException) -> Self {
        ExecutionError::external(exception)
    }
}

fn external_failure_reasons(reasons: &HashMap<IpAddr, u16>) -> HashMap<Endpoint, FailureReason> {
    reasons
        .iter()
        .map(|(address, code)| {
            (
                Endpoint::new(*address, DEFAULT_STORAGE_PORT),
                FailureReason::from_code(*code),
            )
        })
        .collect()
}

/// Translate an internal failure into the external hierarchy.
pub fn translate(failure: EngineException) -> ExecutionError {
    let exception = match &failure {
        EngineException::Server { message } => CqlException::Server {
            message: message.clone(),
        },
        EngineException::Authentication { message } => {
            // Strip the cause: nothing internal reaches an
            // unauthenticated caller.
            return ExecutionError::external(CqlException::Authentication {
                message: message.clone(),
            });
        }
        EngineException::Unavailable {
            consistency,
            required,
            alive,
        } => CqlException::Unavailable {
            consistency: external_consistency(*consistency),
            required: *required,
            alive: *alive,
        },
        EngineException::Overloaded { message } => CqlException::Overloaded {
            message: message.clone(),
        },
        EngineException::IsBootstrapping => CqlException::IsBootstrapping,
        EngineException::Truncate { message, cause } => CqlException::Truncate {
            message: cause.clone().unwrap_or_else(|| message.clone()),
        },
        EngineException::WriteTimeout {
            write_type,
            consistency,
            received,
            block_for,
        } => CqlException::WriteTimeout {
            write_type: external_write_type(*write_type),
            consistency: external_consistency(*consistency),
            received: *received,
            block_for: *block_for,
        },
        EngineException::ReadTimeout {
            consistency,
            received,
            block_for,
            data_present,
        } => CqlException::ReadTimeout {
            consistency: external_consistency(*consistency),
            received: *received,
            block_for: *block_for,
            data_present: *data_present,
        },
        EngineException::ReadFailure {
            consistency,
            received,
            block_for,
            data_present,
            failure_reasons,
        } => CqlException::ReadFailure {
            consistency: external_consistency(*consistency),
            received: *received,
            block_for: *block_for,
            data_present: *data_present,
            failure_reasons: external_failure_reasons(failure_reasons),
        },
        EngineException::FunctionFailure {
            keyspace,
            function,
            arg_types,
            detail,
        } => CqlException::FunctionFailure {
            keyspace: keyspace.clone(),
            function: function.clone(),
            arg_types: arg_types.clone(),
            detail: detail.clone(),
        },
        EngineException::WriteFailure {
            write_type,
            consistency,
            received,
            block_for,
            failure_reasons,
        } => CqlException::WriteFailure {
            write_type: external_write_type(*write_type),
            consistency: external_consistency(*consistency),
            received: *received,
            block_for: *block_for,
            failure_reasons: external_failure_reasons(failure_reasons),
        },
        EngineException::CasWriteUnknown { .. } => {
            tracing::warn!(
                code = failure.code().value(),
                "no external mapping for internal failure, passing it through"
            );
            return ExecutionError::Engine(failure);
        }
        EngineException::Syntax { message } => CqlException::Syntax {
            message: message.clone(),
        },
        EngineException::Unauthorized { message } => CqlException::Unauthorized {
            message: message.clone(),
        },
        EngineException::Invalid { message } => CqlException::Invalid {
            message: message.clone(),
        },
        EngineException::Config { message } => CqlException::Config {
            message: message.clone(),
        },
        EngineException::AlreadyExists { keyspace, table } => CqlException::AlreadyExists {
            keyspace: keyspace.clone(),
            table: table.clone(),
        },
        EngineException::Unprepared { id } => CqlException::Unprepared {
            id: StatementId::wrap(*id.as_bytes()),
        },
        EngineException::Protocol { message } => CqlException::Protocol {
            message: message.clone(),
        },
    };
    ExecutionError::mapped(exception, failure)
}
