//! Parameter marshalling
//!
//! Builds engine execution options from client query parameters.
//! Every field is converted eagerly, so the only runtime failures
//! left are a protocol version too old to execute and a malformed
//! paging token. Absent optionals become the engine's sentinels.

use gangway_core::consistency::{ConsistencyLevel, WriteType};
use gangway_core::error::CqlException;
use gangway_core::params::QueryParameters;
use gangway_core::protocol::ProtocolVersion;
use gangway_engine::options::{
    BoundBytes, ExecutionOptions, SpecificOptions, NO_PAGE_SIZE, NO_TIMESTAMP,
};
use gangway_engine::paging::PagingState;
use gangway_engine::types::{Consistency, EngineProtocolVersion, EngineWriteType};

/// Convert a client consistency level to the engine's.
pub fn internal_consistency(level: ConsistencyLevel) -> Consistency {
    match level {
        ConsistencyLevel::Any => Consistency::Any,
        ConsistencyLevel::One => Consistency::One,
        ConsistencyLevel::Two => Consistency::Two,
        ConsistencyLevel::Three => Consistency::Three,
        ConsistencyLevel::Quorum => Consistency::Quorum,
        ConsistencyLevel::All => Consistency::All,
        ConsistencyLevel::LocalQuorum => Consistency::LocalQuorum,
        ConsistencyLevel::EachQuorum => Consistency::EachQuorum,
        ConsistencyLevel::Serial => Consistency::Serial,
        ConsistencyLevel::LocalSerial => Consistency::LocalSerial,
        ConsistencyLevel::LocalOne => Consistency::LocalOne,
    }
}

/// Convert an engine consistency level to the client's.
pub fn external_consistency(level: Consistency) -> ConsistencyLevel {
    match level {
        Consistency::Any => ConsistencyLevel::Any,
        Consistency::One => ConsistencyLevel::One,
        Consistency::Two => ConsistencyLevel::Two,
        Consistency::Three => ConsistencyLevel::Three,
        Consistency::Quorum => ConsistencyLevel::Quorum,
        Consistency::All => ConsistencyLevel::All,
        Consistency::LocalQuorum => ConsistencyLevel::LocalQuorum,
        Consistency::EachQuorum => ConsistencyLevel::EachQuorum,
        Consistency::Serial => ConsistencyLevel::Serial,
        Consistency::LocalSerial => ConsistencyLevel::LocalSerial,
        Consistency::LocalOne => ConsistencyLevel::LocalOne,
    }
}

/// Convert an engine write type to the client's.
pub fn external_write_type(write_type: EngineWriteType) -> WriteType {
    match write_type {
        EngineWriteType::Simple => WriteType::Simple,
        EngineWriteType::Batch => WriteType::Batch,
        EngineWriteType::UnloggedBatch => WriteType::UnloggedBatch,
        EngineWriteType::Counter => WriteType::Counter,
        EngineWriteType::BatchLog => WriteType::BatchLog,
        EngineWriteType::Cas => WriteType::Cas,
        EngineWriteType::View => WriteType::View,
        EngineWriteType::Cdc => WriteType::Cdc,
    }
}

/// Convert a client protocol version to the engine's.
///
/// Versions below V3 are representable on the client side but cannot
/// execute anything.
pub fn internal_version(version: ProtocolVersion) -> Result<EngineProtocolVersion, CqlException> {
    match version {
        ProtocolVersion::V3 => Ok(EngineProtocolVersion::V3),
        ProtocolVersion::V4 => Ok(EngineProtocolVersion::V4),
        ProtocolVersion::V5 => Ok(EngineProtocolVersion::V5),
        ProtocolVersion::V1 | ProtocolVersion::V2 => Err(CqlException::protocol(format!(
            "Unsupported protocol version: {}",
            version
        ))),
    }
}

/// Build engine execution options from client parameters and the
/// already-serialized bound values.
///
/// `names` enables by-name binding; it is purely additive and leaves
/// positional binding untouched when absent.
pub fn marshal_options(
    params: &QueryParameters,
    values: Vec<BoundBytes>,
    names: Option<Vec<String>>,
) -> Result<ExecutionOptions, CqlException> {
    let protocol_version = internal_version(params.protocol_version)?;
    let paging_state = match &params.paging_state {
        Some(token) => {
            // Decoding consumes its buffer, so work on a copy and
            // leave the caller's token intact.
            let mut buf = token.clone();
            let state = PagingState::deserialize(&mut buf, protocol_version)
                .map_err(|_| CqlException::protocol("Invalid value for the paging state"))?;
            Some(state)
        }
        None => None,
    };
    let serial_consistency = params
        .serial_consistency
        .map(internal_consistency)
        .unwrap_or(Consistency::Serial);
    Ok(ExecutionOptions {
        consistency: internal_consistency(params.consistency),
        values,
        names,
        skip_metadata: params.skip_metadata,
        specific: SpecificOptions {
            page_size: params.page_size.unwrap_or(NO_PAGE_SIZE),
            paging_state,
            serial_consistency,
            timestamp: params.default_timestamp.unwrap_or(NO_TIMESTAMP),
        },
        protocol_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quorum_params(version: ProtocolVersion) -> QueryParameters {
        QueryParameters::new(version, ConsistencyLevel::Quorum)
    }

    #[test]
    fn test_absent_optionals_become_sentinels() {
        let opts = marshal_options(&quorum_params(ProtocolVersion::V4), vec![], None).unwrap();
        assert_eq!(opts.specific.page_size, NO_PAGE_SIZE);
        assert_eq!(opts.specific.timestamp, NO_TIMESTAMP);
        assert_eq!(opts.specific.paging_state, None);
        assert_eq!(opts.specific.serial_consistency, Consistency::Serial);
    }

    #[test]
    fn test_present_optionals_are_carried() {
        let params = quorum_params(ProtocolVersion::V4)
            .with_page_size(50)
            .with_serial_consistency(ConsistencyLevel::LocalSerial)
            .with_default_timestamp(1234);
        let opts = marshal_options(&params, vec![], None).unwrap();
        assert_eq!(opts.specific.page_size, 50);
        assert_eq!(opts.specific.timestamp, 1234);
        assert_eq!(opts.specific.serial_consistency, Consistency::LocalSerial);
        assert_eq!(opts.consistency, Consistency::Quorum);
    }

    #[test]
    fn test_legacy_versions_are_rejected() {
        for version in [ProtocolVersion::V1, ProtocolVersion::V2] {
            let err =
                marshal_options(&quorum_params(version), vec![], None).unwrap_err();
            match err {
                CqlException::Protocol { message } => {
                    assert!(message.contains("Unsupported protocol version"))
                }
                other => panic!("wrong exception: {:?}", other),
            }
        }
    }

    #[test]
    fn test_paging_token_is_decoded_from_a_copy() {
        let state = PagingState {
            partition_key: Some(vec![1, 2]),
            row_mark: None,
            remaining: 10,
            remaining_in_partition: 5,
        };
        let token = state.serialize(EngineProtocolVersion::V4);
        let params =
            quorum_params(ProtocolVersion::V4).with_paging_state(Some(token.clone()));
        let opts = marshal_options(&params, vec![], None).unwrap();
        assert_eq!(opts.specific.paging_state, Some(state));
        // the caller's token survives the mutating decode
        assert_eq!(params.paging_state, Some(token));
    }

    #[test]
    fn test_malformed_paging_token_is_a_protocol_error() {
        let params =
            quorum_params(ProtocolVersion::V4).with_paging_state(Some(vec![0xFF, 0x01]));
        let err = marshal_options(&params, vec![], None).unwrap_err();
        assert_eq!(
            err,
            CqlException::protocol("Invalid value for the paging state")
        );
    }

    #[test]
    fn test_names_are_additive() {
        let values = vec![BoundBytes::Value(vec![1])];
        let names = Some(vec!["a".to_string()]);
        let opts = marshal_options(
            &quorum_params(ProtocolVersion::V4),
            values.clone(),
            names.clone(),
        )
        .unwrap();
        assert_eq!(opts.values, values);
        assert_eq!(opts.names, names);
    }

    #[test]
    fn test_consistency_conversion_roundtrips() {
        for code in 0u16..=0x0A {
            let external = ConsistencyLevel::from_code(code).unwrap();
            assert_eq!(external_consistency(internal_consistency(external)), external);
        }
    }
}
