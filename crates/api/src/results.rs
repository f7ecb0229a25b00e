//! Result translation
//!
//! Converts internal execution results into the external result
//! model. Rows metadata gains the has-more-pages flag exactly when a
//! continuation token is attached; prepared results resolve their
//! partition-key bind indexes against the registry; the tracing
//! identifier is copied across unconditionally.

use crate::errors::ExecutionError;
use crate::typemap::external_column;
use gangway_core::column::Column;
use gangway_core::digest::StatementId;
use gangway_core::error::CqlException;
use gangway_core::result::{
    CqlResult, CqlResultKind, PreparedMetadata, ResultFlag, ResultMetadata, SchemaChangeMetadata,
};
use gangway_engine::exec::PreparedStatementRegistry;
use gangway_engine::paging::PagingState;
use gangway_engine::result::{
    EngineResult, EngineResultKind, InternalColumnSpec, SchemaChangeEvent,
};
use gangway_engine::types::{EngineProtocolVersion, Md5Digest};

fn external_columns(specs: &[InternalColumnSpec]) -> Result<Vec<Column>, CqlException> {
    specs
        .iter()
        .map(|spec| {
            external_column(spec).map_err(|e| CqlException::Server {
                message: e.to_string(),
            })
        })
        .collect()
}

fn shares_one_table(columns: &[Column]) -> bool {
    match columns.first() {
        Some(first) => columns
            .iter()
            .all(|c| c.keyspace == first.keyspace && c.table == first.table),
        None => false,
    }
}

/// Build external rows metadata from internal column specifications
/// and an optional continuation state, serialized under the protocol
/// version the continuation was produced for.
///
/// The result-shape digest stays unassigned: resolving it for paged
/// rows is still an open gap, and callers must not rely on it.
pub fn to_result_metadata(
    specs: &[InternalColumnSpec],
    paging: Option<(&PagingState, EngineProtocolVersion)>,
) -> Result<ResultMetadata, CqlException> {
    let columns = external_columns(specs)?;
    let mut flags = Vec::new();
    if shares_one_table(&columns) {
        flags.push(ResultFlag::GlobalTablesSpec);
    }
    let paging_state = paging.map(|(state, version)| state.serialize(version));
    if paging_state.is_some() {
        flags.push(ResultFlag::HasMorePages);
    }
    Ok(ResultMetadata {
        flags,
        columns,
        result_metadata_id: None,
        paging_state,
    })
}

/// Build external prepared metadata from internal bind-marker
/// specifications and the statement's partition-key bind indexes.
pub fn to_prepared_metadata(
    specs: &[InternalColumnSpec],
    partition_key_bind_indexes: Vec<u16>,
) -> Result<PreparedMetadata, CqlException> {
    let columns = external_columns(specs)?;
    let mut flags = Vec::new();
    if shares_one_table(&columns) {
        flags.push(ResultFlag::GlobalTablesSpec);
    }
    Ok(PreparedMetadata {
        flags,
        columns,
        partition_key_bind_indexes,
    })
}

/// Flatten an internal schema change event into the external form.
pub fn to_schema_change(event: &SchemaChangeEvent) -> SchemaChangeMetadata {
    SchemaChangeMetadata {
        change: event.change.as_str().to_string(),
        target: event.target.as_str().to_string(),
        keyspace: event.keyspace.clone(),
        name: event.name.clone().unwrap_or_default(),
        arg_types: event.arg_types.clone(),
    }
}

/// Translate an internal result into the external model.
///
/// Prepared results ask the registry for the statement's
/// partition-key bind indexes; an unknown digest yields an empty
/// index list rather than a failure.
pub fn translate_result(
    result: EngineResult,
    registry: &dyn PreparedStatementRegistry,
) -> Result<CqlResult, ExecutionError> {
    let tracing_id = result.tracing_id;
    let kind = match result.kind {
        EngineResultKind::Void => CqlResultKind::Void,
        EngineResultKind::Rows { rows, metadata } => {
            let translated = to_result_metadata(
                &metadata.columns,
                metadata
                    .paging_state
                    .as_ref()
                    .map(|state| (state, metadata.protocol_version)),
            )?;
            CqlResultKind::Rows {
                rows,
                metadata: translated,
            }
        }
        EngineResultKind::SetKeyspace(keyspace) => CqlResultKind::SetKeyspace(keyspace),
        EngineResultKind::SchemaChange(event) => {
            CqlResultKind::SchemaChange(to_schema_change(&event))
        }
        EngineResultKind::Prepared {
            id,
            result_columns,
            bind_columns,
        } => {
            let indexes = registry.partition_key_bind_indexes(&id).unwrap_or_default();
            CqlResultKind::Prepared {
                id: external_statement_id(&id),
                result_metadata: to_result_metadata(&result_columns, None)?,
                bind_metadata: to_prepared_metadata(&bind_columns, indexes)?,
            }
        }
    };
    Ok(CqlResult::new(kind).with_tracing_id(tracing_id))
}

/// Convert an engine statement digest to the external form.
pub fn external_statement_id(id: &Md5Digest) -> StatementId {
    StatementId::wrap(*id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_core::column::ColumnType;
    use gangway_engine::marshal::{InternalScalar, InternalType};
    use gangway_engine::result::{ChangeKind, RowsMetadata, TargetKind};
    use uuid::Uuid;

    struct FixedRegistry(Option<Vec<u16>>);

    impl PreparedStatementRegistry for FixedRegistry {
        fn partition_key_bind_indexes(&self, _id: &Md5Digest) -> Option<Vec<u16>> {
            self.0.clone()
        }
    }

    fn spec(keyspace: &str, table: &str, name: &str) -> InternalColumnSpec {
        InternalColumnSpec {
            keyspace: keyspace.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            column_type: InternalType::scalar(InternalScalar::Utf8),
        }
    }

    #[test]
    fn test_has_more_pages_iff_paging_state() {
        let specs = [spec("ks", "t", "a")];
        let state = PagingState {
            partition_key: None,
            row_mark: None,
            remaining: 1,
            remaining_in_partition: 1,
        };
        let with =
            to_result_metadata(&specs, Some((&state, EngineProtocolVersion::V4))).unwrap();
        assert!(with.has_more_pages());
        assert!(with.paging_state.is_some());
        let without = to_result_metadata(&specs, None).unwrap();
        assert!(!without.has_more_pages());
        assert_eq!(without.paging_state, None);
    }

    #[test]
    fn test_global_tables_spec_requires_one_table() {
        let same = [spec("ks", "t", "a"), spec("ks", "t", "b")];
        let m = to_result_metadata(&same, None).unwrap();
        assert!(m.flags.contains(&ResultFlag::GlobalTablesSpec));
        let mixed = [spec("ks", "t", "a"), spec("ks", "other", "b")];
        let m = to_result_metadata(&mixed, None).unwrap();
        assert!(!m.flags.contains(&ResultFlag::GlobalTablesSpec));
        let empty: [InternalColumnSpec; 0] = [];
        let m = to_result_metadata(&empty, None).unwrap();
        assert!(m.flags.is_empty());
    }

    #[test]
    fn test_result_metadata_id_stays_unassigned() {
        let m = to_result_metadata(&[spec("ks", "t", "a")], None).unwrap();
        assert_eq!(m.result_metadata_id, None);
    }

    #[test]
    fn test_column_types_are_bridged() {
        let mut s = spec("ks", "t", "score");
        s.column_type = InternalType::scalar(InternalScalar::Long);
        let m = to_result_metadata(&[s], None).unwrap();
        assert_eq!(m.columns[0].column_type, ColumnType::Bigint);
        assert_eq!(m.columns[0].name, "score");
    }

    #[test]
    fn test_unmappable_column_is_a_server_error() {
        let mut s = spec("ks", "t", "ghost");
        s.column_type = InternalType::scalar(InternalScalar::EmptyType);
        let err = to_result_metadata(&[s], None).unwrap_err();
        assert!(matches!(err, CqlException::Server { .. }));
    }

    #[test]
    fn test_tracing_id_is_copied_unconditionally() {
        let registry = FixedRegistry(None);
        let id = Uuid::new_v4();
        let mut result = EngineResult::new(EngineResultKind::Void);
        result.tracing_id = Some(id);
        let translated = translate_result(result, &registry).unwrap();
        assert_eq!(translated.tracing_id, Some(id));
        let translated =
            translate_result(EngineResult::new(EngineResultKind::Void), &registry).unwrap();
        assert_eq!(translated.tracing_id, None);
    }

    #[test]
    fn test_prepared_result_resolves_bind_indexes() {
        let registry = FixedRegistry(Some(vec![1, 0]));
        let result = EngineResult::new(EngineResultKind::Prepared {
            id: Md5Digest::wrap([3; 16]),
            result_columns: vec![spec("ks", "t", "a")],
            bind_columns: vec![spec("ks", "t", "pk2"), spec("ks", "t", "pk1")],
        });
        let translated = translate_result(result, &registry).unwrap();
        match translated.kind {
            CqlResultKind::Prepared {
                id, bind_metadata, ..
            } => {
                assert_eq!(id, StatementId::wrap([3; 16]));
                assert_eq!(bind_metadata.partition_key_bind_indexes, vec![1, 0]);
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_prepared_result_with_unknown_digest_gets_no_indexes() {
        let registry = FixedRegistry(None);
        let result = EngineResult::new(EngineResultKind::Prepared {
            id: Md5Digest::wrap([4; 16]),
            result_columns: vec![],
            bind_columns: vec![],
        });
        let translated = translate_result(result, &registry).unwrap();
        match translated.kind {
            CqlResultKind::Prepared { bind_metadata, .. } => {
                assert!(bind_metadata.partition_key_bind_indexes.is_empty())
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_schema_change_flattens_to_strings() {
        let event = SchemaChangeEvent {
            change: ChangeKind::Created,
            target: TargetKind::Table,
            keyspace: "ks".to_string(),
            name: Some("t".to_string()),
            arg_types: vec![],
        };
        let m = to_schema_change(&event);
        assert_eq!(m.change, "CREATED");
        assert_eq!(m.target, "TABLE");
        assert_eq!(m.name, "t");
        let keyspace_only = SchemaChangeEvent {
            change: ChangeKind::Dropped,
            target: TargetKind::Keyspace,
            keyspace: "ks".to_string(),
            name: None,
            arg_types: vec![],
        };
        assert_eq!(to_schema_change(&keyspace_only).name, "");
    }

    #[test]
    fn test_rows_translate_with_paging() {
        let registry = FixedRegistry(None);
        let state = PagingState {
            partition_key: Some(vec![9]),
            row_mark: None,
            remaining: 3,
            remaining_in_partition: 3,
        };
        let result = EngineResult::new(EngineResultKind::Rows {
            rows: vec![vec![Some(vec![0x61])]],
            metadata: RowsMetadata {
                columns: vec![spec("ks", "t", "a")],
                paging_state: Some(state.clone()),
                protocol_version: EngineProtocolVersion::V4,
            },
        });
        let translated = translate_result(result, &registry).unwrap();
        match translated.kind {
            CqlResultKind::Rows { rows, metadata } => {
                assert_eq!(rows.len(), 1);
                assert!(metadata.has_more_pages());
                assert_eq!(
                    metadata.paging_state,
                    Some(state.serialize(EngineProtocolVersion::V4))
                );
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_paging_state_serializes_under_the_negotiated_version() {
        let registry = FixedRegistry(None);
        let state = PagingState {
            partition_key: Some(vec![9]),
            row_mark: Some(vec![7]),
            remaining: 3,
            remaining_in_partition: 3,
        };
        let result = EngineResult::new(EngineResultKind::Rows {
            rows: vec![],
            metadata: RowsMetadata {
                columns: vec![spec("ks", "t", "a")],
                paging_state: Some(state.clone()),
                protocol_version: EngineProtocolVersion::V3,
            },
        });
        let translated = translate_result(result, &registry).unwrap();
        match translated.kind {
            CqlResultKind::Rows { metadata, .. } => {
                let token = metadata.paging_state.unwrap();
                assert_eq!(token, state.serialize(EngineProtocolVersion::V3));
                assert_ne!(
                    token,
                    state.serialize(EngineProtocolVersion::V4),
                    "v3 tokens use short segment lengths"
                );
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_prepared_result_metadata_carries_no_paging() {
        let registry = FixedRegistry(None);
        let result = EngineResult::new(EngineResultKind::Prepared {
            id: Md5Digest::wrap([5; 16]),
            result_columns: vec![spec("ks", "t", "a")],
            bind_columns: vec![],
        });
        let translated = translate_result(result, &registry).unwrap();
        match translated.kind {
            CqlResultKind::Prepared {
                result_metadata, ..
            } => {
                assert_eq!(result_metadata.paging_state, None);
                assert!(!result_metadata.has_more_pages());
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }
}
