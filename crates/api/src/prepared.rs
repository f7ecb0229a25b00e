//! Client-facing prepared statements
//!
//! A [`PreparedStatement`] pairs a statement digest with its
//! bind-marker descriptors. Binding validates and serializes the
//! caller's values; execution marshals the parameters, runs the
//! statement through the engine and translates whatever comes back.

use crate::errors::{translate, ExecutionError};
use crate::params::marshal_options;
use crate::results::translate_result;
use crate::resultset::ResultSet;
use gangway_core::column::{Column, ValidationError};
use gangway_core::error::CqlException;
use gangway_core::params::QueryParameters;
use gangway_core::result::CqlResult;
use gangway_core::value::BoundValue;
use gangway_core::digest::StatementId;
use gangway_engine::exec::{BoundStatement, Executor, PreparedStatementRegistry};
use gangway_engine::options::BoundBytes;
use gangway_engine::types::Md5Digest;
use std::sync::Arc;
use std::time::Instant;

/// A statement prepared on this node, ready to bind and execute.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    id: StatementId,
    bind_markers: Vec<Column>,
}

fn wrong_value(position: usize, err: &ValidationError) -> CqlException {
    CqlException::invalid(format!(
        "Wrong value provided for value {} bound to {}. Provided type '{}' is not \
         compatible with expected CQL type '{}'.{}",
        position, err.location, err.provided_type, err.expected_cql_type, err.details
    ))
}

impl PreparedStatement {
    /// Build a prepared statement from its digest and bind markers.
    pub fn new(id: StatementId, bind_markers: Vec<Column>) -> Self {
        Self { id, bind_markers }
    }

    /// The statement's content digest.
    pub fn id(&self) -> &StatementId {
        &self.id
    }

    /// The bind-marker descriptors, in marker order.
    pub fn bind_markers(&self) -> &[Column] {
        &self.bind_markers
    }

    fn internal_id(&self) -> Md5Digest {
        Md5Digest::wrap(*self.id.as_bytes())
    }

    /// Validate and serialize the caller's values against the bind
    /// markers.
    ///
    /// The value count must match the marker count exactly; null and
    /// unset pass through as their distinct markers; everything else
    /// is validated (with coercion) against the declared type and
    /// encoded under the given parameters' protocol version.
    pub fn bind(
        &self,
        params: &QueryParameters,
        values: &[BoundValue],
    ) -> Result<Vec<BoundBytes>, CqlException> {
        if values.len() != self.bind_markers.len() {
            return Err(CqlException::invalid(format!(
                "Unexpected number of values provided: the prepared statement has {} markers \
                 but {} values provided",
                self.bind_markers.len(),
                values.len()
            )));
        }
        let mut bound = Vec::with_capacity(values.len());
        for (position, (marker, value)) in
            self.bind_markers.iter().zip(values.iter()).enumerate()
        {
            match value {
                BoundValue::Null => bound.push(BoundBytes::Null),
                BoundValue::Unset => bound.push(BoundBytes::Unset),
                BoundValue::Set(v) => {
                    let coerced = marker
                        .column_type
                        .validate(v, &marker.name)
                        .map_err(|e| wrong_value(position, &e))?;
                    if coerced.is_null() {
                        bound.push(BoundBytes::Null);
                        continue;
                    }
                    let bytes = marker
                        .column_type
                        .encode(&coerced, params.protocol_version)
                        .map_err(|e| CqlException::invalid(e.to_string()))?;
                    bound.push(BoundBytes::Value(bytes));
                }
            }
        }
        Ok(bound)
    }

    /// Execute one page of this statement and translate the result.
    ///
    /// Schema-changing statements block until every live node agrees
    /// on the schema before the result is returned, so a follow-up
    /// request routed anywhere in the cluster sees the new schema.
    pub async fn execute(
        &self,
        executor: &dyn Executor,
        registry: &dyn PreparedStatementRegistry,
        params: &QueryParameters,
        values: &[BoundValue],
        names: Option<Vec<String>>,
        started_at: Instant,
    ) -> Result<CqlResult, ExecutionError> {
        let bound = self.bind(params, values)?;
        let options = marshal_options(params, bound, names)?;
        let result = executor
            .execute(BoundStatement::new(self.internal_id()), options, started_at)
            .await
            .map_err(translate)?;
        if matches!(result.kind, gangway_engine::result::EngineResultKind::SchemaChange(_)) {
            executor.wait_for_schema_agreement();
        }
        let translated = translate_result(result, registry)?;
        Ok(translated)
    }

    /// Execute this statement and return a lazily-paged result set.
    ///
    /// Non-rows results yield an empty set; rows results buffer the
    /// first page and fetch later pages on demand.
    pub async fn query(
        &self,
        executor: Arc<dyn Executor>,
        params: &QueryParameters,
        values: &[BoundValue],
        names: Option<Vec<String>>,
        started_at: Instant,
    ) -> Result<ResultSet, ExecutionError> {
        let bound = self.bind(params, values)?;
        let options = marshal_options(params, bound, names)?;
        let statement = BoundStatement::new(self.internal_id());
        ResultSet::fetch(executor, statement, options, started_at).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_core::column::ColumnType;
    use gangway_core::consistency::ConsistencyLevel;
    use gangway_core::protocol::ProtocolVersion;
    use gangway_core::value::Value;

    fn statement() -> PreparedStatement {
        PreparedStatement::new(
            StatementId::wrap([1; 16]),
            vec![
                Column::regular("id", ColumnType::Int),
                Column::regular("name", ColumnType::Text),
            ],
        )
    }

    fn params() -> QueryParameters {
        QueryParameters::new(ProtocolVersion::V4, ConsistencyLevel::Quorum)
    }

    #[test]
    fn test_bind_count_mismatch_message() {
        let err = statement()
            .bind(&params(), &[BoundValue::Set(Value::Int(1))])
            .unwrap_err();
        assert_eq!(
            err,
            CqlException::invalid(
                "Unexpected number of values provided: the prepared statement has 2 markers \
                 but 1 values provided"
            )
        );
    }

    #[test]
    fn test_bind_serializes_in_marker_order() {
        let bound = statement()
            .bind(
                &params(),
                &[
                    BoundValue::Set(Value::Int(7)),
                    BoundValue::Set(Value::Text("x".into())),
                ],
            )
            .unwrap();
        assert_eq!(bound[0], BoundBytes::Value(vec![0, 0, 0, 7]));
        assert_eq!(bound[1], BoundBytes::Value(b"x".to_vec()));
    }

    #[test]
    fn test_bind_keeps_null_and_unset_distinct() {
        let bound = statement()
            .bind(&params(), &[BoundValue::Null, BoundValue::Unset])
            .unwrap();
        assert_eq!(bound, vec![BoundBytes::Null, BoundBytes::Unset]);
    }

    #[test]
    fn test_bind_coerces_before_encoding() {
        let wide = PreparedStatement::new(
            StatementId::wrap([2; 16]),
            vec![Column::regular("n", ColumnType::Bigint)],
        );
        let bound = wide
            .bind(&params(), &[BoundValue::Set(Value::Int(1))])
            .unwrap();
        assert_eq!(bound[0], BoundBytes::Value(vec![0, 0, 0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn test_bind_wrong_type_names_position_and_marker() {
        let err = statement()
            .bind(
                &params(),
                &[
                    BoundValue::Set(Value::Int(1)),
                    BoundValue::Set(Value::Int(2)),
                ],
            )
            .unwrap_err();
        match err {
            CqlException::Invalid { message } => {
                assert!(
                    message.starts_with("Wrong value provided for value 1 bound to name."),
                    "message was: {}",
                    message
                );
                assert!(message.contains("'int'"));
                assert!(message.contains("'text'"));
            }
            other => panic!("wrong exception: {:?}", other),
        }
    }

    #[test]
    fn test_bind_plain_value_against_list_names_the_position() {
        let lists = PreparedStatement::new(
            StatementId::wrap([3; 16]),
            vec![Column::regular("xs", ColumnType::list(ColumnType::Int, false))],
        );
        let err = lists
            .bind(&params(), &[BoundValue::Set(Value::Int(7))])
            .unwrap_err();
        match err {
            CqlException::Invalid { message } => {
                assert!(
                    message.contains("value 0 bound to xs"),
                    "message was: {}",
                    message
                );
                assert!(message.contains("'int'"));
                assert!(message.contains("'list<int>'"));
            }
            other => panic!("wrong exception: {:?}", other),
        }
    }

    #[test]
    fn test_bind_rejects_legacy_versions() {
        let legacy = QueryParameters::new(ProtocolVersion::V2, ConsistencyLevel::One);
        let err = statement()
            .bind(
                &legacy,
                &[
                    BoundValue::Set(Value::Int(1)),
                    BoundValue::Set(Value::Text("x".into())),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, CqlException::Invalid { .. }));
    }
}
