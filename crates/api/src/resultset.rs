//! Lazily-paged result sets
//!
//! Wraps a rows result so callers can iterate rows without caring
//! about page boundaries: the first page is buffered up front and
//! later pages are fetched from the engine only when the buffer runs
//! dry.

use crate::errors::{translate, ExecutionError};
use crate::typemap::external_column;
use gangway_core::column::Column;
use gangway_core::error::CqlException;
use gangway_core::result::Row;
use gangway_engine::exec::{BoundStatement, Executor};
use gangway_engine::options::ExecutionOptions;
use gangway_engine::paging::PagingState;
use gangway_engine::result::{EngineResultKind, RowsMetadata};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A result set that fetches pages on demand.
pub struct ResultSet {
    executor: Arc<dyn Executor>,
    statement: Option<BoundStatement>,
    options: Option<ExecutionOptions>,
    columns: Vec<Column>,
    buffered: VecDeque<Row>,
    next_page: Option<PagingState>,
    tracing_id: Option<Uuid>,
    applied: bool,
    started_at: Instant,
}

impl ResultSet {
    /// Execute a statement and wrap its result.
    ///
    /// Rows results buffer their first page; schema changes block for
    /// cluster-wide schema agreement and yield an empty set; other
    /// kinds yield an empty set directly.
    pub async fn fetch(
        executor: Arc<dyn Executor>,
        statement: BoundStatement,
        options: ExecutionOptions,
        started_at: Instant,
    ) -> Result<Self, ExecutionError> {
        let result = executor
            .execute(statement, options.clone(), started_at)
            .await
            .map_err(translate)?;
        match result.kind {
            EngineResultKind::Rows { rows, metadata } => Self::from_rows(
                executor,
                statement,
                options,
                rows,
                metadata,
                result.tracing_id,
                started_at,
            ),
            EngineResultKind::SchemaChange(_) => {
                executor.wait_for_schema_agreement();
                Ok(Self::empty(executor, true, started_at))
            }
            EngineResultKind::Prepared { .. } => Err(ExecutionError::external(
                CqlException::protocol("executing a bound statement produced a prepared result"),
            )),
            _ => Ok(Self::empty(executor, false, started_at)),
        }
    }

    fn empty(executor: Arc<dyn Executor>, applied: bool, started_at: Instant) -> Self {
        Self {
            executor,
            statement: None,
            options: None,
            columns: Vec::new(),
            buffered: VecDeque::new(),
            next_page: None,
            tracing_id: None,
            applied,
            started_at,
        }
    }

    fn from_rows(
        executor: Arc<dyn Executor>,
        statement: BoundStatement,
        options: ExecutionOptions,
        rows: Vec<Row>,
        metadata: RowsMetadata,
        tracing_id: Option<Uuid>,
        started_at: Instant,
    ) -> Result<Self, ExecutionError> {
        let columns = metadata
            .columns
            .iter()
            .map(|spec| {
                external_column(spec).map_err(|e| {
                    ExecutionError::external(CqlException::Server {
                        message: e.to_string(),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            executor,
            statement: Some(statement),
            options: Some(options),
            columns,
            applied: false,
            buffered: rows.into(),
            next_page: metadata.paging_state,
            tracing_id,
            started_at,
        })
    }

    /// The column descriptors, empty for non-rows results.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Tracing session of the page fetched most recently.
    pub fn tracing_id(&self) -> Option<Uuid> {
        self.tracing_id
    }

    /// Whether this empty set stands for an applied schema change.
    ///
    /// Distinguishes a schema-changing execution (empty, applied)
    /// from a plain void result (empty, not applied).
    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Whether another page can still be fetched.
    pub fn has_more_pages(&self) -> bool {
        self.next_page.is_some()
    }

    /// The next row, fetching the next page first when the buffer is
    /// empty and a continuation exists.
    pub async fn next_row(&mut self) -> Result<Option<Row>, ExecutionError> {
        loop {
            if let Some(row) = self.buffered.pop_front() {
                return Ok(Some(row));
            }
            if self.next_page.is_none() {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
    }

    /// Drain every remaining row, fetching pages as needed.
    pub async fn all_rows(&mut self) -> Result<Vec<Row>, ExecutionError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn fetch_next_page(&mut self) -> Result<(), ExecutionError> {
        let (statement, options) = match (self.statement, &self.options) {
            (Some(statement), Some(options)) => (statement, options),
            _ => {
                self.next_page = None;
                return Ok(());
            }
        };
        let mut options = options.clone();
        options.specific.paging_state = self.next_page.take();
        let result = self
            .executor
            .execute(statement, options, self.started_at)
            .await
            .map_err(translate)?;
        match result.kind {
            EngineResultKind::Rows { rows, metadata } => {
                self.buffered = rows.into();
                self.next_page = metadata.paging_state;
                self.tracing_id = result.tracing_id;
                Ok(())
            }
            _ => Err(ExecutionError::external(CqlException::Server {
                message: "paged continuation produced a non-rows result".to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gangway_engine::error::EngineException;
    use gangway_engine::marshal::{InternalScalar, InternalType};
    use gangway_engine::result::{EngineResult, InternalColumnSpec};
    use gangway_engine::types::{Consistency, EngineProtocolVersion, Md5Digest};
    use parking_lot::Mutex;

    fn spec(name: &str) -> InternalColumnSpec {
        InternalColumnSpec {
            keyspace: "ks".to_string(),
            table: "t".to_string(),
            name: name.to_string(),
            column_type: InternalType::scalar(InternalScalar::Int32),
        }
    }

    fn page(rows: Vec<Row>, next: Option<PagingState>) -> EngineResult {
        EngineResult::new(EngineResultKind::Rows {
            rows,
            metadata: RowsMetadata {
                columns: vec![spec("n")],
                paging_state: next,
                protocol_version: EngineProtocolVersion::V4,
            },
        })
    }

    fn mark(n: i32) -> PagingState {
        PagingState {
            partition_key: None,
            row_mark: Some(vec![n as u8]),
            remaining: n,
            remaining_in_partition: n,
        }
    }

    /// Serves a scripted sequence of results and records the paging
    /// state of each request.
    struct PagedStub {
        pages: Mutex<VecDeque<EngineResult>>,
        seen_paging: Mutex<Vec<Option<PagingState>>>,
    }

    impl PagedStub {
        fn new(pages: Vec<EngineResult>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                seen_paging: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Executor for PagedStub {
        async fn execute(
            &self,
            _statement: BoundStatement,
            options: ExecutionOptions,
            _started_at: Instant,
        ) -> Result<EngineResult, EngineException> {
            self.seen_paging.lock().push(options.specific.paging_state);
            self.pages
                .lock()
                .pop_front()
                .ok_or_else(|| EngineException::Server {
                    message: "no more scripted pages".to_string(),
                })
        }

        fn wait_for_schema_agreement(&self) {}
    }

    fn options() -> ExecutionOptions {
        ExecutionOptions::new(Consistency::Quorum, EngineProtocolVersion::V4)
    }

    fn statement() -> BoundStatement {
        BoundStatement::new(Md5Digest::wrap([1; 16]))
    }

    #[tokio::test]
    async fn test_single_page_drains_without_refetch() {
        let stub = Arc::new(PagedStub::new(vec![page(
            vec![vec![Some(vec![1])], vec![Some(vec![2])]],
            None,
        )]));
        let mut rs = ResultSet::fetch(stub.clone(), statement(), options(), Instant::now())
            .await
            .unwrap();
        assert!(!rs.has_more_pages());
        let rows = rs.all_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(stub.seen_paging.lock().len(), 1, "exactly one execution");
    }

    #[tokio::test]
    async fn test_pages_are_fetched_lazily() {
        let stub = Arc::new(PagedStub::new(vec![
            page(vec![vec![Some(vec![1])]], Some(mark(1))),
            page(vec![vec![Some(vec![2])]], None),
        ]));
        let mut rs = ResultSet::fetch(stub.clone(), statement(), options(), Instant::now())
            .await
            .unwrap();
        assert!(rs.has_more_pages());
        assert_eq!(rs.next_row().await.unwrap(), Some(vec![Some(vec![1])]));
        // the second page has not been requested yet
        assert_eq!(stub.seen_paging.lock().len(), 1);
        assert_eq!(rs.next_row().await.unwrap(), Some(vec![Some(vec![2])]));
        assert_eq!(rs.next_row().await.unwrap(), None);
        let seen = stub.seen_paging.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], Some(mark(1)), "continuation carries the mark");
    }

    #[tokio::test]
    async fn test_non_rows_result_is_empty() {
        let stub = Arc::new(PagedStub::new(vec![EngineResult::new(
            EngineResultKind::Void,
        )]));
        let mut rs = ResultSet::fetch(stub, statement(), options(), Instant::now())
            .await
            .unwrap();
        assert!(rs.columns().is_empty());
        assert!(!rs.applied(), "a void result is not a schema change");
        assert_eq!(rs.next_row().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_schema_change_yields_an_applied_empty_set() {
        use gangway_engine::result::{ChangeKind, SchemaChangeEvent, TargetKind};
        let stub = Arc::new(PagedStub::new(vec![EngineResult::new(
            EngineResultKind::SchemaChange(SchemaChangeEvent {
                change: ChangeKind::Created,
                target: TargetKind::Table,
                keyspace: "ks".to_string(),
                name: Some("t".to_string()),
                arg_types: vec![],
            }),
        )]));
        let mut rs = ResultSet::fetch(stub, statement(), options(), Instant::now())
            .await
            .unwrap();
        assert!(rs.applied(), "schema change must come back applied");
        assert!(rs.columns().is_empty());
        assert_eq!(rs.next_row().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rows_result_is_not_marked_applied() {
        let stub = Arc::new(PagedStub::new(vec![page(vec![], None)]));
        let rs = ResultSet::fetch(stub, statement(), options(), Instant::now())
            .await
            .unwrap();
        assert!(!rs.applied());
    }

    #[tokio::test]
    async fn test_columns_are_bridged() {
        let stub = Arc::new(PagedStub::new(vec![page(vec![], None)]));
        let rs = ResultSet::fetch(stub, statement(), options(), Instant::now())
            .await
            .unwrap();
        assert_eq!(rs.columns().len(), 1);
        assert_eq!(rs.columns()[0].name, "n");
    }
}
