//! Executor and registry capabilities
//!
//! The two seams the bridge needs from the engine: something that
//! executes a bound statement, and something that answers questions
//! about prepared statements. Both are traits so tests can stand in
//! stub engines.

use crate::error::EngineException;
use crate::options::ExecutionOptions;
use crate::result::EngineResult;
use crate::types::Md5Digest;
use async_trait::async_trait;
use std::time::Instant;

/// A statement ready for execution, identified by its digest. The
/// bound values travel in [`ExecutionOptions`], not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundStatement {
    /// Digest of the prepared statement to execute
    pub id: Md5Digest,
}

impl BoundStatement {
    /// A statement for the given digest.
    pub fn new(id: Md5Digest) -> Self {
        Self { id }
    }
}

/// Executes statements against the engine.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute one statement with the given options.
    ///
    /// `started_at` is when the request entered the server, so the
    /// engine can account queueing time against its timeouts.
    async fn execute(
        &self,
        statement: BoundStatement,
        options: ExecutionOptions,
        started_at: Instant,
    ) -> Result<EngineResult, EngineException>;

    /// Block until every live node reports the same schema version.
    fn wait_for_schema_agreement(&self);
}

/// Answers questions about statements prepared on this node.
pub trait PreparedStatementRegistry: Send + Sync {
    /// Positions of the partition-key columns among a statement's
    /// bind markers, `None` when the digest is unknown.
    fn partition_key_bind_indexes(&self, id: &Md5Digest) -> Option<Vec<u16>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_statement_carries_only_digest() {
        let id = Md5Digest::wrap([7; 16]);
        let s = BoundStatement::new(id);
        assert_eq!(s.id, id);
    }
}
