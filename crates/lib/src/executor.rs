//! # Query Executor
//!
//! The only place resolved SQL meets a warehouse. `QueryExecutor` accepts a
//! `ResolutionResult`, refuses anything that did not resolve, and runs the SQL
//! through a `Storage` provider under a timeout.

use crate::{
    constants::DEFAULT_QUERY_TIMEOUT_SECS,
    errors::ExecutionError,
    providers::db::storage::Storage,
    render::{render_rows, ResultShape, Row},
    types::{ResolutionResult, TableSchema},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Rows returned for a resolved query, with their presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutput {
    pub sql: String,
    pub rows: Vec<Row>,
    pub shape: ResultShape,
    pub rendered: String,
}

/// Runs resolved SQL against a storage provider.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    storage: Arc<dyn Storage>,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Executes the SQL of a successful resolution.
    pub async fn run(&self, resolution: &ResolutionResult) -> Result<QueryOutput, ExecutionError> {
        let sql = resolution
            .resolved_sql
            .as_deref()
            .ok_or(ExecutionError::NotResolved)?;

        info!("Executing query on {}", self.storage.name());
        let raw = match tokio::time::timeout(self.timeout, self.storage.execute_sql(sql)).await {
            Ok(result) => result.inspect_err(|e| error!("Query execution failed: {e}"))?,
            Err(_) => {
                error!("Query timed out after {:?}", self.timeout);
                return Err(ExecutionError::Timeout(self.timeout.as_secs()));
            }
        };

        let rows: Vec<Row> = serde_json::from_str(&raw)?;
        let shape = ResultShape::classify(&rows);
        info!("Query returned {} rows ({:?})", rows.len(), shape);

        Ok(QueryOutput {
            sql: sql.to_string(),
            rendered: render_rows(&rows),
            rows,
            shape,
        })
    }

    /// Fetches the schema of `table_ref` from storage.
    pub async fn schema(&self, table_ref: &str) -> Result<Arc<TableSchema>, ExecutionError> {
        match tokio::time::timeout(self.timeout, self.storage.get_table_schema(table_ref)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ExecutionError::Timeout(self.timeout.as_secs())),
        }
    }
}
