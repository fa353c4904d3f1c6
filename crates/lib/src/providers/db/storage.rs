use crate::{errors::StorageError, types::TableSchema};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::sync::Arc;

/// A trait for running resolved SQL against a warehouse.
///
/// The engine never talks to storage itself; callers hand a successful
/// `ResolutionResult` to a `QueryExecutor` that owns one of these.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "BigQuery").
    fn name(&self) -> &str;

    /// Executes a SQL query and returns the rows as a JSON array of objects.
    async fn execute_sql(&self, sql: &str) -> Result<String, StorageError>;

    /// Retrieves the schema for a fully-qualified table name.
    async fn get_table_schema(&self, table_name: &str) -> Result<Arc<TableSchema>, StorageError>;
}

dyn_clone::clone_trait_object!(Storage);
