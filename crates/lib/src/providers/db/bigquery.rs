use crate::{
    errors::StorageError,
    providers::db::storage::Storage,
    types::{TableField, TableSchema},
};
use async_trait::async_trait;
use gcp_bigquery_client::{
    model::{query_request::QueryRequest, query_response::ResultSet, table::Table},
    Client,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::{self, Debug},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A provider for running resolved queries on Google BigQuery.
#[derive(Clone)]
pub struct BigQueryProvider {
    client: Client,
    project_id: String,
    schema_cache: Arc<RwLock<HashMap<String, Arc<TableSchema>>>>,
}

impl BigQueryProvider {
    /// Connects with application default credentials, billing jobs to `project_id`.
    pub async fn new(project_id: String) -> Result<Self, StorageError> {
        let client = Client::from_application_default_credentials()
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(Self {
            client,
            project_id,
            schema_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}

impl Debug for BigQueryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigQueryProvider")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Storage for BigQueryProvider {
    fn name(&self) -> &str {
        "BigQuery"
    }

    async fn execute_sql(&self, sql: &str) -> Result<String, StorageError> {
        info!("--> Executing BigQuery SQL: {sql}");
        let response = self
            .client
            .job()
            .query(
                &self.project_id,
                QueryRequest {
                    query: sql.to_string(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut results = ResultSet::new_from_query_response(response);
        let column_names = results.column_names();
        let mut rows: Vec<Value> = Vec::new();

        while results.next_row() {
            let mut row = serde_json::Map::new();
            for name in &column_names {
                let value = results
                    .get_json_value_by_name(name)
                    .ok()
                    .flatten()
                    .unwrap_or(Value::Null);
                row.insert(name.clone(), value);
            }
            rows.push(Value::Object(row));
        }
        debug!("<-- BigQuery returned {} rows", rows.len());

        Ok(serde_json::to_string(&rows)?)
    }

    async fn get_table_schema(&self, table_name: &str) -> Result<Arc<TableSchema>, StorageError> {
        if let Some(schema) = self.schema_cache.read().await.get(table_name) {
            return Ok(schema.clone());
        }

        let parts: Vec<&str> = table_name.split('.').collect();
        let [project_id, dataset_id, table_id] = parts.as_slice() else {
            return Err(StorageError::InvalidTable(format!(
                "{table_name}. Expected format: project.dataset.table"
            )));
        };

        let table: Table = self
            .client
            .table()
            .get(project_id, dataset_id, table_id, None)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let fields = table
            .schema
            .fields
            .unwrap_or_default()
            .into_iter()
            .map(|field| TableField {
                name: field.name,
                r#type: format!("{:?}", field.r#type).to_uppercase(),
            })
            .collect();
        let schema = Arc::new(TableSchema { fields });

        self.schema_cache
            .write()
            .await
            .insert(table_name.to_string(), schema.clone());

        Ok(schema)
    }
}
