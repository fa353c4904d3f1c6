use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use slotql::{
    types::{TableField, TableSchema},
    Catalog, EngineConfig, QueryEngine, Storage, StorageError,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Fixture Catalog ---

/// A small catalog covering every parameter kind, for tests that should not
/// depend on the built-in catalog's wording.
pub const FIXTURE_CATALOG_YAML: &str = r#"
templates:
  - id: count_orders
    description: Count all orders
    examples:
      - how many orders
      - number of orders
    sql_skeleton: "SELECT COUNT(*) AS orders FROM `{table_ref}`"
  - id: orders_by_total
    description: Orders above or below a total
    examples:
      - orders with total above
      - orders costing more than
    sql_skeleton: "SELECT * FROM `{table_ref}` WHERE total {comparison} {amount}"
    required_params: [amount]
    optional_params: [comparison]
    defaults:
      comparison: greater
  - id: orders_by_tier
    description: Orders from one customer tier
    examples:
      - orders from tier
    sql_skeleton: "SELECT * FROM `{table_ref}` WHERE tier = {category}"
    required_params: [category]
  - id: recent_orders
    description: Orders placed recently
    examples:
      - recent orders
    sql_skeleton: "SELECT * FROM `{table_ref}` WHERE placed_at >= DATE_SUB(CURRENT_DATE(), INTERVAL {time_window} DAY)"
    optional_params: [time_window]
    defaults:
      time_window: last_7_days
"#;

/// The table reference the fixture catalog is bound against.
pub const FIXTURE_TABLE_REF: &str = "fixture-project.shop.orders";

pub fn fixture_catalog() -> Catalog {
    Catalog::from_yaml_str(FIXTURE_CATALOG_YAML).expect("fixture catalog must be valid")
}

pub fn fixture_engine() -> QueryEngine {
    let config = EngineConfig {
        table_ref: FIXTURE_TABLE_REF.to_string(),
        categories: vec!["gold".to_string(), "silver".to_string()],
        ..Default::default()
    };
    QueryEngine::new(fixture_catalog(), config).expect("fixture engine must build")
}

/// Writes the fixture catalog to `dir/catalog.yml` and returns its path.
pub fn write_fixture_catalog(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("catalog.yml");
    std::fs::write(&path, FIXTURE_CATALOG_YAML)?;
    Ok(path)
}

// --- Mock Storage ---

/// An in-memory `Storage` that answers every query with the same rows.
///
/// Executed SQL is recorded for assertions. A delay can be set to exercise
/// timeouts, and a failure message to exercise error paths.
#[derive(Clone, Debug)]
pub struct MockStorage {
    rows: Arc<Mutex<Value>>,
    executed: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
    schema: Arc<TableSchema>,
}

impl MockStorage {
    pub fn new(rows: Value) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            executed: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            delay: None,
            schema: Arc::new(TableSchema {
                fields: vec![
                    TableField {
                        name: "account_id".to_string(),
                        r#type: "STRING".to_string(),
                    },
                    TableField {
                        name: "plan_tier".to_string(),
                        r#type: "STRING".to_string(),
                    },
                    TableField {
                        name: "mrr_amount".to_string(),
                        r#type: "FLOAT".to_string(),
                    },
                ],
            }),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replaces the canned rows for subsequent queries.
    pub fn set_rows(&self, rows: Value) {
        *self.rows.lock().unwrap() = rows;
    }

    /// Makes every subsequent query fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Retrieves the executed SQL for assertion.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new(Value::Array(Vec::new()))
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn name(&self) -> &str {
        "MockStorage"
    }

    async fn execute_sql(&self, sql: &str) -> Result<String, StorageError> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(StorageError::QueryFailed(message));
        }
        let rows = self.rows.lock().unwrap().clone();
        Ok(serde_json::to_string(&rows)?)
    }

    async fn get_table_schema(&self, table_name: &str) -> Result<Arc<TableSchema>, StorageError> {
        if table_name.split('.').count() != 3 {
            return Err(StorageError::InvalidTable(table_name.to_string()));
        }
        Ok(self.schema.clone())
    }
}
