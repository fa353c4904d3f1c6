#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the library's integration tests: tracing initialization
//! and an in-memory storage provider with scripted rows.

use async_trait::async_trait;
use dotenvy::dotenv;
use slotql::{
    types::{TableField, TableSchema},
    Storage, StorageError,
};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// --- Mock Storage Provider ---

/// Returns a fixed JSON payload for every query and records the SQL it saw.
#[derive(Clone, Debug)]
pub struct ScriptedStorage {
    pub rows_json: String,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
    pub executed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedStorage {
    pub fn returning(rows_json: &str) -> Self {
        Self {
            rows_json: rows_json.to_string(),
            fail_with: None,
            delay: None,
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    fn name(&self) -> &str {
        "ScriptedDB"
    }

    async fn execute_sql(&self, sql: &str) -> Result<String, StorageError> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(message) => Err(StorageError::QueryFailed(message.clone())),
            None => Ok(self.rows_json.clone()),
        }
    }

    async fn get_table_schema(&self, _table_name: &str) -> Result<Arc<TableSchema>, StorageError> {
        Ok(Arc::new(TableSchema {
            fields: vec![TableField {
                name: "account_id".to_string(),
                r#type: "STRING".to_string(),
            }],
        }))
    }
}
