//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the live resolution engine
//! and, when a warehouse is configured, the executor that runs resolved SQL.

use crate::config::AppConfig;
use slotql::{Catalog, EngineError, QueryEngine, QueryExecutor, SharedEngine, Storage};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The engine serving requests; replaced wholesale on reload.
    pub engine: Arc<SharedEngine>,
    /// Runs resolved SQL. `None` when no storage is configured.
    pub executor: Option<QueryExecutor>,
}

impl AppState {
    /// Assembles state from an already-built engine and optional storage.
    pub fn new(config: AppConfig, engine: QueryEngine, storage: Option<Arc<dyn Storage>>) -> Self {
        let timeout = Duration::from_secs(config.query_timeout_secs);
        let executor = storage.map(|s| QueryExecutor::new(s).with_timeout(timeout));
        Self {
            config: Arc::new(config),
            engine: Arc::new(SharedEngine::new(engine)),
            executor,
        }
    }
}

/// Builds an engine from the configured catalog (or the built-in one).
pub fn build_engine(config: &AppConfig) -> Result<QueryEngine, EngineError> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::load()?,
    };
    QueryEngine::new(catalog, config.engine.clone())
}

/// Connects the configured warehouse, if any.
#[cfg(feature = "bigquery")]
async fn build_storage(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn Storage>>> {
    match &config.bigquery_project_id {
        Some(project_id) => {
            let provider = slotql::BigQueryProvider::new(project_id.clone()).await?;
            info!(project_id = %project_id, "Initialized storage provider (BigQuery).");
            Ok(Some(Arc::new(provider)))
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "bigquery"))]
async fn build_storage(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn Storage>>> {
    if config.bigquery_project_id.is_some() {
        tracing::warn!("bigquery_project_id is set but the server was built without the `bigquery` feature; query execution is disabled.");
    }
    Ok(None)
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let engine = build_engine(&config)?;
    let storage = build_storage(&config).await?;
    if storage.is_none() {
        info!("No storage configured; only resolution endpoints are available.");
    }
    Ok(AppState::new(config, engine, storage))
}
