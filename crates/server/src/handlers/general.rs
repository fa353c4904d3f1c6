//! # General Route Handlers
//!
//! The root banner, the health probe, and read-only views of the catalog and
//! the configured table.

use super::{AppError, AppState};
use crate::types::{ExamplesResponse, SchemaResponse};
use axum::{extract::State, Json};
use slotql::render::describe_schema;

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "slotql server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Lists one example question per template of the live catalog.
pub async fn examples_handler(State(app_state): State<AppState>) -> Json<ExamplesResponse> {
    let engine = app_state.engine.current();
    let examples = engine
        .catalog()
        .example_queries()
        .into_iter()
        .map(String::from)
        .collect();
    Json(ExamplesResponse { examples })
}

/// Describes the columns of the configured table.
pub async fn schema_handler(
    State(app_state): State<AppState>,
) -> Result<Json<SchemaResponse>, AppError> {
    let executor = app_state
        .executor
        .as_ref()
        .ok_or(AppError::StorageUnavailable)?;
    let table_ref = app_state.engine.current().config().table_ref.clone();
    let schema = executor.schema(&table_ref).await?;

    Ok(Json(SchemaResponse {
        description: describe_schema(&schema),
        table_ref,
    }))
}
