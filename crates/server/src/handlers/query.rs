//! # Query Handlers
//!
//! `/resolve` answers with the resolution only. `/query` also runs the SQL
//! when resolution succeeds and a warehouse is configured.

use super::{AppError, AppState};
use crate::types::{QueryResponse, UtteranceRequest};
use axum::{extract::State, Json};
use slotql::{render::render_failure, ResolutionResult};
use tracing::info;

/// Resolves an utterance to SQL without executing it.
pub async fn resolve_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<UtteranceRequest>,
) -> Json<ResolutionResult> {
    info!("Received resolve request: '{}'", payload.utterance);
    let engine = app_state.engine.current();
    Json(engine.resolve(&payload.utterance))
}

/// Resolves an utterance and executes the resulting SQL.
pub async fn query_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<UtteranceRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    info!("Received query request: '{}'", payload.utterance);
    let executor = app_state
        .executor
        .as_ref()
        .ok_or(AppError::StorageUnavailable)?;

    let resolution = app_state.engine.current().resolve(&payload.utterance);
    if !resolution.is_success() {
        return Ok(Json(QueryResponse {
            message: render_failure(&resolution),
            resolution,
            output: None,
        }));
    }

    let output = executor.run(&resolution).await?;
    Ok(Json(QueryResponse {
        resolution,
        message: None,
        output: Some(output),
    }))
}
