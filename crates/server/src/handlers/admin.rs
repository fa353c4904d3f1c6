//! # Admin Handlers

use super::{AppError, AppState};
use crate::{state::build_engine, types::ReloadResponse};
use axum::{extract::State, Json};
use tracing::info;

/// Rebuilds the engine from the configured catalog and swaps it in.
///
/// Requests already in flight finish on the engine they started with. If the
/// catalog fails to load, the current engine stays in service.
pub async fn reload_handler(
    State(app_state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let config = app_state.config.clone();
    let engine = tokio::task::spawn_blocking(move || build_engine(&config))
        .await
        .map_err(anyhow::Error::from)??;

    let templates = engine.catalog().len();
    app_state.engine.replace(engine);
    info!("Engine reloaded with {templates} templates.");

    Ok(Json(ReloadResponse { templates }))
}
