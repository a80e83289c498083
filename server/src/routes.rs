use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use store::{models::RouteSummary, postgres::route_summaries};

use crate::{error::AppError, state::AppState};

#[derive(Serialize)]
pub struct SummaryResponse {
    pub routes: Vec<RouteSummary>,
}

/// GET /routes-summary: every route with its full price history, oldest
/// first. Routes without history come back with an empty price list.
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let routes = route_summaries(&state.pool).await.map_err(|err| {
        error!("Database query error: {err:#}");
        AppError::database(err, state.config.is_development())
    })?;

    Ok(Json(SummaryResponse { routes }))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
