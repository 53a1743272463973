//! # REST API for Dashboard Statistics

use axum::{extract::State, response::{IntoResponse, Json}, routing::get, Router};
use tracing::info;

use super::error::ApiResult;
use super::mappers::stats_mapper::StatsMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/stats/dashboard");
    let dashboard = state.stats.dashboard().await?;
    Ok(Json(StatsMapper::to_dto(dashboard)))
}
