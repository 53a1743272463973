//! # REST API for Liability Waivers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::WaiverSelection;
use tracing::info;

use super::attachment;
use super::error::ApiResult;
use super::mappers::waiver_mapper::WaiverMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients/:id", get(client_waiver))
        .route("/batch", post(batch_waivers))
}

/// Single waiver PDF
pub async fn client_waiver(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/waivers/clients/{}", id);
    Ok(attachment(state.waivers.client_waiver(id).await?))
}

/// Tar archive with one waiver per selected client
pub async fn batch_waivers(
    State(state): State<AppState>,
    Json(request): Json<WaiverSelection>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/waivers/batch - selection: {:?}", request);
    let selection = WaiverMapper::to_selection(request)?;
    Ok(attachment(state.waivers.batch(selection).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::ErrorResponse;

    #[tokio::test]
    async fn test_waiver_routes() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;

        let (status, body) = ctx.request(Method::GET, &format!("/api/waivers/clients/{}", ana.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"%PDF"));

        let (status, _) = ctx.request(Method::GET, "/api/waivers/clients/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_batch_is_unprocessable() {
        let ctx = TestContext::new().await;
        let (status, body) = ctx
            .request(Method::POST, "/api/waivers/batch", Some(json!({"mode": "clients", "client_ids": []})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.details[0].field, "selection");
    }
}
