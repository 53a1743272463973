//! # REST API for Data Export
//!
//! CSV downloads of the client, event and attendance tables.

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use tracing::info;

use super::attachment;
use super::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients.csv", get(export_clients))
        .route("/events.csv", get(export_events))
        .route("/attendances.csv", get(export_attendances))
}

pub async fn export_clients(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/export/clients.csv");
    Ok(attachment(state.exports.export_clients().await?))
}

pub async fn export_events(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/export/events.csv");
    Ok(attachment(state.exports.export_events().await?))
}

pub async fn export_attendances(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/export/attendances.csv");
    Ok(attachment(state.exports.export_attendances().await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};

    #[tokio::test]
    async fn test_csv_download_headers() {
        let ctx = TestContext::new().await;
        ctx.client("Ana", "López").await;
        let token = ctx.token().await;

        let response = ctx
            .send(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/export/clients.csv")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"clients_"));
        assert!(disposition.ends_with(".csv\""));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
