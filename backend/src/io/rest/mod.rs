//! # REST API Interface Layer
//!
//! HTTP endpoints for the console, one module per resource. Handlers stay
//! thin: they log the request, map the DTO to a domain command, call the
//! service and map the result back. Every failure flows through
//! [`error::ApiError`].
//!
//! All routes except the sign-in surface sit behind [`guard::require_session`].

pub mod attendance_apis;
pub mod auth_apis;
pub mod client_apis;
pub mod error;
pub mod event_apis;
pub mod export_apis;
pub mod guard;
pub mod mappers;
pub mod referral_apis;
pub mod reservation_apis;
pub mod stats_apis;
pub mod waiver_apis;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::domain::commands::exports::Download;
use crate::AppState;

pub use error::{ApiError, ApiResult};
pub use guard::{require_session, CurrentSession};

/// Every `/api` route, before the session guard is layered on
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_apis::router())
        .nest("/clients", client_apis::router())
        .nest("/events", event_apis::router())
        .nest("/referrals", referral_apis::router())
        .nest("/reservations", reservation_apis::router())
        .nest("/attendances", attendance_apis::router())
        .nest("/stats", stats_apis::router())
        .nest("/export", export_apis::router())
        .nest("/waivers", waiver_apis::router())
}

/// File download response with `Content-Disposition: attachment`
pub(crate) fn attachment(download: Download) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", download.filename.replace('"', ""));
    // Names may carry accented letters; header values accept them as opaque bytes
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::create_router;
    use crate::test_support::TestContext;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use shared::ErrorResponse;
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_api_requires_session() {
        let ctx = TestContext::new().await;

        let response = ctx.send(get("/api/clients")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "UNAUTHORIZED");

        let response = ctx
            .send(
                Request::builder()
                    .uri("/api/clients")
                    .header(header::AUTHORIZATION, "Bearer not-a-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_pages_redirect_to_login() {
        let ctx = TestContext::new().await;

        let response = ctx.send(get("/clients")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let ctx = TestContext::new().await;

        let response = ctx.send(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_front_end_loads_without_a_session() {
        let ctx = TestContext::new().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>colibri</html>").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets").join("app.js"), "console.log('colibri')").unwrap();
        let config = AppConfig { static_dir: Some(dir.path().to_path_buf()), ..AppConfig::default() };

        let send = |request: Request<Body>| {
            let app = create_router(ctx.state.clone(), &config);
            async move {
                let response = app.oneshot(request).await.unwrap();
                let status = response.status();
                let location = response.headers().get(header::LOCATION).cloned();
                let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
                (status, location, body)
            }
        };

        for (uri, expected) in [
            ("/", "<html>colibri</html>"),
            ("/login", "<html>colibri</html>"),
            ("/assets/app.js", "console.log('colibri')"),
        ] {
            let (status, _, body) = send(get(uri)).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(&body[..], expected.as_bytes(), "{}", uri);
        }

        // Deep links still need a session
        let (status, location, _) = send(get("/clientes/alta")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.unwrap(), "/login");

        let token = ctx.token().await;
        let request = Request::builder()
            .uri("/clientes/alta")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"<html>colibri</html>");

        let (status, _, _) = send(get("/api/clients")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _, _) = send(get("/api/nothing-here")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_attachment_keeps_accented_filename() {
        let response = attachment(Download {
            filename: "waiver_Ana_López_2024-03-01.pdf".to_string(),
            content_type: "application/pdf",
            bytes: b"%PDF-1.7".to_vec(),
        });
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION].as_bytes(),
            "attachment; filename=\"waiver_Ana_López_2024-03-01.pdf\"".as_bytes()
        );
    }
}
