//! # REST API for Sign-up, Sign-in and Sessions

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use shared::{LoginRequest, SignUpRequest};
use tracing::info;

use super::error::ApiResult;
use super::guard::CurrentSession;
use super::mappers::auth_mapper::AuthMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/auth/signup - email: {}", request.email);
    let (user, session) = state.auth.sign_up(AuthMapper::to_sign_up_command(request)).await?;
    Ok((StatusCode::CREATED, Json(AuthMapper::to_session_dto(user, session))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/auth/login - email: {}", request.email);
    let (user, session) = state.auth.sign_in(&request.email, &request.password).await?;
    Ok(Json(AuthMapper::to_session_dto(user, session)))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/auth/logout - {}", current.user.email);
    state.auth.sign_out(&current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Extension(current): Extension<CurrentSession>) -> impl IntoResponse {
    Json(AuthMapper::to_user_dto(current.user))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use shared::{SessionResponse, User};

    fn json_request(method: Method, uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_me_logout() {
        let ctx = TestContext::new().await;

        let response = ctx
            .send(json_request(
                Method::POST,
                "/api/auth/signup",
                r#"{"email":"luz@colibri.mx","password":"temazcal-2024"}"#,
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let session: SessionResponse = serde_json::from_slice(&body).unwrap();

        let response = ctx.send(json_request(Method::GET, "/api/auth/me", "", Some(&session.token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let user: User = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.email, "luz@colibri.mx");

        let response = ctx.send(json_request(Method::POST, "/api/auth/logout", "", Some(&session.token))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = ctx.send(json_request(Method::GET, "/api/auth/me", "", Some(&session.token))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let ctx = TestContext::new().await;
        let response = ctx
            .send(json_request(
                Method::POST,
                "/api/auth/login",
                r#"{"email":"nadie@colibri.mx","password":"whatever1"}"#,
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
