//! Session guard for the API and for page routes. Files served from the
//! static directory and `/health` never reach it.

use axum::extract::{OriginalUri, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};

use super::error::ApiError;
use crate::domain::models::user::User;
use crate::AppState;

const PUBLIC_PATHS: [&str; 3] = ["/api/auth/login", "/api/auth/signup", "/login"];

/// The signed-in operator, inserted into request extensions by the guard
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub user: User,
}

pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // Nested routers see a stripped path
    let path = match req.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_string(),
        None => req.uri().path().to_string(),
    };
    if PUBLIC_PATHS.contains(&path.as_str()) {
        return next.run(req).await;
    }

    let token = bearer_token(&req);
    let user = match token.as_deref() {
        Some(token) => match state.auth.current_user(token).await {
            Ok(user) => user,
            Err(err) => return ApiError::from(err).into_response(),
        },
        None => None,
    };

    match (token, user) {
        (Some(token), Some(user)) => {
            debug!("{} authorized for {}", user.email, path);
            req.extensions_mut().insert(CurrentSession { token, user });
            next.run(req).await
        }
        _ if path.starts_with("/api/") || path == "/api" => {
            warn!("Rejected unauthenticated request to {}", path);
            ApiError::unauthorized().into_response()
        }
        _ => Redirect::to("/login").into_response(),
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
