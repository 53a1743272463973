//! # REST API for Attendance

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{AttendanceQuery, WalkInRequest};
use tracing::info;

use super::error::ApiResult;
use super::mappers::attendance_mapper::AttendanceMapper;
use crate::domain::DomainError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attendances).post(record_walk_in))
        .route("/:id", get(get_attendance))
}

pub async fn list_attendances(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/attendances - query: {:?}", query);
    let filter = AttendanceMapper::to_filter(query)?;
    let attendances = state.attendances.list_filtered(&filter).await?;
    Ok(Json(AttendanceMapper::to_list_dto(attendances)))
}

/// Record a walk-in attendance paid in full at the door
pub async fn record_walk_in(
    State(state): State<AppState>,
    Json(request): Json<WalkInRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/attendances - request: {:?}", request);
    let attendance = state
        .attendances
        .record_walk_in(AttendanceMapper::to_walk_in_command(request))
        .await?;
    Ok((StatusCode::CREATED, Json(AttendanceMapper::to_dto(attendance))))
}

pub async fn get_attendance(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/attendances/{}", id);
    let attendance = state
        .attendances
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Attendance", id))?;
    Ok(Json(AttendanceMapper::to_dto(attendance)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{Attendance, AttendanceListResponse, AttendanceOrigin, ErrorResponse};

    #[tokio::test]
    async fn test_walk_in_and_duplicate() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;
        let body = json!({"client_id": ana.id, "event_id": event.id, "amount": 350.0});

        let (status, bytes) = ctx.request(Method::POST, "/api/attendances", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let attendance: Attendance = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(attendance.origin, AttendanceOrigin::WalkIn);

        let (status, bytes) = ctx.request(Method::POST, "/api/attendances", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error.code, "DUPLICATE");

        let (_, bytes) = ctx.request(Method::GET, "/api/attendances?min_amount=400", None).await;
        let list: AttendanceListResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(list.attendances.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_event_is_bad_request() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;

        let (status, _) = ctx
            .request(
                Method::POST,
                "/api/attendances",
                Some(json!({"client_id": ana.id, "event_id": 999, "amount": 100.0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
