//! # REST API for Reservations ("apartados")
//!
//! Confirming a reservation is the step that records the attendance and
//! applies the payment to the client and the event.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{CreateReservationRequest, SearchQuery};
use tracing::info;

use super::error::ApiResult;
use super::mappers::attendance_mapper::AttendanceMapper;
use super::mappers::reservation_mapper::ReservationMapper;
use crate::domain::DomainError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route("/:id", get(get_reservation))
        .route("/:id/cancel", post(cancel_reservation))
        .route("/:id/confirm", post(confirm_reservation))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/reservations - query: {:?}", query);
    let reservations = state.reservations.search(query.q.as_deref().unwrap_or("")).await?;
    Ok(Json(ReservationMapper::to_list_dto(reservations)))
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/reservations - request: {:?}", request);
    let reservation = state
        .reservations
        .create(ReservationMapper::to_create_command(request))
        .await?;
    Ok((StatusCode::CREATED, Json(ReservationMapper::to_dto(reservation))))
}

pub async fn get_reservation(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/reservations/{}", id);
    let reservation = state
        .reservations
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Reservation", id))?;
    Ok(Json(ReservationMapper::to_dto(reservation)))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/reservations/{}/cancel", id);
    let reservation = state.reservations.cancel(id).await?;
    Ok(Json(ReservationMapper::to_dto(reservation)))
}

/// Body is optional; without `remaining_amount` the full balance is settled
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let remaining = ReservationMapper::to_confirm_remaining(&body)?;
    info!("POST /api/reservations/{}/confirm - remaining: {:?}", id, remaining);
    let attendance = state.attendances.confirm_reservation(id, remaining).await?;
    Ok((StatusCode::CREATED, Json(AttendanceMapper::to_dto(attendance))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{Attendance, Client, ErrorResponse, Event, Reservation, ReservationState};

    #[tokio::test]
    async fn test_reserve_then_confirm() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;

        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/reservations",
                Some(json!({"client_id": ana.id, "event_id": event.id, "deposit": 100.0, "expected_total": 300.0})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let reservation: Reservation = serde_json::from_slice(&body).unwrap();
        assert_eq!(reservation.outstanding, 200.0);

        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/reservations",
                Some(json!({"client_id": ana.id, "event_id": event.id, "deposit": 50.0, "expected_total": 300.0})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "This client already has a place reserved for this event.");

        let (status, body) = ctx
            .request(
                Method::POST,
                &format!("/api/reservations/{}/confirm", reservation.id),
                Some(json!({"remaining_amount": 200.0})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let attendance: Attendance = serde_json::from_slice(&body).unwrap();
        assert_eq!(attendance.amount_paid, 300.0);

        let (_, body) = ctx.request(Method::GET, &format!("/api/clients/{}", ana.id), None).await;
        let client: Client = serde_json::from_slice(&body).unwrap();
        assert_eq!((client.visits, client.accumulated_amount), (1, 300.0));

        let (_, body) = ctx.request(Method::GET, &format!("/api/events/{}", event.id), None).await;
        let event: Event = serde_json::from_slice(&body).unwrap();
        assert_eq!((event.attendee_count, event.total_collected), (1, 300.0));

        let (_, body) = ctx.request(Method::GET, &format!("/api/reservations/{}", reservation.id), None).await;
        let reservation: Reservation = serde_json::from_slice(&body).unwrap();
        assert_eq!(reservation.state, ReservationState::Confirmed);
    }

    #[tokio::test]
    async fn test_confirm_without_body_settles_balance() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;
        let (_, body) = ctx
            .request(
                Method::POST,
                "/api/reservations",
                Some(json!({"client_id": ana.id, "event_id": event.id, "deposit": 120.0, "expected_total": 400.0})),
            )
            .await;
        let reservation: Reservation = serde_json::from_slice(&body).unwrap();

        let (status, body) = ctx
            .request(Method::POST, &format!("/api/reservations/{}/confirm", reservation.id), None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let attendance: Attendance = serde_json::from_slice(&body).unwrap();
        assert_eq!(attendance.remaining_amount, 280.0);
    }

    #[tokio::test]
    async fn test_unreadable_confirm_body_is_rejected() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;
        let (_, body) = ctx
            .request(
                Method::POST,
                "/api/reservations",
                Some(json!({"client_id": ana.id, "event_id": event.id, "deposit": 100.0, "expected_total": 300.0})),
            )
            .await;
        let reservation: Reservation = serde_json::from_slice(&body).unwrap();

        let (status, body) = ctx
            .request(
                Method::POST,
                &format!("/api/reservations/{}/confirm", reservation.id),
                Some(json!({"remaining_amount": "50"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_FAILED");

        let (_, body) = ctx.request(Method::GET, &format!("/api/reservations/{}", reservation.id), None).await;
        let reservation: Reservation = serde_json::from_slice(&body).unwrap();
        assert_eq!(reservation.state, ReservationState::Reserved);

        let (_, body) = ctx.request(Method::GET, &format!("/api/clients/{}", ana.id), None).await;
        let client: Client = serde_json::from_slice(&body).unwrap();
        assert_eq!((client.visits, client.accumulated_amount), (0, 0.0));
    }
}
