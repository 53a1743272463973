//! # REST API for Event Management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{CreateEventRequest, EventQuery, UpdateEventRequest};
use tracing::info;

use super::error::ApiResult;
use super::mappers::attendance_mapper::AttendanceMapper;
use super::mappers::event_mapper::EventMapper;
use super::mappers::reservation_mapper::ReservationMapper;
use crate::domain::event_service::RECENT_EVENTS_LIMIT;
use crate::domain::DomainError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/upcoming", get(upcoming_event))
        .route("/recent", get(recent_events))
        .route("/:id", get(get_event).put(update_event))
        .route("/:id/cancel", post(cancel_event))
        .route("/:id/attendances", get(list_event_attendances))
        .route("/:id/reservations", get(list_event_reservations))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/events - query: {:?}", query);
    let filter = EventMapper::to_filter(query)?;
    let events = state.events.list_filtered(&filter).await?;
    Ok(Json(EventMapper::to_list_dto(events)))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/events - request: {:?}", request);
    let event = state.events.create(EventMapper::to_create_command(request)).await?;
    Ok((StatusCode::CREATED, Json(EventMapper::to_dto(event))))
}

/// Next scheduled event from today on; `null` when nothing is scheduled
pub async fn upcoming_event(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/events/upcoming");
    let event = state.events.upcoming().await?;
    Ok(Json(event.map(EventMapper::to_dto)))
}

pub async fn recent_events(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/events/recent");
    let events = state.events.recent_finished(RECENT_EVENTS_LIMIT).await?;
    Ok(Json(EventMapper::to_list_dto(events)))
}

pub async fn get_event(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/events/{}", id);
    let event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Event", id))?;
    Ok(Json(EventMapper::to_dto(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /api/events/{} - request: {:?}", id, request);
    let event = state.events.update(id, EventMapper::to_update_command(request)).await?;
    Ok(Json(EventMapper::to_dto(event)))
}

pub async fn cancel_event(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("POST /api/events/{}/cancel", id);
    let event = state.events.cancel(id).await?;
    Ok(Json(EventMapper::to_dto(event)))
}

pub async fn list_event_attendances(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/events/{}/attendances", id);
    let attendances = state.attendances.list_by_event(id).await?;
    Ok(Json(AttendanceMapper::to_list_dto(attendances)))
}

/// Places still held for the event
pub async fn list_event_reservations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/events/{}/reservations", id);
    let reservations = state.reservations.list_active_by_event(id).await?;
    Ok(Json(ReservationMapper::to_list_dto(reservations)))
}
