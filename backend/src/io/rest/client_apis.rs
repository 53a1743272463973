//! # REST API for Client Management
//!
//! Registration, lookup, search with facets, editing and deactivation of
//! clients, plus the per-client attendance and referral lists.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{ClientQuery, CreateClientRequest, UpdateClientRequest};
use tracing::info;

use super::error::ApiResult;
use super::mappers::attendance_mapper::AttendanceMapper;
use super::mappers::client_mapper::ClientMapper;
use super::mappers::referral_mapper::ReferralMapper;
use crate::domain::DomainError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).put(update_client))
        .route("/:id/deactivate", post(deactivate_client))
        .route("/:id/attendances", get(list_client_attendances))
        .route("/:id/referrals", get(list_client_referrals))
}

/// List clients, optionally narrowed by `q` and the facet parameters
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/clients - query: {:?}", query);
    let clients = state.clients.list_filtered(&ClientMapper::to_filter(query)).await?;
    Ok(Json(ClientMapper::to_list_dto(clients)))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/clients - request: {:?}", request);
    let client = state.clients.create(ClientMapper::to_create_command(request)).await?;
    Ok((StatusCode::CREATED, Json(ClientMapper::to_dto(client))))
}

pub async fn get_client(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/clients/{}", id);
    let client = state
        .clients
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Client", id))?;
    Ok(Json(ClientMapper::to_dto(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateClientRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /api/clients/{} - request: {:?}", id, request);
    let client = state.clients.update(id, ClientMapper::to_update_command(request)).await?;
    Ok(Json(ClientMapper::to_dto(client)))
}

pub async fn deactivate_client(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("POST /api/clients/{}/deactivate", id);
    let client = state.clients.deactivate(id).await?;
    Ok(Json(ClientMapper::to_dto(client)))
}

pub async fn list_client_attendances(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/clients/{}/attendances", id);
    let attendances = state.attendances.list_by_client(id).await?;
    Ok(Json(AttendanceMapper::to_list_dto(attendances)))
}

pub async fn list_client_referrals(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/clients/{}/referrals", id);
    let referrals = state.referrals.list_by_referrer(id).await?;
    Ok(Json(ReferralMapper::to_list_dto(referrals)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestContext;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{Client, ClientListResponse, ErrorResponse};

    #[tokio::test]
    async fn test_create_and_search_clients() {
        let ctx = TestContext::new().await;

        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/clients",
                Some(json!({"first_name": "Ana", "last_name": "López", "phone": "555 123 4567"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Client = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.visits, 0);

        let (status, body) = ctx.request(Method::GET, "/api/clients?q=l%C3%B3pez", None).await;
        assert_eq!(status, StatusCode::OK);
        let list: ClientListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.clients.len(), 1);

        let (_, body) = ctx.request(Method::GET, "/api/clients?q=zzz", None).await;
        let list: ClientListResponse = serde_json::from_slice(&body).unwrap();
        assert!(list.clients.is_empty());
    }

    #[tokio::test]
    async fn test_blank_names_are_reported_per_field() {
        let ctx = TestContext::new().await;

        let (status, body) = ctx
            .request(Method::POST, "/api/clients", Some(json!({"first_name": " ", "last_name": ""})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        let fields: Vec<&str> = error.details.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "last_name"]);
    }

    #[tokio::test]
    async fn test_missing_client_is_404() {
        let ctx = TestContext::new().await;
        let (status, body) = ctx.request(Method::GET, "/api/clients/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "NOT_FOUND");
    }
}
