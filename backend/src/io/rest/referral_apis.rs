//! # REST API for Referrals

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{CreateReferralRequest, SearchQuery, UpdateReferralRequest};
use tracing::info;

use super::error::ApiResult;
use super::mappers::referral_mapper::ReferralMapper;
use crate::domain::DomainError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_referrals).post(create_referral))
        .route("/:id", get(get_referral).put(update_referral))
}

pub async fn list_referrals(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/referrals - query: {:?}", query);
    let referrals = state.referrals.search(query.q.as_deref().unwrap_or("")).await?;
    Ok(Json(ReferralMapper::to_list_dto(referrals)))
}

pub async fn create_referral(
    State(state): State<AppState>,
    Json(request): Json<CreateReferralRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /api/referrals - request: {:?}", request);
    let referral = state.referrals.create(ReferralMapper::to_create_command(request)).await?;
    Ok((StatusCode::CREATED, Json(ReferralMapper::to_dto(referral))))
}

pub async fn get_referral(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/referrals/{}", id);
    let referral = state
        .referrals
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Referral", id))?;
    Ok(Json(ReferralMapper::to_dto(referral)))
}

pub async fn update_referral(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateReferralRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("PUT /api/referrals/{} - request: {:?}", id, request);
    let referral = state.referrals.update(id, ReferralMapper::to_update_command(request)).await?;
    Ok(Json(ReferralMapper::to_dto(referral)))
}
