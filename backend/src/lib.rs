//! # Colibri Backend
//!
//! Server side of the Senda del Colibrí admin console: clients, events,
//! referrals, reservations, attendance, CSV exports, waiver PDFs and
//! operator sessions.
//!
//! ## Architecture
//!
//! ```text
//! HTTP clients
//!     ↓
//! IO layer (axum handlers, session guard, DTO mappers)
//!     ↓
//! Domain layer (validation, services, error taxonomy)
//!     ↓
//! Storage layer (sqlx repositories over SQLite)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{
    AttendanceService, AuthService, ClientService, EventService, ExportService, ReferralService,
    ReservationService, StatsService, WaiverService,
};
use crate::storage::{
    AttendanceRepository, ClientRepository, DbConnection, EventRepository, ReferralRepository,
    ReservationRepository, UserRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
    pub events: EventService,
    pub referrals: ReferralService,
    pub reservations: ReservationService,
    pub attendances: AttendanceService,
    pub stats: StatsService,
    pub exports: ExportService,
    pub waivers: WaiverService,
    pub auth: AuthService,
}

impl AppState {
    /// Wire every service to repositories sharing one connection pool
    pub fn new(db: DbConnection, session_ttl: chrono::Duration) -> Self {
        let clients = Arc::new(ClientRepository::new(db.clone()));
        let events = Arc::new(EventRepository::new(db.clone()));
        let referrals = Arc::new(ReferralRepository::new(db.clone()));
        let reservations = Arc::new(ReservationRepository::new(db.clone()));
        let attendances = Arc::new(AttendanceRepository::new(db.clone()));
        let users = Arc::new(UserRepository::new(db));

        Self {
            clients: ClientService::new(clients.clone()),
            events: EventService::new(events.clone()),
            referrals: ReferralService::new(referrals.clone()),
            reservations: ReservationService::new(reservations.clone(), events.clone()),
            attendances: AttendanceService::new(attendances.clone(), reservations, events.clone()),
            stats: StatsService::new(clients.clone(), events.clone(), referrals, attendances.clone()),
            exports: ExportService::new(clients.clone(), events, attendances.clone()),
            waivers: WaiverService::new(clients, attendances),
            auth: AuthService::new(users, session_ttl),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    info!("Setting up domain model");
    let state = AppState::new(db, config.session_ttl());

    if let Some(admin) = &config.admin {
        state
            .auth
            .bootstrap_admin(&admin.email, &admin.password)
            .await
            .context("failed to bootstrap admin account")?;
    }

    Ok(state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    // Origin is validated when the config is loaded
    let origin = HeaderValue::from_str(&config.allowed_origin)
        .unwrap_or_else(|_| HeaderValue::from_static(config::DEFAULT_ALLOWED_ORIGIN));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let guard = from_fn_with_state(app_state.clone(), io::require_session);
    let api = io::api_router().layer(guard.clone());

    // Page routes without a file behind them: the front end's index, or 404
    let pages: Router = match &config.static_dir {
        Some(dir) => Router::new().fallback_service(ServeFile::new(dir.join("index.html"))),
        None => Router::new().fallback(page_not_found),
    }
    .layer(guard)
    .with_state(app_state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api", api);

    // Files under the static dir are public so the login page can load
    let router = match &config.static_dir {
        Some(dir) => {
            info!("Serving static files from {}", dir.display());
            router.fallback_service(ServeDir::new(dir).fallback(pages))
        }
        None => router.fallback_service(pages),
    };

    router.layer(cors).with_state(app_state)
}

async fn page_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
