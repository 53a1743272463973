//! Shared fixtures for service and router tests

use std::ops::Deref;

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use chrono::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::commands::clients::CreateClientCommand;
use crate::domain::commands::events::CreateEventCommand;
use crate::domain::models::client::Client;
use crate::domain::models::event::Event;
use crate::domain::models::now_timestamp;
use crate::domain::models::user::{Session, User};
use crate::storage::{DbConnection, UserRepository, UserStorage};
use crate::{create_router, AppState};

/// Fully wired services over a fresh in-memory database
pub struct TestContext {
    pub state: AppState,
    db: DbConnection,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = DbConnection::init_test().await.expect("Failed to init test DB");
        Self { state: AppState::new(db.clone(), Duration::hours(1)), db }
    }

    pub async fn client(&self, first_name: &str, last_name: &str) -> Client {
        self.state
            .clients
            .create(CreateClientCommand {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create test client")
    }

    pub async fn event(&self, name: &str) -> Event {
        self.state
            .events
            .create(CreateEventCommand {
                name: name.to_string(),
                location: "Tepoztlán".to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create test event")
    }

    /// Valid bearer token for a throwaway operator. Skips password hashing.
    pub async fn token(&self) -> String {
        let users = UserRepository::new(self.db.clone());
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: format!("{}@test.colibri.mx", Uuid::new_v4()),
            display_name: None,
            password_hash: "not-a-hash".to_string(),
            created_at: now_timestamp(),
        };
        users.insert_user(&user).await.expect("Failed to insert test user");

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: "9999-12-31T00:00:00.000Z".to_string(),
            created_at: now_timestamp(),
        };
        users.insert_session(&session).await.expect("Failed to insert test session");
        session.token
    }

    /// Send a request through the full router without credentials
    pub async fn send(&self, request: Request<Body>) -> Response {
        let app = create_router(self.state.clone(), &AppConfig::default());
        app.oneshot(request).await.expect("Router failed")
    }

    /// Authenticated JSON request; returns the status and raw body
    pub async fn request(&self, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Bytes) {
        let token = self.token().await;
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.send(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, bytes)
    }
}

impl Deref for TestContext {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}
