use std::sync::Arc;
use tracing::{info, warn};

use super::commands::clients::{CreateClientCommand, UpdateClientCommand};
use super::error::{DomainError, DomainResult};
use super::filters::ClientFilter;
use super::models::client::{Client, NewClient};
use super::models::now_timestamp;
use super::validation::{normalize_optional, normalize_text, Validator};
use crate::storage::ClientStorage;

/// Service for managing the client registry
#[derive(Clone)]
pub struct ClientService {
    clients: Arc<dyn ClientStorage>,
}

impl ClientService {
    pub fn new(clients: Arc<dyn ClientStorage>) -> Self {
        Self { clients }
    }

    /// All clients, newest first
    pub async fn list(&self) -> DomainResult<Vec<Client>> {
        let clients = self.clients.list_clients().await?;
        info!("Found {} clients", clients.len());
        Ok(clients)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Option<Client>> {
        let client = self.clients.get_client(id).await?;
        if client.is_none() {
            warn!("Client not found: {}", id);
        }
        Ok(client)
    }

    /// Substring search over name and phone; a blank query lists everything
    pub async fn search(&self, query: &str) -> DomainResult<Vec<Client>> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        let clients = self.clients.search_clients(query).await?;
        info!("Client search '{}' matched {}", query.trim(), clients.len());
        Ok(clients)
    }

    /// Text search followed by visit, amount and active facets
    pub async fn list_filtered(&self, filter: &ClientFilter) -> DomainResult<Vec<Client>> {
        let clients = self.search(filter.search.as_deref().unwrap_or("")).await?;
        Ok(clients.into_iter().filter(|c| filter.matches(c)).collect())
    }

    pub async fn create(&self, command: CreateClientCommand) -> DomainResult<Client> {
        let new_client = NewClient {
            first_name: normalize_text(&command.first_name),
            last_name: normalize_text(&command.last_name),
            phone: normalize_optional(command.phone),
            email: normalize_optional(command.email),
            address: normalize_optional(command.address),
            comments: normalize_optional(command.comments),
            created_at: now_timestamp(),
        };

        Self::validate_profile(
            &new_client.first_name,
            &new_client.last_name,
            new_client.phone.as_deref(),
            new_client.email.as_deref(),
        )?;

        let client = self.clients.insert_client(&new_client).await?;
        info!("Created client {} with ID {}", client.full_name(), client.id);
        Ok(client)
    }

    pub async fn update(&self, id: i64, command: UpdateClientCommand) -> DomainResult<Client> {
        let mut client = self
            .clients
            .get_client(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", id))?;

        if let Some(first_name) = command.first_name {
            client.first_name = normalize_text(&first_name);
        }
        if let Some(last_name) = command.last_name {
            client.last_name = normalize_text(&last_name);
        }
        if command.phone.is_some() {
            client.phone = normalize_optional(command.phone);
        }
        if command.email.is_some() {
            client.email = normalize_optional(command.email);
        }
        if command.address.is_some() {
            client.address = normalize_optional(command.address);
        }
        if command.comments.is_some() {
            client.comments = normalize_optional(command.comments);
        }

        Self::validate_profile(
            &client.first_name,
            &client.last_name,
            client.phone.as_deref(),
            client.email.as_deref(),
        )?;

        client.updated_at = now_timestamp();
        self.clients.update_client(&client).await?;
        info!("Updated client {}", client.id);

        // Counters may have moved since the read above
        self.clients
            .get_client(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", id))
    }

    /// Soft-delete: the client stays in history but drops out of active lists
    pub async fn deactivate(&self, id: i64) -> DomainResult<Client> {
        if !self.clients.set_client_active(id, false, &now_timestamp()).await? {
            return Err(DomainError::not_found("Client", id));
        }
        info!("Deactivated client {}", id);
        self.clients
            .get_client(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client", id))
    }

    fn validate_profile(first_name: &str, last_name: &str, phone: Option<&str>, email: Option<&str>) -> DomainResult<()> {
        let mut v = Validator::new();
        v.text("first_name", "First name", first_name, 2, 100);
        v.text("last_name", "Last name", last_name, 2, 100);
        v.phone("phone", phone);
        v.email("email", email);
        v.finish()
    }
}
