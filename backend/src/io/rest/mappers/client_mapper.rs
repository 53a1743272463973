use shared::{
    Client as SharedClient, ClientListResponse, ClientQuery, CreateClientRequest, UpdateClientRequest,
};

use crate::domain::commands::clients::{CreateClientCommand, UpdateClientCommand};
use crate::domain::filters::ClientFilter;
use crate::domain::models::client::Client as DomainClient;

/// Mapper between client DTOs and domain clients
pub struct ClientMapper;

impl ClientMapper {
    pub fn to_dto(domain: DomainClient) -> SharedClient {
        SharedClient {
            loyalty_tier: domain.loyalty_tier(),
            spend_level: domain.spend_level(),
            average_per_visit: domain.average_per_visit(),
            id: domain.id,
            first_name: domain.first_name,
            last_name: domain.last_name,
            phone: domain.phone,
            email: domain.email,
            address: domain.address,
            comments: domain.comments,
            visits: domain.visits,
            accumulated_amount: domain.accumulated_amount,
            is_active: domain.is_active,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_list_dto(clients: Vec<DomainClient>) -> ClientListResponse {
        ClientListResponse {
            clients: clients.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateClientRequest) -> CreateClientCommand {
        CreateClientCommand {
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            email: request.email,
            address: request.address,
            comments: request.comments,
        }
    }

    pub fn to_update_command(request: UpdateClientRequest) -> UpdateClientCommand {
        UpdateClientCommand {
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            email: request.email,
            address: request.address,
            comments: request.comments,
        }
    }

    pub fn to_filter(query: ClientQuery) -> ClientFilter {
        ClientFilter {
            search: query.q,
            min_visits: query.min_visits,
            max_visits: query.max_visits,
            min_accumulated: query.min_accumulated,
            max_accumulated: query.max_accumulated,
            active_only: query.active_only.unwrap_or(false),
        }
    }
}
