use shared::{CreateEventRequest, Event as SharedEvent, EventListResponse, EventQuery, UpdateEventRequest};

use super::optional_date;
use crate::domain::commands::events::{CreateEventCommand, UpdateEventCommand};
use crate::domain::error::DomainResult;
use crate::domain::filters::EventFilter;
use crate::domain::models::event::Event as DomainEvent;

/// Mapper between event DTOs and domain events
pub struct EventMapper;

impl EventMapper {
    pub fn to_dto(domain: DomainEvent) -> SharedEvent {
        SharedEvent {
            net_income: domain.net_income(),
            id: domain.id,
            name: domain.name,
            location: domain.location,
            scheduled_date: domain.scheduled_date.map(|d| d.format("%Y-%m-%d").to_string()),
            capacity: domain.capacity,
            expense: domain.expense,
            total_collected: domain.total_collected,
            attendee_count: domain.attendee_count,
            status: domain.status,
            comments: domain.comments,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_list_dto(events: Vec<DomainEvent>) -> EventListResponse {
        EventListResponse {
            events: events.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateEventRequest) -> CreateEventCommand {
        CreateEventCommand {
            name: request.name,
            location: request.location,
            scheduled_date: request.scheduled_date,
            capacity: request.capacity,
            expense: request.expense,
            comments: request.comments,
        }
    }

    pub fn to_update_command(request: UpdateEventRequest) -> UpdateEventCommand {
        UpdateEventCommand {
            name: request.name,
            location: request.location,
            scheduled_date: request.scheduled_date,
            capacity: request.capacity,
            expense: request.expense,
            status: request.status,
            comments: request.comments,
        }
    }

    pub fn to_filter(query: EventQuery) -> DomainResult<EventFilter> {
        Ok(EventFilter {
            from: optional_date("from", query.from.as_deref())?,
            to: optional_date("to", query.to.as_deref())?,
            search: query.q,
            status: query.status,
        })
    }
}
