use shared::ReservationState;
use std::sync::Arc;
use tracing::{info, warn};

use super::commands::reservations::CreateReservationCommand;
use super::error::{DomainError, DomainResult};
use super::models::reservation::{NewReservation, Reservation};
use super::models::{now_timestamp, round_cents};
use super::validation::{normalize_optional, Validator};
use crate::storage::{EventStorage, ReservationStorage};

/// Service for places held with a deposit
#[derive(Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationStorage>,
    events: Arc<dyn EventStorage>,
}

impl ReservationService {
    pub fn new(reservations: Arc<dyn ReservationStorage>, events: Arc<dyn EventStorage>) -> Self {
        Self { reservations, events }
    }

    pub async fn list(&self) -> DomainResult<Vec<Reservation>> {
        let reservations = self.reservations.list_reservations().await?;
        info!("Found {} reservations", reservations.len());
        Ok(reservations)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Option<Reservation>> {
        let reservation = self.reservations.get_reservation(id).await?;
        if reservation.is_none() {
            warn!("Reservation not found: {}", id);
        }
        Ok(reservation)
    }

    pub async fn search(&self, query: &str) -> DomainResult<Vec<Reservation>> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        Ok(self.reservations.search_reservations(query).await?)
    }

    pub async fn list_active_by_event(&self, event_id: i64) -> DomainResult<Vec<Reservation>> {
        Ok(self.reservations.list_active_reservations_for_event(event_id).await?)
    }

    pub async fn create(&self, command: CreateReservationCommand) -> DomainResult<Reservation> {
        let mut v = Validator::new();
        v.required_id("client_id", "client", command.client_id);
        v.required_id("event_id", "event", command.event_id);
        v.positive("deposit", "Deposit", command.deposit);
        v.positive("expected_total", "Total", command.expected_total);
        if let (Some(deposit), Some(total)) = (command.deposit, command.expected_total) {
            if deposit > 0.0 && total > 0.0 && total < deposit {
                v.push("expected_total", "The total cannot be less than the deposit.");
            }
        }
        v.finish()?;

        let (Some(client_id), Some(event_id), Some(deposit), Some(expected_total)) =
            (command.client_id, command.event_id, command.deposit, command.expected_total)
        else {
            return Err(DomainError::field("form", "Incomplete reservation."));
        };

        let new_reservation = NewReservation {
            client_id,
            event_id,
            deposit: round_cents(deposit),
            expected_total: round_cents(expected_total),
            comments: normalize_optional(command.comments),
            created_at: now_timestamp(),
        };

        let Some(reservation) = self.reservations.insert_reservation(&new_reservation).await? else {
            let event = self.events.get_event(event_id).await?;
            warn!("Event {} refused reservation for client {}", event_id, client_id);
            return Err(DomainError::event_unavailable(event.as_ref()));
        };
        info!(
            "Reserved place {} for client {} at event {} (deposit {:.2} of {:.2})",
            reservation.id, client_id, event_id, reservation.deposit, reservation.expected_total
        );
        Ok(reservation)
    }

    /// Release a held place. Only reservations still `reserved` can be cancelled.
    pub async fn cancel(&self, id: i64) -> DomainResult<Reservation> {
        let reservation = self
            .reservations
            .get_reservation(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))?;

        let moved = self
            .reservations
            .transition_reservation(id, ReservationState::Reserved, ReservationState::Cancelled, &now_timestamp())
            .await?;
        if !moved {
            return Err(DomainError::Conflict(format!(
                "Reservation {} is already {}.",
                id,
                reservation.state.as_str()
            )));
        }

        info!("Cancelled reservation {}", id);
        self.reservations
            .get_reservation(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::events::UpdateEventCommand;
    use crate::test_support::TestContext;

    fn command(client_id: i64, event_id: i64, deposit: f64, total: f64) -> CreateReservationCommand {
        CreateReservationCommand {
            client_id: Some(client_id),
            event_id: Some(event_id),
            deposit: Some(deposit),
            expected_total: Some(total),
            comments: None,
        }
    }

    #[tokio::test]
    async fn test_amount_rules() {
        let ctx = TestContext::new().await;

        let err = ctx
            .reservations
            .create(CreateReservationCommand {
                deposit: Some(0.0),
                expected_total: None,
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["client_id", "event_id", "deposit", "expected_total"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;
        let err = ctx.reservations.create(command(ana.id, event.id, 400.0, 300.0)).await.unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors[0].message, "The total cannot be less than the deposit.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_active_reservation_then_rebook_after_cancel() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;

        let first = ctx.reservations.create(command(ana.id, event.id, 100.0, 300.0)).await.unwrap();
        assert_eq!(first.outstanding(), 200.0);

        let err = ctx.reservations.create(command(ana.id, event.id, 100.0, 300.0)).await.unwrap_err();
        match err {
            DomainError::Duplicate(msg) => {
                assert_eq!(msg, "This client already has a place reserved for this event.")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let cancelled = ctx.reservations.cancel(first.id).await.unwrap();
        assert_eq!(cancelled.state, ReservationState::Cancelled);
        assert!(matches!(ctx.reservations.cancel(first.id).await, Err(DomainError::Conflict(_))));

        ctx.reservations.create(command(ana.id, event.id, 150.0, 300.0)).await.unwrap();
        assert_eq!(ctx.reservations.list_active_by_event(event.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_or_full_event_rejects_reservations() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let bruno = ctx.client("Bruno", "Díaz").await;
        let event = ctx.event("Temazcal").await;

        ctx.events
            .update(event.id, UpdateEventCommand { capacity: Some(Some(1)), ..Default::default() })
            .await
            .unwrap();
        ctx.reservations.create(command(ana.id, event.id, 100.0, 300.0)).await.unwrap();
        let err = ctx.reservations.create(command(bruno.id, event.id, 100.0, 300.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let other = ctx.event("Luna llena").await;
        ctx.events.cancel(other.id).await.unwrap();
        let err = ctx.reservations.create(command(bruno.id, other.id, 100.0, 300.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err = ctx.reservations.create(command(bruno.id, 999, 100.0, 300.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_concurrent_bookings_cannot_overfill() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let bruno = ctx.client("Bruno", "Díaz").await;
        let event = ctx.event("Temazcal").await;
        ctx.events
            .update(event.id, UpdateEventCommand { capacity: Some(Some(1)), ..Default::default() })
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            ctx.reservations.create(command(ana.id, event.id, 100.0, 300.0)),
            ctx.reservations.create(command(bruno.id, event.id, 100.0, 300.0)),
        );
        let booked = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(booked, 1);
        let refused = if first.is_err() { first } else { second };
        match refused {
            Err(DomainError::Conflict(msg)) => assert_eq!(msg, "The event 'Temazcal' is full."),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(ctx.reservations.list_active_by_event(event.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_by_client_or_event() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        let event = ctx.event("Temazcal").await;
        ctx.reservations.create(command(ana.id, event.id, 100.0, 300.0)).await.unwrap();

        assert_eq!(ctx.reservations.search("temaz").await.unwrap().len(), 1);
        assert_eq!(ctx.reservations.search("ana").await.unwrap().len(), 1);
        assert!(ctx.reservations.search("bruno").await.unwrap().is_empty());
    }
}
