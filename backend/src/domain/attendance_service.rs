use std::sync::Arc;
use tracing::{info, warn};

use super::commands::attendance::WalkInCommand;
use super::error::{DomainError, DomainResult};
use super::filters::AttendanceFilter;
use super::models::attendance::{Attendance, NewAttendance};
use super::models::{now_timestamp, round_cents};
use super::validation::Validator;
use crate::storage::{AttendanceStorage, EventStorage, ReservationStorage};

/// Service for attendance records and payment application.
///
/// Confirming a reservation and recording a walk-in both write the
/// attendance row, the client counters and the event counters in a single
/// storage transaction.
#[derive(Clone)]
pub struct AttendanceService {
    attendances: Arc<dyn AttendanceStorage>,
    reservations: Arc<dyn ReservationStorage>,
    events: Arc<dyn EventStorage>,
}

impl AttendanceService {
    pub fn new(
        attendances: Arc<dyn AttendanceStorage>,
        reservations: Arc<dyn ReservationStorage>,
        events: Arc<dyn EventStorage>,
    ) -> Self {
        Self { attendances, reservations, events }
    }

    pub async fn list(&self) -> DomainResult<Vec<Attendance>> {
        let attendances = self.attendances.list_attendances().await?;
        info!("Found {} attendance records", attendances.len());
        Ok(attendances)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Option<Attendance>> {
        let attendance = self.attendances.get_attendance(id).await?;
        if attendance.is_none() {
            warn!("Attendance not found: {}", id);
        }
        Ok(attendance)
    }

    pub async fn search(&self, query: &str) -> DomainResult<Vec<Attendance>> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        Ok(self.attendances.search_attendances(query).await?)
    }

    pub async fn list_filtered(&self, filter: &AttendanceFilter) -> DomainResult<Vec<Attendance>> {
        let attendances = self.search(filter.search.as_deref().unwrap_or("")).await?;
        Ok(attendances.into_iter().filter(|a| filter.matches(a)).collect())
    }

    pub async fn list_by_event(&self, event_id: i64) -> DomainResult<Vec<Attendance>> {
        Ok(self.attendances.list_attendances_by_event(event_id).await?)
    }

    pub async fn list_by_client(&self, client_id: i64) -> DomainResult<Vec<Attendance>> {
        Ok(self.attendances.list_attendances_by_client(client_id).await?)
    }

    /// Turn a reservation into an attendance.
    ///
    /// `remaining` is what the client pays on arrival; when omitted the full
    /// outstanding balance is assumed.
    pub async fn confirm_reservation(&self, reservation_id: i64, remaining: Option<f64>) -> DomainResult<Attendance> {
        let reservation = self
            .reservations
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))?;

        if !reservation.is_active() {
            return Err(DomainError::Conflict(format!(
                "Reservation {} is already {}.",
                reservation_id,
                reservation.state.as_str()
            )));
        }

        let remaining = remaining.unwrap_or_else(|| reservation.outstanding());
        if !remaining.is_finite() || remaining < 0.0 {
            return Err(DomainError::field("remaining_amount", "The remaining amount cannot be negative."));
        }

        let payment = NewAttendance {
            client_id: reservation.client_id,
            event_id: reservation.event_id,
            reservation_id: Some(reservation.id),
            deposit_amount: reservation.deposit,
            remaining_amount: round_cents(remaining),
            created_at: now_timestamp(),
        };

        let attendance = self
            .attendances
            .confirm_reservation(&payment)
            .await?
            .ok_or_else(|| DomainError::Conflict(format!("Reservation {} is no longer reserved.", reservation_id)))?;

        info!(
            "Confirmed reservation {}: client {} paid {:.2} for event {}",
            reservation_id, attendance.client_id, attendance.amount_paid, attendance.event_id
        );
        Ok(attendance)
    }

    /// Record an attendance for a client who arrived without a reservation
    pub async fn record_walk_in(&self, command: WalkInCommand) -> DomainResult<Attendance> {
        let mut v = Validator::new();
        v.required_id("client_id", "client", command.client_id);
        v.required_id("event_id", "event", command.event_id);
        v.positive("amount", "Amount", command.amount);
        v.finish()?;

        let (Some(client_id), Some(event_id), Some(amount)) = (command.client_id, command.event_id, command.amount)
        else {
            return Err(DomainError::field("form", "Incomplete attendance."));
        };

        let payment = NewAttendance {
            client_id,
            event_id,
            reservation_id: None,
            deposit_amount: 0.0,
            remaining_amount: round_cents(amount),
            created_at: now_timestamp(),
        };

        let Some(attendance) = self.attendances.record_walk_in(&payment).await? else {
            let event = self.events.get_event(event_id).await?;
            warn!("Walk-in refused for event {}", event_id);
            return Err(DomainError::event_unavailable(event.as_ref()));
        };
        info!(
            "Recorded walk-in {}: client {} paid {:.2} for event {}",
            attendance.id, client_id, attendance.amount_paid, event_id
        );
        Ok(attendance)
    }
}
