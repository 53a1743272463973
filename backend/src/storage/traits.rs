//! # Storage Traits
//!
//! Abstractions the domain services depend on. The SQLite repositories in
//! [`crate::storage::repositories`] are the production implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{EventStatus, ReservationState};

use crate::domain::models::attendance::{Attendance, NewAttendance};
use crate::domain::models::client::{Client, NewClient};
use crate::domain::models::event::{Event, NewEvent};
use crate::domain::models::referral::{NewReferral, Referral};
use crate::domain::models::reservation::{NewReservation, Reservation};
use crate::domain::models::user::{Session, User};
use crate::storage::error::StorageResult;

#[async_trait]
pub trait ClientStorage: Send + Sync {
    async fn insert_client(&self, client: &NewClient) -> StorageResult<Client>;

    async fn get_client(&self, id: i64) -> StorageResult<Option<Client>>;

    /// All clients, newest first
    async fn list_clients(&self) -> StorageResult<Vec<Client>>;

    /// Case-insensitive substring match over first name, last name and phone
    async fn search_clients(&self, query: &str) -> StorageResult<Vec<Client>>;

    /// Persist profile fields. Visit and amount counters are never written here.
    async fn update_client(&self, client: &Client) -> StorageResult<()>;

    /// Returns false when no client has the given id
    async fn set_client_active(&self, id: i64, active: bool, updated_at: &str) -> StorageResult<bool>;

    async fn count_clients(&self) -> StorageResult<i64>;

    /// Clients with at least one visit
    async fn count_clients_with_visits(&self) -> StorageResult<i64>;
}

#[async_trait]
pub trait EventStorage: Send + Sync {
    async fn insert_event(&self, event: &NewEvent) -> StorageResult<Event>;

    async fn get_event(&self, id: i64) -> StorageResult<Option<Event>>;

    /// All events, newest first
    async fn list_events(&self) -> StorageResult<Vec<Event>>;

    /// Case-insensitive substring match over name and location
    async fn search_events(&self, query: &str) -> StorageResult<Vec<Event>>;

    /// Persist editable fields. Attendance counters are never written here.
    async fn update_event(&self, event: &Event) -> StorageResult<()>;

    async fn set_event_status(&self, id: i64, status: EventStatus, updated_at: &str) -> StorageResult<bool>;

    /// Soonest non-cancelled event dated on or after `today`
    async fn next_event_from(&self, today: NaiveDate) -> StorageResult<Option<Event>>;

    /// Events dated before `today`, latest first
    async fn finished_before(&self, today: NaiveDate, limit: i64) -> StorageResult<Vec<Event>>;

    async fn count_events(&self) -> StorageResult<i64>;
}

#[async_trait]
pub trait ReferralStorage: Send + Sync {
    async fn insert_referral(&self, referral: &NewReferral) -> StorageResult<Referral>;

    async fn get_referral(&self, id: i64) -> StorageResult<Option<Referral>>;

    async fn list_referrals(&self) -> StorageResult<Vec<Referral>>;

    /// Case-insensitive substring match over prospect name and referrer name
    async fn search_referrals(&self, query: &str) -> StorageResult<Vec<Referral>>;

    async fn list_referrals_by_referrer(&self, referrer_id: i64) -> StorageResult<Vec<Referral>>;

    /// Persist status, contact details and comments
    async fn update_referral(&self, referral: &Referral) -> StorageResult<()>;

    async fn count_referrals(&self) -> StorageResult<i64>;
}

#[async_trait]
pub trait ReservationStorage: Send + Sync {
    /// Insert a reservation if its event is not cancelled and has a free
    /// place. Returns `None` otherwise, including when the event is missing.
    async fn insert_reservation(&self, reservation: &NewReservation) -> StorageResult<Option<Reservation>>;

    async fn get_reservation(&self, id: i64) -> StorageResult<Option<Reservation>>;

    async fn list_reservations(&self) -> StorageResult<Vec<Reservation>>;

    /// Case-insensitive substring match over client and event names
    async fn search_reservations(&self, query: &str) -> StorageResult<Vec<Reservation>>;

    /// Reservations still in the `reserved` state for an event
    async fn list_active_reservations_for_event(&self, event_id: i64) -> StorageResult<Vec<Reservation>>;

    /// Move a reservation from `from` to `to`. Returns false when the
    /// reservation is missing or not currently in `from`.
    async fn transition_reservation(
        &self,
        id: i64,
        from: ReservationState,
        to: ReservationState,
        updated_at: &str,
    ) -> StorageResult<bool>;
}

#[async_trait]
pub trait AttendanceStorage: Send + Sync {
    async fn get_attendance(&self, id: i64) -> StorageResult<Option<Attendance>>;

    async fn list_attendances(&self) -> StorageResult<Vec<Attendance>>;

    /// Case-insensitive substring match over client and event names
    async fn search_attendances(&self, query: &str) -> StorageResult<Vec<Attendance>>;

    async fn list_attendances_by_event(&self, event_id: i64) -> StorageResult<Vec<Attendance>>;

    async fn list_attendances_by_client(&self, client_id: i64) -> StorageResult<Vec<Attendance>>;

    /// Confirm a reserved place and record the payment in one transaction.
    ///
    /// Returns `None` without writing anything when the reservation is no
    /// longer in the `reserved` state.
    async fn confirm_reservation(&self, payment: &NewAttendance) -> StorageResult<Option<Attendance>>;

    /// Record a payment without a prior reservation in one transaction.
    ///
    /// Returns `None` without writing anything when the event is missing,
    /// cancelled or has no free place.
    async fn record_walk_in(&self, payment: &NewAttendance) -> StorageResult<Option<Attendance>>;

    async fn count_attendances(&self) -> StorageResult<i64>;

    /// Sum of every `amount_paid`
    async fn total_revenue(&self) -> StorageResult<f64>;

    /// Distinct clients that attended the event
    async fn client_ids_for_event(&self, event_id: i64) -> StorageResult<Vec<i64>>;

    /// Distinct clients with an attendance recorded between the dates (inclusive)
    async fn client_ids_between(&self, from: NaiveDate, to: NaiveDate) -> StorageResult<Vec<i64>>;
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn insert_user(&self, user: &User) -> StorageResult<()>;

    async fn get_user(&self, id: &str) -> StorageResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    async fn count_users(&self) -> StorageResult<i64>;

    async fn insert_session(&self, session: &Session) -> StorageResult<()>;

    async fn get_session(&self, token: &str) -> StorageResult<Option<Session>>;

    /// Returns false when the token was unknown
    async fn delete_session(&self, token: &str) -> StorageResult<bool>;

    /// Remove sessions that expired before `now`, returning how many were dropped
    async fn delete_expired_sessions(&self, now: &str) -> StorageResult<u64>;
}
