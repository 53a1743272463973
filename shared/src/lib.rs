//! Wire types shared between the console backend and any front end.
//!
//! Every struct here is a plain serde DTO. Timestamps travel as RFC 3339
//! strings, event dates as `YYYY-MM-DD`, and money as `f64` rounded to
//! cents by the backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comments: Option<String>,
    /// Number of confirmed attendances
    pub visits: i64,
    /// Lifetime total paid across all attendances
    pub accumulated_amount: f64,
    pub is_active: bool,
    pub loyalty_tier: LoyaltyTier,
    pub spend_level: SpendLevel,
    pub average_per_visit: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Loyalty bucket derived from the visit counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    New,
    Occasional,
    Regular,
    Frequent,
    Vip,
}

/// Spending bucket derived from the accumulated amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendLevel {
    New,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comments: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
/// Visit and amount counters are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(EventStatus::Scheduled),
            "completed" => Some(EventStatus::Completed),
            "cancelled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub location: String,
    /// Scheduled date (YYYY-MM-DD)
    pub scheduled_date: Option<String>,
    pub capacity: Option<i64>,
    pub expense: f64,
    pub total_collected: f64,
    pub attendee_count: i64,
    pub net_income: f64,
    pub status: EventStatus,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub location: String,
    pub scheduled_date: Option<String>,
    pub capacity: Option<i64>,
    #[serde(default)]
    pub expense: f64,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub scheduled_date: Option<String>,
    /// Absent leaves the capacity alone; `null` removes the limit
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Option<i64>>,
    pub expense: Option<f64>,
    pub status: Option<EventStatus>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
}

// ---------------------------------------------------------------------------
// Referrals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Contacted,
    Converted,
    Rejected,
}

impl ReferralStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReferralStatus::Pending),
            "contacted" => Some(ReferralStatus::Contacted),
            "converted" => Some(ReferralStatus::Converted),
            "rejected" => Some(ReferralStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Contacted => "contacted",
            ReferralStatus::Converted => "converted",
            ReferralStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    pub referrer_id: i64,
    pub referrer_name: String,
    pub referred_client_id: Option<i64>,
    pub referred_name: String,
    pub prospect_email: Option<String>,
    pub prospect_phone: Option<String>,
    pub status: ReferralStatus,
    pub comments: Option<String>,
    pub created_at: String,
}

/// Either `referred_client_id` or `prospect_name` must be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateReferralRequest {
    pub referrer_id: Option<i64>,
    pub referred_client_id: Option<i64>,
    pub prospect_name: Option<String>,
    pub prospect_email: Option<String>,
    pub prospect_phone: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReferralRequest {
    pub status: Option<ReferralStatus>,
    pub prospect_email: Option<String>,
    pub prospect_phone: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralListResponse {
    pub referrals: Vec<Referral>,
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Reserved,
    Confirmed,
    Cancelled,
}

impl ReservationState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reserved" => Some(ReservationState::Reserved),
            "confirmed" => Some(ReservationState::Confirmed),
            "cancelled" => Some(ReservationState::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Reserved => "reserved",
            ReservationState::Confirmed => "confirmed",
            ReservationState::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub event_id: i64,
    pub event_name: String,
    pub deposit: f64,
    pub expected_total: f64,
    /// `expected_total - deposit`, never negative
    pub outstanding: f64,
    pub state: ReservationState,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub client_id: Option<i64>,
    pub event_id: Option<i64>,
    pub deposit: Option<f64>,
    pub expected_total: Option<f64>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmReservationRequest {
    /// Amount paid on top of the deposit. Omit to settle the full balance.
    pub remaining_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceOrigin {
    Reservation,
    WalkIn,
}

impl AttendanceOrigin {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reservation" => Some(AttendanceOrigin::Reservation),
            "walk_in" => Some(AttendanceOrigin::WalkIn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceOrigin::Reservation => "reservation",
            AttendanceOrigin::WalkIn => "walk_in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub event_id: i64,
    pub event_name: String,
    pub amount_paid: f64,
    pub reservation_id: Option<i64>,
    pub deposit_amount: f64,
    pub remaining_amount: f64,
    pub origin: AttendanceOrigin,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkInRequest {
    pub client_id: Option<i64>,
    pub event_id: Option<i64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceListResponse {
    pub attendances: Vec<Attendance>,
}

// ---------------------------------------------------------------------------
// List queries
// ---------------------------------------------------------------------------

/// `?q=` substring search used by every list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientQuery {
    pub q: Option<String>,
    pub min_visits: Option<i64>,
    pub max_visits: Option<i64>,
    pub min_accumulated: Option<f64>,
    pub max_accumulated: Option<f64>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_events: i64,
    pub total_referrals: i64,
    pub total_attendances: i64,
    pub total_revenue: f64,
    /// Clients with at least one visit
    pub active_clients: i64,
    pub upcoming_event: Option<Event>,
    pub recent_events: Vec<Event>,
}

// ---------------------------------------------------------------------------
// Waivers
// ---------------------------------------------------------------------------

/// How the batch of waiver recipients is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WaiverSelection {
    /// Everyone with an attendance at the event
    Event { event_id: i64 },
    /// Everyone with an attendance recorded within the range (YYYY-MM-DD, inclusive)
    DateRange { from: String, to: String },
    /// Explicit list of clients
    Clients { client_ids: Vec<i64> },
    /// Every active client
    All,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
    /// Session expiry (RFC 3339)
    pub expires_at: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A single inline form error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Body returned by the API for every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

/// Tell a field sent as `null` apart from one left out. Pair with
/// `#[serde(default)]` so a missing field stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_update_capacity_null_clears() {
        let untouched: UpdateEventRequest = serde_json::from_str(r#"{"name":"Temazcal"}"#).unwrap();
        assert_eq!(untouched.capacity, None);

        let cleared: UpdateEventRequest = serde_json::from_str(r#"{"capacity":null}"#).unwrap();
        assert_eq!(cleared.capacity, Some(None));

        let set: UpdateEventRequest = serde_json::from_str(r#"{"capacity":12}"#).unwrap();
        assert_eq!(set.capacity, Some(Some(12)));
    }

    #[test]
    fn test_waiver_selection_tagged_by_mode() {
        let json = r#"{"mode":"event","event_id":7}"#;
        let selection: WaiverSelection = serde_json::from_str(json).unwrap();
        assert_eq!(selection, WaiverSelection::Event { event_id: 7 });

        let json = r#"{"mode":"all"}"#;
        let selection: WaiverSelection = serde_json::from_str(json).unwrap();
        assert_eq!(selection, WaiverSelection::All);
    }

    #[test]
    fn test_status_enums_use_snake_case() {
        assert_eq!(serde_json::to_string(&EventStatus::Cancelled).unwrap(), "\"cancelled\"");
        assert_eq!(serde_json::to_string(&AttendanceOrigin::WalkIn).unwrap(), "\"walk_in\"");
        assert_eq!(ReservationState::Confirmed.as_str(), "confirmed");
    }

    #[test]
    fn test_error_response_omits_empty_field_errors() {
        let body = ErrorResponse {
            code: "NOT_FOUND".to_string(),
            message: "Client 3 not found".to_string(),
            details: vec![],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}
