use shared::ReservationState;

/// A place held at an event with a partial deposit ("apartado")
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub event_id: i64,
    pub event_name: String,
    pub deposit: f64,
    pub expected_total: f64,
    pub state: ReservationState,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub client_id: i64,
    pub event_id: i64,
    pub deposit: f64,
    pub expected_total: f64,
    pub comments: Option<String>,
    pub created_at: String,
}

impl Reservation {
    /// Balance still owed when the client shows up
    pub fn outstanding(&self) -> f64 {
        super::round_cents((self.expected_total - self.deposit).max(0.0))
    }

    pub fn is_active(&self) -> bool {
        self.state == ReservationState::Reserved
    }
}
