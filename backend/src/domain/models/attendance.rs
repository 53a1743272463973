use shared::AttendanceOrigin;

/// Finalized record that a client paid for and attended an event
#[derive(Debug, Clone, PartialEq)]
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
    pub created_at: String,
}

/// Payment to be applied atomically: attendance row plus counter increments
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub client_id: i64,
    pub event_id: i64,
    pub reservation_id: Option<i64>,
    pub deposit_amount: f64,
    pub remaining_amount: f64,
    pub created_at: String,
}

impl Attendance {
    pub fn origin(&self) -> AttendanceOrigin {
        match self.reservation_id {
            Some(_) => AttendanceOrigin::Reservation,
            None => AttendanceOrigin::WalkIn,
        }
    }
}

impl NewAttendance {
    pub fn amount_paid(&self) -> f64 {
        super::round_cents(self.deposit_amount + self.remaining_amount)
    }
}
