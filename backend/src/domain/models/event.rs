use chrono::NaiveDate;
use shared::EventStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub scheduled_date: Option<NaiveDate>,
    pub capacity: Option<i64>,
    pub expense: f64,
    pub total_collected: f64,
    pub attendee_count: i64,
    pub status: EventStatus,
    pub comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub scheduled_date: Option<NaiveDate>,
    pub capacity: Option<i64>,
    pub expense: f64,
    pub comments: Option<String>,
    pub created_at: String,
}

impl Event {
    pub fn net_income(&self) -> f64 {
        super::round_cents(self.total_collected - self.expense)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}
