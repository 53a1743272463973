//! Facet filters applied to loaded collections after the text search

use chrono::NaiveDate;
use shared::EventStatus;

use super::models::attendance::Attendance;
use super::models::client::Client;
use super::models::event::Event;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub min_visits: Option<i64>,
    pub max_visits: Option<i64>,
    pub min_accumulated: Option<f64>,
    pub max_accumulated: Option<f64>,
    pub active_only: bool,
}

impl ClientFilter {
    pub fn matches(&self, client: &Client) -> bool {
        within(client.visits, self.min_visits, self.max_visits)
            && within(client.accumulated_amount, self.min_accumulated, self.max_accumulated)
            && (!self.active_only || client.is_active)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<EventStatus>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        // Undated events drop out once a date bound is set
        match event.scheduled_date {
            Some(date) => within(date, self.from, self.to),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl AttendanceFilter {
    pub fn matches(&self, attendance: &Attendance) -> bool {
        if !within(attendance.amount_paid, self.min_amount, self.max_amount) {
            return false;
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        match recorded_on(&attendance.created_at) {
            Some(date) => within(date, self.from, self.to),
            None => false,
        }
    }
}

/// Calendar date of an RFC 3339 timestamp
pub fn recorded_on(timestamp: &str) -> Option<NaiveDate> {
    timestamp.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(visits: i64, accumulated_amount: f64, is_active: bool) -> Client {
        Client {
            id: 1,
            first_name: "Ana".to_string(),
            last_name: "López".to_string(),
            phone: None,
            email: None,
            address: None,
            comments: None,
            visits,
            accumulated_amount,
            is_active,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn event(date: Option<(i32, u32, u32)>, status: EventStatus) -> Event {
        Event {
            id: 1,
            name: "Temazcal".to_string(),
            location: "Tepoztlán".to_string(),
            scheduled_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            capacity: None,
            expense: 0.0,
            total_collected: 0.0,
            attendee_count: 0,
            status,
            comments: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_client_filter_ranges() {
        let filter = ClientFilter {
            min_visits: Some(2),
            max_accumulated: Some(1000.0),
            active_only: true,
            ..Default::default()
        };
        assert!(filter.matches(&client(2, 1000.0, true)));
        assert!(!filter.matches(&client(1, 100.0, true)));
        assert!(!filter.matches(&client(3, 1000.01, true)));
        assert!(!filter.matches(&client(3, 100.0, false)));
        assert!(ClientFilter::default().matches(&client(0, 0.0, false)));
    }

    #[test]
    fn test_event_filter_dates_are_inclusive() {
        let filter = EventFilter {
            from: NaiveDate::from_ymd_opt(2024, 3, 1),
            to: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        assert!(filter.matches(&event(Some((2024, 3, 1)), EventStatus::Scheduled)));
        assert!(filter.matches(&event(Some((2024, 3, 31)), EventStatus::Completed)));
        assert!(!filter.matches(&event(Some((2024, 4, 1)), EventStatus::Scheduled)));
        assert!(!filter.matches(&event(None, EventStatus::Scheduled)));

        let by_status = EventFilter { status: Some(EventStatus::Cancelled), ..Default::default() };
        assert!(by_status.matches(&event(None, EventStatus::Cancelled)));
        assert!(!by_status.matches(&event(None, EventStatus::Scheduled)));
    }

    #[test]
    fn test_recorded_on() {
        assert_eq!(recorded_on("2024-03-01T18:30:00.000Z"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(recorded_on("bad"), None);
    }
}
