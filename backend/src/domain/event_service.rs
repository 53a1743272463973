use chrono::{Local, NaiveDate};
use shared::EventStatus;
use std::sync::Arc;
use tracing::{info, warn};

use super::commands::events::{CreateEventCommand, UpdateEventCommand};
use super::error::{DomainError, DomainResult};
use super::filters::EventFilter;
use super::models::event::{Event, NewEvent};
use super::models::{now_timestamp, round_cents};
use super::validation::{normalize_optional, normalize_text, parse_date, Validator, MAX_EXPENSE};
use crate::storage::EventStorage;

/// Number of finished events shown on the dashboard
pub const RECENT_EVENTS_LIMIT: i64 = 3;

/// Service for scheduling and managing events
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStorage>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStorage>) -> Self {
        Self { events }
    }

    pub async fn list(&self) -> DomainResult<Vec<Event>> {
        let events = self.events.list_events().await?;
        info!("Found {} events", events.len());
        Ok(events)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Option<Event>> {
        let event = self.events.get_event(id).await?;
        if event.is_none() {
            warn!("Event not found: {}", id);
        }
        Ok(event)
    }

    pub async fn search(&self, query: &str) -> DomainResult<Vec<Event>> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        let events = self.events.search_events(query).await?;
        info!("Event search '{}' matched {}", query.trim(), events.len());
        Ok(events)
    }

    pub async fn list_filtered(&self, filter: &EventFilter) -> DomainResult<Vec<Event>> {
        let events = self.search(filter.search.as_deref().unwrap_or("")).await?;
        Ok(events.into_iter().filter(|e| filter.matches(e)).collect())
    }

    pub async fn create(&self, command: CreateEventCommand) -> DomainResult<Event> {
        let name = normalize_text(&command.name);
        let location = normalize_text(&command.location);
        let raw_date = normalize_optional(command.scheduled_date);

        let mut v = Validator::new();
        Self::check_fields(&mut v, &name, &location, command.expense, command.capacity);
        let scheduled_date = Self::check_date(&mut v, raw_date.as_deref());
        v.finish()?;

        let new_event = NewEvent {
            name,
            location,
            scheduled_date,
            capacity: command.capacity,
            expense: round_cents(command.expense),
            comments: normalize_optional(command.comments),
            created_at: now_timestamp(),
        };

        let event = self.events.insert_event(&new_event).await?;
        info!("Created event '{}' with ID {}", event.name, event.id);
        Ok(event)
    }

    pub async fn update(&self, id: i64, command: UpdateEventCommand) -> DomainResult<Event> {
        let mut event = self
            .events
            .get_event(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event", id))?;

        let mut v = Validator::new();

        if let Some(name) = command.name {
            event.name = normalize_text(&name);
        }
        if let Some(location) = command.location {
            event.location = normalize_text(&location);
        }
        if let Some(raw) = command.scheduled_date {
            let raw = normalize_optional(Some(raw));
            event.scheduled_date = Self::check_date(&mut v, raw.as_deref());
        }
        if let Some(capacity) = command.capacity {
            event.capacity = capacity;
        }
        if let Some(expense) = command.expense {
            event.expense = round_cents(expense);
        }
        if let Some(status) = command.status {
            event.status = status;
        }
        if command.comments.is_some() {
            event.comments = normalize_optional(command.comments);
        }

        Self::check_fields(&mut v, &event.name, &event.location, event.expense, event.capacity);
        v.finish()?;

        event.updated_at = now_timestamp();
        self.events.update_event(&event).await?;
        info!("Updated event {}", event.id);

        // Counters may have moved since the read above
        self.events
            .get_event(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event", id))
    }

    pub async fn cancel(&self, id: i64) -> DomainResult<Event> {
        if !self.events.set_event_status(id, EventStatus::Cancelled, &now_timestamp()).await? {
            return Err(DomainError::not_found("Event", id));
        }
        info!("Cancelled event {}", id);
        self.events
            .get_event(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event", id))
    }

    /// Next event dated today or later
    pub async fn upcoming(&self) -> DomainResult<Option<Event>> {
        self.upcoming_on(Local::now().date_naive()).await
    }

    pub async fn upcoming_on(&self, today: NaiveDate) -> DomainResult<Option<Event>> {
        Ok(self.events.next_event_from(today).await?)
    }

    /// Events already past, latest first
    pub async fn recent_finished(&self, limit: i64) -> DomainResult<Vec<Event>> {
        self.recent_finished_on(Local::now().date_naive(), limit).await
    }

    pub async fn recent_finished_on(&self, today: NaiveDate, limit: i64) -> DomainResult<Vec<Event>> {
        Ok(self.events.finished_before(today, limit).await?)
    }

    fn check_fields(v: &mut Validator, name: &str, location: &str, expense: f64, capacity: Option<i64>) {
        v.text("name", "Event name", name, 3, 200);
        v.text("location", "Location", location, 3, 300);
        if !expense.is_finite() || !(0.0..=MAX_EXPENSE).contains(&expense) {
            v.push("expense", "The expense must be between 0 and 999,999.99.");
        }
        if matches!(capacity, Some(c) if c <= 0) {
            v.push("capacity", "The capacity must be greater than zero.");
        }
    }

    fn check_date(v: &mut Validator, raw: Option<&str>) -> Option<NaiveDate> {
        let raw = raw?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            v.push("scheduled_date", "Enter the date as YYYY-MM-DD.");
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    fn command(name: &str, date: Option<&str>) -> CreateEventCommand {
        CreateEventCommand {
            name: name.to_string(),
            location: "Tepoztlán, Morelos".to_string(),
            scheduled_date: date.map(str::to_string),
            capacity: None,
            expense: 1500.0,
            comments: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_validate() {
        let ctx = TestContext::new().await;

        let event = ctx.events.create(command("Temazcal", Some("2024-05-01"))).await.unwrap();
        assert_eq!(event.status, EventStatus::Scheduled);
        assert_eq!(event.net_income(), -1500.0);

        let err = ctx
            .events
            .create(CreateEventCommand {
                name: "Te".to_string(),
                location: "".to_string(),
                scheduled_date: Some("05/01/2024".to_string()),
                capacity: Some(0),
                expense: 1_000_000.0,
                comments: None,
            })
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "location", "expense", "capacity", "scheduled_date"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_and_cancel() {
        let ctx = TestContext::new().await;
        let event = ctx.events.create(command("Temazcal", None)).await.unwrap();

        let updated = ctx
            .events
            .update(
                event.id,
                UpdateEventCommand {
                    scheduled_date: Some("2024-06-15".to_string()),
                    capacity: Some(Some(20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.scheduled_date, NaiveDate::from_ymd_opt(2024, 6, 15));
        assert_eq!(updated.capacity, Some(20));

        let renamed = ctx
            .events
            .update(event.id, UpdateEventCommand { name: Some("Temazcal lunar".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(renamed.capacity, Some(20));

        let unlimited = ctx
            .events
            .update(event.id, UpdateEventCommand { capacity: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(unlimited.capacity, None);
        assert_eq!(ctx.events.get(event.id).await.unwrap().unwrap().capacity, None);

        let cancelled = ctx.events.cancel(event.id).await.unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);
        assert!(matches!(ctx.events.cancel(404).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_dashboard_helpers_and_filters() {
        let ctx = TestContext::new().await;
        ctx.events.create(command("Luna de enero", Some("2024-01-20"))).await.unwrap();
        ctx.events.create(command("Luna de febrero", Some("2024-02-20"))).await.unwrap();
        ctx.events.create(command("Equinoccio", Some("2024-03-20"))).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let next = ctx.events.upcoming_on(today).await.unwrap().unwrap();
        assert_eq!(next.name, "Equinoccio");

        let recent = ctx.events.recent_finished_on(today, RECENT_EVENTS_LIMIT).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].name, "Luna de febrero");

        let filtered = ctx
            .events
            .list_filtered(&EventFilter {
                search: Some("luna".to_string()),
                from: NaiveDate::from_ymd_opt(2024, 2, 1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Luna de febrero");
    }
}
