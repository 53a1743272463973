use async_trait::async_trait;
use chrono::NaiveDate;
use shared::EventStatus;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::contains_pattern;
use crate::domain::models::event::{Event, NewEvent};
use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::EventStorage;

const EVENT_COLUMNS: &str = "id, name, location, scheduled_date, capacity, expense, total_collected, \
     attendee_count, status, comments, created_at, updated_at";

/// Repository for event operations
#[derive(Clone)]
pub struct EventRepository {
    db: DbConnection,
}

impl EventRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_event(row: &SqliteRow) -> StorageResult<Event> {
        let status: String = row.get("status");
        let status = EventStatus::parse(&status)
            .ok_or_else(|| StorageError::Database(format!("unknown event status '{}'", status)))?;

        Ok(Event {
            id: row.get("id"),
            name: row.get("name"),
            location: row.get("location"),
            scheduled_date: row.get("scheduled_date"),
            capacity: row.get("capacity"),
            expense: row.get("expense"),
            total_collected: row.get("total_collected"),
            attendee_count: row.get("attendee_count"),
            status,
            comments: row.get("comments"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn rows_to_events(rows: &[SqliteRow]) -> StorageResult<Vec<Event>> {
        rows.iter().map(Self::row_to_event).collect()
    }
}

#[async_trait]
impl EventStorage for EventRepository {
    async fn insert_event(&self, event: &NewEvent) -> StorageResult<Event> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (name, location, scheduled_date, capacity, expense, comments, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.name)
        .bind(&event.location)
        .bind(event.scheduled_date)
        .bind(event.capacity)
        .bind(event.expense)
        .bind(&event.comments)
        .bind(&event.created_at)
        .bind(&event.created_at)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_event(id)
            .await?
            .ok_or_else(|| StorageError::Database(format!("event {} missing after insert", id)))
    }

    async fn get_event(&self, id: i64) -> StorageResult<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_event).transpose()
    }

    async fn list_events(&self) -> StorageResult<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM events ORDER BY created_at DESC, id DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_events(&rows)
    }

    async fn search_events(&self, query: &str) -> StorageResult<Vec<Event>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM events
            WHERE name LIKE ?1 ESCAPE '\'
               OR location LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "#,
            EVENT_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_events(&rows)
    }

    async fn update_event(&self, event: &Event) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE events
            SET name = ?, location = ?, scheduled_date = ?, capacity = ?, expense = ?,
                status = ?, comments = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.name)
        .bind(&event.location)
        .bind(event.scheduled_date)
        .bind(event.capacity)
        .bind(event.expense)
        .bind(event.status.as_str())
        .bind(&event.comments)
        .bind(&event.updated_at)
        .bind(event.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn set_event_status(&self, id: i64, status: EventStatus, updated_at: &str) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn next_event_from(&self, today: NaiveDate) -> StorageResult<Option<Event>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM events
            WHERE scheduled_date IS NOT NULL AND scheduled_date >= ? AND status <> 'cancelled'
            ORDER BY scheduled_date ASC, id ASC
            LIMIT 1
            "#,
            EVENT_COLUMNS
        ))
        .bind(today)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_event).transpose()
    }

    async fn finished_before(&self, today: NaiveDate, limit: i64) -> StorageResult<Vec<Event>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM events
            WHERE scheduled_date IS NOT NULL AND scheduled_date < ?
            ORDER BY scheduled_date DESC, id DESC
            LIMIT ?
            "#,
            EVENT_COLUMNS
        ))
        .bind(today)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_events(&rows)
    }

    async fn count_events(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}
