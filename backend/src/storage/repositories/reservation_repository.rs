use async_trait::async_trait;
use shared::ReservationState;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use super::{contains_pattern, EVENT_HAS_OPEN_PLACE};
use crate::domain::models::reservation::{NewReservation, Reservation};
use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::ReservationStorage;

const RESERVATION_SELECT: &str = r#"
    SELECT r.id, r.client_id, r.event_id, r.deposit, r.expected_total, r.state, r.comments,
           r.created_at, r.updated_at,
           c.first_name || ' ' || c.last_name AS client_name,
           e.name AS event_name
    FROM reservations r
    JOIN clients c ON c.id = r.client_id
    JOIN events e ON e.id = r.event_id
"#;

/// Repository for reservation operations
#[derive(Clone)]
pub struct ReservationRepository {
    db: DbConnection,
}

impl ReservationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_reservation(row: &SqliteRow) -> StorageResult<Reservation> {
        let state: String = row.get("state");
        let state = ReservationState::parse(&state)
            .ok_or_else(|| StorageError::Database(format!("unknown reservation state '{}'", state)))?;

        Ok(Reservation {
            id: row.get("id"),
            client_id: row.get("client_id"),
            client_name: row.get("client_name"),
            event_id: row.get("event_id"),
            event_name: row.get("event_name"),
            deposit: row.get("deposit"),
            expected_total: row.get("expected_total"),
            state,
            comments: row.get("comments"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn rows_to_reservations(rows: &[SqliteRow]) -> StorageResult<Vec<Reservation>> {
        rows.iter().map(Self::row_to_reservation).collect()
    }
}

#[async_trait]
impl ReservationStorage for ReservationRepository {
    async fn insert_reservation(&self, reservation: &NewReservation) -> StorageResult<Option<Reservation>> {
        // Capacity check and insert are one statement so concurrent bookings cannot overfill
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO reservations (client_id, event_id, deposit, expected_total, comments, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?
            FROM events
            WHERE events.id = ? AND {}
            "#,
            EVENT_HAS_OPEN_PLACE
        ))
        .bind(reservation.client_id)
        .bind(reservation.event_id)
        .bind(reservation.deposit)
        .bind(reservation.expected_total)
        .bind(&reservation.comments)
        .bind(&reservation.created_at)
        .bind(&reservation.created_at)
        .bind(reservation.event_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            debug!("Event {} has no open place", reservation.event_id);
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        self.get_reservation(id)
            .await?
            .ok_or_else(|| StorageError::Database(format!("reservation {} missing after insert", id)))
            .map(Some)
    }

    async fn get_reservation(&self, id: i64) -> StorageResult<Option<Reservation>> {
        let row = sqlx::query(&format!("{} WHERE r.id = ?", RESERVATION_SELECT))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_reservation).transpose()
    }

    async fn list_reservations(&self) -> StorageResult<Vec<Reservation>> {
        let rows = sqlx::query(&format!("{} ORDER BY r.created_at DESC, r.id DESC", RESERVATION_SELECT))
            .fetch_all(self.db.pool())
            .await?;

        Self::rows_to_reservations(&rows)
    }

    async fn search_reservations(&self, query: &str) -> StorageResult<Vec<Reservation>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query(&format!(
            r#"{}
            WHERE c.first_name LIKE ?1 ESCAPE '\'
               OR c.last_name LIKE ?1 ESCAPE '\'
               OR e.name LIKE ?1 ESCAPE '\'
            ORDER BY r.created_at DESC, r.id DESC
            "#,
            RESERVATION_SELECT
        ))
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_reservations(&rows)
    }

    async fn list_active_reservations_for_event(&self, event_id: i64) -> StorageResult<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            "{} WHERE r.event_id = ? AND r.state = 'reserved' ORDER BY r.created_at DESC, r.id DESC",
            RESERVATION_SELECT
        ))
        .bind(event_id)
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_reservations(&rows)
    }

    async fn transition_reservation(
        &self,
        id: i64,
        from: ReservationState,
        to: ReservationState,
        updated_at: &str,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE reservations SET state = ?, updated_at = ? WHERE id = ? AND state = ?",
        )
        .bind(to.as_str())
        .bind(updated_at)
        .bind(id)
        .bind(from.as_str())
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
