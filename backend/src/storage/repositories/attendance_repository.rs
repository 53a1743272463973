use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;

use super::{contains_pattern, EVENT_HAS_OPEN_PLACE};
use crate::domain::models::attendance::{Attendance, NewAttendance};
use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::AttendanceStorage;

const ATTENDANCE_SELECT: &str = r#"
    SELECT a.id, a.client_id, a.event_id, a.amount_paid, a.reservation_id, a.deposit_amount,
           a.remaining_amount, a.created_at,
           c.first_name || ' ' || c.last_name AS client_name,
           e.name AS event_name
    FROM attendances a
    JOIN clients c ON c.id = a.client_id
    JOIN events e ON e.id = a.event_id
"#;

/// Repository for attendance records and the payment sequence
#[derive(Clone)]
pub struct AttendanceRepository {
    db: DbConnection,
}

impl AttendanceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_attendance(row: &SqliteRow) -> Attendance {
        Attendance {
            id: row.get("id"),
            client_id: row.get("client_id"),
            client_name: row.get("client_name"),
            event_id: row.get("event_id"),
            event_name: row.get("event_name"),
            amount_paid: row.get("amount_paid"),
            reservation_id: row.get("reservation_id"),
            deposit_amount: row.get("deposit_amount"),
            remaining_amount: row.get("remaining_amount"),
            created_at: row.get("created_at"),
        }
    }

    /// Insert the attendance row and bump client and event counters.
    /// Runs inside the caller's transaction.
    async fn apply_payment(tx: &mut Transaction<'_, Sqlite>, payment: &NewAttendance) -> StorageResult<i64> {
        let amount_paid = payment.amount_paid();

        let result = sqlx::query(
            r#"
            INSERT INTO attendances (client_id, event_id, amount_paid, reservation_id,
                                     deposit_amount, remaining_amount, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.client_id)
        .bind(payment.event_id)
        .bind(amount_paid)
        .bind(payment.reservation_id)
        .bind(payment.deposit_amount)
        .bind(payment.remaining_amount)
        .bind(&payment.created_at)
        .execute(&mut **tx)
        .await?;
        let attendance_id = result.last_insert_rowid();

        sqlx::query(
            r#"
            UPDATE clients
            SET visits = visits + 1,
                accumulated_amount = ROUND(accumulated_amount + ?, 2),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(amount_paid)
        .bind(&payment.created_at)
        .bind(payment.client_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE events
            SET attendee_count = attendee_count + 1,
                total_collected = ROUND(total_collected + ?, 2),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(amount_paid)
        .bind(&payment.created_at)
        .bind(payment.event_id)
        .execute(&mut **tx)
        .await?;

        Ok(attendance_id)
    }

    async fn load_after_commit(&self, id: i64) -> StorageResult<Attendance> {
        self.get_attendance(id)
            .await?
            .ok_or_else(|| StorageError::Database(format!("attendance {} missing after insert", id)))
    }
}

#[async_trait]
impl AttendanceStorage for AttendanceRepository {
    async fn get_attendance(&self, id: i64) -> StorageResult<Option<Attendance>> {
        let row = sqlx::query(&format!("{} WHERE a.id = ?", ATTENDANCE_SELECT))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(Self::row_to_attendance))
    }

    async fn list_attendances(&self) -> StorageResult<Vec<Attendance>> {
        let rows = sqlx::query(&format!("{} ORDER BY a.created_at DESC, a.id DESC", ATTENDANCE_SELECT))
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.iter().map(Self::row_to_attendance).collect())
    }

    async fn search_attendances(&self, query: &str) -> StorageResult<Vec<Attendance>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query(&format!(
            r#"{}
            WHERE c.first_name LIKE ?1 ESCAPE '\'
               OR c.last_name LIKE ?1 ESCAPE '\'
               OR e.name LIKE ?1 ESCAPE '\'
            ORDER BY a.created_at DESC, a.id DESC
            "#,
            ATTENDANCE_SELECT
        ))
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_attendance).collect())
    }

    async fn list_attendances_by_event(&self, event_id: i64) -> StorageResult<Vec<Attendance>> {
        let rows = sqlx::query(&format!(
            "{} WHERE a.event_id = ? ORDER BY a.created_at DESC, a.id DESC",
            ATTENDANCE_SELECT
        ))
        .bind(event_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_attendance).collect())
    }

    async fn list_attendances_by_client(&self, client_id: i64) -> StorageResult<Vec<Attendance>> {
        let rows = sqlx::query(&format!(
            "{} WHERE a.client_id = ? ORDER BY a.created_at DESC, a.id DESC",
            ATTENDANCE_SELECT
        ))
        .bind(client_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_attendance).collect())
    }

    async fn confirm_reservation(&self, payment: &NewAttendance) -> StorageResult<Option<Attendance>> {
        let reservation_id = payment.reservation_id.ok_or_else(|| {
            StorageError::Database("confirmation requires a reservation id".to_string())
        })?;

        let mut tx = self.db.pool().begin().await?;

        // Guard on the current state so a concurrent confirm or cancel loses cleanly
        let claimed = sqlx::query(
            r#"
            UPDATE reservations
            SET state = 'confirmed', updated_at = ?
            WHERE id = ? AND state = 'reserved'
            "#,
        )
        .bind(&payment.created_at)
        .bind(reservation_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Reservation {} was not in the reserved state", reservation_id);
            return Ok(None);
        }

        let attendance_id = match Self::apply_payment(&mut tx, payment).await {
            Ok(id) => id,
            Err(err) => {
                tx.rollback().await?;
                return Err(err);
            }
        };
        tx.commit().await?;

        self.load_after_commit(attendance_id).await.map(Some)
    }

    async fn record_walk_in(&self, payment: &NewAttendance) -> StorageResult<Option<Attendance>> {
        let mut tx = self.db.pool().begin().await?;

        // Claim a place first; the write also serializes concurrent walk-ins
        let claimed = sqlx::query(&format!(
            "UPDATE events SET updated_at = ? WHERE id = ? AND {}",
            EVENT_HAS_OPEN_PLACE
        ))
        .bind(&payment.created_at)
        .bind(payment.event_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Event {} has no open place for a walk-in", payment.event_id);
            return Ok(None);
        }

        let attendance_id = match Self::apply_payment(&mut tx, payment).await {
            Ok(id) => id,
            Err(err) => {
                tx.rollback().await?;
                return Err(err);
            }
        };
        tx.commit().await?;

        self.load_after_commit(attendance_id).await.map(Some)
    }

    async fn count_attendances(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM attendances")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn total_revenue(&self) -> StorageResult<f64> {
        let total: f64 = sqlx::query_scalar("SELECT CAST(COALESCE(SUM(amount_paid), 0) AS REAL) FROM attendances")
            .fetch_one(self.db.pool())
            .await?;
        Ok(total)
    }

    async fn client_ids_for_event(&self, event_id: i64) -> StorageResult<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT DISTINCT client_id FROM attendances WHERE event_id = ? ORDER BY client_id",
        )
        .bind(event_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids)
    }

    async fn client_ids_between(&self, from: NaiveDate, to: NaiveDate) -> StorageResult<Vec<i64>> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT DISTINCT client_id FROM attendances
            WHERE substr(created_at, 1, 10) BETWEEN ? AND ?
            ORDER BY client_id
            "#,
        )
        .bind(from.format("%Y-%m-%d").to_string())
        .bind(to.format("%Y-%m-%d").to_string())
        .fetch_all(self.db.pool())
        .await?;
        Ok(ids)
    }
}
