use async_trait::async_trait;
use shared::ReferralStatus;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::contains_pattern;
use crate::domain::models::referral::{NewReferral, Referral};
use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::ReferralStorage;

const REFERRAL_SELECT: &str = r#"
    SELECT r.id, r.referrer_id, r.referred_client_id, r.prospect_name, r.prospect_email,
           r.prospect_phone, r.status, r.comments, r.created_at,
           referrer.first_name || ' ' || referrer.last_name AS referrer_name,
           COALESCE(referred.first_name || ' ' || referred.last_name, r.prospect_name, '') AS referred_name
    FROM referrals r
    JOIN clients referrer ON referrer.id = r.referrer_id
    LEFT JOIN clients referred ON referred.id = r.referred_client_id
"#;

/// Repository for referral operations
#[derive(Clone)]
pub struct ReferralRepository {
    db: DbConnection,
}

impl ReferralRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_referral(row: &SqliteRow) -> StorageResult<Referral> {
        let status: String = row.get("status");
        let status = ReferralStatus::parse(&status)
            .ok_or_else(|| StorageError::Database(format!("unknown referral status '{}'", status)))?;

        Ok(Referral {
            id: row.get("id"),
            referrer_id: row.get("referrer_id"),
            referrer_name: row.get("referrer_name"),
            referred_client_id: row.get("referred_client_id"),
            referred_name: row.get("referred_name"),
            prospect_name: row.get("prospect_name"),
            prospect_email: row.get("prospect_email"),
            prospect_phone: row.get("prospect_phone"),
            status,
            comments: row.get("comments"),
            created_at: row.get("created_at"),
        })
    }

    fn rows_to_referrals(rows: &[SqliteRow]) -> StorageResult<Vec<Referral>> {
        rows.iter().map(Self::row_to_referral).collect()
    }
}

#[async_trait]
impl ReferralStorage for ReferralRepository {
    async fn insert_referral(&self, referral: &NewReferral) -> StorageResult<Referral> {
        let result = sqlx::query(
            r#"
            INSERT INTO referrals (referrer_id, referred_client_id, prospect_name, prospect_email,
                                   prospect_phone, comments, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(referral.referrer_id)
        .bind(referral.referred_client_id)
        .bind(&referral.prospect_name)
        .bind(&referral.prospect_email)
        .bind(&referral.prospect_phone)
        .bind(&referral.comments)
        .bind(&referral.created_at)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_referral(id)
            .await?
            .ok_or_else(|| StorageError::Database(format!("referral {} missing after insert", id)))
    }

    async fn get_referral(&self, id: i64) -> StorageResult<Option<Referral>> {
        let row = sqlx::query(&format!("{} WHERE r.id = ?", REFERRAL_SELECT))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_referral).transpose()
    }

    async fn list_referrals(&self) -> StorageResult<Vec<Referral>> {
        let rows = sqlx::query(&format!("{} ORDER BY r.created_at DESC, r.id DESC", REFERRAL_SELECT))
            .fetch_all(self.db.pool())
            .await?;

        Self::rows_to_referrals(&rows)
    }

    async fn search_referrals(&self, query: &str) -> StorageResult<Vec<Referral>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query(&format!(
            r#"{}
            WHERE IFNULL(r.prospect_name, '') LIKE ?1 ESCAPE '\'
               OR referrer.first_name LIKE ?1 ESCAPE '\'
               OR referrer.last_name LIKE ?1 ESCAPE '\'
            ORDER BY r.created_at DESC, r.id DESC
            "#,
            REFERRAL_SELECT
        ))
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_referrals(&rows)
    }

    async fn list_referrals_by_referrer(&self, referrer_id: i64) -> StorageResult<Vec<Referral>> {
        let rows = sqlx::query(&format!(
            "{} WHERE r.referrer_id = ? ORDER BY r.created_at DESC, r.id DESC",
            REFERRAL_SELECT
        ))
        .bind(referrer_id)
        .fetch_all(self.db.pool())
        .await?;

        Self::rows_to_referrals(&rows)
    }

    async fn update_referral(&self, referral: &Referral) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE referrals
            SET status = ?, prospect_email = ?, prospect_phone = ?, comments = ?
            WHERE id = ?
            "#,
        )
        .bind(referral.status.as_str())
        .bind(&referral.prospect_email)
        .bind(&referral.prospect_phone)
        .bind(&referral.comments)
        .bind(referral.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn count_referrals(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM referrals")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}
