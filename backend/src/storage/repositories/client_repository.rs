use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::contains_pattern;
use crate::domain::models::client::{Client, NewClient};
use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::ClientStorage;

const CLIENT_COLUMNS: &str = "id, first_name, last_name, phone, email, address, comments, \
     visits, accumulated_amount, is_active, created_at, updated_at";

/// Repository for client operations
#[derive(Clone)]
pub struct ClientRepository {
    db: DbConnection,
}

impl ClientRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_client(row: &SqliteRow) -> Client {
        Client {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            phone: row.get("phone"),
            email: row.get("email"),
            address: row.get("address"),
            comments: row.get("comments"),
            visits: row.get("visits"),
            accumulated_amount: row.get("accumulated_amount"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ClientStorage for ClientRepository {
    async fn insert_client(&self, client: &NewClient) -> StorageResult<Client> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (first_name, last_name, phone, email, address, comments, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.comments)
        .bind(&client.created_at)
        .bind(&client.created_at)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_client(id)
            .await?
            .ok_or_else(|| StorageError::Database(format!("client {} missing after insert", id)))
    }

    async fn get_client(&self, id: i64) -> StorageResult<Option<Client>> {
        let row = sqlx::query(&format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(Self::row_to_client))
    }

    async fn list_clients(&self) -> StorageResult<Vec<Client>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM clients ORDER BY created_at DESC, id DESC",
            CLIENT_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_client).collect())
    }

    async fn search_clients(&self, query: &str) -> StorageResult<Vec<Client>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM clients
            WHERE first_name LIKE ?1 ESCAPE '\'
               OR last_name LIKE ?1 ESCAPE '\'
               OR IFNULL(phone, '') LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "#,
            CLIENT_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_client).collect())
    }

    async fn update_client(&self, client: &Client) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE clients
            SET first_name = ?, last_name = ?, phone = ?, email = ?, address = ?, comments = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.comments)
        .bind(&client.updated_at)
        .bind(client.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn set_client_active(&self, id: i64, active: bool, updated_at: &str) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE clients SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(updated_at)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_clients(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn count_clients_with_visits(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE visits > 0")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}
