use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::user::{Session, User};
use crate::storage::connection::DbConnection;
use crate::storage::error::StorageResult;
use crate::storage::traits::UserStorage;

/// Repository for console accounts and their sessions
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_user(row: &SqliteRow) -> User {
        User {
            id: row.get("id"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn insert_user(&self, user: &User) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn count_users(&self) -> StorageResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn insert_session(&self, session: &Session) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(&session.expires_at)
        .bind(&session.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> StorageResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at, created_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| Session {
            token: r.get("token"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
            created_at: r.get("created_at"),
        }))
    }

    async fn delete_session(&self, token: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self, now: &str) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
