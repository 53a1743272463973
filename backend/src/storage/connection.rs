use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

/// DbConnection owns the shared SQLite pool and the schema bootstrap
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if missing) the database at `url` and apply the schema
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize an isolated in-memory database for tests.
    ///
    /// A single connection that never expires keeps the in-memory database
    /// alive for the lifetime of the pool.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Clients
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                phone TEXT,
                email TEXT,
                address TEXT,
                comments TEXT,
                visits INTEGER NOT NULL DEFAULT 0,
                accumulated_amount REAL NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CONSTRAINT chk_clients_counters CHECK (visits >= 0 AND accumulated_amount >= 0)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Events
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                scheduled_date TEXT,
                capacity INTEGER,
                expense REAL NOT NULL DEFAULT 0,
                total_collected REAL NOT NULL DEFAULT 0,
                attendee_count INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'scheduled',
                comments TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CONSTRAINT chk_events_expense CHECK (expense >= 0 AND expense <= 999999.99),
                CONSTRAINT chk_events_capacity CHECK (capacity IS NULL OR capacity > 0),
                CONSTRAINT chk_events_status CHECK (status IN ('scheduled', 'completed', 'cancelled'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Referrals
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS referrals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                referrer_id INTEGER NOT NULL REFERENCES clients(id),
                referred_client_id INTEGER REFERENCES clients(id),
                prospect_name TEXT,
                prospect_email TEXT,
                prospect_phone TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                comments TEXT,
                created_at TEXT NOT NULL,
                CONSTRAINT chk_referrals_self CHECK (referred_client_id IS NULL OR referred_client_id <> referrer_id),
                CONSTRAINT chk_referrals_target CHECK (referred_client_id IS NOT NULL OR prospect_name IS NOT NULL),
                CONSTRAINT chk_referrals_status CHECK (status IN ('pending', 'contacted', 'converted', 'rejected'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        // A referrer can introduce a given client only once. NULL referred
        // clients (free-text prospects) are distinct under SQLite semantics.
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_referrals_pair
            ON referrals(referrer_id, referred_client_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Reservations
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                event_id INTEGER NOT NULL REFERENCES events(id),
                deposit REAL NOT NULL,
                expected_total REAL NOT NULL,
                state TEXT NOT NULL DEFAULT 'reserved',
                comments TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CONSTRAINT chk_reservations_amounts CHECK (deposit > 0 AND expected_total > 0 AND expected_total >= deposit),
                CONSTRAINT chk_reservations_state CHECK (state IN ('reserved', 'confirmed', 'cancelled'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Only one live reservation per client and event
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_reservations_active
            ON reservations(client_id, event_id)
            WHERE state = 'reserved';
            "#,
        )
        .execute(pool)
        .await?;

        // Attendance
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendances (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL REFERENCES clients(id),
                event_id INTEGER NOT NULL REFERENCES events(id),
                amount_paid REAL NOT NULL,
                reservation_id INTEGER REFERENCES reservations(id),
                deposit_amount REAL NOT NULL DEFAULT 0,
                remaining_amount REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                CONSTRAINT chk_attendances_amounts CHECK (amount_paid > 0 AND deposit_amount >= 0 AND remaining_amount >= 0)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_attendances_client_event
            ON attendances(client_id, event_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Create indexes for ordering by created_at
        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_clients_created_at ON clients(created_at DESC);",
            "CREATE INDEX IF NOT EXISTS idx_events_created_at ON events(created_at DESC);",
            "CREATE INDEX IF NOT EXISTS idx_events_scheduled_date ON events(scheduled_date);",
            "CREATE INDEX IF NOT EXISTS idx_attendances_created_at ON attendances(created_at DESC);",
        ] {
            sqlx::query(statement).execute(pool).await?;
        }

        // Users and sessions
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = DbConnection::init_test().await.unwrap();
        DbConnection::setup_schema(db.pool()).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec!["attendances", "clients", "events", "referrals", "reservations", "sessions", "users"]
        );
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("colibri.db").display());

        let db = DbConnection::new(&url).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(dir.path().join("colibri.db").exists());
    }
}
