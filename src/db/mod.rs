//! Persistence boundary.
//!
//! The store traits in [`repository`] define every durable operation the
//! services need; [`postgres`] implements them over a pooled sqlx
//! connection and [`memory`] implements them in process for tests and
//! embedded use. [`schema`] carries the embedded DDL, including the
//! database-native guards (non-negative balance check, composite unique
//! enrollment constraint, withdrawal status check).

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod schema;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::{
    MemoryEnrollmentStore, MemoryLedgerStore, MemoryRoomStore, MemoryWithdrawalStore,
};
pub use postgres::{PgEnrollmentStore, PgLedgerStore, PgRoomStore, PgWithdrawalStore};
pub use repository::{EnrollmentStore, LedgerStore, RoomStore, WithdrawalStore};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use coinroom::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     db.apply_schema().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema (idempotent)
    pub async fn apply_schema(&self) -> Result<(), sqlx::Error> {
        schema::apply(&self.pool).await
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
