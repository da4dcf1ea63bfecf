pub mod models;
pub mod users;
pub mod reports;

pub use models::{NewReport, PublicUser, Report, ReportRow, ReportStatus, ReportType, Role, User};
pub use users::{NewUser, UserRepository};
pub use reports::{ReportFilter, ReportRepository, ReportScope, SEARCH_LIMIT};

use std::str::FromStr;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::error::AppError;

/// Owned handle to the SQLite store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        // Every connection to `:memory:` is a separate database, so keep
        // exactly one alive for the pool's lifetime.
        let in_memory = config.database_url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { config.db_max_connections.max(1) };

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(config.db_min_connections.min(max_connections))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout((!in_memory).then(|| Duration::from_secs(600)))
            .max_lifetime((!in_memory).then(|| Duration::from_secs(1800)))
            .connect_with(options)
            .await?;

        Ok(Database { pool })
    }

    /// Fresh migrated in-memory store.
    pub async fn in_memory() -> Result<Self, AppError> {
        let db = Self::connect(&Config::default()).await?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Waits for in-flight queries, then closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// ISO-8601 UTC with millisecond precision. Fixed width, so string order is
/// time order.
pub fn now_iso() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_shape() {
        let now = now_iso();
        assert_eq!(now.len(), 24);
        assert!(now.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[tokio::test]
    async fn test_close_rejects_new_queries() {
        let db = Database::in_memory().await.unwrap();
        db.close().await;
        assert!(db.pool().is_closed());
        assert!(UserRepository::get_by_id(db.pool(), 1).await.is_err());
    }
}
