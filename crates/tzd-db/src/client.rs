//! Database client and connection management

use crate::{DbError, DbResult};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;

/// Database client wrapping a sqlx connection pool
#[derive(Clone)]
pub struct DbClient {
    pool: PgPool,
    station_prefix: String,
}

impl DbClient {
    /// Create a new database client from a connection string
    pub async fn new(database_url: &str) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Create a new database client with custom options
    pub async fn with_options(opts: PgConnectOptions) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(opts)
            .await?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            station_prefix: "M".to_string(),
        }
    }

    /// Only stations whose code starts with `prefix` are listed
    pub fn with_station_prefix(mut self, prefix: impl Into<String>) -> DbResult<Self> {
        let prefix = prefix.into();
        validate_station_prefix(&prefix)?;
        self.station_prefix = prefix;
        Ok(self)
    }

    pub fn station_prefix(&self) -> &str {
        &self.station_prefix
    }

    /// Get reference to underlying pool for direct queries
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Test the database connection
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Reject prefixes that would act as LIKE wildcards
pub fn validate_station_prefix(prefix: &str) -> DbResult<()> {
    if prefix.contains(['%', '_']) {
        return Err(DbError::ConfigError(format!(
            "station prefix must not contain LIKE wildcards: {}",
            prefix
        )));
    }
    Ok(())
}

/// Build PostgreSQL connection options from components
pub struct DbConnectionBuilder {
    host: String,
    port: u16,
    database: String,
    username: String,
    password: Option<String>,
}

impl DbConnectionBuilder {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: database.into(),
            username: "postgres".to_string(),
            password: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn build(self) -> PgConnectOptions {
        let mut opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username);

        if let Some(password) = self.password {
            opts = opts.password(&password);
        }

        opts
    }
}
