//! Database Connection Pool Module
//!
//! PostgreSQL access through a deadpool-postgres pool. [`DbClient`] is the
//! production [`RecordStore`] and [`DatasetStore`]; every query projects
//! rows to JSON in SQL so decoding on this side stays uniform.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use gallop_core::{LabelField, RawRecord, Record, StorageError};
use gallop_storage::RecordStore;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio_postgres::NoTls;

use crate::constants::{DEFAULT_DB_POOL_SIZE, DEFAULT_DB_TIMEOUT_SECS};
use crate::error::{ApiError, ApiResult};
use crate::secrets::read_secret;
use crate::traits::DatasetStore;
use crate::types::{TopoLayer, TopojsonRow};

const RECORDS_TABLE: &str = "combined_data";
const MEMBERS_TABLE: &str = "congress_members";
const PROPORTIONS_TABLE: &str = "member_proportions";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait/create/recycle timeout for pooled connections
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "gallop".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: DEFAULT_DB_POOL_SIZE,
            timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// The password is read from `GALLOP_DB_PASSWORD_FILE` when set,
    /// otherwise from `GALLOP_DB_PASSWORD`.
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            host: std::env::var("GALLOP_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("GALLOP_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("GALLOP_DB_NAME").unwrap_or_else(|_| "gallop".to_string()),
            user: std::env::var("GALLOP_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: read_secret("GALLOP_DB_PASSWORD")?.unwrap_or_default(),
            max_size: std::env::var("GALLOP_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_POOL_SIZE),
            timeout: Duration::from_secs(
                std::env::var("GALLOP_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DB_TIMEOUT_SECS),
            ),
        })
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened here; the first checkout connects.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        pool_cfg.timeouts.recycle = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn pool_error(err: PoolError) -> StorageError {
    StorageError::Unavailable {
        reason: err.to_string(),
    }
}

fn query_error(table: &str, err: tokio_postgres::Error) -> StorageError {
    if err.is_closed() {
        return StorageError::Unavailable {
            reason: err.to_string(),
        };
    }
    StorageError::QueryFailed {
        table: table.to_string(),
        reason: err.to_string(),
    }
}

fn decode_error(table: &str, err: tokio_postgres::Error) -> StorageError {
    StorageError::DecodeFailed {
        table: table.to_string(),
        reason: err.to_string(),
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn get_conn(&self) -> Result<deadpool_postgres::Object, StorageError> {
        self.pool.get().await.map_err(pool_error)
    }

    /// Run `SELECT row_to_json(t) FROM <table> t` and collect the objects.
    async fn rows_as_json(&self, table: &str) -> Result<Vec<JsonValue>, StorageError> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT row_to_json(t) FROM {} t", table);
        let rows = conn
            .query(sql.as_str(), &[])
            .await
            .map_err(|e| query_error(table, e))?;

        rows.iter()
            .map(|row| row.try_get::<_, JsonValue>(0).map_err(|e| decode_error(table, e)))
            .collect()
    }
}

// ============================================================================
// RECORD STORE
// ============================================================================

#[async_trait]
impl RecordStore for DbClient {
    async fn fetch_records(&self) -> Result<Vec<Record>, StorageError> {
        let conn = self.get_conn().await?;
        // to_jsonb keeps array columns structured and turns text into a JSON string.
        let rows = conn
            .query(
                "SELECT state, to_jsonb(assigned_label) FROM combined_data",
                &[],
            )
            .await
            .map_err(|e| query_error(RECORDS_TABLE, e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let state: Option<String> = row
                .try_get(0)
                .map_err(|e| decode_error(RECORDS_TABLE, e))?;
            let label: Option<JsonValue> = row
                .try_get(1)
                .map_err(|e| decode_error(RECORDS_TABLE, e))?;

            let field = label.map(LabelField::from_json).unwrap_or(LabelField::Missing);
            records.push(RawRecord::new(state.unwrap_or_default(), field).normalize());
        }

        tracing::debug!(count = records.len(), "Fetched records");
        Ok(records)
    }
}

// ============================================================================
// DATASET STORE
// ============================================================================

#[async_trait]
impl DatasetStore for DbClient {
    async fn congress_members(&self) -> Result<Vec<JsonValue>, StorageError> {
        self.rows_as_json(MEMBERS_TABLE).await
    }

    async fn member_proportions(&self) -> Result<Vec<JsonValue>, StorageError> {
        self.rows_as_json(PROPORTIONS_TABLE).await
    }

    async fn latest_topojson(
        &self,
        layer: TopoLayer,
    ) -> Result<Option<TopojsonRow>, StorageError> {
        let table = layer.table();
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT id::bigint, topojson FROM {} ORDER BY id DESC LIMIT 1",
            table
        );
        let row = conn
            .query_opt(sql.as_str(), &[])
            .await
            .map_err(|e| query_error(table, e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(TopojsonRow {
            id: row.try_get(0).map_err(|e| decode_error(table, e))?,
            topojson: row.try_get(1).map_err(|e| decode_error(table, e))?,
        }))
    }

    async fn insert_topojson(
        &self,
        layer: TopoLayer,
        topojson: JsonValue,
    ) -> Result<TopojsonRow, StorageError> {
        let table = layer.table();
        let conn = self.get_conn().await?;
        let sql = format!(
            "INSERT INTO {} (topojson) VALUES ($1) RETURNING id::bigint, topojson",
            table
        );
        let row = conn
            .query_one(sql.as_str(), &[&topojson])
            .await
            .map_err(|e| query_error(table, e))?;

        let stored = TopojsonRow {
            id: row.try_get(0).map_err(|e| decode_error(table, e))?,
            topojson: row.try_get(1).map_err(|e| decode_error(table, e))?,
        };
        tracing::info!(table, id = stored.id, "Stored TopoJSON");
        Ok(stored)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| query_error("-", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "gallop");
        assert_eq!(config.max_size, DEFAULT_DB_POOL_SIZE);
    }

    #[tokio::test]
    async fn test_create_pool_is_lazy() -> ApiResult<()> {
        // Nothing listens here; building the pool must still succeed.
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let client = DbClient::from_config(&config)?;
        assert_eq!(client.pool_size(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_database_is_unavailable() -> ApiResult<()> {
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let client = DbClient::from_config(&config)?;
        let result = client.fetch_records().await;
        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
        Ok(())
    }
}
