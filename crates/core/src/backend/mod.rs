//! Pooled execution backends.
//!
//! Each backend owns one connection pool, created at startup and shared by
//! every request. A request checks out a single connection for the duration
//! of its own execute-and-materialize step and releases it (also on error)
//! before the handler returns. There are no cross-request transactions and no
//! held cursors.

pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;
use sqlgate_common::error::GatewayError;
use sqlgate_common::models::{Row, Scalar, SchemaDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Backend dialect name, reported in every result set.
    fn dialect(&self) -> &'static str;

    /// Execute one already-classified statement with named parameters bound
    /// through the driver, and materialize the full result.
    async fn run(
        &self,
        sql: &str,
        params: &BTreeMap<String, Scalar>,
    ) -> Result<Vec<Row>, GatewayError>;

    /// Enumerate tables and columns from the backend catalog. Never executes
    /// caller-supplied text.
    async fn describe_schema(&self) -> Result<SchemaDescriptor, GatewayError>;

    /// Minimal connectivity probe (`SELECT 1`).
    async fn ping(&self) -> Result<(), GatewayError>;
}

/// Build the backend named by the connection URL. Pools are created here,
/// once; no connection is opened until the first request needs one.
pub fn connect(database_url: &str, pool_size: usize) -> Result<Arc<dyn SqlBackend>, GatewayError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok(Arc::new(postgres::PostgresBackend::new(
            database_url,
            pool_size,
        )?))
    } else {
        let path = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);
        Ok(Arc::new(sqlite::SqliteBackend::new(path, pool_size)?))
    }
}
