//! SQLite backend.
//!
//! `rusqlite` is a synchronous driver, so every statement runs under
//! `tokio::task::spawn_blocking` with a connection checked out of a
//! `deadpool` managed pool — the same pool core the PostgreSQL backend's
//! `deadpool-postgres` is built on.

use async_trait::async_trait;
use deadpool::managed::{self, Metrics, Pool, RecycleResult};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, ToSql};
use sqlgate_common::error::{ErrorCode, GatewayError};
use sqlgate_common::models::{
    ColumnDescriptor, Row, Scalar, SchemaDescriptor, TableDescriptor,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::SqlBackend;

pub struct SqliteManager {
    path: PathBuf,
}

impl managed::Manager for SqliteManager {
    type Type = Connection;
    type Error = rusqlite::Error;

    async fn create(&self) -> Result<Connection, rusqlite::Error> {
        Connection::open(&self.path)
    }

    async fn recycle(
        &self,
        _conn: &mut Connection,
        _metrics: &Metrics,
    ) -> RecycleResult<rusqlite::Error> {
        Ok(())
    }
}

pub struct SqliteBackend {
    pool: Pool<SqliteManager>,
}

impl SqliteBackend {
    pub fn new(path: &str, pool_size: usize) -> Result<Self, GatewayError> {
        let manager = SqliteManager {
            path: PathBuf::from(path),
        };
        let pool = Pool::builder(manager)
            .max_size(pool_size)
            .build()
            .map_err(|e| GatewayError::pool(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SqlBackend for SqliteBackend {
    fn dialect(&self) -> &'static str {
        "sqlite"
    }

    async fn run(
        &self,
        sql: &str,
        params: &BTreeMap<String, Scalar>,
    ) -> Result<Vec<Row>, GatewayError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| GatewayError::pool(e.to_string()))?;
        let sql = sql.to_string();
        let params = params.clone();

        tokio::task::spawn_blocking(move || run_blocking(&conn, &sql, &params))
            .await
            .map_err(|e| GatewayError::execution(e.to_string()))?
    }

    async fn describe_schema(&self) -> Result<SchemaDescriptor, GatewayError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| GatewayError::pool(e.to_string()))?;

        tokio::task::spawn_blocking(move || describe_blocking(&conn))
            .await
            .map_err(|e| GatewayError::introspection(e.to_string()))?
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| GatewayError::pool(e.to_string()))?;

        tokio::task::spawn_blocking(move || {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|e| {
                    GatewayError::new(ErrorCode::BackendUnreachable, "backend probe failed")
                        .with_detail(e.to_string())
                })
        })
        .await
        .map_err(|e| GatewayError::execution(e.to_string()))?
    }
}

fn run_blocking(
    conn: &Connection,
    sql: &str,
    params: &BTreeMap<String, Scalar>,
) -> Result<Vec<Row>, GatewayError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| GatewayError::execution(e.to_string()))?;

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let owned: Vec<(String, Value)> = params
        .iter()
        .map(|(name, value)| (format!(":{name}"), scalar_to_value(value)))
        .collect();
    let bound: Vec<(&str, &dyn ToSql)> = owned
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect();

    let mut rows = stmt
        .query(bound.as_slice())
        .map_err(|e| GatewayError::execution(e.to_string()))?;

    let mut out = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| GatewayError::execution(e.to_string()))?
    {
        let mut entries = Vec::with_capacity(column_names.len());
        for (idx, name) in column_names.iter().enumerate() {
            let value = row
                .get_ref(idx)
                .map_err(|e| GatewayError::execution(e.to_string()))?;
            entries.push((name.clone(), value_ref_to_scalar(name, value)?));
        }
        out.push(Row(entries));
    }
    Ok(out)
}

fn describe_blocking(conn: &Connection) -> Result<SchemaDescriptor, GatewayError> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .map_err(|e| GatewayError::introspection(e.to_string()))?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| GatewayError::introspection(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GatewayError::introspection(e.to_string()))?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        // PRAGMA takes no bound parameters; the identifier is quoted instead.
        let pragma = format!("PRAGMA table_info(\"{}\")", name.replace('"', "\"\""));
        let mut info = conn
            .prepare(&pragma)
            .map_err(|e| GatewayError::introspection(e.to_string()))?;
        let columns = info
            .query_map([], |row| {
                Ok(ColumnDescriptor {
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    nullable: row.get::<_, i64>(3)? == 0,
                })
            })
            .map_err(|e| GatewayError::introspection(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GatewayError::introspection(e.to_string()))?;

        tables.push(TableDescriptor { name, columns });
    }

    Ok(SchemaDescriptor { tables })
}

fn scalar_to_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Integer(*b as i64),
        Scalar::Int(i) => Value::Integer(*i),
        Scalar::Float(f) => Value::Real(*f),
        Scalar::Text(t) => Value::Text(t.clone()),
        Scalar::Bytes(b) => Value::Blob(b.clone()),
    }
}

fn value_ref_to_scalar(column: &str, value: ValueRef<'_>) -> Result<Scalar, GatewayError> {
    match value {
        ValueRef::Null => Ok(Scalar::Null),
        ValueRef::Integer(i) => Ok(Scalar::Int(i)),
        ValueRef::Real(f) => Ok(Scalar::Float(f)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Scalar::Text(s.to_string()))
            .map_err(|_| {
                GatewayError::new(
                    ErrorCode::UnsupportedColumnType,
                    format!("column '{}' holds non-utf8 text", column),
                )
            }),
        ValueRef::Blob(bytes) => Ok(Scalar::Bytes(bytes.to_vec())),
    }
}
