//! PostgreSQL backend.
//!
//! Built on `deadpool-postgres`: the pool is configured once from the
//! connection URL and every request checks out a client for its own
//! statement. PostgreSQL has no named placeholders, so `:name` references are
//! rewritten to `$n` ordinals before preparation; values still travel through
//! the binary protocol, never through the statement text.

use async_trait::async_trait;
use deadpool_postgres::{ManagerConfig, Pool, PoolConfig, RecyclingMethod};
use sqlgate_common::error::{ErrorCode, GatewayError};
use sqlgate_common::models::{
    ColumnDescriptor, Row, Scalar, SchemaDescriptor, TableDescriptor,
};
use std::collections::BTreeMap;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

use super::SqlBackend;
use crate::params::number_placeholders;

const CATALOG_QUERY: &str = "SELECT c.table_name, c.column_name, c.data_type, c.is_nullable \
     FROM information_schema.columns c \
     JOIN information_schema.tables t \
       ON t.table_schema = c.table_schema AND t.table_name = c.table_name \
     WHERE c.table_schema = 'public' AND t.table_type = 'BASE TABLE' \
     ORDER BY c.table_name, c.ordinal_position";

#[derive(Debug)]
pub struct PostgresBackend {
    pool: Pool,
}

impl PostgresBackend {
    pub fn new(database_url: &str, pool_size: usize) -> Result<Self, GatewayError> {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(pool_size));

        let pool = cfg
            .create_pool(None, NoTls)
            .map_err(|e| GatewayError::pool(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SqlBackend for PostgresBackend {
    fn dialect(&self) -> &'static str {
        "postgres"
    }

    async fn run(
        &self,
        sql: &str,
        params: &BTreeMap<String, Scalar>,
    ) -> Result<Vec<Row>, GatewayError> {
        let (rewritten, names) = number_placeholders(sql);

        let mut values: Vec<Box<dyn ToSql + Sync + Send>> = Vec::with_capacity(names.len());
        for name in &names {
            let scalar = params.get(name).ok_or_else(|| {
                GatewayError::new(
                    ErrorCode::UnboundParameter,
                    format!("statement references parameter ':{}' but no value was supplied", name),
                )
            })?;
            values.push(scalar_to_param(scalar));
        }
        let bound: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v.as_ref() as &(dyn ToSql + Sync)).collect();

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| GatewayError::pool(e.to_string()))?;

        let rows = client
            .query(rewritten.as_str(), &bound)
            .await
            .map_err(|e| GatewayError::execution(e.to_string()))?;

        rows.iter().map(decode_row).collect()
    }

    async fn describe_schema(&self) -> Result<SchemaDescriptor, GatewayError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| GatewayError::pool(e.to_string()))?;

        let rows = client
            .query(CATALOG_QUERY, &[])
            .await
            .map_err(|e| GatewayError::introspection(e.to_string()))?;

        let mut tables: Vec<TableDescriptor> = Vec::new();
        for row in rows {
            let table: String = row
                .try_get(0)
                .map_err(|e| GatewayError::introspection(e.to_string()))?;
            let column = ColumnDescriptor {
                name: row
                    .try_get(1)
                    .map_err(|e| GatewayError::introspection(e.to_string()))?,
                data_type: row
                    .try_get(2)
                    .map_err(|e| GatewayError::introspection(e.to_string()))?,
                nullable: row
                    .try_get::<_, String>(3)
                    .map_err(|e| GatewayError::introspection(e.to_string()))?
                    == "YES",
            };

            match tables.last_mut() {
                Some(last) if last.name == table => last.columns.push(column),
                _ => tables.push(TableDescriptor {
                    name: table,
                    columns: vec![column],
                }),
            }
        }

        Ok(SchemaDescriptor { tables })
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| GatewayError::pool(e.to_string()))?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map(|_| ())
            .map_err(|e| {
                GatewayError::new(ErrorCode::BackendUnreachable, "backend probe failed")
                    .with_detail(e.to_string())
            })
    }
}

fn scalar_to_param(scalar: &Scalar) -> Box<dyn ToSql + Sync + Send> {
    match scalar {
        Scalar::Null => Box::new(Option::<String>::None),
        Scalar::Bool(b) => Box::new(*b),
        Scalar::Int(i) => Box::new(*i),
        Scalar::Float(f) => Box::new(*f),
        Scalar::Text(t) => Box::new(t.clone()),
        Scalar::Bytes(b) => Box::new(b.clone()),
    }
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Row, GatewayError> {
    let mut entries = Vec::with_capacity(row.len());
    for (idx, col) in row.columns().iter().enumerate() {
        let scalar = match col.type_().name() {
            "bool" => fetch(row.try_get::<_, Option<bool>>(idx))?.map(Scalar::Bool),
            "int2" => fetch(row.try_get::<_, Option<i16>>(idx))?.map(|v| Scalar::Int(v.into())),
            "int4" => fetch(row.try_get::<_, Option<i32>>(idx))?.map(|v| Scalar::Int(v.into())),
            "int8" => fetch(row.try_get::<_, Option<i64>>(idx))?.map(Scalar::Int),
            "float4" => {
                fetch(row.try_get::<_, Option<f32>>(idx))?.map(|v| Scalar::Float(v.into()))
            }
            "float8" => fetch(row.try_get::<_, Option<f64>>(idx))?.map(Scalar::Float),
            "text" | "varchar" | "bpchar" | "name" | "unknown" => {
                fetch(row.try_get::<_, Option<String>>(idx))?.map(Scalar::Text)
            }
            "bytea" => fetch(row.try_get::<_, Option<Vec<u8>>>(idx))?.map(Scalar::Bytes),
            other => {
                return Err(GatewayError::new(
                    ErrorCode::UnsupportedColumnType,
                    format!("column '{}' has unsupported type '{}'", col.name(), other),
                ))
            }
        };
        entries.push((col.name().to_string(), scalar.unwrap_or(Scalar::Null)));
    }
    Ok(Row(entries))
}

fn fetch<T>(result: Result<Option<T>, tokio_postgres::Error>) -> Result<Option<T>, GatewayError> {
    result.map_err(|e| GatewayError::execution(e.to_string()))
}
