//! The gateway facade: every request crosses the same boundary in the same
//! order — authorize, classify, bound, bind-check, execute.

use sqlgate_common::error::{ErrorCode, GatewayError};
use sqlgate_common::models::{ResultSet, Scalar, SchemaDescriptor};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::authz::AccessGuard;
use crate::backend::SqlBackend;
use crate::classify::{classify, Classification, RejectReason};
use crate::limit::enforce_limit;
use crate::params::bind_check;

pub struct Gateway {
    guard: AccessGuard,
    backend: Arc<dyn SqlBackend>,
    default_limit: usize,
}

impl Gateway {
    pub fn new(guard: AccessGuard, backend: Arc<dyn SqlBackend>, default_limit: usize) -> Self {
        Self {
            guard,
            backend,
            default_limit,
        }
    }

    pub fn dialect(&self) -> &'static str {
        self.backend.dialect()
    }

    /// Liveness probe: a no-op query against the backend.
    pub async fn health(&self) -> Result<(), GatewayError> {
        self.backend.ping().await
    }

    /// Enumerate the backend catalog. Guarded like the query path; never
    /// executes caller-supplied text.
    pub async fn describe_schema(
        &self,
        credential: Option<&str>,
    ) -> Result<SchemaDescriptor, GatewayError> {
        self.guard.authorize(credential)?;
        self.backend.describe_schema().await
    }

    /// Execute one read-only statement.
    ///
    /// The invariant lives here: no statement text reaches the backend
    /// without passing the guard and receiving an `Allowed` classification
    /// first, and a rejected statement never acquires a connection.
    pub async fn run_query(
        &self,
        credential: Option<&str>,
        sql: &str,
        params: &BTreeMap<String, Scalar>,
    ) -> Result<ResultSet, GatewayError> {
        self.guard.authorize(credential)?;

        if let Classification::Rejected(reason) = classify(sql) {
            tracing::debug!(reason = ?reason, "statement rejected");
            return Err(rejection_error(reason));
        }

        let plan = enforce_limit(sql, self.default_limit);
        bind_check(&plan.sql, params)?;

        let rows = self.backend.run(&plan.sql, params).await?;
        Ok(ResultSet {
            row_count: rows.len(),
            rows,
            dialect: self.backend.dialect().to_string(),
            limit_injected: plan.limit_injected,
        })
    }
}

fn rejection_error(reason: RejectReason) -> GatewayError {
    let code = match reason {
        RejectReason::MultiStatement => ErrorCode::RejectedMultiStatement,
        RejectReason::DisallowedPrefix => ErrorCode::RejectedPrefix,
        RejectReason::BannedKeyword(_) => ErrorCode::RejectedKeyword,
    };
    GatewayError::new(code, "statement rejected by read-only policy").with_detail(reason.describe())
}
