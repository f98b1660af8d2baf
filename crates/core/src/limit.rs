//! Row-count bounding for classified statements.

use once_cell::sync::Lazy;
use regex::Regex;

static EXISTING_BOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:limit|top)\s+\d+\b").unwrap());

/// A statement ready for execution, after limit enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub sql: String,
    pub limit_injected: bool,
}

/// Guarantee the statement returns at most `default_limit` rows.
///
/// A statement that already carries a `LIMIT n` or `TOP n` clause passes
/// through unchanged. Anything else is wrapped as a named subquery with the
/// cap applied outside, which reads identically on every supported backend.
///
/// This runs only on statements that already passed classification; it makes
/// no safety judgement of its own.
pub fn enforce_limit(sql: &str, default_limit: usize) -> QueryPlan {
    if EXISTING_BOUND.is_match(sql) {
        return QueryPlan {
            sql: sql.to_string(),
            limit_injected: false,
        };
    }

    // The classifier accepts one trailing semicolon; it cannot survive inside
    // the wrapping subquery.
    let inner = sql.trim().trim_end_matches(';').trim_end();
    QueryPlan {
        sql: format!("SELECT * FROM ({inner}) AS bounded_rows LIMIT {default_limit}"),
        limit_injected: true,
    }
}
