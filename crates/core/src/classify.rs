//! Read-only statement classification.
//!
//! ### WARNING
//! This is a regex-based policy, not a SQL parser. Comment stripping does not
//! understand comment-like sequences inside string literals, and the keyword
//! scan runs over the stripped, lowered text. The failure mode is
//! over-rejection (a literal containing `--` or a banned word), never
//! under-rejection. Tokenizing instead of regex-scanning is the known
//! improvement.

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"--[^\r\n]*").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static ALLOWED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:with|select|explain|show|describe|pragma)\b").unwrap());

static BANNED_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(insert|update|delete|drop|truncate|alter|replace|grant|revoke|attach|vacuum)\b")
        .unwrap()
});

// `create` is handled apart from the deny-set: the word after it decides.
// The regex crate has no lookahead, so the follower is captured instead.
static CREATE_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcreate\b(?:\s+(\w+))?").unwrap());

/// Why a statement was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A semicolon separates two statements.
    MultiStatement,
    /// The statement does not begin with an allowed read keyword.
    DisallowedPrefix,
    /// A write/DDL keyword appears somewhere in the statement.
    BannedKeyword(String),
}

impl RejectReason {
    pub fn describe(&self) -> String {
        match self {
            RejectReason::MultiStatement => {
                "only a single statement is permitted per request".to_string()
            }
            RejectReason::DisallowedPrefix => {
                "statement must begin with one of: with, select, explain, show, describe, pragma"
                    .to_string()
            }
            RejectReason::BannedKeyword(word) => {
                format!("statement contains banned keyword '{}'", word)
            }
        }
    }
}

/// The outcome of classifying one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Allowed,
    Rejected(RejectReason),
}

/// Decide whether `sql` is a single, read-only statement safe to execute.
///
/// Pure and idempotent: the same text always yields the same verdict.
/// Unrecognized or ambiguous syntax is rejected, never allowed through.
pub fn classify(sql: &str) -> Classification {
    let stripped = strip_comments(sql);
    let normalized = WHITESPACE
        .replace_all(stripped.trim(), " ")
        .to_lowercase();

    if normalized.is_empty() {
        return Classification::Rejected(RejectReason::DisallowedPrefix);
    }

    // One trailing semicolon is legal; any other semicolon means a second
    // statement follows.
    let body = normalized
        .strip_suffix(';')
        .map(str::trim_end)
        .unwrap_or(&normalized);
    if body.contains(';') {
        return Classification::Rejected(RejectReason::MultiStatement);
    }

    // The deny-set is checked before the prefix so a bare write statement
    // reports the keyword that condemned it, not just the wrong prefix.
    if let Some(found) = BANNED_KEYWORD.find(body) {
        return Classification::Rejected(RejectReason::BannedKeyword(found.as_str().to_string()));
    }

    for caps in CREATE_KEYWORD.captures_iter(body) {
        let follower = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if !follower.starts_with("temp") {
            return Classification::Rejected(RejectReason::BannedKeyword("create".to_string()));
        }
    }

    if !ALLOWED_PREFIX.is_match(body) {
        return Classification::Rejected(RejectReason::DisallowedPrefix);
    }

    Classification::Allowed
}

fn strip_comments(sql: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(sql, " ");
    LINE_COMMENT.replace_all(&without_blocks, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject_reason(sql: &str) -> RejectReason {
        match classify(sql) {
            Classification::Rejected(reason) => reason,
            Classification::Allowed => panic!("expected rejection for {:?}", sql),
        }
    }

    #[test]
    fn test_allows_plain_select() {
        assert_eq!(classify("SELECT * FROM customers"), Classification::Allowed);
    }

    #[test]
    fn test_allows_each_prefix() {
        for sql in [
            "WITH t AS (SELECT 1) SELECT * FROM t",
            "select 1",
            "EXPLAIN SELECT 1",
            "SHOW TABLES",
            "DESCRIBE customers",
            "PRAGMA table_info(customers)",
        ] {
            assert_eq!(classify(sql), Classification::Allowed, "{}", sql);
        }
    }

    #[test]
    fn test_allows_single_trailing_semicolon() {
        assert_eq!(classify("select 1;"), Classification::Allowed);
        assert_eq!(classify("select 1;   "), Classification::Allowed);
    }

    #[test]
    fn test_rejects_multi_statement() {
        assert_eq!(reject_reason("select 1; select 2"), RejectReason::MultiStatement);
        assert_eq!(reject_reason("select 1;;"), RejectReason::MultiStatement);
        assert_eq!(
            reject_reason("select 1; drop table t"),
            RejectReason::MultiStatement
        );
    }

    #[test]
    fn test_rejects_disallowed_prefix() {
        for sql in ["begin", "call proc()", "set search_path to x", "", "   "] {
            assert_eq!(reject_reason(sql), RejectReason::DisallowedPrefix, "{}", sql);
        }
    }

    #[test]
    fn test_bare_write_statement_names_the_keyword() {
        assert_eq!(
            reject_reason("DROP TABLE customers"),
            RejectReason::BannedKeyword("drop".to_string())
        );
        assert_eq!(
            reject_reason("insert into t values (1)"),
            RejectReason::BannedKeyword("insert".to_string())
        );
    }

    #[test]
    fn test_rejects_banned_keywords_anywhere() {
        for (sql, word) in [
            ("select * from t where exists (delete from u)", "delete"),
            ("select 1 union select 2 from t order by (insert)", "insert"),
            ("explain update t set a = 1", "update"),
            ("with w as (select 1) select * from w, old_vacuum_log where vacuum", "vacuum"),
            ("select * from t attach database 'x' as y", "attach"),
        ] {
            assert_eq!(
                reject_reason(sql),
                RejectReason::BannedKeyword(word.to_string()),
                "{}",
                sql
            );
        }
    }

    #[test]
    fn test_banned_keywords_are_whole_words() {
        // Identifiers merely containing a banned keyword must pass.
        assert_eq!(
            classify("select updated_at, dropped, reinsert FROM audit_log"),
            Classification::Allowed
        );
        assert_eq!(
            classify("select * from delete_requests_view"),
            Classification::Allowed
        );
    }

    #[test]
    fn test_create_rejected_unless_temp() {
        assert_eq!(
            reject_reason("select 1 from (create table t (a int))"),
            RejectReason::BannedKeyword("create".to_string())
        );
        // `create temp` and `create temporary` are explicitly permitted
        assert_eq!(
            classify("with x as (select 1) select * from x where 'create temp table' <> ''"),
            Classification::Allowed
        );
        assert_eq!(
            classify("select 'create temporary view allowed'"),
            Classification::Allowed
        );
    }

    #[test]
    fn test_comments_are_stripped_before_checks() {
        // A banned word hidden in a comment does not poison the verdict...
        assert_eq!(
            classify("select 1 /* drop table t */"),
            Classification::Allowed
        );
        assert_eq!(classify("select 1 -- drop table t"), Classification::Allowed);
        // ...and a comment cannot hide a real second statement.
        assert_eq!(
            reject_reason("select 1; /* x */ select 2"),
            RejectReason::MultiStatement
        );
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(
            reject_reason("  DROP   TABLE customers  "),
            RejectReason::BannedKeyword("drop".to_string())
        );
        assert_eq!(
            reject_reason("select * from t where x in (SELECT y FROM u); DELETE from t"),
            RejectReason::MultiStatement
        );
        assert_eq!(
            reject_reason("SeLeCt * FROM t UNION ALL sElEcT * FROM u WHERE GRANT"),
            RejectReason::BannedKeyword("grant".to_string())
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let sql = "select 1; select 2";
        assert_eq!(classify(sql), classify(sql));
        let sql = "select * from customers";
        assert_eq!(classify(sql), classify(sql));
    }

    #[test]
    fn test_known_limitation_keywords_inside_string_literals() {
        // The strip is blind to string literals. A literal that looks like a
        // comment loses its tail; a literal naming a banned keyword is
        // over-rejected. Both stay on the conservative side of the policy.
        assert_eq!(
            classify("select * from t where note = '-- drop table t'"),
            Classification::Allowed
        );
        assert_eq!(
            reject_reason("select * from t where note = 'please drop me a line'"),
            RejectReason::BannedKeyword("drop".to_string())
        );
    }
}
