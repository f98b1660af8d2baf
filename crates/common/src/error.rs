//! Unified error type for gateway operations.
//!
//! Every failure the gateway reports carries a stable numeric code
//! (SQLGATE-XXXX) so callers can distinguish "you are not authorized" from
//! "your query is unsafe" from "the backend failed" without parsing message
//! text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following the SQLGATE-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Connection/pool errors
/// - **2000-2999**: Query errors (rejections and execution failures)
/// - **3000-3999**: Configuration errors
/// - **4000-4999**: Authorization errors
/// - **5000-5999**: Introspection/internal errors
///
/// Codes are stable across versions (semver contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Connection Errors (1000-1999) ===
    /// SQLGATE-1001: No connection could be checked out of the pool
    PoolUnavailable = 1001,
    /// SQLGATE-1002: Backend is unreachable or refused the connection
    BackendUnreachable = 1002,

    // === Query Errors (2000-2999) ===
    /// SQLGATE-2001: More than one statement in the request
    RejectedMultiStatement = 2001,
    /// SQLGATE-2002: Statement does not begin with an allowed keyword
    RejectedPrefix = 2002,
    /// SQLGATE-2003: Statement contains a banned keyword
    RejectedKeyword = 2003,
    /// SQLGATE-2004: Backend rejected the statement at execution time
    ExecutionFailed = 2004,
    /// SQLGATE-2005: Named parameter missing from, or unreferenced by, the statement
    UnboundParameter = 2005,
    /// SQLGATE-2006: Result column type has no scalar mapping
    UnsupportedColumnType = 2006,

    // === Configuration Errors (3000-3999) ===
    /// SQLGATE-3001: Invalid configuration value
    InvalidConfig = 3001,

    // === Auth Errors (4000-4999) ===
    /// SQLGATE-4001: Missing or incorrect access token
    Unauthorized = 4001,

    // === Introspection/Internal Errors (5000-5999) ===
    /// SQLGATE-5001: Schema introspection failed
    IntrospectionFailed = 5001,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "SQLGATE-2001")
    pub fn as_str(&self) -> String {
        format!("SQLGATE-{:04}", self.as_u16())
    }

    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Connection,
            2001..=2003 => ErrorCategory::Rejection,
            2000..=2999 => ErrorCategory::Query,
            3000..=3999 => ErrorCategory::Config,
            4000..=4999 => ErrorCategory::Auth,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("SQLGATE-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::PoolUnavailable),
            1002 => Ok(Self::BackendUnreachable),
            2001 => Ok(Self::RejectedMultiStatement),
            2002 => Ok(Self::RejectedPrefix),
            2003 => Ok(Self::RejectedKeyword),
            2004 => Ok(Self::ExecutionFailed),
            2005 => Ok(Self::UnboundParameter),
            2006 => Ok(Self::UnsupportedColumnType),
            3001 => Ok(Self::InvalidConfig),
            4001 => Ok(Self::Unauthorized),
            5001 => Ok(Self::IntrospectionFailed),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category, used by the HTTP layer for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Connection,
    /// Classification rejections: terminal but user-correctable.
    Rejection,
    Query,
    Config,
    Auth,
    Internal,
}

/// The unified error type for all gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Numeric error code (e.g., "SQLGATE-2003")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Backend or rule detail, carried verbatim when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl GatewayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, "missing or invalid access token")
    }

    pub fn execution(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExecutionFailed, "statement execution failed").with_detail(detail)
    }

    pub fn introspection(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::IntrospectionFailed, "schema introspection failed")
            .with_detail(detail)
    }

    pub fn pool(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::PoolUnavailable, "connection pool unavailable").with_detail(detail)
    }

    pub fn is_rejection(&self) -> bool {
        self.code.category() == ErrorCategory::Rejection
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for GatewayError {}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_formatting() {
        assert_eq!(ErrorCode::PoolUnavailable.as_str(), "SQLGATE-1001");
        assert_eq!(ErrorCode::RejectedKeyword.as_str(), "SQLGATE-2003");
        assert_eq!(ErrorCode::Unauthorized.as_str(), "SQLGATE-4001");
    }

    #[test]
    fn test_error_code_parsing() {
        assert_eq!(
            ErrorCode::try_from("SQLGATE-2001".to_string()).unwrap(),
            ErrorCode::RejectedMultiStatement
        );
        assert!(ErrorCode::try_from("SQLGATE-0000".to_string()).is_err());
        assert!(ErrorCode::try_from("INVALID".to_string()).is_err());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ErrorCode::PoolUnavailable.category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            ErrorCode::RejectedKeyword.category(),
            ErrorCategory::Rejection
        );
        assert_eq!(ErrorCode::ExecutionFailed.category(), ErrorCategory::Query);
        assert_eq!(ErrorCode::Unauthorized.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::IntrospectionFailed.category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_display_with_detail() {
        let err = GatewayError::execution("no such table: widgets");
        assert_eq!(
            err.to_string(),
            "[SQLGATE-2004] statement execution failed: no such table: widgets"
        );
    }

    #[test]
    fn test_json_output() {
        let err = GatewayError::unauthorized();
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"SQLGATE-4001\""));
        assert!(!json.contains("detail"));
    }

    #[test]
    fn test_rejection_predicate() {
        assert!(GatewayError::new(ErrorCode::RejectedPrefix, "x").is_rejection());
        assert!(!GatewayError::execution("boom").is_rejection());
    }
}
