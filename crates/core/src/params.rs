//! Named-parameter handling.
//!
//! Statements reference parameters as `:name`. The scanner is quote-aware
//! (placeholders inside single- or double-quoted literals are ignored, as is
//! the `::type` cast syntax) so it is shared by the bind check and the
//! PostgreSQL rewrite. Values are always bound through the driver; nothing
//! here ever splices a value into statement text.

use sqlgate_common::error::{ErrorCode, GatewayError};
use sqlgate_common::models::Scalar;
use std::collections::BTreeMap;

/// Rewrite `:name` placeholders to `$1..$n` ordinals and return the distinct
/// parameter names in ordinal order. The same name always maps to the same
/// ordinal, however often it appears.
pub fn number_placeholders(sql: &str) -> (String, Vec<String>) {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if in_single {
            if c == '\'' {
                in_single = false;
            }
            out.push(c);
            i += 1;
            continue;
        }
        if in_double {
            if c == '"' {
                in_double = false;
            }
            out.push(c);
            i += 1;
            continue;
        }
        match c {
            '\'' => {
                in_single = true;
                out.push(c);
                i += 1;
            }
            '"' => {
                in_double = true;
                out.push(c);
                i += 1;
            }
            ':' => {
                // `::` is a cast, not a placeholder
                if i + 1 < bytes.len() && bytes[i + 1] == b':' {
                    out.push_str("::");
                    i += 2;
                    continue;
                }
                let start = i + 1;
                let mut end = start;
                while end < bytes.len()
                    && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                let leads_ident = end > start
                    && (bytes[start].is_ascii_alphabetic() || bytes[start] == b'_');
                if leads_ident {
                    let name = &sql[start..end];
                    let ordinal = match names.iter().position(|n| n == name) {
                        Some(pos) => pos + 1,
                        None => {
                            names.push(name.to_string());
                            names.len()
                        }
                    };
                    out.push('$');
                    out.push_str(&ordinal.to_string());
                    i = end;
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    (out, names)
}

/// Distinct placeholder names in first-appearance order.
pub fn scan_placeholders(sql: &str) -> Vec<String> {
    number_placeholders(sql).1
}

/// Require the parameter map and the statement's placeholders to agree
/// exactly. A placeholder with no value would otherwise run unfiltered; a
/// value with no placeholder is a caller mistake worth naming.
pub fn bind_check(sql: &str, params: &BTreeMap<String, Scalar>) -> Result<(), GatewayError> {
    let referenced = scan_placeholders(sql);

    for name in &referenced {
        if !params.contains_key(name) {
            return Err(GatewayError::new(
                ErrorCode::UnboundParameter,
                format!("statement references parameter ':{}' but no value was supplied", name),
            ));
        }
    }
    for name in params.keys() {
        if !referenced.iter().any(|r| r == name) {
            return Err(GatewayError::new(
                ErrorCode::UnboundParameter,
                format!("parameter '{}' is not referenced by the statement", name),
            ));
        }
    }
    Ok(())
}
