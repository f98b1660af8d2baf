//! Access control: one configured secret, checked before anything else runs.

use secrecy::{ExposeSecret, SecretString};
use sqlgate_common::error::GatewayError;

/// Validates a caller-supplied credential against the configured secret.
///
/// With no secret configured the gateway runs in open mode and every request
/// is authorized — a deliberate deployment choice, not a recommended default.
/// The comparison is a plain string equality; it is not constant-time.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    token: Option<SecretString>,
}

impl AccessGuard {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }

    /// Open mode: authorize everything.
    pub fn open() -> Self {
        Self { token: None }
    }

    /// Pure boundary check; no side effects.
    pub fn authorize(&self, supplied: Option<&str>) -> Result<(), GatewayError> {
        match &self.token {
            None => Ok(()),
            Some(expected) => match supplied {
                Some(given) if given == expected.expose_secret() => Ok(()),
                _ => Err(GatewayError::unauthorized()),
            },
        }
    }
}
