use crate::types::AuthStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// EventParseError
// ---------------------------------------------------------------------------

/// Typed rejection of a non-conforming event line. A rejected line is
/// dropped with a warning and never mutates session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    #[error("missing ' - ' separator")]
    MissingSeparator,

    #[error("empty method")]
    EmptyMethod,

    #[error("unknown status: {0}")]
    BadStatus(String),
}

// ---------------------------------------------------------------------------
// AuthEvent
// ---------------------------------------------------------------------------

/// A completed authentication attempt reported by any factor engine.
///
/// Wire form is a single line, `"<METHOD> - <STATUS>"`, case-insensitive.
/// The method is free text (`TOUCH`, `VOICE RECOGNITION`, ...) and is
/// normalized to uppercase so the quorum set treats `touch` and `TOUCH` as
/// one factor. Ephemeral: parsed, consumed once, never stored raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEvent {
    pub method: String,
    pub status: AuthStatus,
}

impl AuthEvent {
    pub fn new(method: impl Into<String>, status: AuthStatus) -> Self {
        Self {
            method: method.into().trim().to_ascii_uppercase(),
            status,
        }
    }

    /// Parse one wire line. Splits on the last `" - "` so methods
    /// containing the separator still parse.
    pub fn parse(line: &str) -> Result<Self, EventParseError> {
        let line = line.trim();
        let (method, status) = line
            .rsplit_once(" - ")
            .ok_or(EventParseError::MissingSeparator)?;

        let method = method.trim();
        if method.is_empty() {
            return Err(EventParseError::EmptyMethod);
        }

        let status = match status.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => AuthStatus::Success,
            "FAILURE" => AuthStatus::Failure,
            other => return Err(EventParseError::BadStatus(other.to_string())),
        };

        Ok(Self {
            method: method.to_ascii_uppercase(),
            status,
        })
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.method, self.status)
    }
}

impl std::str::FromStr for AuthEvent {
    type Err = EventParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
