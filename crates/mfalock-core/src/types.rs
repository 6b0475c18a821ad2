use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StepAction
// ---------------------------------------------------------------------------

/// One gesture primitive in a pattern template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Tap,
    Hold,
}

impl StepAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StepAction::Tap => "tap",
            StepAction::Hold => "hold",
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepAction {
    type Err = crate::error::LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tap" => Ok(StepAction::Tap),
            "hold" => Ok(StepAction::Hold),
            _ => Err(crate::error::LockError::InvalidAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthStatus
// ---------------------------------------------------------------------------

/// Outcome of a completed authentication attempt by one factor engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Success,
    Failure,
}

impl AuthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthStatus::Success => "SUCCESS",
            AuthStatus::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthStatus {
    type Err = crate::error::LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(AuthStatus::Success),
            "FAILURE" => Ok(AuthStatus::Failure),
            _ => Err(crate::error::LockError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SensorMode
// ---------------------------------------------------------------------------

/// Which sensor currently owns the active input. Exactly one value at any
/// instant, owned by the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    Idle,
    Touch,
    Rotary,
}

impl SensorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SensorMode::Idle => "idle",
            SensorMode::Touch => "touch",
            SensorMode::Rotary => "rotary",
        }
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
