use crate::config::LockConfig;
use crate::event::AuthEvent;
use crate::types::AuthStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Auth log entries kept in memory before the oldest are dropped.
const LOG_CAP: usize = 200;

// ---------------------------------------------------------------------------
// AuthLogEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthLogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub status: AuthStatus,
    pub details: String,
}

// ---------------------------------------------------------------------------
// SessionOutcome
// ---------------------------------------------------------------------------

/// What one observed event did to the quorum session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A new method was verified; quorum not yet reached.
    Recorded { verified: usize },
    /// The method already counted this session; ignored.
    Duplicate,
    /// A failure was logged; verified methods are untouched.
    FailureLogged,
    /// Quorum reached: actuate, session cleared.
    QuorumReached { methods: Vec<String> },
}

// ---------------------------------------------------------------------------
// SessionCoordinator
// ---------------------------------------------------------------------------

/// Accumulates distinct verified methods inside a bounded time window and
/// decides when to actuate.
///
/// Processing is serialized by construction: callers hand events in one at
/// a time (the listener holds a single mutex across observe-then-actuate).
/// Expiry is passive — checked on the next event arrival, with no
/// notification to producers.
#[derive(Debug)]
pub struct SessionCoordinator {
    quorum: usize,
    window_ms: u64,
    verified: BTreeSet<String>,
    started_at: Option<u64>,
    log: Vec<AuthLogEntry>,
    next_log_id: u64,
    unlocks: u64,
}

impl SessionCoordinator {
    pub fn new(quorum: usize, window_ms: u64) -> Self {
        Self {
            quorum: quorum.max(1),
            window_ms,
            verified: BTreeSet::new(),
            started_at: None,
            log: Vec::new(),
            next_log_id: 1,
            unlocks: 0,
        }
    }

    pub fn from_config(config: &LockConfig) -> Self {
        Self::new(config.quorum, config.session_window_ms)
    }

    pub fn verified_count(&self) -> usize {
        self.verified.len()
    }

    pub fn verified_methods(&self) -> Vec<String> {
        self.verified.iter().cloned().collect()
    }

    pub fn session_open(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn log(&self) -> &[AuthLogEntry] {
        &self.log
    }

    pub fn unlock_count(&self) -> u64 {
        self.unlocks
    }

    pub fn success_count(&self) -> usize {
        self.log
            .iter()
            .filter(|e| e.status == AuthStatus::Success)
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.log
            .iter()
            .filter(|e| e.status == AuthStatus::Failure)
            .count()
    }

    /// Feed one well-formed event through the quorum policy.
    ///
    /// Any event opens a session when none is open or the old one expired;
    /// a failure never removes already-verified methods. On quorum the
    /// session is cleared before returning, so the caller can actuate
    /// without re-entering.
    pub fn observe(&mut self, event: &AuthEvent, now_ms: u64) -> SessionOutcome {
        let expired = match self.started_at {
            Some(started) => now_ms.saturating_sub(started) > self.window_ms,
            None => true,
        };
        if expired {
            if !self.verified.is_empty() {
                tracing::info!(
                    dropped = self.verified.len(),
                    "session expired, starting fresh"
                );
            }
            self.verified.clear();
            self.started_at = Some(now_ms);
        }

        match event.status {
            AuthStatus::Failure => {
                tracing::info!(method = %event.method, "authentication failed");
                self.record(event, "attempt failed");
                SessionOutcome::FailureLogged
            }
            AuthStatus::Success => {
                if self.verified.contains(&event.method) {
                    tracing::info!(method = %event.method, "method already used this session");
                    self.record(event, "method already used this session");
                    return SessionOutcome::Duplicate;
                }

                self.verified.insert(event.method.clone());
                tracing::info!(
                    method = %event.method,
                    verified = self.verified.len(),
                    quorum = self.quorum,
                    "factor verified"
                );

                // One log entry per event: the quorum-triggering event
                // carries the unlock decision in its details.
                if self.verified.len() >= self.quorum {
                    let methods: Vec<String> = self.verified.iter().cloned().collect();
                    self.verified.clear();
                    self.started_at = None;
                    self.unlocks += 1;
                    self.record(event, "quorum reached, unlock issued");
                    tracing::info!(methods = ?methods, "quorum reached, unlocking");
                    return SessionOutcome::QuorumReached { methods };
                }

                self.record(event, "factor verified");
                SessionOutcome::Recorded {
                    verified: self.verified.len(),
                }
            }
        }
    }

    fn record(&mut self, event: &AuthEvent, details: &str) {
        self.log.push(AuthLogEntry {
            id: self.next_log_id,
            timestamp: Utc::now(),
            method: event.method.clone(),
            status: event.status,
            details: details.to_string(),
        });
        self.next_log_id += 1;
        if self.log.len() > LOG_CAP {
            let excess = self.log.len() - LOG_CAP;
            self.log.drain(..excess);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
