use crate::error::Result;
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// LockConfig
// ---------------------------------------------------------------------------

/// All externally settable tunables for the authentication core, the
/// listener, and the actuator. Stored at `<root>/.mfalock/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Delay-and-reread window for touch edge confirmation.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum time between taps; the inter-step timeout is twice this.
    #[serde(default = "default_max_tap_interval_ms")]
    pub max_tap_interval_ms: u64,
    /// Minimum press duration for a hold step in the default template.
    #[serde(default = "default_min_hold_ms")]
    pub min_hold_ms: u64,
    /// Smoothed-angle change (degrees) required to report while rotary is
    /// active.
    #[serde(default = "default_rotary_report_threshold")]
    pub rotary_report_threshold: u16,
    /// Angle change required to claim the rotary sensor from idle. Must be
    /// strictly larger than the report threshold or idle jitter causes
    /// false claims.
    #[serde(default = "default_rotary_activation_threshold")]
    pub rotary_activation_threshold: u16,
    /// Moving-average window over raw ADC samples.
    #[serde(default = "default_rotary_buffer_size")]
    pub rotary_buffer_size: usize,
    /// No qualifying activity for this long forces the arbiter back to idle.
    #[serde(default = "default_inactivity_timeout_ms")]
    pub inactivity_timeout_ms: u64,
    /// Distinct verified methods required before actuation.
    #[serde(default = "default_quorum")]
    pub quorum: usize,
    /// How long a session accumulates verified methods.
    #[serde(default = "default_session_window_ms")]
    pub session_window_ms: u64,
    /// Delay between the unlock and lock commands.
    #[serde(default = "default_unlock_to_lock_delay_ms")]
    pub unlock_to_lock_delay_ms: u64,
    /// Address the auth event listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Peer IPs allowed to submit events. Empty allows all.
    #[serde(default)]
    pub allowed_peers: Vec<String>,
    /// Bridge command (argv) the actuator writes `unlock`/`lock` to.
    /// Empty means log-only: decisions are recorded but nothing is driven.
    #[serde(default)]
    pub actuator_command: Vec<String>,
    /// Bounded wait for the echoed command confirmation.
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_max_tap_interval_ms() -> u64 {
    500
}

fn default_min_hold_ms() -> u64 {
    1000
}

fn default_rotary_report_threshold() -> u16 {
    5
}

fn default_rotary_activation_threshold() -> u16 {
    10
}

fn default_rotary_buffer_size() -> usize {
    10
}

fn default_inactivity_timeout_ms() -> u64 {
    5000
}

fn default_quorum() -> usize {
    2
}

fn default_session_window_ms() -> u64 {
    30_000
}

fn default_unlock_to_lock_delay_ms() -> u64 {
    3000
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_ack_timeout_ms() -> u64 {
    5000
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_tap_interval_ms: default_max_tap_interval_ms(),
            min_hold_ms: default_min_hold_ms(),
            rotary_report_threshold: default_rotary_report_threshold(),
            rotary_activation_threshold: default_rotary_activation_threshold(),
            rotary_buffer_size: default_rotary_buffer_size(),
            inactivity_timeout_ms: default_inactivity_timeout_ms(),
            quorum: default_quorum(),
            session_window_ms: default_session_window_ms(),
            unlock_to_lock_delay_ms: default_unlock_to_lock_delay_ms(),
            listen_addr: default_listen_addr(),
            allowed_peers: Vec::new(),
            actuator_command: Vec::new(),
            ack_timeout_ms: default_ack_timeout_ms(),
        }
    }
}

impl LockConfig {
    /// Load the config file under `root`, or error if `init` hasn't run.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(crate::error::LockError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: LockConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Load the config file if present, falling back to defaults. A missing
    /// file is routine (fresh device); log-only.
    pub fn load_or_default(root: &Path) -> Self {
        match Self::load(root) {
            Ok(config) => config,
            Err(e) => {
                tracing::info!("no config loaded ({e}); using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Sanity-check the tunables. Errors describe configurations that break
    /// an invariant; warnings describe values that are likely mistakes.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.rotary_activation_threshold <= self.rotary_report_threshold {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "rotary_activation_threshold ({}) must be greater than rotary_report_threshold ({}): idle jitter would claim the rotary sensor",
                    self.rotary_activation_threshold, self.rotary_report_threshold
                ),
            });
        }
        if self.quorum == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "quorum must be at least 1".to_string(),
            });
        }
        if self.rotary_buffer_size == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "rotary_buffer_size must be at least 1".to_string(),
            });
        }
        if self.session_window_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "session_window_ms must be nonzero".to_string(),
            });
        }
        if self.debounce_ms < 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "debounce_ms ({}) is very small; transient noise may register as edges",
                    self.debounce_ms
                ),
            });
        }
        if self.inactivity_timeout_ms < self.max_tap_interval_ms * 2 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "inactivity_timeout_ms is shorter than the inter-step pattern timeout; gestures may be cut off".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
