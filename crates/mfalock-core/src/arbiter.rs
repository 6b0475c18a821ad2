use crate::config::LockConfig;
use crate::event::AuthEvent;
use crate::pattern::{PatternMatcher, PatternOutcome};
use crate::rotary::RotarySampler;
use crate::template::PatternTemplate;
use crate::types::{AuthStatus, SensorMode};

// ---------------------------------------------------------------------------
// SensorInput / SensorEvent
// ---------------------------------------------------------------------------

/// Raw sensor levels for one tick, read by the caller's polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorInput {
    pub touch_level: bool,
    pub rotary_raw: u16,
}

/// Everything the arbiter can surface in one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// A sensor claimed the active input from idle.
    Claimed { mode: SensorMode },
    /// A factor attempt completed (touch pattern match or mismatch),
    /// ready for the auth event bus.
    Completed(AuthEvent),
    /// The smoothed rotary angle moved past the report threshold.
    AngleChanged { angle: u16 },
    /// Inactivity forced the active sensor back to idle, discarding any
    /// partial progress.
    TimedOut { mode: SensorMode },
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TouchEdge {
    Rising,
    Falling,
}

/// Delay-and-reread edge confirmation: a level change only counts once a
/// later sample, at least `window_ms` after the change, still agrees.
/// Transients that revert inside the window are dropped.
#[derive(Debug)]
struct Debouncer {
    window_ms: u64,
    confirmed: bool,
    pending: Option<(bool, u64)>,
}

impl Debouncer {
    fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            confirmed: false,
            pending: None,
        }
    }

    fn sample(&mut self, level: bool, now_ms: u64) -> Option<TouchEdge> {
        match self.pending {
            Some((pending_level, since)) => {
                if level != pending_level {
                    // Reverted before confirmation: transient noise.
                    self.pending = None;
                    return None;
                }
                if now_ms.saturating_sub(since) >= self.window_ms {
                    self.pending = None;
                    self.confirmed = level;
                    return Some(if level {
                        TouchEdge::Rising
                    } else {
                        TouchEdge::Falling
                    });
                }
                None
            }
            None => {
                if level != self.confirmed {
                    self.pending = Some((level, now_ms));
                }
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SensorArbiter
// ---------------------------------------------------------------------------

/// Single-threaded scheduler deciding which sensor owns the active input.
///
/// Driven by an external polling loop calling `tick` with fresh levels and
/// a monotonic timestamp; there is no sleeping or I/O in here, so tests run
/// on simulated time. Transitions are `Idle→Touch`, `Idle→Rotary`, and
/// `{Touch,Rotary}→Idle` on inactivity only — an active sensor is never
/// pre-empted by the other.
#[derive(Debug)]
pub struct SensorArbiter {
    mode: SensorMode,
    matcher: PatternMatcher,
    rotary: RotarySampler,
    debouncer: Debouncer,
    activation_threshold: u16,
    inactivity_timeout_ms: u64,
    last_activity: u64,
    /// Smoothed angle the knob rested at when the arbiter last went idle.
    /// Fixed for the whole idle episode so slow motion accumulates toward
    /// the activation threshold.
    idle_angle: Option<u16>,
}

impl SensorArbiter {
    pub fn new(config: &LockConfig, template: PatternTemplate) -> Self {
        Self {
            mode: SensorMode::Idle,
            matcher: PatternMatcher::new(template, config.max_tap_interval_ms),
            rotary: RotarySampler::new(config.rotary_buffer_size, config.rotary_report_threshold),
            debouncer: Debouncer::new(config.debounce_ms),
            activation_threshold: config.rotary_activation_threshold,
            inactivity_timeout_ms: config.inactivity_timeout_ms,
            last_activity: 0,
            idle_angle: None,
        }
    }

    pub fn mode(&self) -> SensorMode {
        self.mode
    }

    pub fn pattern_step(&self) -> usize {
        self.matcher.step()
    }

    /// Evaluate one tick. Both sensors are sampled every tick no matter who
    /// owns the input, so the inactive one keeps its activation signal warm.
    pub fn tick(&mut self, input: SensorInput, now_ms: u64) -> Vec<SensorEvent> {
        let mut events = Vec::new();

        let edge = self.debouncer.sample(input.touch_level, now_ms);
        let reading = self.rotary.push(input.rotary_raw);

        match self.mode {
            SensorMode::Idle => {
                // Activation compares against the resting angle, not the
                // last reported one, so a slow steady turn accumulates
                // toward the threshold instead of re-baselining every tick.
                let resting = *self.idle_angle.get_or_insert(reading.angle);
                // Touch is polled before rotary: the intended tie-break when
                // both activate on the same tick.
                if edge == Some(TouchEdge::Rising) {
                    tracing::info!("touch sensor activated");
                    self.mode = SensorMode::Touch;
                    self.last_activity = now_ms;
                    self.matcher.reset();
                    self.matcher.on_press(now_ms);
                    events.push(SensorEvent::Claimed {
                        mode: SensorMode::Touch,
                    });
                } else if !reading.first
                    && reading.angle.abs_diff(resting) >= self.activation_threshold
                {
                    tracing::info!(angle = reading.angle, "rotary sensor activated");
                    self.mode = SensorMode::Rotary;
                    self.last_activity = now_ms;
                    events.push(SensorEvent::Claimed {
                        mode: SensorMode::Rotary,
                    });
                    events.push(SensorEvent::AngleChanged {
                        angle: reading.angle,
                    });
                }
            }
            SensorMode::Touch => {
                match edge {
                    Some(TouchEdge::Rising) => {
                        self.matcher.on_press(now_ms);
                        self.last_activity = now_ms;
                    }
                    Some(TouchEdge::Falling) => {
                        self.last_activity = now_ms;
                        match self.matcher.on_release(now_ms) {
                            PatternOutcome::Match => {
                                events.push(SensorEvent::Completed(AuthEvent::new(
                                    "TOUCH",
                                    AuthStatus::Success,
                                )));
                            }
                            PatternOutcome::Reset => {
                                events.push(SensorEvent::Completed(AuthEvent::new(
                                    "TOUCH",
                                    AuthStatus::Failure,
                                )));
                            }
                            PatternOutcome::Advanced { .. } => {}
                        }
                    }
                    None => {}
                }
                // Inter-step timeout is silent: no completion event.
                self.matcher.tick(now_ms);
            }
            SensorMode::Rotary => {
                if reading.reported && !reading.first {
                    events.push(SensorEvent::AngleChanged {
                        angle: reading.angle,
                    });
                    self.last_activity = now_ms;
                }
            }
        }

        if self.mode != SensorMode::Idle
            && now_ms.saturating_sub(self.last_activity) > self.inactivity_timeout_ms
        {
            tracing::info!(mode = %self.mode, "sensor timeout, returning to idle");
            events.push(SensorEvent::TimedOut { mode: self.mode });
            self.mode = SensorMode::Idle;
            self.matcher.reset();
            self.idle_angle = Some(reading.angle);
        }

        events
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
