use crate::template::PatternTemplate;
use crate::types::StepAction;

// ---------------------------------------------------------------------------
// PatternOutcome
// ---------------------------------------------------------------------------

/// Result of evaluating one completed press against the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOutcome {
    /// The full template was completed; progress is back at step 0.
    Match,
    /// The press satisfied the current step.
    Advanced { step: usize },
    /// Wrong action or a hold released too early; progress discarded.
    Reset,
}

// ---------------------------------------------------------------------------
// PatternMatcher
// ---------------------------------------------------------------------------

/// Finite-state validator for a tap/hold gesture sequence.
///
/// Consumes debounced touch edges via `on_press`/`on_release` and is ticked
/// with a caller-supplied monotonic timestamp so the inter-step timeout can
/// fire without any real sleeping. All progress lives here; resetting is
/// always silent from the event bus's point of view.
#[derive(Debug)]
pub struct PatternMatcher {
    template: PatternTemplate,
    max_tap_interval_ms: u64,
    step: usize,
    pressed_at: u64,
    last_edge_at: u64,
    has_edge: bool,
    holding: bool,
    timeout_latched: bool,
}

impl PatternMatcher {
    pub fn new(template: PatternTemplate, max_tap_interval_ms: u64) -> Self {
        Self {
            template,
            max_tap_interval_ms,
            step: 0,
            pressed_at: 0,
            last_edge_at: 0,
            has_edge: false,
            holding: false,
            timeout_latched: false,
        }
    }

    pub fn template(&self) -> &PatternTemplate {
        &self.template
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Discard any in-flight progress (arbiter timeout or mode handoff).
    pub fn reset(&mut self) {
        self.step = 0;
        self.holding = false;
        self.timeout_latched = false;
    }

    /// A confirmed rising edge: the press has started.
    pub fn on_press(&mut self, now_ms: u64) {
        self.pressed_at = now_ms;
        self.last_edge_at = now_ms;
        self.has_edge = true;
        self.holding = true;
        self.timeout_latched = false;
    }

    /// A confirmed falling edge: evaluate the completed press against the
    /// current step.
    pub fn on_release(&mut self, now_ms: u64) -> PatternOutcome {
        let duration = now_ms.saturating_sub(self.pressed_at);
        self.holding = false;
        self.last_edge_at = now_ms;
        self.has_edge = true;
        self.timeout_latched = false;

        let expected = self.template.steps()[self.step];
        let advanced = match expected.action {
            StepAction::Tap => duration > 0,
            StepAction::Hold => duration >= expected.min_hold_ms,
        };

        if !advanced {
            tracing::debug!(
                step = self.step + 1,
                duration_ms = duration,
                "incorrect input, resetting pattern"
            );
            self.step = 0;
            return PatternOutcome::Reset;
        }

        self.step += 1;
        if self.step == self.template.len() {
            tracing::info!("pattern complete");
            self.step = 0;
            return PatternOutcome::Match;
        }
        PatternOutcome::Advanced { step: self.step }
    }

    /// Inter-step timeout: too long between edges while mid-pattern discards
    /// progress silently. Logged once per episode via the latch.
    pub fn tick(&mut self, now_ms: u64) {
        if self.step > 0
            && !self.holding
            && self.has_edge
            && now_ms.saturating_sub(self.last_edge_at) > self.max_tap_interval_ms * 2
        {
            if !self.timeout_latched {
                tracing::debug!("pattern timeout, resetting");
                self.timeout_latched = true;
            }
            self.step = 0;
        } else if self.step == 0 {
            self.timeout_latched = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
