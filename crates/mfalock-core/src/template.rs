use crate::error::{LockError, Result};
use crate::io;
use crate::paths;
use crate::types::StepAction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// PatternStep / PatternTemplate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStep {
    pub action: StepAction,
    /// Minimum press duration for a hold step. Always 0 for taps.
    #[serde(rename = "duration")]
    pub min_hold_ms: u64,
}

impl PatternStep {
    pub fn tap() -> Self {
        Self {
            action: StepAction::Tap,
            min_hold_ms: 0,
        }
    }

    pub fn hold(min_hold_ms: u64) -> Self {
        Self {
            action: StepAction::Hold,
            min_hold_ms,
        }
    }
}

/// Ordered tap/hold sequence defining the accepted touch gesture.
/// Always at least one step; taps always carry a zero duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTemplate {
    steps: Vec<PatternStep>,
}

impl PatternTemplate {
    pub fn new(steps: Vec<PatternStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(LockError::InvalidTemplate("template is empty".to_string()));
        }
        for (i, step) in steps.iter().enumerate() {
            if step.action == StepAction::Tap && step.min_hold_ms != 0 {
                return Err(LockError::InvalidTemplate(format!(
                    "step {}: tap must have duration 0, got {}",
                    i + 1,
                    step.min_hold_ms
                )));
            }
        }
        Ok(Self { steps })
    }

    /// The built-in fallback: tap, hold, tap.
    pub fn builtin_default(min_hold_ms: u64) -> Self {
        Self {
            steps: vec![
                PatternStep::tap(),
                PatternStep::hold(min_hold_ms),
                PatternStep::tap(),
            ],
        }
    }

    pub fn steps(&self) -> &[PatternStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for PatternTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .steps
            .iter()
            .map(|s| match s.action {
                StepAction::Tap => "tap".to_string(),
                StepAction::Hold => format!("hold({}ms)", s.min_hold_ms),
            })
            .collect();
        write!(f, "{}", parts.join(" → "))
    }
}

// ---------------------------------------------------------------------------
// Template document (wire/file form)
// ---------------------------------------------------------------------------

/// On-disk/runtime form: `{"pattern": [{"action": "tap", "duration": 0}, ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub pattern: Vec<PatternStep>,
}

impl TemplateDocument {
    pub fn parse(json: &str) -> Result<PatternTemplate> {
        let doc: TemplateDocument = serde_json::from_str(json)?;
        PatternTemplate::new(doc.pattern)
    }

    pub fn from_template(template: &PatternTemplate) -> Self {
        Self {
            pattern: template.steps().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Source precedence
// ---------------------------------------------------------------------------

/// Which precedence source supplied the active template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    Runtime,
    File,
    Default,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateSource::Runtime => "runtime",
            TemplateSource::File => "file",
            TemplateSource::Default => "default",
        };
        f.write_str(s)
    }
}

/// Outcome of template resolution: the active template, where it came from,
/// and why higher-priority sources were passed over.
#[derive(Debug)]
pub struct TemplateResolution {
    pub template: PatternTemplate,
    pub source: TemplateSource,
    pub rejected: Vec<(TemplateSource, LockError)>,
}

/// Resolve the active template at cold start. First valid source wins:
/// explicit runtime JSON, then the persisted document, then the built-in
/// default. Invalid sources are skipped with a warning, never fatal.
pub fn resolve(runtime: Option<&str>, root: &Path, default_min_hold_ms: u64) -> TemplateResolution {
    let mut rejected = Vec::new();

    if let Some(json) = runtime {
        match TemplateDocument::parse(json) {
            Ok(template) => {
                return TemplateResolution {
                    template,
                    source: TemplateSource::Runtime,
                    rejected,
                }
            }
            Err(e) => {
                tracing::warn!("runtime template rejected: {e}");
                rejected.push((TemplateSource::Runtime, e));
            }
        }
    }

    match load_file(root) {
        Ok(template) => {
            return TemplateResolution {
                template,
                source: TemplateSource::File,
                rejected,
            }
        }
        Err(e) => {
            tracing::warn!("pattern file rejected: {e}");
            rejected.push((TemplateSource::File, e));
        }
    }

    TemplateResolution {
        template: PatternTemplate::builtin_default(default_min_hold_ms),
        source: TemplateSource::Default,
        rejected,
    }
}

fn load_file(root: &Path) -> Result<PatternTemplate> {
    let path = paths::pattern_path(root);
    if !path.exists() {
        return Err(LockError::InvalidTemplate(format!(
            "pattern file not found: {}",
            path.display()
        )));
    }
    let data = std::fs::read_to_string(&path)?;
    if data.trim().is_empty() {
        return Err(LockError::InvalidTemplate("pattern file is empty".to_string()));
    }
    TemplateDocument::parse(&data)
}

/// Persist `template` as the pattern document under `root`.
pub fn save(root: &Path, template: &PatternTemplate) -> Result<()> {
    let doc = TemplateDocument::from_template(template);
    io::atomic_write(&paths::pattern_path(root), doc.to_json()?.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
