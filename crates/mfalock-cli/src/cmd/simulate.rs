use anyhow::{bail, Context, Result};
use mfalock_core::arbiter::{SensorArbiter, SensorEvent, SensorInput};
use mfalock_core::config::LockConfig;
use mfalock_core::template;
use std::path::Path;

/// Polling cadence of the simulated sensor loop.
const TICK_MS: u64 = 10;
/// Extra ticks after the last scripted change, so trailing edges debounce.
const TAIL_MS: u64 = 200;

#[derive(Debug)]
enum ScriptLine {
    Touch(bool),
    Rotary(u16),
}

#[derive(Debug)]
struct ScriptStep {
    at_ms: u64,
    line: ScriptLine,
}

/// Replay a scripted sample trace through the sensor arbiter and print
/// every event it surfaces. Lets gesture timing be tuned without hardware.
pub fn run(root: &Path, script: &Path, pattern: Option<&str>, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read {}", script.display()))?;
    let steps = parse_script(&text)?;
    if steps.is_empty() {
        bail!("script has no sample lines");
    }

    let config = LockConfig::load_or_default(root);
    let resolution = template::resolve(pattern, root, config.min_hold_ms);
    if !json {
        println!(
            "pattern: {} (source: {})",
            resolution.template, resolution.source
        );
    }
    let mut arbiter = SensorArbiter::new(&config, resolution.template);

    let mut touch_level = false;
    let mut rotary_raw = 0u16;
    let end = steps.last().map(|s| s.at_ms).unwrap_or(0) + TAIL_MS;
    let mut next = 0;
    let mut now = 0u64;
    while now <= end {
        while next < steps.len() && steps[next].at_ms <= now {
            match steps[next].line {
                ScriptLine::Touch(level) => touch_level = level,
                ScriptLine::Rotary(raw) => rotary_raw = raw,
            }
            next += 1;
        }
        for event in arbiter.tick(
            SensorInput {
                touch_level,
                rotary_raw,
            },
            now,
        ) {
            emit(now, &event, json)?;
        }
        now += TICK_MS;
    }
    Ok(())
}

/// One change per line: `<t_ms> touch <0|1>` or `<t_ms> rotary <raw>`.
/// Blank lines and `#` comments are skipped. Timestamps must not decrease.
fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    let mut steps: Vec<ScriptStep> = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let parsed = (|| -> Option<ScriptStep> {
            let at_ms: u64 = parts.next()?.parse().ok()?;
            let kind = parts.next()?;
            let value = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            let line = match kind {
                "touch" => ScriptLine::Touch(match value {
                    "0" => false,
                    "1" => true,
                    _ => return None,
                }),
                "rotary" => ScriptLine::Rotary(value.parse().ok()?),
                _ => return None,
            };
            Some(ScriptStep { at_ms, line })
        })();
        let step = match parsed {
            Some(step) => step,
            None => bail!(
                "line {}: expected \"<t_ms> touch <0|1>\" or \"<t_ms> rotary <raw>\", got \"{line}\"",
                i + 1
            ),
        };
        if let Some(prev) = steps.last() {
            if step.at_ms < prev.at_ms {
                bail!("line {}: timestamps must not decrease", i + 1);
            }
        }
        steps.push(step);
    }
    Ok(steps)
}

fn emit(now: u64, event: &SensorEvent, json: bool) -> Result<()> {
    if json {
        let value = match event {
            SensorEvent::Claimed { mode } => {
                serde_json::json!({"t_ms": now, "event": "claimed", "mode": mode.as_str()})
            }
            SensorEvent::Completed(auth) => {
                serde_json::json!({"t_ms": now, "event": "completed", "line": auth.to_string()})
            }
            SensorEvent::AngleChanged { angle } => {
                serde_json::json!({"t_ms": now, "event": "angle_changed", "angle": angle})
            }
            SensorEvent::TimedOut { mode } => {
                serde_json::json!({"t_ms": now, "event": "timed_out", "mode": mode.as_str()})
            }
        };
        println!("{value}");
    } else {
        match event {
            SensorEvent::Claimed { mode } => println!("[{now:>6}] claimed {mode}"),
            SensorEvent::Completed(auth) => println!("[{now:>6}] {auth}"),
            SensorEvent::AngleChanged { angle } => println!("[{now:>6}] angle {angle}"),
            SensorEvent::TimedOut { mode } => println!("[{now:>6}] {mode} timed out"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_and_both_kinds() {
        let steps = parse_script("# warm up\n100 touch 1\n\n150 rotary 2048\n").unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].at_ms, 100);
        assert!(matches!(steps[1].line, ScriptLine::Rotary(2048)));
    }

    #[test]
    fn rejects_garbage_with_line_number() {
        let err = parse_script("100 touch 1\nnope\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_decreasing_timestamps() {
        assert!(parse_script("200 touch 1\n100 touch 0\n").is_err());
    }
}
