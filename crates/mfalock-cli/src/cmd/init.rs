use anyhow::Result;
use mfalock_core::config::LockConfig;
use mfalock_core::template::{PatternTemplate, TemplateDocument};
use mfalock_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    io::ensure_dir(&paths::lock_dir(root))?;

    let config = LockConfig::default();
    let config_written = io::write_if_missing(
        &paths::config_path(root),
        serde_yaml::to_string(&config)?.as_bytes(),
    )?;

    let template = PatternTemplate::builtin_default(config.min_hold_ms);
    let doc = TemplateDocument::from_template(&template);
    let pattern_written =
        io::write_if_missing(&paths::pattern_path(root), doc.to_json()?.as_bytes())?;

    if config_written || pattern_written {
        println!("initialized {}", paths::lock_dir(root).display());
    } else {
        println!("already initialized at {}", paths::lock_dir(root).display());
    }
    Ok(())
}
