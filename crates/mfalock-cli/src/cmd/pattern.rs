use crate::output;
use anyhow::Result;
use clap::Subcommand;
use mfalock_core::config::LockConfig;
use mfalock_core::paths;
use mfalock_core::template::{self, TemplateDocument};
use std::path::Path;

#[derive(Subcommand)]
pub enum PatternSubcommand {
    /// Print the active template and which source supplied it
    Show,
    /// Replace the persisted template with the given JSON document
    Set {
        /// e.g. '{"pattern": [{"action": "tap", "duration": 0}]}'
        #[arg(id = "pattern_json", value_name = "JSON")]
        json: String,
    },
    /// Remove the persisted template, reverting to the built-in default
    Clear,
}

pub fn run(root: &Path, subcommand: PatternSubcommand, json: bool) -> Result<()> {
    match subcommand {
        PatternSubcommand::Show => {
            let config = LockConfig::load_or_default(root);
            let resolution = template::resolve(None, root, config.min_hold_ms);
            if json {
                output::print_json(&serde_json::json!({
                    "source": resolution.source,
                    "pattern": TemplateDocument::from_template(&resolution.template).pattern,
                }))?;
            } else {
                println!("{} (source: {})", resolution.template, resolution.source);
            }
        }
        PatternSubcommand::Set { json: doc } => {
            let template = TemplateDocument::parse(&doc)?;
            template::save(root, &template)?;
            println!("pattern set: {template}");
        }
        PatternSubcommand::Clear => {
            let path = paths::pattern_path(root);
            if path.exists() {
                std::fs::remove_file(&path)?;
                println!("pattern cleared; built-in default applies");
            } else {
                println!("no persisted pattern");
            }
        }
    }
    Ok(())
}
