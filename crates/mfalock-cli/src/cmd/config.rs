use crate::output;
use anyhow::{bail, Result};
use clap::Subcommand;
use mfalock_core::config::{LockConfig, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Check the persisted configuration for broken or suspect values
    Validate,
}

pub fn run(root: &Path, subcommand: ConfigSubcommand, json: bool) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let config = LockConfig::load_or_default(root);
            if json {
                output::print_json(&config)?;
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }
        ConfigSubcommand::Validate => {
            let config = LockConfig::load(root)?;
            let warnings = config.validate();
            if json {
                output::print_json(&warnings)?;
            } else {
                for warning in &warnings {
                    let level = match warning.level {
                        WarnLevel::Error => "error",
                        WarnLevel::Warning => "warning",
                    };
                    println!("{level}: {}", warning.message);
                }
            }
            let errors = warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count();
            if errors > 0 {
                bail!("configuration has {errors} error(s)");
            }
            if !json && warnings.is_empty() {
                println!("configuration ok");
            }
        }
    }
    Ok(())
}
