mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, pattern::PatternSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mfalock",
    about = "Multi-factor lock controller — sensor arbitration, quorum sessions, actuation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Device root (default: auto-detect from .mfalock/ or .git/)
    #[arg(long, global = true, env = "MFALOCK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold .mfalock/ with a default config and pattern document
    Init,

    /// Run the auth event listener and drive the actuator on quorum
    Listen {
        /// Override the configured listen address
        #[arg(long)]
        addr: Option<String>,
    },

    /// Send one auth event line to a running listener
    Send {
        /// Event line, e.g. "KEYPAD - SUCCESS"
        line: String,

        /// Listener address (default: from config)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Inspect or replace the persisted pattern template
    Pattern {
        #[command(subcommand)]
        subcommand: PatternSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Drive the sensor arbiter from a scripted sample file
    Simulate {
        /// Script of "<t_ms> touch <0|1>" / "<t_ms> rotary <raw>" lines
        script: PathBuf,

        /// Runtime pattern template JSON (overrides the persisted document)
        #[arg(long)]
        pattern: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Listen { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Listen { addr } => cmd::listen::run(&root, addr.as_deref()),
        Commands::Send { line, addr } => cmd::send::run(&root, &line, addr.as_deref()),
        Commands::Pattern { subcommand } => cmd::pattern::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Simulate { script, pattern } => {
            cmd::simulate::run(&root, &script, pattern.as_deref(), cli.json)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
