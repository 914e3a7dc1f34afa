//! CLI definition and dispatch.

pub mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use minibox_common::config::MiniboxConfig;
use minibox_common::constants;

/// minibox: run one program in fresh PID, UTS, and mount namespaces,
/// confined to a directory with a bounded process count.
#[derive(Parser, Debug)]
#[command(name = "minibox", version, about, long_about = None)]
pub struct Cli {
    /// JSON file overriding the stack size and cgroup/proc layout.
    #[arg(long, env = constants::CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// What to run and where.
    #[command(flatten)]
    pub run: run::RunArgs,
}

/// Loads the configuration and runs the container.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the launcher
/// fails before the container's exit status is known.
pub fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => MiniboxConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MiniboxConfig::default(),
    };
    run::execute(cli.run, config)
}
