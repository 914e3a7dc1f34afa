//! Runs a single container from positional arguments.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use minibox_common::config::MiniboxConfig;
use minibox_common::error::MiniboxError;
use minibox_runtime::{ContainerSpec, ExitReport, Launcher};

/// Positional arguments describing the container.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory the container is confined to.
    pub root: PathBuf,

    /// Hostname inside the container.
    pub hostname: String,

    /// Maximum number of processes inside the container.
    pub max_processes: NonZeroU32,

    /// Program to execute (resolved inside ROOT) followed by its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "PROGRAM [ARGS]"
    )]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Builds the container spec, canonicalising the root directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or an argument is invalid.
    pub fn into_spec(self) -> anyhow::Result<ContainerSpec> {
        let mut command = self.command.into_iter();
        let program = command.next().ok_or_else(|| MiniboxError::Usage {
            message: "missing PROGRAM".into(),
        })?;
        Ok(ContainerSpec::new(
            self.root,
            self.hostname,
            self.max_processes,
            program,
            command.collect(),
        )?)
    }
}

/// Executes the container and maps its outcome to an exit status.
///
/// # Errors
///
/// Returns an error if the spec is invalid or the launcher fails.
pub fn execute(args: RunArgs, config: MiniboxConfig) -> anyhow::Result<ExitCode> {
    let spec = args.into_spec()?;
    let launcher = Launcher::new(config)?;
    let report = launcher.run(spec)?;
    Ok(exit_status(&report))
}

/// Maps a finished run to the launcher's exit status.
///
/// Setup and exec failures were already reported by the container itself,
/// so a failed run is only logged at `info`.
fn exit_status(report: &ExitReport) -> ExitCode {
    if report.success() {
        return ExitCode::SUCCESS;
    }
    tracing::info!(pid = report.pid, exit = %report.exit, "container failed");
    ExitCode::from(report.exit_code())
}
