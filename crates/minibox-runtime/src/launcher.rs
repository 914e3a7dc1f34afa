//! Orchestrates one container run from stack allocation to cleanup.

use minibox_common::config::MiniboxConfig;
use minibox_common::error::Result;
use minibox_core::namespace::NamespaceSet;

use crate::cleanup;
use crate::entry::ContainerEntry;
use crate::process::{self, ExitReport};
use crate::spec::ContainerSpec;
use crate::stack::ExecutionStack;

/// Runs a single container to completion.
#[derive(Debug, Clone)]
pub struct Launcher {
    config: MiniboxConfig,
    namespaces: NamespaceSet,
}

impl Launcher {
    /// Creates a launcher from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: MiniboxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            namespaces: NamespaceSet::default(),
        })
    }

    /// Runs `spec` once: clones the container into fresh PID, UTS, and
    /// mount namespaces, waits for it to exit, then tears down its cgroup
    /// tree and proc mount.
    ///
    /// A container that fails during setup or exec still gets cleaned up;
    /// its failure shows in the returned [`ExitReport`]. Cleanup is skipped
    /// only when waiting itself fails, since the child may still be alive.
    ///
    /// # Errors
    ///
    /// Returns the first allocation, clone, wait, or cleanup failure.
    pub fn run(&self, spec: ContainerSpec) -> Result<ExitReport> {
        let mut stack = ExecutionStack::allocate(self.config.stack_size)?;
        let (program, argv) = spec.exec_argv()?;
        let entry = ContainerEntry::new(&spec, &self.config.layout);

        tracing::info!(
            root = %spec.root().display(),
            hostname = spec.hostname(),
            max_processes = spec.max_processes().get(),
            program = %spec.program().display(),
            "launching container"
        );
        let child = process::spawn_isolated(&mut stack, self.namespaces, || {
            entry.enter(&program, &argv)
        })?;
        let report = child.wait()?;

        let cleanup = cleanup::teardown(&spec, &self.config.layout)?;
        stack.release();
        tracing::info!(
            pid = report.pid,
            exit = %report.exit,
            cgroup_removed = cleanup.cgroup_removed,
            proc_unmounted = cleanup.proc_unmounted,
            "container finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use minibox_common::error::MiniboxError;

    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        let config = MiniboxConfig {
            stack_size: 16,
            ..MiniboxConfig::default()
        };
        assert!(matches!(
            Launcher::new(config),
            Err(MiniboxError::Config { .. })
        ));
    }

    #[test]
    fn new_rejects_layout_naming_the_root_itself() {
        let mut config = MiniboxConfig::default();
        config.layout.cgroup_root = PathBuf::from(".");
        config.layout.cgroup_dir = PathBuf::from("./pids");
        assert!(matches!(
            Launcher::new(config),
            Err(MiniboxError::Config { .. })
        ));
    }

    #[test]
    fn new_accepts_default_config() {
        assert!(Launcher::new(MiniboxConfig::default()).is_ok());
    }
}
