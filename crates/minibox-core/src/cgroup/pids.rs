//! Writers for the pids cgroup control files.

use std::num::NonZeroU32;
use std::path::Path;

use minibox_common::constants;
use minibox_common::error::{MiniboxError, Result};

/// Adds a process to the cgroup by writing its PID to `cgroup.procs`.
///
/// # Errors
///
/// Returns an error if writing to `cgroup.procs` fails.
pub fn add_process(cgroup_path: &Path, pid: u32) -> Result<()> {
    write_control(cgroup_path, constants::CGROUP_PROCS_FILE, &pid.to_string())?;
    tracing::debug!(pid, "added process to cgroup");
    Ok(())
}

/// Sets the process-count ceiling in `pids.max`.
///
/// # Errors
///
/// Returns an error if writing to `pids.max` fails.
pub fn set_pids_max(cgroup_path: &Path, max: NonZeroU32) -> Result<()> {
    write_control(cgroup_path, constants::PIDS_MAX_FILE, &max.to_string())?;
    tracing::debug!(max = max.get(), "pids max set");
    Ok(())
}

/// Enables `notify_on_release` so the kernel reports when the cgroup empties.
///
/// # Errors
///
/// Returns an error if writing to `notify_on_release` fails.
pub fn set_notify_on_release(cgroup_path: &Path) -> Result<()> {
    write_control(
        cgroup_path,
        constants::NOTIFY_ON_RELEASE_FILE,
        constants::NOTIFY_ON_RELEASE_ENABLED,
    )?;
    tracing::debug!("notify_on_release enabled");
    Ok(())
}

fn write_control(cgroup_path: &Path, file: &str, value: &str) -> Result<()> {
    let path = cgroup_path.join(file);
    std::fs::write(&path, value).map_err(|e| MiniboxError::CgroupWrite { path, source: e })
}
