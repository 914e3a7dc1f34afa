//! System-wide constants and default paths.
//!
//! Layout paths are relative to the container root. They are joined onto
//! `/` inside the confined process and onto the canonical root directory
//! from the host.

/// Default size of the execution stack handed to the isolated process (1 MiB).
pub const DEFAULT_STACK_SIZE: usize = 1024 * 1024;

/// Smallest execution stack accepted by configuration validation (64 KiB).
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// Root-relative directory removed wholesale during cleanup.
pub const DEFAULT_CGROUP_ROOT: &str = "sys/fs";

/// Root-relative directory of the pids cgroup.
pub const DEFAULT_CGROUP_DIR: &str = "sys/fs/cgroup/pids";

/// Root-relative mount point of the private proc filesystem.
pub const DEFAULT_PROC_DIR: &str = "proc";

/// Cgroup membership file.
pub const CGROUP_PROCS_FILE: &str = "cgroup.procs";

/// Cgroup process-count ceiling file.
pub const PIDS_MAX_FILE: &str = "pids.max";

/// Cgroup notify-on-release flag file.
pub const NOTIFY_ON_RELEASE_FILE: &str = "notify_on_release";

/// Value written to enable notify-on-release.
pub const NOTIFY_ON_RELEASE_ENABLED: &str = "1";

/// Permission bits for directories created in the cgroup hierarchy.
pub const CGROUP_DIR_MODE: u32 = 0o755;

/// Filesystem type and source name used for the proc mount.
pub const PROC_FS_TYPE: &str = "proc";

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "MINIBOX_CONFIG";

