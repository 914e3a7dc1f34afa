//! Unified error type for the minibox workspace.
//!
//! Every variant is fatal: the run stops at the first failure and the
//! variant tells the top-level handler which operation broke.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum MiniboxError {
    /// The command line did not supply the required arguments.
    #[error("usage: {message}")]
    Usage {
        /// Description of what is missing.
        message: String,
    },

    /// A configuration value or container description is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The execution stack could not be allocated.
    #[error("failed to allocate a {size}-byte execution stack")]
    Allocation {
        /// Requested stack size in bytes.
        size: usize,
    },

    /// The isolated process could not be created.
    #[error("clone failed: {source}")]
    Spawn {
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Waiting for the isolated process failed.
    #[error("wait for pid {pid} failed: {source}")]
    Wait {
        /// Pid being waited on.
        pid: i32,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Changing the root or working directory failed.
    #[error("filesystem confinement at {path} failed: {source}")]
    Confine {
        /// Directory being entered.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Setting the namespace-local hostname failed.
    #[error("sethostname({hostname}) failed: {source}")]
    Hostname {
        /// Requested hostname.
        hostname: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A cgroup directory could not be created.
    #[error("mkdir {path} failed: {source}")]
    CreateDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A cgroup control file could not be opened or written.
    #[error("write to {path} failed: {source}")]
    CgroupWrite {
        /// Control file being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Mounting the proc filesystem failed.
    #[error("mount proc at {target} failed: {source}")]
    Mount {
        /// Mount point.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Replacing the process image failed.
    #[error("exec {program} failed: {source}")]
    Exec {
        /// Program path inside the container root.
        program: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Recursive removal of the cgroup tree failed.
    #[error("remove {path} failed: {source}")]
    RemoveDir {
        /// Directory tree being removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Unmounting the proc filesystem failed.
    #[error("umount {target} failed: {source}")]
    Unmount {
        /// Mount point as seen from the host.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

impl MiniboxError {
    /// Short name of the operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "usage",
            Self::Config { .. } => "config",
            Self::Allocation { .. } => "alloc",
            Self::Spawn { .. } => "clone",
            Self::Wait { .. } => "wait",
            Self::Confine { .. } => "chroot",
            Self::Hostname { .. } => "sethostname",
            Self::CreateDir { .. } => "mkdir",
            Self::CgroupWrite { .. } => "cgroup",
            Self::Mount { .. } => "mount",
            Self::Exec { .. } => "exec",
            Self::RemoveDir { .. } => "remove",
            Self::Unmount { .. } => "umount",
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MiniboxError>;
