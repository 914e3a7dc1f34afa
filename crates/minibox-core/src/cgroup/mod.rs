//! Process-count limiting through a pids cgroup.
//!
//! The cgroup is a directory holding three control files: the membership
//! list, the ceiling, and the notify-on-release flag. It is created and
//! populated from inside the container and removed from the host once the
//! container has exited.

pub mod pids;

use std::num::NonZeroU32;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use minibox_common::constants;
use minibox_common::error::{MiniboxError, Result};

/// Handle to the pids cgroup directory of one container.
#[derive(Debug)]
pub struct PidsCgroup {
    path: PathBuf,
}

impl PidsCgroup {
    /// Ensures the cgroup directory and all of its ancestors exist.
    ///
    /// Directories that are already present are left untouched, so calling
    /// this twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`MiniboxError::CreateDir`] if a missing directory cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(constants::CGROUP_DIR_MODE)
            .create(&path)
            .map_err(|e| MiniboxError::CreateDir {
                path: path.clone(),
                source: e,
            })?;
        tracing::debug!(path = %path.display(), "cgroup hierarchy ready");
        Ok(Self { path })
    }

    /// Refers to an existing cgroup directory without touching the filesystem.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the cgroup directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Places `pid` in the cgroup and caps its process count at `max`.
    ///
    /// Writes membership first, then the ceiling, then enables
    /// notify-on-release. The kernel enforces the ceiling from then on:
    /// process creation inside the cgroup fails once it is reached.
    ///
    /// # Errors
    ///
    /// Returns [`MiniboxError::CgroupWrite`] on the first control file that
    /// cannot be written. Later files are not touched.
    pub fn limit(&self, pid: u32, max: NonZeroU32) -> Result<()> {
        pids::add_process(&self.path, pid)?;
        pids::set_pids_max(&self.path, max)?;
        pids::set_notify_on_release(&self.path)?;
        tracing::info!(pid, max = max.get(), "process limit applied");
        Ok(())
    }
}

/// Recursively removes a cgroup tree.
///
/// Returns `false` if there was nothing to remove.
///
/// # Errors
///
/// Returns [`MiniboxError::RemoveDir`] if the tree exists but cannot be removed.
pub fn destroy_tree(path: &Path) -> Result<bool> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "cgroup tree removed");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "cgroup tree already absent");
            Ok(false)
        }
        Err(e) => Err(MiniboxError::RemoveDir {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
