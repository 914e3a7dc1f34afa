//! Runtime configuration model.
//!
//! Loaded from an optional JSON file; any field left out takes its default.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{MiniboxError, Result};

/// Root configuration for a minibox run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniboxConfig {
    /// Size in bytes of the stack handed to the isolated process.
    pub stack_size: usize,
    /// Root-relative locations of the cgroup tree and proc mount.
    pub layout: ContainerLayout,
}

impl Default for MiniboxConfig {
    fn default() -> Self {
        Self {
            stack_size: constants::DEFAULT_STACK_SIZE,
            layout: ContainerLayout::default(),
        }
    }
}

impl MiniboxConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`MiniboxConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| MiniboxError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| MiniboxError::Config {
            message: format!("cannot parse {}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the stack size and layout paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack is smaller than
    /// [`constants::MIN_STACK_SIZE`] or the layout is malformed.
    pub fn validate(&self) -> Result<()> {
        if self.stack_size < constants::MIN_STACK_SIZE {
            return Err(MiniboxError::Config {
                message: format!(
                    "stack_size {} is below the minimum of {}",
                    self.stack_size,
                    constants::MIN_STACK_SIZE
                ),
            });
        }
        self.layout.validate()
    }
}

/// Where the container's cgroup tree and proc mount live, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerLayout {
    /// Tree removed by cleanup. Must contain `cgroup_dir`.
    pub cgroup_root: PathBuf,
    /// Directory holding the pids cgroup control files.
    pub cgroup_dir: PathBuf,
    /// Mount point of the private proc filesystem.
    pub proc_dir: PathBuf,
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self {
            cgroup_root: PathBuf::from(constants::DEFAULT_CGROUP_ROOT),
            cgroup_dir: PathBuf::from(constants::DEFAULT_CGROUP_DIR),
            proc_dir: PathBuf::from(constants::DEFAULT_PROC_DIR),
        }
    }
}

impl ContainerLayout {
    /// Checks that every path is a plain relative path naming something
    /// below the root, that the cgroup directory lies inside the cgroup
    /// root, and that the proc mount point and the cgroup root do not
    /// overlap.
    ///
    /// # Errors
    ///
    /// Returns a [`MiniboxError::Config`] describing the first bad path.
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("cgroup_root", &self.cgroup_root),
            ("cgroup_dir", &self.cgroup_dir),
            ("proc_dir", &self.proc_dir),
        ] {
            check_relative(name, path)?;
        }
        if self.cgroup_dir == self.cgroup_root || !self.cgroup_dir.starts_with(&self.cgroup_root) {
            return Err(MiniboxError::Config {
                message: format!(
                    "cgroup_dir {} must lie below cgroup_root {}",
                    self.cgroup_dir.display(),
                    self.cgroup_root.display()
                ),
            });
        }
        // Cleanup removes the cgroup tree before unmounting proc.
        if self.proc_dir.starts_with(&self.cgroup_root)
            || self.cgroup_root.starts_with(&self.proc_dir)
        {
            return Err(MiniboxError::Config {
                message: format!(
                    "proc_dir {} must not overlap cgroup_root {}",
                    self.proc_dir.display(),
                    self.cgroup_root.display()
                ),
            });
        }
        Ok(())
    }
}

fn check_relative(name: &str, path: &Path) -> Result<()> {
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return Err(MiniboxError::Config {
            message: format!("{name} must not be empty"),
        });
    }
    if components.all(|c| matches!(c, Component::Normal(_))) {
        Ok(())
    } else {
        Err(MiniboxError::Config {
            message: format!(
                "{name} must be a relative path without '.' or '..': {}",
                path.display()
            ),
        })
    }
}
