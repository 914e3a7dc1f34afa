//! The immutable description of what to run and where.

use std::ffi::CString;
use std::num::NonZeroU32;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use minibox_common::error::{MiniboxError, Result};

/// What to run inside the container and where.
///
/// The root directory is canonicalised once at construction. Host-side
/// cleanup and in-container setup both derive their paths from it, so
/// they always agree on the same tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    root: PathBuf,
    hostname: String,
    max_processes: NonZeroU32,
    program: PathBuf,
    args: Vec<String>,
}

impl ContainerSpec {
    /// Builds a spec, canonicalising `root`.
    ///
    /// `program` is resolved after confinement, relative to the new root.
    ///
    /// # Errors
    ///
    /// Returns [`MiniboxError::Config`] if the root is not an existing
    /// directory, the hostname or program is empty, or any string contains
    /// a NUL byte.
    pub fn new(
        root: impl AsRef<Path>,
        hostname: impl Into<String>,
        max_processes: NonZeroU32,
        program: impl Into<PathBuf>,
        args: Vec<String>,
    ) -> Result<Self> {
        let root = root.as_ref();
        let canonical = std::fs::canonicalize(root).map_err(|e| MiniboxError::Config {
            message: format!("root directory {}: {e}", root.display()),
        })?;
        if !canonical.is_dir() {
            return Err(MiniboxError::Config {
                message: format!("root {} is not a directory", canonical.display()),
            });
        }

        let hostname = hostname.into();
        if hostname.is_empty() {
            return Err(MiniboxError::Config {
                message: "hostname must not be empty".into(),
            });
        }

        let program = program.into();
        if program.as_os_str().is_empty() {
            return Err(MiniboxError::Config {
                message: "program path must not be empty".into(),
            });
        }

        let spec = Self {
            root: canonical,
            hostname,
            max_processes,
            program,
            args,
        };
        let _ = spec.exec_argv()?;
        Ok(spec)
    }

    /// Canonical root directory, as seen from the host.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Namespace-local hostname.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Process-count ceiling for the container's cgroup.
    pub const fn max_processes(&self) -> NonZeroU32 {
        self.max_processes
    }

    /// Target executable, relative to the confined root.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed after the program path.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Maps a root-relative path to where the host sees it.
    pub fn host_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Maps a root-relative path to where the confined process sees it.
    pub fn container_path(relative: &Path) -> PathBuf {
        Path::new("/").join(relative)
    }

    /// Returns the program and its full argument vector as C strings.
    ///
    /// `argv[0]` is the program path; the remaining arguments follow verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`MiniboxError::Config`] if any value contains a NUL byte.
    pub fn exec_argv(&self) -> Result<(CString, Vec<CString>)> {
        let program = to_cstring(self.program.as_os_str().as_bytes())?;
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(program.clone());
        for arg in &self.args {
            argv.push(to_cstring(arg.as_bytes())?);
        }
        Ok((program, argv))
    }
}

fn to_cstring(bytes: &[u8]) -> Result<CString> {
    CString::new(bytes).map_err(|e| MiniboxError::Config {
        message: format!("argument contains a NUL byte: {e}"),
    })
}
