//! Root filesystem confinement via `chroot(2)`.
//!
//! Confinement is two steps: change the apparent root, then move the
//! working directory into it so no handle to the old tree remains.

use std::path::Path;

use minibox_common::error::{MiniboxError, Result};

/// Changes the root directory of the calling process to `new_root`.
///
/// # Errors
///
/// Returns [`MiniboxError::Confine`] if `chroot(2)` fails.
#[cfg(target_os = "linux")]
pub fn change_root(new_root: &Path) -> Result<()> {
    nix::unistd::chroot(new_root).map_err(|e| MiniboxError::Confine {
        path: new_root.to_path_buf(),
        source: e.into(),
    })?;
    tracing::debug!(new_root = %new_root.display(), "root changed");
    Ok(())
}

/// Moves the working directory to `/`, committing a preceding chroot.
///
/// # Errors
///
/// Returns [`MiniboxError::Confine`] if `chdir(2)` fails.
#[cfg(target_os = "linux")]
pub fn enter_root() -> Result<()> {
    let root = Path::new("/");
    nix::unistd::chdir(root).map_err(|e| MiniboxError::Confine {
        path: root.to_path_buf(),
        source: e.into(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: confinement requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn change_root(_new_root: &Path) -> Result<()> {
    Err(MiniboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: confinement requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn enter_root() -> Result<()> {
    Err(MiniboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}
