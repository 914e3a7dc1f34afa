//! Proc filesystem mounting inside the container's mount namespace.
//!
//! The mount is made from inside the container and removed from the host,
//! so unmounting treats an already-absent mount as done.

use std::path::Path;

use minibox_common::error::{MiniboxError, Result};

/// Mounts a fresh proc filesystem at `target`.
///
/// Inside a new PID namespace the mount reflects that namespace's
/// processes rather than the host's.
///
/// # Errors
///
/// Returns [`MiniboxError::Mount`] if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_proc(target: &Path) -> Result<()> {
    use minibox_common::constants;
    use nix::mount::{MsFlags, mount};

    mount(
        Some(constants::PROC_FS_TYPE),
        target,
        Some(constants::PROC_FS_TYPE),
        MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
        None::<&str>,
    )
    .map_err(|e| MiniboxError::Mount {
        target: target.to_path_buf(),
        source: e.into(),
    })?;
    tracing::debug!(target = %target.display(), "proc mounted");
    Ok(())
}

/// Unmounts `target` without following a symlink at its final component.
///
/// Returns `false` when nothing is mounted there (`EINVAL`) or the path
/// does not exist (`ENOENT`). A symlink left at `target` by the contained
/// program counts as nothing mounted.
///
/// # Errors
///
/// Returns [`MiniboxError::Unmount`] for any other `umount2(2)` failure,
/// for example `EBUSY` while processes still use the mount.
#[cfg(target_os = "linux")]
pub fn unmount(target: &Path) -> Result<bool> {
    use nix::errno::Errno;
    use nix::mount::{MntFlags, umount2};

    match umount2(target, MntFlags::UMOUNT_NOFOLLOW) {
        Ok(()) => {
            tracing::info!(target = %target.display(), "unmounted");
            Ok(true)
        }
        Err(Errno::EINVAL | Errno::ENOENT) => {
            tracing::debug!(target = %target.display(), "nothing mounted");
            Ok(false)
        }
        Err(e) => Err(MiniboxError::Unmount {
            target: target.to_path_buf(),
            source: e.into(),
        }),
    }
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_proc(_target: &Path) -> Result<()> {
    Err(MiniboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: unmounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn unmount(_target: &Path) -> Result<bool> {
    Err(MiniboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn unmount_of_plain_directory_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let proc_dir = dir.path().join("proc");
        std::fs::create_dir(&proc_dir).expect("mkdir");

        // EINVAL as root, EPERM otherwise.
        match unmount(&proc_dir) {
            Ok(mounted) => assert!(!mounted),
            Err(err) => assert!(matches!(err, MiniboxError::Unmount { .. })),
        }
    }

    #[test]
    fn unmount_of_missing_path_is_a_no_op_for_root() {
        if !nix::unistd::geteuid().is_root() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!unmount(&dir.path().join("proc")).expect("unmount"));
    }

    #[test]
    fn unmount_does_not_follow_a_symlink() {
        use nix::mount::{MntFlags, MsFlags, mount, umount2};

        if !nix::unistd::geteuid().is_root() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let host_mount = dir.path().join("host");
        std::fs::create_dir(&host_mount).expect("mkdir");
        mount(
            Some("tmpfs"),
            &host_mount,
            Some("tmpfs"),
            MsFlags::empty(),
            None::<&str>,
        )
        .expect("mount tmpfs");
        std::fs::write(host_mount.join("marker"), b"").expect("marker");
        let proc_link = dir.path().join("proc");
        std::os::unix::fs::symlink(&host_mount, &proc_link).expect("symlink");

        let result = unmount(&proc_link);
        let still_mounted = host_mount.join("marker").exists();
        umount2(&host_mount, MntFlags::MNT_DETACH).expect("cleanup tmpfs");

        assert!(!result.expect("unmount"));
        assert!(still_mounted);
    }
}
