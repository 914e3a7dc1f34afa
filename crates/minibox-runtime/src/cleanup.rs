//! Host-side teardown after the container has exited.
//!
//! Paths are the container's layout joined onto its canonical root, i.e.
//! where the host sees what the container created at `/`. Both steps run
//! even when the first fails, and both succeed when there is nothing left
//! to undo, so teardown is safe after any setup failure.

use minibox_common::config::ContainerLayout;
use minibox_common::error::Result;
use minibox_core::cgroup;
use minibox_core::filesystem::mount;

use crate::spec::ContainerSpec;

/// What teardown actually found and removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// The cgroup tree existed and was removed.
    pub cgroup_removed: bool,
    /// The proc filesystem was mounted and has been unmounted.
    pub proc_unmounted: bool,
}

/// Removes the container's cgroup tree and unmounts its proc filesystem.
///
/// Must only be called once the container process has been reaped.
///
/// # Errors
///
/// Returns the first failure after both steps have been attempted.
pub fn teardown(spec: &ContainerSpec, layout: &ContainerLayout) -> Result<CleanupReport> {
    let cgroup_root = spec.host_path(&layout.cgroup_root);
    let proc_dir = spec.host_path(&layout.proc_dir);

    let removed = cgroup::destroy_tree(&cgroup_root);
    let unmounted = mount::unmount(&proc_dir);

    let report = CleanupReport {
        cgroup_removed: removed?,
        proc_unmounted: unmounted?,
    };
    tracing::info!(?report, root = %spec.root().display(), "cleanup complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::path::PathBuf;

    use minibox_common::error::MiniboxError;
    use minibox_core::cgroup::PidsCgroup;

    use super::*;

    fn spec_in(root: &std::path::Path) -> ContainerSpec {
        ContainerSpec::new(
            root,
            "sandbox",
            NonZeroU32::new(10).expect("non-zero"),
            "/bin/true",
            vec![],
        )
        .expect("spec")
    }

    fn is_root() -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[test]
    fn removes_cgroup_tree_but_keeps_root() {
        if !is_root() {
            return;
        }
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(root.path().join("proc")).expect("proc dir");
        let spec = spec_in(root.path());
        let cgroup = PidsCgroup::create(root.path().join("sys/fs/cgroup/pids")).expect("create");
        cgroup
            .limit(1, NonZeroU32::new(10).expect("non-zero"))
            .expect("limit");

        let report = teardown(&spec, &ContainerLayout::default()).expect("teardown");
        assert!(report.cgroup_removed);
        assert!(!report.proc_unmounted);
        assert!(root.path().is_dir());
        assert!(root.path().join("sys").is_dir());
        assert!(!root.path().join("sys/fs").exists());
    }

    #[test]
    fn second_teardown_is_a_no_op() {
        if !is_root() {
            return;
        }
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path());
        let _ = PidsCgroup::create(root.path().join("sys/fs/cgroup/pids")).expect("create");

        let _ = teardown(&spec, &ContainerLayout::default()).expect("first");
        let report = teardown(&spec, &ContainerLayout::default()).expect("second");
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn removal_error_is_reported_first() {
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path());
        std::fs::write(root.path().join("file"), b"").expect("file");
        let layout = ContainerLayout {
            cgroup_root: PathBuf::from("file/sys"),
            cgroup_dir: PathBuf::from("file/sys/pids"),
            ..ContainerLayout::default()
        };

        let err = teardown(&spec, &layout).unwrap_err();
        assert!(matches!(err, MiniboxError::RemoveDir { .. }));
    }
}
