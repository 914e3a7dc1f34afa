//! The body that runs inside the new namespaces.
//!
//! Setup is a fixed sequence of [`SetupStep`]s followed by `execv(2)`. The
//! first failing step aborts the container; nothing is rolled back here,
//! that is left to [`crate::cleanup`] on the host side.

use std::convert::Infallible;
use std::ffi::{CStr, CString};
use std::fmt;
use std::path::{Path, PathBuf};

use minibox_common::config::ContainerLayout;
use minibox_common::error::{MiniboxError, Result};
use minibox_core::cgroup::PidsCgroup;
use minibox_core::filesystem::{chroot, mount};
use minibox_core::namespace::uts;

use crate::spec::ContainerSpec;

/// One step of the in-container setup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// `chroot(2)` into the spec's root directory.
    ChangeRoot,
    /// `chdir("/")`, committing the confinement.
    EnterRoot,
    /// Set the namespace-local hostname.
    SetHostname,
    /// Create any missing directories of the cgroup hierarchy.
    PrepareCgroup,
    /// Join the cgroup and write the process ceiling.
    LimitProcesses,
    /// Mount a private proc filesystem.
    MountProc,
}

impl SetupStep {
    /// Every step, in the order it must run.
    pub const SEQUENCE: [Self; 6] = [
        Self::ChangeRoot,
        Self::EnterRoot,
        Self::SetHostname,
        Self::PrepareCgroup,
        Self::LimitProcesses,
        Self::MountProc,
    ];

    /// Short name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChangeRoot => "chroot",
            Self::EnterRoot => "chdir",
            Self::SetHostname => "sethostname",
            Self::PrepareCgroup => "mkdir-cgroup",
            Self::LimitProcesses => "limit-processes",
            Self::MountProc => "mount-proc",
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Container-side view of a run: the spec plus where its paths resolve.
#[derive(Debug)]
pub struct ContainerEntry<'a> {
    spec: &'a ContainerSpec,
    layout: &'a ContainerLayout,
    fs_root: Option<PathBuf>,
}

impl<'a> ContainerEntry<'a> {
    /// Creates an entry whose layout paths resolve against `/`, i.e. the
    /// confined root once [`SetupStep::ChangeRoot`] has run.
    pub fn new(spec: &'a ContainerSpec, layout: &'a ContainerLayout) -> Self {
        Self {
            spec,
            layout,
            fs_root: None,
        }
    }

    #[cfg(test)]
    fn with_fs_root(spec: &'a ContainerSpec, layout: &'a ContainerLayout, fs_root: &Path) -> Self {
        Self {
            spec,
            layout,
            fs_root: Some(fs_root.to_path_buf()),
        }
    }

    fn resolve(&self, relative: &Path) -> PathBuf {
        match &self.fs_root {
            Some(fs_root) => fs_root.join(relative),
            None => ContainerSpec::container_path(relative),
        }
    }

    /// Runs a single setup step.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    pub fn run_step(&self, step: SetupStep) -> Result<()> {
        tracing::debug!(%step, "setup step");
        match step {
            SetupStep::ChangeRoot => chroot::change_root(self.spec.root()),
            SetupStep::EnterRoot => chroot::enter_root(),
            SetupStep::SetHostname => uts::set_hostname(self.spec.hostname()),
            SetupStep::PrepareCgroup => {
                PidsCgroup::create(self.resolve(&self.layout.cgroup_dir)).map(drop)
            }
            SetupStep::LimitProcesses => PidsCgroup::at(self.resolve(&self.layout.cgroup_dir))
                .limit(std::process::id(), self.spec.max_processes()),
            SetupStep::MountProc => mount::mount_proc(&self.resolve(&self.layout.proc_dir)),
        }
    }

    /// Runs every setup step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    pub fn setup(&self) -> Result<()> {
        for step in SetupStep::SEQUENCE {
            self.run_step(step)?;
        }
        Ok(())
    }

    /// Sets up the container and replaces the process image with the target.
    ///
    /// Only returns on failure.
    ///
    /// # Errors
    ///
    /// Returns the first setup error, or [`MiniboxError::Exec`] if
    /// `execv(2)` fails.
    pub fn run(&self, program: &CStr, argv: &[CString]) -> Result<Infallible> {
        self.setup()?;
        tracing::debug!(program = %self.spec.program().display(), "exec");
        exec(program, argv).map_err(|source| MiniboxError::Exec {
            program: self.spec.program().to_path_buf(),
            source,
        })
    }

    /// Clone callback body. Returns the child's exit status on failure.
    pub(crate) fn enter(&self, program: &CStr, argv: &[CString]) -> isize {
        match self.run(program, argv) {
            Ok(never) => match never {},
            Err(err) => {
                tracing::error!(operation = err.operation(), "{err}");
                1
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn exec(program: &CStr, argv: &[CString]) -> std::io::Result<Infallible> {
    nix::unistd::execv(program, argv).map_err(std::io::Error::from)
}

#[cfg(not(target_os = "linux"))]
fn exec(_program: &CStr, _argv: &[CString]) -> std::io::Result<Infallible> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    fn spec_in(root: &Path, max: u32) -> ContainerSpec {
        ContainerSpec::new(
            root,
            "sandbox",
            NonZeroU32::new(max).expect("non-zero"),
            "/bin/true",
            vec![],
        )
        .expect("spec")
    }

    #[test]
    fn confinement_precedes_cgroup_and_mount() {
        let position = |step| {
            SetupStep::SEQUENCE
                .iter()
                .position(|s| *s == step)
                .expect("step in sequence")
        };
        assert_eq!(position(SetupStep::ChangeRoot), 0);
        assert!(position(SetupStep::EnterRoot) < position(SetupStep::SetHostname));
        assert!(position(SetupStep::SetHostname) < position(SetupStep::PrepareCgroup));
        assert!(position(SetupStep::PrepareCgroup) < position(SetupStep::LimitProcesses));
        assert!(position(SetupStep::LimitProcesses) < position(SetupStep::MountProc));
    }

    #[test]
    fn cgroup_steps_write_the_ceiling_under_the_root() {
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path(), 10);
        let layout = ContainerLayout::default();
        let entry = ContainerEntry::with_fs_root(&spec, &layout, root.path());

        entry.run_step(SetupStep::PrepareCgroup).expect("prepare");
        entry.run_step(SetupStep::LimitProcesses).expect("limit");

        let dir = root.path().join("sys/fs/cgroup/pids");
        let read = |name: &str| std::fs::read_to_string(dir.join(name)).expect(name);
        assert_eq!(read("pids.max"), "10");
        assert_eq!(read("cgroup.procs"), std::process::id().to_string());
        assert_eq!(read("notify_on_release"), "1");
    }

    #[test]
    fn prepare_cgroup_twice_is_harmless() {
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path(), 3);
        let layout = ContainerLayout::default();
        let entry = ContainerEntry::with_fs_root(&spec, &layout, root.path());

        entry.run_step(SetupStep::PrepareCgroup).expect("first");
        entry.run_step(SetupStep::PrepareCgroup).expect("second");
    }

    #[test]
    fn limit_without_prepare_fails() {
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path(), 3);
        let layout = ContainerLayout::default();
        let entry = ContainerEntry::with_fs_root(&spec, &layout, root.path());

        let err = entry.run_step(SetupStep::LimitProcesses).unwrap_err();
        assert!(matches!(err, MiniboxError::CgroupWrite { .. }));
    }

    #[test]
    fn custom_layout_is_honoured() {
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path(), 4);
        let layout = ContainerLayout {
            cgroup_root: PathBuf::from("run"),
            cgroup_dir: PathBuf::from("run/minibox/pids"),
            ..ContainerLayout::default()
        };
        let entry = ContainerEntry::with_fs_root(&spec, &layout, root.path());

        entry.run_step(SetupStep::PrepareCgroup).expect("prepare");
        entry.run_step(SetupStep::LimitProcesses).expect("limit");
        assert!(root.path().join("run/minibox/pids/pids.max").is_file());
        assert!(!root.path().join("sys").exists());
    }

    #[test]
    fn confined_paths_resolve_against_the_new_root() {
        let root = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(root.path(), 10);
        let layout = ContainerLayout::default();
        let entry = ContainerEntry::new(&spec, &layout);

        assert_eq!(
            entry.resolve(&layout.cgroup_dir),
            PathBuf::from("/sys/fs/cgroup/pids")
        );
        assert_eq!(entry.resolve(&layout.proc_dir), PathBuf::from("/proc"));
    }
}
