//! A complete run of a real program inside a minimal root filesystem.
//!
//! The root holds a copy of `/bin/sh` and the shared libraries `ldd`
//! reports for it. The shell records what it sees from inside, then the
//! host view is checked once the launcher returns.
//!
//! Needs root for namespaces, chroot, and mount; returns early otherwise.
//! Kept alone in its binary so no other test thread runs while the
//! container is cloned.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::num::NonZeroU32;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use minibox_common::config::MiniboxConfig;
use minibox_runtime::{ChildExit, ContainerSpec, Launcher};

const SHELL: &str = "/bin/sh";

const SCRIPT: &str = "read h < /proc/sys/kernel/hostname; \
                      read m < /sys/fs/cgroup/pids/pids.max; \
                      echo \"$h $$ $m\" > /report";

fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn install(root: &Path, host_path: &Path) {
    let dest = root.join(host_path.strip_prefix("/").expect("absolute path"));
    std::fs::create_dir_all(dest.parent().expect("parent")).expect("mkdir");
    let _ = std::fs::copy(host_path, &dest).expect("copy into rootfs");
}

/// Copies the shell and its libraries to the same paths under `root`.
fn build_rootfs(root: &Path) {
    install(root, Path::new(SHELL));
    // A static shell has no libraries and `ldd` fails on it.
    let listing = Command::new("ldd")
        .arg(SHELL)
        .output()
        .ok()
        .filter(|output| output.status.success());
    if let Some(output) = listing {
        let listing = String::from_utf8_lossy(&output.stdout);
        for lib in listing.split_whitespace().filter(|t| t.starts_with('/')) {
            install(root, Path::new(lib));
        }
    }
    std::fs::create_dir(root.join("proc")).expect("proc dir");
}

fn mounted_under(root: &Path) -> bool {
    let mountinfo = std::fs::read_to_string("/proc/self/mountinfo").expect("mountinfo");
    let root = root.to_string_lossy();
    mountinfo
        .lines()
        .filter_map(|line| line.split_whitespace().nth(4))
        .any(|mount_point| mount_point.starts_with(root.as_ref()))
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn program_runs_confined_and_leaves_no_trace() {
    if !is_root() || !Path::new(SHELL).exists() {
        return;
    }
    let root = tempfile::tempdir().expect("tempdir");
    build_rootfs(root.path());
    let canonical_root = root.path().canonicalize().expect("canonical root");
    let host_hostname = nix::unistd::gethostname().expect("hostname");

    let spec = ContainerSpec::new(
        root.path(),
        "sandbox",
        NonZeroU32::new(10).expect("non-zero"),
        SHELL,
        vec!["-c".into(), SCRIPT.into()],
    )
    .expect("spec");
    let launcher = Launcher::new(MiniboxConfig::default()).expect("launcher");

    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let report =
        tracing::subscriber::with_default(subscriber, || launcher.run(spec)).expect("run");

    assert_eq!(report.exit, ChildExit::Exited(0));
    assert!(report.success());

    let seen = std::fs::read_to_string(root.path().join("report")).expect("report file");
    assert_eq!(seen.trim(), "sandbox 1 10");
    assert_eq!(nix::unistd::gethostname().expect("hostname"), host_hostname);

    assert!(root.path().join("bin/sh").is_file());
    assert!(root.path().join("sys").is_dir());
    assert!(!root.path().join("sys/fs").exists());
    assert!(!root.path().join("proc/self").exists());
    assert!(!mounted_under(&canonical_root));

    let logs = String::from_utf8(captured.0.lock().expect("lock").clone()).expect("utf8");
    let finished = logs
        .lines()
        .find(|line| line.contains("container finished"))
        .expect("finish line");
    assert!(finished.contains("cgroup_removed=true"));
    assert!(finished.contains("proc_unmounted="));
}
