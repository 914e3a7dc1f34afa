//! Linux namespace selection for container isolation.
//!
//! A container gets fresh PID, UTS (hostname), and mount namespaces,
//! requested together when the isolated process is cloned.

pub mod uts;

/// Namespaces created for every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSet {
    /// Isolate the PID namespace; the container process becomes PID 1.
    pub pid: bool,
    /// Isolate the UTS namespace so the hostname change stays private.
    pub uts: bool,
    /// Isolate the mount namespace so the proc mount stays private.
    pub mount: bool,
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self {
            pid: true,
            uts: true,
            mount: true,
        }
    }
}

#[cfg(target_os = "linux")]
impl NamespaceSet {
    /// Returns the `clone(2)` flags that create these namespaces.
    #[must_use]
    pub fn clone_flags(self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        let mut flags = CloneFlags::empty();
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        flags
    }
}
