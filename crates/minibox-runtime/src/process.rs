//! Process spawning inside isolated namespaces.
//!
//! Clones a child onto a caller-supplied stack with fresh namespaces and
//! waits for it to terminate.

use std::fmt;
use std::marker::PhantomData;

use minibox_common::error::{MiniboxError, Result};
use minibox_core::namespace::NamespaceSet;

use crate::stack::ExecutionStack;

/// How the isolated process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Exited normally with this status code.
    Exited(i32),
    /// Killed by this signal number.
    Signaled(i32),
}

/// Outcome of a completed container run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Host-side PID of the isolated process.
    pub pid: i32,
    /// Termination status.
    pub exit: ChildExit,
}

impl ExitReport {
    /// Whether the child exited with status zero.
    pub const fn success(&self) -> bool {
        matches!(self.exit, ChildExit::Exited(0))
    }

    /// Exit status for the launcher, following the shell convention of
    /// `128 + signal` for signalled children.
    pub fn exit_code(&self) -> u8 {
        match self.exit {
            ChildExit::Exited(code) => u8::try_from(code).unwrap_or(1),
            ChildExit::Signaled(signal) => u8::try_from(128 + signal).unwrap_or(u8::MAX),
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled(signal) => write!(f, "killed by signal {signal}"),
        }
    }
}

/// A running isolated process.
///
/// Holds the borrow of the [`ExecutionStack`] it was started on until
/// [`IsolatedChild::wait`] confirms termination.
#[derive(Debug)]
#[must_use = "the child must be waited on before its stack is released"]
pub struct IsolatedChild<'stack> {
    pid: i32,
    _stack: PhantomData<&'stack mut [u8]>,
}

/// Starts `body` as a new process inside `namespaces`, running on `stack`.
///
/// The child receives a copy of the caller's address space, so `body` may
/// read anything it captured. Its return value becomes the child's exit
/// status. `SIGCHLD` is delivered to the caller when it terminates.
///
/// # Errors
///
/// Returns [`MiniboxError::Spawn`] if `clone(2)` fails.
#[cfg(target_os = "linux")]
pub fn spawn_isolated<'stack, 'body, F>(
    stack: &'stack mut ExecutionStack,
    namespaces: NamespaceSet,
    body: F,
) -> Result<IsolatedChild<'stack>>
where
    F: FnMut() -> isize + 'body,
{
    use nix::sched::{CloneCb, clone};
    use nix::sys::signal::Signal;

    let callback: CloneCb<'body> = Box::new(body);
    // SAFETY: no CLONE_VM, so the child runs on its own copy of the address
    // space. The stack stays mutably borrowed by the returned handle until
    // the child has been reaped.
    let pid = unsafe {
        clone(
            callback,
            stack.as_mut_slice(),
            namespaces.clone_flags(),
            Some(Signal::SIGCHLD as libc::c_int),
        )
    }
    .map_err(|e| MiniboxError::Spawn { source: e.into() })?;

    tracing::info!(pid = pid.as_raw(), ?namespaces, "isolated process started");
    Ok(IsolatedChild {
        pid: pid.as_raw(),
        _stack: PhantomData,
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn spawn_isolated<'stack, 'body, F>(
    _stack: &'stack mut ExecutionStack,
    _namespaces: NamespaceSet,
    _body: F,
) -> Result<IsolatedChild<'stack>>
where
    F: FnMut() -> isize + 'body,
{
    Err(MiniboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}

#[cfg(target_os = "linux")]
impl IsolatedChild<'_> {
    /// Blocks until the child terminates.
    ///
    /// There is no timeout. Interrupted waits and stop/continue
    /// notifications are retried.
    ///
    /// # Errors
    ///
    /// Returns [`MiniboxError::Wait`] if `waitpid(2)` fails.
    pub fn wait(self) -> Result<ExitReport> {
        use nix::errno::Errno;
        use nix::sys::wait::{WaitStatus, waitpid};
        use nix::unistd::Pid;

        let pid = Pid::from_raw(self.pid);
        loop {
            let exit = match waitpid(pid, None) {
                Ok(WaitStatus::Exited(_, code)) => ChildExit::Exited(code),
                Ok(WaitStatus::Signaled(_, signal, _)) => ChildExit::Signaled(signal as i32),
                Ok(status) => {
                    tracing::debug!(?status, "child not yet terminated");
                    continue;
                }
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    return Err(MiniboxError::Wait {
                        pid: self.pid,
                        source: e.into(),
                    });
                }
            };
            tracing::info!(pid = self.pid, %exit, "isolated process terminated");
            return Ok(ExitReport {
                pid: self.pid,
                exit,
            });
        }
    }
}

#[cfg(not(target_os = "linux"))]
impl IsolatedChild<'_> {
    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error: namespaces require Linux.
    pub fn wait(self) -> Result<ExitReport> {
        Err(MiniboxError::Config {
            message: "Linux required for native container operations".into(),
        })
    }
}
