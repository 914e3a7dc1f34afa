//! Stack memory for the isolated process.
//!
//! The buffer is lent to the kernel's clone machinery. [`crate::process::spawn_isolated`]
//! borrows it mutably for as long as the returned child handle lives, and
//! the handle is only consumed by the blocking wait, so the stack cannot be
//! released or reused while the child may still be starting.

use minibox_common::error::{MiniboxError, Result};

/// Fixed-size stack buffer owned by the launcher.
#[derive(Debug)]
pub struct ExecutionStack {
    buf: Box<[u8]>,
}

impl ExecutionStack {
    /// Allocates a zeroed stack of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MiniboxError::Allocation`] if the memory cannot be reserved.
    pub fn allocate(size: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| MiniboxError::Allocation { size })?;
        buf.resize(size, 0);
        tracing::debug!(size, "execution stack allocated");
        Ok(Self {
            buf: buf.into_boxed_slice(),
        })
    }

    /// Stack size in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the stack has zero length.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Mutable view handed to `clone(2)`.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Frees the stack once the child has been reaped.
    pub fn release(self) {
        tracing::debug!(size = self.buf.len(), "execution stack released");
        drop(self.buf);
    }
}
