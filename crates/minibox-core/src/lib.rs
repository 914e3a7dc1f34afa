//! # minibox-core
//!
//! Low-level Linux isolation primitives for the minibox launcher.
//!
//! This crate provides thin wrappers over:
//! - **Namespaces**: the PID, UTS, and mount namespaces requested at clone time.
//! - **Cgroups**: the pids controller used to cap the container's process count.
//! - **Filesystem**: chroot confinement and the private proc mount.
//!
//! Every wrapper reports failures as a [`minibox_common::error::MiniboxError`]
//! naming the operation and path involved.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cgroup;
pub mod filesystem;
pub mod namespace;
