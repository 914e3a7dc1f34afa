//! Filesystem setup and teardown for container isolation.
//!
//! Provides chroot-style confinement and the private proc mount.

pub mod chroot;
pub mod mount;
