//! Single-container lifecycle for the minibox launcher.
//!
//! [`launcher::Launcher`] clones [`entry::ContainerEntry`] into fresh
//! namespaces on an [`stack::ExecutionStack`], waits for it, and hands
//! over to [`cleanup::teardown`].

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cleanup;
pub mod entry;
pub mod launcher;
pub mod process;
pub mod spec;
pub mod stack;

pub use launcher::Launcher;
pub use process::{ChildExit, ExitReport};
pub use spec::ContainerSpec;
