//! # minibox-common
//!
//! Error taxonomy, configuration model, and constants shared by every
//! crate in the minibox workspace.
//!
//! This crate is the leaf of the dependency graph and performs no
//! privileged operations of its own.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
