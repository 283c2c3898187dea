//! Shared types, persistence traits, and core utilities for the RollingGate rule engine.
//!
//! This crate contains the foundational types that are shared between the
//! engine crate and the storage adapter implementations.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod config_store;
pub mod error;
pub mod prelude;
pub mod utils;
pub mod value;

// vim: ts=4
