//! RollingGate: runtime configuration rules for long-running hosts.
//!
//! # Features
//!
//! - Typed rules (bool, integers, floats, strings) declared over live cells
//! - Composable validators with human-readable rejection reasons
//! - Global config plus per-instance overrides, persisted as JSON
//! - Synchronous change listeners and a broadcast channel for async consumers
//! - Contributors registering rules under their own namespace

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export the engine and shared types
pub use rollgate_core as engine;
pub use rollgate_types::config_store;
pub use rollgate_types::error;
pub use rollgate_types::utils;
pub use rollgate_types::value;

pub use rollgate_config_adapter_fs::FsConfigStore;
pub use rollgate_core::{
	ChangeContext, ChangeOrigin, CodecRegistry, Environment, HintState, PermissionTier,
	RuleCell, RuleChange, RuleDeclaration, RuleInfo, RuleManager, ValidatorSpec,
};

// Local modules
pub mod app;
pub mod contributor;
pub mod distance;
pub mod opts;
pub mod prelude;
pub mod rules;

pub use crate::app::{Gate, GateBuilder, init_tracing};
pub use crate::contributor::RuleContributor;
pub use crate::distance::{DistanceHost, effective_distance};
pub use crate::opts::GateOpts;
pub use crate::rules::{BuiltinRules, GATE_NAMESPACE};

// vim: ts=4
