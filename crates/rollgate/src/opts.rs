//! Runtime options

use serde::Deserialize;
use std::path::PathBuf;

use crate::prelude::*;

pub const ENV_CONFIG_DIR: &str = "ROLLGATE_CONFIG_DIR";
pub const ENV_INSTANCE_ROOT: &str = "ROLLGATE_INSTANCE_ROOT";
pub const ENV_NOTIFY_BUFFER: &str = "ROLLGATE_NOTIFY_BUFFER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateOpts {
	/// Directory holding the global config blobs
	pub config_dir: PathBuf,
	/// Directory holding one sub-directory per instance
	pub instance_root: PathBuf,
	/// Capacity of each manager's change broadcast channel
	pub notify_buffer: usize,
}

impl Default for GateOpts {
	fn default() -> Self {
		Self {
			config_dir: PathBuf::from("./config"),
			instance_root: PathBuf::from("./instances"),
			notify_buffer: 64,
		}
	}
}

impl GateOpts {
	/// Read options from `ROLLGATE_*` environment variables
	pub fn from_env() -> ClResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Read options through an arbitrary variable lookup, unset variables keep their defaults
	pub fn from_lookup<F>(lookup: F) -> ClResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut opts = Self::default();
		if let Some(dir) = lookup(ENV_CONFIG_DIR) {
			opts.config_dir = PathBuf::from(dir);
		}
		if let Some(dir) = lookup(ENV_INSTANCE_ROOT) {
			opts.instance_root = PathBuf::from(dir);
		}
		if let Some(buffer) = lookup(ENV_NOTIFY_BUFFER) {
			opts.notify_buffer = buffer.trim().parse().map_err(|_| {
				Error::ConfigError(format!("{} must be a positive integer, got {:?}", ENV_NOTIFY_BUFFER, buffer))
			})?;
		}
		if opts.notify_buffer == 0 {
			return Err(Error::ConfigError(format!("{} must be a positive integer", ENV_NOTIFY_BUFFER)));
		}
		Ok(opts)
	}
}


// vim: ts=4
