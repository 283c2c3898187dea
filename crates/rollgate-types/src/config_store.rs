//! Adapter that reads and writes persisted rule configuration blobs.
//!
//! The engine only needs "read/write a text blob at a location"; where a location
//! lives (a directory, a database row, memory) is up to the adapter.

use std::fmt::{self, Debug};

use crate::prelude::*;

/// Which configuration tier a blob belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigTier {
	/// Shared defaults applied to every instance
	Global,
	/// Per-instance overrides, identified by an opaque instance id
	Instance(Box<str>),
}

/// Address of one configuration blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLocation {
	pub tier: ConfigTier,
	/// File name, e.g. `rolling_gate.json` or `rolling_gate_client.json`
	pub file_name: Box<str>,
}

impl ConfigLocation {
	pub fn global(file_name: impl Into<Box<str>>) -> Self {
		Self { tier: ConfigTier::Global, file_name: file_name.into() }
	}

	pub fn instance(instance: impl Into<Box<str>>, file_name: impl Into<Box<str>>) -> Self {
		Self { tier: ConfigTier::Instance(instance.into()), file_name: file_name.into() }
	}
}

impl fmt::Display for ConfigLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.tier {
			ConfigTier::Global => write!(f, "global:{}", self.file_name),
			ConfigTier::Instance(id) => write!(f, "instance[{}]:{}", id, self.file_name),
		}
	}
}

pub trait ConfigStore: Debug + Send + Sync {
	/// Reads a blob, `None` if it does not exist yet
	fn read(&self, location: &ConfigLocation) -> ClResult<Option<String>>;

	/// Writes (creates or replaces) a blob
	fn write(&self, location: &ConfigLocation, content: &str) -> ClResult<()>;
}

/// Parse a blob as a flat JSON object
pub fn parse_blob(
	location: &ConfigLocation,
	content: &str,
) -> ClResult<serde_json::Map<String, serde_json::Value>> {
	if content.trim().is_empty() {
		return Ok(serde_json::Map::new());
	}
	match serde_json::from_str::<serde_json::Value>(content)? {
		serde_json::Value::Object(map) => Ok(map),
		_ => Err(Error::Parse(format!("{} is not a JSON object", location))),
	}
}

/// Reads a blob; a missing blob is created as an empty document
pub fn read_or_create(
	store: &dyn ConfigStore,
	location: &ConfigLocation,
) -> ClResult<serde_json::Map<String, serde_json::Value>> {
	match store.read(location)? {
		Some(content) => parse_blob(location, &content),
		None => {
			debug!("Config {} does not exist, creating empty document", location);
			store.write(location, "{}")?;
			Ok(serde_json::Map::new())
		}
	}
}


// vim: ts=4
