//! In-memory config store, for tests and embedders without durable storage

use parking_lot::RwLock;
use std::collections::HashMap;

use rollgate_types::config_store::{ConfigLocation, ConfigStore};

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
	blobs: RwLock<HashMap<ConfigLocation, String>>,
}

impl MemoryConfigStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed a blob
	pub fn with_blob(self, location: ConfigLocation, content: impl Into<String>) -> Self {
		self.blobs.write().insert(location, content.into());
		self
	}

	pub fn get(&self, location: &ConfigLocation) -> Option<String> {
		self.blobs.read().get(location).cloned()
	}

	pub fn len(&self) -> usize {
		self.blobs.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.blobs.read().is_empty()
	}
}

impl ConfigStore for MemoryConfigStore {
	fn read(&self, location: &ConfigLocation) -> ClResult<Option<String>> {
		Ok(self.get(location))
	}

	fn write(&self, location: &ConfigLocation, content: &str) -> ClResult<()> {
		debug!("Writing {} bytes to {}", content.len(), location);
		self.blobs.write().insert(location.clone(), content.to_string());
		Ok(())
	}
}

// vim: ts=4
