//! Rule declarations supplied by contributing modules

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::cell::{CellSlot, RuleCell};
use crate::validator::ValidatorSpec;

/// Runtime context a rule applies to
///
/// Only used to route rules into the matching manager and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Environment {
	#[serde(rename = "client")]
	Client,
	#[default]
	#[serde(rename = "server")]
	Server,
}

impl Environment {
	pub fn is_client(&self) -> bool {
		*self == Environment::Client
	}

	pub fn is_server(&self) -> bool {
		*self == Environment::Server
	}
}

/// One named, typed storage cell plus its rule metadata
pub struct RuleDeclaration {
	pub(crate) name: Box<str>,
	pub(crate) slot: Arc<dyn CellSlot>,
	pub(crate) environment: Environment,
	pub(crate) key: Option<Box<str>>,
	pub(crate) allowed: Vec<Box<str>>,
	pub(crate) categories: Vec<Box<str>>,
	pub(crate) validators: Vec<ValidatorSpec>,
}

impl RuleDeclaration {
	/// Declare a rule over a cell, `name` is the declared variable name
	pub fn new<T: Clone + Send + Sync + 'static>(name: impl Into<Box<str>>, cell: &RuleCell<T>) -> Self {
		Self {
			name: name.into(),
			slot: cell.slot(),
			environment: Environment::default(),
			key: None,
			allowed: Vec::new(),
			categories: Vec::new(),
			validators: Vec::new(),
		}
	}

	/// Set the environment (defaults to Server)
	pub fn env(mut self, environment: Environment) -> Self {
		self.environment = environment;
		self
	}

	/// Override the serialized key (defaults to the snake_case name)
	pub fn key(mut self, key: impl Into<Box<str>>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Suggested values, not enforced unless a validator does so
	pub fn allowed<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		self.allowed.extend(values.into_iter().map(Into::into));
		self
	}

	pub fn categories<I, S>(mut self, categories: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		self.categories.extend(categories.into_iter().map(Into::into));
		self
	}

	/// Append a validator, validators run in declaration order
	pub fn validator(mut self, spec: ValidatorSpec) -> Self {
		self.validators.push(spec);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn environment(&self) -> Environment {
		self.environment
	}
}

impl Debug for RuleDeclaration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuleDeclaration")
			.field("name", &self.name)
			.field("host_type", &self.slot.host_type())
			.field("environment", &self.environment)
			.field("key", &self.key)
			.field("allowed", &self.allowed)
			.field("categories", &self.categories)
			.field("validators", &self.validators)
			.finish()
	}
}

// vim: ts=4
