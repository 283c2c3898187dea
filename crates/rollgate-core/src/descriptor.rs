//! Rule descriptors: immutable rule metadata bound to a live storage cell

use std::fmt::{self, Debug};
use std::sync::Arc;

use rollgate_types::utils::{case_to_snake, check_key};

use crate::cell::CellSlot;
use crate::codec::{Codec, CodecRegistry};
use crate::declaration::{Environment, RuleDeclaration};
use crate::prelude::*;
use crate::validator::ValidatorChain;

pub struct RuleDescriptor {
	namespace: Box<str>,
	name: Box<str>,
	key: Box<str>,
	value_type: ValueType,
	environment: Environment,
	categories: Vec<Box<str>>,
	allowed: Vec<Box<str>>,
	validators: ValidatorChain,
	codec: Codec,
	default_value: RuleValue,
	slot: Arc<dyn CellSlot>,
}

impl RuleDescriptor {
	/// Build a descriptor out of a declaration
	///
	/// Fails with `NotMutable`, `UnsupportedType` or `InvalidKey`. Validators that
	/// fail to instantiate are skipped (see [`ValidatorChain::build`]).
	pub fn from_declaration(
		namespace: &str,
		decl: RuleDeclaration,
		codecs: &CodecRegistry,
	) -> ClResult<Self> {
		let RuleDeclaration { name, slot, environment, key, allowed, categories, validators } =
			decl;

		if !slot.is_writable() {
			return Err(Error::NotMutable(name));
		}

		let unsupported =
			|| Error::UnsupportedType { name: name.clone(), host_type: slot.host_type().into() };
		let value_type = ValueType::from_host_type(slot.host_type()).ok_or_else(unsupported)?;
		let codec = codecs.get(value_type).map_err(|_| unsupported())?.clone();

		let key: Box<str> = match key {
			Some(key) if !key.is_empty() => key,
			_ => case_to_snake(&name).into(),
		};
		check_key(&key)?;

		let validators = ValidatorChain::build(&key, &codec, &validators);
		let default_value = slot.load(value_type).ok_or_else(unsupported)?;

		debug!(
			"Built rule {}:{} ({}) with {} validator(s), default {}",
			namespace,
			key,
			value_type,
			validators.len(),
			default_value
		);

		Ok(Self {
			namespace: namespace.into(),
			name,
			key,
			value_type,
			environment,
			categories,
			allowed,
			validators,
			codec,
			default_value,
			slot,
		})
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Declared variable name
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Serialized key
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn value_type(&self) -> ValueType {
		self.value_type
	}

	pub fn environment(&self) -> Environment {
		self.environment
	}

	pub fn categories(&self) -> &[Box<str>] {
		&self.categories
	}

	pub fn in_category(&self, category: &str) -> bool {
		self.categories.iter().any(|c| c.as_ref() == category)
	}

	pub fn allowed(&self) -> &[Box<str>] {
		&self.allowed
	}

	pub fn validators(&self) -> &ValidatorChain {
		&self.validators
	}

	pub fn codec(&self) -> &Codec {
		&self.codec
	}

	/// Value captured from the cell at declaration time
	pub fn default_value(&self) -> &RuleValue {
		&self.default_value
	}

	/// Current live value
	pub fn value(&self) -> RuleValue {
		self.slot.load(self.value_type).unwrap_or_else(|| self.default_value.clone())
	}

	pub fn encode(&self, value: &RuleValue) -> String {
		self.codec.encode(value)
	}

	pub fn encoded_value(&self) -> String {
		self.encode(&self.value())
	}

	/// Rules restricted to permission tiers gate host commands
	pub fn is_permission_rule(&self) -> bool {
		self.validators.has_permission_tier()
	}

	pub fn name_translation_key(&self) -> String {
		format!("{}.rolling_gate.rule.{}", self.namespace, self.key)
	}

	pub fn description_translation_key(&self) -> String {
		format!("{}.rolling_gate.rule.{}.desc", self.namespace, self.key)
	}

	/// Validate against the live value and decode, without storing
	pub fn check(&self, candidate: &str) -> ClResult<RuleValue> {
		self.validators.validate(&self.value(), candidate)?;
		self.codec.decode(candidate)
	}

	/// Validate, decode and write into the cell, returns `(old, new)`
	pub(crate) fn apply(&self, candidate: &str) -> ClResult<(RuleValue, RuleValue)> {
		let old = self.value();
		self.validators.validate(&old, candidate)?;
		let new = self.codec.decode(candidate)?;
		if !self.slot.store(new.clone()) {
			return Err(Error::NotMutable(self.name.clone()));
		}
		Ok((old, new))
	}
}

impl Debug for RuleDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuleDescriptor")
			.field("namespace", &self.namespace)
			.field("key", &self.key)
			.field("value_type", &self.value_type)
			.field("environment", &self.environment)
			.field("categories", &self.categories)
			.field("allowed", &self.allowed)
			.field("validators", &self.validators.len())
			.field("default_value", &self.default_value)
			.finish()
	}
}


// vim: ts=4
