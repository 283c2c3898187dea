//! Codecs between native rule values and their canonical string form

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::prelude::*;

pub type EncodeFn = Arc<dyn Fn(&RuleValue) -> String + Send + Sync>;
pub type DecodeFn = Arc<dyn Fn(&str) -> ClResult<RuleValue> + Send + Sync>;

/// Bidirectional string conversion for one value type
#[derive(Clone)]
pub struct Codec {
	value_type: ValueType,
	encoder: EncodeFn,
	decoder: DecodeFn,
	builtin: bool,
}

impl Codec {
	/// The fixed codec of a value type
	pub fn builtin(value_type: ValueType) -> Self {
		Self {
			value_type,
			encoder: Arc::new(RuleValue::to_string),
			decoder: Arc::new(move |input| RuleValue::parse(value_type, input)),
			builtin: true,
		}
	}

	/// A host-supplied codec
	pub fn custom<D, E>(value_type: ValueType, decoder: D, encoder: E) -> Self
	where
		D: Fn(&str) -> ClResult<RuleValue> + Send + Sync + 'static,
		E: Fn(&RuleValue) -> String + Send + Sync + 'static,
	{
		Self { value_type, encoder: Arc::new(encoder), decoder: Arc::new(decoder), builtin: false }
	}

	pub fn value_type(&self) -> ValueType {
		self.value_type
	}

	pub fn is_builtin(&self) -> bool {
		self.builtin
	}

	pub fn encode(&self, value: &RuleValue) -> String {
		(self.encoder)(value)
	}

	pub fn decode(&self, input: &str) -> ClResult<RuleValue> {
		let value = (self.decoder)(input)?;
		if value.value_type() != self.value_type {
			return Err(Error::ValidationFailed(format!(
				"Codec for {} produced a {} value",
				self.value_type,
				value.value_type()
			)));
		}
		Ok(value)
	}
}

impl Debug for Codec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Codec")
			.field("value_type", &self.value_type)
			.field("builtin", &self.builtin)
			.finish()
	}
}

/// Value type -> codec lookup
///
/// This is the gate that limits which value types a rule may declare.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
	codecs: HashMap<ValueType, Codec>,
}

impl CodecRegistry {
	/// Empty registry, every lookup fails until codecs are registered
	pub fn empty() -> Self {
		Self { codecs: HashMap::new() }
	}

	/// Registry holding the built-in codec of every supported value type
	pub fn new() -> Self {
		let codecs = ValueType::ALL.iter().map(|vt| (*vt, Codec::builtin(*vt))).collect();
		Self { codecs }
	}

	/// Add or override the codec of a value type
	///
	/// Built-in codecs are locked and can not be replaced.
	pub fn register(&mut self, value_type: ValueType, codec: Codec) -> ClResult<()> {
		if codec.value_type() != value_type {
			return Err(Error::ConfigError(format!(
				"Codec for {} registered as {}",
				codec.value_type(),
				value_type
			)));
		}
		if self.codecs.get(&value_type).is_some_and(Codec::is_builtin) {
			return Err(Error::CodecLocked(value_type));
		}
		debug!("Registering {} codec for {}", if codec.is_builtin() { "built-in" } else { "custom" }, value_type);
		self.codecs.insert(value_type, codec);
		Ok(())
	}

	pub fn get(&self, value_type: ValueType) -> ClResult<&Codec> {
		self.codecs.get(&value_type).ok_or_else(|| Error::UnsupportedType {
			name: value_type.name().into(),
			host_type: value_type.name().into(),
		})
	}
}

impl Default for CodecRegistry {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
