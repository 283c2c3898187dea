//! Validators gating attempted rule mutations
//!
//! A validator is a predicate over `(current value, candidate string)` plus a
//! human-readable rejection reason. Rules compose them as an ordered chain:
//! every validator must pass, the first failure wins.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::codec::Codec;
use crate::prelude::*;

pub trait Validator: Debug + Send + Sync {
	fn validate(&self, old: &RuleValue, candidate: &str) -> bool;

	/// Why a rejected candidate was rejected
	fn reason(&self) -> String {
		"The input value is illegal!".into()
	}

	/// Whether this validator restricts values to permission tiers
	fn is_permission_tier(&self) -> bool {
		false
	}
}

/// Rejects empty strings
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyValidator;

impl Validator for NonEmptyValidator {
	fn validate(&self, _old: &RuleValue, candidate: &str) -> bool {
		!candidate.is_empty()
	}

	fn reason(&self) -> String {
		"The input value must not be empty!".into()
	}
}

/// Accepts only the literals `true` and `false`
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolValidator;

impl Validator for BoolValidator {
	fn validate(&self, _old: &RuleValue, candidate: &str) -> bool {
		candidate == "true" || candidate == "false"
	}

	fn reason(&self) -> String {
		"The input value must be true or false!".into()
	}
}

/// Numeric range check with independently inclusive bounds
///
/// The candidate is decoded with the rule's codec. Float rules compare in f32
/// against bounds narrowed to f32, everything else compares as f64.
#[derive(Debug, Clone)]
pub struct RangeValidator {
	codec: Codec,
	min: f64,
	max: f64,
	min_inclusive: bool,
	max_inclusive: bool,
}

impl RangeValidator {
	pub fn new(
		codec: Codec,
		min: f64,
		max: f64,
		min_inclusive: bool,
		max_inclusive: bool,
	) -> ClResult<Self> {
		if !codec.value_type().is_numeric() {
			return Err(Error::ConfigError(format!(
				"Range validator needs a numeric rule, got {}",
				codec.value_type()
			)));
		}
		if min.is_nan() || max.is_nan() || min > max {
			return Err(Error::ConfigError(format!("Invalid range {}..{}", min, max)));
		}
		Ok(Self { codec, min, max, min_inclusive, max_inclusive })
	}

	pub fn range(&self) -> (f64, f64) {
		(self.min, self.max)
	}

	fn within<T: PartialOrd>(&self, value: T, min: T, max: T) -> bool {
		let above = if self.min_inclusive { value >= min } else { value > min };
		let below = if self.max_inclusive { value <= max } else { value < max };
		above && below
	}
}

impl Validator for RangeValidator {
	#[allow(clippy::cast_possible_truncation)]
	fn validate(&self, _old: &RuleValue, candidate: &str) -> bool {
		match self.codec.decode(candidate) {
			Ok(RuleValue::Float(value)) => self.within(value, self.min as f32, self.max as f32),
			Ok(value) => value.as_f64().is_some_and(|value| self.within(value, self.min, self.max)),
			Err(_) => false,
		}
	}

	fn reason(&self) -> String {
		format!(
			"The input value must be between {} and {}{}!",
			self.min,
			self.max,
			match (self.min_inclusive, self.max_inclusive) {
				(true, true) => "",
				(false, false) => " (exclusive)",
				(true, false) => " (max exclusive)",
				(false, true) => " (min exclusive)",
			}
		)
	}
}

/// Accepts non-empty values out of a fixed set
#[derive(Debug, Clone)]
pub struct InSetValidator {
	values: Vec<Box<str>>,
}

impl InSetValidator {
	pub fn new<I, S>(values: I) -> ClResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		let values: Vec<Box<str>> = values.into_iter().map(Into::into).collect();
		if values.is_empty() {
			return Err(Error::ConfigError("Set validator needs at least one value".into()));
		}
		Ok(Self { values })
	}

	pub fn values(&self) -> &[Box<str>] {
		&self.values
	}
}

impl Validator for InSetValidator {
	fn validate(&self, _old: &RuleValue, candidate: &str) -> bool {
		!candidate.is_empty() && self.values.iter().any(|v| v.as_ref() == candidate)
	}

	fn reason(&self) -> String {
		format!("The input value must be in the set: [{}]!", self.values.join(", "))
	}
}

/// Permission tier named by a rule value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionTier {
	/// `true`: anyone
	Everyone,
	/// `false`: nobody
	Nobody,
	/// `1`..`4`, `ops` is level 2
	Level(u8),
}

impl PermissionTier {
	/// Every value a permission rule accepts
	pub const VALUES: [&'static str; 7] = ["ops", "true", "false", "1", "2", "3", "4"];

	pub fn parse(value: &str) -> Option<PermissionTier> {
		match value {
			"true" => Some(PermissionTier::Everyone),
			"false" => Some(PermissionTier::Nobody),
			"ops" => Some(PermissionTier::Level(2)),
			"1" => Some(PermissionTier::Level(1)),
			"2" => Some(PermissionTier::Level(2)),
			"3" => Some(PermissionTier::Level(3)),
			"4" => Some(PermissionTier::Level(4)),
			_ => None,
		}
	}

	/// Whether a caller holding `level` passes this tier
	pub fn allows(&self, level: u8) -> bool {
		match self {
			PermissionTier::Everyone => true,
			PermissionTier::Nobody => false,
			PermissionTier::Level(required) => level >= *required,
		}
	}

	/// Resolve a rule value directly; unknown values allow nobody
	pub fn check(value: &str, level: u8) -> bool {
		PermissionTier::parse(value).is_some_and(|tier| tier.allows(level))
	}
}

/// Restricts a string rule to permission tier values
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionValidator;

impl Validator for PermissionValidator {
	fn validate(&self, _old: &RuleValue, candidate: &str) -> bool {
		PermissionTier::parse(candidate).is_some()
	}

	fn reason(&self) -> String {
		format!("The input value must be in the set: [{}]!", PermissionTier::VALUES.join(", "))
	}

	fn is_permission_tier(&self) -> bool {
		true
	}
}

pub type ValidatorFactory =
	Arc<dyn Fn(ValueType) -> ClResult<Arc<dyn Validator>> + Send + Sync>;

/// A declared validator, instantiated when the rule is built
#[derive(Clone)]
pub enum ValidatorSpec {
	NonEmpty,
	Bool,
	Range { min: f64, max: f64, min_inclusive: bool, max_inclusive: bool },
	OneOf(Vec<Box<str>>),
	Permission,
	Custom(ValidatorFactory),
}

impl ValidatorSpec {
	/// Range with both bounds inclusive
	pub fn range(min: f64, max: f64) -> Self {
		ValidatorSpec::Range { min, max, min_inclusive: true, max_inclusive: true }
	}

	pub fn range_with(min: f64, max: f64, min_inclusive: bool, max_inclusive: bool) -> Self {
		ValidatorSpec::Range { min, max, min_inclusive, max_inclusive }
	}

	pub fn one_of<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Box<str>>,
	{
		ValidatorSpec::OneOf(values.into_iter().map(Into::into).collect())
	}

	pub fn custom<F>(factory: F) -> Self
	where
		F: Fn(ValueType) -> ClResult<Arc<dyn Validator>> + Send + Sync + 'static,
	{
		ValidatorSpec::Custom(Arc::new(factory))
	}

	/// Wrap a ready validator instance
	pub fn instance<V: Validator + Clone + 'static>(validator: V) -> Self {
		Self::custom(move |_| Ok(Arc::new(validator.clone()) as Arc<dyn Validator>))
	}

	/// Build the validator for a rule using `codec`
	pub fn instantiate(&self, codec: &Codec) -> ClResult<Arc<dyn Validator>> {
		let value_type = codec.value_type();
		let require = |expected: ValueType, what: &str| {
			if value_type == expected {
				Ok(())
			} else {
				Err(Error::ConfigError(format!(
					"{} validator needs a {} rule, got {}",
					what, expected, value_type
				)))
			}
		};

		let validator: Arc<dyn Validator> = match self {
			ValidatorSpec::NonEmpty => {
				require(ValueType::String, "Non-empty")?;
				Arc::new(NonEmptyValidator)
			}
			ValidatorSpec::Bool => {
				require(ValueType::Bool, "Boolean")?;
				Arc::new(BoolValidator)
			}
			ValidatorSpec::Range { min, max, min_inclusive, max_inclusive } => Arc::new(
				RangeValidator::new(codec.clone(), *min, *max, *min_inclusive, *max_inclusive)?,
			),
			ValidatorSpec::OneOf(values) => {
				require(ValueType::String, "Set")?;
				Arc::new(InSetValidator::new(values.iter().cloned())?)
			}
			ValidatorSpec::Permission => {
				require(ValueType::String, "Permission")?;
				Arc::new(PermissionValidator)
			}
			ValidatorSpec::Custom(factory) => factory(value_type)?,
		};
		Ok(validator)
	}
}

impl Debug for ValidatorSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValidatorSpec::NonEmpty => f.write_str("NonEmpty"),
			ValidatorSpec::Bool => f.write_str("Bool"),
			ValidatorSpec::Range { min, max, min_inclusive, max_inclusive } => f
				.debug_struct("Range")
				.field("min", min)
				.field("max", max)
				.field("min_inclusive", min_inclusive)
				.field("max_inclusive", max_inclusive)
				.finish(),
			ValidatorSpec::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
			ValidatorSpec::Permission => f.write_str("Permission"),
			ValidatorSpec::Custom(_) => f.write_str("Custom"),
		}
	}
}

/// Ordered validator composition of one rule
#[derive(Debug, Clone, Default)]
pub struct ValidatorChain {
	validators: Vec<Arc<dyn Validator>>,
}

impl ValidatorChain {
	pub fn new(validators: Vec<Arc<dyn Validator>>) -> Self {
		Self { validators }
	}

	/// Instantiate declared validators and inject the built-in fallbacks
	///
	/// A validator that fails to instantiate is logged and left out, the rule
	/// still registers with the remaining chain.
	pub fn build(rule: &str, codec: &Codec, specs: &[ValidatorSpec]) -> Self {
		let value_type = codec.value_type();
		let mut validators = Vec::with_capacity(specs.len() + 1);
		for spec in specs {
			match spec.instantiate(codec) {
				Ok(validator) => validators.push(validator),
				Err(err) => {
					warn!("Skipping validator {:?} of rule {}: {}", spec, rule, err);
				}
			}
		}

		match value_type {
			ValueType::Bool => validators.push(Arc::new(BoolValidator)),
			ValueType::String if validators.is_empty() => {
				validators.push(Arc::new(NonEmptyValidator));
			}
			_ => {}
		}

		Self { validators }
	}

	/// Run every validator in order, the first failure's reason is returned
	pub fn validate(&self, old: &RuleValue, candidate: &str) -> ClResult<()> {
		for validator in &self.validators {
			if !validator.validate(old, candidate) {
				return Err(Error::ValidationFailed(validator.reason()));
			}
		}
		Ok(())
	}

	pub fn has_permission_tier(&self) -> bool {
		self.validators.iter().any(|v| v.is_permission_tier())
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Validator>> {
		self.validators.iter()
	}

	pub fn len(&self) -> usize {
		self.validators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.validators.is_empty()
	}
}


// vim: ts=4
