//! Rule value model: the eight supported primitive kinds and their tagged union

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

use crate::prelude::*;

/// Value types a rule may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	Bool,
	Byte,
	Short,
	Int,
	Long,
	Float,
	Double,
	String,
}

impl ValueType {
	pub const ALL: [ValueType; 8] = [
		ValueType::Bool,
		ValueType::Byte,
		ValueType::Short,
		ValueType::Int,
		ValueType::Long,
		ValueType::Float,
		ValueType::Double,
		ValueType::String,
	];

	/// Map a host type name (as reported by `std::any::type_name`) to a value type
	pub fn from_host_type(type_name: &str) -> Option<ValueType> {
		match type_name {
			"bool" => Some(ValueType::Bool),
			"i8" => Some(ValueType::Byte),
			"i16" => Some(ValueType::Short),
			"i32" => Some(ValueType::Int),
			"i64" => Some(ValueType::Long),
			"f32" => Some(ValueType::Float),
			"f64" => Some(ValueType::Double),
			"alloc::string::String" | "String" => Some(ValueType::String),
			_ => None,
		}
	}

	pub fn is_numeric(&self) -> bool {
		!matches!(self, ValueType::Bool | ValueType::String)
	}

	pub fn name(&self) -> &'static str {
		match self {
			ValueType::Bool => "bool",
			ValueType::Byte => "byte",
			ValueType::Short => "short",
			ValueType::Int => "int",
			ValueType::Long => "long",
			ValueType::Float => "float",
			ValueType::Double => "double",
			ValueType::String => "string",
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A live rule value
///
/// Serializes as a bare JSON primitive, the type is known from the rule descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
	Bool(bool),
	Byte(i8),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	String(String),
}

impl RuleValue {
	pub fn value_type(&self) -> ValueType {
		match self {
			RuleValue::Bool(_) => ValueType::Bool,
			RuleValue::Byte(_) => ValueType::Byte,
			RuleValue::Short(_) => ValueType::Short,
			RuleValue::Int(_) => ValueType::Int,
			RuleValue::Long(_) => ValueType::Long,
			RuleValue::Float(_) => ValueType::Float,
			RuleValue::Double(_) => ValueType::Double,
			RuleValue::String(_) => ValueType::String,
		}
	}

	/// Parse the canonical string form of a value
	pub fn parse(value_type: ValueType, input: &str) -> ClResult<RuleValue> {
		fn num<T: std::str::FromStr>(value_type: ValueType, input: &str) -> ClResult<T> {
			input.trim().parse::<T>().map_err(|_| {
				Error::ValidationFailed(format!("'{}' is not a valid {}", input, value_type))
			})
		}

		Ok(match value_type {
			ValueType::Bool => match input {
				"true" => RuleValue::Bool(true),
				"false" => RuleValue::Bool(false),
				_ => Err(Error::ValidationFailed(format!("'{}' is not a valid bool", input)))?,
			},
			ValueType::Byte => RuleValue::Byte(num(value_type, input)?),
			ValueType::Short => RuleValue::Short(num(value_type, input)?),
			ValueType::Int => RuleValue::Int(num(value_type, input)?),
			ValueType::Long => RuleValue::Long(num(value_type, input)?),
			ValueType::Float => RuleValue::Float(num(value_type, input)?),
			ValueType::Double => RuleValue::Double(num(value_type, input)?),
			ValueType::String => RuleValue::String(input.to_string()),
		})
	}

	/// Numeric view used by range checks
	#[allow(clippy::cast_precision_loss)]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			RuleValue::Byte(v) => Some(f64::from(*v)),
			RuleValue::Short(v) => Some(f64::from(*v)),
			RuleValue::Int(v) => Some(f64::from(*v)),
			RuleValue::Long(v) => Some(*v as f64),
			RuleValue::Float(v) => Some(f64::from(*v)),
			RuleValue::Double(v) => Some(*v),
			RuleValue::Bool(_) | RuleValue::String(_) => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			RuleValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			RuleValue::String(s) => Some(s),
			_ => None,
		}
	}

	/// False for NaN and infinite floats, which JSON can not hold
	pub fn is_finite(&self) -> bool {
		match self {
			RuleValue::Float(v) => v.is_finite(),
			RuleValue::Double(v) => v.is_finite(),
			_ => true,
		}
	}

	pub fn to_json(&self) -> serde_json::Value {
		match self {
			// Shortest f32 form, going through f64 would add digits
			RuleValue::Float(v) => format!("{:?}", v)
				.parse::<serde_json::Number>()
				.map_or(serde_json::Value::Null, serde_json::Value::Number),
			_ => serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
		}
	}

	/// Read a host value of the given type
	pub fn from_any(value_type: ValueType, value: &dyn Any) -> Option<RuleValue> {
		match value_type {
			ValueType::Bool => value.downcast_ref::<bool>().map(|v| RuleValue::Bool(*v)),
			ValueType::Byte => value.downcast_ref::<i8>().map(|v| RuleValue::Byte(*v)),
			ValueType::Short => value.downcast_ref::<i16>().map(|v| RuleValue::Short(*v)),
			ValueType::Int => value.downcast_ref::<i32>().map(|v| RuleValue::Int(*v)),
			ValueType::Long => value.downcast_ref::<i64>().map(|v| RuleValue::Long(*v)),
			ValueType::Float => value.downcast_ref::<f32>().map(|v| RuleValue::Float(*v)),
			ValueType::Double => value.downcast_ref::<f64>().map(|v| RuleValue::Double(*v)),
			ValueType::String => value.downcast_ref::<String>().map(|v| RuleValue::String(v.clone())),
		}
	}

	/// Box the native value for writing into a host cell
	pub fn into_any(self) -> Box<dyn Any + Send> {
		match self {
			RuleValue::Bool(v) => Box::new(v),
			RuleValue::Byte(v) => Box::new(v),
			RuleValue::Short(v) => Box::new(v),
			RuleValue::Int(v) => Box::new(v),
			RuleValue::Long(v) => Box::new(v),
			RuleValue::Float(v) => Box::new(v),
			RuleValue::Double(v) => Box::new(v),
			RuleValue::String(v) => Box::new(v),
		}
	}
}

impl fmt::Display for RuleValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RuleValue::Bool(v) => write!(f, "{}", v),
			RuleValue::Byte(v) => write!(f, "{}", v),
			RuleValue::Short(v) => write!(f, "{}", v),
			RuleValue::Int(v) => write!(f, "{}", v),
			RuleValue::Long(v) => write!(f, "{}", v),
			RuleValue::Float(v) => write!(f, "{}", v),
			RuleValue::Double(v) => write!(f, "{}", v),
			RuleValue::String(v) => f.write_str(v),
		}
	}
}

/// Turn a persisted JSON primitive into a candidate string
///
/// Structured values (null, arrays, objects) are not supported and yield `None`.
pub fn candidate_from_json(value: &serde_json::Value) -> Option<String> {
	match value {
		serde_json::Value::String(s) => Some(s.clone()),
		serde_json::Value::Number(n) => Some(n.to_string()),
		serde_json::Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}


// vim: ts=4
