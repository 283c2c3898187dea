//! Error type shared by every RollingGate crate

use crate::value::ValueType;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	// declaration errors (fatal for the contribution that caused them)
	/// The declared storage cell can not be written by the engine
	NotMutable(Box<str>),
	/// The declared host type maps to no supported value type
	UnsupportedType { name: Box<str>, host_type: Box<str> },
	/// Serialized key does not match `^[a-z][a-z0-9_]*$`
	InvalidKey(Box<str>),

	// runtime errors
	/// A candidate value was rejected, carries the validator's reason
	ValidationFailed(String),
	UnknownKey(Box<str>),
	/// Attempt to replace a built-in codec
	CodecLocked(ValueType),
	/// Scope storage was requested before any instance was initialized
	NoActiveInstance,
	ConfigError(String),
	Parse(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for errors raised while turning a declaration into a descriptor
	pub fn is_declaration_error(&self) -> bool {
		matches!(
			self,
			Error::NotMutable(_) | Error::UnsupportedType { .. } | Error::InvalidKey(_)
		)
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotMutable(name) => write!(f, "Field {} is not a mutable rule cell", name),
			Error::UnsupportedType { name, host_type } => write!(
				f,
				"Field {} has unsupported type, this type can only be bool, i8, i16, i32, i64, f32, f64, String, but got {}",
				name, host_type
			),
			Error::InvalidKey(key) => write!(f, "Invalid serialize string {}", key),
			Error::ValidationFailed(reason) => write!(f, "Validation failed: {}", reason),
			Error::UnknownKey(key) => write!(f, "Unknown rule: {}", key),
			Error::CodecLocked(value_type) => {
				write!(f, "Built-in codec for {} can not be overridden", value_type)
			}
			Error::NoActiveInstance => write!(f, "No instance scope has been initialized"),
			Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
			Error::Parse(msg) => write!(f, "Parse error: {}", msg),
			Error::Io(err) => write!(f, "Failed to access rolling gate config file: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_declaration_error_classification() {
		assert!(Error::NotMutable("a".into()).is_declaration_error());
		assert!(Error::InvalidKey("A".into()).is_declaration_error());
		assert!(
			Error::UnsupportedType { name: "a".into(), host_type: "Vec<i32>".into() }
				.is_declaration_error()
		);
		assert!(!Error::ValidationFailed("no".into()).is_declaration_error());
		assert!(!Error::UnknownKey("a".into()).is_declaration_error());
	}

	#[test]
	fn test_io_conversion() {
		let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
		assert!(matches!(err, Error::Io(_)));
		assert!(std::error::Error::source(&err).is_some());
	}
}

// vim: ts=4
