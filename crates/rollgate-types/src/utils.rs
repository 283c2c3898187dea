//! Utility functions

use regex::Regex;
use std::sync::LazyLock;

use crate::prelude::*;

static KEY_PATTERN: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").ok());
static CAMEL_BOUNDARY: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"([a-z])([A-Z]+)").ok());

/// Convert a camelCase identifier to snake_case
///
/// # Examples
/// - `"viewDistance"` → `"view_distance"`
/// - `"antiCheatDisabled"` → `"anti_cheat_disabled"`
/// - `"language"` → `"language"`
pub fn case_to_snake(name: &str) -> String {
	match CAMEL_BOUNDARY.as_ref() {
		Some(re) => re.replace_all(name, "${1}_${2}").to_lowercase(),
		None => name.to_lowercase(),
	}
}

/// Check that a serialized rule key matches `^[a-z][a-z0-9_]*$`
pub fn check_key(key: &str) -> ClResult<()> {
	let valid = match KEY_PATTERN.as_ref() {
		Some(re) => re.is_match(key),
		None => false,
	};
	if valid { Ok(()) } else { Err(Error::InvalidKey(key.into())) }
}


// vim: ts=4
