//! Rule registration tests

use std::sync::Arc;

use rollgate_core::{
	Codec, CodecRegistry, Environment, MemoryConfigStore, RuleCell, RuleDeclaration, RuleManager,
	ValidatorSpec,
};
use rollgate_types::config_store::ConfigLocation;
use rollgate_types::error::Error;
use rollgate_types::value::{RuleValue, ValueType};

fn create_test_manager() -> RuleManager {
	RuleManager::new("rolling_gate", Environment::Server, Arc::new(MemoryConfigStore::new()))
}

#[test]
fn test_colliding_key_last_registration_wins() {
	let mut manager = create_test_manager();
	let first = RuleCell::new(1_i32);
	let second = RuleCell::new(2_i64);

	manager
		.register("first_mod", [RuleDeclaration::new("sharedRule", &first)])
		.expect("Failed to register first group");
	manager
		.register("second_mod", [RuleDeclaration::new("shared_rule", &second)])
		.expect("Failed to register second group");

	assert_eq!(manager.len(), 1);
	let rule = manager.get("shared_rule").expect("Rule missing");
	assert_eq!(rule.namespace(), "second_mod");
	assert_eq!(rule.value_type(), ValueType::Long);

	manager.set_value("shared_rule", "5").expect("Failed to set value");
	assert_eq!(second.get(), 5);
	assert_eq!(first.get(), 1);
}

#[test]
fn test_unsupported_type_adds_nothing() {
	let mut manager = create_test_manager();
	let list = RuleCell::new(vec![1_i32, 2]);

	let result = manager.register("rolling_gate", [RuleDeclaration::new("distances", &list)]);
	match result {
		Err(err @ Error::UnsupportedType { .. }) => assert!(err.is_declaration_error()),
		other => panic!("unexpected {:?}", other),
	}
	assert!(manager.is_empty());
	assert!(manager.categories().is_empty());
}

#[test]
fn test_declaration_errors() {
	let mut manager = create_test_manager();
	let constant = RuleCell::constant(true);
	let cell = RuleCell::new(true);

	assert!(matches!(
		manager.register("rolling_gate", [RuleDeclaration::new("locked", &constant)]),
		Err(Error::NotMutable(_))
	));
	assert!(matches!(
		manager.register("rolling_gate", [RuleDeclaration::new("flag", &cell).key("9flag")]),
		Err(Error::InvalidKey(_))
	));
	assert!(manager.is_empty());
}

#[test]
fn test_default_value_is_captured_at_declaration() {
	let mut manager = create_test_manager();
	let cell = RuleCell::new(String::from("zh_cn"));
	manager
		.register("rolling_gate", [RuleDeclaration::new("language", &cell)])
		.expect("Failed to register");

	manager.set_value("language", "en_us").expect("Failed to set value");
	let rule = manager.get("language").expect("Rule missing");
	assert_eq!(rule.default_value(), &RuleValue::String("zh_cn".into()));
	assert_eq!(rule.value(), RuleValue::String("en_us".into()));
}

#[test]
fn test_broken_validator_does_not_block_rule() {
	let mut manager = create_test_manager();
	let cell = RuleCell::new(true);
	manager
		.register(
			"rolling_gate",
			[RuleDeclaration::new("flag", &cell).validator(ValidatorSpec::range(0.0, 1.0))],
		)
		.expect("Broken validator must not fail registration");

	// Only the injected bool-literal check remains
	assert!(manager.set_value("flag", "false").is_ok());
	assert!(matches!(manager.set_value("flag", "no"), Err(Error::ValidationFailed(_))));
}

#[test]
fn test_custom_codec_round_trip_through_scope_blob() {
	let mut codecs = CodecRegistry::empty();
	codecs
		.register(
			ValueType::Int,
			Codec::custom(
				ValueType::Int,
				|s| {
					let digits = s.strip_prefix("0x").ok_or_else(|| {
						Error::ValidationFailed(format!("'{}' is not a hex literal", s))
					})?;
					i32::from_str_radix(digits, 16)
						.map(RuleValue::Int)
						.map_err(|_| Error::ValidationFailed(format!("'{}' is not a hex literal", s)))
				},
				|v| match v {
					RuleValue::Int(n) => format!("{:#x}", n),
					other => other.to_string(),
				},
			),
		)
		.expect("Failed to register codec");

	let store = Arc::new(MemoryConfigStore::new());
	let mut manager = RuleManager::new("rolling_gate", Environment::Server, store.clone())
		.with_codecs(codecs);
	let mask = RuleCell::new(0_i32);
	manager
		.register("rolling_gate", [RuleDeclaration::new("channelMask", &mask)])
		.expect("Failed to register");
	manager.reinit("world").expect("Failed to reinit");

	manager.set_value("channel_mask", "0xff").expect("Failed to set value");
	assert_eq!(mask.get(), 255);
	assert!(matches!(manager.set_value("channel_mask", "255"), Err(Error::ValidationFailed(_))));

	manager.set_scope_override("channel_mask", RuleValue::Int(16)).expect("Failed to set override");
	let written = store.get(&ConfigLocation::instance("world", "rolling_gate.json")).expect("Missing");
	let json: serde_json::Value = serde_json::from_str(&written).expect("Not JSON");
	assert_eq!(json, serde_json::json!({"channel_mask": "0x10"}));

	manager.reinit("world").expect("Failed to reinit");
	assert_eq!(mask.get(), 16);

	// Without a bool codec, bool rules are unsupported
	let flag = RuleCell::new(true);
	assert!(matches!(
		manager.register("rolling_gate", [RuleDeclaration::new("flag", &flag)]),
		Err(Error::UnsupportedType { .. })
	));
}

#[test]
fn test_custom_codec_feeds_range_validator() {
	let mut codecs = CodecRegistry::empty();
	codecs
		.register(
			ValueType::Int,
			Codec::custom(
				ValueType::Int,
				|s| {
					let digits = s.strip_prefix("0x").unwrap_or(s);
					i32::from_str_radix(digits, 16)
						.map(RuleValue::Int)
						.map_err(|_| Error::ValidationFailed(format!("'{}' is not a hex literal", s)))
				},
				|v| match v {
					RuleValue::Int(n) => format!("{:#x}", n),
					other => other.to_string(),
				},
			),
		)
		.expect("Failed to register codec");

	let mut manager = create_test_manager().with_codecs(codecs);
	let mask = RuleCell::new(0_i32);
	manager
		.register(
			"rolling_gate",
			[RuleDeclaration::new("mask", &mask).validator(ValidatorSpec::range(0.0, 255.0))],
		)
		.expect("Failed to register");

	manager.set_value("mask", "0x10").expect("Failed to set mask");
	assert_eq!(mask.get(), 16);
	manager.set_value("mask", "0xff").expect("Upper bound is inclusive");
	assert_eq!(mask.get(), 255);
	assert!(matches!(manager.set_value("mask", "0x100"), Err(Error::ValidationFailed(_))));
	assert_eq!(mask.get(), 255);
}

// vim: ts=4
