//! Rules owned by the gate itself

use rollgate_core::{Environment, RuleCell, RuleDeclaration, ValidatorSpec};

pub const GATE_NAMESPACE: &str = "rolling_gate";

pub const CATEGORY_BASE: &str = "base";
pub const CATEGORY_CREATIVE: &str = "creative";

const DISTANCE_HINTS: [&str; 4] = ["0", "12", "16", "32"];

/// Live cells of the built-in server rules
#[derive(Debug, Clone)]
pub struct BuiltinRules {
	pub language: RuleCell<String>,
	/// 0 (or 1) defers to the host's configured view distance
	pub view_distance: RuleCell<i32>,
	/// 0 (or 1) defers to the host's configured simulation distance
	pub simulation_distance: RuleCell<i32>,
}

impl BuiltinRules {
	pub fn new() -> Self {
		Self {
			language: RuleCell::new(String::from("zh_cn")),
			view_distance: RuleCell::new(0),
			simulation_distance: RuleCell::new(0),
		}
	}

	pub fn server_rules(&self) -> Vec<RuleDeclaration> {
		vec![
			RuleDeclaration::new("language", &self.language)
				.env(Environment::Server)
				.allowed(["zh_cn", "en_us"])
				.categories([CATEGORY_BASE])
				.validator(ValidatorSpec::one_of(["zh_cn", "en_us"])),
			distance_rule("viewDistance", &self.view_distance),
			distance_rule("simulationDistance", &self.simulation_distance),
		]
	}

	pub fn client_rules(&self) -> Vec<RuleDeclaration> {
		Vec::new()
	}
}

impl Default for BuiltinRules {
	fn default() -> Self {
		Self::new()
	}
}

fn distance_rule(name: &str, cell: &RuleCell<i32>) -> RuleDeclaration {
	RuleDeclaration::new(name, cell)
		.env(Environment::Server)
		.allowed(DISTANCE_HINTS)
		.categories([CATEGORY_CREATIVE])
		.validator(ValidatorSpec::range(0.0, 32.0))
}


// vim: ts=4
