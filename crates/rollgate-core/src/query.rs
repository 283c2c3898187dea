//! Read-side surface for host command dispatchers and UIs

use serde::Serialize;

use crate::declaration::Environment;
use crate::descriptor::RuleDescriptor;
use crate::manager::RuleManager;
use crate::prelude::*;

/// Translation key of a category name
pub fn category_translation_key(category: &str) -> String {
	format!("rolling_gate.category.{}", category)
}

/// How an allowed value relates to the rule's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HintState {
	/// Equals the current value
	Selected,
	/// Equals the baseline (scope, else global, else declared default)
	Default,
	Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
	pub value: Box<str>,
	pub state: HintState,
}

/// Snapshot of one rule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInfo {
	pub namespace: Box<str>,
	pub key: Box<str>,
	pub name: Box<str>,
	pub value_type: ValueType,
	pub environment: Environment,
	pub current: RuleValue,
	pub default: RuleValue,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub global: Option<RuleValue>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<RuleValue>,
	pub categories: Vec<Box<str>>,
	pub hints: Vec<Hint>,
	pub name_key: String,
	pub description_key: String,
	pub permission: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
	pub name: Box<str>,
	pub translation_key: String,
	pub rules: usize,
}

impl RuleManager {
	fn info(&self, rule: &RuleDescriptor) -> RuleInfo {
		let current = rule.value();
		let global = self.global_value(rule.key()).cloned();
		let scope = self.scope_value(rule.key()).cloned();

		let selected = rule.encode(&current);
		let baseline = rule.encode(
			scope.as_ref().or(global.as_ref()).unwrap_or_else(|| rule.default_value()),
		);
		let hints = rule
			.allowed()
			.iter()
			.map(|value| {
				let state = if value.as_ref() == selected {
					HintState::Selected
				} else if value.as_ref() == baseline {
					HintState::Default
				} else {
					HintState::Other
				};
				Hint { value: value.clone(), state }
			})
			.collect();

		RuleInfo {
			namespace: rule.namespace().into(),
			key: rule.key().into(),
			name: rule.name().into(),
			value_type: rule.value_type(),
			environment: rule.environment(),
			current,
			default: rule.default_value().clone(),
			global,
			scope,
			categories: rule.categories().to_vec(),
			hints,
			name_key: rule.name_translation_key(),
			description_key: rule.description_translation_key(),
			permission: rule.is_permission_rule(),
		}
	}

	/// Every rule, ordered by key
	pub fn list(&self) -> Vec<RuleInfo> {
		self.rules().map(|rule| self.info(rule)).collect()
	}

	pub fn describe(&self, key: &str) -> ClResult<RuleInfo> {
		let rule = self.rule(key)?;
		Ok(self.info(rule))
	}

	pub fn rules_in_category(&self, category: &str) -> Vec<RuleInfo> {
		self.rules().filter(|rule| rule.in_category(category)).map(|rule| self.info(rule)).collect()
	}

	pub fn category_infos(&self) -> Vec<CategoryInfo> {
		self.categories()
			.iter()
			.map(|name| CategoryInfo {
				name: name.clone(),
				translation_key: category_translation_key(name),
				rules: self.rules().filter(|rule| rule.in_category(name)).count(),
			})
			.collect()
	}
}


// vim: ts=4
