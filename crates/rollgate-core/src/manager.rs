//! Rule manager: the namespace-scoped rule registry plus two-tier resolution
//!
//! Resolution order on (re)initialization:
//! 1. Global config blob (`<config_dir>/<namespace>[_client].json`)
//! 2. Instance scope blob (same file name, inside the active instance)
//!
//! Scope entries equal to their global counterpart are not recorded as scope
//! overrides.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rollgate_types::config_store::{ConfigLocation, ConfigStore, read_or_create};
use rollgate_types::value::candidate_from_json;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::codec::CodecRegistry;
use crate::declaration::{Environment, RuleDeclaration};
use crate::descriptor::RuleDescriptor;
use crate::notify::{ChangeContext, ChangeNotifier, ChangeOrigin, RuleChange};
use crate::prelude::*;

pub type ConfigMap = HashMap<Box<str>, RuleValue>;

pub struct RuleManager {
	namespace: Box<str>,
	environment: Environment,
	store: Arc<dyn ConfigStore>,
	codecs: CodecRegistry,
	rules: BTreeMap<Box<str>, Arc<RuleDescriptor>>,
	categories: Vec<Box<str>>,
	global_config: ConfigMap,
	scope_config: ConfigMap,
	instance: Option<Box<str>>,
	notifier: ChangeNotifier,
}

impl RuleManager {
	/// Create a manager owning the `namespace` config files of `environment`
	pub fn new(
		namespace: impl Into<Box<str>>,
		environment: Environment,
		store: Arc<dyn ConfigStore>,
	) -> Self {
		Self {
			namespace: namespace.into(),
			environment,
			store,
			codecs: CodecRegistry::new(),
			rules: BTreeMap::new(),
			categories: Vec::new(),
			global_config: HashMap::new(),
			scope_config: HashMap::new(),
			instance: None,
			notifier: ChangeNotifier::default(),
		}
	}

	/// Use a custom codec registry for rules registered from now on
	pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
		self.codecs = codecs;
		self
	}

	/// Capacity of the change broadcast channel
	pub fn with_notify_buffer(mut self, buffer_size: usize) -> Self {
		self.notifier = ChangeNotifier::new(buffer_size);
		self
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn environment(&self) -> Environment {
		self.environment
	}

	pub fn codecs(&self) -> &CodecRegistry {
		&self.codecs
	}

	/// `<namespace>.json`, or `<namespace>_client.json` for the client environment
	pub fn config_file_name(&self) -> String {
		let suffix = if self.environment.is_client() { "_client" } else { "" };
		format!("{}{}.json", self.namespace, suffix)
	}

	fn global_location(&self) -> ConfigLocation {
		ConfigLocation::global(self.config_file_name())
	}

	fn scope_location(&self) -> ClResult<ConfigLocation> {
		let instance = self.instance.as_deref().ok_or(Error::NoActiveInstance)?;
		Ok(ConfigLocation::instance(instance, self.config_file_name()))
	}

	// Registration
	//**************

	/// Build and add a declaration group under `namespace`
	///
	/// The group is all-or-nothing: if any declaration fails to build, none of
	/// the group's rules are added.
	pub fn register(
		&mut self,
		namespace: &str,
		declarations: impl IntoIterator<Item = RuleDeclaration>,
	) -> ClResult<usize> {
		let mut built = Vec::new();
		for decl in declarations {
			let name = decl.name().to_string();
			match RuleDescriptor::from_declaration(namespace, decl, &self.codecs) {
				Ok(rule) => built.push(rule),
				Err(err) => {
					error!("Failed to register rule {}:{}: {}", namespace, name, err);
					return Err(err);
				}
			}
		}

		let count = built.len();
		for rule in built {
			self.add_rule(rule);
		}
		info!("Registered {} rule(s) from {} into {}", count, namespace, self.config_file_name());
		Ok(count)
	}

	/// Add a built descriptor, replacing (and returning) any rule with the same key
	pub fn add_rule(&mut self, rule: RuleDescriptor) -> Option<Arc<RuleDescriptor>> {
		for category in rule.categories() {
			if !self.categories.contains(category) {
				self.categories.push(category.clone());
			}
		}
		let key: Box<str> = rule.key().into();
		let replaced = self.rules.insert(key, Arc::new(rule));
		if let Some(old) = &replaced {
			warn!("Rule {} of {} replaced by a later registration", old.key(), old.namespace());
		}
		replaced
	}

	pub fn get(&self, key: &str) -> Option<&Arc<RuleDescriptor>> {
		self.rules.get(key)
	}

	/// Like [`get`](Self::get) but fails with `UnknownKey`
	pub fn rule(&self, key: &str) -> ClResult<&Arc<RuleDescriptor>> {
		self.rules.get(key).ok_or_else(|| Error::UnknownKey(key.into()))
	}

	/// Rules ordered by key
	pub fn rules(&self) -> impl Iterator<Item = &Arc<RuleDescriptor>> {
		self.rules.values()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Every category seen, in first-registration order
	pub fn categories(&self) -> &[Box<str>] {
		&self.categories
	}

	// Resolution
	//************

	/// Apply a global blob and record the applied values
	pub fn apply_global(&mut self, blob: &Map<String, Value>) {
		let applied = self.apply_blob(blob, ChangeOrigin::GlobalConfig);
		self.global_config.extend(applied);
	}

	/// Apply a scope blob, recording only values that diverge from global
	pub fn apply_scope(&mut self, blob: &Map<String, Value>) {
		let applied = self.apply_blob(blob, ChangeOrigin::ScopeConfig);
		for (key, value) in applied {
			if self.global_config.get(&key) == Some(&value) {
				continue;
			}
			self.scope_config.insert(key, value);
		}
	}

	fn apply_blob(&self, blob: &Map<String, Value>, origin: ChangeOrigin) -> ConfigMap {
		let mut applied = HashMap::new();
		for (key, raw) in blob {
			let Some(rule) = self.rules.get(key.as_str()) else {
				warn!("{}({}) not exist.", key, raw);
				continue;
			};
			let Some(candidate) = candidate_from_json(raw) else {
				warn!("Ignoring {}: structured value {} is not supported", key, raw);
				continue;
			};
			match self.mutate(rule, &candidate, origin) {
				Ok(value) => {
					applied.insert(key.as_str().into(), value);
				}
				Err(err) => warn!("Ignoring {}({}): {}", key, raw, err),
			}
		}
		applied
	}

	/// Reload global config only, leaving no instance active
	pub fn init_global(&mut self) -> ClResult<()> {
		let global = read_or_create(self.store.as_ref(), &self.global_location())?;

		self.instance = None;
		self.global_config.clear();
		self.scope_config.clear();
		self.apply_global(&global);
		info!("Loaded {} global value(s) from {}", self.global_config.len(), self.global_location());
		Ok(())
	}

	/// Make `instance` active and re-resolve global then scope config
	pub fn reinit(&mut self, instance: impl Into<Box<str>>) -> ClResult<()> {
		let instance = instance.into();
		let global_location = self.global_location();
		let scope_location = ConfigLocation::instance(instance.clone(), self.config_file_name());
		let global = read_or_create(self.store.as_ref(), &global_location)?;
		let scope = read_or_create(self.store.as_ref(), &scope_location)?;

		self.instance = Some(instance);
		self.global_config.clear();
		self.scope_config.clear();
		self.apply_global(&global);
		self.apply_scope(&scope);
		info!(
			"Reinitialized {}: {} global value(s), {} scope override(s)",
			scope_location,
			self.global_config.len(),
			self.scope_config.len()
		);
		Ok(())
	}

	/// Re-run initialization for the active instance (or global only if none)
	pub fn reload(&mut self) -> ClResult<()> {
		match self.instance.clone() {
			Some(instance) => self.reinit(instance),
			None => self.init_global(),
		}
	}

	pub fn active_instance(&self) -> Option<&str> {
		self.instance.as_deref()
	}

	/// Values applied from the global blob, by key
	pub fn global_config(&self) -> &ConfigMap {
		&self.global_config
	}

	/// Scope values diverging from global, by key
	pub fn scope_config(&self) -> &ConfigMap {
		&self.scope_config
	}

	pub fn global_value(&self, key: &str) -> Option<&RuleValue> {
		self.global_config.get(key)
	}

	pub fn scope_value(&self, key: &str) -> Option<&RuleValue> {
		self.scope_config.get(key)
	}

	/// The value a reset returns to: scope, else global, else declared default
	pub fn baseline(&self, key: &str) -> ClResult<RuleValue> {
		let rule = self.rule(key)?;
		Ok(self
			.scope_config
			.get(key)
			.or_else(|| self.global_config.get(key))
			.unwrap_or_else(|| rule.default_value())
			.clone())
	}

	// Mutation
	//**********

	fn mutate(
		&self,
		rule: &Arc<RuleDescriptor>,
		candidate: &str,
		origin: ChangeOrigin,
	) -> ClResult<RuleValue> {
		let (old, new) = rule.apply(candidate)?;
		if old != new {
			debug!("Rule {} changed {} -> {} ({:?})", rule.key(), old, new, origin);
			self.notifier.notify(RuleChange {
				rule: Arc::clone(rule),
				old,
				new: new.clone(),
				context: ChangeContext {
					environment: self.environment,
					origin,
					instance: self.instance.clone(),
				},
			});
		}
		Ok(new)
	}

	/// Validate, decode and write a new live value
	///
	/// Does not persist anything; on failure the live value is left untouched.
	pub fn set_value(&self, key: &str, candidate: &str) -> ClResult<RuleValue> {
		let rule = self.rule(key)?;
		self.mutate(rule, candidate, ChangeOrigin::Direct)
	}

	/// Return a rule to its baseline value
	pub fn reset_value(&self, key: &str) -> ClResult<RuleValue> {
		let rule = self.rule(key)?;
		let baseline = rule.encode(&self.baseline(key)?);
		self.mutate(rule, &baseline, ChangeOrigin::Direct)
	}

	/// Record a scope override and persist the scope map
	///
	/// The live value is not touched, only what future resets and
	/// initializations treat as the scope baseline.
	pub fn set_scope_override(&mut self, key: &str, value: RuleValue) -> ClResult<()> {
		let location = self.scope_location()?;
		let rule = self.rule(key)?;
		if value.value_type() != rule.value_type() {
			return Err(Error::ValidationFailed(format!(
				"{} expects a {} value, got {}",
				key,
				rule.value_type(),
				value.value_type()
			)));
		}

		if !value.is_finite() {
			return Err(Error::ValidationFailed(format!("{} can not hold {}", key, value)));
		}

		let key: Box<str> = rule.key().into();
		let mut scope = self.scope_config.clone();
		scope.insert(key, value);
		let content = serde_json::to_string_pretty(&self.serialize_scope(&scope))?;
		self.store.write(&location, &content)?;
		self.scope_config = scope;
		info!("Saved {} scope override(s) to {}", self.scope_config.len(), location);
		Ok(())
	}

	/// Validate a candidate string and record it as scope override
	pub fn set_scope_default(&mut self, key: &str, candidate: &str) -> ClResult<RuleValue> {
		let value = self.rule(key)?.check(candidate)?;
		self.set_scope_override(key, value.clone())?;
		Ok(value)
	}

	fn serialize_scope(&self, scope: &ConfigMap) -> Map<String, Value> {
		let mut map = Map::new();
		for (key, value) in scope {
			let json = match self.rules.get(key) {
				Some(rule) if !rule.codec().is_builtin() => Value::String(rule.encode(value)),
				_ => value.to_json(),
			};
			map.insert(key.to_string(), json);
		}
		map
	}

	// Change notification
	//*********************

	pub fn on_change<F>(&mut self, value_type: ValueType, listener: F)
	where
		F: Fn(&RuleChange) + Send + Sync + 'static,
	{
		self.notifier.on_change(value_type, listener);
	}

	pub fn on_any_change<F>(&mut self, listener: F)
	where
		F: Fn(&RuleChange) + Send + Sync + 'static,
	{
		self.notifier.on_any_change(listener);
	}

	pub fn subscribe(&self) -> broadcast::Receiver<RuleChange> {
		self.notifier.subscribe()
	}
}

impl std::fmt::Debug for RuleManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RuleManager")
			.field("namespace", &self.namespace)
			.field("environment", &self.environment)
			.field("rules", &self.rules.len())
			.field("categories", &self.categories)
			.field("instance", &self.instance)
			.field("notifier", &self.notifier)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cell::RuleCell;
	use crate::memory_store::MemoryConfigStore;
	use crate::validator::ValidatorSpec;

	fn manager(store: Arc<MemoryConfigStore>) -> RuleManager {
		RuleManager::new("rolling_gate", Environment::Server, store)
	}

	#[test]
	fn test_config_file_name() {
		let store = Arc::new(MemoryConfigStore::new());
		assert_eq!(manager(Arc::clone(&store)).config_file_name(), "rolling_gate.json");
		let client = RuleManager::new("rolling_gate", Environment::Client, store);
		assert_eq!(client.config_file_name(), "rolling_gate_client.json");
	}

	#[test]
	fn test_register_group_is_atomic() {
		let mut mgr = manager(Arc::new(MemoryConfigStore::new()));
		let good = RuleCell::new(true);
		let bad = RuleCell::new(vec![String::new()]);

		let result = mgr.register(
			"rolling_gate",
			[RuleDeclaration::new("enabled", &good), RuleDeclaration::new("items", &bad)],
		);
		assert!(matches!(result, Err(Error::UnsupportedType { .. })));
		assert!(mgr.is_empty());
		assert!(mgr.get("enabled").is_none());
	}

	#[test]
	fn test_categories_dedup_in_order() {
		let mut mgr = manager(Arc::new(MemoryConfigStore::new()));
		let a = RuleCell::new(true);
		let b = RuleCell::new(1_i32);
		mgr.register(
			"rolling_gate",
			[
				RuleDeclaration::new("a", &a).categories(["tool", "client"]),
				RuleDeclaration::new("b", &b).categories(["client", "bugfix"]),
			],
		)
		.unwrap();
		let categories: Vec<&str> = mgr.categories().iter().map(AsRef::as_ref).collect();
		assert_eq!(categories, ["tool", "client", "bugfix"]);
	}

	#[test]
	fn test_set_value_unknown_key() {
		let mgr = manager(Arc::new(MemoryConfigStore::new()));
		assert!(matches!(mgr.set_value("nope", "1"), Err(Error::UnknownKey(_))));
	}

	#[test]
	fn test_scope_override_needs_instance() {
		let mut mgr = manager(Arc::new(MemoryConfigStore::new()));
		let cell = RuleCell::new(1_i32);
		mgr.register("rolling_gate", [RuleDeclaration::new("distance", &cell)]).unwrap();
		assert!(matches!(
			mgr.set_scope_override("distance", RuleValue::Int(2)),
			Err(Error::NoActiveInstance)
		));
	}

	#[test]
	fn test_scope_override_type_mismatch() {
		let store = Arc::new(MemoryConfigStore::new());
		let mut mgr = manager(Arc::clone(&store));
		let cell = RuleCell::new(1_i32);
		mgr.register("rolling_gate", [RuleDeclaration::new("distance", &cell)]).unwrap();
		mgr.reinit("world").unwrap();
		assert!(matches!(
			mgr.set_scope_override("distance", RuleValue::Long(2)),
			Err(Error::ValidationFailed(_))
		));
	}

	#[test]
	fn test_reset_value() {
		let store = Arc::new(
			MemoryConfigStore::new()
				.with_blob(ConfigLocation::global("rolling_gate.json"), r#"{"distance": 12}"#),
		);
		let mut mgr = manager(store);
		let cell = RuleCell::new(0_i32);
		mgr.register(
			"rolling_gate",
			[RuleDeclaration::new("distance", &cell).validator(ValidatorSpec::range(0.0, 32.0))],
		)
		.unwrap();
		mgr.reinit("world").unwrap();
		assert_eq!(cell.get(), 12);

		mgr.set_value("distance", "32").unwrap();
		assert_eq!(cell.get(), 32);
		assert_eq!(mgr.reset_value("distance").unwrap(), RuleValue::Int(12));
		assert_eq!(cell.get(), 12);

		mgr.set_scope_default("distance", "16").unwrap();
		assert_eq!(cell.get(), 12);
		assert_eq!(mgr.reset_value("distance").unwrap(), RuleValue::Int(16));
	}

	#[test]
	fn test_init_global_without_instance() {
		let store = Arc::new(
			MemoryConfigStore::new()
				.with_blob(ConfigLocation::global("rolling_gate.json"), r#"{"enabled": false}"#),
		);
		let mut mgr = manager(store);
		let cell = RuleCell::new(true);
		mgr.register("rolling_gate", [RuleDeclaration::new("enabled", &cell)]).unwrap();

		mgr.reload().unwrap();
		assert!(!cell.get());
		assert_eq!(mgr.active_instance(), None);
		assert_eq!(mgr.global_value("enabled"), Some(&RuleValue::Bool(false)));
	}
}

// vim: ts=4
