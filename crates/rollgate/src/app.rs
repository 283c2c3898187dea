//! Gate builder - wires config storage, rule managers and contributors

use std::path::PathBuf;
use std::sync::Arc;

use rollgate_config_adapter_fs::FsConfigStore;
use rollgate_core::{CodecRegistry, Environment, RuleChange, RuleDeclaration, RuleManager};
use rollgate_types::config_store::ConfigStore;

use crate::contributor::RuleContributor;
use crate::distance::{DistanceHost, bind_distance_host};
use crate::opts::GateOpts;
use crate::prelude::*;
use crate::rules::{BuiltinRules, GATE_NAMESPACE};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() -> ClResult<()> {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.try_init()
		.map_err(|err| Error::ConfigError(format!("Failed to install tracing subscriber: {}", err)))
}

pub struct GateBuilder {
	opts: GateOpts,
	store: Option<Arc<dyn ConfigStore>>,
	codecs: Option<CodecRegistry>,
	contributors: Vec<Arc<dyn RuleContributor>>,
}

impl GateBuilder {
	pub fn new() -> Self {
		GateBuilder {
			opts: GateOpts::default(),
			store: None,
			codecs: None,
			contributors: Vec::new(),
		}
	}

	// Opts
	pub fn opts(&mut self, opts: GateOpts) -> &mut Self {
		self.opts = opts;
		self
	}
	pub fn config_dir(&mut self, config_dir: impl Into<PathBuf>) -> &mut Self {
		self.opts.config_dir = config_dir.into();
		self
	}
	pub fn instance_root(&mut self, instance_root: impl Into<PathBuf>) -> &mut Self {
		self.opts.instance_root = instance_root.into();
		self
	}
	pub fn notify_buffer(&mut self, notify_buffer: usize) -> &mut Self {
		self.opts.notify_buffer = notify_buffer;
		self
	}

	/// Use a config store instead of the filesystem one built from the opts
	pub fn store(&mut self, store: Arc<dyn ConfigStore>) -> &mut Self {
		self.store = Some(store);
		self
	}
	pub fn codecs(&mut self, codecs: CodecRegistry) -> &mut Self {
		self.codecs = Some(codecs);
		self
	}
	pub fn contributor(&mut self, contributor: impl RuleContributor + 'static) -> &mut Self {
		self.contributors.push(Arc::new(contributor));
		self
	}

	/// Register the built-in and contributed rules, then load the client's global config
	pub fn build(&self) -> ClResult<Gate> {
		info!("RollingGate V{}", VERSION);
		let store: Arc<dyn ConfigStore> = match &self.store {
			Some(store) => Arc::clone(store),
			None => Arc::new(FsConfigStore::new(
				self.opts.config_dir.clone().into(),
				self.opts.instance_root.clone().into(),
			)?),
		};

		let manager = |environment| {
			let manager = RuleManager::new(GATE_NAMESPACE, environment, Arc::clone(&store))
				.with_notify_buffer(self.opts.notify_buffer);
			match &self.codecs {
				Some(codecs) => manager.with_codecs(codecs.clone()),
				None => manager,
			}
		};
		let mut server = manager(Environment::Server);
		let mut client = manager(Environment::Client);

		let builtin = BuiltinRules::new();
		server.register(GATE_NAMESPACE, builtin.server_rules())?;
		client.register(GATE_NAMESPACE, builtin.client_rules())?;

		for contributor in &self.contributors {
			contribute(&mut server, contributor.namespace(), contributor.load_server_rules());
			contribute(&mut client, contributor.namespace(), contributor.load_client_rules());
		}

		client.init_global()?;

		Ok(Gate { opts: self.opts.clone(), builtin, server, client })
	}
}

impl Default for GateBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Register one contribution, a failing one is logged and left out
fn contribute(manager: &mut RuleManager, namespace: &str, rules: ClResult<Vec<RuleDeclaration>>) {
	let environment = manager.environment();
	let rules = match rules {
		Ok(rules) => rules,
		Err(err) => {
			error!("Failed to load {:?} rules of {}: {}", environment, namespace, err);
			return;
		}
	};
	if rules.is_empty() {
		return;
	}
	for decl in &rules {
		if decl.environment() != environment {
			warn!(
				"Rule {}:{} is declared {:?} but contributed as {:?}",
				namespace,
				decl.name(),
				decl.environment(),
				environment
			);
		}
	}
	if let Err(err) = manager.register(namespace, rules) {
		error!("Skipping {:?} rules of {}: {}", environment, namespace, err);
	}
}

#[derive(Debug)]
pub struct Gate {
	opts: GateOpts,
	builtin: BuiltinRules,
	server: RuleManager,
	client: RuleManager,
}

impl Gate {
	pub fn builder() -> GateBuilder {
		GateBuilder::new()
	}

	pub fn opts(&self) -> &GateOpts {
		&self.opts
	}

	/// Cells of the gate's own rules
	pub fn builtin(&self) -> &BuiltinRules {
		&self.builtin
	}

	pub fn server(&self) -> &RuleManager {
		&self.server
	}

	pub fn server_mut(&mut self) -> &mut RuleManager {
		&mut self.server
	}

	pub fn client(&self) -> &RuleManager {
		&self.client
	}

	pub fn client_mut(&mut self) -> &mut RuleManager {
		&mut self.client
	}

	pub fn manager(&self, environment: Environment) -> &RuleManager {
		match environment {
			Environment::Server => &self.server,
			Environment::Client => &self.client,
		}
	}

	pub fn manager_mut(&mut self, environment: Environment) -> &mut RuleManager {
		match environment {
			Environment::Server => &mut self.server,
			Environment::Client => &mut self.client,
		}
	}

	/// An instance was loaded: resolve server rules against its scope config
	pub fn start_instance(&mut self, instance: &str) -> ClResult<()> {
		info!("Starting instance {}", instance);
		self.server.reinit(instance)
	}

	/// Re-read every config blob
	pub fn reload(&mut self) -> ClResult<()> {
		self.server.reload()?;
		self.client.reload()
	}

	/// Forward changes of the distance rules to the host
	pub fn bind_distance_host(&mut self, host: Arc<dyn DistanceHost>) {
		bind_distance_host(&mut self.server, host);
	}

	/// Called whenever a server rule gating host commands changes
	pub fn on_permission_rule_change<F>(&mut self, listener: F)
	where
		F: Fn(&RuleChange) + Send + Sync + 'static,
	{
		self.server.on_any_change(move |change| {
			if change.rule.is_permission_rule() {
				listener(change);
			}
		});
	}
}

// vim: ts=4
