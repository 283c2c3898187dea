//! Change notification
//!
//! Listeners run synchronously right after a successful write, before the
//! mutating call returns. Async consumers can additionally subscribe to a
//! broadcast channel carrying the same events.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::declaration::Environment;
use crate::descriptor::RuleDescriptor;
use crate::prelude::*;

pub type ChangeListener = Arc<dyn Fn(&RuleChange) + Send + Sync>;

/// What triggered a value change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOrigin {
	/// Applying the global config blob
	GlobalConfig,
	/// Applying the instance scope blob
	ScopeConfig,
	/// An explicit `set_value` call
	Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContext {
	pub environment: Environment,
	pub origin: ChangeOrigin,
	/// Active instance, if any
	pub instance: Option<Box<str>>,
}

/// One observed value change
#[derive(Debug, Clone)]
pub struct RuleChange {
	pub rule: Arc<RuleDescriptor>,
	pub old: RuleValue,
	pub new: RuleValue,
	pub context: ChangeContext,
}

impl RuleChange {
	pub fn key(&self) -> &str {
		self.rule.key()
	}
}

pub struct ChangeNotifier {
	typed: HashMap<ValueType, Vec<ChangeListener>>,
	any: Vec<ChangeListener>,
	tx: broadcast::Sender<RuleChange>,
}

impl ChangeNotifier {
	pub fn new(buffer_size: usize) -> Self {
		let (tx, _rx) = broadcast::channel(buffer_size.max(1));
		Self { typed: HashMap::new(), any: Vec::new(), tx }
	}

	/// Listen for changes of rules holding `value_type` values
	pub fn on_change<F>(&mut self, value_type: ValueType, listener: F)
	where
		F: Fn(&RuleChange) + Send + Sync + 'static,
	{
		self.typed.entry(value_type).or_default().push(Arc::new(listener));
	}

	pub fn on_any_change<F>(&mut self, listener: F)
	where
		F: Fn(&RuleChange) + Send + Sync + 'static,
	{
		self.any.push(Arc::new(listener));
	}

	pub fn subscribe(&self) -> broadcast::Receiver<RuleChange> {
		self.tx.subscribe()
	}

	pub fn listener_count(&self) -> usize {
		self.typed.values().map(Vec::len).sum::<usize>() + self.any.len()
	}

	/// Dispatch a change to typed listeners, catch-all listeners, then subscribers
	pub fn notify(&self, change: RuleChange) {
		if let Some(listeners) = self.typed.get(&change.rule.value_type()) {
			for listener in listeners {
				listener(&change);
			}
		}
		for listener in &self.any {
			listener(&change);
		}

		// No receivers is fine
		if self.tx.receiver_count() > 0 {
			let key = change.rule.key().to_string();
			if self.tx.send(change).is_err() {
				debug!("Change of {} dropped, all subscribers gone", key);
			}
		}
	}
}

impl Default for ChangeNotifier {
	fn default() -> Self {
		Self::new(64)
	}
}

impl Debug for ChangeNotifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChangeNotifier")
			.field("listeners", &self.listener_count())
			.field("subscribers", &self.tx.receiver_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cell::RuleCell;
	use crate::codec::CodecRegistry;
	use crate::declaration::RuleDeclaration;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn change(rule: Arc<RuleDescriptor>, old: RuleValue, new: RuleValue) -> RuleChange {
		RuleChange {
			rule,
			old,
			new,
			context: ChangeContext {
				environment: Environment::Server,
				origin: ChangeOrigin::Direct,
				instance: None,
			},
		}
	}

	fn int_rule() -> Arc<RuleDescriptor> {
		let cell = RuleCell::new(0_i32);
		let decl = RuleDeclaration::new("viewDistance", &cell);
		Arc::new(RuleDescriptor::from_declaration("rg", decl, &CodecRegistry::new()).unwrap())
	}

	#[test]
	fn test_typed_and_any_listeners() {
		let mut notifier = ChangeNotifier::default();
		let ints = Arc::new(AtomicUsize::new(0));
		let bools = Arc::new(AtomicUsize::new(0));
		let all = Arc::new(AtomicUsize::new(0));

		let counter = Arc::clone(&ints);
		notifier.on_change(ValueType::Int, move |c| {
			assert_eq!(c.key(), "view_distance");
			counter.fetch_add(1, Ordering::SeqCst);
		});
		let counter = Arc::clone(&bools);
		notifier.on_change(ValueType::Bool, move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		});
		let counter = Arc::clone(&all);
		notifier.on_any_change(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		});
		assert_eq!(notifier.listener_count(), 3);

		notifier.notify(change(int_rule(), RuleValue::Int(0), RuleValue::Int(16)));
		assert_eq!(ints.load(Ordering::SeqCst), 1);
		assert_eq!(bools.load(Ordering::SeqCst), 0);
		assert_eq!(all.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_subscribe() {
		let notifier = ChangeNotifier::new(4);
		let mut rx = notifier.subscribe();

		notifier.notify(change(int_rule(), RuleValue::Int(0), RuleValue::Int(12)));
		let received = rx.recv().await.unwrap();
		assert_eq!(received.new, RuleValue::Int(12));
		assert_eq!(received.old, RuleValue::Int(0));
		assert_eq!(received.context.origin, ChangeOrigin::Direct);
	}

	#[test]
	fn test_notify_without_subscribers() {
		let notifier = ChangeNotifier::new(0);
		notifier.notify(change(int_rule(), RuleValue::Int(0), RuleValue::Int(12)));
	}
}

// vim: ts=4
