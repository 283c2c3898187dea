//! Propagation of the distance rules into the host

use std::sync::Arc;

use rollgate_core::{RuleChange, RuleManager};

use crate::prelude::*;
use crate::rules::GATE_NAMESPACE;

/// Smallest distance applied as-is, anything below defers to the host setting
pub const MIN_DISTANCE: i32 = 2;

pub fn effective_distance(value: i32, fallback: i32) -> i32 {
	if value >= MIN_DISTANCE { value } else { fallback }
}

/// Host side of the view/simulation distance rules
pub trait DistanceHost: Send + Sync {
	/// Distance from the host's own configuration
	fn configured_view_distance(&self) -> i32;
	fn configured_simulation_distance(&self) -> i32;

	fn set_view_distance(&self, distance: i32);
	fn set_simulation_distance(&self, distance: i32);
}

fn apply_change(host: &dyn DistanceHost, change: &RuleChange) {
	if change.rule.namespace() != GATE_NAMESPACE {
		return;
	}
	let RuleValue::Int(value) = change.new else {
		return;
	};
	match change.rule.key() {
		"view_distance" => {
			let distance = effective_distance(value, host.configured_view_distance());
			debug!("Applying view distance {}", distance);
			host.set_view_distance(distance);
		}
		"simulation_distance" => {
			let distance = effective_distance(value, host.configured_simulation_distance());
			debug!("Applying simulation distance {}", distance);
			host.set_simulation_distance(distance);
		}
		_ => {}
	}
}

/// Forward distance rule changes of `manager` to `host`
pub fn bind_distance_host(manager: &mut RuleManager, host: Arc<dyn DistanceHost>) {
	manager.on_change(ValueType::Int, move |change| apply_change(host.as_ref(), change));
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_effective_distance() {
		assert_eq!(effective_distance(0, 10), 10);
		assert_eq!(effective_distance(1, 10), 10);
		assert_eq!(effective_distance(2, 10), 2);
		assert_eq!(effective_distance(32, 10), 32);
		assert_eq!(effective_distance(-4, 10), 10);
	}
}

// vim: ts=4
