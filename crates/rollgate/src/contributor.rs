//! Extension point for modules contributing their own rules

use rollgate_core::RuleDeclaration;

use crate::prelude::*;

/// A module announcing rules to the gate
///
/// Each contributor registers under its own namespace. Server rules go to the
/// server manager, client rules to the client manager.
pub trait RuleContributor: Send + Sync {
	fn namespace(&self) -> &str;

	fn load_server_rules(&self) -> ClResult<Vec<RuleDeclaration>> {
		Ok(Vec::new())
	}

	fn load_client_rules(&self) -> ClResult<Vec<RuleDeclaration>> {
		Ok(Vec::new())
	}
}

// vim: ts=4
