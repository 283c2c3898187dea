pub use rollgate_types::error::{ClResult, Error};
pub use rollgate_types::value::{RuleValue, ValueType};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
