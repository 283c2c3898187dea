pub use crate::error::{ClResult, Error};
pub use crate::value::{RuleValue, ValueType};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
