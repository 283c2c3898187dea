//! Rule declaration and hierarchical configuration resolution engine.
//!
//! Contributing modules declare typed rules over [`RuleCell`]s; a
//! [`RuleManager`] turns them into descriptors, resolves their values from a
//! global and an instance-scoped config blob, and routes every mutation
//! through validation and change notification.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod codec;
pub mod declaration;
pub mod descriptor;
pub mod manager;
pub mod memory_store;
pub mod notify;
pub mod prelude;
pub mod query;
pub mod validator;

// Re-export commonly used types
pub use cell::RuleCell;
pub use codec::{Codec, CodecRegistry};
pub use declaration::{Environment, RuleDeclaration};
pub use descriptor::RuleDescriptor;
pub use manager::RuleManager;
pub use memory_store::MemoryConfigStore;
pub use notify::{ChangeContext, ChangeOrigin, RuleChange};
pub use query::{HintState, RuleInfo};
pub use validator::{PermissionTier, Validator, ValidatorSpec};

// vim: ts=4
