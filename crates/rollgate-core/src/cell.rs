//! Live value storage owned by the declaring module
//!
//! A `RuleCell` is a cheap handle to one process-wide value. The declaring
//! module keeps a handle and reads through it; the rule manager is the only
//! writer, through the validated mutation path.

use parking_lot::RwLock;
use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::prelude::*;

pub struct RuleCell<T> {
	inner: Arc<RwLock<T>>,
	writable: bool,
}

impl<T: Clone + Send + Sync + 'static> RuleCell<T> {
	pub fn new(value: T) -> Self {
		Self { inner: Arc::new(RwLock::new(value)), writable: true }
	}

	/// A read-only cell, declaring a rule over it fails with `NotMutable`
	pub fn constant(value: T) -> Self {
		Self { inner: Arc::new(RwLock::new(value)), writable: false }
	}

	pub fn get(&self) -> T {
		self.inner.read().clone()
	}

	/// Borrow the current value without cloning it
	pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.read())
	}

	pub fn is_writable(&self) -> bool {
		self.writable
	}

	pub(crate) fn slot(&self) -> Arc<dyn CellSlot> {
		Arc::new(self.clone())
	}
}

impl<T> Clone for RuleCell<T> {
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner), writable: self.writable }
	}
}

impl<T: Debug> Debug for RuleCell<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuleCell")
			.field("value", &*self.inner.read())
			.field("writable", &self.writable)
			.finish()
	}
}

/// Type-erased access to a rule cell
pub(crate) trait CellSlot: Send + Sync {
	/// `std::any::type_name` of the stored type
	fn host_type(&self) -> &'static str;

	fn is_writable(&self) -> bool;

	fn load(&self, value_type: ValueType) -> Option<RuleValue>;

	/// Returns false when the value does not fit the cell
	fn store(&self, value: RuleValue) -> bool;
}

impl<T: Clone + Send + Sync + 'static> CellSlot for RuleCell<T> {
	fn host_type(&self) -> &'static str {
		std::any::type_name::<T>()
	}

	fn is_writable(&self) -> bool {
		self.writable
	}

	fn load(&self, value_type: ValueType) -> Option<RuleValue> {
		let guard = self.inner.read();
		RuleValue::from_any(value_type, &*guard as &dyn Any)
	}

	fn store(&self, value: RuleValue) -> bool {
		if !self.writable {
			return false;
		}
		match value.into_any().downcast::<T>() {
			Ok(value) => {
				*self.inner.write() = *value;
				true
			}
			Err(_) => false,
		}
	}
}


// vim: ts=4
