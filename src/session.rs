//! Page-lifetime state shared by the controller's components.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// State that lives as long as the page.
///
/// Built once at startup and handed to whatever needs it; nothing here is
/// reachable through a global.
pub struct SessionState<V> {
	api_key: RefCell<Option<String>>,
	in_flight: Cell<bool>,
	visualizer: RefCell<Option<Rc<V>>>,
}

impl<V> Default for SessionState<V> {
	fn default() -> Self {
		Self {
			api_key: RefCell::new(None),
			in_flight: Cell::new(false),
			visualizer: RefCell::new(None),
		}
	}
}

impl<V> SessionState<V> {
	/// Empty session: no key, nothing in flight, no visualizer.
	pub fn new() -> Self {
		Self::default()
	}

	/// The backend key, if one was loaded.
	pub fn api_key(&self) -> Option<String> {
		self.api_key.borrow().clone()
	}

	/// Store (or overwrite) the backend key.
	pub fn set_api_key(&self, key: impl Into<String>) {
		*self.api_key.borrow_mut() = Some(key.into());
	}

	/// The mounted visualizer, if any.
	pub fn visualizer(&self) -> Option<Rc<V>> {
		self.visualizer.borrow().clone()
	}

	/// Install a visualizer, returning the one it replaced.
	pub fn replace_visualizer(&self, visualizer: Option<Rc<V>>) -> Option<Rc<V>> {
		std::mem::replace(&mut *self.visualizer.borrow_mut(), visualizer)
	}

	/// Whether an analysis currently holds the guard.
	pub fn is_in_flight(&self) -> bool {
		self.in_flight.get()
	}

	/// Try to start an analysis. `None` if one is already running.
	pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
		if self.in_flight.replace(true) {
			return None;
		}
		Some(InFlightGuard {
			flag: &self.in_flight,
		})
	}
}

/// Held for the duration of one analysis; releases the slot when dropped.
#[must_use = "the analysis slot is released as soon as the guard is dropped"]
pub struct InFlightGuard<'a> {
	flag: &'a Cell<bool>,
}

impl Drop for InFlightGuard<'_> {
	fn drop(&mut self) {
		self.flag.set(false);
	}
}
