use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use tracing::warn;

/// Shared countdown gating the physical detach of one removed subtree root.
///
/// One acknowledgement is expected from every global `remove` hook plus one
/// from the engine itself (delegated to the node's own `remove` hook when it
/// has one). The detach runs exactly once, when the last acknowledgement
/// arrives; a hook that holds on to its clone can therefore keep the subtree
/// attached, e.g. until a leave animation has finished.
#[derive(Clone)]
pub struct Release {
	inner: Rc<Countdown>,
}

struct Countdown {
	remaining: Cell<usize>,
	detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Release {
	pub(crate) fn new(expected: usize, detach: impl FnOnce() + 'static) -> Self {
		Self {
			inner: Rc::new(Countdown {
				remaining: Cell::new(expected),
				detach: RefCell::new(Some(Box::new(detach))),
			}),
		}
	}

	/// Counts this participant as done with the removed subtree.
	///
	/// Surplus acknowledgements are logged and ignored.
	pub fn acknowledge(&self) {
		let remaining = self.inner.remaining.get();
		if remaining == 0 {
			warn!("Ignoring surplus removal acknowledgement.");
			return;
		}
		self.inner.remaining.set(remaining - 1);
		if remaining == 1 {
			if let Some(detach) = self.inner.detach.borrow_mut().take() {
				detach();
			}
		}
	}

	/// Acknowledgements still outstanding before the subtree detaches.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.inner.remaining.get()
	}
}

impl fmt::Debug for Release {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Release").field("pending", &self.inner.remaining.get()).finish()
	}
}
