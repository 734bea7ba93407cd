use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::ObserverNode;

/// The observer registry owned by every observable node.
///
/// Ownership is one-directional: the registry holds the only long-lived
/// strong references to its observer nodes, while each observer keeps a
/// weak reference back to the subject.
pub struct Observable {
	observers: RefCell<SmallVec<[Rc<dyn ObserverNode>; 2]>>,
}

impl Observable {
	pub(crate) fn new() -> Self {
		Observable {
			observers: RefCell::new(SmallVec::new()),
		}
	}

	pub(crate) fn register(&self, observer: Rc<dyn ObserverNode>) {
		self.observers.borrow_mut().push(observer);
	}

	/// Detach and drop the observer with the given node identity. Unknown
	/// identities are ignored, which makes detaching an observer that has
	/// already removed itself a no-op.
	pub(crate) fn unregister(&self, observer: &dyn ObserverNode) {
		let target = observer as *const dyn ObserverNode as *const ();

		let mut observers = self.observers.borrow_mut();
		if let Some(index) = observers
			.iter()
			.position(|entry| crate::rc_thin_addr(entry) == target)
		{
			observers[index].detach_observer();
			observers.remove(index);
		}
	}
}

impl Drop for Observable {
	fn drop(&mut self) {
		// Sever every back-link first so an observer that outlives the
		// subject (e.g. one sitting in the graph's detach queue) does not
		// try to unregister from a dead node.
		for observer in self.observers.get_mut().iter() {
			observer.detach_observer();
		}
	}
}
