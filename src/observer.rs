use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::graph::ReactiveGraph;
use crate::node::NodeBase;
use crate::signal::{Signal, SignalNode};
use crate::{ObservableNode, ObserverAction, ObserverNode, ReactiveNode};

/// The node that couples a subject signal to a user callback.
///
/// The subject owns this node through its observer registry; the node
/// itself only holds a weak reference back, so it can notice the subject's
/// demise without extending its lifetime.
struct SignalObserverNode<S: 'static, F> {
	base: NodeBase,
	this: Weak<SignalObserverNode<S, F>>,
	subject: RefCell<Option<Weak<dyn SignalNode<S>>>>,
	func: RefCell<F>,
}

impl<S, F> SignalObserverNode<S, F>
where
	S: 'static,
	F: FnMut(&S) -> ObserverAction + 'static,
{
	fn create(graph: Rc<ReactiveGraph>, subject: &Rc<dyn SignalNode<S>>, func: F) -> Rc<Self> {
		let node = Rc::new_cyclic(|this| SignalObserverNode {
			base: NodeBase::new(graph),
			this: this.clone(),
			subject: RefCell::new(Some(Rc::downgrade(subject))),
			func: RefCell::new(func),
		});

		let reactive = node.clone() as Rc<dyn ReactiveNode>;
		node.base.graph().on_node_attach(&reactive, subject.base());

		node
	}

	fn subject(&self) -> Option<Rc<dyn SignalNode<S>>> {
		let subject = self.subject.borrow();
		subject.as_ref().and_then(Weak::upgrade)
	}
}

impl<S, F> ReactiveNode for SignalObserverNode<S, F>
where
	S: 'static,
	F: FnMut(&S) -> ObserverAction + 'static,
{
	fn base(&self) -> &NodeBase {
		&self.base
	}

	fn tick(&self) {
		let mut should_detach = false;

		if let Some(subject) = self.subject() {
			let value = subject.value_ref();
			if (self.func.borrow_mut())(&value) == ObserverAction::StopAndDetach {
				should_detach = true;
			}
		}

		if should_detach {
			let this = self
				.this
				.upgrade()
				.expect("observer node already destroyed") as Rc<dyn ObserverNode>;
			self.base.graph().queue_observer_for_detach(this);
		}
	}
}

impl<S, F> ObserverNode for SignalObserverNode<S, F>
where
	S: 'static,
	F: FnMut(&S) -> ObserverAction + 'static,
{
	fn unregister_self(&self) {
		if let Some(subject) = self.subject() {
			subject.as_observable_node().observable().unregister(self);
		}
	}

	fn detach_observer(&self) {
		if let Some(subject) = self.subject() {
			self.base.graph().on_node_detach(&self.base, subject.base());
		}
		*self.subject.borrow_mut() = None;
	}
}

/// A handle to an attached observer.
///
/// The handle keeps the subject (and with it the observer) alive; dropping
/// it without calling [`detach`](Self::detach) leaves the observer running
/// for as long as the subject lives.
pub struct Observer {
	node: Weak<dyn ObserverNode>,
	subject: Rc<dyn ObservableNode>,
}

impl Observer {
	/// Detach the observer from its subject.
	///
	/// Consumes the handle, so an observer can't be detached twice. If the
	/// callback already requested [`ObserverAction::StopAndDetach`], this
	/// is a no-op.
	pub fn detach(self) {
		if let Some(node) = self.node.upgrade() {
			self.subject.observable().unregister(&*node);
		}
	}
}

/// Takes ownership of an observer and detaches it on scope exit.
pub struct ScopedObserver {
	observer: Option<Observer>,
}

impl From<Observer> for ScopedObserver {
	fn from(observer: Observer) -> Self {
		ScopedObserver {
			observer: Some(observer),
		}
	}
}

impl Drop for ScopedObserver {
	fn drop(&mut self) {
		if let Some(observer) = self.observer.take() {
			observer.detach();
		}
	}
}

/// Attach `func` to `subject`: it runs with the subject's value after
/// every change, in the same wave that produced the change.
///
/// `func` may return [`ObserverAction`] to control its own lifetime; a
/// `()`-returning callback observes until detached. Self-detachment is
/// deferred to the end of the wave, so a detaching observer never perturbs
/// the graph mid-propagation.
pub fn observe<S, F, R>(subject: &Signal<S>, mut func: F) -> Observer
where
	S: 'static,
	F: FnMut(&S) -> R + 'static,
	R: Into<ObserverAction>,
{
	let graph = subject.node().base().graph().clone();
	let node = SignalObserverNode::create(graph, subject.node(), move |value: &S| {
		func(value).into()
	});

	subject
		.node()
		.observable()
		.register(node.clone() as Rc<dyn ObserverNode>);

	Observer {
		node: Rc::downgrade(&node) as Weak<dyn ObserverNode>,
		subject: subject.node().as_observable_node(),
	}
}
