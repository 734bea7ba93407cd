use std::cell::Ref;
use std::fmt::Debug;
use std::rc::Rc;

use crate::node::NodeBase;
use crate::observable::Observable;
use crate::operation::{make_signal, FunctionOp, SignalDep, TempSignal};
use crate::ObservableNode;

/// The node-side interface every signal kind implements: a typed current
/// value plus the graph and observer plumbing.
pub(crate) trait SignalNode<S>: 'static {
	fn base(&self) -> &NodeBase;

	fn observable(&self) -> &Observable;

	fn value_ref(&self) -> Ref<'_, S>;

	fn as_observable_node(&self) -> Rc<dyn ObservableNode>;
}

/// A handle to a signal node.
///
/// Clones share the node, shared-pointer style; while any handle (or any
/// dependent computed node) exists, the node stays alive. Equality
/// compares node identity, not values.
pub struct Signal<S: 'static> {
	node: Rc<dyn SignalNode<S>>,
}

impl<S: 'static> Signal<S> {
	pub(crate) fn from_node(node: Rc<dyn SignalNode<S>>) -> Self {
		Signal { node }
	}

	pub(crate) fn node(&self) -> &Rc<dyn SignalNode<S>> {
		&self.node
	}

	/// Borrow the current value.
	pub fn value(&self) -> Ref<'_, S> {
		self.node.value_ref()
	}

	/// Clone the current value out of the node.
	pub fn get(&self) -> S
	where
		S: Clone,
	{
		self.node.value_ref().clone()
	}

	/// Derive a signal by applying `func` to this signal's value.
	pub fn map<F, U>(&self, func: F) -> TempSignal<U, FunctionOp<F, (SignalDep<S>,)>>
	where
		S: Clone,
		F: Fn(S) -> U + 'static,
		U: PartialEq + 'static,
	{
		make_signal(self, func)
	}
}

impl<T> Signal<Signal<T>>
where
	T: Clone + PartialEq + 'static,
{
	/// Shorthand for [`flatten`](crate::flatten).
	pub fn flatten(&self) -> Signal<T> {
		crate::flatten(self)
	}
}

impl<S: 'static> Clone for Signal<S> {
	fn clone(&self) -> Self {
		Signal {
			node: self.node.clone(),
		}
	}
}

impl<S: 'static> PartialEq for Signal<S> {
	fn eq(&self, other: &Self) -> bool {
		crate::same_node(self.node.base(), other.node.base())
	}
}

impl<S: 'static> Eq for Signal<S> {}

impl<S> Debug for Signal<S>
where
	S: Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.value().fmt(f)
	}
}
