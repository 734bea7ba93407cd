use std::cell::{Cell, Ref, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::graph::ReactiveGraph;
use crate::node::NodeBase;
use crate::observable::Observable;
use crate::operation::{make_signal, FunctionOp, SignalDep, TempSignal};
use crate::signal::{Signal, SignalNode};
use crate::{InputNode, ObservableNode};

/// The input node: a signal whose value is set from outside the graph.
///
/// Writes are staged and committed by [`apply_input`](InputNode); a staged
/// replacement (`staged` is `Some`) dominates a staged in-place mutation.
/// Var nodes implement only the input interface, so the scheduler can
/// never tick one.
pub struct VarNode<S: 'static> {
	base: NodeBase,
	observable: Observable,
	this: Weak<VarNode<S>>,
	value: RefCell<S>,
	staged: RefCell<Option<S>>,
	modified: Cell<bool>,
}

impl<S: 'static> VarNode<S> {
	pub(crate) fn create(graph: Rc<ReactiveGraph>, value: S) -> Rc<Self> {
		Rc::new_cyclic(|this| VarNode {
			base: NodeBase::new(graph),
			observable: Observable::new(),
			this: this.clone(),
			value: RefCell::new(value),
			staged: RefCell::new(None),
			modified: Cell::new(false),
		})
	}

	pub(crate) fn stage_set(&self, value: S) {
		*self.staged.borrow_mut() = Some(value);
		self.modified.set(false);
	}

	pub(crate) fn stage_modify<F>(&self, func: F)
	where
		F: FnOnce(&mut S),
	{
		let mut staged = self.staged.borrow_mut();
		match &mut *staged {
			// A replacement is already staged; mutate that. The result
			// stays on the set path and is compared against the live
			// value on apply.
			Some(staged) => func(staged),
			None => {
				func(&mut self.value.borrow_mut());
				self.modified.set(true);
			}
		}
	}
}

impl<S> InputNode for VarNode<S>
where
	S: PartialEq + 'static,
{
	fn apply_input(&self) -> bool {
		if let Some(staged) = self.staged.borrow_mut().take() {
			if *self.value.borrow() != staged {
				*self.value.borrow_mut() = staged;
				self.base.graph.on_input_change(&self.base);
				return true;
			}
			return false;
		}

		// An in-place mutation is trusted to have changed the value;
		// there is no pre-mutation snapshot to compare against.
		if self.modified.replace(false) {
			self.base.graph.on_input_change(&self.base);
			return true;
		}

		false
	}
}

impl<S: 'static> SignalNode<S> for VarNode<S> {
	fn base(&self) -> &NodeBase {
		&self.base
	}

	fn observable(&self) -> &Observable {
		&self.observable
	}

	fn value_ref(&self) -> Ref<'_, S> {
		self.value.borrow()
	}

	fn as_observable_node(&self) -> Rc<dyn ObservableNode> {
		self.this.upgrade().expect("var node already destroyed")
	}
}

impl<S: 'static> ObservableNode for VarNode<S> {
	fn observable(&self) -> &Observable {
		&self.observable
	}
}

/// Types with a natural involution, usable with [`Var::toggle`].
pub trait Toggle {
	fn toggle(&mut self);
}

impl Toggle for bool {
	fn toggle(&mut self) {
		*self = !*self;
	}
}

/// A handle to an input signal.
///
/// Created through [`Context::var`](crate::Context::var) or
/// [`make_var`](crate::make_var). Clones share the node.
pub struct Var<S: 'static> {
	node: Rc<VarNode<S>>,
}

impl<S: 'static> Var<S> {
	pub(crate) fn new(graph: Rc<ReactiveGraph>, value: S) -> Self {
		Var {
			node: VarNode::create(graph, value),
		}
	}

	pub(crate) fn node(&self) -> &Rc<VarNode<S>> {
		&self.node
	}

	/// A read-only handle to the same node.
	pub fn signal(&self) -> Signal<S> {
		Signal::from_node(self.node.clone() as Rc<dyn SignalNode<S>>)
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

	/// Replace the value.
	///
	/// Outside a transaction the write commits and propagates before this
	/// returns; inside one it is staged until the outermost transaction
	/// exits. Writing a value equal to the current one propagates nothing.
	pub fn set(&self, value: S)
	where
		S: PartialEq,
	{
		self.node.base.graph().add_input(&self.node, value);
	}

	/// Mutate the value in place.
	///
	/// Unlike [`set`](Self::set), a modification always counts as a
	/// change: the engine has no pre-mutation snapshot to compare with,
	/// so dependents re-run even if `func` left the value equal.
	pub fn modify<F>(&self, func: F)
	where
		S: PartialEq,
		F: FnOnce(&mut S),
	{
		self.node.base.graph().modify_input(&self.node, func);
	}

	/// Flip the value via its [`Toggle`] impl.
	pub fn toggle(&self)
	where
		S: Toggle + PartialEq,
	{
		self.modify(Toggle::toggle);
	}

	/// Derive a signal by applying `func` to this var's value.
	pub fn map<F, U>(&self, func: F) -> TempSignal<U, FunctionOp<F, (SignalDep<S>,)>>
	where
		S: Clone,
		F: Fn(S) -> U + 'static,
		U: PartialEq + 'static,
	{
		make_signal(self, func)
	}
}

impl<S: 'static> Clone for Var<S> {
	fn clone(&self) -> Self {
		Var {
			node: self.node.clone(),
		}
	}
}

impl<S: 'static> From<&Var<S>> for Signal<S> {
	fn from(var: &Var<S>) -> Self {
		var.signal()
	}
}

impl<S> Debug for Var<S>
where
	S: Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.value().fmt(f)
	}
}
