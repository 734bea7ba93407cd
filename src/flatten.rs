use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::graph::ReactiveGraph;
use crate::node::NodeBase;
use crate::observable::Observable;
use crate::signal::{Signal, SignalNode};
use crate::{ObservableNode, ReactiveNode};

/// The node behind [`flatten`]: tracks the inner signal currently held by
/// the outer signal-of-signals, rewiring itself when the outer switches.
pub(crate) struct FlattenNode<T: 'static> {
	base: NodeBase,
	observable: Observable,
	this: Weak<FlattenNode<T>>,
	outer: Rc<dyn SignalNode<Signal<T>>>,
	inner: RefCell<Rc<dyn SignalNode<T>>>,
	value: RefCell<T>,
}

impl<T> FlattenNode<T>
where
	T: Clone + PartialEq + 'static,
{
	pub(crate) fn create(
		graph: Rc<ReactiveGraph>,
		outer: Rc<dyn SignalNode<Signal<T>>>,
		inner: Rc<dyn SignalNode<T>>,
	) -> Rc<Self> {
		let value = inner.value_ref().clone();
		let node = Rc::new_cyclic(|this| FlattenNode {
			base: NodeBase::new(graph),
			observable: Observable::new(),
			this: this.clone(),
			outer,
			inner: RefCell::new(inner),
			value: RefCell::new(value),
		});

		let reactive = node.clone() as Rc<dyn ReactiveNode>;
		let graph = node.base.graph();
		graph.on_node_attach(&reactive, node.outer.base());
		graph.on_node_attach(&reactive, node.inner.borrow().base());

		node
	}
}

impl<T> ReactiveNode for FlattenNode<T>
where
	T: Clone + PartialEq + 'static,
{
	fn base(&self) -> &NodeBase {
		&self.base
	}

	fn tick(&self) {
		let new_inner = self.outer.value_ref().node().clone();

		let rewired = !crate::same_node(new_inner.base(), self.inner.borrow().base());
		if rewired {
			let old_inner = self.inner.replace(new_inner.clone());

			let graph = self.base.graph();
			graph.on_dynamic_node_detach(&self.base, old_inner.base());

			let this = self
				.this
				.upgrade()
				.expect("flatten node already destroyed") as Rc<dyn ReactiveNode>;
			graph.on_dynamic_node_attach(&this, new_inner.base());

			// No pulse here: the dynamic attach re-enqueued this node, so
			// the new inner's value is published on the follow-up tick at
			// the relocated level.
			return;
		}

		let changed = {
			let inner = self.inner.borrow();
			let inner_value = inner.value_ref();
			if *self.value.borrow() != *inner_value {
				let new_value = inner_value.clone();
				drop(inner_value);
				*self.value.borrow_mut() = new_value;
				true
			} else {
				false
			}
		};

		if changed {
			self.base.graph().on_node_pulse(&self.base);
		}
	}
}

impl<T> SignalNode<T> for FlattenNode<T>
where
	T: Clone + PartialEq + 'static,
{
	fn base(&self) -> &NodeBase {
		&self.base
	}

	fn observable(&self) -> &Observable {
		&self.observable
	}

	fn value_ref(&self) -> Ref<'_, T> {
		self.value.borrow()
	}

	fn as_observable_node(&self) -> Rc<dyn ObservableNode> {
		self.this.upgrade().expect("flatten node already destroyed")
	}
}

impl<T> ObservableNode for FlattenNode<T>
where
	T: Clone + PartialEq + 'static,
{
	fn observable(&self) -> &Observable {
		&self.observable
	}
}

impl<T: 'static> Drop for FlattenNode<T> {
	fn drop(&mut self) {
		let graph = self.base.graph().clone();
		graph.on_node_detach(&self.base, self.inner.get_mut().base());
		graph.on_node_detach(&self.base, self.outer.base());
	}
}

/// Dereference a signal-of-signals into a signal that follows whichever
/// inner signal the outer currently holds.
///
/// When the outer switches to a different inner signal, the graph edge is
/// re-pointed during propagation and the result re-evaluates at its new
/// topological position; changes to a previously tracked inner no longer
/// come through.
pub fn flatten<T>(outer: &Signal<Signal<T>>) -> Signal<T>
where
	T: Clone + PartialEq + 'static,
{
	let inner = outer.node().value_ref().node().clone();
	let graph = outer.node().base().graph().clone();
	let node = FlattenNode::create(graph, outer.node().clone(), inner);
	Signal::from_node(node as Rc<dyn SignalNode<T>>)
}
