use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::node::NodeBase;
use crate::var::VarNode;
use crate::{InputNode, ObserverNode, ReactiveNode};

/// The propagation engine behind a [`Context`](crate::Context).
///
/// Holds the transaction nesting counter, the inputs staged during the
/// current transaction, the topological work queue and the observers that
/// asked to be detached once the current wave has finished.
pub struct ReactiveGraph {
	txn_level: Cell<u32>,
	propagating: Cell<bool>,
	changed_inputs: RefCell<Vec<Rc<dyn InputNode>>>,
	scheduled: RefCell<TopologicalQueue>,
	detached_observers: RefCell<Vec<Rc<dyn ObserverNode>>>,
}

impl ReactiveGraph {
	pub(crate) fn new() -> Self {
		ReactiveGraph {
			txn_level: Cell::new(0),
			propagating: Cell::new(false),
			changed_inputs: RefCell::new(Vec::new()),
			scheduled: RefCell::new(TopologicalQueue::new()),
			detached_observers: RefCell::new(Vec::new()),
		}
	}

	/// Run `func` with input propagation deferred to the outermost
	/// transaction exit.
	pub(crate) fn transaction<F, R>(&self, func: F) -> R
	where
		F: FnOnce() -> R,
	{
		self.txn_level.set(self.txn_level.get() + 1);
		let result = func();
		self.txn_level.set(self.txn_level.get() - 1);

		if self.txn_level.get() > 0 {
			return result;
		}

		let inputs = std::mem::take(&mut *self.changed_inputs.borrow_mut());
		tracing::trace!(inputs = inputs.len(), "transaction commit");

		let mut should_propagate = false;
		for input in inputs {
			if input.apply_input() {
				should_propagate = true;
			}
		}

		if should_propagate {
			self.propagate();
		}

		self.detach_queued_observers();

		result
	}

	/// Stage a wholesale replacement on `node`. Outside a transaction the
	/// write is applied and propagated before this returns.
	pub(crate) fn add_input<S>(&self, node: &Rc<VarNode<S>>, value: S)
	where
		S: PartialEq + 'static,
	{
		assert!(
			!self.propagating.get(),
			"reactive input written during propagation"
		);

		node.stage_set(value);

		if self.txn_level.get() > 0 {
			self.changed_inputs
				.borrow_mut()
				.push(node.clone() as Rc<dyn InputNode>);
		} else {
			if node.apply_input() {
				self.propagate();
			}
			self.detach_queued_observers();
		}
	}

	/// Stage an in-place mutation on `node`. Same transaction rules as
	/// [`add_input`](Self::add_input).
	pub(crate) fn modify_input<S, F>(&self, node: &Rc<VarNode<S>>, func: F)
	where
		S: PartialEq + 'static,
		F: FnOnce(&mut S),
	{
		assert!(
			!self.propagating.get(),
			"reactive input written during propagation"
		);

		node.stage_modify(func);

		if self.txn_level.get() > 0 {
			self.changed_inputs
				.borrow_mut()
				.push(node.clone() as Rc<dyn InputNode>);
		} else {
			if node.apply_input() {
				self.propagate();
			}
			self.detach_queued_observers();
		}
	}

	pub(crate) fn propagate(&self) {
		self.propagating.set(true);

		loop {
			let wave = self.scheduled.borrow_mut().fetch_next();
			if wave.is_empty() {
				break;
			}

			tracing::trace!(nodes = wave.len(), "wave");

			for node in wave {
				let base = node.base();

				// A dynamic attachment moved this node further down the
				// order; relocate it and try again in a later wave.
				if base.level.get() < base.new_level.get() {
					base.level.set(base.new_level.get());
					self.invalidate_successors(base);
					let level = base.level.get();
					self.scheduled.borrow_mut().push(node.clone(), level);
					continue;
				}

				base.queued.set(false);
				node.tick();
			}
		}

		self.propagating.set(false);
	}

	pub(crate) fn on_node_attach(&self, node: &Rc<dyn ReactiveNode>, parent: &NodeBase) {
		parent.successors.borrow_mut().push(Rc::downgrade(node));

		let base = node.base();
		if base.level.get() <= parent.level.get() {
			base.level.set(parent.level.get() + 1);
		}
	}

	pub(crate) fn on_node_detach(&self, node: &NodeBase, parent: &NodeBase) {
		parent.successors.borrow_mut().retain(|succ| match succ.upgrade() {
			Some(succ) => !crate::same_node(succ.base(), node),
			None => false,
		});
	}

	/// Rewire `node` under a new parent while a wave is in flight. The
	/// node is re-enqueued so the level-bump branch of the propagation
	/// loop can relocate it before it ticks again.
	pub(crate) fn on_dynamic_node_attach(&self, node: &Rc<dyn ReactiveNode>, parent: &NodeBase) {
		self.on_node_attach(node, parent);

		let base = node.base();
		self.invalidate_successors(base);

		base.queued.set(true);
		let level = base.level.get();
		self.scheduled.borrow_mut().push(node.clone(), level);
	}

	pub(crate) fn on_dynamic_node_detach(&self, node: &NodeBase, parent: &NodeBase) {
		self.on_node_detach(node, parent);
	}

	pub(crate) fn on_input_change(&self, node: &NodeBase) {
		self.process_children(node);
	}

	pub(crate) fn on_node_pulse(&self, node: &NodeBase) {
		self.process_children(node);
	}

	pub(crate) fn queue_observer_for_detach(&self, observer: Rc<dyn ObserverNode>) {
		self.detached_observers.borrow_mut().push(observer);
	}

	pub(crate) fn detach_queued_observers(&self) {
		let detached = std::mem::take(&mut *self.detached_observers.borrow_mut());
		for observer in detached {
			observer.unregister_self();
		}
	}

	fn process_children(&self, node: &NodeBase) {
		let mut scheduled = self.scheduled.borrow_mut();
		for succ in node.successors.borrow().iter() {
			if let Some(succ) = succ.upgrade() {
				let base = succ.base();
				if base.queued.get() {
					continue;
				}
				base.queued.set(true);
				let level = base.level.get();
				scheduled.push(succ, level);
			}
		}
	}

	fn invalidate_successors(&self, node: &NodeBase) {
		for succ in node.successors.borrow().iter() {
			if let Some(succ) = succ.upgrade() {
				let base = succ.base();
				if base.new_level.get() <= node.level.get() {
					base.new_level.set(node.level.get() + 1);
				}
			}
		}
	}
}

/// A priority bucket keyed by topological level.
///
/// `fetch_next` drains every entry at the current minimum level into one
/// wave. Re-enqueueing a node at a higher level is a plain push.
struct TopologicalQueue {
	entries: Vec<(Rc<dyn ReactiveNode>, i32)>,
}

impl TopologicalQueue {
	fn new() -> Self {
		TopologicalQueue {
			entries: Vec::new(),
		}
	}

	fn push(&mut self, node: Rc<dyn ReactiveNode>, level: i32) {
		self.entries.push((node, level));
	}

	fn fetch_next(&mut self) -> Vec<Rc<dyn ReactiveNode>> {
		let minimal = match self.entries.iter().map(|(_, level)| *level).min() {
			Some(minimal) => minimal,
			None => return Vec::new(),
		};

		let mut wave = Vec::new();
		let mut index = 0;
		while index < self.entries.len() {
			if self.entries[index].1 == minimal {
				wave.push(self.entries.swap_remove(index).0);
			} else {
				index += 1;
			}
		}

		wave
	}
}
