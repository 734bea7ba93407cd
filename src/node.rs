use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::graph::ReactiveGraph;
use crate::ReactiveNode;

/// Bookkeeping shared by every node in a graph.
///
/// `level` is the node's topological depth; `new_level` is the tentative
/// depth discovered when a dynamic attachment reveals that the node must
/// run later in the wave. Levels only ever grow. `successors` holds
/// non-owning back-pointers to the node's consumers; the matching strong
/// references are held by the consumers themselves.
pub struct NodeBase {
	pub(crate) graph: Rc<ReactiveGraph>,
	pub(crate) level: Cell<i32>,
	pub(crate) new_level: Cell<i32>,
	pub(crate) queued: Cell<bool>,
	pub(crate) successors: RefCell<SmallVec<[Weak<dyn ReactiveNode>; 4]>>,
}

impl NodeBase {
	pub(crate) fn new(graph: Rc<ReactiveGraph>) -> Self {
		NodeBase {
			graph,
			level: Cell::new(0),
			new_level: Cell::new(0),
			queued: Cell::new(false),
			successors: RefCell::new(SmallVec::new()),
		}
	}

	pub(crate) fn graph(&self) -> &Rc<ReactiveGraph> {
		&self.graph
	}
}
