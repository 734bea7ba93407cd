pub mod macros;

mod context;
mod flatten;
mod graph;
mod node;
mod observable;
mod observer;
mod operation;
mod ops;
mod signal;
mod var;

use std::rc::Rc;

pub use context::{make_var, Context};
pub use flatten::flatten;
pub use graph::ReactiveGraph;
pub use node::NodeBase;
pub use observable::Observable;
pub use observer::{observe, Observer, ScopedObserver};
pub use operation::{
	make_signal, Dependency, FunctionOp, IntoDependencies, IntoDependency, Operation, SignalDep,
	TempSignal,
};
pub use signal::Signal;
pub use var::{Toggle, Var};

/// A node that participates in level-ordered propagation.
///
/// The scheduler only ever sees nodes through this trait: it reads the
/// shared bookkeeping via `base` and drives recomputation via `tick`.
pub trait ReactiveNode: 'static {
	fn base(&self) -> &NodeBase;

	/// Recompute this node from its predecessors' current values.
	fn tick(&self);
}

/// A source node with staged writes.
///
/// Input nodes never tick. At the end of a transaction the graph calls
/// `apply_input` on every staged input; the return value reports whether
/// the live value actually changed.
pub trait InputNode: 'static {
	fn apply_input(&self) -> bool;
}

/// The subject-facing side of an observer node.
pub trait ObserverNode: ReactiveNode {
	/// Ask the subject to unregister this observer.
	fn unregister_self(&self);

	/// Sever this observer's back-reference to its subject.
	///
	/// Called by the subject, either on unregister or on teardown, so the
	/// observer never unregisters twice.
	fn detach_observer(&self);
}

/// A node that owns an observer registry.
pub trait ObservableNode: 'static {
	fn observable(&self) -> &Observable;
}

/// Returned by observer callbacks to control further processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverAction {
	/// Keep observing.
	Next,
	/// Stop observing and detach once the current wave has finished.
	StopAndDetach,
}

impl From<()> for ObserverAction {
	fn from(_: ()) -> Self {
		ObserverAction::Next
	}
}

pub(crate) fn same_node(lhs: &NodeBase, rhs: &NodeBase) -> bool {
	std::ptr::eq(lhs, rhs)
}

pub(crate) fn rc_thin_addr<T: ?Sized>(rc: &Rc<T>) -> *const () {
	Rc::as_ptr(rc) as *const ()
}
