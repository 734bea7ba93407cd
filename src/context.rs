use std::fmt::Debug;
use std::rc::Rc;

use crate::graph::ReactiveGraph;
use crate::var::Var;

/// The owner of a reactive graph.
///
/// Every node belongs to exactly one context; composing signals from
/// different contexts panics. Clones are handles to the same context, and
/// equality is identity.
pub struct Context {
	graph: Rc<ReactiveGraph>,
}

impl Context {
	pub fn new() -> Self {
		Context {
			graph: Rc::new(ReactiveGraph::new()),
		}
	}

	/// Create an input signal with the given initial value.
	pub fn var<S: 'static>(&self, value: S) -> Var<S> {
		Var::new(self.graph.clone(), value)
	}

	/// Run `func` with all input writes batched into a single wave.
	///
	/// Writes staged inside `func` are applied when the outermost
	/// transaction exits; dependents and observers then see every change
	/// at once. Transactions nest.
	pub fn transaction<F, R>(&self, func: F) -> R
	where
		F: FnOnce() -> R,
	{
		self.graph.transaction(func)
	}
}

impl Default for Context {
	fn default() -> Self {
		Context::new()
	}
}

impl Clone for Context {
	fn clone(&self) -> Self {
		Context {
			graph: self.graph.clone(),
		}
	}
}

impl PartialEq for Context {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.graph, &other.graph)
	}
}

impl Eq for Context {}

impl Debug for Context {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Context").finish_non_exhaustive()
	}
}

/// Free-function twin of [`Context::var`].
pub fn make_var<S: 'static>(ctx: &Context, value: S) -> Var<S> {
	ctx.var(value)
}
