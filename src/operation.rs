use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::graph::ReactiveGraph;
use crate::node::NodeBase;
use crate::observable::Observable;
use crate::signal::{Signal, SignalNode};
use crate::var::Var;
use crate::{ObservableNode, ReactiveNode};

/// The function-plus-dependencies value backing a computed signal.
///
/// Operations compose: a dependency may itself be an operation, in which
/// case its dependency tuple was absorbed from a fused sub-expression and
/// the traversals below recurse into it.
pub trait Operation: 'static {
	type Output;

	/// Read every leaf dependency's current value and apply the function.
	fn evaluate(&self) -> Self::Output;

	/// Register `node` as a successor of every leaf dependency.
	fn attach(&self, node: &Rc<dyn ReactiveNode>);

	/// Remove `node` from every leaf dependency's successor list.
	fn detach(&self, node: &NodeBase);

	fn graph(&self) -> Rc<ReactiveGraph>;
}

/// One slot of an operation's dependency tuple: either a leaf signal
/// reference or a nested operation.
pub trait Dependency: 'static {
	type Value;

	fn eval(&self) -> Self::Value;

	fn attach(&self, node: &Rc<dyn ReactiveNode>);

	fn detach(&self, node: &NodeBase);

	fn graph(&self) -> Rc<ReactiveGraph>;
}

/// A leaf dependency: a strong reference to a signal node. The strong
/// reference is what keeps every producer alive while a consumer exists.
pub struct SignalDep<S: 'static> {
	node: Rc<dyn SignalNode<S>>,
}

impl<S> Dependency for SignalDep<S>
where
	S: Clone + 'static,
{
	type Value = S;

	fn eval(&self) -> S {
		self.node.value_ref().clone()
	}

	fn attach(&self, node: &Rc<dyn ReactiveNode>) {
		let parent = self.node.base();
		parent.graph().on_node_attach(node, parent);
	}

	fn detach(&self, node: &NodeBase) {
		let parent = self.node.base();
		parent.graph().on_node_detach(node, parent);
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		self.node.base().graph().clone()
	}
}

/// An operation built from a plain function and a tuple of dependencies.
pub struct FunctionOp<F, D> {
	func: F,
	deps: D,
}

macro_rules! impl_function_op {
	($( $dep:ident => $idx:tt ),+) => {
		impl<FN, OUT, $($dep),+> Operation for FunctionOp<FN, ($($dep,)+)>
		where
			FN: Fn($($dep::Value),+) -> OUT + 'static,
			OUT: 'static,
			$($dep: Dependency,)+
		{
			type Output = OUT;

			fn evaluate(&self) -> OUT {
				(self.func)($( self.deps.$idx.eval() ),+)
			}

			fn attach(&self, node: &Rc<dyn ReactiveNode>) {
				$( self.deps.$idx.attach(node); )+
			}

			fn detach(&self, node: &NodeBase) {
				$( self.deps.$idx.detach(node); )+
			}

			fn graph(&self) -> Rc<ReactiveGraph> {
				self.deps.0.graph()
			}
		}
	};
}

impl_function_op!(D0 => 0);
impl_function_op!(D0 => 0, D1 => 1);
impl_function_op!(D0 => 0, D1 => 1, D2 => 2);
impl_function_op!(D0 => 0, D1 => 1, D2 => 2, D3 => 3);

// A nested operation acts as a dependency of the operation that absorbed
// it during fusion.
impl<FN, D> Dependency for FunctionOp<FN, D>
where
	FunctionOp<FN, D>: Operation,
{
	type Value = <FunctionOp<FN, D> as Operation>::Output;

	fn eval(&self) -> Self::Value {
		self.evaluate()
	}

	fn attach(&self, node: &Rc<dyn ReactiveNode>) {
		Operation::attach(self, node);
	}

	fn detach(&self, node: &NodeBase) {
		Operation::detach(self, node);
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		Operation::graph(self)
	}
}

/// The computed node: a signal driven by an operation.
pub(crate) struct SignalOpNode<S: 'static, O: Operation<Output = S>> {
	base: NodeBase,
	observable: Observable,
	this: Weak<SignalOpNode<S, O>>,
	value: RefCell<S>,
	op: RefCell<Option<O>>,
}

impl<S, O> SignalOpNode<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S>,
{
	pub(crate) fn create(graph: Rc<ReactiveGraph>, op: O) -> Rc<Self> {
		let value = op.evaluate();
		let node = Rc::new_cyclic(|this| SignalOpNode {
			base: NodeBase::new(graph),
			observable: Observable::new(),
			this: this.clone(),
			value: RefCell::new(value),
			op: RefCell::new(Some(op)),
		});

		let reactive = node.clone() as Rc<dyn ReactiveNode>;
		if let Some(op) = &*node.op.borrow() {
			op.attach(&reactive);
		}

		node
	}

	/// Move the operation out for fusion into an enclosing operation,
	/// unwiring this node from the graph. The node must never tick again.
	pub(crate) fn steal_op(&self) -> O {
		let op = self
			.op
			.borrow_mut()
			.take()
			.expect("operation already stolen from this node");
		op.detach(&self.base);
		op
	}
}

impl<S, O> ReactiveNode for SignalOpNode<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S>,
{
	fn base(&self) -> &NodeBase {
		&self.base
	}

	fn tick(&self) {
		let changed = {
			let op = self.op.borrow();
			let op = op
				.as_ref()
				.expect("ticked a node whose operation was stolen");
			let new_value = op.evaluate();
			if *self.value.borrow() != new_value {
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

impl<S, O> SignalNode<S> for SignalOpNode<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S>,
{
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
		self.this.upgrade().expect("signal node already destroyed")
	}
}

impl<S, O> ObservableNode for SignalOpNode<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S>,
{
	fn observable(&self) -> &Observable {
		&self.observable
	}
}

impl<S: 'static, O: Operation<Output = S>> Drop for SignalOpNode<S, O> {
	fn drop(&mut self) {
		if let Some(op) = self.op.get_mut() {
			op.detach(&self.base);
		}
	}
}

/// A freshly built computed signal whose operation can still be stolen.
///
/// Expression operators consume `TempSignal` operands by value and absorb
/// their operations, so a chained expression collapses into a single graph
/// node. Binding the expression to a name goes through
/// [`into_signal`](Self::into_signal) (or `Into<Signal<_>>`), which
/// publishes the node as an ordinary signal.
pub struct TempSignal<S: 'static, O: Operation<Output = S>> {
	node: Rc<SignalOpNode<S, O>>,
}

impl<S, O> TempSignal<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S>,
{
	pub(crate) fn new(node: Rc<SignalOpNode<S, O>>) -> Self {
		TempSignal { node }
	}

	pub(crate) fn steal_op(self) -> O {
		self.node.steal_op()
	}

	pub(crate) fn graph(&self) -> Rc<ReactiveGraph> {
		ReactiveNode::base(self.node.as_ref()).graph().clone()
	}

	/// Publish the node as an ordinary signal handle.
	pub fn into_signal(self) -> Signal<S> {
		Signal::from_node(self.node as Rc<dyn SignalNode<S>>)
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

	/// Derive a signal from this one, fusing the two operations into a
	/// single node.
	pub fn map<F, U>(self, func: F) -> TempSignal<U, FunctionOp<F, (O,)>>
	where
		O: Dependency<Value = S>,
		F: Fn(S) -> U + 'static,
		U: PartialEq + 'static,
	{
		make_signal(self, func)
	}
}

impl<S, O> From<TempSignal<S, O>> for Signal<S>
where
	S: PartialEq + 'static,
	O: Operation<Output = S>,
{
	fn from(temp: TempSignal<S, O>) -> Self {
		temp.into_signal()
	}
}

/// A value usable as one dependency of a computed signal.
pub trait IntoDependency {
	type Dep: Dependency;

	fn into_dependency(self) -> Self::Dep;

	fn graph(&self) -> Rc<ReactiveGraph>;
}

impl<'a, S> IntoDependency for &'a Signal<S>
where
	S: Clone + 'static,
{
	type Dep = SignalDep<S>;

	fn into_dependency(self) -> SignalDep<S> {
		SignalDep {
			node: self.node().clone(),
		}
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		self.node().base().graph().clone()
	}
}

impl<'a, S> IntoDependency for &'a Var<S>
where
	S: Clone + 'static,
{
	type Dep = SignalDep<S>;

	fn into_dependency(self) -> SignalDep<S> {
		SignalDep {
			node: self.node().clone() as Rc<dyn SignalNode<S>>,
		}
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		SignalNode::base(&**self.node()).graph().clone()
	}
}

impl<S, O> IntoDependency for TempSignal<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S> + Dependency,
{
	type Dep = O;

	fn into_dependency(self) -> O {
		self.steal_op()
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		TempSignal::graph(self)
	}
}

/// The dependency set of a computed signal: a single signal-like value or
/// a tuple of up to four of them. All members must share one context.
pub trait IntoDependencies {
	type Deps;

	fn into_deps(self) -> Self::Deps;

	fn graph(&self) -> Rc<ReactiveGraph>;
}

macro_rules! impl_into_dependencies {
	($( $dep:ident => $idx:tt ),+) => {
		impl<$($dep),+> IntoDependencies for ($($dep,)+)
		where
			$($dep: IntoDependency,)+
		{
			type Deps = ($($dep::Dep,)+);

			fn into_deps(self) -> Self::Deps {
				($( self.$idx.into_dependency(), )+)
			}

			fn graph(&self) -> Rc<ReactiveGraph> {
				let graph = self.0.graph();
				$(
					assert!(
						Rc::ptr_eq(&graph, &self.$idx.graph()),
						"signals from different contexts can't be composed"
					);
				)+
				graph
			}
		}
	};
}

impl_into_dependencies!(D0 => 0);
impl_into_dependencies!(D0 => 0, D1 => 1);
impl_into_dependencies!(D0 => 0, D1 => 1, D2 => 2);
impl_into_dependencies!(D0 => 0, D1 => 1, D2 => 2, D3 => 3);

impl<'a, S> IntoDependencies for &'a Signal<S>
where
	S: Clone + 'static,
{
	type Deps = (SignalDep<S>,);

	fn into_deps(self) -> Self::Deps {
		(IntoDependency::into_dependency(self),)
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		IntoDependency::graph(self)
	}
}

impl<'a, S> IntoDependencies for &'a Var<S>
where
	S: Clone + 'static,
{
	type Deps = (SignalDep<S>,);

	fn into_deps(self) -> Self::Deps {
		(IntoDependency::into_dependency(self),)
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		IntoDependency::graph(self)
	}
}

impl<S, O> IntoDependencies for TempSignal<S, O>
where
	S: PartialEq + 'static,
	O: Operation<Output = S> + Dependency,
{
	type Deps = (O,);

	fn into_deps(self) -> Self::Deps {
		(IntoDependency::into_dependency(self),)
	}

	fn graph(&self) -> Rc<ReactiveGraph> {
		TempSignal::graph(self)
	}
}

/// Build a computed signal from its dependencies and a pure function.
///
/// `deps` is a signal, a var, a fusable [`TempSignal`] or a tuple of up
/// to four of them; `func` receives the dependencies' current values by
/// value. Closure parameter types usually need annotating. Mixing
/// dependencies from different contexts panics.
pub fn make_signal<D, F, U>(deps: D, func: F) -> TempSignal<U, FunctionOp<F, D::Deps>>
where
	D: IntoDependencies,
	FunctionOp<F, D::Deps>: Operation<Output = U>,
	U: PartialEq + 'static,
{
	let graph = deps.graph();
	let op = FunctionOp {
		func,
		deps: deps.into_deps(),
	};
	TempSignal::new(SignalOpNode::create(graph, op))
}
