//! Operator overloads for expression-style signal composition.
//!
//! Operands come in three flavors: `&Var`, `&Signal`, and by-value
//! [`TempSignal`]. A by-value operand is a sub-expression temporary; its
//! operation is stolen and absorbed into the new node, so an expression
//! like `&a + &b * &c` builds exactly one computed node over `{a, b, c}`.

use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Shl, Shr, Sub};

use crate::operation::{make_signal, Dependency, FunctionOp, Operation, SignalDep, TempSignal};
use crate::signal::Signal;
use crate::var::Var;

macro_rules! impl_binary_operator {
	($trait:ident, $method:ident, $helper:ident) => {
		fn $helper<L: $trait<R>, R>(lhs: L, rhs: R) -> <L as $trait<R>>::Output {
			$trait::$method(lhs, rhs)
		}

		impl<'a, 'b, L, R> $trait<&'b Signal<R>> for &'a Signal<L>
		where
			L: $trait<R> + Clone + 'static,
			R: Clone + 'static,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (SignalDep<L>, SignalDep<R>)>,
			>;

			fn $method(self, rhs: &'b Signal<R>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'a, 'b, L, R> $trait<&'b Var<R>> for &'a Signal<L>
		where
			L: $trait<R> + Clone + 'static,
			R: Clone + 'static,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (SignalDep<L>, SignalDep<R>)>,
			>;

			fn $method(self, rhs: &'b Var<R>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'a, 'b, L, R> $trait<&'b Signal<R>> for &'a Var<L>
		where
			L: $trait<R> + Clone + 'static,
			R: Clone + 'static,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (SignalDep<L>, SignalDep<R>)>,
			>;

			fn $method(self, rhs: &'b Signal<R>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'a, 'b, L, R> $trait<&'b Var<R>> for &'a Var<L>
		where
			L: $trait<R> + Clone + 'static,
			R: Clone + 'static,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (SignalDep<L>, SignalDep<R>)>,
			>;

			fn $method(self, rhs: &'b Var<R>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'a, L, R, OR> $trait<TempSignal<R, OR>> for &'a Signal<L>
		where
			L: $trait<R> + Clone + 'static,
			R: PartialEq + 'static,
			OR: Operation<Output = R> + Dependency<Value = R>,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (SignalDep<L>, OR)>,
			>;

			fn $method(self, rhs: TempSignal<R, OR>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'a, L, R, OR> $trait<TempSignal<R, OR>> for &'a Var<L>
		where
			L: $trait<R> + Clone + 'static,
			R: PartialEq + 'static,
			OR: Operation<Output = R> + Dependency<Value = R>,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (SignalDep<L>, OR)>,
			>;

			fn $method(self, rhs: TempSignal<R, OR>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'b, L, R, OL> $trait<&'b Signal<R>> for TempSignal<L, OL>
		where
			L: $trait<R> + PartialEq + 'static,
			R: Clone + 'static,
			OL: Operation<Output = L> + Dependency<Value = L>,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (OL, SignalDep<R>)>,
			>;

			fn $method(self, rhs: &'b Signal<R>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<'b, L, R, OL> $trait<&'b Var<R>> for TempSignal<L, OL>
		where
			L: $trait<R> + PartialEq + 'static,
			R: Clone + 'static,
			OL: Operation<Output = L> + Dependency<Value = L>,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (OL, SignalDep<R>)>,
			>;

			fn $method(self, rhs: &'b Var<R>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}

		impl<L, R, OL, OR> $trait<TempSignal<R, OR>> for TempSignal<L, OL>
		where
			L: $trait<R> + PartialEq + 'static,
			R: PartialEq + 'static,
			OL: Operation<Output = L> + Dependency<Value = L>,
			OR: Operation<Output = R> + Dependency<Value = R>,
			<L as $trait<R>>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<L as $trait<R>>::Output,
				FunctionOp<fn(L, R) -> <L as $trait<R>>::Output, (OL, OR)>,
			>;

			fn $method(self, rhs: TempSignal<R, OR>) -> Self::Output {
				make_signal(
					(self, rhs),
					$helper::<L, R> as fn(L, R) -> <L as $trait<R>>::Output,
				)
			}
		}
	};
}

macro_rules! impl_unary_operator {
	($trait:ident, $method:ident, $helper:ident) => {
		fn $helper<T: $trait>(value: T) -> <T as $trait>::Output {
			$trait::$method(value)
		}

		impl<'a, S> $trait for &'a Signal<S>
		where
			S: $trait + Clone + 'static,
			<S as $trait>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<S as $trait>::Output,
				FunctionOp<fn(S) -> <S as $trait>::Output, (SignalDep<S>,)>,
			>;

			fn $method(self) -> Self::Output {
				make_signal(self, $helper::<S> as fn(S) -> <S as $trait>::Output)
			}
		}

		impl<'a, S> $trait for &'a Var<S>
		where
			S: $trait + Clone + 'static,
			<S as $trait>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<S as $trait>::Output,
				FunctionOp<fn(S) -> <S as $trait>::Output, (SignalDep<S>,)>,
			>;

			fn $method(self) -> Self::Output {
				make_signal(self, $helper::<S> as fn(S) -> <S as $trait>::Output)
			}
		}

		impl<S, O> $trait for TempSignal<S, O>
		where
			S: $trait + PartialEq + 'static,
			O: Operation<Output = S> + Dependency<Value = S>,
			<S as $trait>::Output: PartialEq + 'static,
		{
			type Output = TempSignal<
				<S as $trait>::Output,
				FunctionOp<fn(S) -> <S as $trait>::Output, (O,)>,
			>;

			fn $method(self) -> Self::Output {
				make_signal(self, $helper::<S> as fn(S) -> <S as $trait>::Output)
			}
		}
	};
}

impl_binary_operator!(Add, add, apply_add);
impl_binary_operator!(Sub, sub, apply_sub);
impl_binary_operator!(Mul, mul, apply_mul);
impl_binary_operator!(Div, div, apply_div);
impl_binary_operator!(Rem, rem, apply_rem);
impl_binary_operator!(BitAnd, bitand, apply_bitand);
impl_binary_operator!(BitOr, bitor, apply_bitor);
impl_binary_operator!(BitXor, bitxor, apply_bitxor);
impl_binary_operator!(Shl, shl, apply_shl);
impl_binary_operator!(Shr, shr, apply_shr);

impl_unary_operator!(Neg, neg, apply_neg);
impl_unary_operator!(Not, not, apply_not);
