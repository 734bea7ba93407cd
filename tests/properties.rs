use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use ripple::{make_signal, observe, Context};

proptest! {
	#[test]
	fn equal_writes_never_propagate(initial in -1000i64..1000) {
		let ctx = Context::new();
		let v = ctx.var(initial);
		let doubled = v.map(|x| x * 2).into_signal();

		let calls = Rc::new(Cell::new(0u32));
		let _obs = observe(&doubled, {
			let calls = calls.clone();
			move |_value: &i64| calls.set(calls.get() + 1)
		});

		v.set(initial);

		prop_assert_eq!(calls.get(), 0);
	}

	#[test]
	fn diamond_reevaluates_once_per_wave(
		initial in -1000i64..1000,
		next in -1000i64..1000,
	) {
		prop_assume!(initial != next);

		let ctx = Context::new();
		let a = ctx.var(initial);
		let b = a.map(|v| v + 1).into_signal();
		let c = a.map(|v| v * 2).into_signal();

		let evaluations = Rc::new(Cell::new(0u32));
		let d = make_signal((&b, &c), {
			let evaluations = evaluations.clone();
			move |b: i64, c: i64| {
				evaluations.set(evaluations.get() + 1);
				b + c
			}
		})
		.into_signal();

		let before = evaluations.get();
		a.set(next);

		prop_assert_eq!(evaluations.get(), before + 1);
		prop_assert_eq!(d.get(), (next + 1) + next * 2);
	}

	#[test]
	fn transactions_are_atomic(x in -1000i64..1000, y in -1000i64..1000) {
		prop_assume!(x + y != 0);

		let ctx = Context::new();
		let a = ctx.var(0i64);
		let b = ctx.var(0i64);
		let sum = make_signal((&a, &b), |a: i64, b: i64| a + b).into_signal();

		let seen = Rc::new(RefCell::new(Vec::new()));
		let _obs = observe(&sum, {
			let seen = seen.clone();
			move |value: &i64| seen.borrow_mut().push(*value)
		});

		ctx.transaction(|| {
			a.set(x);
			b.set(y);
		});

		// The observer saw the pair land together or not at all; never a
		// half-applied combination.
		prop_assert_eq!(&*seen.borrow(), &vec![x + y]);
	}

	#[test]
	fn fused_expressions_match_plain_arithmetic(
		x in -1000i64..1000,
		y in -1000i64..1000,
		z in -1000i64..1000,
	) {
		let ctx = Context::new();
		let a = ctx.var(0i64);
		let b = ctx.var(0i64);
		let c = ctx.var(0i64);

		let grouped = ((&a + &b) * &c).into_signal();
		let chained = (&a + &b * &c).into_signal();
		let negated = (-&a - &b).into_signal();

		ctx.transaction(|| {
			a.set(x);
			b.set(y);
			c.set(z);
		});

		prop_assert_eq!(grouped.get(), (x + y) * z);
		prop_assert_eq!(chained.get(), x + y * z);
		prop_assert_eq!(negated.get(), -x - y);
	}
}
