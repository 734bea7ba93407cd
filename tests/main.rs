use std::cell::Cell;
use std::rc::Rc;

use mockall::predicate;
use ripple::{make_signal, observe, Context, ObserverAction, ScopedObserver};

use mock::ValueSpy;

#[test]
fn diamond_settles_with_one_downstream_evaluation() {
	let ctx = Context::new();
	let a = ctx.var(1);
	let b = a.map(|v| v + 1).into_signal();
	let c = a.map(|v| v * 2).into_signal();

	let evaluations = Rc::new(Cell::new(0u32));
	let d = make_signal((&b, &c), {
		let evaluations = evaluations.clone();
		move |b: i32, c: i32| {
			evaluations.set(evaluations.get() + 1);
			b + c
		}
	})
	.into_signal();

	assert_eq!(d.get(), 4);
	let before = evaluations.get();

	a.set(3);

	assert_eq!(b.get(), 4);
	assert_eq!(c.get(), 6);
	assert_eq!(d.get(), 10);
	assert_eq!(evaluations.get(), before + 1);
}

#[test]
fn transaction_batches_inputs_into_one_wave() {
	let ctx = Context::new();
	let x = ctx.var(0);
	let y = ctx.var(0);
	let s = make_signal((&x, &y), |x: i32, y: i32| x + y).into_signal();

	let spy = mock::SharedSpy::new();

	let _obs = observe(&s, {
		let spy = spy.clone();
		move |value: &i32| spy.get().notify(*value)
	});

	spy.get()
		.expect_notify()
		.with(predicate::eq(3))
		.times(1)
		.return_const(());

	ctx.transaction(|| {
		x.set(1);
		y.set(2);
	});

	assert_eq!(s.get(), 3);
	spy.get().checkpoint();
}

#[test]
fn equal_write_is_invisible_downstream() {
	let ctx = Context::new();
	let a = ctx.var(1);
	let b = a.map(|v| v * 1).into_signal();

	let calls = Rc::new(Cell::new(0u32));
	let seen = Rc::new(Cell::new(0));

	let _obs = observe(&b, {
		let calls = calls.clone();
		let seen = seen.clone();
		move |value: &i32| {
			calls.set(calls.get() + 1);
			seen.set(*value);
		}
	});

	a.set(1);
	assert_eq!(calls.get(), 0);

	a.set(2);
	assert_eq!(calls.get(), 1);
	assert_eq!(seen.get(), 2);
}

#[test]
fn flatten_tracks_the_selected_inner() {
	let ctx = Context::new();
	let inner1 = ctx.var(10);
	let inner2 = ctx.var(20);
	let outer = ctx.var(inner1.signal());
	let flat = ripple::flatten(&outer.signal());

	assert_eq!(flat.get(), 10);

	outer.set(inner2.signal());
	assert_eq!(flat.get(), 20);

	// The old inner is unhooked; its changes no longer leak through.
	inner1.set(99);
	assert_eq!(flat.get(), 20);

	inner2.set(30);
	assert_eq!(flat.get(), 30);
}

#[test]
fn flatten_switch_and_old_inner_write_in_one_transaction() {
	let ctx = Context::new();
	let inner1 = ctx.var(10);
	let inner2 = ctx.var(20);
	let outer = ctx.var(inner1.signal());
	let flat = outer.signal().flatten();

	ctx.transaction(|| {
		inner1.set(11);
		outer.set(inner2.signal());
	});

	assert_eq!(flat.get(), 20);
	assert_eq!(inner1.get(), 11);
}

#[test]
fn observer_detaches_itself_after_three_calls() {
	let ctx = Context::new();
	let v = ctx.var(0);

	let calls = Rc::new(Cell::new(0u32));

	let _obs = observe(&v.signal(), {
		let calls = calls.clone();
		move |_value: &i32| {
			calls.set(calls.get() + 1);
			if calls.get() == 3 {
				ObserverAction::StopAndDetach
			} else {
				ObserverAction::Next
			}
		}
	});

	for value in 1..=5 {
		v.set(value);
	}

	assert_eq!(calls.get(), 3);
}

#[test]
fn detached_observer_stays_silent() {
	let ctx = Context::new();
	let v = ctx.var(0);

	let calls = Rc::new(Cell::new(0u32));

	let obs = observe(&v.signal(), {
		let calls = calls.clone();
		move |_value: &i32| calls.set(calls.get() + 1)
	});

	v.set(1);
	assert_eq!(calls.get(), 1);

	obs.detach();

	v.set(2);
	v.set(3);
	assert_eq!(calls.get(), 1);
}

#[test]
fn modify_propagates_even_without_a_change() {
	let ctx = Context::new();
	let v = ctx.var(5);

	let calls = Rc::new(Cell::new(0u32));

	let _obs = observe(&v.signal(), {
		let calls = calls.clone();
		move |_value: &i32| calls.set(calls.get() + 1)
	});

	v.set(5);
	assert_eq!(calls.get(), 0);

	// In-place mutation has no pre-image to compare against, so it always
	// counts as a change.
	v.modify(|value| *value = 5);
	assert_eq!(calls.get(), 1);
}

#[test]
fn modify_after_set_lands_on_the_staged_value() {
	let ctx = Context::new();
	let v = ctx.var(1);

	let calls = Rc::new(Cell::new(0u32));
	let seen = Rc::new(Cell::new(0));

	let _obs = observe(&v.signal(), {
		let calls = calls.clone();
		let seen = seen.clone();
		move |value: &i32| {
			calls.set(calls.get() + 1);
			seen.set(*value);
		}
	});

	ctx.transaction(|| {
		v.set(2);
		v.modify(|value| *value += 1);

		// The replacement is staged, not live, until the transaction exits.
		assert_eq!(v.get(), 1);
	});

	assert_eq!(v.get(), 3);
	assert_eq!(calls.get(), 1);
	assert_eq!(seen.get(), 3);
}

#[test]
fn nested_transactions_commit_at_the_outermost_exit() {
	let ctx = Context::new();
	let x = ctx.var(0);

	let calls = Rc::new(Cell::new(0u32));
	let seen = Rc::new(Cell::new(0));

	let _obs = observe(&x.signal(), {
		let calls = calls.clone();
		let seen = seen.clone();
		move |value: &i32| {
			calls.set(calls.get() + 1);
			seen.set(*value);
		}
	});

	ctx.transaction(|| {
		x.set(1);
		ctx.transaction(|| {
			x.set(2);
		});
		assert_eq!(calls.get(), 0);
	});

	assert_eq!(calls.get(), 1);
	assert_eq!(seen.get(), 2);
}

#[test]
fn dropping_the_handle_keeps_the_observer_attached() {
	let ctx = Context::new();
	let v = ctx.var(0);

	let calls = Rc::new(Cell::new(0u32));

	{
		let _ = observe(&v.signal(), {
			let calls = calls.clone();
			move |_value: &i32| calls.set(calls.get() + 1)
		});
	}

	v.set(1);
	assert_eq!(calls.get(), 1);
}

#[test]
fn scoped_observer_detaches_on_drop() {
	let ctx = Context::new();
	let v = ctx.var(0);

	let calls = Rc::new(Cell::new(0u32));

	{
		let _scoped: ScopedObserver = observe(&v.signal(), {
			let calls = calls.clone();
			move |_value: &i32| calls.set(calls.get() + 1)
		})
		.into();

		v.set(1);
		assert_eq!(calls.get(), 1);
	}

	v.set(2);
	assert_eq!(calls.get(), 1);
}

#[test]
fn toggle_flips_and_propagates() {
	let ctx = Context::new();
	let flag = ctx.var(false);

	let calls = Rc::new(Cell::new(0u32));

	let _obs = observe(&flag.signal(), {
		let calls = calls.clone();
		move |_value: &bool| calls.set(calls.get() + 1)
	});

	flag.toggle();
	assert!(flag.get());
	assert_eq!(calls.get(), 1);

	flag.toggle();
	assert!(!flag.get());
	assert_eq!(calls.get(), 2);
}

#[test]
fn observe_macro_captures_by_clone() {
	let ctx = Context::new();
	let v = ctx.var(0);

	let seen = Rc::new(Cell::new(0));

	let _obs = ripple::observe!((seen) v.signal() => |value| seen.set(*value));

	v.set(7);
	assert_eq!(seen.get(), 7);
}

#[test]
fn long_chain_settles_in_order() {
	let ctx = Context::new();
	let a = ctx.var(0);
	let b = a.map(|v| v + 1).into_signal();
	let c = b.map(|v| v + 1).into_signal();
	let d = c.map(|v| v + 1).into_signal();
	let e = d.map(|v| v + 1).into_signal();

	assert_eq!(e.get(), 4);

	a.set(10);
	assert_eq!(e.get(), 14);
}

#[test]
fn make_signal_combines_up_to_four_dependencies() {
	let ctx = Context::new();
	let a = ctx.var(1);
	let b = ctx.var(2);
	let c = ctx.var(3);
	let d = ctx.var(4);

	let sum3 = make_signal((&a, &b, &c), |a: i32, b: i32, c: i32| a + b + c).into_signal();
	let sum4 =
		make_signal((&a, &b, &c, &d), |a: i32, b: i32, c: i32, d: i32| a + b + c + d).into_signal();

	assert_eq!(sum3.get(), 6);
	assert_eq!(sum4.get(), 10);

	ctx.transaction(|| {
		a.set(10);
		d.set(40);
	});

	assert_eq!(sum3.get(), 15);
	assert_eq!(sum4.get(), 55);
}

#[test]
fn signal_equality_is_node_identity() {
	let ctx = Context::new();
	let v = ctx.var(1);
	let w = ctx.var(1);

	assert_eq!(v.signal(), v.signal());
	assert_ne!(v.signal(), w.signal());
}

#[test]
fn context_clones_are_the_same_context() {
	let ctx = Context::new();
	let clone = ctx.clone();

	assert_eq!(ctx, clone);
	assert_ne!(ctx, Context::new());
}

#[test]
#[should_panic(expected = "different contexts")]
fn cross_context_composition_panics() {
	let a = Context::new().var(1);
	let b = Context::new().var(2);

	let _ = make_signal((&a, &b), |a: i32, b: i32| a + b);
}
