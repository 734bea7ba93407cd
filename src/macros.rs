pub use enclose::*;

/// Attach an observer with clone-capture convenience: the listed bindings
/// are cloned into the callback via `enclose`.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let ctx = ripple::Context::new();
/// let value = ctx.var(1);
/// let seen = Rc::new(Cell::new(0));
///
/// let _obs = ripple::observe!((seen) value.signal() => |v| seen.set(*v));
/// value.set(2);
/// assert_eq!(seen.get(), 2);
/// ```
#[macro_export]
macro_rules! observe {
	(( $($d_tt:tt)* ) $subject:expr => |$value:pat_param| $($b:tt)*) => {
		$crate::observe(&$subject, $crate::macros::enclose!(($( $d_tt )*) move |$value| { $($b)* }))
	};
	($subject:expr => |$value:pat_param| $($b:tt)*) => {
		$crate::observe(&$subject, move |$value| { $($b)* })
	};
}
