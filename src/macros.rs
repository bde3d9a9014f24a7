pub use enclose::*;

/// Build a raw object: `obj! { count: 1, label: "hi" }`.
#[macro_export]
macro_rules! obj {
	() => { $crate::Obj::new() };
	( $( $key:ident : $value:expr ),+ $(,)? ) => {{
		let target = $crate::Obj::new();
		$( target.set_raw(stringify!($key), $value); )+
		target
	}};
}

/// Build a raw list: `list![1, 2, 3]`.
#[macro_export]
macro_rules! list {
	( $( $value:expr ),* $(,)? ) => {{
		let target = $crate::Obj::list();
		$( target.push_raw($value); )*
		target
	}};
}

/// Register an effect capturing clones of the named handles:
/// `effect!((state) { ... })`.
#[macro_export]
macro_rules! effect {
	(( $($d_tt:tt)* ) $($b:tt)*) => {
		$crate::Effect::new($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
	};
}

/// Derive a computed cell capturing clones of the named handles:
/// `computed!((state) state.get("count"))`.
#[macro_export]
macro_rules! computed {
	(( $($d_tt:tt)* ) $($b:tt)*) => {
		$crate::Computed::new($crate::macros::enclose!(($( $d_tt )*) move || $crate::Value::from({ $($b)* })))
	};
}
