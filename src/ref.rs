use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use tracing::trace;

use crate::computed::ComputedBody;
use crate::dep::Dep;
use crate::effect::{pause_tracking, reset_tracking};
use crate::obj::Key;
use crate::reactive::{to_raw, to_reactive, Reactive};
use crate::value::Value;

/// Single-slot observable value holder.
///
/// Three shapes share the type: a plain cell with its own dependency set,
/// a forwarding view over one property of a reactive object, and the
/// ref-shaped face of a computed cell.
#[derive(Clone)]
pub struct Ref {
	body: Rc<RefBody>,
}

enum RefBody {
	Cell(CellRef),
	Property(PropertyRef),
	Computed(Rc<ComputedBody>),
}

struct CellRef {
	raw: RefCell<Value>,
	tracked: RefCell<Value>,
	dep: Dep,
}

struct PropertyRef {
	source: Reactive,
	key: Key,
}

impl Ref {
	/// A cell holding `value`. Object values are kept in both raw and
	/// reactive-wrapped form, so nested mutation stays observable.
	pub fn new(value: impl Into<Value>) -> Ref {
		let value = value.into();
		Ref {
			body: Rc::new(RefBody::Cell(CellRef {
				raw: RefCell::new(to_raw(&value)),
				tracked: RefCell::new(to_reactive(&value)),
				dep: Dep::new(),
			})),
		}
	}

	pub(crate) fn from_computed(body: Rc<ComputedBody>) -> Ref {
		Ref {
			body: Rc::new(RefBody::Computed(body)),
		}
	}

	/// Read the value, subscribing the active effect.
	pub fn get(&self) -> Value {
		match &*self.body {
			RefBody::Cell(cell) => {
				cell.dep.track();
				cell.tracked.borrow().clone()
			}
			RefBody::Property(prop) => prop.source.get(prop.key.clone()),
			RefBody::Computed(computed) => computed.read(),
		}
	}

	/// Read without subscribing. A stale computed still recomputes first.
	pub fn get_untracked(&self) -> Value {
		match &*self.body {
			RefBody::Cell(cell) => cell.tracked.borrow().clone(),
			RefBody::Property(prop) => prop.source.raw().get_raw(&prop.key),
			RefBody::Computed(computed) => computed.read_untracked(),
		}
	}

	/// Write the value, waking subscribers when it changed under the
	/// same-value predicate. Writes through a computed-backed ref are
	/// silently ignored.
	pub fn set(&self, value: impl Into<Value>) {
		let value = value.into();
		match &*self.body {
			RefBody::Cell(cell) => cell.set(value),
			RefBody::Property(prop) => {
				prop.source.set(prop.key.clone(), value);
			}
			RefBody::Computed(_) => {}
		}
	}

	/// Apply `func` to the current value and store the result through the
	/// normal changed check.
	pub fn update(&self, func: impl FnOnce(Value) -> Value) {
		let next = func(self.get_untracked());
		self.set(next);
	}

	pub fn ptr_eq(a: &Ref, b: &Ref) -> bool {
		if Rc::ptr_eq(&a.body, &b.body) {
			return true;
		}
		match (&*a.body, &*b.body) {
			// two ref faces of the same computed are the same cell
			(RefBody::Computed(x), RefBody::Computed(y)) => Rc::ptr_eq(x, y),
			_ => false,
		}
	}
}

impl CellRef {
	fn set(&self, value: Value) {
		let keep_wrapped = matches!(&value, Value::Wrapped(w) if w.is_readonly());
		let value = if keep_wrapped { value } else { to_raw(&value) };

		let changed = value.has_changed(&self.raw.borrow());
		if changed {
			trace!("ref set");
			*self.raw.borrow_mut() = value.clone();
			*self.tracked.borrow_mut() = if keep_wrapped {
				value
			} else {
				to_reactive(&value)
			};
			self.dep.trigger();
		}
	}
}

pub fn is_ref(value: &Value) -> bool {
	matches!(value, Value::Ref(_))
}

/// The inner value for refs (a tracked read); anything else unchanged.
pub fn unref(value: &Value) -> Value {
	match value {
		Value::Ref(cell) => cell.get(),
		other => other.clone(),
	}
}

/// Ref-shaped view over one property of a reactive object. Reads and
/// writes forward to the source, inheriting its tracking and triggering;
/// the view owns no dependency set. A property already holding a genuine
/// cell is returned directly.
pub fn to_ref(source: &Reactive, key: impl Into<Key>) -> Ref {
	let key = key.into();
	if let Value::Ref(existing) = source.raw().get_raw(&key) {
		return existing;
	}
	Ref {
		body: Rc::new(RefBody::Property(PropertyRef {
			source: source.clone(),
			key,
		})),
	}
}

/// Property refs for every current key of `source`. Listing the keys here
/// is bookkeeping, not a data dependency of the caller, so it runs with
/// tracking paused.
pub fn to_refs(source: &Reactive) -> Vec<(Key, Ref)> {
	pause_tracking();
	let keys = source.keys();
	reset_tracking();

	keys.into_iter()
		.map(|key| {
			let view = to_ref(source, key.clone());
			(key, view)
		})
		.collect()
}

impl Debug for Ref {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Ref").field(&self.get_untracked()).finish()
	}
}
