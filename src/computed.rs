use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::dep::Dep;
use crate::effect::{Effect, EffectOptions};
use crate::r#ref::Ref;
use crate::value::Value;

/// Lazily recomputed, cached derived value.
///
/// An internal effect watches the getter's dependencies; its scheduler only
/// marks the cell stale and wakes the cell's own subscribers, who pull the
/// fresh value on their next read. Recomputation happens at most once per
/// invalidation, however many reads follow.
#[derive(Clone)]
pub struct Computed {
	body: Rc<ComputedBody>,
}

pub(crate) struct ComputedBody {
	value: RefCell<Value>,
	dirty: Cell<bool>,
	dep: Dep,
	effect: Effect,
}

/// Derive a computed cell from `getter`.
pub fn computed(getter: impl Fn() -> Value + 'static) -> Computed {
	Computed::new(getter)
}

impl Computed {
	pub fn new(getter: impl Fn() -> Value + 'static) -> Computed {
		let getter = Rc::new(getter);
		let body = Rc::new_cyclic(|this: &Weak<ComputedBody>| {
			let runner = {
				let this = this.clone();
				let getter = getter.clone();
				move || {
					if let Some(body) = this.upgrade() {
						let next = getter();
						*body.value.borrow_mut() = next;
					}
				}
			};
			let scheduler = {
				let this = this.clone();
				move || {
					if let Some(body) = this.upgrade() {
						body.invalidate();
					}
				}
			};
			ComputedBody {
				value: RefCell::new(Value::Null),
				dirty: Cell::new(true),
				dep: Dep::new(),
				effect: Effect::with_options(
					runner,
					EffectOptions {
						lazy: true,
						scheduler: Some(Box::new(scheduler)),
					},
				),
			}
		});
		Computed { body }
	}

	/// Read the cached value, recomputing first when a dependency changed
	/// since the last read. Subscribes the active effect to this cell.
	pub fn get(&self) -> Value {
		self.body.read()
	}

	/// Read without subscribing; still recomputes when stale.
	pub fn get_untracked(&self) -> Value {
		self.body.read_untracked()
	}

	/// The ref-shaped face of this cell: `is_ref` holds for it, `unref`
	/// unwraps it, and reactive objects auto-unwrap it on property reads.
	pub fn into_ref(self) -> Ref {
		Ref::from_computed(self.body)
	}
}

impl ComputedBody {
	pub(crate) fn read(&self) -> Value {
		self.dep.track();
		self.refresh();
		self.value.borrow().clone()
	}

	pub(crate) fn read_untracked(&self) -> Value {
		self.refresh();
		self.value.borrow().clone()
	}

	fn refresh(&self) {
		if self.dirty.get() {
			self.effect.run();
			self.dirty.set(false);
		}
	}

	/// Push half of the cell: mark stale and notify readers. The next
	/// read pulls the new value; nothing recomputes here.
	fn invalidate(&self) {
		if !self.dirty.get() {
			self.dirty.set(true);
			trace!("computed invalidated");
			self.dep.trigger();
		}
	}
}

impl From<Computed> for Ref {
	fn from(computed: Computed) -> Ref {
		computed.into_ref()
	}
}

impl From<Computed> for Value {
	fn from(computed: Computed) -> Value {
		Value::Ref(computed.into_ref())
	}
}
