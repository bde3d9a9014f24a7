use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::effect::{track, trigger, DepKey, TrackOp, TriggerOp};
use crate::obj::{Key, Obj};
use crate::value::Value;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Variant {
	Mutable,
	ReadOnly,
}

/// Observable view over a raw target.
///
/// The mutable variant records reads and broadcasts writes; the read-only
/// variant does neither, and its writes silently leave the target
/// untouched. A read-only view built over a mutable one keeps delegating
/// reads through it, so those reads still track.
#[derive(Clone)]
pub struct Reactive {
	body: Rc<ReactiveBody>,
}

pub(crate) struct ReactiveBody {
	target: Obj,
	variant: Variant,
	/// The mutable wrapper this read-only view shields, when built from one.
	source: Option<Reactive>,
}

/// Wrap a target in a mutable observable view. Wrapping the same target
/// again returns the identical view.
pub fn reactive(target: &Obj) -> Reactive {
	wrapper(target, Variant::Mutable, None)
}

/// Wrap a target in a read-only view that never tracks or triggers.
pub fn readonly(target: &Obj) -> Reactive {
	wrapper(target, Variant::ReadOnly, None)
}

fn wrapper(target: &Obj, variant: Variant, source: Option<Reactive>) -> Reactive {
	let mut slots = target.body().wrappers.borrow_mut();
	let slot = match (variant, source.is_some()) {
		(Variant::Mutable, _) => &mut slots.mutable,
		(Variant::ReadOnly, false) => &mut slots.readonly,
		(Variant::ReadOnly, true) => &mut slots.readonly_view,
	};

	if let Some(existing) = slot.as_ref().and_then(Weak::upgrade) {
		return Reactive { body: existing };
	}

	let body = Rc::new(ReactiveBody {
		target: target.clone(),
		variant,
		source,
	});
	*slot = Some(Rc::downgrade(&body));

	Reactive { body }
}

impl Reactive {
	/// The raw target behind this view.
	pub fn raw(&self) -> &Obj {
		&self.body.target
	}

	pub fn variant(&self) -> Variant {
		self.body.variant
	}

	pub fn is_readonly(&self) -> bool {
		self.body.variant == Variant::ReadOnly
	}

	/// Read-only view over this one. Reads through the result keep
	/// tracking the target when this view is mutable; on an already
	/// read-only view this returns the view itself.
	pub fn readonly(&self) -> Reactive {
		if self.body.variant == Variant::ReadOnly {
			return self.clone();
		}
		wrapper(&self.body.target, Variant::ReadOnly, Some(self.clone()))
	}

	/// Read a property. Mutable views track the read; a stored ref is
	/// returned unwrapped (except for list elements, which keep their
	/// refs), and object results are lazily wrapped in this view's
	/// variant.
	pub fn get(&self, key: impl Into<Key>) -> Value {
		self.get_key(&key.into())
	}

	fn get_key(&self, key: &Key) -> Value {
		let target = &self.body.target;
		let res = match (self.body.variant, &self.body.source) {
			(Variant::Mutable, _) => {
				track(target, TrackOp::Get, DepKey::Prop(key.clone()));
				unwrap_stored_ref(target, key, target.get_raw(key))
			}
			(Variant::ReadOnly, Some(source)) => source.get_key(key),
			(Variant::ReadOnly, None) => unwrap_stored_ref(target, key, target.get_raw(key)),
		};
		match self.body.variant {
			Variant::Mutable => to_reactive(&res),
			Variant::ReadOnly => to_readonly(&res),
		}
	}

	/// Write a property. On read-only views this silently reports success
	/// without mutating. A slot currently holding a ref is assigned
	/// through the cell (unless the incoming value is itself a ref),
	/// preserving the cell's identity.
	pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
		self.set_key(key.into(), value.into())
	}

	fn set_key(&self, key: Key, value: Value) -> bool {
		if self.body.variant == Variant::ReadOnly {
			// the visible failure mode is the missing mutation
			return true;
		}

		let target = &self.body.target;
		let old = target.get_raw(&key);

		// store and compare raw forms, except read-only wrappers which
		// are kept verbatim
		let keep_wrapped = matches!(&value, Value::Wrapped(w) if w.is_readonly());
		let (old, value) = if keep_wrapped {
			(old, value)
		} else {
			(to_raw(&old), to_raw(&value))
		};

		if !target.is_list() {
			if let Value::Ref(cell) = &old {
				if !matches!(value, Value::Ref(_)) {
					// the cell's own dependency set does the triggering
					cell.set(value);
					return true;
				}
			}
		}

		let had = target.has_raw(&key);
		target.set_raw(key.clone(), value.clone());

		if !had {
			trigger(target, TriggerOp::Add, DepKey::Prop(key));
		} else if value.has_changed(&old) {
			trigger(target, TriggerOp::Set, DepKey::Prop(key));
		}
		true
	}

	/// Existence check; tracked on mutable views.
	pub fn has(&self, key: impl Into<Key>) -> bool {
		let key = key.into();
		match (self.body.variant, &self.body.source) {
			(Variant::Mutable, _) => {
				track(&self.body.target, TrackOp::Has, DepKey::Prop(key.clone()));
				self.body.target.has_raw(&key)
			}
			(Variant::ReadOnly, Some(source)) => source.has(key),
			(Variant::ReadOnly, None) => self.body.target.has_raw(&key),
		}
	}

	/// Delete a property, waking subscribers only when the key existed.
	/// On read-only views this silently reports success.
	pub fn remove(&self, key: impl Into<Key>) -> bool {
		if self.body.variant == Variant::ReadOnly {
			return true;
		}
		let key = key.into();
		let target = &self.body.target;
		let had = target.has_raw(&key);
		let removed = target.remove_raw(&key);
		if removed && had {
			trigger(target, TriggerOp::Delete, DepKey::Prop(key));
		}
		removed
	}

	/// List the target's keys. Subscribes mutable views to the iteration
	/// pseudo-key, so key addition and removal re-run the reader.
	pub fn keys(&self) -> Vec<Key> {
		match (self.body.variant, &self.body.source) {
			(Variant::Mutable, _) => {
				track(&self.body.target, TrackOp::Iterate, DepKey::Iterate);
				self.body.target.keys_raw()
			}
			(Variant::ReadOnly, Some(source)) => source.keys(),
			(Variant::ReadOnly, None) => self.body.target.keys_raw(),
		}
	}
}

/// Ref auto-unwrapping on property reads. List elements are exempt: a ref
/// stored in a list comes back still wrapped.
fn unwrap_stored_ref(target: &Obj, key: &Key, value: Value) -> Value {
	match value {
		Value::Ref(cell) if !(target.is_list() && key.is_index()) => cell.get(),
		other => other,
	}
}

/// True for mutable views, and for read-only views that shield one.
pub fn is_reactive(value: &Value) -> bool {
	match value {
		Value::Wrapped(wrapped) => match wrapped.body.variant {
			Variant::Mutable => true,
			Variant::ReadOnly => wrapped.body.source.is_some(),
		},
		_ => false,
	}
}

pub fn is_readonly(value: &Value) -> bool {
	matches!(value, Value::Wrapped(w) if w.body.variant == Variant::ReadOnly)
}

pub fn is_wrapped(value: &Value) -> bool {
	matches!(value, Value::Wrapped(_))
}

/// Strip the observable wrapper, if any, returning the raw target.
pub fn to_raw(value: &Value) -> Value {
	match value {
		Value::Wrapped(wrapped) => Value::Obj(wrapped.body.target.clone()),
		other => other.clone(),
	}
}

/// Wrap object values mutably; everything else passes through unchanged,
/// including existing wrappers of either variant.
pub fn to_reactive(value: &Value) -> Value {
	match value {
		Value::Obj(obj) => Value::Wrapped(reactive(obj)),
		other => other.clone(),
	}
}

/// Wrap object values read-only; a mutable wrapper becomes the read-only
/// view shielding it.
pub fn to_readonly(value: &Value) -> Value {
	match value {
		Value::Obj(obj) => Value::Wrapped(readonly(obj)),
		Value::Wrapped(w) if w.body.variant == Variant::Mutable => {
			Value::Wrapped(w.readonly())
		}
		other => other.clone(),
	}
}

impl PartialEq for Reactive {
	fn eq(&self, other: &Self) -> bool {
		Obj::ptr_eq(&self.body.target, &other.body.target)
			&& self.body.variant == other.body.variant
			&& self.body.source.is_some() == other.body.source.is_some()
	}
}

impl Eq for Reactive {}

impl Debug for Reactive {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Reactive")
			.field("variant", &self.body.variant)
			.field("target", &self.body.target)
			.finish()
	}
}
