use std::fmt::Debug;
use std::rc::Rc;

use crate::obj::Obj;
use crate::r#ref::Ref;
use crate::reactive::Reactive;

/// A dynamically typed slot in an observed object graph. Clones are cheap;
/// heap-backed variants share their backing store.
#[derive(Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Num(f64),
	Str(Rc<str>),
	Obj(Obj),
	Wrapped(Reactive),
	Ref(Ref),
}

impl Value {
	/// Same-value equality: numbers treat NaN as equal to NaN, strings
	/// compare by content, heap values by identity.
	pub fn same_value(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Num(a), Value::Num(b)) => a == b || (a.is_nan() && b.is_nan()),
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Obj(a), Value::Obj(b)) => Obj::ptr_eq(a, b),
			(Value::Wrapped(a), Value::Wrapped(b)) => a == b,
			(Value::Ref(a), Value::Ref(b)) => Ref::ptr_eq(a, b),
			_ => false,
		}
	}

	/// The changed predicate used by every write path.
	pub fn has_changed(&self, old: &Value) -> bool {
		!self.same_value(old)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_num(&self) -> Option<f64> {
		match self {
			Value::Num(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_obj(&self) -> Option<&Obj> {
		match self {
			Value::Obj(obj) => Some(obj),
			_ => None,
		}
	}

	pub fn as_wrapped(&self) -> Option<&Reactive> {
		match self {
			Value::Wrapped(wrapped) => Some(wrapped),
			_ => None,
		}
	}

	pub fn as_ref_cell(&self) -> Option<&Ref> {
		match self {
			Value::Ref(cell) => Some(cell),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.same_value(other)
	}
}

impl Eq for Value {}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Num(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Num(value as f64)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Num(value as f64)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Str(Rc::from(value))
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Str(Rc::from(value.as_str()))
	}
}

impl From<Obj> for Value {
	fn from(value: Obj) -> Self {
		Value::Obj(value)
	}
}

impl From<Reactive> for Value {
	fn from(value: Reactive) -> Self {
		Value::Wrapped(value)
	}
}

impl From<Ref> for Value {
	fn from(value: Ref) -> Self {
		Value::Ref(value)
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(b) => b.fmt(f),
			Value::Num(n) => n.fmt(f),
			Value::Str(s) => s.fmt(f),
			Value::Obj(obj) => obj.fmt(f),
			Value::Wrapped(wrapped) => wrapped.fmt(f),
			Value::Ref(cell) => cell.fmt(f),
		}
	}
}
