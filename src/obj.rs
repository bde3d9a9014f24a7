use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use fxhash::FxHashMap;

use crate::dep::Dep;
use crate::effect::DepKey;
use crate::reactive::ReactiveBody;
use crate::value::Value;

/// Property key of an observed target.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Key {
	Name(Rc<str>),
	Index(usize),
}

impl Key {
	pub fn name(name: impl AsRef<str>) -> Self {
		Key::Name(Rc::from(name.as_ref()))
	}

	pub fn is_index(&self) -> bool {
		matches!(self, Key::Index(_))
	}
}

impl From<&str> for Key {
	fn from(name: &str) -> Self {
		Key::Name(Rc::from(name))
	}
}

impl From<String> for Key {
	fn from(name: String) -> Self {
		Key::Name(Rc::from(name.as_str()))
	}
}

impl From<usize> for Key {
	fn from(index: usize) -> Self {
		Key::Index(index)
	}
}

/// A raw observable target: a shared, mutable key/value table. Raw access
/// never tracks or triggers; observation goes through a wrapper built with
/// [`reactive`](crate::reactive) or [`readonly`](crate::readonly).
///
/// The target also carries its own dependency-map row and wrapper-cache
/// slots, so both die together with the object.
#[derive(Clone)]
pub struct Obj {
	body: Rc<ObjBody>,
}

pub(crate) struct ObjBody {
	list: bool,
	entries: RefCell<BTreeMap<Key, Value>>,
	pub(crate) deps: RefCell<FxHashMap<DepKey, Dep>>,
	pub(crate) wrappers: RefCell<WrapperSlots>,
}

/// Identity cache: one wrapper per (target, variant) pair. Weak slots,
/// since the wrapper body points back at the target.
#[derive(Default)]
pub(crate) struct WrapperSlots {
	pub(crate) mutable: Option<Weak<ReactiveBody>>,
	pub(crate) readonly: Option<Weak<ReactiveBody>>,
	pub(crate) readonly_view: Option<Weak<ReactiveBody>>,
}

impl Obj {
	pub fn new() -> Self {
		Obj::with_kind(false)
	}

	/// An index-keyed target. Lists keep their element refs wrapped on
	/// access instead of auto-unwrapping them.
	pub fn list() -> Self {
		Obj::with_kind(true)
	}

	fn with_kind(list: bool) -> Self {
		Obj {
			body: Rc::new(ObjBody {
				list,
				entries: RefCell::new(BTreeMap::new()),
				deps: RefCell::new(FxHashMap::default()),
				wrappers: RefCell::new(WrapperSlots::default()),
			}),
		}
	}

	pub fn is_list(&self) -> bool {
		self.body.list
	}

	pub fn ptr_eq(a: &Obj, b: &Obj) -> bool {
		Rc::ptr_eq(&a.body, &b.body)
	}

	/// Read a property without tracking. Absent keys read as [`Value::Null`].
	pub fn get_raw(&self, key: &Key) -> Value {
		self.body
			.entries
			.borrow()
			.get(key)
			.cloned()
			.unwrap_or(Value::Null)
	}

	/// Write a property without triggering, like mutating the original
	/// object behind its wrapper's back.
	pub fn set_raw(&self, key: impl Into<Key>, value: impl Into<Value>) {
		self.body.entries.borrow_mut().insert(key.into(), value.into());
	}

	/// Append to an index-keyed target.
	pub fn push_raw(&self, value: impl Into<Value>) {
		let index = self.body.entries.borrow().len();
		self.set_raw(Key::Index(index), value);
	}

	pub fn has_raw(&self, key: &Key) -> bool {
		self.body.entries.borrow().contains_key(key)
	}

	pub fn remove_raw(&self, key: &Key) -> bool {
		self.body.entries.borrow_mut().remove(key).is_some()
	}

	pub fn keys_raw(&self) -> Vec<Key> {
		self.body.entries.borrow().keys().cloned().collect()
	}

	pub fn len_raw(&self) -> usize {
		self.body.entries.borrow().len()
	}

	pub(crate) fn body(&self) -> &ObjBody {
		&self.body
	}
}

impl Default for Obj {
	fn default() -> Self {
		Obj::new()
	}
}

impl PartialEq for Obj {
	fn eq(&self, other: &Self) -> bool {
		Obj::ptr_eq(self, other)
	}
}

impl Eq for Obj {}

impl Debug for Obj {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let entries = self.body.entries.borrow();
		f.debug_map().entries(entries.iter()).finish()
	}
}
