use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::trace;

use crate::dep::Dep;
use crate::obj::{Key, Obj};

/// Kind of read being tracked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TrackOp {
	Get,
	Has,
	Iterate,
}

/// Kind of write being broadcast. `Add` and `Delete` are structural: they
/// also wake enumeration subscribers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TriggerOp {
	Set,
	Add,
	Delete,
}

/// One observed location of a target: a concrete property, or the reserved
/// iteration pseudo-key that enumeration reads subscribe to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum DepKey {
	Prop(Key),
	Iterate,
}

impl From<Key> for DepKey {
	fn from(key: Key) -> Self {
		DepKey::Prop(key)
	}
}

impl From<&str> for DepKey {
	fn from(name: &str) -> Self {
		DepKey::Prop(Key::from(name))
	}
}

impl From<usize> for DepKey {
	fn from(index: usize) -> Self {
		DepKey::Prop(Key::Index(index))
	}
}

thread_local! {
	static STACK: RefCell<Vec<Rc<EffectBody>>> = RefCell::new(Vec::new());
	static SHOULD_TRACK: Cell<bool> = Cell::new(true);
	static TRACK_STATES: RefCell<Vec<bool>> = RefCell::new(Vec::new());
}

#[derive(Default)]
pub struct EffectOptions {
	/// Do not run on registration; the first run happens through
	/// [`Effect::run`] or a trigger.
	pub lazy: bool,
	/// Called instead of re-running when a dependency changes.
	pub scheduler: Option<Box<dyn Fn()>>,
}

/// A registered computation that re-runs when its tracked dependencies
/// change. Dropping the handle tears the subscriptions down; dependency
/// sets never keep an effect alive on their own.
#[derive(Clone)]
pub struct Effect {
	body: Rc<EffectBody>,
}

pub(crate) struct EffectBody {
	func: Box<dyn Fn()>,
	scheduler: Option<Box<dyn Fn()>>,
	deps: RefCell<SmallVec<[Dep; 4]>>,
	this: Weak<EffectBody>,
}

/// Register `func` as an effect and run it once immediately.
#[must_use]
pub fn effect(func: impl Fn() + 'static) -> Effect {
	Effect::new(func)
}

impl Effect {
	#[must_use]
	pub fn new(func: impl Fn() + 'static) -> Self {
		Effect::with_options(func, EffectOptions::default())
	}

	#[must_use]
	pub fn with_options(func: impl Fn() + 'static, options: EffectOptions) -> Self {
		let effect = Effect {
			body: Rc::new_cyclic(|this| EffectBody {
				func: Box::new(func),
				scheduler: options.scheduler,
				deps: RefCell::new(SmallVec::new()),
				this: this.clone(),
			}),
		};

		if !options.lazy {
			effect.run();
		}

		effect
	}

	/// Force a run, re-collecting dependencies from scratch.
	pub fn run(&self) {
		run_body(&self.body);
	}
}

impl EffectBody {
	pub(crate) fn subscriber(&self) -> Weak<EffectBody> {
		self.this.clone()
	}

	pub(crate) fn remember(&self, dep: Dep) {
		self.deps.borrow_mut().push(dep);
	}
}

impl Drop for EffectBody {
	fn drop(&mut self) {
		for dep in self.deps.borrow().iter() {
			dep.remove(&self.this);
		}
	}
}

fn run_body(body: &Rc<EffectBody>) {
	// a trigger raised by this effect's own writes must not re-enter it
	let running = STACK.with(|stack| stack.borrow().iter().any(|e| Rc::ptr_eq(e, body)));
	if running {
		return;
	}

	cleanup(body);

	STACK.with(|stack| stack.borrow_mut().push(body.clone()));
	let _guard = StackGuard;
	trace!("effect run");
	(body.func)();
}

/// Pops the effect stack even when the effect panics, so no stale active
/// effect survives an unwind.
struct StackGuard;

impl Drop for StackGuard {
	fn drop(&mut self) {
		STACK.with(|stack| {
			stack.borrow_mut().pop();
		});
	}
}

/// Drop every subscription the effect holds. Runs before each execution,
/// so reads that a changed branch no longer performs stop re-triggering.
fn cleanup(body: &Rc<EffectBody>) {
	let mut deps = body.deps.borrow_mut();
	if !deps.is_empty() {
		for dep in deps.iter() {
			dep.remove(&body.this);
		}
		deps.clear();
	}
}

pub(crate) fn tracked_effect() -> Option<Rc<EffectBody>> {
	if !SHOULD_TRACK.with(Cell::get) {
		return None;
	}
	STACK.with(|stack| stack.borrow().last().cloned())
}

pub(crate) fn run_batch(batch: Vec<Rc<EffectBody>>) {
	for body in batch {
		match &body.scheduler {
			Some(scheduler) => scheduler(),
			None => run_body(&body),
		}
	}
}

/// Record that the active effect depends on `(target, key)`.
pub fn track(target: &Obj, op: TrackOp, key: DepKey) {
	if tracked_effect().is_none() {
		return;
	}
	let dep = {
		let mut deps = target.body().deps.borrow_mut();
		deps.entry(key).or_insert_with(Dep::new).clone()
	};
	trace!(?op, "track");
	dep.track();
}

/// Notify the effects subscribed to `(target, key)`. Structural ops also
/// notify the iteration subscribers; the union runs each effect once.
pub fn trigger(target: &Obj, op: TriggerOp, key: DepKey) {
	let mut batch = Vec::new();
	{
		let deps = target.body().deps.borrow();
		if deps.is_empty() {
			// never been tracked
			return;
		}
		if let Some(dep) = deps.get(&key) {
			dep.collect_into(&mut batch);
		}
		if matches!(op, TriggerOp::Add | TriggerOp::Delete) {
			if let Some(dep) = deps.get(&DepKey::Iterate) {
				dep.collect_into(&mut batch);
			}
		}
	}
	if !batch.is_empty() {
		trace!(?op, ?key, "trigger");
		run_batch(batch);
	}
}

/// Disable dependency collection until the matching [`reset_tracking`].
/// Pairs nest; each reset restores the state saved by its pause.
pub fn pause_tracking() {
	save_tracking(false);
}

/// Force-enable dependency collection until the matching [`reset_tracking`].
pub fn enable_tracking() {
	save_tracking(true);
}

fn save_tracking(next: bool) {
	let current = SHOULD_TRACK.with(Cell::get);
	TRACK_STATES.with(|states| states.borrow_mut().push(current));
	SHOULD_TRACK.with(|flag| flag.set(next));
}

/// Restore the tracking state saved by the last pause or enable.
pub fn reset_tracking() {
	let restored = TRACK_STATES.with(|states| states.borrow_mut().pop());
	SHOULD_TRACK.with(|flag| flag.set(restored.unwrap_or(true)));
}
