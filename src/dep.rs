use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use crate::addr::WeakAddr;
use crate::effect::{self, EffectBody};

/// The set of effects subscribed to one observed location.
///
/// Subscribers are held weakly: a dropped effect disappears from every set
/// it joined. Ref and computed cells own one `Dep` each; object targets own
/// one per tracked key.
#[derive(Clone, Default)]
pub struct Dep {
	subs: Rc<RefCell<BTreeSet<WeakAddr<EffectBody>>>>,
}

impl Dep {
	pub fn new() -> Self {
		Dep::default()
	}

	/// Subscribe the active effect, if tracking is enabled and one is
	/// running. The edge is recorded both ways and deduplicated.
	pub fn track(&self) {
		if let Some(active) = effect::tracked_effect() {
			if self.add(&active.subscriber()) {
				active.remember(self.clone());
			}
		}
	}

	/// Invoke every live subscriber once; an effect's scheduler, when
	/// present, replaces the immediate re-run.
	pub fn trigger(&self) {
		let mut batch = Vec::new();
		self.collect_into(&mut batch);
		effect::run_batch(batch);
	}

	pub(crate) fn add(&self, subscriber: &Weak<EffectBody>) -> bool {
		self.subs
			.borrow_mut()
			.insert(WeakAddr::new(subscriber.clone()))
	}

	pub(crate) fn remove(&self, subscriber: &Weak<EffectBody>) {
		self.subs
			.borrow_mut()
			.remove(&WeakAddr::new(subscriber.clone()));
	}

	pub(crate) fn collect_into(&self, out: &mut Vec<Rc<EffectBody>>) {
		for sub in self.subs.borrow().iter() {
			if let Some(body) = sub.upgrade() {
				if !out.iter().any(|seen| Rc::ptr_eq(seen, &body)) {
					out.push(body);
				}
			}
		}
	}
}
