pub mod macros;

mod addr;
mod computed;
mod dep;
mod effect;
mod obj;
mod reactive;
mod r#ref;
mod value;

pub use computed::{computed, Computed};
pub use dep::Dep;
pub use effect::{
	effect, enable_tracking, pause_tracking, reset_tracking, track, trigger, DepKey, Effect,
	EffectOptions, TrackOp, TriggerOp,
};
pub use obj::{Key, Obj};
pub use r#ref::{is_ref, to_ref, to_refs, unref, Ref};
pub use reactive::{
	is_reactive, is_readonly, is_wrapped, reactive, readonly, to_raw, to_reactive, to_readonly,
	Reactive, Variant,
};
pub use value::Value;
