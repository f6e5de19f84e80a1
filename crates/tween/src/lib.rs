//! Default interpolation engine: linear curve, fixed-step timelines, optional
//! background ticker.
//!
//! # Invariants
//! - Finite timelines end on exactly the target value.
//! - The registry lock is never acquired while a timeline lock is held.

mod step;
mod ticker;

pub use step::{fraction, Phase, StepEngine};
pub use ticker::{Ticker, DEFAULT_PULSE};

pub fn crate_info() -> &'static str {
    "shapedraw-tween v0.1.0"
}
