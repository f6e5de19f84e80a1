//! Property animation: the `Animates` capability, animated scalars, vectors
//! and colors, and the contract an interpolation engine must satisfy.
//!
//! # Invariants
//! - At most one active timeline per animated value.
//! - Arguments are validated before the previous animation is stopped.
//! - The engine writes values through atomic cells; the frame thread only reads.

pub mod animates;
pub mod engine;
pub mod value;

pub use animates::{AnimationSlot, Animates};
pub use engine::{RepeatMode, Timeline, TimelineEngine, Tweenable};
pub use value::{AnimatedColor, AnimatedValue, AnimatedVector3};

pub fn crate_info() -> &'static str {
    "shapedraw-animation v0.1.0"
}
