//! Shared primitives: vectors, colors, line styles, atomic scalar cells, errors.
//!
//! # Invariants
//! - Primitive components live in atomic cells; mutators take `&self` so the
//!   animation engine can write while the frame thread reads.
//! - A read-only view never mutates the value it observes.

pub mod color;
pub mod error;
pub mod fault;
pub mod line_style;
pub mod scalar;
pub mod vector;

pub use color::{Color, ReadonlyColor, Rgba};
pub use error::{Result, ShapeDrawError};
pub use fault::isolate;
pub use line_style::LineStyle;
pub use scalar::{Scalar, ScalarCell};
pub use vector::{Axis, ReadonlyVector3, Vector3};

pub fn crate_info() -> &'static str {
    "shapedraw-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
