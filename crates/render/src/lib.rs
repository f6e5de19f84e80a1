//! Render pipeline: host drawing facade, matrix stack, shapes and transforms.
//!
//! # Invariants
//! - Every shape leaves the matrix stack at the depth it found it, even when
//!   it fails or panics.
//! - Primitives never interleave across shapes.
//! - Shape faults are logged and counted, never propagated.

pub mod facade;
pub mod pipeline;
pub mod shape;
pub mod stack;
pub mod transform;
pub mod wireframe;

pub use facade::{DepthFunc, DrawCall, DrawLog, DrawSummary, DrawingFacade, PrimitiveMode, RecordingFacade};
pub use pipeline::{RenderPipeline, RenderStats};
pub use shape::{same_shape, share, Shape, ShapeHandle};
pub use stack::{DrawContext, TransformStack};
pub use transform::{
    ShapeRotate, ShapeScale, ShapeStandardLighting, ShapeTransform, ShapeTranslate, TransformHandle,
};
pub use wireframe::{WireframeCuboid, WireframeLine, WireframeLines, WireframeStyle};

pub fn crate_info() -> &'static str {
    "shapedraw-render v0.1.0"
}
