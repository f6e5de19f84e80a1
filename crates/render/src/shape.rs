use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use glam::DVec3;

use crate::stack::DrawContext;
use crate::transform::TransformHandle;

/// Something a session can draw.
///
/// Shapes live on the frame thread behind `Rc<RefCell<..>>`; the session
/// compares them by pointer identity.
pub trait Shape: Debug {
    /// Draw through `ctx`. The frame is already translated and transformed.
    fn render(&self, ctx: &mut DrawContext<'_>) -> anyhow::Result<()>;

    /// Applied in order before `render`, reverted in reverse order after.
    fn transforms(&self) -> &[TransformHandle] {
        &[]
    }

    fn is_visible(&self) -> bool {
        true
    }

    /// Point that rotations and scales are relative to.
    fn pivot(&self) -> DVec3 {
        DVec3::ZERO
    }

    /// Short label used in logs and dumps.
    fn name(&self) -> &str {
        "shape"
    }
}

pub type ShapeHandle = Rc<RefCell<dyn Shape>>;

/// Wrap a shape for sharing. Keep the typed handle to edit the shape; pass a
/// clone to a session, which coerces it to [`ShapeHandle`].
pub fn share<S: Shape + 'static>(shape: S) -> Rc<RefCell<S>> {
    Rc::new(RefCell::new(shape))
}

pub fn same_shape(a: &ShapeHandle, b: &ShapeHandle) -> bool {
    Rc::ptr_eq(a, b)
}
