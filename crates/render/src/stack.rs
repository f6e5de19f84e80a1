use glam::{DMat4, DVec3};
use shapedraw_common::LineStyle;

use crate::facade::{DepthFunc, DrawingFacade, PrimitiveMode};

/// Model-view matrix stack. The bottom frame is the per-frame base and is
/// never popped.
#[derive(Debug, Clone)]
pub struct TransformStack {
    frames: Vec<DMat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            frames: vec![DMat4::IDENTITY],
        }
    }

    /// Drop every frame and start over from `base`.
    pub fn reset(&mut self, base: DMat4) {
        self.frames.clear();
        self.frames.push(base);
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> DMat4 {
        *self.top()
    }

    pub fn push(&mut self) {
        let top = self.current();
        self.frames.push(top);
    }

    /// Pop one frame. Returns false (and leaves the base) when only the base
    /// frame remains.
    pub fn pop(&mut self) -> bool {
        if self.frames.len() > 1 {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    /// Truncate back to `depth` frames.
    pub fn restore(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    pub fn translate(&mut self, offset: DVec3) {
        self.multiply(DMat4::from_translation(offset));
    }

    /// Rotate around `axis` by `degrees`. A zero axis leaves the frame alone.
    pub fn rotate(&mut self, degrees: f64, axis: DVec3) {
        if let Some(axis) = axis.try_normalize() {
            self.multiply(DMat4::from_axis_angle(axis, degrees.to_radians()));
        }
    }

    pub fn scale(&mut self, factors: DVec3) {
        self.multiply(DMat4::from_scale(factors));
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.top().transform_point3(point)
    }

    fn top(&self) -> &DMat4 {
        // `frames` always holds the base frame
        &self.frames[self.frames.len() - 1]
    }

    fn multiply(&mut self, m: DMat4) {
        let last = self.frames.len() - 1;
        self.frames[last] *= m;
    }
}

/// What a shape or transform sees while rendering: the matrix stack and the
/// host facade, with primitive begin/end bookkeeping.
pub struct DrawContext<'a> {
    stack: &'a mut TransformStack,
    facade: &'a mut dyn DrawingFacade,
    open: bool,
}

impl<'a> DrawContext<'a> {
    pub fn new(stack: &'a mut TransformStack, facade: &'a mut dyn DrawingFacade) -> Self {
        Self {
            stack,
            facade,
            open: false,
        }
    }

    // --- matrix stack ---

    pub fn push(&mut self) {
        self.stack.push();
    }

    pub fn pop(&mut self) -> bool {
        self.stack.pop()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn translate(&mut self, offset: DVec3) {
        self.stack.translate(offset);
    }

    pub fn rotate(&mut self, degrees: f64, axis: DVec3) {
        self.stack.rotate(degrees, axis);
    }

    pub fn scale(&mut self, factors: DVec3) {
        self.stack.scale(factors);
    }

    // --- primitives ---

    /// Start a primitive, closing one that is still open.
    pub fn begin(&mut self, mode: PrimitiveMode) {
        if self.open {
            self.facade.end_primitive();
        }
        self.facade.begin_primitive(mode);
        self.open = true;
    }

    /// Emit a vertex in shape space; it is transformed by the current frame.
    pub fn vertex(&mut self, point: DVec3) {
        self.facade.add_vertex(self.stack.transform_point(point));
    }

    pub fn end(&mut self) {
        if self.open {
            self.facade.end_primitive();
            self.open = false;
        }
    }

    /// Close any primitive left open. Returns true if one was.
    pub fn finish(&mut self) -> bool {
        let was_open = self.open;
        self.end();
        was_open
    }

    pub fn facade(&mut self) -> &mut dyn DrawingFacade {
        &mut *self.facade
    }

    /// Set depth function, color and width for one pass of `style`. Returns
    /// false, touching nothing, for a secondary pass on a style without one.
    pub fn apply_line_style(&mut self, style: &LineStyle, secondary: bool) -> bool {
        let (func, color, width) = if secondary {
            let Some(color) = style.secondary_color() else {
                return false;
            };
            (DepthFunc::Greater, color.get(), style.secondary_width())
        } else {
            (DepthFunc::LessOrEqual, style.main_color().get(), style.main_width())
        };
        self.facade.set_depth_func(func);
        self.facade.set_color(color);
        self.facade.set_line_width(width);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::{DrawCall, RecordingFacade};

    #[test]
    fn base_frame_never_popped() {
        let mut stack = TransformStack::new();
        assert!(!stack.pop());
        stack.push();
        stack.push();
        assert_eq!(stack.depth(), 3);
        assert!(stack.pop());
        stack.restore(0);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn push_pop_restores_matrix() {
        let mut stack = TransformStack::new();
        stack.reset(DMat4::from_translation(DVec3::new(-10.0, 0.0, 0.0)));
        stack.push();
        stack.translate(DVec3::new(1.0, 2.0, 3.0));
        stack.scale(DVec3::splat(2.0));
        assert_eq!(
            stack.transform_point(DVec3::ONE),
            DVec3::new(-7.0, 4.0, 5.0)
        );
        stack.pop();
        assert_eq!(stack.transform_point(DVec3::ZERO), DVec3::new(-10.0, 0.0, 0.0));
    }

    #[test]
    fn rotate_about_y() {
        let mut stack = TransformStack::new();
        stack.rotate(90.0, DVec3::Y);
        let p = stack.transform_point(DVec3::X);
        assert!(p.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-12));

        stack.rotate(45.0, DVec3::ZERO);
        assert!(stack.transform_point(DVec3::X).abs_diff_eq(p, 1e-12));
    }

    #[test]
    fn begin_closes_open_primitive() {
        let mut stack = TransformStack::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        let mut ctx = DrawContext::new(&mut stack, &mut facade);
        ctx.begin(PrimitiveMode::Lines);
        ctx.begin(PrimitiveMode::LineLoop);
        assert!(ctx.finish());
        assert!(!ctx.finish());
        assert!(log.is_balanced());
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn secondary_pass_only_with_secondary_color() {
        let mut stack = TransformStack::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        let mut ctx = DrawContext::new(&mut stack, &mut facade);

        let style = LineStyle::default();
        assert!(ctx.apply_line_style(&style, false));
        assert!(ctx.apply_line_style(&style, true));
        let mut plain = style.copy();
        plain.set_secondary_color(None);
        assert!(!ctx.apply_line_style(&plain, true));

        let calls = log.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], DrawCall::Depth(DepthFunc::LessOrEqual));
        assert_eq!(calls[3], DrawCall::Depth(DepthFunc::Greater));
        assert_eq!(calls[5], DrawCall::LineWidth(3.0));
    }
}
