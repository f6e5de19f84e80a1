//! Line-based shapes.
//!
//! Each shape draws a main pass with its line style, then an x-ray pass with
//! the style's secondary color (if any) so the lines show through terrain.

use std::sync::Arc;

use glam::DVec3;
use shapedraw_common::{LineStyle, Vector3};

use crate::facade::PrimitiveMode;
use crate::shape::Shape;
use crate::stack::DrawContext;
use crate::transform::TransformHandle;

/// State every wireframe shape carries.
#[derive(Debug, Clone)]
pub struct WireframeStyle {
    pub line_style: Option<LineStyle>,
    pub transforms: Vec<TransformHandle>,
    pub visible: bool,
}

impl Default for WireframeStyle {
    fn default() -> Self {
        Self {
            line_style: None,
            transforms: Vec::new(),
            visible: true,
        }
    }
}

impl WireframeStyle {
    fn draw_passes(&self, ctx: &mut DrawContext<'_>, mut lines: impl FnMut(&mut DrawContext<'_>)) {
        let fallback;
        let style = match &self.line_style {
            Some(style) => style,
            None => {
                fallback = LineStyle::default();
                &fallback
            }
        };
        ctx.apply_line_style(style, false);
        lines(ctx);
        if ctx.apply_line_style(style, true) {
            lines(ctx);
        }
    }
}

macro_rules! wireframe_accessors {
    ($ty:ty) => {
        impl $ty {
            /// `None` means the default line style.
            pub fn line_style(&self) -> Option<&LineStyle> {
                self.style.line_style.as_ref()
            }

            pub fn set_line_style(&mut self, style: Option<LineStyle>) -> &mut Self {
                self.style.line_style = style;
                self
            }

            pub fn add_transform(&mut self, transform: TransformHandle) -> &mut Self {
                self.style.transforms.push(transform);
                self
            }

            pub fn clear_transforms(&mut self) -> &mut Self {
                self.style.transforms.clear();
                self
            }

            pub fn set_visible(&mut self, visible: bool) -> &mut Self {
                self.style.visible = visible;
                self
            }
        }
    };
}

/// A single line segment between two shared points.
#[derive(Debug)]
pub struct WireframeLine {
    start: Arc<Vector3>,
    end: Arc<Vector3>,
    style: WireframeStyle,
}

impl WireframeLine {
    pub fn new(start: Arc<Vector3>, end: Arc<Vector3>) -> Self {
        Self {
            start,
            end,
            style: WireframeStyle::default(),
        }
    }

    pub fn start(&self) -> &Arc<Vector3> {
        &self.start
    }

    pub fn end(&self) -> &Arc<Vector3> {
        &self.end
    }
}

wireframe_accessors!(WireframeLine);

impl Shape for WireframeLine {
    fn render(&self, ctx: &mut DrawContext<'_>) -> anyhow::Result<()> {
        let (a, b) = (self.start.get(), self.end.get());
        self.style.draw_passes(ctx, |ctx| {
            ctx.begin(PrimitiveMode::Lines);
            ctx.vertex(a);
            ctx.vertex(b);
            ctx.end();
        });
        Ok(())
    }

    fn transforms(&self) -> &[TransformHandle] {
        &self.style.transforms
    }

    fn is_visible(&self) -> bool {
        self.style.visible
    }

    fn pivot(&self) -> DVec3 {
        self.start.get()
    }

    fn name(&self) -> &str {
        "WireframeLine"
    }
}

/// An axis-aligned box between two shared corners.
///
/// Corners are normalized (lower ≤ upper on every axis) before use; this
/// writes back into the shared vectors.
#[derive(Debug)]
pub struct WireframeCuboid {
    lower: Arc<Vector3>,
    upper: Arc<Vector3>,
    style: WireframeStyle,
}

impl WireframeCuboid {
    pub fn new(lower: Arc<Vector3>, upper: Arc<Vector3>) -> Self {
        let cuboid = Self {
            lower,
            upper,
            style: WireframeStyle::default(),
        };
        cuboid.normalize();
        cuboid
    }

    pub fn from_corners(lower: DVec3, upper: DVec3) -> Self {
        Self::new(Arc::new(Vector3::from(lower)), Arc::new(Vector3::from(upper)))
    }

    pub fn lower(&self) -> &Arc<Vector3> {
        &self.lower
    }

    pub fn upper(&self) -> &Arc<Vector3> {
        &self.upper
    }

    pub fn set_lower(&mut self, lower: Arc<Vector3>) -> &mut Self {
        self.lower = lower;
        self.normalize();
        self
    }

    pub fn set_upper(&mut self, upper: Arc<Vector3>) -> &mut Self {
        self.upper = upper;
        self.normalize();
        self
    }

    pub fn normalize(&self) {
        let (lo, hi) = (self.lower.get(), self.upper.get());
        if lo.cmple(hi).all() {
            return;
        }
        self.lower.set(lo.min(hi));
        self.upper.set(lo.max(hi));
    }

    pub fn center(&self) -> DVec3 {
        self.lower.get().lerp(self.upper.get(), 0.5)
    }
}

wireframe_accessors!(WireframeCuboid);

impl Shape for WireframeCuboid {
    fn render(&self, ctx: &mut DrawContext<'_>) -> anyhow::Result<()> {
        self.normalize();
        let (lo, hi) = (self.lower.get(), self.upper.get());
        let face = |y: f64| {
            [
                DVec3::new(lo.x, y, lo.z),
                DVec3::new(lo.x, y, hi.z),
                DVec3::new(hi.x, y, hi.z),
                DVec3::new(hi.x, y, lo.z),
            ]
        };
        let (bottom, top) = (face(lo.y), face(hi.y));

        self.style.draw_passes(ctx, |ctx| {
            for ring in [&bottom, &top] {
                ctx.begin(PrimitiveMode::LineLoop);
                for &corner in ring {
                    ctx.vertex(corner);
                }
                ctx.end();
            }
            ctx.begin(PrimitiveMode::Lines);
            for (&b, &t) in bottom.iter().zip(&top) {
                ctx.vertex(b);
                ctx.vertex(t);
            }
            ctx.end();
        });
        Ok(())
    }

    fn transforms(&self) -> &[TransformHandle] {
        &self.style.transforms
    }

    fn is_visible(&self) -> bool {
        self.style.visible
    }

    fn pivot(&self) -> DVec3 {
        self.normalize();
        self.center()
    }

    fn name(&self) -> &str {
        "WireframeCuboid"
    }
}

/// A strip of connected line segments through shared points.
#[derive(Debug)]
pub struct WireframeLines {
    points: Vec<Arc<Vector3>>,
    render_cap: Option<usize>,
    style: WireframeStyle,
}

impl WireframeLines {
    pub fn new(points: Vec<Arc<Vector3>>) -> Self {
        Self {
            points,
            render_cap: None,
            style: WireframeStyle::default(),
        }
    }

    pub fn points(&self) -> &[Arc<Vector3>] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<Arc<Vector3>>) -> &mut Self {
        self.points = points;
        self
    }

    pub fn push_point(&mut self, point: Arc<Vector3>) -> &mut Self {
        self.points.push(point);
        self
    }

    /// Maximum number of segments drawn. `None` draws them all.
    pub fn render_cap(&self) -> Option<usize> {
        self.render_cap
    }

    pub fn set_render_cap(&mut self, cap: Option<usize>) -> &mut Self {
        self.render_cap = cap;
        self
    }
}

wireframe_accessors!(WireframeLines);

impl Shape for WireframeLines {
    fn render(&self, ctx: &mut DrawContext<'_>) -> anyhow::Result<()> {
        let take = match self.render_cap {
            Some(0) => return Ok(()),
            Some(segments) => segments.saturating_add(1),
            None => usize::MAX,
        };
        if self.points.is_empty() {
            return Ok(());
        }
        let points: Vec<DVec3> = self.points.iter().take(take).map(|p| p.get()).collect();

        self.style.draw_passes(ctx, |ctx| {
            ctx.begin(PrimitiveMode::LineStrip);
            for &p in &points {
                ctx.vertex(p);
            }
            ctx.end();
        });
        Ok(())
    }

    fn transforms(&self) -> &[TransformHandle] {
        &self.style.transforms
    }

    fn is_visible(&self) -> bool {
        self.style.visible
    }

    fn pivot(&self) -> DVec3 {
        self.points.first().map_or(DVec3::ZERO, |p| p.get())
    }

    fn name(&self) -> &str {
        "WireframeLines"
    }
}
