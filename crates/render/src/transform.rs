use std::fmt::Debug;
use std::sync::Arc;

use glam::DVec3;
use shapedraw_common::{Axis, ScalarCell, Vector3};

use crate::stack::DrawContext;

/// A step applied to the matrix stack (or facade state) before a shape draws.
///
/// The pipeline pushes a frame before `apply` and pops it after `revert`, so
/// matrix changes need no explicit undo. `revert` exists for facade state.
/// Transforms are shared with animation threads, hence `Send + Sync`.
pub trait ShapeTransform: Debug + Send + Sync {
    fn apply(&self, ctx: &mut DrawContext<'_>);

    fn revert(&self, _ctx: &mut DrawContext<'_>) {}
}

pub type TransformHandle = Arc<dyn ShapeTransform>;

#[derive(Debug)]
pub struct ShapeTranslate {
    offset: Arc<Vector3>,
}

impl ShapeTranslate {
    pub fn new(offset: Arc<Vector3>) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> &Arc<Vector3> {
        &self.offset
    }
}

impl ShapeTransform for ShapeTranslate {
    fn apply(&self, ctx: &mut DrawContext<'_>) {
        ctx.translate(self.offset.get());
    }
}

/// Rotation by an angle in degrees around an arbitrary axis.
#[derive(Debug)]
pub struct ShapeRotate {
    angle: Arc<ScalarCell<f64>>,
    axis: Arc<Vector3>,
}

impl ShapeRotate {
    pub fn new(angle_degrees: f64, axis: Arc<Vector3>) -> Self {
        Self {
            angle: Arc::new(ScalarCell::new(angle_degrees)),
            axis,
        }
    }

    pub fn around(angle_degrees: f64, axis: Axis) -> Self {
        Self::new(angle_degrees, Arc::new(Vector3::from(axis.unit_vector())))
    }

    pub fn angle(&self) -> f64 {
        self.angle.get()
    }

    pub fn set_angle(&self, angle_degrees: f64) -> &Self {
        self.angle.set(angle_degrees);
        self
    }

    /// The angle cell, for handing to an animated value.
    pub fn angle_cell(&self) -> &Arc<ScalarCell<f64>> {
        &self.angle
    }

    pub fn axis(&self) -> &Arc<Vector3> {
        &self.axis
    }
}

impl ShapeTransform for ShapeRotate {
    fn apply(&self, ctx: &mut DrawContext<'_>) {
        ctx.rotate(self.angle.get(), self.axis.get());
    }
}

#[derive(Debug)]
pub struct ShapeScale {
    factors: Arc<Vector3>,
}

impl ShapeScale {
    pub fn new(factors: Arc<Vector3>) -> Self {
        Self { factors }
    }

    pub fn uniform(factor: f64) -> Self {
        Self::new(Vector3::shared(factor, factor, factor))
    }

    pub fn factors(&self) -> &Arc<Vector3> {
        &self.factors
    }
}

impl Default for ShapeScale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl ShapeTransform for ShapeScale {
    fn apply(&self, ctx: &mut DrawContext<'_>) {
        ctx.scale(self.factors.get());
    }
}

/// Turns on the host's standard lighting for the shape, off again afterwards.
#[derive(Debug, Default)]
pub struct ShapeStandardLighting;

impl ShapeTransform for ShapeStandardLighting {
    fn apply(&self, ctx: &mut DrawContext<'_>) {
        ctx.facade().enable_standard_lighting();
    }

    fn revert(&self, ctx: &mut DrawContext<'_>) {
        ctx.facade().disable_standard_lighting();
    }
}
