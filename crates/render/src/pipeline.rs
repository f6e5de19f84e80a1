use std::fmt;
use std::ops::AddAssign;

use glam::{DMat4, DVec3};
use serde::Serialize;
use shapedraw_common::{isolate, ShapeDrawError};
use tracing::{debug, trace, warn};

use crate::facade::DrawingFacade;
use crate::shape::ShapeHandle;
use crate::stack::{DrawContext, TransformStack};
use crate::transform::TransformHandle;

/// Per-frame render counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub layers_rendered: usize,
    pub layers_skipped: usize,
    pub shapes_drawn: usize,
    pub shapes_hidden: usize,
    /// Shapes skipped because they were already borrowed mutably.
    pub shapes_busy: usize,
    pub faults: usize,
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, other: Self) {
        self.layers_rendered += other.layers_rendered;
        self.layers_skipped += other.layers_skipped;
        self.shapes_drawn += other.shapes_drawn;
        self.shapes_hidden += other.shapes_hidden;
        self.shapes_busy += other.shapes_busy;
        self.faults += other.faults;
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layers={} (skipped {}) shapes={} (hidden {}, busy {}) faults={}",
            self.layers_rendered,
            self.layers_skipped,
            self.shapes_drawn,
            self.shapes_hidden,
            self.shapes_busy,
            self.faults
        )
    }
}

/// Draws layers of shapes through a host facade.
///
/// A layer is one session's shape list. The pipeline owns the matrix stack;
/// each frame starts from a base that moves the player to the origin.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    stack: TransformStack,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the stack to the frame's base: translate by `-player`.
    pub fn begin_frame(&mut self, player: DVec3) {
        self.stack.reset(DMat4::from_translation(-player));
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// A layer is drawn when visible, and while the GUI is hidden only if it
    /// opted in.
    pub fn layer_visible(visible: bool, visible_when_hiding_gui: bool, gui_hidden: bool) -> bool {
        visible && (!gui_hidden || visible_when_hiding_gui)
    }

    /// Draw every shape of one layer in order. Faults are logged and counted;
    /// they never stop later shapes.
    pub fn render_layer(
        &mut self,
        facade: &mut dyn DrawingFacade,
        layer: &str,
        shapes: &[ShapeHandle],
    ) -> RenderStats {
        let mut stats = RenderStats {
            layers_rendered: 1,
            ..RenderStats::default()
        };
        for (index, shape) in shapes.iter().enumerate() {
            self.render_shape(facade, layer, index, shape, &mut stats);
        }
        trace!(layer, shapes = shapes.len(), drawn = stats.shapes_drawn, "layer rendered");
        stats
    }

    fn render_shape(
        &mut self,
        facade: &mut dyn DrawingFacade,
        layer: &str,
        index: usize,
        handle: &ShapeHandle,
        stats: &mut RenderStats,
    ) {
        let Ok(shape) = handle.try_borrow() else {
            warn!(layer, index, "shape is borrowed elsewhere; skipped");
            stats.shapes_busy += 1;
            return;
        };
        let mut name = String::new();
        let mut visible = false;
        let mut transforms: &[TransformHandle] = &[];
        let queried = isolate(|| {
            name = shape.name().to_string();
            visible = shape.is_visible();
            transforms = shape.transforms();
            Ok(())
        });
        let label = format!("{}[{index}]", if name.is_empty() { "shape" } else { name.as_str() });
        if let Err(detail) = queried {
            self.fault(layer, &label, detail, stats);
            return;
        }
        if !visible {
            stats.shapes_hidden += 1;
            return;
        }

        let base = self.stack.depth();
        let mut ctx = DrawContext::new(&mut self.stack, facade);
        let mut applied = 0usize;

        let drawn = isolate(|| {
            let pivot = shape.pivot();
            ctx.push();
            ctx.translate(pivot);
            for transform in transforms {
                ctx.push();
                transform.apply(&mut ctx);
                applied += 1;
            }
            ctx.translate(-pivot);
            shape.render(&mut ctx)
        });
        if ctx.finish() {
            debug!(layer, shape = %label, "closed primitive left open");
        }
        let reverted = isolate(|| {
            for transform in transforms[..applied].iter().rev() {
                transform.revert(&mut ctx);
                ctx.pop();
            }
            ctx.pop();
            Ok(())
        });
        drop(ctx);
        self.stack.restore(base);

        match drawn.and(reverted) {
            Ok(()) => stats.shapes_drawn += 1,
            Err(detail) => self.fault(layer, &label, detail, stats),
        }
    }

    fn fault(&self, layer: &str, label: &str, detail: String, stats: &mut RenderStats) {
        let err = ShapeDrawError::ShapeFault {
            session: layer.to_string(),
            shape: label.to_string(),
            detail,
        };
        warn!(error = %err, "shape fault");
        stats.faults += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::facade::{DrawCall, PrimitiveMode, RecordingFacade};
    use crate::shape::{share, Shape};
    use crate::transform::{ShapeRotate, ShapeStandardLighting, ShapeTranslate, TransformHandle};
    use crate::wireframe::WireframeLine;
    use shapedraw_common::{Axis, Vector3};

    #[derive(Debug)]
    enum Behavior {
        Point(DVec3),
        Fail,
        Panic,
        LeaveOpen,
    }

    #[derive(Debug)]
    struct Probe {
        behavior: Behavior,
        transforms: Vec<TransformHandle>,
        visible: bool,
        pivot: DVec3,
        seen_depth: Rc<Cell<usize>>,
        /// Accessor that panics instead of answering.
        panic_in: Option<&'static str>,
    }

    impl Probe {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                transforms: Vec::new(),
                visible: true,
                pivot: DVec3::ZERO,
                seen_depth: Rc::new(Cell::new(0)),
                panic_in: None,
            }
        }
    }

    impl Shape for Probe {
        fn render(&self, ctx: &mut DrawContext<'_>) -> anyhow::Result<()> {
            self.seen_depth.set(ctx.depth());
            match self.behavior {
                Behavior::Point(p) => {
                    ctx.begin(PrimitiveMode::Lines);
                    ctx.vertex(p);
                    ctx.end();
                    Ok(())
                }
                Behavior::Fail => {
                    ctx.push();
                    anyhow::bail!("no vertices")
                }
                Behavior::Panic => {
                    ctx.push();
                    ctx.begin(PrimitiveMode::Quads);
                    panic!("probe exploded")
                }
                Behavior::LeaveOpen => {
                    ctx.begin(PrimitiveMode::LineStrip);
                    ctx.vertex(DVec3::ZERO);
                    Ok(())
                }
            }
        }

        fn transforms(&self) -> &[TransformHandle] {
            if self.panic_in == Some("transforms") {
                panic!("transforms unavailable");
            }
            &self.transforms
        }

        fn is_visible(&self) -> bool {
            self.visible
        }

        fn pivot(&self) -> DVec3 {
            self.pivot
        }

        fn name(&self) -> &str {
            if self.panic_in == Some("name") {
                panic!("name unavailable");
            }
            "Probe"
        }
    }

    fn handles(shapes: Vec<Probe>) -> Vec<ShapeHandle> {
        shapes
            .into_iter()
            .map(|s| share(s) as ShapeHandle)
            .collect()
    }

    #[test]
    fn frame_base_moves_player_to_origin() {
        let mut pipeline = RenderPipeline::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        pipeline.begin_frame(DVec3::new(100.0, 64.0, -20.0));
        let shapes = handles(vec![Probe::new(Behavior::Point(DVec3::new(101.0, 64.0, -20.0)))]);
        let stats = pipeline.render_layer(&mut facade, "s#1", &shapes);
        assert_eq!(stats.shapes_drawn, 1);
        assert_eq!(log.vertices(), vec![DVec3::X]);
    }

    #[test]
    fn faults_are_isolated_and_depth_restored() {
        let mut pipeline = RenderPipeline::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        pipeline.begin_frame(DVec3::ZERO);

        let mut panicking = Probe::new(Behavior::Panic);
        panicking.transforms.push(Arc::new(ShapeRotate::around(45.0, Axis::Y)));
        let shapes = handles(vec![
            Probe::new(Behavior::Fail),
            panicking,
            Probe::new(Behavior::Point(DVec3::Y)),
        ]);
        let stats = pipeline.render_layer(&mut facade, "s#1", &shapes);

        assert_eq!(stats.faults, 2);
        assert_eq!(stats.shapes_drawn, 1);
        assert_eq!(pipeline.depth(), 1);
        assert!(log.is_balanced());
        assert_eq!(log.vertices(), vec![DVec3::Y]);
    }

    #[test]
    fn panicking_accessors_are_shape_faults() {
        let mut pipeline = RenderPipeline::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        pipeline.begin_frame(DVec3::ZERO);

        let mut no_name = Probe::new(Behavior::Point(DVec3::X));
        no_name.panic_in = Some("name");
        let mut no_transforms = Probe::new(Behavior::Point(DVec3::Z));
        no_transforms.panic_in = Some("transforms");
        let shapes = handles(vec![
            no_name,
            no_transforms,
            Probe::new(Behavior::Point(DVec3::Y)),
        ]);
        let stats = pipeline.render_layer(&mut facade, "s#1", &shapes);

        assert_eq!(stats.faults, 2);
        assert_eq!(stats.shapes_drawn, 1);
        assert_eq!(pipeline.depth(), 1);
        assert!(log.is_balanced());
        assert_eq!(log.vertices(), vec![DVec3::Y]);
    }

    #[test]
    fn open_primitive_closed_before_next_shape() {
        let mut pipeline = RenderPipeline::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        pipeline.begin_frame(DVec3::ZERO);
        let shapes = handles(vec![
            Probe::new(Behavior::LeaveOpen),
            Probe::new(Behavior::Point(DVec3::Z)),
        ]);
        let stats = pipeline.render_layer(&mut facade, "s#1", &shapes);
        assert_eq!(stats.shapes_drawn, 2);
        assert!(log.is_balanced());
        assert_eq!(log.calls()[2], DrawCall::End);
    }

    #[test]
    fn transforms_pivot_and_revert_order() {
        let mut pipeline = RenderPipeline::new();
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        pipeline.begin_frame(DVec3::ZERO);

        let mut probe = Probe::new(Behavior::Point(DVec3::new(2.0, 0.0, 0.0)));
        probe.pivot = DVec3::new(1.0, 0.0, 0.0);
        probe.transforms.push(Arc::new(ShapeStandardLighting));
        probe.transforms.push(Arc::new(ShapeRotate::around(90.0, Axis::Y)));
        probe.transforms.push(Arc::new(ShapeTranslate::new(Vector3::shared(0.0, 5.0, 0.0))));
        let depth = Rc::clone(&probe.seen_depth);
        let shapes = handles(vec![probe]);

        pipeline.render_layer(&mut facade, "s#1", &shapes);
        // base + pivot frame + one frame per transform
        assert_eq!(depth.get(), 5);
        assert_eq!(pipeline.depth(), 1);

        let calls = log.calls();
        assert_eq!(calls.first(), Some(&DrawCall::EnableLighting));
        assert_eq!(calls.last(), Some(&DrawCall::DisableLighting));
        // (2,0,0) relative to pivot (1,0,0): rotated 90° about y to (0,0,-1),
        // lifted by 5, moved back to the pivot.
        let v = log.vertices()[0];
        assert!(v.abs_diff_eq(DVec3::new(1.0, 5.0, -1.0), 1e-12), "{v}");
    }

    #[test]
    fn hidden_and_busy_shapes_skipped() {
        let mut pipeline = RenderPipeline::new();
        let mut facade = RecordingFacade::new();
        pipeline.begin_frame(DVec3::ZERO);

        let mut hidden = Probe::new(Behavior::Panic);
        hidden.visible = false;
        let busy = share(WireframeLine::new(
            Vector3::shared(0.0, 0.0, 0.0),
            Vector3::shared(1.0, 1.0, 1.0),
        ));
        let mut shapes = handles(vec![hidden]);
        shapes.push(busy.clone());

        let _guard = busy.borrow_mut();
        let stats = pipeline.render_layer(&mut facade, "s#1", &shapes);
        assert_eq!(stats.shapes_hidden, 1);
        assert_eq!(stats.shapes_busy, 1);
        assert_eq!(stats.faults, 0);
    }

    #[test]
    fn layer_visibility_rules() {
        assert!(RenderPipeline::layer_visible(true, false, false));
        assert!(!RenderPipeline::layer_visible(true, false, true));
        assert!(RenderPipeline::layer_visible(true, true, true));
        assert!(!RenderPipeline::layer_visible(false, true, false));
    }

    #[test]
    fn stats_accumulate() {
        let mut total = RenderStats::default();
        total += RenderStats {
            layers_rendered: 1,
            shapes_drawn: 3,
            ..RenderStats::default()
        };
        total += RenderStats {
            layers_skipped: 1,
            faults: 1,
            ..RenderStats::default()
        };
        assert_eq!(total.shapes_drawn, 3);
        assert_eq!(
            total.to_string(),
            "layers=1 (skipped 1) shapes=3 (hidden 0, busy 0) faults=1"
        );
    }
}
