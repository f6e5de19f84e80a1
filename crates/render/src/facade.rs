use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use shapedraw_common::Rgba;

/// Primitive kinds a shape can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveMode {
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    Quads,
}

/// Depth comparison used for a line pass. `Greater` draws only where the
/// line is behind existing geometry (the x-ray pass).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthFunc {
    LessOrEqual,
    Greater,
    Always,
}

/// Low-level drawing interface supplied by the host.
///
/// Vertices arrive already transformed into view space. Every
/// `begin_primitive` is matched by `end_primitive` before the next shape.
pub trait DrawingFacade {
    fn begin_primitive(&mut self, mode: PrimitiveMode);
    fn add_vertex(&mut self, point: DVec3);
    fn end_primitive(&mut self);
    fn enable_standard_lighting(&mut self);

    fn disable_standard_lighting(&mut self) {}
    fn set_color(&mut self, _color: Rgba) {}
    fn set_line_width(&mut self, _width: f32) {}
    fn set_depth_func(&mut self, _func: DepthFunc) {}
}

/// One call received by a [`RecordingFacade`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCall {
    Begin(PrimitiveMode),
    Vertex(DVec3),
    End,
    EnableLighting,
    DisableLighting,
    Color(Rgba),
    LineWidth(f32),
    Depth(DepthFunc),
}

/// Shared, clonable view of the calls recorded by a [`RecordingFacade`].
#[derive(Debug, Clone, Default)]
pub struct DrawLog(Rc<RefCell<Vec<DrawCall>>>);

impl DrawLog {
    pub fn calls(&self) -> Vec<DrawCall> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn vertices(&self) -> Vec<DVec3> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Vertex(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Whether begin/end calls strictly alternate and nothing is left open.
    pub fn is_balanced(&self) -> bool {
        let mut open = false;
        for call in self.0.borrow().iter() {
            match call {
                DrawCall::Begin(_) if open => return false,
                DrawCall::Begin(_) => open = true,
                DrawCall::End if !open => return false,
                DrawCall::End => open = false,
                _ => {}
            }
        }
        !open
    }

    pub fn summary(&self) -> DrawSummary {
        let mut summary = DrawSummary::default();
        for call in self.0.borrow().iter() {
            match call {
                DrawCall::Begin(_) => summary.primitives += 1,
                DrawCall::Vertex(_) => summary.vertices += 1,
                DrawCall::End => {}
                _ => summary.state_changes += 1,
            }
        }
        summary
    }

    fn push(&self, call: DrawCall) {
        self.0.borrow_mut().push(call);
    }
}

/// Counts of recorded draw calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawSummary {
    pub primitives: usize,
    pub vertices: usize,
    pub state_changes: usize,
}

impl fmt::Display for DrawSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "primitives={} vertices={} state_changes={}",
            self.primitives, self.vertices, self.state_changes
        )
    }
}

/// Facade that draws nothing and records every call.
///
/// Stands in for a real graphics backend in tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingFacade {
    log: DrawLog,
}

impl RecordingFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the log; stays valid after the facade is boxed and moved.
    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }
}

impl DrawingFacade for RecordingFacade {
    fn begin_primitive(&mut self, mode: PrimitiveMode) {
        self.log.push(DrawCall::Begin(mode));
    }

    fn add_vertex(&mut self, point: DVec3) {
        self.log.push(DrawCall::Vertex(point));
    }

    fn end_primitive(&mut self) {
        self.log.push(DrawCall::End);
    }

    fn enable_standard_lighting(&mut self) {
        self.log.push(DrawCall::EnableLighting);
    }

    fn disable_standard_lighting(&mut self) {
        self.log.push(DrawCall::DisableLighting);
    }

    fn set_color(&mut self, color: Rgba) {
        self.log.push(DrawCall::Color(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.log.push(DrawCall::LineWidth(width));
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.log.push(DrawCall::Depth(func));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_survives_boxing() {
        let facade = RecordingFacade::new();
        let log = facade.log();
        let mut boxed: Box<dyn DrawingFacade> = Box::new(facade);
        boxed.begin_primitive(PrimitiveMode::Lines);
        boxed.add_vertex(DVec3::X);
        boxed.end_primitive();
        assert_eq!(log.len(), 3);
        assert_eq!(log.vertices(), vec![DVec3::X]);
        assert!(log.is_balanced());
    }

    #[test]
    fn unbalanced_sequences_detected() {
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        facade.begin_primitive(PrimitiveMode::Lines);
        assert!(!log.is_balanced());
        facade.begin_primitive(PrimitiveMode::Lines);
        facade.end_primitive();
        assert!(!log.is_balanced());

        log.clear();
        facade.end_primitive();
        assert!(!log.is_balanced());
    }

    #[test]
    fn summary_counts() {
        let mut facade = RecordingFacade::new();
        let log = facade.log();
        facade.set_color(Rgba::RED);
        facade.set_line_width(2.0);
        facade.begin_primitive(PrimitiveMode::LineLoop);
        for _ in 0..4 {
            facade.add_vertex(DVec3::ZERO);
        }
        facade.end_primitive();

        let summary = log.summary();
        assert_eq!(summary.primitives, 1);
        assert_eq!(summary.vertices, 4);
        assert_eq!(summary.state_changes, 2);
        assert_eq!(
            summary.to_string(),
            "primitives=1 vertices=4 state_changes=2"
        );
    }
}
