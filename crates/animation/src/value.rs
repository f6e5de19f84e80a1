use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use shapedraw_common::{Color, Result, Rgba, Scalar, ScalarCell, Vector3};

use crate::animates::{validate, AnimationSlot, Animates};
use crate::engine::{RepeatMode, TimelineEngine, Tweenable};

struct ScalarTween<T: Scalar> {
    cell: Arc<ScalarCell<T>>,
    from: T,
    to: T,
}

impl<T: Scalar> Tweenable for ScalarTween<T> {
    fn interpolate(&self, fraction: f64) {
        self.cell.set(T::lerp(self.from, self.to, fraction));
    }
}

struct VectorTween {
    vector: Arc<Vector3>,
    from: DVec3,
    to: DVec3,
}

impl Tweenable for VectorTween {
    fn interpolate(&self, fraction: f64) {
        let v = if fraction >= 1.0 {
            self.to
        } else {
            self.from.lerp(self.to, fraction)
        };
        self.vector.set(v);
    }
}

struct ColorTween {
    color: Arc<Color>,
    from: Rgba,
    to: Rgba,
}

impl Tweenable for ColorTween {
    fn interpolate(&self, fraction: f64) {
        let mix = |a: f64, b: f64| <f64 as Scalar>::lerp(a, b, fraction);
        self.color.store(Rgba::new(
            mix(self.from.r, self.to.r),
            mix(self.from.g, self.to.g),
            mix(self.from.b, self.to.b),
            mix(self.from.a, self.to.a),
        ));
    }
}

/// A single animatable scalar.
///
/// The value lives in a shared cell so it can be handed to a transform (for
/// example a rotation angle) while the engine animates it.
pub struct AnimatedValue<T: Scalar> {
    cell: Arc<ScalarCell<T>>,
    slot: AnimationSlot,
}

impl<T: Scalar> AnimatedValue<T> {
    pub fn new(engine: Arc<dyn TimelineEngine>, value: T) -> Self {
        Self::from_cell(engine, Arc::new(ScalarCell::new(value)))
    }

    /// Animate a cell that is already shared elsewhere.
    pub fn from_cell(engine: Arc<dyn TimelineEngine>, cell: Arc<ScalarCell<T>>) -> Self {
        Self {
            cell,
            slot: AnimationSlot::new(engine),
        }
    }

    pub fn cell(&self) -> &Arc<ScalarCell<T>> {
        &self.cell
    }

    pub fn value(&self) -> T {
        self.cell.get()
    }

    /// Overwrite the value. An active animation keeps running and will
    /// overwrite it again; call `animate_stop` first.
    pub fn set_value(&self, value: T) -> &Self {
        self.cell.set(value);
        self
    }

    fn start(
        &mut self,
        target: T,
        duration_ms: i64,
        repeat: Option<RepeatMode>,
    ) -> Result<&mut Self> {
        let duration = validate(target.is_usable(), duration_ms)?;
        self.slot.stop();
        let tween = ScalarTween {
            cell: Arc::clone(&self.cell),
            from: self.cell.get(),
            to: target,
        };
        self.slot.launch(Arc::new(tween), duration, repeat);
        Ok(self)
    }
}

impl<T: Scalar> Animates<T> for AnimatedValue<T> {
    fn is_animating(&self) -> bool {
        self.slot.is_animating()
    }

    fn animate_stop(&mut self) -> &mut Self {
        self.slot.stop();
        self
    }

    fn animate_start(&mut self, target: T, duration_ms: i64) -> Result<&mut Self> {
        self.start(target, duration_ms, None)
    }

    fn animate_start_loop(
        &mut self,
        target: T,
        reverse: bool,
        duration_ms: i64,
    ) -> Result<&mut Self> {
        self.start(target, duration_ms, Some(RepeatMode::from_reverse(reverse)))
    }
}

impl<T: Scalar> fmt::Debug for AnimatedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("value", &self.value())
            .field("animating", &self.is_animating())
            .finish()
    }
}

/// Animation handle for a shared [`Vector3`].
pub struct AnimatedVector3 {
    vector: Arc<Vector3>,
    slot: AnimationSlot,
}

impl AnimatedVector3 {
    pub fn new(engine: Arc<dyn TimelineEngine>, vector: Arc<Vector3>) -> Self {
        Self {
            vector,
            slot: AnimationSlot::new(engine),
        }
    }

    pub fn vector(&self) -> &Arc<Vector3> {
        &self.vector
    }

    fn start(
        &mut self,
        target: DVec3,
        duration_ms: i64,
        repeat: Option<RepeatMode>,
    ) -> Result<&mut Self> {
        let duration = validate(target.is_finite(), duration_ms)?;
        self.slot.stop();
        let tween = VectorTween {
            vector: Arc::clone(&self.vector),
            from: self.vector.get(),
            to: target,
        };
        self.slot.launch(Arc::new(tween), duration, repeat);
        Ok(self)
    }
}

impl Animates<DVec3> for AnimatedVector3 {
    fn is_animating(&self) -> bool {
        self.slot.is_animating()
    }

    fn animate_stop(&mut self) -> &mut Self {
        self.slot.stop();
        self
    }

    fn animate_start(&mut self, target: DVec3, duration_ms: i64) -> Result<&mut Self> {
        self.start(target, duration_ms, None)
    }

    fn animate_start_loop(
        &mut self,
        target: DVec3,
        reverse: bool,
        duration_ms: i64,
    ) -> Result<&mut Self> {
        self.start(target, duration_ms, Some(RepeatMode::from_reverse(reverse)))
    }
}

impl fmt::Debug for AnimatedVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimatedVector3{}", self.vector)
    }
}

/// Animation handle for a shared [`Color`].
pub struct AnimatedColor {
    color: Arc<Color>,
    slot: AnimationSlot,
}

impl AnimatedColor {
    pub fn new(engine: Arc<dyn TimelineEngine>, color: Arc<Color>) -> Self {
        Self {
            color,
            slot: AnimationSlot::new(engine),
        }
    }

    pub fn color(&self) -> &Arc<Color> {
        &self.color
    }

    fn start(
        &mut self,
        target: Rgba,
        duration_ms: i64,
        repeat: Option<RepeatMode>,
    ) -> Result<&mut Self> {
        let duration = validate(target.is_valid(), duration_ms)?;
        self.slot.stop();
        let tween = ColorTween {
            color: Arc::clone(&self.color),
            from: self.color.get(),
            to: target,
        };
        self.slot.launch(Arc::new(tween), duration, repeat);
        Ok(self)
    }
}

impl Animates<Rgba> for AnimatedColor {
    fn is_animating(&self) -> bool {
        self.slot.is_animating()
    }

    fn animate_stop(&mut self) -> &mut Self {
        self.slot.stop();
        self
    }

    fn animate_start(&mut self, target: Rgba, duration_ms: i64) -> Result<&mut Self> {
        self.start(target, duration_ms, None)
    }

    fn animate_start_loop(
        &mut self,
        target: Rgba,
        reverse: bool,
        duration_ms: i64,
    ) -> Result<&mut Self> {
        self.start(target, duration_ms, Some(RepeatMode::from_reverse(reverse)))
    }
}

impl fmt::Debug for AnimatedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimatedColor({})", self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animates::mock::{MockEngine, State};
    use shapedraw_common::ShapeDrawError;

    /// Shared contract checks for any two independent animated values.
    fn assert_animates_valid<T, A>(a0: &mut A, a1: &mut A, target: T, unusable: Option<T>)
    where
        T: Copy,
        A: Animates<T>,
    {
        assert!(!a0.is_animating());
        assert!(!a1.is_animating());

        a0.animate_stop();
        a0.animate_stop().animate_stop();
        assert!(!a0.is_animating());

        a0.animate_start(target, 5000).unwrap();
        assert!(a0.is_animating());
        assert!(!a1.is_animating());

        a1.animate_start(target, 5000).unwrap();
        assert!(a0.is_animating());
        assert!(a1.is_animating());

        a0.animate_stop();
        assert!(!a0.is_animating());
        assert!(a1.is_animating());

        a0.animate_start_loop(target, true, 3000).unwrap();
        assert!(a0.is_animating());
        a0.animate_stop();

        a0.animate_start(target, 5000).unwrap();
        a0.animate_start(target, 300).unwrap();
        a0.animate_stop();
        assert!(!a0.is_animating());

        a0.animate_start(target, 0).unwrap().animate_stop();

        for duration in [-1, -9000] {
            assert!(matches!(
                a0.animate_start(target, duration),
                Err(ShapeDrawError::InvalidArgument { .. })
            ));
        }
        assert!(a0.animate_start_loop(target, true, -1).is_err());
        if let Some(bad) = unusable {
            assert!(a0.animate_start(bad, 5000).is_err());
            assert!(a0.animate_start_loop(bad, false, 5000).is_err());
        }

        assert!(a1.is_animating());
        assert!(!a1.animate_stop().is_animating());
    }

    fn engine() -> (MockEngine, Arc<dyn TimelineEngine>) {
        let mock = MockEngine::default();
        let shared: Arc<dyn TimelineEngine> = Arc::new(mock.clone());
        (mock, shared)
    }

    #[test]
    fn double_value() {
        let (_, e) = engine();
        let mut v0 = AnimatedValue::new(Arc::clone(&e), 0.0f64);
        let mut v1 = AnimatedValue::new(e, 60.5f64);
        assert_animates_valid(&mut v0, &mut v1, 32.25, Some(f64::NAN));
        let current = v0.value();
        v0.animate_start_loop(current, false, 10000).unwrap();
    }

    #[test]
    fn float_value() {
        let (_, e) = engine();
        let mut v0 = AnimatedValue::new(Arc::clone(&e), 0.0f32);
        let mut v1 = AnimatedValue::new(e, 60.5f32);
        assert_animates_valid(&mut v0, &mut v1, 32.25, Some(f32::INFINITY));
    }

    #[test]
    fn integer_values() {
        let (_, e) = engine();
        let mut i0 = AnimatedValue::new(Arc::clone(&e), 0i32);
        let mut i1 = AnimatedValue::new(Arc::clone(&e), 456i32);
        assert_animates_valid(&mut i0, &mut i1, 32, None);

        let mut l0 = AnimatedValue::new(Arc::clone(&e), 0i64);
        let mut l1 = AnimatedValue::new(e, 99_999_999_999i64);
        assert_animates_valid(&mut l0, &mut l1, 32, None);
    }

    #[test]
    fn vector_and_color() {
        let (_, e) = engine();
        let mut v0 = AnimatedVector3::new(Arc::clone(&e), Vector3::shared(0.0, 0.0, 0.0));
        let mut v1 = AnimatedVector3::new(Arc::clone(&e), Vector3::shared(1.0, 1.0, 1.0));
        assert_animates_valid(
            &mut v0,
            &mut v1,
            DVec3::new(5.0, -2.0, 1.0),
            Some(DVec3::new(f64::NAN, 0.0, 0.0)),
        );

        let mut c0 = AnimatedColor::new(Arc::clone(&e), Color::shared(Rgba::BLACK));
        let mut c1 = AnimatedColor::new(e, Color::shared(Rgba::WHITE));
        assert_animates_valid(
            &mut c0,
            &mut c1,
            Rgba::RED,
            Some(Rgba::new(1.5, 0.0, 0.0, 1.0)),
        );
    }

    #[test]
    fn one_active_timeline_per_value() {
        let (mock, e) = engine();
        let mut v = AnimatedValue::new(e, 0.0f64);
        v.animate_start(10.0, 5000).unwrap();
        v.animate_start(20.0, 5000).unwrap();
        v.animate_start_loop(30.0, false, 5000).unwrap();
        assert_eq!(mock.created(), 3);
        assert_eq!(mock.active(), 1);
        assert_eq!(
            mock.last().lock().state,
            State::Playing(Some(RepeatMode::Restart))
        );
    }

    #[test]
    fn invalid_arguments_leave_active_animation_running() {
        let (mock, e) = engine();
        let mut v = AnimatedValue::new(e, 0.0f64);
        v.animate_start(10.0, 5000).unwrap();
        assert!(v.animate_start(f64::NAN, 5000).is_err());
        assert!(v.animate_start(5.0, -1).is_err());
        assert!(v.is_animating());
        assert_eq!(mock.created(), 1);
    }

    #[test]
    fn tween_interpolates_from_value_at_start() {
        let (mock, e) = engine();
        let mut v = AnimatedValue::new(e, 10i32);
        v.animate_start(20, 1000).unwrap();
        mock.drive_last(0.5);
        assert_eq!(v.value(), 15);
        mock.drive_last(1.0);
        assert_eq!(v.value(), 20);
        assert!(!v.is_animating());

        // stop leaves the value where it is
        v.animate_start(0, 1000).unwrap();
        mock.drive_last(0.25);
        v.animate_stop();
        assert_eq!(v.value(), 15);
    }

    #[test]
    fn shared_cell_sees_animation() {
        let (mock, e) = engine();
        let angle = Arc::new(ScalarCell::new(0.0f64));
        let mut v = AnimatedValue::from_cell(e, Arc::clone(&angle));
        v.animate_start(360.0, 2000).unwrap();
        mock.drive_last(0.5);
        assert_eq!(angle.get(), 180.0);
    }

    #[test]
    fn vector_and_color_tweens_reach_target() {
        let (mock, e) = engine();
        let mut v = AnimatedVector3::new(Arc::clone(&e), Vector3::shared(0.0, 0.0, 0.0));
        v.animate_start(DVec3::new(2.0, 4.0, 6.0), 100).unwrap();
        mock.drive_last(0.5);
        assert_eq!(v.vector().get(), DVec3::new(1.0, 2.0, 3.0));

        let mut c = AnimatedColor::new(e, Color::shared(Rgba::BLACK));
        c.animate_start(Rgba::WHITE, 100).unwrap();
        mock.drive_last(1.0);
        assert_eq!(c.color().get(), Rgba::WHITE);
    }

    #[test]
    fn dropping_the_handle_aborts_its_timeline() {
        let (mock, e) = engine();
        {
            let mut v = AnimatedValue::new(e, 0.0f64);
            v.animate_start_loop(1.0, true, 100).unwrap();
            assert_eq!(mock.active(), 1);
        }
        assert_eq!(mock.active(), 0);
    }
}
