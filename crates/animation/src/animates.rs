use std::sync::Arc;
use std::time::Duration;

use shapedraw_common::{Result, ShapeDrawError};
use tracing::trace;

use crate::engine::{RepeatMode, Timeline, TimelineEngine, Tweenable};

/// Capability of a value that can be animated towards a target of type `T`.
///
/// At most one timeline is active per value. Starting a new animation stops
/// the previous one first; stopping leaves the value wherever it currently is.
pub trait Animates<T> {
    fn is_animating(&self) -> bool;

    /// Abort the active animation, if any. Safe to call repeatedly.
    fn animate_stop(&mut self) -> &mut Self;

    /// Animate from the current value to `target` over `duration_ms`, then
    /// hold. A zero duration reaches the target on the engine's next update.
    fn animate_start(&mut self, target: T, duration_ms: i64) -> Result<&mut Self>;

    /// Animate between the current value and `target` forever. With
    /// `reverse` the animation ping-pongs; otherwise each cycle jumps back to
    /// the starting value.
    fn animate_start_loop(
        &mut self,
        target: T,
        reverse: bool,
        duration_ms: i64,
    ) -> Result<&mut Self>;
}

/// Check animation arguments before anything is stopped or created.
pub fn validate(target_usable: bool, duration_ms: i64) -> Result<Duration> {
    if !target_usable {
        return Err(ShapeDrawError::invalid_argument(
            "target",
            "animation target must be a finite, in-range value",
        ));
    }
    u64::try_from(duration_ms)
        .map(Duration::from_millis)
        .map_err(|_| {
            ShapeDrawError::invalid_argument(
                "duration_ms",
                format!("must be >= 0, got {duration_ms}"),
            )
        })
}

/// The single timeline slot behind every [`Animates`] implementation.
pub struct AnimationSlot {
    engine: Arc<dyn TimelineEngine>,
    timeline: Option<Box<dyn Timeline>>,
}

impl AnimationSlot {
    pub fn new(engine: Arc<dyn TimelineEngine>) -> Self {
        Self {
            engine,
            timeline: None,
        }
    }

    pub fn engine(&self) -> &Arc<dyn TimelineEngine> {
        &self.engine
    }

    pub fn is_animating(&self) -> bool {
        self.timeline.as_ref().is_some_and(|t| !t.is_done())
    }

    pub fn stop(&mut self) {
        if let Some(mut timeline) = self.timeline.take() {
            if !timeline.is_done() {
                timeline.abort();
                trace!("animation aborted");
            }
        }
    }

    /// Replace any active timeline with a new one driving `target`.
    pub fn launch(
        &mut self,
        target: Arc<dyn Tweenable>,
        duration: Duration,
        repeat: Option<RepeatMode>,
    ) {
        self.stop();
        let mut timeline = self.engine.create_timeline(target);
        timeline.set_duration(duration);
        match repeat {
            Some(mode) => timeline.play_loop(mode),
            None => timeline.play(),
        }
        trace!(?duration, ?repeat, "animation started");
        self.timeline = Some(timeline);
    }
}

impl Drop for AnimationSlot {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AnimationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSlot")
            .field("animating", &self.is_animating())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Engine double that records timelines without advancing them.

    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::engine::{RepeatMode, Timeline, TimelineEngine, Tweenable};

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum State {
        Created,
        Playing(Option<RepeatMode>),
        Aborted,
        Finished,
    }

    pub struct Record {
        pub duration: Duration,
        pub state: State,
        pub target: Arc<dyn Tweenable>,
    }

    #[derive(Default, Clone)]
    pub struct MockEngine {
        pub records: Arc<Mutex<Vec<Arc<Mutex<Record>>>>>,
    }

    impl MockEngine {
        pub fn active(&self) -> usize {
            self.records
                .lock()
                .iter()
                .filter(|r| matches!(r.lock().state, State::Playing(_)))
                .count()
        }

        pub fn created(&self) -> usize {
            self.records.lock().len()
        }

        pub fn last(&self) -> Arc<Mutex<Record>> {
            Arc::clone(self.records.lock().last().expect("no timeline created"))
        }

        /// Drive the most recent timeline to `fraction`; 1.0 finishes a one-shot.
        pub fn drive_last(&self, fraction: f64) {
            let record = self.last();
            let mut r = record.lock();
            r.target.interpolate(fraction);
            if fraction >= 1.0 && r.state == State::Playing(None) {
                r.state = State::Finished;
            }
        }
    }

    struct MockTimeline(Arc<Mutex<Record>>);

    impl Timeline for MockTimeline {
        fn set_duration(&mut self, duration: Duration) {
            self.0.lock().duration = duration;
        }

        fn play(&mut self) {
            self.0.lock().state = State::Playing(None);
        }

        fn play_loop(&mut self, mode: RepeatMode) {
            self.0.lock().state = State::Playing(Some(mode));
        }

        fn abort(&mut self) {
            self.0.lock().state = State::Aborted;
        }

        fn is_done(&self) -> bool {
            matches!(self.0.lock().state, State::Aborted | State::Finished)
        }
    }

    impl TimelineEngine for MockEngine {
        fn create_timeline(&self, target: Arc<dyn Tweenable>) -> Box<dyn Timeline> {
            let record = Arc::new(Mutex::new(Record {
                duration: Duration::ZERO,
                state: State::Created,
                target,
            }));
            self.records.lock().push(Arc::clone(&record));
            Box::new(MockTimeline(record))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_negative_duration_and_unusable_target() {
        assert_eq!(validate(true, 0).unwrap(), Duration::ZERO);
        assert_eq!(validate(true, 300).unwrap(), Duration::from_millis(300));
        assert!(matches!(
            validate(true, -1),
            Err(ShapeDrawError::InvalidArgument {
                name: "duration_ms",
                ..
            })
        ));
        assert!(matches!(
            validate(false, 10),
            Err(ShapeDrawError::InvalidArgument { name: "target", .. })
        ));
    }

    #[test]
    fn launch_replaces_previous_timeline() {
        struct Noop;
        impl Tweenable for Noop {
            fn interpolate(&self, _fraction: f64) {}
        }

        let engine = mock::MockEngine::default();
        let mut slot = AnimationSlot::new(Arc::new(engine.clone()));
        assert!(!slot.is_animating());

        slot.launch(Arc::new(Noop), Duration::from_millis(5000), None);
        slot.launch(Arc::new(Noop), Duration::from_millis(300), Some(RepeatMode::Reverse));
        assert!(slot.is_animating());
        assert_eq!(engine.created(), 2);
        assert_eq!(engine.active(), 1);
        assert_eq!(engine.last().lock().duration, Duration::from_millis(300));

        slot.stop();
        slot.stop();
        assert!(!slot.is_animating());
        assert_eq!(engine.active(), 0);
    }
}
