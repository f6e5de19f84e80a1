use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shapedraw_animation::{RepeatMode, Timeline, TimelineEngine, Tweenable};
use tracing::trace;

/// Lifecycle of a [`StepEngine`] timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing(Option<RepeatMode>),
    Done,
    Aborted,
}

struct TimelineState {
    target: Arc<dyn Tweenable>,
    duration: Duration,
    elapsed: Duration,
    phase: Phase,
    registered: bool,
}

impl TimelineState {
    fn step(&mut self, dt: Duration) {
        let Phase::Playing(repeat) = self.phase else {
            return;
        };
        self.elapsed = self.elapsed.saturating_add(dt);
        self.target
            .interpolate(fraction(self.elapsed, self.duration, repeat));
        if repeat.is_none() && self.elapsed >= self.duration {
            self.phase = Phase::Done;
        }
    }
}

type Entry = Arc<Mutex<TimelineState>>;

/// Progress through a timeline as a linear fraction in `[0, 1]`.
///
/// A one-shot timeline clamps at 1. `Restart` shows 1 on each cycle boundary
/// and wraps to the start just after it; `Reverse` runs 0 → 1 → 0. A zero
/// duration is always at 1.
pub fn fraction(elapsed: Duration, duration: Duration, repeat: Option<RepeatMode>) -> f64 {
    let d = duration.as_nanos();
    if d == 0 {
        return 1.0;
    }
    let e = elapsed.as_nanos();
    let ratio = |n: u128| n as f64 / d as f64;
    match repeat {
        None if e >= d => 1.0,
        None => ratio(e),
        Some(RepeatMode::Restart) if e > 0 && e % d == 0 => 1.0,
        Some(RepeatMode::Restart) => ratio(e % d),
        Some(RepeatMode::Reverse) => {
            let pos = e % (2 * d);
            if pos <= d { ratio(pos) } else { ratio(2 * d - pos) }
        }
    }
}

/// Fixed-step linear interpolation engine.
///
/// Timelines do nothing until [`StepEngine::advance`] is called, either by
/// the host directly (deterministic) or by a [`crate::Ticker`] thread.
#[derive(Clone, Default)]
pub struct StepEngine {
    playing: Arc<Mutex<Vec<Entry>>>,
}

impl StepEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timelines that are currently playing.
    pub fn active(&self) -> usize {
        self.playing
            .lock()
            .iter()
            .filter(|e| matches!(e.lock().phase, Phase::Playing(_)))
            .count()
    }

    /// Step every playing timeline by `dt`. Finished and aborted timelines are
    /// dropped from the registry. Returns how many timelines were stepped.
    pub fn advance(&self, dt: Duration) -> usize {
        let entries: Vec<Entry> = {
            let mut playing = self.playing.lock();
            playing.retain(|e| {
                let mut state = e.lock();
                let keep = matches!(state.phase, Phase::Playing(_));
                if !keep {
                    state.registered = false;
                }
                keep
            });
            playing.clone()
        };
        for entry in &entries {
            entry.lock().step(dt);
        }
        trace!(stepped = entries.len(), ?dt, "tween advance");
        entries.len()
    }

    fn register(&self, entry: &Entry) {
        self.playing.lock().push(Arc::clone(entry));
    }
}

impl TimelineEngine for StepEngine {
    fn create_timeline(&self, target: Arc<dyn Tweenable>) -> Box<dyn Timeline> {
        Box::new(StepTimeline {
            engine: self.clone(),
            state: Arc::new(Mutex::new(TimelineState {
                target,
                duration: Duration::ZERO,
                elapsed: Duration::ZERO,
                phase: Phase::Idle,
                registered: false,
            })),
        })
    }
}

impl std::fmt::Debug for StepEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEngine")
            .field("active", &self.active())
            .finish()
    }
}

struct StepTimeline {
    engine: StepEngine,
    state: Entry,
}

impl StepTimeline {
    fn start(&mut self, phase: Phase) {
        let needs_register = {
            let mut state = self.state.lock();
            state.elapsed = Duration::ZERO;
            state.phase = phase;
            !std::mem::replace(&mut state.registered, true)
        };
        // registry lock is never taken while holding a timeline lock
        if needs_register {
            self.engine.register(&self.state);
        }
    }
}

impl Timeline for StepTimeline {
    fn set_duration(&mut self, duration: Duration) {
        self.state.lock().duration = duration;
    }

    fn play(&mut self) {
        self.start(Phase::Playing(None));
    }

    fn play_loop(&mut self, mode: RepeatMode) {
        self.start(Phase::Playing(Some(mode)));
    }

    fn abort(&mut self) {
        let mut state = self.state.lock();
        if matches!(state.phase, Phase::Playing(_) | Phase::Idle) {
            state.phase = Phase::Aborted;
        }
    }

    fn is_done(&self) -> bool {
        matches!(self.state.lock().phase, Phase::Done | Phase::Aborted)
    }
}
