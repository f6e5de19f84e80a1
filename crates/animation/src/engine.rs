use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Something a timeline can drive. `fraction` runs from 0 (start value) to 1
/// (target value); the target captures its own property, start and end.
pub trait Tweenable: Send + Sync {
    fn interpolate(&self, fraction: f64);
}

/// How a looping timeline continues once it reaches the end of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Jump back to the start value and run forwards again.
    Restart,
    /// Run backwards to the start value, then forwards again.
    Reverse,
}

impl RepeatMode {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Reverse } else { Self::Restart }
    }
}

/// A single running interpolation owned by an animated value.
pub trait Timeline: Send {
    fn set_duration(&mut self, duration: Duration);
    /// Run once, then hold at the target.
    fn play(&mut self);
    /// Run forever.
    fn play_loop(&mut self, mode: RepeatMode);
    /// Stop without touching the current value.
    fn abort(&mut self);
    fn is_done(&self) -> bool;
}

/// External interpolation engine. Timelines it creates are advanced out of
/// band, possibly from another thread.
pub trait TimelineEngine: Send + Sync {
    fn create_timeline(&self, target: std::sync::Arc<dyn Tweenable>) -> Box<dyn Timeline>;
}
