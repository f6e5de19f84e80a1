//! Drawing sessions and the frame dispatcher that drives them.
//!
//! A [`Controller`] owns the registered [`Session`]s. Each game tick it
//! detects respawns and notifies listeners; each render frame it notifies
//! listeners and draws every visible session's shapes.
//!
//! # Invariants
//! - Session ids are unique for the controller's lifetime and never reused.
//! - Respawn is dispatched before GameTick on the tick that detected it.
//! - A failing listener or shape never prevents later ones from running.
//! - Everything here belongs to the frame thread.

pub mod controller;
pub mod dump;
pub mod event;
pub mod respawn;
pub mod session;
pub mod settings;

pub use controller::{Controller, Counters, DispatchStats, TickReport};
pub use dump::{DumpReport, SessionReport};
pub use event::{same_listener, EventListener, GameTickEvent, ListenerHandle, PreRenderEvent, RespawnEvent};
pub use respawn::{PlayerId, Respawn, RespawnTracker, WorldId};
pub use session::Session;
pub use settings::{Settings, SettingsError, SETTINGS_FILE};

pub fn crate_info() -> &'static str {
    "shapedraw-controller v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("controller"));
    }
}
