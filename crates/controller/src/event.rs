use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;

use crate::session::Session;

/// Fired before the game tick on which a respawn was detected.
///
/// Player coordinates are not reliable at this point; the host may not have
/// placed the new player yet.
#[derive(Debug, Clone)]
pub struct RespawnEvent {
    session: Session,
    player_coords: DVec3,
    is_new_server: bool,
    is_new_dimension: bool,
}

impl RespawnEvent {
    pub fn new(session: Session, player_coords: DVec3, is_new_server: bool, is_new_dimension: bool) -> Self {
        Self {
            session,
            player_coords,
            is_new_server,
            is_new_dimension: is_new_server || is_new_dimension,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player_coords(&self) -> DVec3 {
        self.player_coords
    }

    pub fn is_new_server(&self) -> bool {
        self.is_new_server
    }

    pub fn is_new_dimension(&self) -> bool {
        self.is_new_dimension
    }
}

#[derive(Debug, Clone)]
pub struct GameTickEvent {
    session: Session,
    player_coords: DVec3,
}

impl GameTickEvent {
    pub fn new(session: Session, player_coords: DVec3) -> Self {
        Self {
            session,
            player_coords,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player_coords(&self) -> DVec3 {
        self.player_coords
    }
}

/// Fired for each session right before its shapes are drawn.
#[derive(Debug, Clone)]
pub struct PreRenderEvent {
    session: Session,
    player_coords: DVec3,
    partial_tick: f32,
    gui_hidden: bool,
}

impl PreRenderEvent {
    pub fn new(session: Session, player_coords: DVec3, partial_tick: f32, gui_hidden: bool) -> Self {
        Self {
            session,
            player_coords,
            partial_tick,
            gui_hidden,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player_coords(&self) -> DVec3 {
        self.player_coords
    }

    /// Fraction of the way to the next game tick, in `[0, 1)`.
    pub fn partial_tick(&self) -> f32 {
        self.partial_tick
    }

    pub fn is_gui_hidden(&self) -> bool {
        self.gui_hidden
    }
}

/// Client callbacks. Every method has a no-op default; errors and panics are
/// caught and logged by the dispatcher.
pub trait EventListener {
    fn on_respawn(&mut self, _event: &RespawnEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_game_tick(&mut self, _event: &GameTickEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_pre_render(&mut self, _event: &PreRenderEvent) -> anyhow::Result<()> {
        Ok(())
    }

    /// Label used in logs and dumps.
    fn name(&self) -> &str {
        "listener"
    }
}

pub type ListenerHandle = Rc<RefCell<dyn EventListener>>;

pub fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    Rc::ptr_eq(a, b)
}
