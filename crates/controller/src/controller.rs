use std::fmt;
use std::time::Instant;

use glam::DVec3;
use serde::Serialize;
use shapedraw_common::{isolate, Result, ShapeDrawError};
use shapedraw_render::{DepthFunc, DrawingFacade, RenderPipeline, RenderStats};
use tracing::{debug, debug_span, info, trace, warn};

use crate::dump::{DumpReport, SessionReport};
use crate::event::{EventListener, GameTickEvent, PreRenderEvent, RespawnEvent};
use crate::respawn::{PlayerId, Respawn, RespawnTracker, WorldId};
use crate::session::Session;
use crate::settings::Settings;

/// Listener calls made while dispatching one event kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub calls: usize,
    pub faults: usize,
    /// Listeners skipped because they were already borrowed.
    pub busy: usize,
}

impl DispatchStats {
    fn merge(&mut self, other: DispatchStats) {
        self.calls += other.calls;
        self.faults += other.faults;
        self.busy += other.busy;
    }
}

/// What happened during one game tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub respawn: Option<Respawn>,
    pub listeners: DispatchStats,
    pub dumped: bool,
}

/// Totals since the controller was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub ticks: u64,
    pub frames: u64,
    pub respawns: u64,
    pub listener_faults: u64,
    pub shape_faults: u64,
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} frames={} respawns={} listener_faults={} shape_faults={}",
            self.ticks, self.frames, self.respawns, self.listener_faults, self.shape_faults
        )
    }
}

/// Coordinates drawing sessions with the host's game loop.
///
/// The host calls [`Controller::initialize`] once, then
/// [`Controller::on_game_tick`] and [`Controller::on_pre_render`] from its
/// frame thread. Sessions are dispatched to and drawn in registration order.
pub struct Controller {
    settings: Settings,
    facade: Option<Box<dyn DrawingFacade>>,
    sessions: Vec<Session>,
    next_id: u64,
    respawn: RespawnTracker,
    pipeline: RenderPipeline,
    counters: Counters,
    last_dump: Option<Instant>,
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            facade: None,
            sessions: Vec::new(),
            next_id: 0,
            respawn: RespawnTracker::new(),
            pipeline: RenderPipeline::new(),
            counters: Counters::default(),
            last_dump: None,
        }
    }

    /// Attach the host's drawing facade. Allowed exactly once.
    pub fn initialize(&mut self, facade: Box<dyn DrawingFacade>) -> Result<()> {
        if self.facade.is_some() {
            return Err(ShapeDrawError::InvalidState(
                "controller is already initialized".into(),
            ));
        }
        self.facade = Some(facade);
        info!("controller initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.facade.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    fn ensure_initialized(&self, operation: &str) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ShapeDrawError::InvalidState(format!(
                "{operation} called before the controller was initialized"
            )))
        }
    }

    // --- registry ---

    /// Register `session` and assign it the identity `"{owner_hint}#{n}"`.
    pub fn register(&mut self, session: &Session, owner_hint: &str) -> Result<String> {
        self.ensure_initialized("register")?;
        if self.is_registered(session) {
            return Err(ShapeDrawError::DuplicateRegistration(session.label()));
        }
        let id = format!("{owner_hint}#{}", self.next_id);
        self.next_id += 1;
        session.set_id(Some(id.clone()));
        self.sessions.push(session.clone());
        info!(session = %id, owner = %session.owner(), "session registered");
        Ok(id)
    }

    /// Remove `session`. Returns false if it was not registered.
    pub fn unregister(&mut self, session: &Session) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.ptr_eq(session)) else {
            return false;
        };
        self.sessions.remove(index);
        info!(session = %session.label(), "session unregistered");
        session.set_id(None);
        true
    }

    pub fn is_registered(&self, session: &Session) -> bool {
        self.sessions.iter().any(|s| s.ptr_eq(session))
    }

    /// Registered sessions in registration order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    // --- frame dispatch ---

    /// The host connected to a server; the next tick reports a new server.
    pub fn on_server_connect(&mut self) {
        self.respawn.reset();
        debug!("server connect; respawn state reset");
    }

    /// Run one game tick: detect respawns, dispatch Respawn (if detected) then
    /// GameTick to every listener, and dump state if the interval elapsed.
    pub fn on_game_tick(
        &mut self,
        player_coords: DVec3,
        world: WorldId,
        player: PlayerId,
        dimension: i32,
    ) -> Result<TickReport> {
        self.ensure_initialized("on_game_tick")?;
        let _span = debug_span!("game_tick", tick = self.counters.ticks).entered();
        self.counters.ticks += 1;
        let mut report = TickReport::default();
        let sessions = self.sessions.clone();

        if let Some(respawn) = self.respawn.observe(world, player, dimension) {
            info!(
                is_new_server = respawn.is_new_server,
                is_new_dimension = respawn.is_new_dimension,
                dimension,
                "respawn detected"
            );
            self.counters.respawns += 1;
            report.respawn = Some(respawn);
            for session in &sessions {
                let event = RespawnEvent::new(
                    session.clone(),
                    player_coords,
                    respawn.is_new_server,
                    respawn.is_new_dimension,
                );
                report
                    .listeners
                    .merge(dispatch(session, "respawn", |l| l.on_respawn(&event)));
            }
        }

        if self.dump_due() {
            report.dumped = self.debug_dump();
        }

        for session in &sessions {
            let event = GameTickEvent::new(session.clone(), player_coords);
            report
                .listeners
                .merge(dispatch(session, "game_tick", |l| l.on_game_tick(&event)));
        }

        self.counters.listener_faults += report.listeners.faults as u64;
        trace!(calls = report.listeners.calls, faults = report.listeners.faults, "game tick dispatched");
        Ok(report)
    }

    /// Run one render frame: for each session, dispatch PreRender to its
    /// listeners and then draw its shapes.
    pub fn on_pre_render(
        &mut self,
        player_coords: DVec3,
        partial_tick: f32,
        gui_hidden: bool,
    ) -> Result<RenderStats> {
        self.ensure_initialized("on_pre_render")?;
        let Some(facade) = self.facade.as_deref_mut() else {
            return Err(ShapeDrawError::InvalidState("no drawing facade".into()));
        };
        self.counters.frames += 1;
        self.pipeline.begin_frame(player_coords);

        let mut stats = RenderStats::default();
        let mut listeners = DispatchStats::default();
        for session in self.sessions.clone() {
            let label = session.label();
            let _span = debug_span!("session", id = %label).entered();

            let event = PreRenderEvent::new(session.clone(), player_coords, partial_tick, gui_hidden);
            listeners.merge(dispatch(&session, "pre_render", |l| l.on_pre_render(&event)));

            if !RenderPipeline::layer_visible(
                session.is_visible(),
                session.is_visible_when_hiding_gui(),
                gui_hidden,
            ) {
                stats.layers_skipped += 1;
                continue;
            }
            stats += self.pipeline.render_layer(&mut *facade, &label, &session.shapes());
        }
        facade.set_depth_func(DepthFunc::LessOrEqual);

        self.counters.listener_faults += listeners.faults as u64;
        self.counters.shape_faults += stats.faults as u64;
        trace!(%stats, "frame rendered");
        Ok(stats)
    }

    // --- debugging ---

    pub fn report(&self) -> DumpReport {
        DumpReport {
            initialized: self.is_initialized(),
            settings: self.settings.clone(),
            counters: self.counters,
            sessions: self.sessions.iter().map(SessionReport::of).collect(),
        }
    }

    /// Log a [`DumpReport`] at info level. Returns false, doing nothing, when
    /// logging is disabled in the settings.
    pub fn debug_dump(&mut self) -> bool {
        if !self.settings.logging_enabled {
            return false;
        }
        info!("{}", self.report());
        self.last_dump = Some(Instant::now());
        true
    }

    fn dump_due(&self) -> bool {
        let Some(interval) = self.settings.dump_interval() else {
            return false;
        };
        self.last_dump.is_none_or(|last| last.elapsed() >= interval)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("initialized", &self.is_initialized())
            .field("sessions", &self.sessions)
            .field("settings", &self.settings)
            .field("counters", &self.counters)
            .finish()
    }
}

/// Call `f` on each of the session's listeners, isolating failures.
fn dispatch<F>(session: &Session, event: &'static str, mut f: F) -> DispatchStats
where
    F: FnMut(&mut dyn EventListener) -> anyhow::Result<()>,
{
    let mut stats = DispatchStats::default();
    for listener in session.listeners() {
        let Ok(mut guard) = listener.try_borrow_mut() else {
            warn!(session = %session.label(), event, "listener is borrowed elsewhere; skipped");
            stats.busy += 1;
            continue;
        };
        stats.calls += 1;
        if let Err(detail) = isolate(|| f(&mut *guard)) {
            let mut name = String::from("listener");
            // A listener that fails its callback may fail here too.
            let _ = isolate(|| {
                name = guard.name().to_string();
                Ok(())
            });
            let err = ShapeDrawError::ListenerFault {
                session: session.label(),
                listener: name,
                detail,
            };
            warn!(error = %err, event, "listener fault");
            stats.faults += 1;
        }
    }
    stats
}
