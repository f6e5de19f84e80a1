use std::fmt;

use serde::Serialize;
use shapedraw_common::isolate;

use crate::controller::Counters;
use crate::session::Session;
use crate::settings::Settings;

/// Snapshot of the controller for debugging: every session with its shapes
/// and listeners, the active settings and lifetime counters.
#[derive(Debug, Clone, Serialize)]
pub struct DumpReport {
    pub initialized: bool,
    pub settings: Settings,
    pub counters: Counters,
    pub sessions: Vec<SessionReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub id: String,
    pub owner: String,
    pub visible: bool,
    pub visible_when_hiding_gui: bool,
    pub shapes: Vec<String>,
    pub listeners: Vec<String>,
}

impl SessionReport {
    pub fn of(session: &Session) -> Self {
        Self {
            id: session.label(),
            owner: session.owner(),
            visible: session.is_visible(),
            visible_when_hiding_gui: session.is_visible_when_hiding_gui(),
            shapes: session
                .shapes()
                .iter()
                .map(|s| match s.try_borrow() {
                    Ok(shape) => describe(|| format!("{shape:?}")),
                    Err(_) => "<busy>".to_string(),
                })
                .collect(),
            listeners: session
                .listeners()
                .iter()
                .map(|l| match l.try_borrow() {
                    Ok(listener) => describe(|| listener.name().to_string()),
                    Err(_) => "<busy>".to_string(),
                })
                .collect(),
        }
    }
}

/// Client `Debug` and `name` impls may panic; the dump shows `<fault>` instead.
fn describe(f: impl FnOnce() -> String) -> String {
    let mut out = String::new();
    match isolate(|| {
        out = f();
        Ok(())
    }) {
        Ok(()) => out,
        Err(_) => "<fault>".to_string(),
    }
}

const INDENT: &str = "    ";

impl fmt::Display for DumpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "debug dump: initialized={} sessions={} logging-enabled={} debug-dump-interval-ms={}",
            self.initialized,
            self.sessions.len(),
            self.settings.logging_enabled,
            self.settings.debug_dump_interval_ms
        )?;
        writeln!(f, "{INDENT}{}", self.counters)?;
        for s in &self.sessions {
            writeln!(f, "{INDENT}{}:", s.id)?;
            writeln!(f, "{INDENT}{INDENT}owner={}", s.owner)?;
            writeln!(f, "{INDENT}{INDENT}visible={}", s.visible)?;
            writeln!(f, "{INDENT}{INDENT}visible-when-hiding-gui={}", s.visible_when_hiding_gui)?;
            writeln!(f, "{INDENT}{INDENT}shapes={}:", s.shapes.len())?;
            for shape in &s.shapes {
                writeln!(f, "{INDENT}{INDENT}{INDENT}{shape}")?;
            }
            writeln!(f, "{INDENT}{INDENT}listeners={}:", s.listeners.len())?;
            for listener in &s.listeners {
                writeln!(f, "{INDENT}{INDENT}{INDENT}{listener}")?;
            }
        }
        Ok(())
    }
}
