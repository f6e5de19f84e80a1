use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::step::StepEngine;

/// Pulse used when the host does not pick one.
pub const DEFAULT_PULSE: Duration = Duration::from_millis(40);

/// Background thread advancing a [`StepEngine`] at a fixed pulse.
///
/// Dropping the ticker stops the thread and waits for it to exit.
pub struct Ticker {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl StepEngine {
    pub fn spawn_ticker(&self, pulse: Duration) -> io::Result<Ticker> {
        let (stop, stopped) = bounded::<()>(1);
        let engine = self.clone();
        let handle = thread::Builder::new()
            .name("shapedraw-tween".into())
            .spawn(move || {
                debug!(?pulse, "tween ticker started");
                loop {
                    match stopped.recv_timeout(pulse) {
                        Err(RecvTimeoutError::Timeout) => {
                            engine.advance(pulse);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("tween ticker stopped");
            })?;
        Ok(Ticker {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let _ = self.stop.try_send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("tween ticker thread panicked");
            }
        }
    }
}
