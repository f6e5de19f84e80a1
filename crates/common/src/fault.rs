//! Fault isolation for client callbacks.
//!
//! Listener and shape code runs inside [`isolate`], which turns both returned
//! errors and panics into a plain description. The caller decides how to log
//! it; the frame loop then carries on with the next callback.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run a client callback, converting an `Err` or a panic into its description.
pub fn isolate<F>(f: F) -> Result<(), String>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
