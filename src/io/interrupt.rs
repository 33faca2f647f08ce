//! SIGINT observation for clean loop shutdown.
//!
//! The handler only records that a SIGINT arrived. The running `claude`
//! child shares the foreground process group and receives the signal
//! directly, so the invocation in flight dies on its own; the loop polls the
//! flag afterwards to decide whether to stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

/// Shared flag set once the first SIGINT arrives.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Mark the flag set without a signal. Lets tests drive the interrupt
    /// path.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Install the process-wide SIGINT handler and return its flag.
///
/// May only be called once per process.
pub fn install() -> Result<InterruptFlag> {
    let flag = InterruptFlag::default();
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || handler_flag.set()).context("install SIGINT handler")?;
    Ok(flag)
}
