//! SIGINT/SIGTERM handling for interactive runs.
//!
//! Signals only raise a shared flag. The scan engine checks it between
//! directory listings and the selector checks it between key events.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::{SIGINT, SIGTERM};

/// Shared interrupt flag wired to the OS signal handlers.
#[derive(Clone, Debug)]
pub struct InterruptFlag {
    flag: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Create the flag and register SIGINT/SIGTERM on it.
    ///
    /// Registration is best-effort; failures are reported on stderr.
    pub fn install() -> Self {
        let this = Self::detached();
        for (signal, name) in [(SIGINT, "SIGINT"), (SIGTERM, "SIGTERM")] {
            if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&this.flag)) {
                eprintln!("[ASW-SIGNAL] failed to register {name}: {e}");
            }
        }
        this
    }

    /// A flag with no signal handlers attached.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// The underlying atomic, for components that take a raw cancel flag.
    #[must_use]
    pub fn shared(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
