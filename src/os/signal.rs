// src/os/signal.rs

//! Process-wide interrupt flag driven by SIGINT and SIGTERM.
//!
//! The handler only stores to an atomic; the animation loop polls the flag
//! between frames and performs the terminal restore itself.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Set once SIGINT or SIGTERM has been delivered.
pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn note_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Routes SIGINT and SIGTERM to [`INTERRUPTED`].
///
/// `SA_RESTART` keeps an in-flight terminal write from failing with `EINTR`.
pub fn install_interrupt_handler() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(note_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only performs an atomic store.
        unsafe { sigaction(signal, &action) }
            .with_context(|| format!("Failed to install handler for {}", signal))?;
        debug!("Installed interrupt handler for {}", signal);
    }
    Ok(())
}

/// Whether an interrupt has been requested.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
