//! Fatal-signal handling.
//!
//! The handler only records the signal number in an atomic; the event loop
//! polls [`take_pending`] between turns and runs the backup-and-exit path in
//! normal context, where non-signal-safe work is allowed.

use std::sync::atomic::{AtomicI32, Ordering};

static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);

extern "C" fn handle_signal(signum: libc::c_int) {
	PENDING_SIGNAL.store(signum, Ordering::Relaxed);
}

/// Installs handlers for `SIGTERM`, `SIGINT`, `SIGQUIT`, and `SIGHUP`.
pub fn install() {
	unsafe {
		let mut action: libc::sigaction = std::mem::zeroed();
		action.sa_sigaction = handle_signal as *const () as libc::sighandler_t;
		libc::sigemptyset(&raw mut action.sa_mask);
		for sig in [libc::SIGTERM, libc::SIGINT, libc::SIGQUIT, libc::SIGHUP] {
			libc::sigaction(sig, &raw const action, std::ptr::null_mut());
		}
	}
}

/// Takes the pending signal number, clearing it.
pub fn take_pending() -> Option<i32> {
	match PENDING_SIGNAL.swap(0, Ordering::Relaxed) {
		0 => None,
		signum => Some(signum),
	}
}

/// Marks a signal as pending without going through a real handler.
#[doc(hidden)]
pub fn set_pending(signum: i32) {
	PENDING_SIGNAL.store(signum, Ordering::Relaxed);
}
