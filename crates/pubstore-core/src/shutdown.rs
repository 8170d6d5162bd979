//! Graceful shutdown via an atomic flag set from SIGINT/SIGTERM

use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Request shutdown
pub fn request_shutdown() {
    shutdown_flag().store(true, Ordering::Relaxed);
}

/// Register SIGINT/SIGTERM handlers.
///
/// First signal sets the shutdown flag; the pipeline stops between batches.
/// Second signal exits immediately with status 130.
pub fn install_signal_handlers() -> std::io::Result<()> {
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        // SAFETY: the handler only does an atomic swap and `_exit`, both
        // async-signal-safe; `process::exit` would run atexit handlers
        unsafe {
            signal_hook::low_level::register(signal, || {
                if shutdown_flag().swap(true, Ordering::Relaxed) {
                    signal_hook::low_level::exit(130);
                }
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_signal_sets_flag() {
        install_signal_handlers().unwrap();
        assert!(!is_shutdown_requested());

        signal_hook::low_level::raise(signal_hook::consts::SIGTERM).unwrap();
        assert!(is_shutdown_requested());
    }
}
