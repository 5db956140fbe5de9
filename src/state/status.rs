use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide interrupt flags.
///
/// Hardware-event handlers (power button, eject, reset) set these from any
/// thread; every blocking loop reads them once per tick. Only the top-level
/// dispatcher clears them.
#[derive(Debug, Default)]
pub struct SystemStatus {
    exit: AtomicBool,
    shutdown: AtomicBool,
    reset: AtomicBool,
    config: AtomicBool,
}

impl SystemStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_exit(&self) {
        tracing::info!("Exit requested");
        self.exit.store(true, Ordering::SeqCst);
    }

    pub fn request_shutdown(&self) {
        tracing::info!("Shutdown requested");
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn request_reset(&self) {
        self.reset.store(true, Ordering::SeqCst);
    }

    pub fn request_config(&self) {
        self.config.store(true, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn reset_requested(&self) -> bool {
        self.reset.load(Ordering::SeqCst)
    }

    pub fn config_requested(&self) -> bool {
        self.config.load(Ordering::SeqCst)
    }

    /// Exit or shutdown pending: the frame pump must take the exit path
    pub fn should_exit(&self) -> bool {
        self.exit_requested() || self.shutdown_requested()
    }

    /// Consume the reset flag, returning whether it was set
    pub fn take_reset(&self) -> bool {
        self.reset.swap(false, Ordering::SeqCst)
    }

    /// Consume the config flag, returning whether it was set
    pub fn take_config(&self) -> bool {
        self.config.swap(false, Ordering::SeqCst)
    }

    /// Clear the flags that hand control between menu and gameplay
    pub fn clear_session_flags(&self) {
        self.reset.store(false, Ordering::SeqCst);
        self.config.store(false, Ordering::SeqCst);
    }
}
