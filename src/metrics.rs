// Frame and navigation metrics
//
// Lightweight counters for the render loop and the overlay thread

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Menu runtime metrics
///
/// Uses atomic operations so the render thread and the overlay thread can
/// both record without locks. Logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Frame pump ticks
    pub ticks: AtomicU64,

    /// Frames where the widget tree was drawn
    pub frames_drawn: AtomicU64,

    /// Frames skipped because the tree was halted for mutation
    pub frames_skipped: AtomicU64,

    /// Progress overlays that became visible
    pub overlays_shown: AtomicU64,

    /// Progress requests dropped by the show policy
    pub overlays_ignored: AtomicU64,

    /// Modal dialogs opened
    pub modals_opened: AtomicU64,

    /// Screen handler invocations
    pub screen_transitions: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            frames_drawn: AtomicU64::new(0),
            frames_skipped: AtomicU64::new(0),
            overlays_shown: AtomicU64::new(0),
            overlays_ignored: AtomicU64::new(0),
            modals_opened: AtomicU64::new(0),
            screen_transitions: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one draw attempt
    pub fn record_frame(&self, drawn: bool) {
        if drawn {
            self.frames_drawn.fetch_add(1, Ordering::Relaxed);
        } else {
            self.frames_skipped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_overlay_shown(&self) {
        self.overlays_shown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_overlay_ignored(&self) {
        self.overlays_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_modal_opened(&self) {
        self.modals_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_screen_transition(&self) {
        self.screen_transitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average ticks per second since start
    pub fn tick_rate(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs > 0.0 {
            self.ticks.load(Ordering::Relaxed) as f64 / secs
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Menu Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Ticks: {} ({:.0}/s), frames drawn: {}, skipped while halted: {}",
            self.ticks.load(Ordering::Relaxed),
            self.tick_rate(),
            self.frames_drawn.load(Ordering::Relaxed),
            self.frames_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Overlays: {} shown, {} ignored; modals opened: {}; screens entered: {}",
            self.overlays_shown.load(Ordering::Relaxed),
            self.overlays_ignored.load(Ordering::Relaxed),
            self.modals_opened.load(Ordering::Relaxed),
            self.screen_transitions.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
