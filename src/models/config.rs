use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of alpha steps in the exit fade. Fixed: the exit path always
/// produces exactly this many frames before the process-control hook runs.
pub const FADE_STEPS: usize = 16;

/// Menu runtime tunables from `Menu.yaml` and `EMUMENU_*` environment variables
///
/// Timings are stored in microseconds so the file stays a flat list of integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Sleep between two frame-pump ticks in every blocking loop
    pub tick_interval_us: u64,

    /// Time a progress request must stay uncancelled before its overlay attaches
    pub overlay_grace_us: u64,

    /// Overlay animation/bar refresh period
    pub overlay_refresh_us: u64,

    /// Determinate requests with a smaller total are ignored
    pub min_progress_total: u64,

    /// Length in ticks of slide/fade transition effects
    pub effect_frames: u32,

    pub log_dir: String,
    pub log_prefix: String,
    pub debug_mode: bool,
    pub console_log: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 100,
            overlay_grace_us: 400_000,
            overlay_refresh_us: 20_000,
            min_progress_total: 256 * 1024,
            effect_frames: 20,
            log_dir: "logs".to_string(),
            log_prefix: "emumenu".to_string(),
            debug_mode: false,
            console_log: true,
        }
    }
}

impl MenuConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(self.tick_interval_us)
    }

    pub fn overlay_grace(&self) -> Duration {
        Duration::from_micros(self.overlay_grace_us)
    }

    pub fn overlay_refresh(&self) -> Duration {
        Duration::from_micros(self.overlay_refresh_us)
    }
}
