// emumenu - menu navigation engine for a console emulator front-end
//
// This is the library crate: widget tree, frame pump, modals, progress
// overlay and the screen state machine. The binary crate (main.rs) wires it
// to console collaborators.

pub mod app;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use app::Frontend;
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AppState, MenuConfig, MenuOutcome, Screen, Settings};
pub use state::{StateChange, StateManager, SystemStatus};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
