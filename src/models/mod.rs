//! Data models for the menu front-end.
//!
//! - [`AppState`]: navigation, preferences and layering state shared through
//!   [`StateManager`](crate::state::StateManager)
//! - [`Settings`]: user preferences, persisted as `Preferences.yaml`
//! - [`MenuConfig`]: runtime tunables loaded from `Menu.yaml` and the environment
//! - [`Screen`] / [`transition`]: the screen set and its pure transition table

pub mod app_state;
pub mod config;
pub mod screen;
pub mod settings;

pub use app_state::AppState;
pub use config::{FADE_STEPS, MenuConfig};
pub use screen::{MenuOutcome, Screen, ScreenAction, transition};
pub use settings::{Cyclic, Delta, ExitAction, SettingField, SettingLimits, Settings};
