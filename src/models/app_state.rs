use super::screen::Screen;
use super::settings::Settings;

/// Single source of truth for menu state shared across threads.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`].
/// Never mutate it directly - use [`update()`](crate::state::StateManager::update)
/// so change events are emitted.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_screen: Screen,
    pub last_screen: Screen,

    // User preferences
    pub settings: Settings,

    // Overlay / modal layering
    pub overlay_visible: bool,
    pub modal_depth: usize,

    /// Title of the loaded game, if any
    pub game_title: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// True when the game menu is opened straight from gameplay
    pub fn entered_from_game(&self) -> bool {
        self.last_screen == Screen::None
    }

    /// True while any modal or overlay covers the current screen
    pub fn is_covered(&self) -> bool {
        self.modal_depth > 0 || self.overlay_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert_eq!(state.current_screen, Screen::None);
        assert!(state.entered_from_game());
        assert!(!state.is_covered());
    }

    #[test]
    fn test_covered_by_modal() {
        let state = AppState {
            modal_depth: 1,
            ..AppState::default()
        };
        assert!(state.is_covered());
    }
}
