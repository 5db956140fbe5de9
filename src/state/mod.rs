// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for observers (logging, tests, frontends).

pub mod status;

pub use status::SystemStatus;

use crate::models::{AppState, Screen, Settings};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Navigation moved to another screen
    ScreenChanged { from: Screen, to: Screen },

    /// A settings field was edited
    SettingsChanged,

    /// The progress overlay attached or retired
    OverlayChanged { visible: bool },

    /// A modal dialog was attached over the current screen
    ModalOpened { depth: usize },

    /// A modal dialog was detached
    ModalClosed { depth: usize },

    /// A game was loaded or unloaded
    GameChanged { title: Option<String> },

    /// Settings were restored to defaults
    SettingsReset,
}

/// Thread-safe state manager with event emission
///
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// Both the render thread and the overlay thread hold clones; all of them
/// see the same state and the same channel.
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a StateManager seeded with loaded preferences
    pub fn with_settings(settings: Settings) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::new(settings))),
            state_tx,
        }
    }

    // A panicking writer cannot leave AppState half-updated in a way readers care about
    fn read_guard(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Get a cloned snapshot of the current state
    pub fn snapshot(&self) -> AppState {
        self.read_guard().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let screen = state_manager.read(|state| state.current_screen);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.read_guard();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.write_guard();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.current_screen != new.current_screen {
            changes.push(StateChange::ScreenChanged {
                from: old.current_screen,
                to: new.current_screen,
            });
        }

        if old.settings != new.settings {
            changes.push(StateChange::SettingsChanged);
        }

        if old.overlay_visible != new.overlay_visible {
            changes.push(StateChange::OverlayChanged {
                visible: new.overlay_visible,
            });
        }

        if new.modal_depth > old.modal_depth {
            changes.push(StateChange::ModalOpened {
                depth: new.modal_depth,
            });
        } else if new.modal_depth < old.modal_depth {
            changes.push(StateChange::ModalClosed {
                depth: new.modal_depth,
            });
        }

        if old.game_title != new.game_title {
            changes.push(StateChange::GameChanged {
                title: new.game_title.clone(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Make `screen` current, remembering the previous one
    pub fn enter_screen(&self, screen: Screen) -> Vec<StateChange> {
        self.update(|state| {
            state.last_screen = state.current_screen;
            state.current_screen = screen;
        })
    }

    /// Forget navigation history, as when the menu closes over gameplay
    pub fn leave_menu(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.last_screen = Screen::None;
            state.current_screen = Screen::None;
        })
    }

    pub fn current_screen(&self) -> Screen {
        self.read(|state| state.current_screen)
    }

    pub fn set_overlay_visible(&self, visible: bool) -> Vec<StateChange> {
        self.update(|state| state.overlay_visible = visible)
    }

    pub fn modal_opened(&self) -> Vec<StateChange> {
        self.update(|state| state.modal_depth += 1)
    }

    pub fn modal_closed(&self) -> Vec<StateChange> {
        self.update(|state| state.modal_depth = state.modal_depth.saturating_sub(1))
    }

    pub fn set_game_title(&self, title: Option<String>) -> Vec<StateChange> {
        self.update(|state| state.game_title = title)
    }

    /// Current preferences
    pub fn settings(&self) -> Settings {
        self.read(|state| state.settings.clone())
    }

    /// Mutate preferences in place
    pub fn update_settings<F>(&self, settings_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut Settings),
    {
        self.update(|state| settings_fn(&mut state.settings))
    }

    /// Replace preferences wholesale (used to undo a cancelled editor)
    pub fn replace_settings(&self, settings: Settings) -> Vec<StateChange> {
        self.update(|state| state.settings = settings)
    }

    /// Restore default preferences
    pub fn reset_settings(&self) -> Vec<StateChange> {
        let mut changes = self.replace_settings(Settings::default());

        let reset_event = StateChange::SettingsReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
