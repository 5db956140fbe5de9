use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level menu screens. Exactly one is current while the menu runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Screen {
    GameSelection,
    GameMenu,
    GameLoad,
    GameSave,
    GameSettings,
    VideoSettings,
    MappingSettings,
    CheatSettings,
    Settings,
    MenuSettings,
    FileSettings,
    Exit,
    #[default]
    None,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::GameSelection => "game selection",
            Screen::GameMenu => "game menu",
            Screen::GameLoad => "load game",
            Screen::GameSave => "save game",
            Screen::GameSettings => "game settings",
            Screen::VideoSettings => "video settings",
            Screen::MappingSettings => "button mappings",
            Screen::CheatSettings => "cheats",
            Screen::Settings => "settings",
            Screen::MenuSettings => "menu settings",
            Screen::FileSettings => "saving & loading",
            Screen::Exit => "exit",
            Screen::None => "none",
        };
        f.write_str(name)
    }
}

/// What a screen handler observed that moves navigation forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    OpenSettings,
    GameLoaded,
    FolderEntered,
    OpenSave,
    OpenLoad,
    ResetConfirmed,
    QuitToMenu,
    OpenGameSettings,
    SaveWritten,
    SaveLoaded,
    NoSavesFound,
    DeviceUnavailable,
    OpenMappings,
    OpenVideo,
    OpenCheats,
    OpenFileSettings,
    OpenMenuSettings,
    Back,
    /// Home trigger: leave the menu
    Close,
}

/// How a whole menu session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Menu closed over an active emulation session
    ResumeGame,
    /// Exit or shutdown was requested and the exit hook has run
    QuitProcess,
}

/// Next screen for `action` taken on `current`.
///
/// Pairs not listed keep the current screen.
pub fn transition(current: Screen, action: ScreenAction) -> Screen {
    use Screen as S;
    use ScreenAction as A;

    match (current, action) {
        (_, A::Close) => S::Exit,

        (S::GameSelection, A::OpenSettings) => S::Settings,
        (S::GameSelection, A::GameLoaded) => S::Exit,
        (S::GameSelection, A::FolderEntered) => S::GameSelection,

        (S::GameMenu, A::OpenSave) => S::GameSave,
        (S::GameMenu, A::OpenLoad) => S::GameLoad,
        (S::GameMenu, A::ResetConfirmed) => S::Exit,
        (S::GameMenu, A::QuitToMenu) => S::GameSelection,
        (S::GameMenu, A::OpenGameSettings) => S::GameSettings,

        (S::GameSave, A::SaveWritten) => S::GameSave,
        (S::GameLoad, A::SaveLoaded) => S::Exit,
        (S::GameLoad, A::NoSavesFound) => S::GameMenu,
        (S::GameSave | S::GameLoad, A::DeviceUnavailable | A::Back) => S::GameMenu,

        (S::GameSettings, A::OpenMappings) => S::MappingSettings,
        (S::GameSettings, A::OpenVideo) => S::VideoSettings,
        (S::GameSettings, A::OpenCheats) => S::CheatSettings,
        (S::GameSettings, A::Back) => S::GameMenu,
        (S::VideoSettings | S::MappingSettings | S::CheatSettings, A::Back) => S::GameSettings,

        (S::Settings, A::OpenFileSettings) => S::FileSettings,
        (S::Settings, A::OpenMenuSettings) => S::MenuSettings,
        (S::Settings, A::Back) => S::GameSelection,
        (S::FileSettings | S::MenuSettings, A::Back) => S::Settings,

        (screen, _) => screen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows() {
        assert_eq!(transition(Screen::GameSelection, ScreenAction::OpenSettings), Screen::Settings);
        assert_eq!(transition(Screen::GameSelection, ScreenAction::GameLoaded), Screen::Exit);
        assert_eq!(
            transition(Screen::GameSelection, ScreenAction::FolderEntered),
            Screen::GameSelection
        );
        assert_eq!(transition(Screen::GameMenu, ScreenAction::OpenSave), Screen::GameSave);
        assert_eq!(transition(Screen::GameMenu, ScreenAction::OpenLoad), Screen::GameLoad);
        assert_eq!(transition(Screen::GameMenu, ScreenAction::ResetConfirmed), Screen::Exit);
        assert_eq!(transition(Screen::GameMenu, ScreenAction::QuitToMenu), Screen::GameSelection);
        assert_eq!(transition(Screen::GameSave, ScreenAction::Back), Screen::GameMenu);
        assert_eq!(transition(Screen::GameLoad, ScreenAction::Close), Screen::Exit);
        assert_eq!(transition(Screen::Settings, ScreenAction::OpenFileSettings), Screen::FileSettings);
        assert_eq!(transition(Screen::Settings, ScreenAction::OpenMenuSettings), Screen::MenuSettings);
    }

    #[test]
    fn test_close_always_exits() {
        for screen in [
            Screen::GameSelection,
            Screen::GameMenu,
            Screen::VideoSettings,
            Screen::FileSettings,
        ] {
            assert_eq!(transition(screen, ScreenAction::Close), Screen::Exit);
        }
    }

    #[test]
    fn test_unlisted_action_stays() {
        assert_eq!(transition(Screen::Settings, ScreenAction::OpenSave), Screen::Settings);
        assert_eq!(transition(Screen::GameMenu, ScreenAction::SaveLoaded), Screen::GameMenu);
    }

    #[test]
    fn test_back_chain_reaches_game_menu() {
        let mut screen = Screen::VideoSettings;
        screen = transition(screen, ScreenAction::Back);
        assert_eq!(screen, Screen::GameSettings);
        screen = transition(screen, ScreenAction::Back);
        assert_eq!(screen, Screen::GameMenu);
    }
}
