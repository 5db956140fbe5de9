use super::game_saves;
use crate::models::{Screen, ScreenAction, transition};
use crate::ui::builder::{BUTTON_SIZE, ScreenDescriptor};
use crate::ui::context::MenuContext;
use crate::ui::error::MenuResult;
use crate::ui::input::Buttons;
use crate::ui::modal::{error_prompt, window_prompt};
use crate::ui::widget::{EffectKind, Rect};

pub const SAVE_KEY: &str = "save";
pub const LOAD_KEY: &str = "load";
pub const RESET_KEY: &str = "reset";
pub const GAME_SETTINGS_KEY: &str = "game-settings";
pub const MAIN_MENU_KEY: &str = "main-menu";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Click {
    Save,
    Load,
    Reset,
    GameSettings,
    MainMenu,
    Close,
}

/// In-game menu shown over the paused game
pub fn run(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let from_game = ctx.state.read(|s| s.entered_from_game());
    let title = ctx.emulator.game_title().unwrap_or_else(|| "Game Menu".to_string());
    let (width, height) = BUTTON_SIZE;

    let mut descriptor = ScreenDescriptor::new(&title)
        .button(SAVE_KEY, "Save Game", Rect::new(50, 100, width, height), Click::Save)
        .button(LOAD_KEY, "Load Game", Rect::new(350, 100, width, height), Click::Load)
        .button(RESET_KEY, "Reset Game", Rect::new(50, 180, width, height), Click::Reset)
        .button(
            GAME_SETTINGS_KEY,
            "Game Settings",
            Rect::new(350, 180, width, height),
            Click::GameSettings,
        )
        .button(MAIN_MENU_KEY, "Main Menu", Rect::new(50, 410, width, height), Click::MainMenu)
        .button_with_trigger(
            super::CLOSE_KEY,
            "Close",
            Rect::new(350, 410, width, height),
            Buttons::HOME,
            Click::Close,
        )
        .select_first();
    if from_game {
        descriptor = descriptor.with_effect(EffectKind::SlideFromTop, ctx.effect_frames());
    }
    let screen = descriptor.mount(&ctx.gui)?;

    if from_game {
        ctx.drain_effects(screen.window())?;
        game_saves::auto_save(ctx)?;
    }

    loop {
        let click = ctx.wait_until(|_| Ok(screen.poll()))?;
        match click {
            Click::Save => return Ok(transition(Screen::GameMenu, ScreenAction::OpenSave)),
            Click::Load => return Ok(transition(Screen::GameMenu, ScreenAction::OpenLoad)),
            Click::GameSettings => return Ok(transition(Screen::GameMenu, ScreenAction::OpenGameSettings)),
            Click::Reset => {
                let answer = window_prompt(
                    ctx,
                    "Reset Game",
                    "Are you sure that you want to reset the game?",
                    "Yes",
                    Some("No"),
                )?;
                if !answer.is_confirmed() {
                    continue;
                }
                match ctx.emulator.reset() {
                    Ok(()) => {
                        tracing::info!("Game reset");
                        return Ok(transition(Screen::GameMenu, ScreenAction::ResetConfirmed));
                    }
                    Err(e) => {
                        tracing::error!("Reset failed: {:#}", e);
                        error_prompt(ctx, &format!("Unable to reset the game: {e:#}"))?;
                    }
                }
            }
            Click::MainMenu => {
                let answer = window_prompt(
                    ctx,
                    "Quit Game",
                    "Quit this game? Any unsaved progress will be lost.",
                    "Yes",
                    Some("No"),
                )?;
                if answer.is_confirmed() {
                    tracing::info!("Quitting to the game browser");
                    ctx.emulator.unload();
                    ctx.state.set_game_title(None);
                    return Ok(transition(Screen::GameMenu, ScreenAction::QuitToMenu));
                }
            }
            Click::Close => {
                screen.start_effect(EffectKind::SlideToTop, ctx.effect_frames());
                ctx.drain_effects(screen.window())?;
                return Ok(transition(Screen::GameMenu, ScreenAction::Close));
            }
        }
    }
}
