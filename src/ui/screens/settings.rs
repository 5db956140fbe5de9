use super::{OptionKind, OptionRow, run_option_screen};
use crate::models::{Screen, ScreenAction, SettingField, transition};
use crate::ui::builder::{BUTTON_SIZE, ScreenDescriptor};
use crate::ui::context::MenuContext;
use crate::ui::error::MenuResult;
use crate::ui::input::Buttons;
use crate::ui::modal::window_prompt;
use crate::ui::widget::{Rect, Widget};

pub const FILE_SETTINGS_KEY: &str = "file-settings";
pub const MENU_SETTINGS_KEY: &str = "menu-settings";
pub const RESET_SETTINGS_KEY: &str = "reset-settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Click {
    File,
    Menu,
    Reset,
    Back,
    Close,
}

/// Front-end settings hub, reached from the game browser
pub fn run(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let (width, height) = BUTTON_SIZE;
    let screen = ScreenDescriptor::new("Settings")
        .button(
            FILE_SETTINGS_KEY,
            "Saving & Loading",
            Rect::new(50, 100, width, height),
            Click::File,
        )
        .button(MENU_SETTINGS_KEY, "Settings", Rect::new(350, 100, width, height), Click::Menu)
        .button(super::BACK_KEY, "Go Back", Rect::new(50, 410, width, height), Click::Back)
        .button(
            RESET_SETTINGS_KEY,
            "Reset Settings",
            Rect::new(350, 410, width, height),
            Click::Reset,
        )
        // no Close button here, HOME still leaves the menu
        .widget(
            Widget::button("")
                .with_key(super::CLOSE_KEY)
                .with_rect(Rect::new(0, 0, 0, 0))
                .with_trigger(Buttons::HOME)
                .unselectable(),
            Click::Close,
        )
        .select_first()
        .mount(&ctx.gui)?;

    let current = Screen::Settings;
    loop {
        let click = ctx.wait_until(|_| Ok(screen.poll()))?;
        match click {
            Click::File => return Ok(transition(current, ScreenAction::OpenFileSettings)),
            Click::Menu => return Ok(transition(current, ScreenAction::OpenMenuSettings)),
            Click::Back => return Ok(transition(current, ScreenAction::Back)),
            Click::Close => return Ok(transition(current, ScreenAction::Close)),
            Click::Reset => {
                let answer = window_prompt(
                    ctx,
                    "Reset Settings",
                    "Are you sure that you want to reset your settings?",
                    "Yes",
                    Some("No"),
                )?;
                if answer.is_confirmed() {
                    tracing::info!("Settings reset to defaults");
                    ctx.state.reset_settings();
                }
            }
        }
    }
}

/// "Saving & Loading"
pub fn file(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let rows = [
        OptionRow::new("Save Device", OptionKind::Cycle(SettingField::SaveDevice)),
        OptionRow::new("Save Folder", OptionKind::Text(SettingField::SaveFolder)),
        OptionRow::new("Cheats Folder", OptionKind::Text(SettingField::CheatFolder)),
        OptionRow::new("Auto Load", OptionKind::Cycle(SettingField::AutoLoad)),
        OptionRow::new("Auto Save", OptionKind::Cycle(SettingField::AutoSave)),
    ];
    run_option_screen(ctx, Screen::FileSettings, "Saving & Loading", &rows)
}

pub fn menu(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let rows = [
        OptionRow::new("Language", OptionKind::Cycle(SettingField::Language)),
        OptionRow::new("Exit Action", OptionKind::Cycle(SettingField::ExitAction)),
        OptionRow::new("CPU", OptionKind::Cycle(SettingField::Cpu)),
        OptionRow::new("GPU", OptionKind::Cycle(SettingField::Gpu)),
        OptionRow::new("Frame Limit", OptionKind::Cycle(SettingField::FrameLimit)),
        OptionRow::new("HW Filter", OptionKind::Cycle(SettingField::HwFilter)),
        OptionRow::new("SW Filter", OptionKind::Cycle(SettingField::SwFilter)),
    ];
    run_option_screen(ctx, Screen::MenuSettings, "Menu Settings", &rows)
}
