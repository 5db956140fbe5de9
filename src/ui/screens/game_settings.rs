use super::{OptionKind, OptionRow, run_option_screen, with_footer};
use crate::models::settings::EMULATED_BUTTONS;
use crate::models::{Screen, ScreenAction, SettingField, transition};
use crate::ui::builder::{BUTTON_SIZE, ScreenDescriptor};
use crate::ui::context::MenuContext;
use crate::ui::error::MenuResult;
use crate::ui::modal::{SettingEditor, error_prompt, info_prompt, setting_window};
use crate::ui::widget::Rect;

pub const MAPPINGS_KEY: &str = "mappings";
pub const VIDEO_KEY: &str = "video";
pub const CHEATS_KEY: &str = "cheats";
pub const CONTROLLER_KEY: &str = "controller";

pub fn cheat_key(index: usize) -> String {
    format!("cheat-{index}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Click {
    Mappings,
    Video,
    Cheats,
    Controller,
    Back,
    Close,
}

/// Per-game settings hub
pub fn run(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let (width, height) = BUTTON_SIZE;
    let descriptor = ScreenDescriptor::new("Game Settings")
        .button(MAPPINGS_KEY, "Button Mappings", Rect::new(50, 100, width, height), Click::Mappings)
        .button(VIDEO_KEY, "Video", Rect::new(350, 100, width, height), Click::Video)
        .button(CHEATS_KEY, "Cheats", Rect::new(50, 180, width, height), Click::Cheats)
        .button(CONTROLLER_KEY, "Controller", Rect::new(350, 180, width, height), Click::Controller);
    let screen = with_footer(descriptor, Click::Back, Click::Close)
        .select_first()
        .mount(&ctx.gui)?;

    let current = Screen::GameSettings;
    loop {
        let click = ctx.wait_until(|_| Ok(screen.poll()))?;
        match click {
            Click::Mappings => return Ok(transition(current, ScreenAction::OpenMappings)),
            Click::Video => return Ok(transition(current, ScreenAction::OpenVideo)),
            Click::Cheats => {
                if ctx.emulator.cheats().is_empty() {
                    info_prompt(ctx, "Cheats file not found!")?;
                } else {
                    return Ok(transition(current, ScreenAction::OpenCheats));
                }
            }
            Click::Controller => {
                setting_window(ctx, SettingEditor::Controller)?;
            }
            Click::Back => return Ok(transition(current, ScreenAction::Back)),
            Click::Close => return Ok(transition(current, ScreenAction::Close)),
        }
    }
}

pub fn video(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let rows = [
        OptionRow::new("Render", OptionKind::Cycle(SettingField::Render)),
        OptionRow::new("Widescreen", OptionKind::Cycle(SettingField::Widescreen)),
        OptionRow::new("Filter Method", OptionKind::Cycle(SettingField::FilterMethod)),
        OptionRow::new("Screen Zoom", OptionKind::Editor(SettingEditor::ScreenZoom)),
        OptionRow::new("Screen Position", OptionKind::Editor(SettingEditor::ScreenPosition)),
        OptionRow::new("Crosshair", OptionKind::Cycle(SettingField::Crosshair)),
        OptionRow::new("Video Mode", OptionKind::Cycle(SettingField::VideoMode)),
    ];
    run_option_screen(ctx, Screen::VideoSettings, "Video Settings", &rows)
}

/// One row per emulated button, plus the controller type
pub fn mappings(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let mut rows: Vec<OptionRow> = EMULATED_BUTTONS
        .iter()
        .enumerate()
        .map(|(i, name)| OptionRow::new(*name, OptionKind::Cycle(SettingField::Mapping(i))))
        .collect();
    rows.push(OptionRow::new("Controller", OptionKind::Editor(SettingEditor::Controller)));
    run_option_screen(ctx, Screen::MappingSettings, "Button Mappings", &rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheatClick {
    Toggle(usize),
    Back,
    Close,
}

fn cheat_label(name: &str, enabled: bool) -> String {
    format!("{} [{}]", name, if enabled { "On" } else { "Off" })
}

/// Cheat list; each click toggles one cheat on the core
pub fn cheats(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let mut cheats = ctx.emulator.cheats();
    let rows = cheats
        .iter()
        .enumerate()
        .map(|(i, cheat)| (cheat_key(i), cheat_label(&cheat.name, cheat.enabled), CheatClick::Toggle(i)));
    let descriptor = ScreenDescriptor::new("Cheats").list(100, 540, rows);
    let screen = with_footer(descriptor, CheatClick::Back, CheatClick::Close)
        .select_first()
        .mount(&ctx.gui)?;

    let current = Screen::CheatSettings;
    loop {
        let click = ctx.wait_until(|_| Ok(screen.poll()))?;
        let index = match click {
            CheatClick::Back => return Ok(transition(current, ScreenAction::Back)),
            CheatClick::Close => return Ok(transition(current, ScreenAction::Close)),
            CheatClick::Toggle(index) => index,
        };

        let cheat = &mut cheats[index];
        let enabled = !cheat.enabled;
        match ctx.emulator.set_cheat_enabled(index, enabled) {
            Ok(()) => {
                cheat.enabled = enabled;
                tracing::info!("Cheat '{}' {}", cheat.name, if enabled { "enabled" } else { "disabled" });
                screen.set_text(&cheat_key(index), cheat_label(&cheat.name, enabled));
            }
            Err(e) => {
                tracing::error!("Failed to toggle cheat '{}': {:#}", cheat.name, e);
                error_prompt(ctx, &format!("Unable to change cheat: {e:#}"))?;
            }
        }
    }
}
