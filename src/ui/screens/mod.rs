//! Screen handlers.
//!
//! Each handler mounts its own window, blocks on the frame pump until a
//! click decides where to go, and returns the next [`Screen`] through the
//! pure [`transition`] table. Dropping the mounted window on return tears the
//! screen down, so nothing survives between invocations.

pub mod game_menu;
pub mod game_saves;
pub mod game_selection;
pub mod game_settings;
pub mod settings;

use super::builder::{BUTTON_SIZE, ROW_HEIGHT, ScreenDescriptor};
use super::context::MenuContext;
use super::error::MenuResult;
use super::input::Buttons;
use super::modal::{SettingEditor, on_screen_keyboard, setting_window};
use super::widget::Rect;
use crate::models::settings::MAX_FOLDER_LEN;
use crate::models::{Delta, Screen, ScreenAction, SettingField, transition};

pub const BACK_KEY: &str = "back";
pub const CLOSE_KEY: &str = "close";

/// Run the handler for `screen`
pub fn dispatch(ctx: &mut MenuContext, screen: Screen) -> MenuResult<Screen> {
    match screen {
        Screen::GameSelection => game_selection::run(ctx),
        Screen::GameMenu => game_menu::run(ctx),
        Screen::GameSave => game_saves::run(ctx, game_saves::SaveMode::Save),
        Screen::GameLoad => game_saves::run(ctx, game_saves::SaveMode::Load),
        Screen::GameSettings => game_settings::run(ctx),
        Screen::VideoSettings => game_settings::video(ctx),
        Screen::MappingSettings => game_settings::mappings(ctx),
        Screen::CheatSettings => game_settings::cheats(ctx),
        Screen::Settings => settings::run(ctx),
        Screen::FileSettings => settings::file(ctx),
        Screen::MenuSettings => settings::menu(ctx),
        Screen::Exit => Ok(Screen::Exit),
        Screen::None => game_selection::run(ctx),
    }
}

/// Footer with "Go Back" and a HOME-triggered "Close"
pub(crate) fn with_footer<A: Copy>(descriptor: ScreenDescriptor<A>, back: A, close: A) -> ScreenDescriptor<A> {
    let (width, height) = BUTTON_SIZE;
    descriptor
        .button(BACK_KEY, "Go Back", Rect::new(50, 410, width, height), back)
        .button_with_trigger(
            CLOSE_KEY,
            "Close",
            Rect::new(350, 410, width, height),
            Buttons::HOME,
            close,
        )
}

/// One row of an option screen
#[derive(Debug, Clone)]
pub struct OptionRow {
    pub label: String,
    pub kind: OptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Click cycles the field forward
    Cycle(SettingField),
    /// Click opens an arrow editor
    Editor(SettingEditor),
    /// Click opens the on-screen keyboard
    Text(SettingField),
}

impl OptionRow {
    pub fn new(label: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    fn field(&self) -> SettingField {
        match self.kind {
            OptionKind::Cycle(field) | OptionKind::Text(field) => field,
            OptionKind::Editor(editor) => editor.field(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionClick {
    Row(usize),
    Back,
    Close,
}

pub fn option_key(index: usize) -> String {
    format!("option-{index}")
}

pub fn value_key(index: usize) -> String {
    format!("value-{index}")
}

/// Generic label/value option list.
///
/// Every click goes through [`crate::models::Settings::adjust`] (or an editor
/// or the keyboard) and then redisplays the value. Returns on Back or Close.
pub fn run_option_screen(
    ctx: &mut MenuContext,
    current: Screen,
    title: &str,
    rows: &[OptionRow],
) -> MenuResult<Screen> {
    let limits = ctx.setting_limits();
    let settings = ctx.state.settings();

    let mut descriptor = ScreenDescriptor::new(title);
    for (i, row) in rows.iter().enumerate() {
        let y = 100 + i as i32 * ROW_HEIGHT as i32;
        descriptor = descriptor
            .button(&option_key(i), &row.label, Rect::new(50, y, 260, ROW_HEIGHT - 2), OptionClick::Row(i))
            .text(
                &value_key(i),
                settings.display(row.field(), &limits),
                Rect::new(330, y, 260, ROW_HEIGHT - 2),
            );
    }
    let screen = with_footer(descriptor, OptionClick::Back, OptionClick::Close)
        .select_first()
        .mount(&ctx.gui)?;

    loop {
        let click = ctx.wait_until(|_| Ok(screen.poll()))?;
        let index = match click {
            OptionClick::Back => return Ok(transition(current, ScreenAction::Back)),
            OptionClick::Close => return Ok(transition(current, ScreenAction::Close)),
            OptionClick::Row(index) => index,
        };

        let row = &rows[index];
        match row.kind {
            OptionKind::Cycle(field) => {
                ctx.state
                    .update_settings(|settings| settings.adjust(field, Delta::NEXT, &limits));
            }
            OptionKind::Editor(editor) => {
                setting_window(ctx, editor)?;
            }
            OptionKind::Text(field) => {
                let mut value = ctx.state.settings().display(field, &limits);
                if on_screen_keyboard(ctx, &mut value, MAX_FOLDER_LEN)? {
                    ctx.state.update_settings(|settings| {
                        if let Some(text) = settings.text_field_mut(field) {
                            *text = value;
                        }
                    });
                }
            }
        }
        let shown = ctx.state.settings().display(row.field(), &limits);
        tracing::debug!("{} -> {}", row.label, shown);
        screen.set_text(&value_key(index), shown);
    }
}
