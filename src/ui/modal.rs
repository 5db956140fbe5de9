//! Blocking modal dialogs.
//!
//! Every modal follows the same shape: a [`ModalSession`] disables the root,
//! attaches the dialog and focuses it; the caller spins on the frame pump
//! until a terminal button is clicked; the session slides the dialog out and
//! restores the root. An exit request needs no special handling here: the
//! pump's exit path surfaces as `Err(Shutdown)` and the session's `Drop`
//! detaches the dialog.

use super::context::MenuContext;
use super::error::{MenuError, MenuResult};
use super::input::Buttons;
use super::lock::Gui;
use super::widget::{EffectKind, Rect, Widget, WidgetId, WidgetState};
use crate::models::{Delta, SettingField};
use crate::state::StateManager;
use std::sync::Arc;

pub const PROMPT_KEY: &str = "prompt";
pub const CONFIRM_KEY: &str = "prompt-confirm";
pub const CANCEL_KEY: &str = "prompt-cancel";
pub const KEYBOARD_KEY: &str = "keyboard";
pub const KEYBOARD_TEXT_KEY: &str = "keyboard-text";
pub const SETTING_KEY: &str = "setting-window";
pub const SETTING_VALUE_KEY: &str = "setting-value";

/// How a two-button dialog resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    Cancelled = 0,
    Confirmed = 1,
}

impl ModalOutcome {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_confirmed(self) -> bool {
        self == ModalOutcome::Confirmed
    }
}

/// A dialog attached over the current screen.
///
/// Opening disables the root and moves focus to the dialog; closing (or
/// dropping) detaches it and restores both.
pub struct ModalSession {
    gui: Arc<Gui>,
    state: StateManager,
    modal: WidgetId,
    previous_state: WidgetState,
    previous_focus: Option<WidgetId>,
    closed: bool,
}

impl ModalSession {
    pub fn open(ctx: &MenuContext, window: Widget) -> MenuResult<Self> {
        // at most one layer above the screen: retire any progress overlay first
        ctx.progress.cancel_action();

        let modal = window.id();
        let guard = ctx.gui.halt();
        let (previous_state, previous_focus) = guard.edit(|tree| {
            let previous_state = tree.set_root_state(WidgetState::Disabled)?;
            tree.append_to_root(window)?;
            let previous_focus = tree.change_focus(Some(modal))?;
            Ok::<_, MenuError>((previous_state, previous_focus))
        })?;
        drop(guard);

        ctx.state.modal_opened();
        ctx.metrics.record_modal_opened();
        tracing::debug!("Modal {} opened", modal);

        Ok(Self {
            gui: Arc::clone(&ctx.gui),
            state: ctx.state.clone(),
            modal,
            previous_state,
            previous_focus,
            closed: false,
        })
    }

    pub fn id(&self) -> WidgetId {
        self.modal
    }

    /// Play `effect` on the dialog, drain it, then detach. The dialog takes
    /// no input while it leaves.
    pub fn finish(mut self, ctx: &mut MenuContext, effect: EffectKind) -> MenuResult<()> {
        let frames = ctx.effect_frames();
        ctx.gui.with_tree(|tree| {
            if let Some(window) = tree.find_mut(self.modal) {
                window.state = WidgetState::Disabled;
                window.set_effect(effect, frames);
            }
        });
        ctx.drain_effects(self.modal)?;
        self.detach();
        Ok(())
    }

    pub fn close(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let guard = self.gui.halt();
        guard.edit(|tree| {
            tree.remove(self.modal);
            let _ = tree.set_root_state(self.previous_state);
            let _ = tree.change_focus(self.previous_focus);
        });
        drop(guard);

        self.state.modal_closed();
        tracing::debug!("Modal {} closed", self.modal);
    }
}

impl Drop for ModalSession {
    fn drop(&mut self) {
        self.detach();
    }
}

fn dialog_frame(key: &str, title: &str, rect: Rect) -> Widget {
    Widget::window(rect)
        .with_key(key)
        .with_child(Widget::image("dialogue_box").with_rect(Rect::new(0, 0, rect.width, rect.height)))
        .with_child(Widget::text(title).with_rect(Rect::new(0, 14, rect.width, 30)))
}

/// Confirmation dialog with one or two buttons.
///
/// Returns [`ModalOutcome::Confirmed`] only once `confirm` is clicked and
/// [`ModalOutcome::Cancelled`] only once `cancel` is clicked. Without a root
/// window, or while an exit is pending, nothing is shown and the result is
/// `Cancelled`.
pub fn window_prompt(
    ctx: &mut MenuContext,
    title: &str,
    message: &str,
    confirm: &str,
    cancel: Option<&str>,
) -> MenuResult<ModalOutcome> {
    if !ctx.gui.has_root() {
        tracing::warn!("Prompt '{}' skipped: no root window", title);
        return Ok(ModalOutcome::Cancelled);
    }
    if ctx.status.should_exit() {
        return Ok(ModalOutcome::Cancelled);
    }

    let rect = Rect::new(96, 96, 448, 288);
    let mut confirm_button = Widget::button(confirm).with_key(CONFIRM_KEY);
    let cancel_button = cancel.map(|label| {
        Widget::button(label)
            .with_key(CANCEL_KEY)
            .with_rect(Rect::new(260, 215, 168, 48))
            .with_trigger(Buttons::B)
            .selected()
    });
    confirm_button = if cancel_button.is_some() {
        confirm_button.with_rect(Rect::new(20, 215, 168, 48))
    } else {
        confirm_button
            .with_rect(Rect::new(140, 215, 168, 48))
            .with_trigger(Buttons::B)
            .selected()
    };
    let confirm_id = confirm_button.id();
    let cancel_id = cancel_button.as_ref().map(Widget::id);

    let mut window = dialog_frame(PROMPT_KEY, title, rect)
        .with_child(Widget::text(message).with_rect(Rect::new(24, 70, 400, 120)))
        .with_child(confirm_button)
        .with_effect(EffectKind::SlideFromTop, ctx.effect_frames());
    if let Some(button) = cancel_button {
        window = window.with_child(button);
    }

    tracing::info!("Prompt: {} - {}", title, message);
    let session = ModalSession::open(ctx, window)?;
    let outcome = ctx.wait_until(|ctx| {
        Ok(ctx.gui.with_tree(|tree| {
            if tree.take_click(confirm_id) {
                Some(ModalOutcome::Confirmed)
            } else if cancel_id.is_some_and(|id| tree.take_click(id)) {
                Some(ModalOutcome::Cancelled)
            } else {
                None
            }
        }))
    })?;
    session.finish(ctx, EffectKind::SlideToTop)?;

    tracing::info!("Prompt '{}' resolved: {:?}", title, outcome);
    Ok(outcome)
}

pub fn error_prompt(ctx: &mut MenuContext, message: &str) -> MenuResult<()> {
    window_prompt(ctx, "Error", message, "OK", None).map(|_| ())
}

/// Error with a retry option; true when the user chose Retry
pub fn error_prompt_retry(ctx: &mut MenuContext, message: &str) -> MenuResult<bool> {
    window_prompt(ctx, "Error", message, "Retry", Some("Cancel")).map(ModalOutcome::is_confirmed)
}

pub fn info_prompt(ctx: &mut MenuContext, message: &str) -> MenuResult<()> {
    window_prompt(ctx, "Information", message, "OK", None).map(|_| ())
}

/// Lowercase key rows; shift maps letters to uppercase
const KEY_ROWS: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl-", "zxcvbnm./_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Char(char),
    Shift,
    Space,
    Backspace,
    Ok,
    Cancel,
}

fn key_label(c: char, shift: bool) -> String {
    if shift {
        c.to_ascii_uppercase().to_string()
    } else {
        c.to_string()
    }
}

/// On-screen keyboard editing `value` up to `max_len` characters.
///
/// Edits are committed only on OK; returns whether they were.
pub fn on_screen_keyboard(ctx: &mut MenuContext, value: &mut String, max_len: usize) -> MenuResult<bool> {
    let mut keys: Vec<(WidgetId, KeyAction)> = Vec::new();
    let mut window = dialog_frame(KEYBOARD_KEY, "", Rect::new(20, 60, 600, 360)).with_child(
        Widget::text(value.as_str())
            .with_key(KEYBOARD_TEXT_KEY)
            .with_rect(Rect::new(20, 14, 560, 30)),
    );

    let mut add = |window: Widget, button: Widget, action: KeyAction| {
        keys.push((button.id(), action));
        window.with_child(button)
    };

    for (row, chars) in KEY_ROWS.iter().enumerate() {
        for (col, c) in chars.chars().enumerate() {
            let rect = Rect::new(20 + col as i32 * 56, 56 + row as i32 * 46, 52, 40);
            let button = Widget::button(key_label(c, false))
                .with_key(format!("key-{c}"))
                .with_rect(rect);
            window = add(window, button, KeyAction::Char(c));
        }
    }
    let specials = [
        ("key-shift", "Shift", Rect::new(20, 244, 120, 40), KeyAction::Shift),
        ("key-space", "Space", Rect::new(150, 244, 260, 40), KeyAction::Space),
        ("key-backspace", "Backspace", Rect::new(420, 244, 160, 40), KeyAction::Backspace),
        ("key-ok", "OK", Rect::new(120, 300, 160, 44), KeyAction::Ok),
        ("key-cancel", "Cancel", Rect::new(320, 300, 160, 44), KeyAction::Cancel),
    ];
    for (key, label, rect, action) in specials {
        let mut button = Widget::button(label).with_key(key).with_rect(rect);
        if action == KeyAction::Cancel {
            button = button.with_trigger(Buttons::B);
        }
        window = add(window, button, action);
    }
    drop(add);

    let session = ModalSession::open(ctx, window)?;
    let mut buffer = value.clone();
    let mut shift = false;

    let committed = ctx.wait_until(|ctx| {
        let clicked = ctx.gui.with_tree(|tree| {
            keys.iter()
                .find_map(|(id, action)| tree.take_click(*id).then_some(*action))
        });
        let Some(action) = clicked else {
            return Ok(None);
        };

        match action {
            KeyAction::Char(c) if buffer.chars().count() < max_len => {
                buffer.push(if shift { c.to_ascii_uppercase() } else { c });
            }
            KeyAction::Char(_) => {}
            KeyAction::Space if buffer.chars().count() < max_len => buffer.push(' '),
            KeyAction::Space => {}
            KeyAction::Backspace => {
                buffer.pop();
            }
            KeyAction::Shift => {
                shift = !shift;
                ctx.gui.with_tree(|tree| {
                    for (id, action) in &keys {
                        if let KeyAction::Char(c) = action {
                            tree.set_text(*id, key_label(*c, shift));
                        }
                    }
                });
            }
            KeyAction::Ok => return Ok(Some(true)),
            KeyAction::Cancel => return Ok(Some(false)),
        }
        ctx.gui.with_tree(|tree| {
            if let Some(text) = tree.find_key_mut(KEYBOARD_TEXT_KEY) {
                text.set_text(buffer.as_str());
            }
        });
        Ok(None)
    })?;
    session.close();

    if committed {
        tracing::info!("Keyboard input committed ({} chars)", buffer.chars().count());
        *value = buffer;
    }
    Ok(committed)
}

/// Settings that get their own arrow-driven editor window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingEditor {
    Controller,
    ScreenZoom,
    ScreenPosition,
}

impl SettingEditor {
    pub fn title(self) -> &'static str {
        match self {
            SettingEditor::Controller => "Controller",
            SettingEditor::ScreenZoom => "Screen Zoom",
            SettingEditor::ScreenPosition => "Screen Position",
        }
    }

    pub fn field(self) -> SettingField {
        match self {
            SettingEditor::Controller => SettingField::Controller,
            SettingEditor::ScreenZoom => SettingField::ScreenZoom,
            SettingEditor::ScreenPosition => SettingField::ScreenPosition,
        }
    }

    /// Delta for each arrow; vertical arrows only on two-axis editors
    fn arrows(self) -> Vec<(&'static str, Buttons, Delta, Rect)> {
        let mut arrows = vec![
            ("arrow-left", Buttons::LEFT, Delta::x(-1), Rect::new(40, 100, 40, 40)),
            ("arrow-right", Buttons::RIGHT, Delta::x(1), Rect::new(368, 100, 40, 40)),
        ];
        let vertical = match self {
            SettingEditor::Controller => None,
            // zoom grows upwards, position follows screen coordinates
            SettingEditor::ScreenZoom => Some((Delta::y(1), Delta::y(-1))),
            SettingEditor::ScreenPosition => Some((Delta::y(-1), Delta::y(1))),
        };
        if let Some((up, down)) = vertical {
            arrows.push(("arrow-up", Buttons::UP, up, Rect::new(204, 50, 40, 40)));
            arrows.push(("arrow-down", Buttons::DOWN, down, Rect::new(204, 150, 40, 40)));
        }
        arrows
    }
}

enum EditorClick {
    Done(ModalOutcome),
    Adjust(Delta),
}

/// Arrow-driven editor for one setting.
///
/// Each arrow click applies its delta through [`crate::models::Settings::adjust`]
/// and redisplays the value. Cancel restores the settings as they were
/// when the window opened.
pub fn setting_window(ctx: &mut MenuContext, editor: SettingEditor) -> MenuResult<ModalOutcome> {
    let field = editor.field();
    let limits = ctx.setting_limits();
    let snapshot = ctx.state.settings();

    let ok = Widget::button("OK")
        .with_key(CONFIRM_KEY)
        .with_rect(Rect::new(20, 215, 168, 48))
        .selected();
    let cancel = Widget::button("Cancel")
        .with_key(CANCEL_KEY)
        .with_rect(Rect::new(260, 215, 168, 48))
        .with_trigger(Buttons::B);
    let (ok_id, cancel_id) = (ok.id(), cancel.id());

    let mut arrows = Vec::new();
    let mut window = dialog_frame(SETTING_KEY, editor.title(), Rect::new(96, 96, 448, 288))
        .with_child(
            Widget::text(snapshot.display(field, &limits))
                .with_key(SETTING_VALUE_KEY)
                .with_rect(Rect::new(90, 100, 268, 40)),
        )
        .with_child(ok)
        .with_child(cancel);
    for (key, trigger, delta, rect) in editor.arrows() {
        let arrow = Widget::button("")
            .with_key(key)
            .with_rect(rect)
            .with_trigger(trigger)
            .unselectable();
        arrows.push((arrow.id(), delta));
        window = window.with_child(arrow);
    }

    let session = ModalSession::open(ctx, window)?;
    let outcome = ctx.wait_until(|ctx| {
        let clicked = ctx.gui.with_tree(|tree| {
            if tree.take_click(ok_id) {
                Some(EditorClick::Done(ModalOutcome::Confirmed))
            } else if tree.take_click(cancel_id) {
                Some(EditorClick::Done(ModalOutcome::Cancelled))
            } else {
                arrows
                    .iter()
                    .find_map(|(id, delta)| tree.take_click(*id).then_some(EditorClick::Adjust(*delta)))
            }
        });
        match clicked {
            Some(EditorClick::Done(outcome)) => Ok(Some(outcome)),
            Some(EditorClick::Adjust(delta)) => {
                ctx.state.update_settings(|settings| settings.adjust(field, delta, &limits));
                let text = ctx.state.settings().display(field, &limits);
                ctx.gui.with_tree(|tree| {
                    if let Some(value) = tree.find_key_mut(SETTING_VALUE_KEY) {
                        value.set_text(text);
                    }
                });
                Ok(None)
            }
            None => Ok(None),
        }
    })?;
    session.close();

    if outcome == ModalOutcome::Cancelled {
        tracing::info!("{} edit cancelled, restoring previous value", editor.title());
        ctx.state.replace_settings(snapshot);
    }
    Ok(outcome)
}
