//! Declarative screen construction.
//!
//! A screen handler describes its widgets and what each button means as a
//! [`ScreenDescriptor`]; mounting it attaches the whole window in one halt
//! bracket, and dropping the returned [`MountedScreen`] detaches it again.

use super::error::MenuResult;
use super::input::Buttons;
use super::lock::Gui;
use super::widget::{EffectKind, Rect, Widget, WidgetId, WidgetState};
use std::sync::Arc;

/// Full-screen area every screen window covers
pub const SCREEN_RECT: Rect = Rect::new(0, 0, 640, 480);

/// Standard menu button size
pub const BUTTON_SIZE: (u32, u32) = (240, 48);

/// Height of one row in option and file lists
pub const ROW_HEIGHT: u32 = 28;

pub struct ScreenDescriptor<A> {
    window: Widget,
    bindings: Vec<(WidgetId, A)>,
}

impl<A: Copy> ScreenDescriptor<A> {
    pub fn new(title: &str) -> Self {
        let window = Widget::window(SCREEN_RECT)
            .with_child(Widget::text(title).with_key("title").with_rect(Rect::new(50, 50, 540, 30)));
        Self {
            window,
            bindings: Vec::new(),
        }
    }

    pub fn with_effect(mut self, kind: EffectKind, frames: u32) -> Self {
        self.window.set_effect(kind, frames);
        self
    }

    pub fn text(mut self, key: &str, text: impl Into<String>, rect: Rect) -> Self {
        self.window.push_child(Widget::text(text).with_key(key).with_rect(rect));
        self
    }

    pub fn button(self, key: &str, label: &str, rect: Rect, action: A) -> Self {
        self.widget(Widget::button(label).with_key(key).with_rect(rect), action)
    }

    /// Button that also fires on `trigger`, e.g. HOME for Close
    pub fn button_with_trigger(self, key: &str, label: &str, rect: Rect, trigger: Buttons, action: A) -> Self {
        self.widget(
            Widget::button(label)
                .with_key(key)
                .with_rect(rect)
                .with_trigger(trigger),
            action,
        )
    }

    /// Any prebuilt button bound to `action`
    pub fn widget(mut self, button: Widget, action: A) -> Self {
        self.bindings.push((button.id(), action));
        self.window.push_child(button);
        self
    }

    /// One button per row, stacked from `top`
    pub fn list<I>(mut self, top: i32, width: u32, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String, A)>,
    {
        for (i, (key, label, action)) in rows.into_iter().enumerate() {
            let rect = Rect::new(50, top + i as i32 * ROW_HEIGHT as i32, width, ROW_HEIGHT - 2);
            self = self.button(&key, &label, rect, action);
        }
        self
    }

    /// Select the first bound button so A works without navigating first
    pub fn select_first(mut self) -> Self {
        if let Some((id, _)) = self.bindings.first() {
            let id = *id;
            if let Some(button) = self.window.find_mut(id) {
                button.state = WidgetState::Selected;
            }
        }
        self
    }

    /// Attach the window to the root inside one halt bracket
    pub fn mount(self, gui: &Arc<Gui>) -> MenuResult<MountedScreen<A>> {
        let window = self.window.id();
        let guard = gui.halt();
        guard.append_to_root(self.window)?;
        drop(guard);
        Ok(MountedScreen {
            gui: Arc::clone(gui),
            window,
            bindings: self.bindings,
        })
    }
}

/// An attached screen window; detached on drop
pub struct MountedScreen<A> {
    gui: Arc<Gui>,
    window: WidgetId,
    bindings: Vec<(WidgetId, A)>,
}

impl<A: Copy> MountedScreen<A> {
    pub fn window(&self) -> WidgetId {
        self.window
    }

    /// Action of the first clicked button, consuming the click
    pub fn poll(&self) -> Option<A> {
        self.gui.with_tree(|tree| {
            self.bindings
                .iter()
                .find_map(|(id, action)| tree.take_click(*id).then_some(*action))
        })
    }

    pub fn set_text(&self, key: &str, text: impl Into<String>) {
        let text = text.into();
        self.gui.with_tree(|tree| {
            if let Some(widget) = tree.find_key_mut(key) {
                widget.set_text(text);
            }
        });
    }

    /// Start an effect on the whole screen window
    pub fn start_effect(&self, kind: EffectKind, frames: u32) {
        self.gui.with_tree(|tree| {
            if let Some(window) = tree.find_mut(self.window) {
                window.set_effect(kind, frames);
            }
        });
    }
}

impl<A> Drop for MountedScreen<A> {
    fn drop(&mut self) {
        let guard = self.gui.halt();
        if guard.remove(self.window).is_none() {
            tracing::debug!("Screen window {} already detached", self.window);
        }
    }
}
