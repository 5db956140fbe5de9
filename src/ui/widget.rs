//! Retained widget tree.
//!
//! A [`WidgetTree`] owns a single root window. Every widget exclusively owns
//! its children (kept in insertion order); detaching a widget hands ownership
//! back to the caller. Structural edits are only reachable through a
//! [`HaltGuard`](super::lock::HaltGuard), which keeps them off the draw path.

use super::error::{MenuError, MenuResult};
use super::input::{Buttons, InputSnapshot, Pointer};
use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique widget identifier, assigned at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    fn next() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Default,
    Selected,
    Clicked,
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Window,
    Text { text: String },
    Image { asset: String, alpha: u8 },
    Button { label: String },
    ProgressBar { fill: f32 },
    Throbber { angle: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    SlideFromTop,
    SlideFromBottom,
    SlideToTop,
    SlideToBottom,
    FadeIn,
    FadeOut,
}

/// A running transition; `remaining` counts down one per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub kind: EffectKind,
    pub remaining: u32,
}

/// Position relative to the parent widget, size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Pointer) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width as i32
            && point.y < self.y + self.height as i32
    }

    fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    fn center(&self) -> Pointer {
        Pointer {
            x: self.x + self.width as i32 / 2,
            y: self.y + self.height as i32 / 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    pub key: Option<String>,
    pub kind: WidgetKind,
    pub state: WidgetState,
    pub rect: Rect,
    /// Reachable by directional navigation and by the A button
    pub selectable: bool,
    /// Buttons that click this widget regardless of selection
    pub triggers: Buttons,
    pub tooltip: Option<String>,
    pub effect: Option<Effect>,
    children: IndexMap<WidgetId, Widget>,
    focus: Option<WidgetId>,
}

impl Widget {
    fn new(kind: WidgetKind) -> Self {
        Self {
            id: WidgetId::next(),
            key: None,
            kind,
            state: WidgetState::Default,
            rect: Rect::default(),
            selectable: false,
            triggers: Buttons::NONE,
            tooltip: None,
            effect: None,
            children: IndexMap::new(),
            focus: None,
        }
    }

    pub fn window(rect: Rect) -> Self {
        Self::new(WidgetKind::Window).with_rect(rect)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Text { text: text.into() })
    }

    pub fn image(asset: impl Into<String>) -> Self {
        Self::new(WidgetKind::Image {
            asset: asset.into(),
            alpha: 255,
        })
    }

    pub fn button(label: impl Into<String>) -> Self {
        let mut button = Self::new(WidgetKind::Button {
            label: label.into(),
        });
        button.selectable = true;
        button
    }

    pub fn progress_bar() -> Self {
        Self::new(WidgetKind::ProgressBar { fill: 0.0 })
    }

    pub fn throbber() -> Self {
        Self::new(WidgetKind::Throbber { angle: 0 })
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_trigger(mut self, trigger: Buttons) -> Self {
        self.triggers |= trigger;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_alpha(mut self, value: u8) -> Self {
        if let WidgetKind::Image { alpha, .. } = &mut self.kind {
            *alpha = value;
        }
        self
    }

    /// Trigger-only button, skipped by directional navigation
    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    pub fn selected(mut self) -> Self {
        self.state = WidgetState::Selected;
        self
    }

    pub fn with_effect(mut self, kind: EffectKind, frames: u32) -> Self {
        self.set_effect(kind, frames);
        self
    }

    pub fn with_child(mut self, child: Widget) -> Self {
        self.push_child(child);
        self
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn children(&self) -> impl Iterator<Item = &Widget> {
        self.children.values()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn focus(&self) -> Option<WidgetId> {
        self.focus
    }

    pub fn is_clicked(&self) -> bool {
        self.state == WidgetState::Clicked
    }

    pub fn is_disabled(&self) -> bool {
        self.state == WidgetState::Disabled
    }

    /// Acknowledge a click; a selectable widget stays under the cursor
    pub fn reset_state(&mut self) {
        if self.state == WidgetState::Clicked {
            self.state = if self.selectable {
                WidgetState::Selected
            } else {
                WidgetState::Default
            };
        }
    }

    /// Replace the visible text of a Text or Button widget
    pub fn set_text(&mut self, value: impl Into<String>) {
        match &mut self.kind {
            WidgetKind::Text { text } => *text = value.into(),
            WidgetKind::Button { label } => *label = value.into(),
            _ => {}
        }
    }

    /// Visible text of a Text or Button widget
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            WidgetKind::Text { text } => Some(text),
            WidgetKind::Button { label } => Some(label),
            _ => None,
        }
    }

    pub fn set_effect(&mut self, kind: EffectKind, frames: u32) {
        self.effect = (frames > 0).then_some(Effect {
            kind,
            remaining: frames,
        });
    }

    pub(crate) fn push_child(&mut self, child: Widget) -> WidgetId {
        let id = child.id;
        self.children.insert(id, child);
        id
    }

    pub(crate) fn insert_child(&mut self, index: usize, child: Widget) -> WidgetId {
        let id = child.id;
        let index = index.min(self.children.len());
        self.children.shift_insert(index, id, child);
        id
    }

    /// Detach a descendant anywhere below this widget
    pub(crate) fn remove_descendant(&mut self, id: WidgetId) -> Option<Widget> {
        if let Some(child) = self.children.shift_remove(&id) {
            if self.focus == Some(id) {
                self.focus = None;
            }
            return Some(child);
        }
        self.children
            .values_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    pub fn find(&self, id: WidgetId) -> Option<&Widget> {
        if self.id == id {
            return Some(self);
        }
        self.children.values().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        if self.id == id {
            return Some(self);
        }
        self.children.values_mut().find_map(|child| child.find_mut(id))
    }

    pub fn find_key(&self, key: &str) -> Option<&Widget> {
        if self.key() == Some(key) {
            return Some(self);
        }
        self.children.values().find_map(|child| child.find_key(key))
    }

    pub fn find_key_mut(&mut self, key: &str) -> Option<&mut Widget> {
        if self.key() == Some(key) {
            return Some(self);
        }
        self.children
            .values_mut()
            .find_map(|child| child.find_key_mut(key))
    }

    fn count_where(&self, pred: &dyn Fn(&Widget) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self
            .children
            .values()
            .map(|child| child.count_where(pred))
            .sum::<usize>()
    }

    fn step_effects(&mut self) {
        if let Some(effect) = &mut self.effect {
            effect.remaining = effect.remaining.saturating_sub(1);
            if effect.remaining == 0 {
                self.effect = None;
            }
        }
        for child in self.children.values_mut() {
            child.step_effects();
        }
    }

    fn effect_remaining(&self) -> u32 {
        let own = self.effect.map_or(0, |e| e.remaining);
        self.children
            .values()
            .map(Widget::effect_remaining)
            .fold(own, u32::max)
    }

    /// Enabled, interactive buttons below this widget with absolute rects,
    /// in depth-first order
    fn collect_targets(&self, origin: (i32, i32), out: &mut Vec<(WidgetId, Rect)>) {
        for child in self.children.values() {
            if child.is_disabled() {
                continue;
            }
            let abs = child.rect.offset(origin.0, origin.1);
            if matches!(child.kind, WidgetKind::Button { .. }) {
                out.push((child.id, abs));
            }
            child.collect_targets((abs.x, abs.y), out);
        }
    }

    fn absolute_rect(&self, id: WidgetId, origin: (i32, i32)) -> Option<Rect> {
        let abs = self.rect.offset(origin.0, origin.1);
        if self.id == id {
            return Some(abs);
        }
        self.children
            .values()
            .find_map(|child| child.absolute_rect(id, (abs.x, abs.y)))
    }

    fn last_selected_label(&self) -> Option<&str> {
        if let Some(label) = self.children.values().rev().find_map(Widget::last_selected_label) {
            return Some(label);
        }
        match &self.kind {
            WidgetKind::Button { label } if self.state == WidgetState::Selected => Some(label),
            _ => None,
        }
    }

    fn selected_tooltip(&self) -> Option<&str> {
        if self.state == WidgetState::Selected {
            if let Some(tooltip) = self.tooltip.as_deref() {
                return Some(tooltip);
            }
        }
        self.children.values().find_map(Widget::selected_tooltip)
    }
}

/// The live widget tree: one root window and everything attached to it
#[derive(Debug, Default)]
pub struct WidgetTree {
    root: Option<Widget>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Widget> {
        self.root.as_ref()
    }

    fn root_mut(&mut self) -> MenuResult<&mut Widget> {
        self.root.as_mut().ok_or(MenuError::NoRootWindow)
    }

    /// Install a new root window, returning the previous one
    pub(crate) fn set_root(&mut self, root: Widget) -> Option<Widget> {
        self.root.replace(root)
    }

    pub(crate) fn take_root(&mut self) -> Option<Widget> {
        self.root.take()
    }

    pub(crate) fn append_to_root(&mut self, widget: Widget) -> MenuResult<WidgetId> {
        Ok(self.root_mut()?.push_child(widget))
    }

    pub(crate) fn insert_at_root(&mut self, index: usize, widget: Widget) -> MenuResult<WidgetId> {
        Ok(self.root_mut()?.insert_child(index, widget))
    }

    /// Detach a widget; ownership returns to the caller
    pub(crate) fn remove(&mut self, id: WidgetId) -> Option<Widget> {
        self.root.as_mut()?.remove_descendant(id)
    }

    /// Point root input focus at `id` (or clear it), returning the old focus
    pub(crate) fn change_focus(&mut self, id: Option<WidgetId>) -> MenuResult<Option<WidgetId>> {
        let root = self.root_mut()?;
        Ok(std::mem::replace(&mut root.focus, id))
    }

    pub fn find(&self, id: WidgetId) -> Option<&Widget> {
        self.root.as_ref()?.find(id)
    }

    pub fn find_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.root.as_mut()?.find_mut(id)
    }

    pub fn find_key(&self, key: &str) -> Option<&Widget> {
        self.root.as_ref()?.find_key(key)
    }

    pub fn find_key_mut(&mut self, key: &str) -> Option<&mut Widget> {
        self.root.as_mut()?.find_key_mut(key)
    }

    pub fn root_state(&self) -> Option<WidgetState> {
        self.root.as_ref().map(|root| root.state)
    }

    pub fn set_root_state(&mut self, state: WidgetState) -> MenuResult<WidgetState> {
        let root = self.root_mut()?;
        Ok(std::mem::replace(&mut root.state, state))
    }

    pub fn root_disabled(&self) -> bool {
        self.root_state() == Some(WidgetState::Disabled)
    }

    /// Number of attached widgets carrying `key`
    pub fn count_key(&self, key: &str) -> usize {
        self.root
            .as_ref()
            .map_or(0, |root| root.count_where(&|w: &Widget| w.key() == Some(key)))
    }

    /// Keys of the root's direct children, in order
    pub fn root_child_keys(&self) -> Vec<Option<String>> {
        self.root.as_ref().map_or_else(Vec::new, |root| {
            root.children().map(|w| w.key.clone()).collect()
        })
    }

    /// Screen-space center of the widget with `key`, for pointer input.
    /// `None` unless the widget is where input currently goes: the root, or
    /// the focused modal while the root is disabled.
    pub fn locate(&self, key: &str) -> Option<Pointer> {
        let root = self.root.as_ref()?;
        let scope = if root.is_disabled() {
            root.focus
                .and_then(|id| root.children.get(&id))
                .filter(|modal| !modal.is_disabled())?
        } else {
            root
        };
        let id = scope.find_key(key)?.id();
        root.absolute_rect(id, (0, 0)).map(|rect| rect.center())
    }

    pub fn step_effects(&mut self) {
        if let Some(root) = &mut self.root {
            root.step_effects();
        }
    }

    /// Longest remaining effect on `id` or any of its descendants
    pub fn effect_remaining(&self, id: WidgetId) -> u32 {
        self.find(id).map_or(0, Widget::effect_remaining)
    }

    /// Label of the button A would click, looking inside the modal while
    /// the root is disabled
    pub fn selected_label(&self) -> Option<&str> {
        let root = self.root.as_ref()?;
        let scope = if root.is_disabled() {
            root.focus.and_then(|id| root.children.get(&id)).unwrap_or(root)
        } else {
            root
        };
        scope.last_selected_label()
    }

    /// Tooltip of the widget under the cursor, if it has one
    pub fn active_tooltip(&self) -> Option<&str> {
        self.root.as_ref()?.selected_tooltip()
    }

    /// Deliver one player's input.
    ///
    /// While the root is disabled only its focused child (the active modal)
    /// receives input. Within that scope: trigger buttons fire first, then a
    /// pointer hit plus A, then A on the selected button, then directional
    /// navigation between selectable buttons.
    pub fn propagate(&mut self, input: &InputSnapshot) {
        let Some(root) = self.root.as_mut() else {
            return;
        };
        if input.pressed.is_empty() {
            return;
        }

        let root_origin = (root.rect.x, root.rect.y);
        let (scope, origin): (&mut Widget, (i32, i32)) = if root.is_disabled() {
            let Some(focus) = root.focus else {
                return;
            };
            match root.children.get_mut(&focus) {
                Some(modal) if !modal.is_disabled() => {
                    let origin = (root_origin.0 + modal.rect.x, root_origin.1 + modal.rect.y);
                    (modal, origin)
                }
                _ => return,
            }
        } else {
            (root, root_origin)
        };

        let mut targets = Vec::new();
        scope.collect_targets(origin, &mut targets);
        if targets.is_empty() {
            return;
        }

        let mut pressed = input.pressed;

        let triggered: Vec<(WidgetId, Buttons, bool)> = targets
            .iter()
            .filter_map(|(id, _)| scope.find(*id))
            .filter(|w| w.triggers.intersects(pressed))
            .map(|w| (w.id, w.triggers, w.selectable))
            .collect();
        let mut consumed = Buttons::NONE;
        for (id, triggers, selectable) in triggered {
            consumed |= triggers;
            if selectable {
                select_only(scope, &targets, id);
            }
            if let Some(widget) = scope.find_mut(id) {
                widget.state = WidgetState::Clicked;
                tracing::debug!("Trigger clicked {:?}", widget.key());
            }
        }
        pressed -= consumed;

        if pressed.contains(Buttons::A) {
            if let Some(pointer) = input.pointer {
                let hit = targets
                    .iter()
                    .rev()
                    .find(|(_, rect)| rect.contains(pointer))
                    .map(|(id, _)| *id);
                if let Some(hit) = hit {
                    select_only(scope, &targets, hit);
                    if let Some(widget) = scope.find_mut(hit) {
                        widget.state = WidgetState::Clicked;
                        tracing::debug!("Pointer clicked {:?}", widget.key());
                    }
                    pressed.remove(Buttons::A);
                }
            }
        }

        let selectable: Vec<WidgetId> = targets
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| scope.find(*id).is_some_and(|w| w.selectable))
            .collect();
        if selectable.is_empty() {
            return;
        }
        let current = selectable
            .iter()
            .position(|id| scope.find(*id).is_some_and(|w| w.state == WidgetState::Selected));

        if pressed.contains(Buttons::A) {
            if let Some(idx) = current {
                if let Some(widget) = scope.find_mut(selectable[idx]) {
                    widget.state = WidgetState::Clicked;
                    tracing::debug!("Clicked {:?}", widget.key());
                }
            }
            return;
        }

        let step: i32 = if pressed.intersects(Buttons::DOWN | Buttons::RIGHT) {
            1
        } else if pressed.intersects(Buttons::UP | Buttons::LEFT) {
            -1
        } else {
            return;
        };
        let next = match current {
            None => 0,
            Some(idx) => (idx as i32 + step).clamp(0, selectable.len() as i32 - 1) as usize,
        };
        select_only(scope, &targets, selectable[next]);
    }
}

fn select_only(scope: &mut Widget, targets: &[(WidgetId, Rect)], chosen: WidgetId) {
    for (id, _) in targets {
        if let Some(widget) = scope.find_mut(*id) {
            if widget.state == WidgetState::Selected && *id != chosen {
                widget.state = WidgetState::Default;
            }
        }
    }
    if let Some(widget) = scope.find_mut(chosen) {
        if widget.state == WidgetState::Default {
            widget.state = WidgetState::Selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_with_buttons() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
        let first = Widget::button("First")
            .with_key("first")
            .with_rect(Rect::new(0, 0, 100, 20))
            .selected();
        let second = Widget::button("Second")
            .with_key("second")
            .with_rect(Rect::new(0, 30, 100, 20));
        let close = Widget::button("Close")
            .with_key("close")
            .with_rect(Rect::new(200, 0, 50, 20))
            .with_trigger(Buttons::HOME);
        let (a, b, c) = (first.id(), second.id(), close.id());

        let window = Widget::window(Rect::new(10, 10, 300, 200))
            .with_child(first)
            .with_child(second)
            .with_child(close);
        let mut tree = WidgetTree::new();
        tree.set_root(Widget::window(Rect::new(0, 0, 640, 480)));
        tree.append_to_root(window).unwrap();
        (tree, a, b, c)
    }

    fn state_of(tree: &WidgetTree, id: WidgetId) -> WidgetState {
        tree.find(id).unwrap().state
    }

    #[test]
    fn test_a_clicks_selected() {
        let (mut tree, first, second, _) = screen_with_buttons();
        tree.propagate(&InputSnapshot::press(Buttons::A));
        assert_eq!(state_of(&tree, first), WidgetState::Clicked);
        assert_eq!(state_of(&tree, second), WidgetState::Default);
    }

    #[test]
    fn test_down_moves_selection() {
        let (mut tree, first, second, close) = screen_with_buttons();
        tree.propagate(&InputSnapshot::press(Buttons::DOWN));
        assert_eq!(state_of(&tree, first), WidgetState::Default);
        assert_eq!(state_of(&tree, second), WidgetState::Selected);

        // clamps at the end instead of wrapping
        tree.propagate(&InputSnapshot::press(Buttons::DOWN));
        tree.propagate(&InputSnapshot::press(Buttons::DOWN));
        assert_eq!(state_of(&tree, close), WidgetState::Selected);
        tree.propagate(&InputSnapshot::press(Buttons::DOWN));
        assert_eq!(state_of(&tree, close), WidgetState::Selected);
    }

    #[test]
    fn test_trigger_fires_without_selection() {
        let (mut tree, first, _, close) = screen_with_buttons();
        tree.propagate(&InputSnapshot::press(Buttons::HOME));
        assert_eq!(state_of(&tree, close), WidgetState::Clicked);
        assert_eq!(state_of(&tree, first), WidgetState::Default);

        tree.find_mut(close).unwrap().reset_state();
        assert_eq!(state_of(&tree, close), WidgetState::Selected);
    }

    #[test]
    fn test_trigger_only_button_resets_to_default() {
        let mut tree = WidgetTree::new();
        tree.set_root(Widget::window(Rect::default()));
        let arrow = tree
            .append_to_root(Widget::button(">").with_trigger(Buttons::RIGHT).unselectable())
            .unwrap();
        tree.propagate(&InputSnapshot::press(Buttons::RIGHT));
        assert_eq!(state_of(&tree, arrow), WidgetState::Clicked);
        tree.find_mut(arrow).unwrap().reset_state();
        assert_eq!(state_of(&tree, arrow), WidgetState::Default);
    }

    #[test]
    fn test_pointer_hit_uses_absolute_position() {
        let (mut tree, first, second, _) = screen_with_buttons();
        let target = tree.locate("second").unwrap();
        assert_eq!(target, Pointer { x: 60, y: 50 });

        tree.propagate(&InputSnapshot {
            pointer: Some(target),
            ..InputSnapshot::press(Buttons::A)
        });
        assert_eq!(state_of(&tree, second), WidgetState::Clicked);
        assert_eq!(state_of(&tree, first), WidgetState::Default);
    }

    #[test]
    fn test_disabled_root_routes_to_focused_modal() {
        let (mut tree, first, _, _) = screen_with_buttons();
        let ok = Widget::button("OK").with_key("ok").selected();
        let ok_id = ok.id();
        let modal = Widget::window(Rect::new(100, 100, 200, 100)).with_child(ok);
        let modal_id = tree.append_to_root(modal).unwrap();
        tree.set_root_state(WidgetState::Disabled).unwrap();
        tree.change_focus(Some(modal_id)).unwrap();
        assert!(tree.locate("second").is_none());
        assert!(tree.locate("ok").is_some());

        tree.propagate(&InputSnapshot::press(Buttons::A | Buttons::HOME));
        assert_eq!(state_of(&tree, ok_id), WidgetState::Clicked);
        assert_eq!(state_of(&tree, first), WidgetState::Selected);
        assert_eq!(tree.find_key("close").unwrap().state, WidgetState::Default);
    }

    #[test]
    fn test_selected_label_prefers_modal() {
        let (mut tree, _, _, _) = screen_with_buttons();
        assert_eq!(tree.selected_label(), Some("First"));

        let modal = Widget::window(Rect::new(100, 100, 200, 100)).with_child(Widget::button("No").selected());
        let modal_id = tree.append_to_root(modal).unwrap();
        tree.set_root_state(WidgetState::Disabled).unwrap();
        tree.change_focus(Some(modal_id)).unwrap();
        assert_eq!(tree.selected_label(), Some("No"));
    }

    #[test]
    fn test_disabled_button_is_skipped() {
        let (mut tree, first, second, close) = screen_with_buttons();
        tree.find_mut(second).unwrap().state = WidgetState::Disabled;
        tree.propagate(&InputSnapshot::press(Buttons::DOWN));
        assert_eq!(state_of(&tree, first), WidgetState::Default);
        assert_eq!(state_of(&tree, close), WidgetState::Selected);
    }

    #[test]
    fn test_remove_returns_ownership() {
        let (mut tree, _, second, _) = screen_with_buttons();
        let removed = tree.remove(second).unwrap();
        assert_eq!(removed.key(), Some("second"));
        assert!(tree.find(second).is_none());
        assert!(tree.remove(second).is_none());
    }

    #[test]
    fn test_insert_at_root_keeps_order() {
        let mut tree = WidgetTree::new();
        tree.set_root(Widget::window(Rect::default()));
        tree.append_to_root(Widget::image("top").with_key("top")).unwrap();
        tree.insert_at_root(0, Widget::image("game").with_key("game")).unwrap();
        assert_eq!(
            tree.root_child_keys(),
            vec![Some("game".to_string()), Some("top".to_string())]
        );
    }

    #[test]
    fn test_effects_count_down() {
        let mut tree = WidgetTree::new();
        tree.set_root(Widget::window(Rect::default()));
        let id = tree
            .append_to_root(Widget::window(Rect::default()).with_effect(EffectKind::SlideFromTop, 3))
            .unwrap();
        assert_eq!(tree.effect_remaining(id), 3);
        for _ in 0..3 {
            tree.step_effects();
        }
        assert_eq!(tree.effect_remaining(id), 0);
    }

    #[test]
    fn test_no_root_is_an_error() {
        let mut tree = WidgetTree::new();
        assert!(matches!(
            tree.append_to_root(Widget::text("x")),
            Err(MenuError::NoRootWindow)
        ));
    }
}
