//! Halt/resume protocol guarding the live widget tree.
//!
//! Lock order is always `halt_depth` then `tree`. Drawing holds both, so a
//! halt request waits for an in-flight frame and no frame starts while the
//! depth is non-zero. Structural edits only need the tree mutex, and are only
//! reachable through a [`HaltGuard`].

use super::input::InputSnapshot;
use super::widget::{Widget, WidgetId, WidgetState, WidgetTree};
use super::error::MenuResult;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

// A panic mid-frame must not make the tree unreachable for the exit path
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The shared widget tree plus its mutation lock
#[derive(Debug, Default)]
pub struct Gui {
    halt_depth: Mutex<usize>,
    tree: Mutex<WidgetTree>,
}

impl Gui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire mutation rights. Nested calls stack; rendering resumes when
    /// the last guard drops.
    pub fn halt(&self) -> HaltGuard<'_> {
        let mut depth = lock(&self.halt_depth);
        *depth += 1;
        tracing::trace!("GUI halted (depth {})", *depth);
        HaltGuard { gui: self }
    }

    pub fn halt_depth(&self) -> usize {
        *lock(&self.halt_depth)
    }

    pub fn is_halted(&self) -> bool {
        self.halt_depth() > 0
    }

    /// Run `draw` against the tree unless a halt is active.
    ///
    /// Returns whether the frame was drawn.
    pub fn draw_if_running(&self, draw: impl FnOnce(&WidgetTree)) -> bool {
        let depth = lock(&self.halt_depth);
        if *depth > 0 {
            return false;
        }
        let tree = lock(&self.tree);
        draw(&tree);
        drop(tree);
        drop(depth);
        true
    }

    /// Non-structural access: state changes, text updates, input delivery.
    pub fn with_tree<R>(&self, f: impl FnOnce(&mut LiveTree<'_>) -> R) -> R {
        let mut tree = lock(&self.tree);
        let mut live = LiveTree { tree: &mut tree };
        f(&mut live)
    }

    /// Like [`Gui::with_tree`], but skipped while a halt is active
    pub fn with_tree_if_running<R>(&self, f: impl FnOnce(&mut LiveTree<'_>) -> R) -> Option<R> {
        let depth = lock(&self.halt_depth);
        if *depth > 0 {
            return None;
        }
        let mut tree = lock(&self.tree);
        let result = f(&mut LiveTree { tree: &mut tree });
        drop(tree);
        drop(depth);
        Some(result)
    }

    /// Read-only access
    pub fn read_tree<R>(&self, f: impl FnOnce(&WidgetTree) -> R) -> R {
        let tree = lock(&self.tree);
        f(&tree)
    }

    pub fn has_root(&self) -> bool {
        self.read_tree(WidgetTree::has_root)
    }
}

/// Scoped halt. Dropping it releases one level of halt on every exit path.
#[must_use = "the GUI resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct HaltGuard<'a> {
    gui: &'a Gui,
}

impl HaltGuard<'_> {
    /// Structural edits (append, insert, remove, focus, root swap)
    pub fn edit<R>(&self, f: impl FnOnce(&mut WidgetTree) -> R) -> R {
        let mut tree = lock(&self.gui.tree);
        f(&mut tree)
    }

    pub fn set_root(&self, root: Widget) -> Option<Widget> {
        self.edit(|tree| tree.set_root(root))
    }

    pub fn take_root(&self) -> Option<Widget> {
        self.edit(WidgetTree::take_root)
    }

    pub fn append_to_root(&self, widget: Widget) -> MenuResult<WidgetId> {
        self.edit(|tree| tree.append_to_root(widget))
    }

    pub fn insert_at_root(&self, index: usize, widget: Widget) -> MenuResult<WidgetId> {
        self.edit(|tree| tree.insert_at_root(index, widget))
    }

    pub fn remove(&self, id: WidgetId) -> Option<Widget> {
        self.edit(|tree| tree.remove(id))
    }

    pub fn change_focus(&self, id: Option<WidgetId>) -> MenuResult<Option<WidgetId>> {
        self.edit(|tree| tree.change_focus(id))
    }
}

impl Drop for HaltGuard<'_> {
    fn drop(&mut self) {
        let mut depth = lock(&self.gui.halt_depth);
        *depth = depth.saturating_sub(1);
        if *depth == 0 {
            tracing::trace!("GUI resumed");
        }
    }
}

/// Tree handle without structural edits
pub struct LiveTree<'a> {
    tree: &'a mut WidgetTree,
}

impl LiveTree<'_> {
    pub fn find_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.tree.find_mut(id)
    }

    pub fn find_key_mut(&mut self, key: &str) -> Option<&mut Widget> {
        self.tree.find_key_mut(key)
    }

    pub fn set_root_state(&mut self, state: WidgetState) -> MenuResult<WidgetState> {
        self.tree.set_root_state(state)
    }

    pub fn propagate(&mut self, input: &InputSnapshot) {
        self.tree.propagate(input);
    }

    pub fn step_effects(&mut self) {
        self.tree.step_effects();
    }

    /// Consume a click on `id`, if there is one
    pub fn take_click(&mut self, id: WidgetId) -> bool {
        match self.tree.find_mut(id) {
            Some(widget) if widget.is_clicked() => {
                widget.reset_state();
                true
            }
            _ => false,
        }
    }

    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) {
        if let Some(widget) = self.tree.find_mut(id) {
            widget.set_text(text);
        }
    }
}

impl Deref for LiveTree<'_> {
    type Target = WidgetTree;

    fn deref(&self) -> &WidgetTree {
        self.tree
    }
}
