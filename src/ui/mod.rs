// UI module - widget tree, frame pump and the menu screens
//
// This module contains:
// - Gui / HaltGuard: the mutation lock around the shared widget tree
// - FramePump: the per-tick input, draw, effect and exit loop
// - Modal dialogs and the progress overlay
// - The screen handlers and the navigator that dispatches them

pub mod builder;
pub mod context;
pub mod error;
pub mod input;
pub mod lock;
pub mod modal;
pub mod navigator;
pub mod progress;
pub mod pump;
pub mod screens;
pub mod widget;

pub use context::{Collaborators, MenuContext};
pub use error::{MenuError, MenuResult};
pub use input::{Buttons, InputSnapshot, InputState, Pointer, RawPad};
pub use lock::{Gui, HaltGuard, LiveTree};
pub use modal::{ModalOutcome, ModalSession, SettingEditor};
pub use progress::{OverlayPhase, OverlayWorker, ProgressHandle, ProgressMode, ProgressOverlay};
pub use pump::FramePump;
pub use widget::{EffectKind, Rect, Widget, WidgetId, WidgetKind, WidgetState, WidgetTree};
