//! Screen state machine driver.
//!
//! [`run`] owns one menu session: it installs the root window, dispatches
//! screen handlers until `Exit` is reached over a running game, and tears the
//! root down again. `Exit` with no game loaded is not terminal; the browser
//! comes back instead.

use super::builder::SCREEN_RECT;
use super::context::MenuContext;
use super::error::{MenuError, MenuResult};
use super::progress::OverlayWorker;
use super::screens;
use super::widget::{Rect, Widget};
use crate::models::{MenuOutcome, Screen};

pub const SURFACE_KEY: &str = "game-surface";

/// Alpha of the paused game behind the menu
const SURFACE_ALPHA: u8 = 192;

fn root_window(ctx: &MenuContext) -> Widget {
    let mut root = Widget::window(SCREEN_RECT).with_key("root");
    if ctx.emulator.is_running() {
        if let Some(surface) = ctx.emulator.surface() {
            root = root.with_child(
                Widget::image(surface.asset())
                    .with_key(SURFACE_KEY)
                    .with_rect(SCREEN_RECT)
                    .with_alpha(SURFACE_ALPHA),
            );
        }
    }
    root.with_child(Widget::image("bg_top").with_rect(Rect::new(0, 0, 640, 64)))
        .with_child(Widget::image("bg_bottom").with_rect(Rect::new(0, 416, 640, 64)))
        .with_child(Widget::image("logo").with_rect(Rect::new(496, 8, 128, 48)))
}

/// Run the menu from `initial` until it closes.
///
/// Returns [`MenuOutcome::ResumeGame`] when the menu closed over a running
/// game and [`MenuOutcome::QuitProcess`] once the exit path has run.
pub fn run(ctx: &mut MenuContext, initial: Screen) -> MenuResult<MenuOutcome> {
    run_with_overlay(ctx, initial, |ctx| ctx.overlay().spawn())
}

fn run_with_overlay(
    ctx: &mut MenuContext,
    initial: Screen,
    spawn_overlay: impl FnOnce(&MenuContext) -> anyhow::Result<OverlayWorker>,
) -> MenuResult<MenuOutcome> {
    tracing::info!("Menu opened at {}", initial);
    // The root goes in only once the worker exists; a failed spawn leaves the tree as it was
    let worker = spawn_overlay(ctx)?;
    let previous = ctx.gui.halt().set_root(root_window(ctx));
    if previous.is_some() {
        tracing::warn!("Replaced a stale root window");
    }

    let result = navigate(ctx, initial);

    worker.stop();
    ctx.progress.cancel_action();
    ctx.gui.halt().take_root();
    ctx.state.leave_menu();

    match result {
        Ok(()) => {
            tracing::info!("Menu closed, resuming game");
            Ok(MenuOutcome::ResumeGame)
        }
        Err(MenuError::Shutdown) => {
            tracing::info!("Menu closed by exit request");
            Ok(MenuOutcome::QuitProcess)
        }
        Err(e) => {
            tracing::error!("Menu aborted: {}", e);
            Err(e)
        }
    }
}

fn navigate(ctx: &mut MenuContext, initial: Screen) -> MenuResult<()> {
    let mut current = initial;
    ctx.state.enter_screen(current);

    while !(current == Screen::Exit && ctx.emulator.is_running()) {
        let next = match current {
            Screen::Exit | Screen::None => Screen::GameSelection,
            screen => {
                ctx.metrics.record_screen_transition();
                screens::dispatch(ctx, screen)?
            }
        };
        if next != current {
            tracing::info!("Screen: {} -> {}", current, next);
        }
        ctx.state.enter_screen(next);
        current = next;
    }
    Ok(())
}
