//! The frame pump: the system's only unit of scheduling.
//!
//! Every blocking loop (screens, modals, exit animations) spins on
//! [`FramePump::tick_and_wait`] until its own condition holds. One tick polls
//! input, draws, steps effects, delivers input and checks the exit flags, in
//! that order.

use super::error::{MenuError, MenuResult};
use super::input::InputState;
use super::lock::Gui;
use crate::metrics::Metrics;
use crate::models::{ExitAction, FADE_STEPS};
use crate::services::{InputSource, ProcessControl, Renderer};
use crate::state::{StateManager, SystemStatus};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct FramePump {
    gui: Arc<Gui>,
    input: Box<dyn InputSource>,
    renderer: Arc<dyn Renderer>,
    process: Arc<dyn ProcessControl>,
    status: Arc<SystemStatus>,
    state: StateManager,
    metrics: Arc<Metrics>,
    players: InputState,
    interval: Duration,
    exited: bool,
}

impl FramePump {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gui: Arc<Gui>,
        input: Box<dyn InputSource>,
        renderer: Arc<dyn Renderer>,
        process: Arc<dyn ProcessControl>,
        status: Arc<SystemStatus>,
        state: StateManager,
        metrics: Arc<Metrics>,
        interval: Duration,
    ) -> Self {
        Self {
            gui,
            input,
            renderer,
            process,
            status,
            state,
            metrics,
            players: InputState::new(),
            interval,
            exited: false,
        }
    }

    /// Input as normalized by the last tick
    pub fn input(&self) -> &InputState {
        &self.players
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Run one frame.
    ///
    /// Returns [`MenuError::Shutdown`] once the exit path has run; callers
    /// propagate it so their guards unwind.
    pub fn tick(&mut self) -> MenuResult<()> {
        if self.exited {
            return Err(MenuError::Shutdown);
        }
        self.metrics.record_tick();

        let raw = self.input.poll();
        self.players.refresh(&raw);

        let renderer = &self.renderer;
        let drawn = self.gui.draw_if_running(|tree| {
            renderer.draw(tree);
            if !tree.root_disabled() {
                if let Some(tooltip) = tree.active_tooltip() {
                    renderer.draw_tooltip(tooltip);
                }
            }
            renderer.present();
        });
        self.metrics.record_frame(drawn);

        self.gui.with_tree(|tree| tree.step_effects());

        let players = &self.players;
        self.gui.with_tree_if_running(|tree| {
            for snapshot in players.propagation_order() {
                tree.propagate(snapshot);
            }
        });

        if self.status.should_exit() {
            self.run_exit();
            return Err(MenuError::Shutdown);
        }
        Ok(())
    }

    /// [`FramePump::tick`] followed by the fixed inter-tick sleep
    pub fn tick_and_wait(&mut self) -> MenuResult<()> {
        self.tick()?;
        thread::sleep(self.interval);
        Ok(())
    }

    fn run_exit(&mut self) {
        tracing::info!("Exit requested, fading out");
        for step in 0..FADE_STEPS {
            let alpha = ((step + 1) * 255 / FADE_STEPS) as u8;
            self.gui.draw_if_running(|tree| self.renderer.draw(tree));
            self.renderer.draw_fade(alpha);
            self.renderer.present();
        }

        let settings = self.state.settings();
        let action = if self.status.shutdown_requested() {
            ExitAction::Shutdown
        } else {
            settings.exit_action
        };
        tracing::info!("Leaving front-end ({:?})", action);
        self.exited = true;
        self.process.exit_app(action, &settings);
    }
}
