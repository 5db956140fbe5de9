use super::error::MenuResult;
use super::lock::Gui;
use super::progress::{ProgressHandle, ProgressOverlay};
use super::pump::FramePump;
use super::widget::WidgetId;
use crate::metrics::Metrics;
use crate::models::{MenuConfig, SettingLimits};
use crate::services::{EmulationCore, GameLibrary, InputSource, ProcessControl, Renderer, SaveStore};
use crate::state::{StateManager, SystemStatus};
use std::sync::Arc;

/// External collaborators injected at startup
pub struct Collaborators {
    pub emulator: Box<dyn EmulationCore>,
    pub library: Box<dyn GameLibrary>,
    pub saves: Box<dyn SaveStore>,
    pub input: Box<dyn InputSource>,
    pub renderer: Arc<dyn Renderer>,
    pub process: Arc<dyn ProcessControl>,
}

/// Everything a screen handler or modal needs, passed explicitly
pub struct MenuContext {
    pub gui: Arc<Gui>,
    pub pump: FramePump,
    pub state: StateManager,
    pub status: Arc<SystemStatus>,
    pub progress: ProgressHandle,
    pub emulator: Box<dyn EmulationCore>,
    pub library: Box<dyn GameLibrary>,
    pub saves: Box<dyn SaveStore>,
    pub config: MenuConfig,
    pub metrics: Arc<Metrics>,
    renderer: Arc<dyn Renderer>,
}

impl MenuContext {
    pub fn new(
        collaborators: Collaborators,
        config: MenuConfig,
        state: StateManager,
        status: Arc<SystemStatus>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let gui = Arc::new(Gui::new());
        let pump = FramePump::new(
            Arc::clone(&gui),
            collaborators.input,
            Arc::clone(&collaborators.renderer),
            collaborators.process,
            Arc::clone(&status),
            state.clone(),
            Arc::clone(&metrics),
            config.tick_interval(),
        );
        let progress = ProgressHandle::new(
            Arc::clone(&gui),
            Arc::clone(&status),
            Arc::clone(&metrics),
            config.min_progress_total,
        );

        Self {
            gui,
            pump,
            state,
            status,
            progress,
            emulator: collaborators.emulator,
            library: collaborators.library,
            saves: collaborators.saves,
            config,
            metrics,
            renderer: collaborators.renderer,
        }
    }

    /// Overlay state machine bound to this context's progress handle
    pub fn overlay(&self) -> ProgressOverlay {
        ProgressOverlay::new(
            self.progress.clone(),
            Arc::clone(&self.renderer),
            self.state.clone(),
            &self.config,
        )
    }

    /// Tick until `poll` yields a value
    pub fn wait_until<T>(
        &mut self,
        mut poll: impl FnMut(&mut MenuContext) -> MenuResult<Option<T>>,
    ) -> MenuResult<T> {
        loop {
            self.pump.tick_and_wait()?;
            if let Some(value) = poll(self)? {
                return Ok(value);
            }
        }
    }

    /// Tick until every effect on `id` and its descendants has finished
    pub fn drain_effects(&mut self, id: WidgetId) -> MenuResult<()> {
        while self.gui.read_tree(|tree| tree.effect_remaining(id)) > 0 {
            self.pump.tick_and_wait()?;
        }
        Ok(())
    }

    /// Bounds for settings that depend on collaborators
    pub fn setting_limits(&self) -> SettingLimits {
        SettingLimits {
            devices: self.saves.devices(),
            filters: self.renderer.filters(),
        }
    }

    pub fn effect_frames(&self) -> u32 {
        self.config.effect_frames
    }
}
