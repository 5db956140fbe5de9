//! Top-level dispatcher alternating between the menu and gameplay.

use crate::models::{MenuOutcome, Screen};
use crate::ui::MenuContext;
use crate::ui::navigator;
use anyhow::Result;

pub struct Frontend {
    ctx: MenuContext,
}

impl Frontend {
    pub fn new(ctx: MenuContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &MenuContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut MenuContext {
        &mut self.ctx
    }

    /// Run menu sessions and gameplay until the menu quits the process.
    ///
    /// The menu opens on the game menu while a game is loaded and on the
    /// game browser otherwise.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let initial = if self.ctx.emulator.is_running() {
                Screen::GameMenu
            } else {
                Screen::GameSelection
            };
            match navigator::run(&mut self.ctx, initial)? {
                MenuOutcome::QuitProcess => {
                    tracing::info!("Front-end finished");
                    return Ok(());
                }
                MenuOutcome::ResumeGame => {}
            }

            self.ctx.status.clear_session_flags();
            self.play()?;
        }
    }

    /// Step the core until the menu is requested.
    ///
    /// Reset requests are served in place. An exit request also hands back
    /// to the menu, whose first tick takes the exit path.
    pub fn play(&mut self) -> Result<()> {
        tracing::info!("Resuming gameplay");
        loop {
            if self.ctx.status.should_exit() {
                return Ok(());
            }
            if let Err(e) = self.ctx.emulator.step() {
                tracing::error!("Emulation stopped: {:#}", e);
                return Ok(());
            }

            let reset = self.ctx.status.take_reset() || self.ctx.emulator.reset_requested();
            if reset {
                tracing::info!("Reset requested during gameplay");
                self.ctx.emulator.reset()?;
            }

            let config = self.ctx.status.take_config() || self.ctx.emulator.config_requested();
            if config {
                tracing::info!("Menu requested during gameplay");
                return Ok(());
            }
        }
    }
}
