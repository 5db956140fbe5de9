use super::with_footer;
use crate::models::settings::{AutoLoad, AutoSave};
use crate::models::{Screen, ScreenAction, transition};
use crate::services::saves::next_free_slot;
use crate::services::{SaveFile, SaveKind, SaveNameParser};
use crate::ui::builder::{BUTTON_SIZE, ScreenDescriptor};
use crate::ui::context::MenuContext;
use crate::ui::error::MenuResult;
use crate::ui::modal::{error_prompt, info_prompt, window_prompt};
use crate::ui::widget::Rect;

pub const NEW_SRAM_KEY: &str = "new-sram";
pub const NEW_SNAPSHOT_KEY: &str = "new-snapshot";

pub fn save_key(index: usize) -> String {
    format!("save-{index}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Save,
    Load,
}

impl SaveMode {
    fn screen(self) -> Screen {
        match self {
            SaveMode::Save => Screen::GameSave,
            SaveMode::Load => Screen::GameLoad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Click {
    New(SaveKind),
    Existing(usize),
    Back,
    Close,
}

/// Device and folder saves go to, from the current settings
struct Target {
    device: usize,
    folder: String,
    game: String,
}

fn target(ctx: &MenuContext) -> Option<Target> {
    let devices = ctx.saves.devices();
    if devices.is_empty() {
        return None;
    }
    let settings = ctx.state.settings();
    let device = if settings.save_device < devices.len() {
        settings.save_device
    } else {
        0
    };
    Some(Target {
        device,
        folder: settings.save_folder,
        game: ctx.emulator.game_title().unwrap_or_else(|| "Game".to_string()),
    })
}

/// Save manager for the running game
pub fn run(ctx: &mut MenuContext, mode: SaveMode) -> MenuResult<Screen> {
    let current = mode.screen();
    let Some(target) = target(ctx) else {
        tracing::warn!("No save device available");
        error_prompt(ctx, "No save device found.")?;
        return Ok(transition(current, ScreenAction::DeviceUnavailable));
    };

    let names = match ctx.saves.list(target.device, &target.folder) {
        Ok(names) => names,
        Err(e) => {
            tracing::error!("Failed to list saves: {:#}", e);
            error_prompt(ctx, &format!("Unable to read saves: {e:#}"))?;
            return Ok(transition(current, ScreenAction::DeviceUnavailable));
        }
    };
    let saves = SaveNameParser::new().collect(&target.game, names.iter().map(String::as_str));
    tracing::debug!("{} saves for {}", saves.len(), target.game);

    if mode == SaveMode::Load && saves.is_empty() {
        info_prompt(ctx, "No game saves found.")?;
        return Ok(transition(current, ScreenAction::NoSavesFound));
    }

    let (title, top) = match mode {
        SaveMode::Save => ("Save Game", 150),
        SaveMode::Load => ("Load Game", 100),
    };
    let mut descriptor = ScreenDescriptor::new(title);
    if mode == SaveMode::Save {
        let (width, height) = BUTTON_SIZE;
        descriptor = descriptor
            .button(NEW_SRAM_KEY, "New SRAM", Rect::new(50, 90, width, height), Click::New(SaveKind::Sram))
            .button(
                NEW_SNAPSHOT_KEY,
                "New Snapshot",
                Rect::new(350, 90, width, height),
                Click::New(SaveKind::Snapshot),
            );
    }
    let rows = saves
        .iter()
        .enumerate()
        .map(|(i, save)| (save_key(i), save.label(), Click::Existing(i)));
    let screen = with_footer(descriptor.list(top, 540, rows), Click::Back, Click::Close)
        .select_first()
        .mount(&ctx.gui)?;

    loop {
        let click = ctx.wait_until(|_| Ok(screen.poll()))?;
        match (mode, click) {
            (_, Click::Back) => return Ok(transition(current, ScreenAction::Back)),
            (_, Click::Close) => return Ok(transition(current, ScreenAction::Close)),
            (SaveMode::Save, Click::New(kind)) => match next_free_slot(&saves, kind) {
                Some(slot) => {
                    let save = SaveFile::new(target.game.as_str(), slot, kind);
                    if write_save(ctx, &target, &save, false)? {
                        return Ok(transition(current, ScreenAction::SaveWritten));
                    }
                }
                None => error_prompt(ctx, "No free save slot available.")?,
            },
            (SaveMode::Save, Click::Existing(index)) => {
                let save = &saves[index];
                let overwrite = window_prompt(
                    ctx,
                    "Save Game",
                    &format!("Overwrite {}?", save.label()),
                    "Yes",
                    Some("No"),
                )?;
                if overwrite.is_confirmed() && write_save(ctx, &target, save, false)? {
                    return Ok(transition(current, ScreenAction::SaveWritten));
                }
            }
            (SaveMode::Load, Click::Existing(index)) => {
                if read_save(ctx, &target, &saves[index], false)? {
                    return Ok(transition(current, ScreenAction::SaveLoaded));
                }
            }
            (SaveMode::Load, Click::New(_)) => {}
        }
    }
}

/// Write `save`; failures are shown unless `silent`. Returns success.
fn write_save(ctx: &mut MenuContext, target: &Target, save: &SaveFile, silent: bool) -> MenuResult<bool> {
    ctx.progress.show_action("Saving...");
    let result = ctx.saves.save(target.device, &target.folder, save);
    ctx.progress.cancel_action();

    match result {
        Ok(()) => {
            tracing::info!("Saved {}", save.file_name());
            Ok(true)
        }
        Err(e) => {
            tracing::error!("Failed to save {}: {:#}", save.file_name(), e);
            if !silent {
                error_prompt(ctx, &format!("Unable to save: {e:#}"))?;
            }
            Ok(false)
        }
    }
}

fn read_save(ctx: &mut MenuContext, target: &Target, save: &SaveFile, silent: bool) -> MenuResult<bool> {
    ctx.progress.show_action("Loading...");
    let result = ctx.saves.load(target.device, &target.folder, save);
    ctx.progress.cancel_action();

    match result {
        Ok(()) => {
            tracing::info!("Loaded {}", save.file_name());
            Ok(true)
        }
        Err(e) if silent => {
            tracing::debug!("No automatic save loaded: {:#}", e);
            Ok(false)
        }
        Err(e) => {
            tracing::error!("Failed to load {}: {:#}", save.file_name(), e);
            error_prompt(ctx, &format!("Unable to load save: {e:#}"))?;
            Ok(false)
        }
    }
}

/// Auto-load policy, applied silently right after a game boots
pub fn auto_load(ctx: &mut MenuContext) -> MenuResult<()> {
    let kind = match ctx.state.settings().auto_load {
        AutoLoad::Off => return Ok(()),
        AutoLoad::Sram => SaveKind::Sram,
        AutoLoad::Snapshot => SaveKind::Snapshot,
    };
    let Some(target) = target(ctx) else {
        return Ok(());
    };
    let save = SaveFile::auto(target.game.as_str(), kind);
    read_save(ctx, &target, &save, true)?;
    Ok(())
}

/// Auto-save policy, applied when the game menu first opens over gameplay
pub fn auto_save(ctx: &mut MenuContext) -> MenuResult<()> {
    let policy = ctx.state.settings().auto_save;
    let kinds: &[SaveKind] = match policy {
        AutoSave::Off => return Ok(()),
        AutoSave::Sram => &[SaveKind::Sram],
        AutoSave::Snapshot => &[SaveKind::Snapshot],
        AutoSave::Both => &[SaveKind::Sram, SaveKind::Snapshot],
    };
    let Some(target) = target(ctx) else {
        tracing::warn!("Auto save skipped: no save device");
        return Ok(());
    };

    let question = match policy {
        AutoSave::Snapshot => Some("Save Snapshot?"),
        AutoSave::Both => Some("Save SRAM and Snapshot?"),
        _ => None,
    };
    if let Some(question) = question {
        let answer = window_prompt(ctx, "Save", question, "Save", Some("Don't Save"))?;
        if !answer.is_confirmed() {
            return Ok(());
        }
    }

    // SRAM alone is saved without asking and without error dialogs
    let silent = question.is_none();
    for kind in kinds {
        let save = SaveFile::auto(target.game.as_str(), *kind);
        write_save(ctx, &target, &save, silent)?;
    }
    Ok(())
}
