use super::game_saves;
use crate::models::{Screen, ScreenAction, transition};
use crate::services::LibraryEntry;
use crate::ui::builder::{BUTTON_SIZE, ScreenDescriptor};
use crate::ui::context::MenuContext;
use crate::ui::error::MenuResult;
use crate::ui::input::Buttons;
use crate::ui::modal::error_prompt;
use crate::ui::widget::Rect;

/// Browser rows shown at once
pub const PAGE_SIZE: usize = 10;

pub const SETTINGS_KEY: &str = "settings";
pub const EXIT_KEY: &str = "exit";

pub fn entry_key(index: usize) -> String {
    format!("entry-{index}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Click {
    Entry(usize),
    PreviousPage,
    NextPage,
    Settings,
    Exit,
}

enum Chosen {
    Stay,
    Leave(Screen),
}

/// Game browser: pick a folder to enter or a game to boot
pub fn run(ctx: &mut MenuContext) -> MenuResult<Screen> {
    let entries = match ctx.library.entries() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to list games: {:#}", e);
            error_prompt(ctx, &format!("Unable to read the game folder: {e:#}"))?;
            Vec::new()
        }
    };
    let pages = entries.len().div_ceil(PAGE_SIZE).max(1);
    let mut page = 0;

    loop {
        let start = page * PAGE_SIZE;
        let rows = entries
            .iter()
            .enumerate()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|(i, entry)| (entry_key(i), entry.label(), Click::Entry(i)));

        let (width, height) = BUTTON_SIZE;
        let mut descriptor = ScreenDescriptor::new("Choose Game").list(90, 540, rows);
        if pages > 1 {
            descriptor = descriptor
                .button_with_trigger("page-prev", "<", Rect::new(470, 50, 50, 30), Buttons::LB, Click::PreviousPage)
                .button_with_trigger("page-next", ">", Rect::new(540, 50, 50, 30), Buttons::RB, Click::NextPage);
        }
        let screen = descriptor
            .button(SETTINGS_KEY, "Settings", Rect::new(50, 410, width, height), Click::Settings)
            .button_with_trigger(EXIT_KEY, "Exit", Rect::new(350, 410, width, height), Buttons::HOME, Click::Exit)
            .select_first()
            .mount(&ctx.gui)?;

        loop {
            let click = ctx.wait_until(|_| Ok(screen.poll()))?;
            match click {
                Click::Entry(index) => match open_entry(ctx, &entries[index])? {
                    Chosen::Stay => {}
                    Chosen::Leave(next) => return Ok(next),
                },
                Click::PreviousPage if page > 0 => {
                    page -= 1;
                    break;
                }
                Click::NextPage if page + 1 < pages => {
                    page += 1;
                    break;
                }
                Click::PreviousPage | Click::NextPage => {}
                Click::Settings => return Ok(transition(Screen::GameSelection, ScreenAction::OpenSettings)),
                // the next tick takes the exit path
                Click::Exit => ctx.status.request_exit(),
            }
        }
    }
}

fn open_entry(ctx: &mut MenuContext, entry: &LibraryEntry) -> MenuResult<Chosen> {
    if entry.is_dir {
        if let Err(e) = ctx.library.enter(entry) {
            tracing::error!("Failed to enter {}: {:#}", entry.path, e);
            error_prompt(ctx, &format!("Unable to open folder: {e:#}"))?;
            return Ok(Chosen::Stay);
        }
        return Ok(Chosen::Leave(transition(Screen::GameSelection, ScreenAction::FolderEntered)));
    }

    tracing::info!("Loading game {}", entry.path);
    let progress = ctx.progress.clone();
    let loaded = ctx
        .library
        .open(entry, &progress)
        .and_then(|path| ctx.emulator.load_game(&path));
    progress.cancel_action();

    if let Err(e) = loaded {
        tracing::error!("Failed to load {}: {:#}", entry.path, e);
        error_prompt(ctx, &format!("Unable to load game: {e:#}"))?;
        return Ok(Chosen::Stay);
    }

    ctx.state.set_game_title(ctx.emulator.game_title());
    game_saves::auto_load(ctx)?;
    Ok(Chosen::Leave(transition(Screen::GameSelection, ScreenAction::GameLoaded)))
}
