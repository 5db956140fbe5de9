//! Services module - boundaries to the collaborators the menu drives.
//!
//! The menu engine never talks to hardware, the file system or the emulated
//! machine directly. Everything it needs from the outside goes through the
//! traits below, injected into [`MenuContext`](crate::ui::MenuContext):
//!
//! - [`EmulationCore`]: run state, stepping, reset, cheats, the game surface
//! - [`InputSource`]: raw pad samples, polled once per tick
//! - [`Renderer`]: draws the widget tree, tooltips and the exit fade
//! - [`ProcessControl`]: the terminal exit hook
//! - [`GameLibrary`]: the game browser's folder listing and file loading
//! - [`SaveStore`]: storage devices and save files
//!
//! Concrete implementations live in [`library`] and [`saves`] (directory
//! backed) and [`headless`] (the binary's console front-end).

pub mod headless;
pub mod library;
pub mod saves;

pub use library::{DirectoryLibrary, LibraryEntry};
pub use saves::{DirectorySaveStore, SaveFile, SaveKind, SaveNameParser};

use crate::models::{ExitAction, Settings};
use crate::ui::input::RawPad;
use crate::ui::progress::ProgressHandle;
use crate::ui::widget::WidgetTree;
use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

/// Opaque reference to the emulator's last rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

impl SurfaceHandle {
    /// Asset name the renderer resolves back to this surface
    pub fn asset(&self) -> String {
        format!("surface:{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cheat {
    pub name: String,
    pub enabled: bool,
}

/// The emulated machine
pub trait EmulationCore: Send {
    /// A game is loaded and can be resumed
    fn is_running(&self) -> bool;

    /// Run one slice of emulation
    fn step(&mut self) -> Result<()>;

    fn reset(&mut self) -> Result<()>;

    /// The player asked to open the menu from gameplay
    fn config_requested(&self) -> bool;

    /// The player (or hardware) asked for a reset from gameplay
    fn reset_requested(&self) -> bool;

    fn surface(&self) -> Option<SurfaceHandle>;

    fn game_title(&self) -> Option<String>;

    fn load_game(&mut self, path: &Utf8Path) -> Result<()>;

    /// Unload the current game, as when quitting to the game browser
    fn unload(&mut self);

    fn cheats(&self) -> Vec<Cheat>;

    fn set_cheat_enabled(&mut self, index: usize, enabled: bool) -> Result<()>;
}

/// Controller hardware
pub trait InputSource: Send {
    /// One raw sample per connected player slot
    fn poll(&mut self) -> Vec<RawPad>;
}

/// Low-level drawing. Called with the tree lock held; must not call back
/// into the GUI.
pub trait Renderer: Send + Sync {
    fn draw(&self, tree: &WidgetTree);

    fn draw_tooltip(&self, tooltip: &str);

    /// Full-screen black overlay at `alpha`
    fn draw_fade(&self, alpha: u8);

    fn present(&self);

    /// Names of the video filters the filter-method setting cycles through
    fn filters(&self) -> Vec<String> {
        vec!["Default".to_string()]
    }
}

/// Terminal hook run after the exit fade
pub trait ProcessControl: Send + Sync {
    /// Leave the front-end. May return, in which case the menu unwinds and
    /// reports [`MenuOutcome::QuitProcess`](crate::models::MenuOutcome).
    fn exit_app(&self, action: ExitAction, settings: &Settings);
}

/// The game browser's view of storage
pub trait GameLibrary: Send {
    /// Entries of the current folder, directories first
    fn entries(&mut self) -> Result<Vec<LibraryEntry>>;

    /// Make `entry` (a directory) the current folder
    fn enter(&mut self, entry: &LibraryEntry) -> Result<()>;

    /// Read a game file, reporting progress, and return the path to boot
    fn open(&mut self, entry: &LibraryEntry, progress: &ProgressHandle) -> Result<Utf8PathBuf>;
}

/// Save-file storage
pub trait SaveStore: Send {
    /// Names of reachable storage devices
    fn devices(&self) -> Vec<String>;

    /// File names in `folder` on `device`
    fn list(&mut self, device: usize, folder: &str) -> Result<Vec<String>>;

    fn load(&mut self, device: usize, folder: &str, save: &SaveFile) -> Result<()>;

    fn save(&mut self, device: usize, folder: &str, save: &SaveFile) -> Result<()>;
}
