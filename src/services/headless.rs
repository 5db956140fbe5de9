//! Console front-end collaborators used by the `emumenu` binary.
//!
//! The menu is driven from stdin (one command per line, e.g. `down`, `a`,
//! `home`) and "rendered" through `tracing`: every time the visible screen or
//! the selected button changes, one log line describes it.

use super::{Cheat, EmulationCore, InputSource, ProcessControl, Renderer, SurfaceHandle};
use crate::config::ConfigManager;
use crate::metrics::Metrics;
use crate::models::{ExitAction, Settings};
use crate::state::SystemStatus;
use crate::ui::input::{Buttons, RawPad};
use crate::ui::lock::lock;
use crate::ui::widget::WidgetTree;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Renderer that narrates the widget tree into the log
#[derive(Debug)]
pub struct TracingRenderer {
    last: Mutex<String>,
    filters: Vec<String>,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(String::new()),
            filters: vec!["Default".to_string(), "Sharp".to_string(), "Smooth".to_string()],
        }
    }

    fn describe(tree: &WidgetTree) -> String {
        let title = tree
            .find_key("title")
            .and_then(|w| w.text_value())
            .unwrap_or("-");
        let prompt = if tree.root_disabled() { " [dialog]" } else { "" };
        match tree.selected_label() {
            Some(label) => format!("{title}{prompt} > {label}"),
            None => format!("{title}{prompt}"),
        }
    }
}

impl Default for TracingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TracingRenderer {
    fn draw(&self, tree: &WidgetTree) {
        let description = Self::describe(tree);
        let mut last = lock(&self.last);
        if *last != description {
            tracing::info!("{}", description);
            *last = description;
        }
    }

    fn draw_tooltip(&self, tooltip: &str) {
        tracing::trace!("Tooltip: {}", tooltip);
    }

    fn draw_fade(&self, alpha: u8) {
        tracing::debug!("Fade {}", alpha);
    }

    fn present(&self) {}

    fn filters(&self) -> Vec<String> {
        self.filters.clone()
    }
}

/// What one console line asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Press(Buttons),
    /// Open the menu from gameplay
    Menu,
    Reset,
    Quit,
}

/// Parse a console line: `menu`, `reset`, `quit`, or button names such as
/// `a` or `down a` (pressed together)
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return None,
        "menu" => return Some(ConsoleCommand::Menu),
        "reset" => return Some(ConsoleCommand::Reset),
        "quit" | "exit" => return Some(ConsoleCommand::Quit),
        _ => {}
    }
    let mut buttons = Buttons::NONE;
    for word in line.split_whitespace() {
        buttons |= Buttons::from_console_name(word)?;
    }
    Some(ConsoleCommand::Press(buttons))
}

/// Stdin-driven pad for player 0.
///
/// Each button command is held for exactly one poll and released on the
/// next, so repeated commands produce repeated presses.
pub struct StdinInput {
    rx: mpsc::UnboundedReceiver<Buttons>,
    release: bool,
}

impl StdinInput {
    /// Start the stdin reader thread. System commands go straight to
    /// `status`; end of input requests a shutdown.
    pub fn spawn(status: Arc<SystemStatus>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        thread::Builder::new()
            .name("emumenu-stdin".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    match parse_command(&line) {
                        Some(ConsoleCommand::Press(buttons)) => {
                            if tx.send(buttons).is_err() {
                                return;
                            }
                        }
                        Some(ConsoleCommand::Menu) => status.request_config(),
                        Some(ConsoleCommand::Reset) => status.request_reset(),
                        Some(ConsoleCommand::Quit) => status.request_shutdown(),
                        None => tracing::warn!("Unknown command: {}", line.trim()),
                    }
                }
                tracing::info!("Console input closed");
                status.request_shutdown();
            })
            .context("Failed to spawn stdin reader thread")?;
        Ok(Self::from_channel(rx))
    }

    pub fn from_channel(rx: mpsc::UnboundedReceiver<Buttons>) -> Self {
        Self { rx, release: false }
    }
}

impl InputSource for StdinInput {
    fn poll(&mut self) -> Vec<RawPad> {
        let buttons = if self.release {
            self.release = false;
            Buttons::NONE
        } else {
            match self.rx.try_recv() {
                Ok(buttons) => {
                    self.release = true;
                    buttons
                }
                Err(_) => Buttons::NONE,
            }
        };
        vec![RawPad {
            connected: true,
            buttons,
            ..RawPad::default()
        }]
    }
}

/// Stand-in core: "runs" a loaded file by sleeping one frame per step
#[derive(Debug)]
pub struct IdleCore {
    game: Option<Utf8PathBuf>,
    cheats: Vec<Cheat>,
    frame: u64,
    frame_time: Duration,
}

impl IdleCore {
    pub fn new(frame_time: Duration) -> Self {
        Self {
            game: None,
            cheats: Vec::new(),
            frame: 0,
            frame_time,
        }
    }

    pub fn with_cheats(mut self, names: &[&str]) -> Self {
        self.cheats = names
            .iter()
            .map(|name| Cheat {
                name: (*name).to_string(),
                enabled: false,
            })
            .collect();
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl EmulationCore for IdleCore {
    fn is_running(&self) -> bool {
        self.game.is_some()
    }

    fn step(&mut self) -> Result<()> {
        if self.game.is_none() {
            bail!("No game loaded");
        }
        self.frame += 1;
        thread::sleep(self.frame_time);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if self.game.is_none() {
            bail!("No game loaded");
        }
        tracing::info!("Core reset after {} frames", self.frame);
        self.frame = 0;
        Ok(())
    }

    fn config_requested(&self) -> bool {
        false
    }

    fn reset_requested(&self) -> bool {
        false
    }

    fn surface(&self) -> Option<SurfaceHandle> {
        self.game.as_ref().map(|_| SurfaceHandle {
            id: self.frame,
            width: 640,
            height: 480,
        })
    }

    fn game_title(&self) -> Option<String> {
        self.game
            .as_ref()
            .and_then(|path| path.file_stem())
            .map(str::to_string)
    }

    fn load_game(&mut self, path: &Utf8Path) -> Result<()> {
        if !path.is_file() {
            bail!("{} is not a file", path);
        }
        tracing::info!("Booting {}", path);
        self.game = Some(path.to_path_buf());
        self.frame = 0;
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(game) = self.game.take() {
            tracing::info!("Unloaded {}", game);
        }
    }

    fn cheats(&self) -> Vec<Cheat> {
        self.cheats.clone()
    }

    fn set_cheat_enabled(&mut self, index: usize, enabled: bool) -> Result<()> {
        let Some(cheat) = self.cheats.get_mut(index) else {
            bail!("No cheat at index {}", index);
        };
        cheat.enabled = enabled;
        Ok(())
    }
}

/// Exit hook for the binary: persist preferences and report metrics.
///
/// Returns normally; `main` unwinds once the menu reports that it quit.
pub struct HostProcess {
    config: ConfigManager,
    metrics: Arc<Metrics>,
    action: Mutex<Option<ExitAction>>,
}

impl HostProcess {
    pub fn new(config: ConfigManager, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            metrics,
            action: Mutex::new(None),
        }
    }

    /// Action the exit hook ran with, once it has run
    pub fn exit_action(&self) -> Option<ExitAction> {
        *lock(&self.action)
    }
}

impl ProcessControl for HostProcess {
    fn exit_app(&self, action: ExitAction, settings: &Settings) {
        if let Err(e) = self.config.save_settings(settings) {
            tracing::error!("Failed to save preferences: {:#}", e);
        }
        self.metrics.log_summary();
        tracing::info!("Exit hook: {:?}", action);
        *lock(&self.action) = Some(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("a"), Some(ConsoleCommand::Press(Buttons::A)));
        assert_eq!(
            parse_command(" down A "),
            Some(ConsoleCommand::Press(Buttons::DOWN | Buttons::A))
        );
        assert_eq!(parse_command("MENU"), Some(ConsoleCommand::Menu));
        assert_eq!(parse_command("quit"), Some(ConsoleCommand::Quit));
        assert_eq!(parse_command("jump"), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_stdin_input_releases_between_presses() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut input = StdinInput::from_channel(rx);
        tx.send(Buttons::A).unwrap();
        tx.send(Buttons::A).unwrap();

        let held: Vec<Buttons> = (0..5).map(|_| input.poll()[0].buttons).collect();
        assert_eq!(
            held,
            vec![Buttons::A, Buttons::NONE, Buttons::A, Buttons::NONE, Buttons::NONE]
        );
    }

    #[test]
    fn test_idle_core_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let game = Utf8PathBuf::try_from(temp_dir.path().join("Crash.bin")).unwrap();
        std::fs::write(&game, b"game").unwrap();

        let mut core = IdleCore::new(Duration::ZERO).with_cheats(&["Infinite Lives"]);
        assert!(!core.is_running());
        assert!(core.step().is_err());

        core.load_game(&game).unwrap();
        assert_eq!(core.game_title().as_deref(), Some("Crash"));
        core.step().unwrap();
        core.step().unwrap();
        assert_eq!(core.frame(), 2);
        core.reset().unwrap();
        assert_eq!(core.frame(), 0);

        core.set_cheat_enabled(0, true).unwrap();
        assert!(core.cheats()[0].enabled);
        assert!(core.set_cheat_enabled(3, true).is_err());

        core.unload();
        assert!(!core.is_running());
        assert!(core.surface().is_none());
    }

    #[test]
    fn test_host_process_saves_preferences() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigManager::new(Utf8Path::from_path(temp_dir.path()).unwrap()).unwrap();
        let host = HostProcess::new(config.clone(), Arc::new(Metrics::new()));

        let settings = Settings {
            widescreen: true,
            ..Settings::default()
        };
        host.exit_app(ExitAction::Shutdown, &settings);

        assert_eq!(host.exit_action(), Some(ExitAction::Shutdown));
        assert!(config.load_settings().unwrap().widescreen);
    }
}
