//! Shared harness for the menu integration tests.
//!
//! Navigation is driven through the real frame pump: [`ScriptedInput`] turns
//! "click the widget with this key" steps into a pointer press on that widget,
//! with an idle sample between steps so every click is a fresh edge.

#![allow(dead_code)]

use anyhow::{Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use emumenu::models::{ExitAction, MenuConfig, Settings};
use emumenu::services::{
    Cheat, EmulationCore, GameLibrary, InputSource, LibraryEntry, ProcessControl, Renderer, SaveFile,
    SaveStore, SurfaceHandle,
};
use emumenu::ui::progress::ProgressHandle;
use emumenu::ui::{Buttons, Collaborators, Gui, MenuContext, RawPad, WidgetTree};
use emumenu::{Metrics, StateManager, SystemStatus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

/// Polls a click may wait for its widget before the test fails
const MAX_WAIT: usize = 5_000;

/// Idle polls after the script runs out before a shutdown is forced
const DRAIN_POLLS: usize = 2_000;

#[derive(Debug, Clone)]
pub enum Step {
    /// Pointer press on the widget with this key, once it is attached
    Click(String),
    /// Plain button press
    Press(Buttons),
    /// Idle polls
    Idle(usize),
    /// Request a shutdown from "hardware"
    Shutdown,
}

pub fn click(key: &str) -> Step {
    Step::Click(key.to_string())
}

pub fn press(buttons: Buttons) -> Step {
    Step::Press(buttons)
}

pub struct ScriptedInput {
    gui: Arc<OnceLock<Arc<Gui>>>,
    status: Arc<SystemStatus>,
    steps: VecDeque<Step>,
    release: bool,
    waited: usize,
    drained: usize,
}

impl ScriptedInput {
    fn idle() -> Vec<RawPad> {
        vec![RawPad {
            connected: true,
            ..RawPad::default()
        }]
    }

    fn pad(buttons: Buttons, tree_key: Option<&str>, gui: &Gui) -> Option<Vec<RawPad>> {
        let pointer = match tree_key {
            Some(key) => Some(gui.read_tree(|t: &WidgetTree| t.locate(key))?),
            None => None,
        };
        Some(vec![RawPad {
            connected: true,
            buttons,
            pointer,
            ..RawPad::default()
        }])
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<RawPad> {
        if self.release {
            self.release = false;
            return Self::idle();
        }
        let Some(gui) = self.gui.get() else {
            return Self::idle();
        };

        let Some(step) = self.steps.front().cloned() else {
            self.drained += 1;
            if self.drained == DRAIN_POLLS {
                self.status.request_shutdown();
            }
            return Self::idle();
        };

        let sample = match &step {
            Step::Click(key) => match Self::pad(Buttons::A, Some(key.as_str()), gui) {
                Some(sample) => sample,
                None => {
                    self.waited += 1;
                    assert!(self.waited < MAX_WAIT, "widget '{key}' never appeared");
                    return Self::idle();
                }
            },
            Step::Press(buttons) => Self::pad(*buttons, None, gui).unwrap_or_else(Self::idle),
            Step::Idle(0) => {
                self.steps.pop_front();
                return Self::idle();
            }
            Step::Idle(n) => {
                self.steps[0] = Step::Idle(n - 1);
                return Self::idle();
            }
            Step::Shutdown => {
                self.steps.pop_front();
                self.status.request_shutdown();
                return Self::idle();
            }
        };
        self.steps.pop_front();
        self.waited = 0;
        self.release = true;
        sample
    }
}

/// Renderer and exit hook in one
#[derive(Default)]
pub struct Recorder {
    pub draws: Mutex<usize>,
    pub fades: Mutex<Vec<u8>>,
    pub exits: Mutex<Vec<ExitAction>>,
    pub fades_before_exit: Mutex<Option<usize>>,
}

impl Recorder {
    pub fn fades(&self) -> Vec<u8> {
        self.fades.lock().unwrap().clone()
    }

    pub fn exits(&self) -> Vec<ExitAction> {
        self.exits.lock().unwrap().clone()
    }
}

impl Renderer for Recorder {
    fn draw(&self, _tree: &WidgetTree) {
        *self.draws.lock().unwrap() += 1;
    }

    fn draw_tooltip(&self, _tooltip: &str) {}

    fn draw_fade(&self, alpha: u8) {
        self.fades.lock().unwrap().push(alpha);
    }

    fn present(&self) {}

    fn filters(&self) -> Vec<String> {
        vec!["Default".to_string(), "Sharp".to_string()]
    }
}

impl ProcessControl for Recorder {
    fn exit_app(&self, action: ExitAction, _settings: &Settings) {
        *self.fades_before_exit.lock().unwrap() = Some(self.fades.lock().unwrap().len());
        self.exits.lock().unwrap().push(action);
    }
}

/// What the fake core saw
#[derive(Debug, Default)]
pub struct CoreLog {
    pub game: Option<Utf8PathBuf>,
    pub resets: usize,
    pub steps: usize,
    pub unloads: usize,
    pub cheats: Vec<Cheat>,
    pub fail_reset: bool,
}

#[derive(Clone, Default)]
pub struct FakeCore(pub Arc<Mutex<CoreLog>>);

impl FakeCore {
    pub fn running(path: &str) -> Self {
        let core = Self::default();
        core.0.lock().unwrap().game = Some(Utf8PathBuf::from(path));
        core
    }
}

impl EmulationCore for FakeCore {
    fn is_running(&self) -> bool {
        self.0.lock().unwrap().game.is_some()
    }

    fn step(&mut self) -> Result<()> {
        self.0.lock().unwrap().steps += 1;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let mut log = self.0.lock().unwrap();
        if log.fail_reset {
            bail!("core busy");
        }
        log.resets += 1;
        Ok(())
    }

    fn config_requested(&self) -> bool {
        false
    }

    fn reset_requested(&self) -> bool {
        false
    }

    fn surface(&self) -> Option<SurfaceHandle> {
        self.is_running().then_some(SurfaceHandle {
            id: 1,
            width: 640,
            height: 480,
        })
    }

    fn game_title(&self) -> Option<String> {
        let log = self.0.lock().unwrap();
        log.game.as_ref().and_then(|p| p.file_stem()).map(str::to_string)
    }

    fn load_game(&mut self, path: &Utf8Path) -> Result<()> {
        self.0.lock().unwrap().game = Some(path.to_path_buf());
        Ok(())
    }

    fn unload(&mut self) {
        let mut log = self.0.lock().unwrap();
        log.game = None;
        log.unloads += 1;
    }

    fn cheats(&self) -> Vec<Cheat> {
        self.0.lock().unwrap().cheats.clone()
    }

    fn set_cheat_enabled(&mut self, index: usize, enabled: bool) -> Result<()> {
        let mut log = self.0.lock().unwrap();
        match log.cheats.get_mut(index) {
            Some(cheat) => {
                cheat.enabled = enabled;
                Ok(())
            }
            None => bail!("no cheat {index}"),
        }
    }
}

/// Library with a fixed listing
#[derive(Clone, Default)]
pub struct FakeLibrary {
    pub entries: Vec<LibraryEntry>,
    pub entered: Arc<Mutex<Vec<String>>>,
}

impl FakeLibrary {
    pub fn with_games(names: &[&str]) -> Self {
        let mut entries = vec![LibraryEntry {
            name: "RPG".to_string(),
            path: Utf8PathBuf::from("/games/RPG"),
            is_dir: true,
        }];
        entries.extend(names.iter().map(|name| LibraryEntry {
            name: (*name).to_string(),
            path: Utf8PathBuf::from(format!("/games/{name}")),
            is_dir: false,
        }));
        Self {
            entries,
            entered: Arc::default(),
        }
    }
}

impl GameLibrary for FakeLibrary {
    fn entries(&mut self) -> Result<Vec<LibraryEntry>> {
        Ok(self.entries.clone())
    }

    fn enter(&mut self, entry: &LibraryEntry) -> Result<()> {
        self.entered.lock().unwrap().push(entry.name.clone());
        Ok(())
    }

    fn open(&mut self, entry: &LibraryEntry, progress: &ProgressHandle) -> Result<Utf8PathBuf> {
        progress.show_progress("Loading...", 1, 1);
        Ok(entry.path.clone())
    }
}

/// In-memory save store
#[derive(Debug, Default)]
pub struct SaveLog {
    pub devices: Vec<String>,
    pub files: Vec<String>,
    pub saved: Vec<String>,
    pub loaded: Vec<String>,
}

#[derive(Clone)]
pub struct FakeSaves(pub Arc<Mutex<SaveLog>>);

impl Default for FakeSaves {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(SaveLog {
            devices: vec!["Internal".to_string()],
            ..SaveLog::default()
        })))
    }
}

impl FakeSaves {
    pub fn with_files(files: &[&str]) -> Self {
        let saves = Self::default();
        saves.0.lock().unwrap().files = files.iter().map(|f| (*f).to_string()).collect();
        saves
    }

    pub fn without_devices() -> Self {
        let saves = Self::default();
        saves.0.lock().unwrap().devices.clear();
        saves
    }
}

impl SaveStore for FakeSaves {
    fn devices(&self) -> Vec<String> {
        self.0.lock().unwrap().devices.clone()
    }

    fn list(&mut self, _device: usize, _folder: &str) -> Result<Vec<String>> {
        Ok(self.0.lock().unwrap().files.clone())
    }

    fn load(&mut self, _device: usize, _folder: &str, save: &SaveFile) -> Result<()> {
        let mut log = self.0.lock().unwrap();
        let name = save.file_name();
        if !log.files.contains(&name) {
            bail!("{name} not found");
        }
        log.loaded.push(name);
        Ok(())
    }

    fn save(&mut self, _device: usize, _folder: &str, save: &SaveFile) -> Result<()> {
        let mut log = self.0.lock().unwrap();
        let name = save.file_name();
        if !log.files.contains(&name) {
            log.files.push(name.clone());
        }
        log.saved.push(name);
        Ok(())
    }
}

/// Fast timings so scripted runs finish in milliseconds
pub fn test_config() -> MenuConfig {
    MenuConfig {
        tick_interval_us: 0,
        overlay_grace_us: 1_000,
        overlay_refresh_us: 500,
        effect_frames: 2,
        ..MenuConfig::default()
    }
}

pub struct Fixture {
    pub core: Box<dyn EmulationCore>,
    pub library: FakeLibrary,
    pub saves: FakeSaves,
    pub settings: Settings,
    pub config: MenuConfig,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            core: Box::new(FakeCore::default()),
            library: FakeLibrary::with_games(&["Crash.bin", "Spyro.bin"]),
            saves: FakeSaves::default(),
            settings: Settings::default(),
            config: test_config(),
        }
    }
}

pub struct Harness {
    pub ctx: MenuContext,
    pub recorder: Arc<Recorder>,
    pub status: Arc<SystemStatus>,
    pub metrics: Arc<Metrics>,
}

impl Fixture {
    pub fn build(self, script: Vec<Step>) -> Harness {
        let slot = Arc::new(OnceLock::new());
        let status = Arc::new(SystemStatus::new());
        let metrics = Arc::new(Metrics::new());
        let recorder = Arc::new(Recorder::default());
        let input = ScriptedInput {
            gui: Arc::clone(&slot),
            status: Arc::clone(&status),
            steps: script.into(),
            release: false,
            waited: 0,
            drained: 0,
        };
        let collaborators = Collaborators {
            emulator: self.core,
            library: Box::new(self.library),
            saves: Box::new(self.saves),
            input: Box::new(input),
            renderer: recorder.clone(),
            process: recorder.clone(),
        };
        let ctx = MenuContext::new(
            collaborators,
            self.config,
            StateManager::with_settings(self.settings),
            Arc::clone(&status),
            Arc::clone(&metrics),
        );
        let _ = slot.set(Arc::clone(&ctx.gui));
        Harness {
            ctx,
            recorder,
            status,
            metrics,
        }
    }
}
