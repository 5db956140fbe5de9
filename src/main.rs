//! emumenu - console front-end for the menu engine
//!
//! Drives the menu from stdin and narrates the screen through the log. It
//! initializes:
//! - Configuration ([`ConfigManager`]): `Menu.yaml` tunables and `Preferences.yaml`
//! - Logging (daily rotating file + optional console)
//! - State management ([`StateManager`]) with a background listener thread
//! - The console collaborators and the [`Frontend`] dispatcher
//!
//! # Usage
//!
//! `emumenu [GAMES_DIR] [DATA_DIR]` (defaults: `games`, `emumenu-data`)
//!
//! Commands, one per line: button names (`up`, `down`, `left`, `right`, `a`,
//! `b`, `lb`, `rb`, `home`, ...), `menu` to open the menu from gameplay,
//! `reset`, and `quit`.

use anyhow::Result;
use emumenu::services::headless::{HostProcess, IdleCore, StdinInput, TracingRenderer};
use emumenu::services::{DirectoryLibrary, DirectorySaveStore};
use emumenu::ui::{Collaborators, MenuContext};
use emumenu::{APP_NAME, ConfigManager, Frontend, Metrics, StateManager, SystemStatus, VERSION};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// File extensions the game browser lists
const GAME_EXTENSIONS: &[&str] = &["bin", "cue", "iso", "img", "chd"];

/// Frame time of the stand-in core
const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let games_dir = args.next().unwrap_or_else(|| "games".to_string());
    let data_dir = args.next().unwrap_or_else(|| "emumenu-data".to_string());

    let config_manager = ConfigManager::new(&data_dir)?;
    let menu_config = config_manager.load_menu_config()?;

    // Held until main returns so buffered log lines are flushed
    let _log_guard = emumenu::logging::setup_logging_with_console(
        &menu_config.log_dir,
        &menu_config.log_prefix,
        menu_config.debug_mode,
        menu_config.console_log,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let settings = config_manager.load_or_create_settings()?;
    let state = StateManager::with_settings(settings);
    let status = Arc::new(SystemStatus::new());
    let metrics = Arc::new(Metrics::new());
    spawn_state_listener(&state)?;

    let host = Arc::new(HostProcess::new(config_manager.clone(), Arc::clone(&metrics)));
    let devices = vec![
        ("Internal".to_string(), config_manager.config_dir().join("internal")),
        ("USB".to_string(), config_manager.config_dir().join("usb")),
    ];
    let collaborators = Collaborators {
        emulator: Box::new(IdleCore::new(FRAME_TIME)),
        library: Box::new(DirectoryLibrary::new(&games_dir, GAME_EXTENSIONS)),
        saves: Box::new(DirectorySaveStore::new(devices)),
        input: Box::new(StdinInput::spawn(Arc::clone(&status))?),
        renderer: Arc::new(TracingRenderer::new()),
        process: host.clone(),
    };
    tracing::info!("Game library at {}, data in {}", games_dir, data_dir);

    let ctx = MenuContext::new(collaborators, menu_config, state, status, metrics);
    let mut frontend = Frontend::new(ctx);
    let result = frontend.run();

    match host.exit_action() {
        Some(action) => tracing::info!("Application shutdown complete ({:?})", action),
        None => tracing::warn!("Front-end stopped without running the exit hook"),
    }

    result.map_err(|e| {
        tracing::error!("Front-end error: {:#}", e);
        e
    })
}

/// Log state changes from a background thread
fn spawn_state_listener(state: &StateManager) -> Result<()> {
    let mut rx = state.subscribe();
    thread::Builder::new()
        .name("emumenu-state".to_string())
        .spawn(move || {
            loop {
                match rx.blocking_recv() {
                    Ok(change) => tracing::debug!("State change: {:?}", change),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("State listener lagged, {} events skipped", skipped)
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })?;
    Ok(())
}
