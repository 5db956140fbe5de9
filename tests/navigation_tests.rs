//! End-to-end menu sessions driven through the frame pump
//!
//! Each test scripts pointer clicks by widget key and runs the navigator
//! until it closes, then checks what the collaborators and the state saw.

mod common;

use common::{FakeCore, FakeLibrary, FakeSaves, Fixture, Harness, Step, click, press};
use emumenu::models::settings::{AutoSave, Language};
use emumenu::models::{ExitAction, FADE_STEPS};
use emumenu::services::Cheat;
use emumenu::ui::modal::{CANCEL_KEY, CONFIRM_KEY};
use emumenu::ui::builder::SCREEN_RECT;
use emumenu::ui::navigator;
use emumenu::ui::screens::settings::RESET_SETTINGS_KEY;
use emumenu::ui::screens::{self, BACK_KEY};
use emumenu::ui::{Buttons, Widget, WidgetState};
use emumenu::StateChange;
use emumenu::ui::screens::game_selection::entry_key;
use emumenu::ui::screens::{game_settings::cheat_key, option_key};
use emumenu::{MenuOutcome, Screen};
use std::sync::atomic::Ordering;

fn run_menu(harness: &mut Harness, initial: Screen) -> MenuOutcome {
    navigator::run(&mut harness.ctx, initial).expect("menu session failed")
}

fn in_game(path: &str) -> (Fixture, FakeCore) {
    let core = FakeCore::running(path);
    let fixture = Fixture {
        core: Box::new(core.clone()),
        ..Fixture::default()
    };
    (fixture, core)
}

#[test]
fn test_settings_round_trip_then_exit() {
    let mut h = Fixture::default().build(vec![click("settings"), click("back"), click("exit")]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);

    assert_eq!(h.recorder.exits(), vec![ExitAction::ReturnToLoader]);
    let fades = h.recorder.fades();
    assert_eq!(fades.len(), FADE_STEPS);
    assert_eq!(fades.last(), Some(&255));
    assert_eq!(*h.recorder.fades_before_exit.lock().unwrap(), Some(FADE_STEPS));
    assert!(!h.ctx.gui.has_root());
    assert!(h.metrics.screen_transitions.load(Ordering::Relaxed) >= 3);
}

/// (children, disabled, focused) of the root window
fn root_shape(h: &Harness) -> (usize, bool, bool) {
    h.ctx.gui.read_tree(|tree| {
        let root = tree.root().expect("root window");
        (
            root.child_count(),
            root.state == WidgetState::Disabled,
            root.focus().is_some(),
        )
    })
}

#[test]
fn test_settings_round_trip_tears_down_each_screen() {
    let mut h = Fixture::default().build(vec![
        click("settings"),
        click(RESET_SETTINGS_KEY),
        click(CANCEL_KEY),
        click(BACK_KEY),
    ]);
    h.ctx.gui.halt().set_root(Widget::window(SCREEN_RECT).with_key("root"));
    let mut events = h.ctx.state.subscribe();

    let mut visited = vec![Screen::GameSelection];
    h.ctx.state.enter_screen(Screen::GameSelection);
    for _ in 0..2 {
        let current = *visited.last().unwrap();
        let next = screens::dispatch(&mut h.ctx, current).unwrap();
        assert_eq!(root_shape(&h), (0, false, false), "{} left widgets behind", current);
        h.ctx.state.enter_screen(next);
        visited.push(next);
    }

    assert_eq!(visited, vec![Screen::GameSelection, Screen::Settings, Screen::GameSelection]);
    assert_eq!(h.ctx.state.snapshot().modal_depth, 0);
    assert_eq!(h.metrics.modals_opened.load(Ordering::Relaxed), 1);

    let mut moves = Vec::new();
    while let Ok(change) = events.try_recv() {
        if let StateChange::ScreenChanged { from, to } = change {
            moves.push((from, to));
        }
    }
    assert_eq!(
        moves,
        vec![
            (Screen::None, Screen::GameSelection),
            (Screen::GameSelection, Screen::Settings),
            (Screen::Settings, Screen::GameSelection),
        ]
    );
}

#[test]
fn test_loading_a_game_resumes_it() {
    let core = FakeCore::default();
    let saves = FakeSaves::with_files(&["Crash Auto.srm"]);
    let fixture = Fixture {
        core: Box::new(core.clone()),
        saves: saves.clone(),
        ..Fixture::default()
    };
    let mut h = fixture.build(vec![click(&entry_key(1))]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::ResumeGame);

    let game = core.0.lock().unwrap().game.clone();
    assert_eq!(game.as_deref().map(|p| p.as_str()), Some("/games/Crash.bin"));
    assert_eq!(h.ctx.state.snapshot().game_title.as_deref(), Some("Crash"));
    // default policy loads the automatic SRAM silently
    assert_eq!(saves.0.lock().unwrap().loaded, vec!["Crash Auto.srm".to_string()]);
    assert!(h.recorder.exits().is_empty());
}

#[test]
fn test_entering_a_folder_rebuilds_the_browser() {
    let library = FakeLibrary::with_games(&["Crash.bin"]);
    let fixture = Fixture {
        library: library.clone(),
        ..Fixture::default()
    };
    let mut h = fixture.build(vec![click(&entry_key(0)), click("exit")]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);
    assert_eq!(*library.entered.lock().unwrap(), vec!["RPG".to_string()]);
}

#[test]
fn test_reset_after_confirmation() {
    let (fixture, core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![click("reset"), click(CONFIRM_KEY)]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(core.0.lock().unwrap().resets, 1);
}

#[test]
fn test_reset_declined_keeps_menu_open() {
    let (fixture, core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![click("reset"), click(CANCEL_KEY), click("close")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(core.0.lock().unwrap().resets, 0);
}

#[test]
fn test_reset_failure_is_reported() {
    let (fixture, core) = in_game("/games/Crash.bin");
    core.0.lock().unwrap().fail_reset = true;
    let mut h = fixture.build(vec![
        click("reset"),
        click(CONFIRM_KEY),
        // error dialog
        click(CONFIRM_KEY),
        click("close"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(h.metrics.modals_opened.load(Ordering::Relaxed), 2);
}

#[test]
fn test_quit_to_menu_unloads_the_game() {
    let (fixture, core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![click("main-menu"), click(CONFIRM_KEY), click("exit")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::QuitProcess);

    let log = core.0.lock().unwrap();
    assert_eq!(log.unloads, 1);
    assert!(log.game.is_none());
    assert_eq!(h.ctx.state.snapshot().game_title, None);
}

#[test]
fn test_new_sram_takes_next_free_slot() {
    let saves = FakeSaves::with_files(&["Crash 1.srm", "Crash 1.frz", "Other 2.srm"]);
    let (mut fixture, _core) = in_game("/games/Crash.bin");
    fixture.saves = saves.clone();
    let mut h = fixture.build(vec![click("save"), click("new-sram"), click("back"), click("close")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(saves.0.lock().unwrap().saved, vec!["Crash 2.srm".to_string()]);
}

#[test]
fn test_overwrite_asks_first() {
    let saves = FakeSaves::with_files(&["Crash 1.srm"]);
    let (mut fixture, _core) = in_game("/games/Crash.bin");
    fixture.saves = saves.clone();
    let mut h = fixture.build(vec![
        click("save"),
        click("save-0"),
        click(CANCEL_KEY),
        click("save-0"),
        click(CONFIRM_KEY),
        click("back"),
        click("close"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(saves.0.lock().unwrap().saved, vec!["Crash 1.srm".to_string()]);
}

#[test]
fn test_loading_a_save_resumes() {
    let saves = FakeSaves::with_files(&["Crash 3.frz"]);
    let (mut fixture, _core) = in_game("/games/Crash.bin");
    fixture.saves = saves.clone();
    let mut h = fixture.build(vec![click("load"), click("save-0")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(saves.0.lock().unwrap().loaded, vec!["Crash 3.frz".to_string()]);
}

#[test]
fn test_load_without_saves_returns_to_game_menu() {
    let (fixture, _core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![click("load"), click(CONFIRM_KEY), click("close")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(h.metrics.modals_opened.load(Ordering::Relaxed), 1);
}

#[test]
fn test_missing_save_device_is_reported() {
    let (mut fixture, _core) = in_game("/games/Crash.bin");
    fixture.saves = FakeSaves::without_devices();
    let mut h = fixture.build(vec![click("save"), click(CONFIRM_KEY), click("close")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(h.metrics.modals_opened.load(Ordering::Relaxed), 1);
}

#[test]
fn test_cycling_language() {
    let mut h = Fixture::default().build(vec![
        click("settings"),
        click("menu-settings"),
        click(&option_key(0)),
        click("back"),
        click("back"),
        click("exit"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);
    assert_eq!(h.ctx.state.settings().language, Language::German);
}

#[test]
fn test_reset_settings_restores_defaults() {
    let mut h = Fixture::default().build(vec![
        click("settings"),
        click("menu-settings"),
        click(&option_key(0)),
        click("back"),
        click("reset-settings"),
        click(CONFIRM_KEY),
        click("back"),
        click("exit"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);
    assert_eq!(h.ctx.state.settings().language, Language::English);
}

#[test]
fn test_zoom_editor_cancel_restores_value() {
    let (fixture, _core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![
        click("game-settings"),
        click("video"),
        click(&option_key(3)),
        click("arrow-right"),
        click("arrow-right"),
        click(CANCEL_KEY),
        click("close"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    let settings = h.ctx.state.settings();
    assert_eq!(settings.zoom_horizontal, 1.0);
    assert_eq!(settings.zoom_vertical, 1.0);
}

#[test]
fn test_position_editor_commits_on_ok() {
    let (fixture, _core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![
        click("game-settings"),
        click("video"),
        click(&option_key(4)),
        click("arrow-left"),
        click("arrow-down"),
        click("arrow-down"),
        click(CONFIRM_KEY),
        click("close"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    let settings = h.ctx.state.settings();
    assert_eq!((settings.x_shift, settings.y_shift), (-1, 2));
}

#[test]
fn test_keyboard_edits_save_folder() {
    let mut script = vec![click("settings"), click("file-settings"), click(&option_key(1))];
    // "emumenu/saves" -> "emumenu/"
    script.extend((0..5).map(|_| click("key-backspace")));
    script.extend([
        click("key-shift"),
        click("key-x"),
        click("key-ok"),
        click("back"),
        click("back"),
        click("exit"),
    ]);
    let mut h = Fixture::default().build(script);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);
    assert_eq!(h.ctx.state.settings().save_folder, "emumenu/X");
}

#[test]
fn test_keyboard_cancel_keeps_folder() {
    let mut h = Fixture::default().build(vec![
        click("settings"),
        click("file-settings"),
        click(&option_key(2)),
        click("key-q"),
        click("key-cancel"),
        click("back"),
        click("back"),
        click("exit"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);
    assert_eq!(h.ctx.state.settings().cheat_folder, "emumenu/cheats");
}

#[test]
fn test_cheats_missing_shows_information() {
    let (fixture, _core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![
        click("game-settings"),
        click("cheats"),
        click(CONFIRM_KEY),
        click("back"),
        click("close"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(h.metrics.modals_opened.load(Ordering::Relaxed), 1);
}

#[test]
fn test_cheat_toggle_reaches_core() {
    let (fixture, core) = in_game("/games/Crash.bin");
    core.0.lock().unwrap().cheats = vec![
        Cheat {
            name: "Infinite Lives".to_string(),
            enabled: false,
        },
        Cheat {
            name: "All Levels".to_string(),
            enabled: true,
        },
    ];
    let mut h = fixture.build(vec![
        click("game-settings"),
        click("cheats"),
        click(&cheat_key(0)),
        click(&cheat_key(1)),
        click("close"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    let cheats = core.0.lock().unwrap().cheats.clone();
    assert!(cheats[0].enabled);
    assert!(!cheats[1].enabled);
}

#[test]
fn test_home_from_settings_without_game_returns_to_browser() {
    let mut h = Fixture::default().build(vec![
        click("settings"),
        Step::Idle(5),
        press(Buttons::HOME),
        click("exit"),
    ]);

    assert_eq!(run_menu(&mut h, Screen::GameSelection), MenuOutcome::QuitProcess);
    assert_eq!(h.recorder.exits().len(), 1);
}

#[test]
fn test_shutdown_during_navigation() {
    let (fixture, _core) = in_game("/games/Crash.bin");
    let mut h = fixture.build(vec![click("game-settings"), click("controller"), Step::Shutdown]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::QuitProcess);

    assert_eq!(h.recorder.exits(), vec![ExitAction::Shutdown]);
    assert_eq!(h.recorder.fades().len(), FADE_STEPS);
    assert!(!h.ctx.gui.has_root());
    assert_eq!(h.ctx.gui.halt_depth(), 0);
    assert_eq!(h.ctx.state.snapshot().modal_depth, 0);
}

#[test]
fn test_auto_save_prompt_on_entry() {
    let saves = FakeSaves::default();
    let (mut fixture, _core) = in_game("/games/Crash.bin");
    fixture.saves = saves.clone();
    fixture.settings.auto_save = AutoSave::Both;
    let mut h = fixture.build(vec![click(CONFIRM_KEY), click("close")]);

    assert_eq!(run_menu(&mut h, Screen::GameMenu), MenuOutcome::ResumeGame);
    assert_eq!(
        saves.0.lock().unwrap().saved,
        vec!["Crash Auto.srm".to_string(), "Crash Auto.frz".to_string()]
    );
}
