//! Frontend dispatcher: alternation between menu sessions and gameplay

mod common;

use anyhow::Result;
use camino::Utf8Path;
use common::{Fixture, Step, click};
use emumenu::Frontend;
use emumenu::models::ExitAction;
use emumenu::services::{Cheat, EmulationCore, SurfaceHandle};
use mockall::mock;

mock! {
    pub Core {}

    impl EmulationCore for Core {
        fn is_running(&self) -> bool;
        fn step(&mut self) -> Result<()>;
        fn reset(&mut self) -> Result<()>;
        fn config_requested(&self) -> bool;
        fn reset_requested(&self) -> bool;
        fn surface(&self) -> Option<SurfaceHandle>;
        fn game_title(&self) -> Option<String>;
        fn load_game(&mut self, path: &Utf8Path) -> Result<()>;
        fn unload(&mut self);
        fn cheats(&self) -> Vec<Cheat>;
        fn set_cheat_enabled(&mut self, index: usize, enabled: bool) -> Result<()>;
    }
}

/// A loaded game that never asks for anything on its own
fn quiet_core() -> MockCore {
    let mut core = MockCore::new();
    core.expect_is_running().return_const(true);
    core.expect_game_title().returning(|| Some("Crash".to_string()));
    core.expect_surface().returning(|| None);
    core.expect_reset_requested().return_const(false);
    core
}

#[test]
fn test_reset_request_served_once_during_play() {
    let mut core = quiet_core();
    core.expect_step().times(1).returning(|| Ok(()));
    core.expect_reset().times(1).returning(|| Ok(()));
    core.expect_config_requested().return_const(false);

    let fixture = Fixture {
        core: Box::new(core),
        ..Fixture::default()
    };
    let h = fixture.build(Vec::new());
    h.status.request_reset();
    h.status.request_config();

    let mut frontend = Frontend::new(h.ctx);
    frontend.play().unwrap();

    assert!(!h.status.reset_requested());
    assert!(!h.status.config_requested());
}

#[test]
fn test_core_menu_request_leaves_play_without_reset() {
    let mut core = quiet_core();
    core.expect_step().times(1).returning(|| Ok(()));
    core.expect_reset().never();
    core.expect_config_requested().return_const(true);

    let fixture = Fixture {
        core: Box::new(core),
        ..Fixture::default()
    };
    let mut frontend = Frontend::new(fixture.build(Vec::new()).ctx);
    frontend.play().unwrap();
}

#[test]
fn test_step_failure_ends_play() {
    let mut core = quiet_core();
    core.expect_step()
        .times(1)
        .returning(|| Err(anyhow::anyhow!("bus error")));
    core.expect_config_requested().never();

    let fixture = Fixture {
        core: Box::new(core),
        ..Fixture::default()
    };
    let mut frontend = Frontend::new(fixture.build(Vec::new()).ctx);
    assert!(frontend.play().is_ok());
}

#[test]
fn test_run_alternates_until_shutdown() {
    let mut core = quiet_core();
    // one gameplay slice between the two menu sessions
    core.expect_step().times(1).returning(|| Ok(()));
    core.expect_config_requested().times(1).return_const(true);
    core.expect_reset().never();

    let fixture = Fixture {
        core: Box::new(core),
        ..Fixture::default()
    };
    let h = fixture.build(vec![click("close"), Step::Idle(5), Step::Shutdown]);
    let recorder = h.recorder.clone();

    let mut frontend = Frontend::new(h.ctx);
    frontend.run().unwrap();

    assert_eq!(recorder.exits(), vec![ExitAction::Shutdown]);
    assert!(!frontend.context().gui.has_root());
}

#[test]
fn test_run_without_game_opens_browser() {
    let mut core = MockCore::new();
    core.expect_is_running().return_const(false);
    core.expect_load_game().never();
    core.expect_step().never();

    let fixture = Fixture {
        core: Box::new(core),
        ..Fixture::default()
    };
    let h = fixture.build(vec![click("exit")]);
    let recorder = h.recorder.clone();

    let mut frontend = Frontend::new(h.ctx);
    frontend.run().unwrap();
    assert_eq!(recorder.exits(), vec![ExitAction::ReturnToLoader]);
}
