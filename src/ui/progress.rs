//! Progress and notification overlay.
//!
//! Any thread may post a request through a [`ProgressHandle`]. A dedicated
//! overlay thread runs [`ProgressOverlay`], which waits out a grace period,
//! attaches a "Please Wait" window over the root, animates it, and detaches it
//! again when the request is cancelled, superseded or completed. Request
//! fields are plain shared state; only attach/detach touch the widget tree,
//! and they do so under a halt guard.

use super::error::MenuError;
use super::lock::{Gui, lock};
use super::widget::{Rect, Widget, WidgetId, WidgetKind, WidgetState};
use crate::metrics::Metrics;
use crate::models::MenuConfig;
use crate::services::Renderer;
use crate::state::{StateManager, SystemStatus};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const OVERLAY_KEY: &str = "progress-overlay";
pub const MESSAGE_KEY: &str = "progress-message";
pub const BAR_KEY: &str = "progress-bar";
pub const THROBBER_KEY: &str = "progress-throbber";

const TITLE: &str = "Please Wait";

/// Degrees the throbber turns per step
const THROBBER_STEP: u16 = 45;

/// Refreshes between two throbber steps
const THROBBER_EVERY: u32 = 5;

/// Upper bound on how long a cancel waits for the overlay thread to detach
const DETACH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    Off,
    /// Bar filled to `done / total`
    Determinate,
    /// Rotating throbber
    Indeterminate,
}

/// The request the overlay thread renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressRequest {
    pub mode: ProgressMode,
    pub title: String,
    pub message: String,
    pub done: u64,
    pub total: u64,
}

impl ProgressRequest {
    /// Bar fill in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.done as f64 / self.total as f64).clamp(0.0, 1.0) as f32
    }

    pub fn is_complete(&self) -> bool {
        self.mode == ProgressMode::Determinate && self.done >= self.total
    }
}

#[derive(Debug)]
struct ProgressShared {
    request: Mutex<ProgressRequest>,
    suspended: AtomicBool,
    /// Bumped for every request that must get its own overlay
    generation: AtomicU64,
    attached: AtomicBool,
    worker_running: AtomicBool,
}

impl Default for ProgressShared {
    fn default() -> Self {
        Self {
            request: Mutex::new(ProgressRequest::default()),
            suspended: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            attached: AtomicBool::new(false),
            worker_running: AtomicBool::new(false),
        }
    }
}

/// Cheap, cloneable entry point for posting progress from any thread
#[derive(Clone)]
pub struct ProgressHandle {
    shared: Arc<ProgressShared>,
    gui: Arc<Gui>,
    status: Arc<SystemStatus>,
    metrics: Arc<Metrics>,
    min_total: u64,
}

impl ProgressHandle {
    pub fn new(gui: Arc<Gui>, status: Arc<SystemStatus>, metrics: Arc<Metrics>, min_total: u64) -> Self {
        Self {
            shared: Arc::new(ProgressShared::default()),
            gui,
            status,
            metrics,
            min_total,
        }
    }

    /// Report `done` of `total` units of a long-running task.
    ///
    /// Requests below the minimum total, before the first root window or
    /// during exit are dropped. `done` is clamped to `total`, and anything past
    /// 99% counts as finished.
    pub fn show_progress(&self, message: &str, done: u64, total: u64) {
        if !self.accepts(Some(total)) {
            return;
        }
        let done = done.min(total);
        let done = if u128::from(done) * 100 > u128::from(total) * 99 {
            total
        } else {
            done
        };
        self.begin(ProgressMode::Determinate, message, done, total);
    }

    /// Show an indeterminate activity indicator
    pub fn show_action(&self, message: &str) {
        if !self.accepts(None) {
            return;
        }
        self.begin(ProgressMode::Indeterminate, message, 0, 0);
    }

    /// Retire the current request. Idempotent.
    ///
    /// When an overlay thread is running this returns only after it has
    /// detached the overlay.
    pub fn cancel_action(&self) {
        {
            let mut request = lock(&self.shared.request);
            request.mode = ProgressMode::Off;
            self.shared.suspended.store(true, Ordering::SeqCst);
        }
        self.wait_detached();
    }

    /// Copy of the current request
    pub fn request(&self) -> ProgressRequest {
        lock(&self.shared.request).clone()
    }

    pub fn is_suspended(&self) -> bool {
        self.shared.suspended.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::SeqCst)
    }

    fn accepts(&self, total: Option<u64>) -> bool {
        if total.is_some_and(|t| t < self.min_total) {
            tracing::debug!("Progress request ignored: total below {}", self.min_total);
        } else if !self.gui.has_root() {
            tracing::warn!("Progress request ignored: no root window");
        } else if self.status.should_exit() {
            tracing::debug!("Progress request ignored: exit in progress");
        } else {
            return true;
        }
        self.metrics.record_overlay_ignored();
        false
    }

    fn active_mode(&self) -> ProgressMode {
        if self.is_suspended() {
            ProgressMode::Off
        } else {
            lock(&self.shared.request).mode
        }
    }

    fn begin(&self, mode: ProgressMode, message: &str, done: u64, total: u64) {
        let active = self.active_mode();
        if active != ProgressMode::Off && active != mode {
            self.cancel_action();
        }

        let mut request = lock(&self.shared.request);
        let fresh = self.shared.suspended.load(Ordering::SeqCst) || request.mode != mode;
        *request = ProgressRequest {
            mode,
            title: TITLE.to_string(),
            message: message.to_string(),
            done,
            total,
        };
        if fresh {
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.shared.suspended.store(false, Ordering::SeqCst);
            tracing::debug!("Progress request {} ({:?}): {}", generation, mode, message);
        }
    }

    fn wait_detached(&self) {
        if !self.shared.worker_running.load(Ordering::SeqCst) {
            return;
        }
        let deadline = Instant::now() + DETACH_TIMEOUT;
        while self.is_attached() {
            if Instant::now() >= deadline {
                tracing::warn!("Progress overlay did not detach within {:?}", DETACH_TIMEOUT);
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Where the overlay state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Idle,
    Pending,
    Visible,
}

#[derive(Debug)]
struct VisibleOverlay {
    generation: u64,
    window: WidgetId,
    previous_state: WidgetState,
    previous_focus: Option<WidgetId>,
    refreshes: u32,
    angle: u16,
    since_refresh: Duration,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Pending { generation: u64, waited: Duration },
    Visible(VisibleOverlay),
}

/// Overlay-thread side of the progress protocol
pub struct ProgressOverlay {
    handle: ProgressHandle,
    renderer: Arc<dyn Renderer>,
    state: StateManager,
    grace: Duration,
    refresh: Duration,
    phase: Phase,
}

impl ProgressOverlay {
    pub fn new(handle: ProgressHandle, renderer: Arc<dyn Renderer>, state: StateManager, config: &MenuConfig) -> Self {
        Self {
            handle,
            renderer,
            state,
            grace: config.overlay_grace(),
            refresh: config.overlay_refresh(),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        match self.phase {
            Phase::Idle => OverlayPhase::Idle,
            Phase::Pending { .. } => OverlayPhase::Pending,
            Phase::Visible(_) => OverlayPhase::Visible,
        }
    }

    /// Advance the state machine by `elapsed`
    pub fn poll(&mut self, elapsed: Duration) -> OverlayPhase {
        let generation = self.handle.generation();
        let live = self.is_live();

        self.phase = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle if live => Phase::Pending {
                generation,
                waited: Duration::ZERO,
            },
            Phase::Idle => Phase::Idle,
            Phase::Pending { .. } if !live => Phase::Idle,
            Phase::Pending { generation: pending, .. } if pending != generation => Phase::Pending {
                generation,
                waited: Duration::ZERO,
            },
            Phase::Pending { generation, waited } => {
                let waited = waited + elapsed;
                if waited < self.grace {
                    Phase::Pending { generation, waited }
                } else {
                    match self.attach(generation) {
                        Some(visible) => Phase::Visible(visible),
                        None => Phase::Idle,
                    }
                }
            }
            Phase::Visible(visible) if !live || visible.generation != generation => {
                self.detach(visible);
                Phase::Idle
            }
            Phase::Visible(mut visible) => {
                visible.since_refresh += elapsed;
                if visible.since_refresh >= self.refresh {
                    visible.since_refresh = Duration::ZERO;
                    self.refresh_widgets(&mut visible);
                }
                Phase::Visible(visible)
            }
        };
        self.phase()
    }

    /// Overlay thread body: poll until `stop` is set, then retire
    pub fn run(mut self, stop: &AtomicBool) {
        let interval = self.refresh.max(Duration::from_millis(1));
        self.handle.shared.worker_running.store(true, Ordering::SeqCst);
        tracing::info!("Progress overlay thread started");

        while !stop.load(Ordering::SeqCst) {
            self.poll(interval);
            thread::sleep(interval);
        }

        if let Phase::Visible(visible) = std::mem::replace(&mut self.phase, Phase::Idle) {
            self.detach(visible);
        }
        self.handle.shared.worker_running.store(false, Ordering::SeqCst);
        tracing::info!("Progress overlay thread stopped");
    }

    pub fn spawn(self) -> Result<OverlayWorker> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("emumenu-overlay".to_string())
            .spawn(move || self.run(&thread_stop))
            .context("Failed to spawn progress overlay thread")?;
        Ok(OverlayWorker {
            stop,
            handle: Some(handle),
        })
    }

    fn is_live(&self) -> bool {
        if self.handle.is_suspended() || self.handle.status.should_exit() {
            return false;
        }
        let request = self.handle.request();
        request.mode != ProgressMode::Off && !request.is_complete()
    }

    fn attach(&mut self, generation: u64) -> Option<VisibleOverlay> {
        let shared = &self.handle.shared;
        // Holding the request lock keeps a concurrent cancel from slipping
        // between the liveness check and the attach
        let request = lock(&shared.request);
        if shared.suspended.load(Ordering::SeqCst) || shared.generation.load(Ordering::SeqCst) != generation {
            return None;
        }

        let window = overlay_window(&request);
        let window_id = window.id();
        let guard = self.handle.gui.halt();
        let attached = guard.edit(|tree| {
            let previous_state = tree.set_root_state(WidgetState::Disabled)?;
            tree.append_to_root(window)?;
            let previous_focus = tree.change_focus(Some(window_id))?;
            Ok::<_, MenuError>((previous_state, previous_focus))
        });
        drop(guard);

        let (previous_state, previous_focus) = match attached {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!("Progress overlay not shown: {}", e);
                shared.suspended.store(true, Ordering::SeqCst);
                return None;
            }
        };
        shared.attached.store(true, Ordering::SeqCst);
        drop(request);

        tracing::info!("Progress overlay shown (request {})", generation);
        self.state.set_overlay_visible(true);
        self.handle.metrics.record_overlay_shown();
        self.draw();

        Some(VisibleOverlay {
            generation,
            window: window_id,
            previous_state,
            previous_focus,
            refreshes: 0,
            angle: 0,
            since_refresh: Duration::ZERO,
        })
    }

    fn detach(&mut self, visible: VisibleOverlay) {
        let guard = self.handle.gui.halt();
        guard.edit(|tree| {
            tree.remove(visible.window);
            // Only restore what the overlay changed; removal clears a focus
            // that still pointed at it
            let focus_intact = tree.root().is_some_and(|root| root.focus().is_none());
            if focus_intact {
                let _ = tree.set_root_state(visible.previous_state);
                let _ = tree.change_focus(visible.previous_focus);
            }
        });
        drop(guard);

        {
            // A finished determinate request is retired here so it cannot re-pend
            let mut request = lock(&self.handle.shared.request);
            if request.is_complete() && self.handle.generation() == visible.generation {
                request.mode = ProgressMode::Off;
                self.handle.shared.suspended.store(true, Ordering::SeqCst);
            }
        }
        self.handle.shared.attached.store(false, Ordering::SeqCst);

        tracing::info!("Progress overlay retired (request {})", visible.generation);
        self.state.set_overlay_visible(false);
    }

    fn refresh_widgets(&self, visible: &mut VisibleOverlay) {
        let request = self.handle.request();
        visible.refreshes = visible.refreshes.wrapping_add(1);
        if visible.refreshes % THROBBER_EVERY == 0 {
            visible.angle = (visible.angle + THROBBER_STEP) % 360;
        }
        let angle = visible.angle;

        self.handle.gui.with_tree(|tree| {
            if let Some(message) = tree.find_key_mut(MESSAGE_KEY) {
                message.set_text(request.message.as_str());
            }
            if let Some(bar) = tree.find_key_mut(BAR_KEY) {
                bar.kind = WidgetKind::ProgressBar {
                    fill: request.fraction(),
                };
            }
            if let Some(throbber) = tree.find_key_mut(THROBBER_KEY) {
                throbber.kind = WidgetKind::Throbber { angle };
            }
        });
        self.draw();
    }

    // The render thread may be blocked in a long task; the overlay keeps the
    // screen alive on its own
    fn draw(&self) {
        self.handle.gui.draw_if_running(|tree| {
            self.renderer.draw(tree);
            self.renderer.present();
        });
    }
}

fn overlay_window(request: &ProgressRequest) -> Widget {
    let indicator = match request.mode {
        ProgressMode::Determinate => Widget::progress_bar()
            .with_key(BAR_KEY)
            .with_rect(Rect::new(40, 110, 270, 24)),
        _ => Widget::throbber()
            .with_key(THROBBER_KEY)
            .with_rect(Rect::new(155, 95, 40, 40)),
    };
    let mut window = Widget::window(Rect::new(145, 150, 350, 180))
        .with_key(OVERLAY_KEY)
        .with_child(Widget::text(request.title.as_str()).with_rect(Rect::new(0, 10, 350, 30)))
        .with_child(
            Widget::text(request.message.as_str())
                .with_key(MESSAGE_KEY)
                .with_rect(Rect::new(0, 55, 350, 30)),
        )
        .with_child(indicator);
    if let Some(bar) = window.find_key_mut(BAR_KEY) {
        bar.kind = WidgetKind::ProgressBar {
            fill: request.fraction(),
        };
    }
    window
}

/// Running overlay thread; stops and joins on drop
pub struct OverlayWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl OverlayWorker {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Progress overlay thread panicked");
            }
        }
    }
}

impl Drop for OverlayWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
