//! App struct: configuration, startup, and the event loop.
//!
//! [`App`] owns the [`Screen`] and the graphics [`Backend`]. All mutation
//! happens on the task that runs [`App::run`]: ticks from a spawned ticker
//! and translated platform input are taken one at a time, handled to
//! completion, and followed by a redraw if anything changed.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::arena::ArenaConfig;
use crate::atlas::AtlasConfig;
use crate::error::Result;
use crate::event::{ClickConfig, InputEvent};
use crate::geometry::Size;
use crate::render::{Backend, FrameStats, HeadlessBackend};
use crate::screen::Screen;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Optional window title.
    pub title: Option<String>,
    /// Initial surface size in pixels.
    pub viewport: Size,
    /// Period of the animation ticker.
    pub tick_interval: Duration,
    /// Geometry arena sizing.
    pub arena: ArenaConfig,
    /// Texture atlas sizing.
    pub atlas: AtlasConfig,
    /// Multi-click thresholds.
    pub click: ClickConfig,
    /// The overlay layer's depth range starts at this multiple of the body's
    /// node count.
    pub overlay_depth_factor: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            viewport: Size::new(640, 480),
            tick_interval: Duration::from_millis(13),
            arena: ArenaConfig::default(),
            atlas: AtlasConfig::default(),
            click: ClickConfig::default(),
            overlay_depth_factor: 2,
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the viewport size (builder).
    pub fn with_viewport(mut self, width: i32, height: i32) -> Self {
        self.viewport = Size::new(width, height);
        self
    }

    /// Set the ticker period (builder).
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the arena sizing (builder).
    pub fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }

    /// Set the atlas sizing (builder).
    pub fn with_atlas(mut self, atlas: AtlasConfig) -> Self {
        self.atlas = atlas;
        self
    }

    /// Set the multi-click thresholds (builder).
    pub fn with_click(mut self, click: ClickConfig) -> Self {
        self.click = click;
        self
    }

    /// Set the overlay depth factor (builder).
    pub fn with_overlay_depth_factor(mut self, factor: usize) -> Self {
        self.overlay_depth_factor = factor;
        self
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// One unit of work for the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopItem {
    /// Animation tick number, starting at 1.
    Tick(u64),
    Input(InputEvent),
}

/// The main application struct.
pub struct App<B: Backend = HeadlessBackend> {
    /// The widget tree and everything drawn from it.
    pub screen: Screen,
    /// Graphics context.
    pub backend: B,
    /// Application configuration.
    pub config: AppConfig,
    /// Whether the app is still running.
    running: bool,
    frames: usize,
}

impl<B: Backend> App<B> {
    pub fn new(config: AppConfig, backend: B) -> Self {
        Self {
            screen: Screen::new(&config),
            backend,
            config,
            running: true,
            frames: 0,
        }
    }

    /// Handle one loop item to completion.
    pub fn handle(&mut self, item: LoopItem) {
        match item {
            LoopItem::Tick(tick) => self.screen.handle_tick(tick),
            LoopItem::Input(InputEvent::Quit) => self.running = false,
            LoopItem::Input(input) => self.screen.handle_input(&input),
        }
    }

    /// Fit the viewport to the display, then claim the context once, upload
    /// the initial arena and atlas, and release.
    ///
    /// A failed display-mode query is logged and the configured viewport kept.
    pub fn startup(&mut self) -> Result<()> {
        match self.backend.display_size() {
            Ok(display_size) => {
                let viewport = self.screen.viewport();
                let fitted = Size::new(viewport.width.min(display_size.width), viewport.height.min(display_size.height));
                if fitted != viewport {
                    tracing::debug!(?viewport, display = ?display_size, "viewport clamped to display");
                    self.screen.resize(fitted.width, fitted.height);
                }
            }
            Err(err) => tracing::warn!(error = %err, "display mode unavailable, keeping configured viewport"),
        }
        let stats = self.screen.render(&mut self.backend)?;
        self.frames += 1;
        tracing::debug!(vertices = stats.vertices, "initial state uploaded");
        Ok(())
    }

    /// Render if anything changed since the last frame.
    ///
    /// A frame that fails is logged and abandoned; everything it would have
    /// uploaded stays dirty for the next attempt.
    pub fn draw_if_dirty(&mut self) -> Option<FrameStats> {
        if !self.screen.needs_redraw() {
            return None;
        }
        match self.screen.render(&mut self.backend) {
            Ok(stats) => {
                self.frames += 1;
                Some(stats)
            }
            Err(err) => {
                tracing::warn!(error = %err, "frame abandoned");
                None
            }
        }
    }

    /// Frames drawn so far, including the startup upload.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Whether the app should quit.
    pub fn should_quit(&self) -> bool {
        !self.running
    }

    /// Request the app to quit.
    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// Run the event loop until `InputEvent::Quit` arrives or `input` closes.
    ///
    /// The ticker task is spawned first but does not start counting until
    /// startup has finished with the graphics context.
    pub async fn run(&mut self, mut input: mpsc::Receiver<InputEvent>) -> Result<()> {
        let (ready_tx, ready_rx) = oneshot::channel::<()>();
        let (tick_tx, mut ticks) = mpsc::channel::<u64>(8);
        let period = self.config.tick_interval;

        let ticker = tokio::spawn(async move {
            if ready_rx.await.is_err() {
                return;
            }
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut tick = 0u64;
            loop {
                interval.tick().await;
                tick += 1;
                if tick_tx.send(tick).await.is_err() {
                    break;
                }
            }
        });

        if let Err(err) = self.startup() {
            ticker.abort();
            return Err(err);
        }
        // The ticker only exits early if it was aborted.
        let _ = ready_tx.send(());
        tracing::info!(title = ?self.config.title, "event loop started");

        while self.running {
            let item = tokio::select! {
                biased;
                received = input.recv() => match received {
                    Some(event) => LoopItem::Input(event),
                    None => break,
                },
                Some(tick) = ticks.recv() => LoopItem::Tick(tick),
            };
            self.handle(item);
            if self.running {
                self.draw_if_dirty();
            }
        }

        ticker.abort();
        tracing::info!(frames = self.frames, "event loop stopped");
        Ok(())
    }
}

impl App<HeadlessBackend> {
    /// Create an app that renders into a [`HeadlessBackend`].
    pub fn headless(config: AppConfig) -> Self {
        Self::new(config, HeadlessBackend::new())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::event::{Key, Modifiers};
    use crate::geometry::Region;
    use crate::widgets::Button;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio_test::assert_ok;

    // ── AppConfig ────────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(13));
        assert_eq!(config.arena.initial_slots, 2);
        assert_eq!(config.atlas.width, 128);
        assert_eq!(config.click.max_ticks, 15);
        assert_eq!(config.overlay_depth_factor, 2);
    }

    #[test]
    fn config_builders_chain() {
        let config = AppConfig::new()
            .with_title("demo")
            .with_viewport(800, 600)
            .with_tick_interval(Duration::from_millis(5))
            .with_overlay_depth_factor(3);
        assert_eq!(config.title.as_deref(), Some("demo"));
        assert_eq!(config.viewport, Size::new(800, 600));
        assert_eq!(config.overlay_depth_factor, 3);
    }

    // ── handle / draw ────────────────────────────────────────────────

    #[test]
    fn quit_input_stops_the_app() {
        let mut app = App::headless(AppConfig::default());
        assert!(!app.should_quit());
        app.handle(LoopItem::Input(InputEvent::Quit));
        assert!(app.should_quit());
    }

    #[test]
    fn ticks_reach_the_screen() {
        let mut app = App::headless(AppConfig::default());
        app.handle(LoopItem::Tick(7));
        assert_eq!(app.screen.tick(), 7);
    }

    #[test]
    fn draw_only_when_dirty() {
        let mut app = App::headless(AppConfig::default());
        assert_ok!(app.startup());
        assert_eq!(app.draw_if_dirty(), None);

        let body = app.screen.body();
        Button::new(&mut app.screen, body, Region::new(0, 0, 40, 20));
        assert!(app.draw_if_dirty().is_some());
        assert_eq!(app.frames(), 2);
    }

    #[test]
    fn startup_fits_viewport_to_display() {
        let config = AppConfig::default().with_viewport(4000, 600);
        let backend = HeadlessBackend::new().with_display(Some(Size::new(1920, 1080)));
        let mut app = App::new(config, backend);
        assert_ok!(app.startup());
        assert_eq!(app.screen.viewport(), Size::new(1920, 600));
    }

    #[test]
    fn startup_survives_display_query_failure() {
        let config = AppConfig::default().with_viewport(4000, 600);
        let mut app = App::new(config, HeadlessBackend::new().with_display(None));
        assert_ok!(app.startup());
        assert_eq!(app.screen.viewport(), Size::new(4000, 600));
        assert_eq!(app.frames(), 1);
    }

    #[test]
    fn failed_frame_is_retried() {
        let mut app = App::headless(AppConfig::default());
        app.backend.fail_context(true);
        assert_eq!(app.draw_if_dirty(), None);
        assert!(app.screen.needs_redraw());
        app.backend.fail_context(false);
        assert!(app.draw_if_dirty().is_some());
    }

    // ── run ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn run_handles_input_until_quit() {
        let mut app = App::headless(AppConfig::default());
        let body = app.screen.body();
        let button = Button::new(&mut app.screen, body, Region::new(10, 10, 40, 20));
        let clicks = Rc::new(Cell::new(0));
        let seen = clicks.clone();
        button.on_click(&mut app.screen, move |_, _| seen.set(seen.get() + 1));

        let (tx, rx) = mpsc::channel(16);
        assert_ok!(tx.send(InputEvent::press(20, 20)).await);
        assert_ok!(tx.send(InputEvent::release(20, 20)).await);
        assert_ok!(tx.send(InputEvent::Quit).await);

        assert_ok!(app.run(rx).await);
        assert_eq!(clicks.get(), 1);
        assert!(app.should_quit());
        assert!(app.frames() >= 1);
    }

    #[tokio::test]
    async fn run_ends_when_input_closes() {
        let mut app = App::headless(AppConfig::default());
        let (tx, rx) = mpsc::channel(4);
        assert_ok!(tx.send(InputEvent::key(Key::Tab, Modifiers::NONE)).await);
        drop(tx);
        assert_ok!(app.run(rx).await);
        assert!(!app.should_quit());
        assert_eq!(app.frames(), 1);
    }

    #[tokio::test]
    async fn startup_failure_is_reported() {
        let mut app = App::headless(AppConfig::default());
        app.backend.fail_context(true);
        let (_tx, rx) = mpsc::channel(1);
        let result = app.run(rx).await;
        assert!(matches!(result, Err(Error::ContextUnavailable(_))));
    }
}
