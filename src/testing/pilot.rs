//! Pilot: programmatic interaction with a headless App.
//!
//! Every input goes through the same path as the event loop: the item is
//! handled to completion and then the app redraws if anything changed.

use crate::app::{App, AppConfig, LoopItem};
use crate::event::input::{InputEvent, Key, KeyState, Modifiers, MouseButton};
use crate::render::HeadlessBackend;
use crate::screen::Screen;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// # Examples
///
/// ```ignore
/// use tessera::testing::Pilot;
///
/// let mut pilot = Pilot::new(320, 240);
/// let body = pilot.screen().body();
/// let ok = Button::new(pilot.screen_mut(), body, Region::new(10, 10, 60, 20));
/// pilot.click(20, 20);
/// assert_eq!(pilot.screen().focused(), Some(ok.id()));
/// ```
pub struct Pilot {
    app: App<HeadlessBackend>,
    tick: u64,
}

impl Pilot {
    /// Create a headless app with the given viewport size.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_config(AppConfig::default().with_viewport(width, height))
    }

    /// Create a Pilot from an [`AppConfig`].
    pub fn with_config(config: AppConfig) -> Self {
        Self { app: App::headless(config), tick: 0 }
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Send any input event.
    pub fn send(&mut self, input: InputEvent) {
        self.app.handle(LoopItem::Input(input));
        self.app.draw_if_dirty();
    }

    /// Move the pointer to (x, y).
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.send(InputEvent::PointerMoved { x, y });
    }

    /// Press the left button at (x, y).
    pub fn press(&mut self, x: i32, y: i32) {
        self.send(InputEvent::press(x, y));
    }

    /// Release the left button at (x, y).
    pub fn release(&mut self, x: i32, y: i32) {
        self.send(InputEvent::release(x, y));
    }

    /// Press and release the left button at (x, y).
    pub fn click(&mut self, x: i32, y: i32) {
        self.press(x, y);
        self.release(x, y);
    }

    /// Press and release a non-primary button at (x, y).
    pub fn click_with(&mut self, button: MouseButton, x: i32, y: i32) {
        let modifiers = Modifiers::NONE;
        self.send(InputEvent::PointerPressed { button, x, y, modifiers });
        self.send(InputEvent::PointerReleased { button, x, y, modifiers });
    }

    /// Press and release a key.
    pub fn key(&mut self, key: Key, modifiers: Modifiers) {
        self.send(InputEvent::Key { key, state: KeyState::Pressed, modifiers });
        self.send(InputEvent::Key { key, state: KeyState::Released, modifiers });
    }

    /// Deliver `text` as one text-input event.
    pub fn type_text(&mut self, text: &str) {
        self.send(InputEvent::Text(text.to_owned()));
    }

    /// Simulate a viewport resize.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.send(InputEvent::Resized { width, height });
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Advance the animation clock by `n` ticks, one at a time.
    pub fn tick(&mut self, n: u64) {
        for _ in 0..n {
            self.tick += 1;
            self.app.handle(LoopItem::Tick(self.tick));
            self.app.draw_if_dirty();
        }
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn screen(&self) -> &Screen {
        &self.app.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.app.screen
    }

    pub fn backend(&self) -> &HeadlessBackend {
        &self.app.backend
    }

    pub fn backend_mut(&mut self) -> &mut HeadlessBackend {
        &mut self.app.backend
    }

    pub fn app(&self) -> &App<HeadlessBackend> {
        &self.app
    }

    /// Render now if anything is dirty.
    pub fn settle(&mut self) {
        self.app.draw_if_dirty();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
