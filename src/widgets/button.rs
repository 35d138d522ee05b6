//! Button widget: a focusable, pressable bordered block.
//!
//! The button swaps to its pressed skin while the left button is held on it,
//! shows the focus outline while focused, and turns Enter or Space into a
//! click when it has focus.

use crate::dom::{NodeData, NodeId};
use crate::event::{Event, EventName, Key};
use crate::geometry::Region;
use crate::render::CursorKind;
use crate::screen::Screen;
use crate::widget::skin::{BUTTON_FILL, BUTTON_PRESSED_FILL};
use crate::widget::{Paint, Widget};

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// An interactive button.
///
/// # Examples
///
/// ```ignore
/// let ok = Button::new(&mut screen, body, Region::new(10, 10, 80, 24));
/// ok.on_click(&mut screen, |_, screen| screen.delete(dialog));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    id: NodeId,
}

impl Button {
    /// Create a button under `parent`.
    pub fn new(screen: &mut Screen, parent: NodeId, bounds: Region) -> Self {
        let skin = screen.skin();
        let released = Paint::Bordered { block: skin.button, fill: BUTTON_FILL };
        let pressed = Paint::Bordered { block: skin.button_pressed, fill: BUTTON_PRESSED_FILL };
        let data = NodeData::new("Button")
            .with_bounds(bounds)
            .with_paint(released)
            .with_cursor(CursorKind::Hand);
        let id = screen.spawn(parent, data);

        screen.on(id, EventName::Focus, move |_, screen| screen.show_focus_indicator(id));
        screen.on(id, EventName::Blur, move |_, screen| {
            if screen.focus_indicator_anchor() == Some(id) {
                screen.hide_focus_indicator();
            }
        });
        screen.on(id, EventName::MouseDown, move |_, screen| screen.set_paint(id, pressed));
        screen.on(id, EventName::MouseUp, move |_, screen| screen.set_paint(id, released));
        screen.on(id, EventName::KeyPress, move |evt, screen| {
            if let Some(key @ (Key::Enter | Key::Space)) = evt.key {
                let mut click = Event::keyboard(key, evt.modifiers).with_tick(evt.tick);
                screen.trigger(id, EventName::Click, &mut click);
            }
        });

        Self { id }
    }

    /// Run `handler` whenever the button is clicked, by pointer or keyboard.
    pub fn on_click<F>(&self, screen: &mut Screen, handler: F)
    where
        F: Fn(&mut Event, &mut Screen) + 'static,
    {
        screen.on(self.id, EventName::Click, handler);
    }

    /// Enable or disable the button. Disabled buttons never take focus.
    pub fn set_enabled(&self, screen: &mut Screen, enabled: bool) {
        screen.set_enabled(self.id, enabled);
    }

    /// Whether the button is showing its pressed skin.
    pub fn is_pressed(&self, screen: &Screen) -> bool {
        let pressed = screen.skin().button_pressed;
        screen
            .dom()
            .get(self.id)
            .is_some_and(|d| matches!(d.paint, Paint::Bordered { block, .. } if block == pressed))
    }
}

impl Widget for Button {
    fn id(&self) -> NodeId {
        self.id
    }

    fn widget_type(&self) -> &'static str {
        "Button"
    }
}

// ===========================================================================
// Tests
// ===========================================================================
