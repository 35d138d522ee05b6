//! Named events and the payload passed to listeners.

use std::fmt;
use std::str::FromStr;

use super::input::{Key, Modifiers, MouseButton};
use crate::dom::NodeId;
use crate::geometry::{Offset, Region};

// ---------------------------------------------------------------------------
// EventName
// ---------------------------------------------------------------------------

/// The router's event vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseEnter,
    MouseLeave,
    KeyDown,
    KeyUp,
    KeyPress,
    TextInput,
    Focus,
    Blur,
    Click,
    DoubleClick,
    TripleClick,
    Wheel,
    /// Animation tick. Delivered to every listening node, never bubbled.
    Tick,
}

impl EventName {
    pub const ALL: [EventName; 16] = [
        EventName::MouseDown,
        EventName::MouseUp,
        EventName::MouseMove,
        EventName::MouseEnter,
        EventName::MouseLeave,
        EventName::KeyDown,
        EventName::KeyUp,
        EventName::KeyPress,
        EventName::TextInput,
        EventName::Focus,
        EventName::Blur,
        EventName::Click,
        EventName::DoubleClick,
        EventName::TripleClick,
        EventName::Wheel,
        EventName::Tick,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventName::MouseDown => "mousedown",
            EventName::MouseUp => "mouseup",
            EventName::MouseMove => "mousemove",
            EventName::MouseEnter => "mouseenter",
            EventName::MouseLeave => "mouseleave",
            EventName::KeyDown => "keydown",
            EventName::KeyUp => "keyup",
            EventName::KeyPress => "keypress",
            EventName::TextInput => "textinput",
            EventName::Focus => "focus",
            EventName::Blur => "blur",
            EventName::Click => "click",
            EventName::DoubleClick => "doubleclick",
            EventName::TripleClick => "tripleclick",
            EventName::Wheel => "wheel",
            EventName::Tick => "tick",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a name outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event name {0:?}")]
pub struct ParseEventNameError(pub String);

impl FromStr for EventName {
    type Err = ParseEventNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ParseEventNameError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// The payload handed to a listener.
///
/// Listeners may stop the bubbling walk entirely, or let it continue up to a
/// given ancestor and no further.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Pointer position in window pixels.
    pub x: i32,
    pub y: i32,
    /// Wheel delta.
    pub dx: i32,
    pub dy: i32,
    pub button: Option<MouseButton>,
    pub key: Option<Key>,
    pub text: Option<String>,
    pub modifiers: Modifiers,
    /// Animation tick at dispatch time.
    pub tick: u64,
    /// Whether the event came from the keyboard.
    pub from_keyboard: bool,
    stopped: bool,
    stop_at: Option<NodeId>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pointer event at (x, y).
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y, ..Self::default() }
    }

    /// A keyboard event.
    pub fn keyboard(key: Key, modifiers: Modifiers) -> Self {
        Self { key: Some(key), modifiers, from_keyboard: true, ..Self::default() }
    }

    /// Set the pointer button (builder).
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    /// Set the modifiers (builder).
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the tick (builder).
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    /// Let the walk reach `ancestor` but nothing above it (builder).
    pub fn with_stop_at(mut self, ancestor: NodeId) -> Self {
        self.stop_at = Some(ancestor);
        self
    }

    /// No ancestor sees this event after the current listener.
    pub fn stop_bubbling(&mut self) {
        self.stopped = true;
    }

    /// `ancestor`'s listener still runs; nothing above it does.
    pub fn stop_at(&mut self, ancestor: NodeId) {
        self.stop_at = Some(ancestor);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stop_target(&self) -> Option<NodeId> {
        self.stop_at
    }

    /// The pointer position.
    pub fn position(&self) -> Offset {
        Offset::new(self.x, self.y)
    }

    /// The pointer position relative to the top-left of `bounds`.
    pub fn local_position(&self, bounds: Region) -> Offset {
        self.position() - bounds.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_strings() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>(), Ok(name));
        }
        assert_eq!(
            "dblclick".parse::<EventName>(),
            Err(ParseEventNameError("dblclick".to_string()))
        );
        assert_eq!(EventName::DoubleClick.to_string(), "doubleclick");
    }

    #[test]
    fn stop_flags() {
        let mut evt = Event::at(4, 5);
        assert!(!evt.is_stopped());
        evt.stop_bubbling();
        assert!(evt.is_stopped());
        assert_eq!(evt.local_position(Region::new(1, 1, 10, 10)), Offset::new(3, 4));
    }
}
