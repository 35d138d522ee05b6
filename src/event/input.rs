//! Input events delivered by the platform adapter.
//!
//! The adapter that owns the native window translates its messages into
//! [`InputEvent`]s and feeds them to the event loop. Everything past this
//! point is platform independent.

use std::ops::{BitAnd, BitOr};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, independent of any windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn shift(self) -> bool {
        self.contains(Modifiers::SHIFT)
    }

    pub fn ctrl(self) -> bool {
        self.contains(Modifiers::CTRL)
    }

    pub fn alt(self) -> bool {
        self.contains(Modifiers::ALT)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Buttons and key state
// ---------------------------------------------------------------------------

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    /// Auto-repeat while held.
    Repeat,
    Released,
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// One translated platform input message. Coordinates are window pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PointerMoved { x: i32, y: i32 },
    PointerPressed { button: MouseButton, x: i32, y: i32, modifiers: Modifiers },
    PointerReleased { button: MouseButton, x: i32, y: i32, modifiers: Modifiers },
    Wheel { x: i32, y: i32, dx: i32, dy: i32, modifiers: Modifiers },
    Key { key: Key, state: KeyState, modifiers: Modifiers },
    Text(String),
    /// The pointer left the window.
    PointerLeft,
    /// The pointer re-entered the window at (x, y).
    PointerEntered { x: i32, y: i32 },
    WindowFocusLost,
    WindowFocusGained,
    Resized { width: i32, height: i32 },
    /// Stop the event loop.
    Quit,
}

impl InputEvent {
    /// A left-button press with no modifiers.
    pub fn press(x: i32, y: i32) -> Self {
        InputEvent::PointerPressed { button: MouseButton::Left, x, y, modifiers: Modifiers::NONE }
    }

    /// A left-button release with no modifiers.
    pub fn release(x: i32, y: i32) -> Self {
        InputEvent::PointerReleased { button: MouseButton::Left, x, y, modifiers: Modifiers::NONE }
    }

    /// A key press.
    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        InputEvent::Key { key, state: KeyState::Pressed, modifiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_combine() {
        let m = Modifiers::SHIFT | Modifiers::ALT;
        assert!(m.shift());
        assert!(m.alt());
        assert!(!m.ctrl());
        assert_eq!(m & Modifiers::SHIFT, Modifiers::SHIFT);
        assert!(Modifiers::NONE.contains(Modifiers::NONE));
    }

    #[test]
    fn shorthand_constructors() {
        assert_eq!(
            InputEvent::press(3, 4),
            InputEvent::PointerPressed { button: MouseButton::Left, x: 3, y: 4, modifiers: Modifiers::NONE }
        );
        assert!(matches!(
            InputEvent::key(Key::Tab, Modifiers::SHIFT),
            InputEvent::Key { key: Key::Tab, state: KeyState::Pressed, .. }
        ));
    }
}
