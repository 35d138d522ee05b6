//! Event system: platform input, named events, listeners, routing.

pub mod click;
pub mod focus;
pub mod handler;
pub mod hit;
pub mod input;
pub mod message;
pub mod router;

pub use click::{ClickConfig, ClickTracker};
pub use handler::{Listener, ListenerTable};
pub use input::{InputEvent, Key, KeyState, Modifiers, MouseButton};
pub use message::{Event, EventName, ParseEventNameError};
pub use router::PointerState;
