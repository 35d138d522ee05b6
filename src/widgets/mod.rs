//! Built-in widgets: Panel, ImageView, Button, Popup, and the focus indicator.

pub mod button;
pub mod focus_rect;
pub mod image;
pub mod panel;
pub mod popup;

pub use button::Button;
pub use focus_rect::FocusIndicator;
pub use image::ImageView;
pub use panel::Panel;
pub use popup::Popup;
