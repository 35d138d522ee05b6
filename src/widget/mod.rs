//! Widget system: the shared widget trait, paint and skin.

pub mod paint;
pub mod skin;
pub mod traits;

pub use paint::Paint;
pub use skin::{BorderedBlock, Skin};
pub use traits::{Widget, WidgetExt};
