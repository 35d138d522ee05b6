//! # tessera
//!
//! The core of a retained-mode widget toolkit. Persistent widgets own GPU-facing
//! geometry and are re-laid-out and re-drawn incrementally.
//!
//! ## Core Systems
//!
//! - **[`arena`]**: pooled triangle slots with dirty-tracked vertex attributes
//! - **[`atlas`]**: best-fit texture atlas packing with growth and defragmentation
//! - **[`depth`]**: one front-to-back order from per-node ordering constraints
//! - **[`event`]**: hit-testing, bubbling dispatch, focus, capture, multi-click
//! - **[`dom`]**: slotmap-backed widget tree
//! - **[`render`]**: the graphics backend seam and geometry writers
//! - **[`widget`]** / **[`widgets`]**: the shared widget surface and built-in widgets
//! - **[`screen`]**: one surface's tree, geometry and router state
//! - **[`app`]**: configuration and the tokio event loop
//! - **[`testing`]**: the headless [`Pilot`](testing::Pilot)

// Foundation
pub mod error;
pub mod geometry;

// Resources
pub mod arena;
pub mod atlas;
pub mod depth;
pub mod dom;

// Widget system
pub mod widget;
pub mod widgets;

// Events
pub mod event;

// Rendering
pub mod render;

// Application
pub mod app;
pub mod screen;

// Testing
pub mod testing;

pub use app::{App, AppConfig};
pub use error::{Error, Result};
pub use screen::Screen;
