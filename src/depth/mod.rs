//! Depth ordering: one consistent front-to-back order for drawing and
//! hit-testing, derived from per-node "render in front of" constraints.
//!
//! Primary content resolves first; the overlay layer (popups, menus) resolves
//! afterwards into an index range that starts well past the primary range.

pub mod resolver;

pub use resolver::{normalize, resolve_layers, resolve_tree, DepthLayers, DepthResolver};
