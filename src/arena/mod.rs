//! Geometry arena: pooled triangle slots with dirty-tracked vertex attributes.
//!
//! Widgets allocate slots when they are built, write positions, colors and
//! texture coordinates into them through the attribute buffers, and hand them
//! back when they are deleted. The arena never runs out: an allocation that
//! cannot be served from the free list grows every buffer first.

pub mod buffer;
pub mod slots;

pub use buffer::{Attribute, AttributeBuffer, VertexKind, VERTICES_PER_SLOT};
pub use slots::{GeometryArena, Slot};

/// Sizing policy for a [`GeometryArena`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaConfig {
    /// Slots available before the first growth.
    pub initial_slots: usize,
    /// Capacity multiplier applied on each growth.
    pub growth_factor: f64,
}

impl ArenaConfig {
    pub fn new() -> Self {
        Self { initial_slots: 2, growth_factor: 2.0 }
    }

    /// Set the initial slot count (builder).
    pub fn with_initial_slots(mut self, slots: usize) -> Self {
        self.initial_slots = slots;
        self
    }

    /// Set the growth multiplier (builder).
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
