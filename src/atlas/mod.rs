//! Texture atlas: best-fit packing, growth and defragmentation of pixel
//! rectangles on one shared canvas.
//!
//! Skins and images are packed here once, at widget construction, and the
//! canvas is uploaded as a single texture. The canvas only ever grows by
//! doubling one dimension; released rectangles are merged back into the free
//! set so later requests can reuse the space.

mod defrag;
pub mod export;
pub mod packer;

pub use packer::Atlas;

/// Sizing policy for an [`Atlas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Initial canvas width in pixels.
    pub width: i32,
    /// Initial canvas height in pixels.
    pub height: i32,
    /// Bytes per pixel: 4 for RGBA skins, 1 for glyph coverage.
    pub components: usize,
    /// Upper bound on partial-edge moves per defragmentation.
    pub defrag_iterations: usize,
}

impl AtlasConfig {
    pub fn new() -> Self {
        Self { width: 128, height: 128, components: 4, defrag_iterations: 256 }
    }

    /// Set the initial canvas size (builder).
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the bytes per pixel (builder).
    pub fn with_components(mut self, components: usize) -> Self {
        self.components = components;
        self
    }

    /// Set the defragmentation iteration cap (builder).
    pub fn with_defrag_iterations(mut self, iterations: usize) -> Self {
        self.defrag_iterations = iterations;
        self
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self::new()
    }
}
