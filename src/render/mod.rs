//! Rendering: the backend seam and the geometry writers built on it.

pub mod backend;
pub mod surface;

pub use backend::{Backend, BackendCall, CursorKind, HeadlessBackend};
pub use surface::{Surface, NINE_PATCH_SLOTS, QUAD_SLOTS};

/// What one frame sent to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Vertex attribute buffers uploaded (0 to 4).
    pub buffers_uploaded: usize,
    /// Whether the atlas texture was uploaded.
    pub texture_uploaded: bool,
    /// Vertices covered by the draw call.
    pub vertices: usize,
}
