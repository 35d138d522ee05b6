//! Paint: what a node draws into its arena slots.

use super::skin::BorderedBlock;
use crate::arena::{Slot, VertexKind};
use crate::geometry::Region;
use crate::render::{Surface, NINE_PATCH_SLOTS, QUAD_SLOTS};

/// The geometry a node draws.
///
/// Each variant needs a fixed number of arena slots; changing a node's paint
/// resizes its slot list to match.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Paint {
    /// Draws nothing. Layout-only containers and layer roots.
    #[default]
    None,
    /// A solid rectangle.
    Fill { color: [f32; 4] },
    /// An atlas rectangle stretched over the bounds.
    Image { source: Region },
    /// A 9-patch border with a solid center.
    Bordered { block: BorderedBlock, fill: [f32; 4] },
    /// A 9-patch border with nothing in the middle.
    Outline { block: BorderedBlock },
}

impl Paint {
    /// Arena slots this paint writes.
    pub const fn slot_count(&self) -> usize {
        match self {
            Paint::None => 0,
            Paint::Fill { .. } | Paint::Image { .. } => QUAD_SLOTS,
            Paint::Bordered { .. } | Paint::Outline { .. } => NINE_PATCH_SLOTS,
        }
    }

    /// Write this paint over `bounds` at depth `z`.
    pub fn write(&self, surface: &mut Surface, slots: &[Slot], bounds: Region, z: f32) {
        match *self {
            Paint::None => {}
            Paint::Fill { color } => {
                surface.write_quad(slots, bounds, z, VertexKind::Plain, color, None);
            }
            Paint::Image { source } => {
                surface.write_quad(slots, bounds, z, VertexKind::Skin, [1.0; 4], Some(source));
            }
            Paint::Bordered { block, fill } => {
                surface.write_nine_patch(slots, bounds, z, block.origin, block.thickness, Some(fill));
            }
            Paint::Outline { block } => {
                surface.write_nine_patch(slots, bounds, z, block.origin, block.thickness, None);
            }
        }
    }
}
