//! The built-in skin: bordered blocks packed into the atlas at startup.

use crate::atlas::Atlas;
use crate::geometry::{Offset, Region};

/// A square 9-patch source in the atlas.
///
/// The block is `2 * thickness + 1` texels on a side: the corners are
/// `thickness` square and the single middle row and column stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderedBlock {
    pub origin: Offset,
    pub thickness: i32,
}

impl BorderedBlock {
    pub const fn new(origin: Offset, thickness: i32) -> Self {
        Self { origin, thickness }
    }

    /// Side length in texels.
    pub const fn side(&self) -> i32 {
        2 * self.thickness + 1
    }

    /// The atlas rectangle the block occupies.
    pub const fn region(&self) -> Region {
        Region::new(self.origin.x, self.origin.y, self.side(), self.side())
    }
}

/// Panel fill color.
pub const PANEL_FILL: [f32; 4] = [0.16, 0.17, 0.20, 1.0];
/// Button fill color.
pub const BUTTON_FILL: [f32; 4] = [0.25, 0.28, 0.34, 1.0];
/// Pressed button fill color.
pub const BUTTON_PRESSED_FILL: [f32; 4] = [0.18, 0.20, 0.25, 1.0];

/// The blocks every built-in widget draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub panel: BorderedBlock,
    pub button: BorderedBlock,
    pub button_pressed: BorderedBlock,
    pub focus: BorderedBlock,
}

impl Skin {
    /// Rasterize the procedural skin and pack it into `atlas`.
    pub fn build(atlas: &mut Atlas) -> Self {
        let panel = pack(atlas, 2, [0x3a, 0x3d, 0x45, 0xff], [0x29, 0x2b, 0x33, 0xff]);
        let button = pack(atlas, 3, [0x5b, 0x63, 0x75, 0xff], [0x40, 0x47, 0x57, 0xff]);
        let button_pressed = pack(atlas, 3, [0x2e, 0x33, 0x3d, 0xff], [0x2e, 0x33, 0x40, 0xff]);
        let focus = pack(atlas, 2, [0x4d, 0x9d, 0xff, 0xff], [0, 0, 0, 0]);
        tracing::debug!(width = atlas.width(), height = atlas.height(), "skin packed");
        Self { panel, button, button_pressed, focus }
    }
}

/// Rasterize one block: `border` everywhere except the stretchable center texel.
fn pack(atlas: &mut Atlas, thickness: i32, border: [u8; 4], center: [u8; 4]) -> BorderedBlock {
    let side = 2 * thickness + 1;
    let components = atlas.components();
    let mut pixels = Vec::with_capacity((side * side) as usize * components);
    for y in 0..side {
        for x in 0..side {
            let rgba = if x == thickness && y == thickness { center } else { border };
            pixels.extend(texel(rgba, components));
        }
    }
    let origin = atlas.build_bordered(&pixels, thickness);
    BorderedBlock::new(origin, thickness)
}

fn texel(rgba: [u8; 4], components: usize) -> Vec<u8> {
    match components {
        1 => vec![rgba[3]],
        3 => rgba[..3].to_vec(),
        n => rgba.iter().copied().cycle().take(n).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasConfig;

    #[test]
    fn skin_blocks_do_not_overlap() {
        let mut atlas = Atlas::default();
        let skin = Skin::build(&mut atlas);
        let blocks = [skin.panel, skin.button, skin.button_pressed, skin.focus];
        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                assert!(!a.region().overlaps(b.region()), "{a:?} overlaps {b:?}");
            }
        }
        assert_eq!(atlas.placed_rects().len(), 4);
    }

    #[test]
    fn center_texel_differs_from_border() {
        let mut atlas = Atlas::default();
        let skin = Skin::build(&mut atlas);
        let o = skin.button.origin;
        assert_eq!(atlas.pixel(o.x, o.y), &[0x5b, 0x63, 0x75, 0xff]);
        assert_eq!(atlas.pixel(o.x + 3, o.y + 3), &[0x40, 0x47, 0x57, 0xff]);
    }

    #[test]
    fn single_channel_atlas() {
        let mut atlas = Atlas::new(AtlasConfig::default().with_components(1));
        let skin = Skin::build(&mut atlas);
        assert_eq!(atlas.pixel(skin.focus.origin.x + 2, skin.focus.origin.y + 2), &[0]);
    }
}
