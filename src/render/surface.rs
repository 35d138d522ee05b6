//! Geometry writers: turn pixel rectangles into arena triangles.
//!
//! A [`Surface`] pairs the geometry arena with the texture atlas and knows the
//! viewport size, so it can convert widget bounds into clip space. Widgets
//! never touch attribute buffers directly; they describe a quad or a 9-patch
//! and the surface writes the slots.

use super::backend::Backend;
use super::FrameStats;
use crate::arena::{ArenaConfig, GeometryArena, Slot, VertexKind};
use crate::atlas::{Atlas, AtlasConfig};
use crate::error::Result;
use crate::geometry::{Offset, Region, Size};

/// Slots written by [`Surface::write_quad`].
pub const QUAD_SLOTS: usize = 2;
/// Slots written by [`Surface::write_nine_patch`].
pub const NINE_PATCH_SLOTS: usize = 18;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Arena, atlas and viewport for one rendering surface.
#[derive(Debug)]
pub struct Surface {
    arena: GeometryArena,
    atlas: Atlas,
    viewport: Size,
}

impl Surface {
    pub fn new(arena: ArenaConfig, atlas: AtlasConfig, viewport: Size) -> Self {
        Self {
            arena: GeometryArena::new(arena),
            atlas: Atlas::new(atlas),
            viewport,
        }
    }

    pub fn arena(&self) -> &GeometryArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut GeometryArena {
        &mut self.arena
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn atlas_mut(&mut self) -> &mut Atlas {
        &mut self.atlas
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Change the viewport. Existing geometry keeps its old clip-space
    /// positions until it is written again.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Pixel coordinates to clip space, y pointing up.
    pub fn to_clip(&self, x: i32, y: i32) -> (f32, f32) {
        let w = self.viewport.width.max(1) as f32;
        let h = self.viewport.height.max(1) as f32;
        (2.0 * x as f32 / w - 1.0, 1.0 - 2.0 * y as f32 / h)
    }

    // -----------------------------------------------------------------------
    // Writers
    // -----------------------------------------------------------------------

    /// Write `rect` as two triangles at depth `z`.
    ///
    /// `tex` is the atlas rectangle sampled across the quad, in texel units.
    ///
    /// # Panics
    ///
    /// Panics unless exactly [`QUAD_SLOTS`] slots are given.
    pub fn write_quad(
        &mut self,
        slots: &[Slot],
        rect: Region,
        z: f32,
        kind: VertexKind,
        color: [f32; 4],
        tex: Option<Region>,
    ) {
        assert_eq!(slots.len(), QUAD_SLOTS, "a quad takes {QUAD_SLOTS} slots");
        let (left, top) = self.to_clip(rect.x, rect.y);
        let (right, bottom) = self.to_clip(rect.right(), rect.bottom());
        let corners = [[left, top], [right, top], [left, bottom], [right, bottom]];

        let tex = tex.unwrap_or(Region::EMPTY);
        let (u0, v0) = (tex.x as f32, tex.y as f32);
        let (u1, v1) = (tex.right() as f32, tex.bottom() as f32);
        let uvs = [[u0, v0], [u1, v0], [u0, v1], [u1, v1]];

        // Triangles (tl, tr, bl) and (tr, br, bl).
        const TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [1, 3, 2]];
        for (&slot, corner_ids) in slots.iter().zip(TRIANGLES) {
            for (vertex, &c) in corner_ids.iter().enumerate() {
                let [x, y] = corners[c];
                self.arena.position_mut().set_vertex(slot, vertex, &[x, y, z]);
                self.arena.tex_coord_mut().set_vertex(slot, vertex, &uvs[c]);
            }
            self.arena.color_mut().set_all_vertices(slot, &color);
            self.arena.set_kind(slot, kind);
        }
    }

    /// Write `rect` as a 3×3 grid of quads sampled from a bordered block.
    ///
    /// The block's top-left texel is `origin` and its borders are `thickness`
    /// texels wide; the corners keep their size on screen while the edges and
    /// center stretch. A rect too small for both borders squeezes the corners
    /// to half its size instead. Cell `(row, col)` uses slots `(row * 3 + col) * 2` and
    /// the one after. The center cell is a plain fill of `center`, or hidden
    /// when `center` is `None`.
    ///
    /// # Panics
    ///
    /// Panics unless exactly [`NINE_PATCH_SLOTS`] slots are given.
    pub fn write_nine_patch(
        &mut self,
        slots: &[Slot],
        rect: Region,
        z: f32,
        origin: Offset,
        thickness: i32,
        center: Option<[f32; 4]>,
    ) {
        assert_eq!(slots.len(), NINE_PATCH_SLOTS, "a 9-patch takes {NINE_PATCH_SLOTS} slots");
        let t = thickness;
        // On screen a border never takes more than half the rect.
        let tx = t.min(rect.width / 2).max(0);
        let ty = t.min(rect.height / 2).max(0);
        let xs = [rect.x, rect.x + tx, rect.right() - tx, rect.right()];
        let ys = [rect.y, rect.y + ty, rect.bottom() - ty, rect.bottom()];
        let us = [origin.x, origin.x + t, origin.x + t + 1, origin.x + 2 * t + 1];
        let vs = [origin.y, origin.y + t, origin.y + t + 1, origin.y + 2 * t + 1];

        for row in 0..3 {
            for col in 0..3 {
                let first = (row * 3 + col) * 2;
                let cell_slots = &slots[first..first + QUAD_SLOTS];
                let cell = Region::new(xs[col], ys[row], xs[col + 1] - xs[col], ys[row + 1] - ys[row]);
                let tex = Region::new(us[col], vs[row], us[col + 1] - us[col], vs[row + 1] - vs[row]);
                if row == 1 && col == 1 {
                    match center {
                        Some(fill) => self.write_quad(cell_slots, cell, z, VertexKind::Plain, fill, None),
                        None => self.hide(cell_slots),
                    }
                } else {
                    self.write_quad(cell_slots, cell, z, VertexKind::Skin, WHITE, Some(tex));
                }
            }
        }
    }

    /// Stop drawing `slots` without releasing them.
    pub fn hide(&mut self, slots: &[Slot]) {
        for &slot in slots {
            self.arena.hide(slot);
        }
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    /// Whether a sync would upload anything.
    pub fn is_dirty(&self) -> bool {
        self.arena.is_dirty() || self.atlas.is_dirty()
    }

    /// Upload dirty arena buffers and the atlas texture, then bind the arena.
    pub fn sync(&mut self, backend: &mut dyn Backend) -> Result<FrameStats> {
        let buffers_uploaded = self.arena.sync(backend)?;
        let texture_uploaded = self.atlas.sync(backend)?;
        self.arena.bind(backend);
        Ok(FrameStats {
            buffers_uploaded,
            texture_uploaded,
            vertices: self.arena.vertex_count(),
        })
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(ArenaConfig::default(), AtlasConfig::default(), Size::new(640, 480))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BackendCall, HeadlessBackend};
    use pretty_assertions::assert_eq;

    fn surface() -> Surface {
        Surface::new(ArenaConfig::default(), AtlasConfig::default(), Size::new(200, 100))
    }

    #[test]
    fn clip_space_corners() {
        let s = surface();
        assert_eq!(s.to_clip(0, 0), (-1.0, 1.0));
        assert_eq!(s.to_clip(200, 100), (1.0, -1.0));
        assert_eq!(s.to_clip(100, 50), (0.0, 0.0));
    }

    #[test]
    fn quad_covers_rect() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(QUAD_SLOTS);
        s.write_quad(&slots, Region::new(0, 0, 100, 50), 0.5, VertexKind::Plain, [1.0, 0.0, 0.0, 1.0], None);

        let pos = s.arena().position();
        assert_eq!(pos.vertex(slots[0], 0), &[-1.0, 1.0, 0.5]);
        assert_eq!(pos.vertex(slots[0], 1), &[0.0, 1.0, 0.5]);
        assert_eq!(pos.vertex(slots[1], 1), &[0.0, 0.0, 0.5]);
        assert_eq!(s.arena().kind_of(slots[1], 2), VertexKind::Plain);
        assert_eq!(s.arena().color().vertex(slots[1], 0), &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn quad_tex_coords_are_texels() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(QUAD_SLOTS);
        s.write_quad(&slots, Region::new(0, 0, 10, 10), 0.0, VertexKind::Skin, WHITE, Some(Region::new(4, 8, 3, 2)));
        let tex = s.arena().tex_coord();
        assert_eq!(tex.vertex(slots[0], 0), &[4.0, 8.0]);
        assert_eq!(tex.vertex(slots[1], 1), &[7.0, 10.0]);
    }

    #[test]
    fn nine_patch_layout() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(NINE_PATCH_SLOTS);
        s.write_nine_patch(&slots, Region::new(0, 0, 100, 50), 0.0, Offset::new(10, 20), 2, None);

        // Bottom-right corner cell keeps the border size.
        let corner = (2 * 3 + 2) * 2;
        let (x, y) = s.to_clip(98, 48);
        assert_eq!(&s.arena().position().vertex(slots[corner], 0)[..2], &[x, y]);
        assert_eq!(s.arena().tex_coord().vertex(slots[corner], 0), &[13.0, 23.0]);
        assert_eq!(s.arena().tex_coord().vertex(slots[corner + 1], 1), &[15.0, 25.0]);

        // Outline: the center is hidden, the border is skinned.
        assert_eq!(s.arena().kind_of(slots[8], 0), VertexKind::Hidden);
        assert_eq!(s.arena().kind_of(slots[9], 0), VertexKind::Hidden);
        assert_eq!(s.arena().kind_of(slots[0], 0), VertexKind::Skin);
    }

    #[test]
    fn nine_patch_smaller_than_its_borders_stays_inside() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(NINE_PATCH_SLOTS);
        let rect = Region::new(20, 20, 4, 10);
        s.write_nine_patch(&slots, rect, 0.0, Offset::new(0, 0), 3, None);

        let (left, top) = s.to_clip(rect.x, rect.y);
        let (right, bottom) = s.to_clip(rect.right(), rect.bottom());
        for &slot in slots.iter().filter(|&&slot| s.arena().kind_of(slot, 0) != VertexKind::Hidden) {
            for v in 0..3 {
                let p = s.arena().position().vertex(slot, v);
                assert!((left..=right).contains(&p[0]), "x {} escapes the rect", p[0]);
                assert!((bottom..=top).contains(&p[1]), "y {} escapes the rect", p[1]);
            }
        }
        // The top-right corner is squeezed to half the width.
        let (x, _) = s.to_clip(22, 20);
        assert_eq!(s.arena().position().vertex(slots[4], 0)[0], x);
    }

    #[test]
    fn nine_patch_center_fill() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(NINE_PATCH_SLOTS);
        let fill = [0.2, 0.2, 0.2, 1.0];
        s.write_nine_patch(&slots, Region::new(10, 10, 40, 40), 0.0, Offset::new(0, 0), 3, Some(fill));
        assert_eq!(s.arena().kind_of(slots[8], 1), VertexKind::Plain);
        assert_eq!(s.arena().color().vertex(slots[9], 2), &fill);
    }

    #[test]
    #[should_panic(expected = "a quad takes 2 slots")]
    fn quad_rejects_wrong_slot_count() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(3);
        s.write_quad(&slots, Region::new(0, 0, 1, 1), 0.0, VertexKind::Plain, WHITE, None);
    }

    #[test]
    fn sync_uploads_then_binds() {
        let mut s = surface();
        let slots = s.arena_mut().alloc(QUAD_SLOTS);
        s.write_quad(&slots, Region::new(0, 0, 10, 10), 0.0, VertexKind::Plain, WHITE, None);
        let mut backend = HeadlessBackend::new();
        let stats = s.sync(&mut backend).unwrap();
        assert_eq!(stats.buffers_uploaded, 4);
        assert!(stats.texture_uploaded);
        assert!(!s.is_dirty());
        assert!(matches!(backend.calls().last(), Some(BackendCall::BindAttribute { .. })));

        backend.clear_calls();
        let stats = s.sync(&mut backend).unwrap();
        assert_eq!(stats.buffers_uploaded, 0);
        assert!(!stats.texture_uploaded);
    }
}
