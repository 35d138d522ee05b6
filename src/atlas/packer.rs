//! Best-fit rectangle packing on a growable canvas.

use crate::error::Result;
use crate::geometry::{Offset, Region, Size};
use crate::render::Backend;

use super::defrag;
use super::AtlasConfig;

/// A growable pixel canvas that packs skin and image rectangles.
///
/// Pixels are stored row-major with `components` bytes per pixel. The free
/// rectangles never overlap each other or a placed rectangle, and together
/// with the placed rectangles they cover the canvas exactly.
#[derive(Debug, Clone)]
pub struct Atlas {
    width: i32,
    height: i32,
    components: usize,
    pixels: Vec<u8>,
    free: Vec<Region>,
    placed: Vec<Region>,
    dirty: bool,
    defrag_iterations: usize,
    grow_count: usize,
}

impl Atlas {
    /// Create an empty canvas of `config.width` × `config.height`.
    pub fn new(config: AtlasConfig) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);
        Self {
            width,
            height,
            components: config.components,
            pixels: vec![0; width as usize * height as usize * config.components],
            free: vec![Region::new(0, 0, width, height)],
            placed: Vec::new(),
            dirty: true,
            defrag_iterations: config.defrag_iterations,
            grow_count: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bytes per pixel.
    pub fn components(&self) -> usize {
        self.components
    }

    /// The raw canvas, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The bytes of one pixel.
    pub fn pixel(&self, x: i32, y: i32) -> &[u8] {
        let start = self.pixel_index(x, y);
        &self.pixels[start..start + self.components]
    }

    /// Current free rectangles, in no particular order.
    pub fn free_rects(&self) -> &[Region] {
        &self.free
    }

    /// Rectangles currently handed out by `build`.
    pub fn placed_rects(&self) -> &[Region] {
        &self.placed
    }

    pub fn free_area(&self) -> i64 {
        self.free.iter().map(|r| r.area()).sum()
    }

    pub fn placed_area(&self) -> i64 {
        self.placed.iter().map(|r| r.area()).sum()
    }

    /// How many times the canvas has doubled a dimension.
    pub fn grow_count(&self) -> usize {
        self.grow_count
    }

    /// Whether pixels changed since the last successful texture upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    fn pixel_index(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.components
    }

    // -----------------------------------------------------------------------
    // Packing
    // -----------------------------------------------------------------------

    /// Pack a `width` × `height` block of pixels and return its origin.
    ///
    /// The free rectangle with the least wasted area wins. When nothing fits,
    /// the canvas doubles along the dimension that rejected more candidates
    /// (height on a tie) and the search repeats.
    ///
    /// # Panics
    ///
    /// Panics on an empty block or when `pixels` does not hold exactly
    /// `width * height * components` bytes.
    pub fn build(&mut self, pixels: &[u8], width: i32, height: i32) -> Offset {
        assert!(width > 0 && height > 0, "cannot pack an empty {width}x{height} block");
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * self.components,
            "pixel data does not match a {width}x{height} block"
        );

        loop {
            let mut width_failures = 0;
            let mut height_failures = 0;
            let mut best: Option<(usize, i64)> = None;
            let needed = Size::new(width, height).area();

            for (i, rect) in self.free.iter().enumerate() {
                let too_narrow = rect.width < width;
                let too_short = rect.height < height;
                if too_narrow {
                    width_failures += 1;
                }
                if too_short {
                    height_failures += 1;
                }
                if too_narrow || too_short {
                    continue;
                }
                let waste = rect.area() - needed;
                if best.map_or(true, |(_, least)| waste < least) {
                    best = Some((i, waste));
                }
            }

            if let Some((i, _)) = best {
                let target = self.free.remove(i);
                self.blit(target.x, target.y, pixels, width);
                self.split(target, width, height);
                self.placed.push(Region::new(target.x, target.y, width, height));
                self.dirty = true;
                self.check_area();
                return target.offset();
            }

            if width_failures > height_failures {
                self.grow_width();
            } else {
                self.grow_height();
            }
        }
    }

    /// Pack a square 9-patch block whose borders are `thickness` pixels wide.
    pub fn build_bordered(&mut self, pixels: &[u8], thickness: i32) -> Offset {
        let side = 2 * thickness + 1;
        self.build(pixels, side, side)
    }

    /// Release a rectangle previously returned by `build` and defragment.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle is not currently placed.
    pub fn free(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.free_region(Region::new(x, y, width, height));
    }

    /// [`free`](Self::free) taking a [`Region`].
    pub fn free_region(&mut self, region: Region) {
        let Some(pos) = self.placed.iter().position(|r| *r == region) else {
            panic!("atlas region {region:?} was never placed or is already free");
        };
        self.placed.swap_remove(pos);
        self.free.push(region);
        self.defragment();
    }

    /// Run both defragmentation passes.
    pub fn defragment(&mut self) {
        let merges = defrag::merge_full_edges(&mut self.free);
        let moves = defrag::improve_partial_edges(&mut self.free, self.defrag_iterations);
        self.check_area();
        tracing::debug!(merges, moves, free_rects = self.free.len(), "atlas defragmented");
    }

    fn blit(&mut self, x: i32, y: i32, pixels: &[u8], width: i32) {
        let row_len = width as usize * self.components;
        for (row, src) in pixels.chunks_exact(row_len).enumerate() {
            let start = self.pixel_index(x, y + row as i32);
            self.pixels[start..start + row_len].copy_from_slice(src);
        }
    }

    /// Register the leftover of `target` after placing a block in its corner.
    ///
    /// Either a full-width strip goes below the block, or a full-height strip
    /// beside it; whichever yields the larger single rectangle is kept.
    fn split(&mut self, target: Region, width: i32, height: i32) {
        let below_full = Region::new(target.x, target.y + height, target.width, target.height - height);
        let beside_full = Region::new(target.x + width, target.y, target.width - width, target.height);

        let (large, small) = if below_full.area() >= beside_full.area() {
            (below_full, Region::new(target.x + width, target.y, target.width - width, height))
        } else {
            (beside_full, Region::new(target.x, target.y + height, width, target.height - height))
        };
        for rect in [large, small] {
            if !rect.is_empty() {
                self.free.push(rect);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Growth
    // -----------------------------------------------------------------------

    pub(crate) fn grow_width(&mut self) {
        let old = self.width;
        let new = old * 2;
        let mut pixels = vec![0; new as usize * self.height as usize * self.components];
        let old_row = old as usize * self.components;
        let new_row = new as usize * self.components;
        for (row, src) in self.pixels.chunks_exact(old_row).enumerate() {
            pixels[row * new_row..row * new_row + old_row].copy_from_slice(src);
        }
        self.pixels = pixels;
        self.width = new;
        self.free.push(Region::new(old, 0, old, self.height));
        self.after_growth();
        tracing::debug!(old, new, height = self.height, "atlas grew wider");
    }

    pub(crate) fn grow_height(&mut self) {
        let old = self.height;
        let new = old * 2;
        // Row-major storage: the existing rows keep their offsets.
        self.pixels.resize(self.width as usize * new as usize * self.components, 0);
        self.height = new;
        self.free.push(Region::new(0, old, self.width, old));
        self.after_growth();
        tracing::debug!(old, new, width = self.width, "atlas grew taller");
    }

    fn after_growth(&mut self) {
        self.grow_count += 1;
        self.dirty = true;
        self.defragment();
    }

    /// Free plus placed area must cover the canvas exactly.
    fn check_area(&self) {
        let canvas = self.size().area();
        let accounted = self.free_area() + self.placed_area();
        assert_eq!(
            accounted, canvas,
            "atlas area mismatch: free {} + placed {} != canvas {canvas}",
            self.free_area(),
            self.placed_area()
        );
        debug_assert!(
            self.free.iter().all(|r| self.size().to_region().contains_region(*r)),
            "free rectangle outside the canvas"
        );
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    /// Upload the whole canvas if it changed. Returns whether an upload ran.
    pub fn sync(&mut self, backend: &mut dyn Backend) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        backend.upload_texture(self.width as u32, self.height as u32, self.components, &self.pixels)?;
        self.dirty = false;
        Ok(true)
    }
}

impl Default for Atlas {
    fn default() -> Self {
        Self::new(AtlasConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BackendCall, HeadlessBackend};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn atlas(width: i32, height: i32) -> Atlas {
        Atlas::new(AtlasConfig::default().with_size(width, height))
    }

    fn block(atlas: &Atlas, w: i32, h: i32, fill: u8) -> Vec<u8> {
        vec![fill; w as usize * h as usize * atlas.components()]
    }

    fn dump_free(atlas: &Atlas) -> String {
        let mut rects = atlas.free_rects().to_vec();
        rects.sort();
        rects
            .iter()
            .map(|r| format!("{},{} {}x{}", r.x, r.y, r.width, r.height))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn check_layout(atlas: &Atlas) {
        let canvas = atlas.size().to_region();
        let all: Vec<Region> = atlas.free_rects().iter().chain(atlas.placed_rects()).copied().collect();
        for (i, a) in all.iter().enumerate() {
            assert!(canvas.contains_region(*a), "{a:?} escapes {canvas:?}");
            for b in &all[i + 1..] {
                assert!(!a.overlaps(*b), "{a:?} overlaps {b:?}");
            }
        }
        assert_eq!(atlas.free_area() + atlas.placed_area(), canvas.area());
    }

    // ── placement ─────────────────────────────────────────────────────

    #[test]
    fn first_block_lands_at_origin() {
        let mut atlas = atlas(128, 128);
        let data = block(&atlas, 32, 32, 7);
        assert_eq!(atlas.build(&data, 32, 32), Offset::new(0, 0));
        assert_eq!(atlas.pixel(31, 31), &[7, 7, 7, 7]);
        assert_eq!(atlas.pixel(32, 0), &[0, 0, 0, 0]);
        check_layout(&atlas);
    }

    #[test]
    fn best_fit_prefers_least_waste() {
        let mut atlas = atlas(128, 128);
        atlas.build(&block(&atlas, 32, 32, 1), 32, 32);
        let at = atlas.build(&block(&atlas, 64, 16, 2), 64, 16);
        assert_eq!(at, Offset::new(32, 0));
        insta::assert_snapshot!(dump_free(&atlas), @r"
        0,32 128x96
        32,16 96x16
        96,0 32x16
        ");
        check_layout(&atlas);
    }

    #[test]
    fn bordered_block_is_square() {
        let mut atlas = atlas(16, 16);
        let data = block(&atlas, 5, 5, 9);
        assert_eq!(atlas.build_bordered(&data, 2), Offset::new(0, 0));
        assert_eq!(atlas.placed_rects(), &[Region::new(0, 0, 5, 5)]);
    }

    // ── growth ────────────────────────────────────────────────────────

    #[test]
    fn too_wide_block_doubles_width_once() {
        let mut atlas = atlas(128, 128);
        let at = atlas.build(&block(&atlas, 200, 50, 3), 200, 50);
        assert_eq!(at, Offset::new(0, 0));
        assert_eq!(atlas.size(), Size::new(256, 128));
        assert_eq!(atlas.grow_count(), 1);
        check_layout(&atlas);
    }

    #[test]
    fn tie_grows_height() {
        let mut atlas = atlas(8, 8);
        let at = atlas.build(&block(&atlas, 10, 10, 1), 10, 10);
        assert_eq!(at, Offset::new(0, 0));
        // One rejection on each side first doubles the height.
        assert_eq!(atlas.size(), Size::new(16, 16));
        assert_eq!(atlas.grow_count(), 2);
        check_layout(&atlas);
    }

    #[test]
    fn growth_keeps_pixels_in_place() {
        let mut atlas = atlas(4, 4);
        let mut data = block(&atlas, 2, 2, 0);
        data[4..8].copy_from_slice(&[10, 20, 30, 40]); // pixel (1, 0)
        atlas.build(&data, 2, 2);
        atlas.grow_width();
        atlas.grow_height();
        assert_eq!(atlas.size(), Size::new(8, 8));
        assert_eq!(atlas.pixel(1, 0), &[10, 20, 30, 40]);
        assert_eq!(atlas.pixel(5, 0), &[0, 0, 0, 0]);
        check_layout(&atlas);
    }

    // ── release ───────────────────────────────────────────────────────

    #[test]
    fn build_free_build_reuses_space() {
        let mut atlas = atlas(128, 128);
        let first = atlas.build(&block(&atlas, 32, 32, 1), 32, 32);
        atlas.free(first.x, first.y, 32, 32);
        assert_eq!(atlas.free_rects(), &[Region::new(0, 0, 128, 128)]);
        assert_eq!(atlas.build(&block(&atlas, 32, 32, 1), 32, 32), first);
    }

    #[test]
    fn free_runs_partial_edge_improvement() {
        let mut atlas = atlas(128, 128);
        let first = atlas.build(&block(&atlas, 32, 32, 1), 32, 32);
        atlas.build(&block(&atlas, 64, 16, 2), 64, 16);
        atlas.free(first.x, first.y, 32, 32);
        insta::assert_snapshot!(dump_free(&atlas), @r"
        0,0 32x16
        0,16 128x112
        96,0 32x16
        ");
        check_layout(&atlas);
    }

    #[test]
    #[should_panic(expected = "was never placed")]
    fn freeing_unplaced_region_panics() {
        let mut atlas = atlas(32, 32);
        atlas.free(0, 0, 4, 4);
    }

    // ── upload ────────────────────────────────────────────────────────

    #[test]
    fn sync_uploads_whole_canvas_when_dirty() {
        let mut atlas = atlas(16, 8);
        let mut backend = HeadlessBackend::new();
        assert!(atlas.sync(&mut backend).unwrap());
        assert!(!atlas.sync(&mut backend).unwrap());
        assert_eq!(
            backend.calls(),
            &[BackendCall::UploadTexture { width: 16, height: 8, components: 4, bytes: 16 * 8 * 4 }]
        );
    }

    // ── invariants ────────────────────────────────────────────────────

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn layout_invariants_hold(ops in prop::collection::vec((any::<bool>(), 1i32..24, 1i32..24, any::<usize>()), 1..30)) {
            let mut atlas = atlas(32, 32);
            for (build, w, h, pick) in ops {
                if build || atlas.placed_rects().is_empty() {
                    let data = block(&atlas, w, h, 5);
                    let at = atlas.build(&data, w, h);
                    prop_assert!(atlas.placed_rects().contains(&Region::new(at.x, at.y, w, h)));
                } else {
                    let victim = atlas.placed_rects()[pick % atlas.placed_rects().len()];
                    atlas.free_region(victim);
                }
                check_layout(&atlas);
            }
        }
    }
}
