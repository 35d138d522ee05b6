//! Slot allocation: free list, growth and ownership tracking.

use bitvec::vec::BitVec;

use super::buffer::{Attribute, AttributeBuffer, VertexKind, VERTICES_PER_SLOT};
use super::ArenaConfig;
use crate::error::Result;
use crate::render::Backend;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// Handle to one triangle (three vertices) in a [`GeometryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u32);

impl Slot {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position of this slot in the attribute buffers.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// GeometryArena
// ---------------------------------------------------------------------------

/// Fixed-size triangle slots shared by every widget on a surface.
///
/// Every index in `[0, capacity)` is either owned by exactly one caller or
/// sits exactly once in the free list, which is kept sorted ascending so
/// allocation always hands out the lowest free indices.
#[derive(Debug, Clone)]
pub struct GeometryArena {
    free: Vec<Slot>,
    owned: BitVec,
    capacity: usize,
    growth_factor: f64,
    grow_count: usize,
    position: AttributeBuffer<f32>,
    kind: AttributeBuffer<u8>,
    color: AttributeBuffer<f32>,
    tex_coord: AttributeBuffer<f32>,
}

impl GeometryArena {
    /// Create an arena with `config.initial_slots` free slots.
    pub fn new(config: ArenaConfig) -> Self {
        let capacity = config.initial_slots;
        Self {
            free: (0..capacity).map(|i| Slot::new(i as u32)).collect(),
            owned: BitVec::repeat(false, capacity),
            capacity,
            growth_factor: config.growth_factor,
            grow_count: 0,
            position: AttributeBuffer::new(Attribute::Position, capacity),
            kind: AttributeBuffer::new(Attribute::Kind, capacity),
            color: AttributeBuffer::new(Attribute::Color, capacity),
            tex_coord: AttributeBuffer::new(Attribute::TexCoord, capacity),
        }
    }

    /// Total number of slots, free or owned.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently on the free list.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of slots currently owned by callers.
    pub fn allocated_len(&self) -> usize {
        self.owned.count_ones()
    }

    /// Whether `slot` is currently owned by a caller.
    pub fn is_allocated(&self, slot: Slot) -> bool {
        self.owned.get(slot.index()).map(|bit| *bit).unwrap_or(false)
    }

    /// How many times the arena has grown.
    pub fn grow_count(&self) -> usize {
        self.grow_count
    }

    /// Vertices submitted per draw call: every slot, hidden ones included.
    pub fn vertex_count(&self) -> usize {
        self.capacity * VERTICES_PER_SLOT
    }

    /// Take `n` slots off the front of the free list, growing as needed.
    pub fn alloc(&mut self, n: usize) -> Vec<Slot> {
        while self.free.len() < n {
            self.grow();
        }
        let taken: Vec<Slot> = self.free.drain(..n).collect();
        for slot in &taken {
            assert!(!self.owned[slot.index()], "free list handed out owned slot {}", slot.index());
            self.owned.set(slot.index(), true);
        }
        taken
    }

    /// Increase capacity by the growth factor and free the new range.
    ///
    /// Existing attribute data keeps its indices. New slots are hidden.
    pub fn grow(&mut self) {
        let old = self.capacity;
        let scaled = (old as f64 * self.growth_factor).ceil() as usize;
        let new = scaled.max(old + 1);

        // Every free slot is below `old`, so appending keeps the list sorted.
        self.free.extend((old..new).map(|i| Slot::new(i as u32)));
        self.owned.resize(new, false);
        self.position.grow(new);
        self.kind.grow(new);
        self.color.grow(new);
        self.tex_coord.grow(new);
        self.capacity = new;
        self.grow_count += 1;

        assert!(!self.free.is_empty(), "arena grew from {old} to {new} slots without freeing any");
        tracing::debug!(old, new, "geometry arena grew");
    }

    /// Return slots to the free list.
    ///
    /// Returned slots are re-tagged hidden so they stop drawing immediately.
    ///
    /// # Panics
    ///
    /// Panics if any slot is not currently owned (double free or foreign
    /// handle), or if the merged free list loses entries.
    pub fn dealloc(&mut self, slots: &[Slot]) {
        if slots.is_empty() {
            return;
        }
        let mut returned = slots.to_vec();
        returned.sort_unstable();

        for &slot in &returned {
            let i = slot.index();
            assert!(i < self.capacity, "slot {i} is outside the arena (capacity {})", self.capacity);
            assert!(self.owned[i], "double free of slot {i}");
            self.owned.set(i, false);
            self.kind.set_all_vertices(slot, &[VertexKind::Hidden as u8]);
        }

        let expected = self.free.len() + returned.len();
        let mut merged = Vec::with_capacity(expected);
        let (mut i, mut j) = (0, 0);
        while i < self.free.len() && j < returned.len() {
            if self.free[i] < returned[j] {
                merged.push(self.free[i]);
                i += 1;
            } else {
                merged.push(returned[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&self.free[i..]);
        merged.extend_from_slice(&returned[j..]);
        assert_eq!(merged.len(), expected, "free list merge lost slots");
        self.free = merged;

        debug_assert_eq!(self.free.len() + self.allocated_len(), self.capacity);
    }

    /// Shrink or extend a caller's slot list to `n` entries.
    ///
    /// Surplus slots are taken from the tail and released; missing ones are
    /// freshly allocated and appended.
    pub fn resize(&mut self, mut slots: Vec<Slot>, n: usize) -> Vec<Slot> {
        if n < slots.len() {
            let surplus = slots.split_off(n);
            self.dealloc(&surplus);
        } else if n > slots.len() {
            let extra = self.alloc(n - slots.len());
            slots.extend(extra);
        }
        slots
    }

    // -- attribute access -------------------------------------------------

    pub fn position(&self) -> &AttributeBuffer<f32> {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut AttributeBuffer<f32> {
        &mut self.position
    }

    pub fn kind(&self) -> &AttributeBuffer<u8> {
        &self.kind
    }

    pub fn color(&self) -> &AttributeBuffer<f32> {
        &self.color
    }

    pub fn color_mut(&mut self) -> &mut AttributeBuffer<f32> {
        &mut self.color
    }

    pub fn tex_coord(&self) -> &AttributeBuffer<f32> {
        &self.tex_coord
    }

    pub fn tex_coord_mut(&mut self) -> &mut AttributeBuffer<f32> {
        &mut self.tex_coord
    }

    /// The shading tag of one vertex.
    pub fn kind_of(&self, slot: Slot, vertex: usize) -> VertexKind {
        VertexKind::from_raw(self.kind.get(slot, vertex, 0))
    }

    /// Tag all three vertices of `slot`.
    pub fn set_kind(&mut self, slot: Slot, kind: VertexKind) {
        self.kind.set_all_vertices(slot, &[kind as u8]);
    }

    /// Stop drawing `slot` without releasing it.
    pub fn hide(&mut self, slot: Slot) {
        self.set_kind(slot, VertexKind::Hidden);
    }

    /// Whether any attribute buffer needs uploading.
    pub fn is_dirty(&self) -> bool {
        self.position.is_dirty()
            || self.kind.is_dirty()
            || self.color.is_dirty()
            || self.tex_coord.is_dirty()
    }

    /// Upload every dirty buffer in full.
    ///
    /// Returns how many buffers were uploaded. A buffer whose upload fails
    /// stays dirty and is retried on the next sync.
    pub fn sync(&mut self, backend: &mut dyn Backend) -> Result<usize> {
        let mut uploaded = 0;
        if self.position.is_dirty() {
            backend.upload_attribute(Attribute::Position, self.position.as_bytes())?;
            self.position.mark_clean();
            uploaded += 1;
        }
        if self.kind.is_dirty() {
            backend.upload_attribute(Attribute::Kind, self.kind.as_bytes())?;
            self.kind.mark_clean();
            uploaded += 1;
        }
        if self.color.is_dirty() {
            backend.upload_attribute(Attribute::Color, self.color.as_bytes())?;
            self.color.mark_clean();
            uploaded += 1;
        }
        if self.tex_coord.is_dirty() {
            backend.upload_attribute(Attribute::TexCoord, self.tex_coord.as_bytes())?;
            self.tex_coord.mark_clean();
            uploaded += 1;
        }
        Ok(uploaded)
    }

    /// Bind every attribute for the next draw call.
    pub fn bind(&self, backend: &mut dyn Backend) {
        for attribute in Attribute::ALL {
            backend.bind_attribute(attribute, attribute.components());
        }
    }
}

impl Default for GeometryArena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}
