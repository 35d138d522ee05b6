//! Per-vertex attribute storage.
//!
//! Each buffer is a flat array laid out as
//! `[slot][vertex 0..3][component 0..n]`, so the value for
//! `(slot, vertex, component)` lives at `(slot * 3 + vertex) * n + component`.

use bytemuck::Pod;

use super::slots::Slot;

/// Vertices per slot. A slot is always exactly one triangle.
pub const VERTICES_PER_SLOT: usize = 3;

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// The four parallel vertex attributes every slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Clip-space x, y and normalized depth.
    Position,
    /// One [`VertexKind`] tag per vertex.
    Kind,
    /// Linear RGBA fill color.
    Color,
    /// Atlas coordinates in texel units.
    TexCoord,
}

impl Attribute {
    /// Every attribute, in binding order.
    pub const ALL: [Attribute; 4] =
        [Attribute::Position, Attribute::Kind, Attribute::Color, Attribute::TexCoord];

    /// Components per vertex.
    pub const fn components(self) -> usize {
        match self {
            Attribute::Position => 3,
            Attribute::Kind => 1,
            Attribute::Color => 4,
            Attribute::TexCoord => 2,
        }
    }

    /// Shader-facing name.
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Position => "position",
            Attribute::Kind => "kind",
            Attribute::Color => "color",
            Attribute::TexCoord => "tex_coord",
        }
    }
}

// ---------------------------------------------------------------------------
// VertexKind
// ---------------------------------------------------------------------------

/// How the fragment stage shades a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum VertexKind {
    /// Not drawn. Fresh and released slots carry this tag.
    #[default]
    Hidden = 0,
    /// Solid fill from the color attribute.
    Plain = 1,
    /// Sampled from the atlas.
    Skin = 2,
    /// Sampled from the atlas as coverage, tinted by the color attribute.
    Glyph = 3,
}

impl VertexKind {
    /// Decode a raw tag. Unknown values read as hidden.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => VertexKind::Plain,
            2 => VertexKind::Skin,
            3 => VertexKind::Glyph,
            _ => VertexKind::Hidden,
        }
    }
}

// ---------------------------------------------------------------------------
// AttributeBuffer
// ---------------------------------------------------------------------------

/// A growable, dirty-tracked array of one attribute for every slot.
#[derive(Debug, Clone)]
pub struct AttributeBuffer<T> {
    attribute: Attribute,
    data: Vec<T>,
    dirty: bool,
}

impl<T: Pod + Default> AttributeBuffer<T> {
    pub(crate) fn new(attribute: Attribute, slots: usize) -> Self {
        Self {
            attribute,
            data: vec![T::default(); slots * VERTICES_PER_SLOT * attribute.components()],
            dirty: true,
        }
    }

    /// The attribute this buffer stores.
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    #[inline]
    fn index(&self, slot: Slot, vertex: usize, component: usize) -> usize {
        let n = self.attribute.components();
        debug_assert!(vertex < VERTICES_PER_SLOT, "vertex {vertex} out of range");
        debug_assert!(component < n, "component {component} out of range for {}", self.attribute.name());
        (slot.index() * VERTICES_PER_SLOT + vertex) * n + component
    }

    /// Read a single component.
    pub fn get(&self, slot: Slot, vertex: usize, component: usize) -> T {
        self.data[self.index(slot, vertex, component)]
    }

    /// All components of one vertex.
    pub fn vertex(&self, slot: Slot, vertex: usize) -> &[T] {
        let start = self.index(slot, vertex, 0);
        &self.data[start..start + self.attribute.components()]
    }

    /// Write a single component.
    pub fn set(&mut self, slot: Slot, vertex: usize, component: usize, value: T) {
        let i = self.index(slot, vertex, component);
        self.data[i] = value;
        self.dirty = true;
    }

    /// Write every component of one vertex.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly one value per component.
    pub fn set_vertex(&mut self, slot: Slot, vertex: usize, values: &[T]) {
        assert_eq!(
            values.len(),
            self.attribute.components(),
            "{} takes {} components",
            self.attribute.name(),
            self.attribute.components()
        );
        let start = self.index(slot, vertex, 0);
        self.data[start..start + values.len()].copy_from_slice(values);
        self.dirty = true;
    }

    /// Write the same components to all three vertices of a slot.
    pub fn set_all_vertices(&mut self, slot: Slot, values: &[T]) {
        for vertex in 0..VERTICES_PER_SLOT {
            self.set_vertex(slot, vertex, values);
        }
    }

    /// The raw bytes of one slot.
    pub fn slot_bytes(&self, slot: Slot) -> &[u8] {
        let start = self.index(slot, 0, 0);
        let len = VERTICES_PER_SLOT * self.attribute.components();
        bytemuck::cast_slice(&self.data[start..start + len])
    }

    /// The whole buffer as bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Whether the buffer changed since the last successful upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Extend to `slots` slots. Existing values keep their indices; new values
    /// are `T::default()`.
    pub(crate) fn grow(&mut self, slots: usize) {
        let len = slots * VERTICES_PER_SLOT * self.attribute.components();
        debug_assert!(len >= self.data.len(), "attribute buffers never shrink");
        self.data.resize(len, T::default());
        self.dirty = true;
    }
}
