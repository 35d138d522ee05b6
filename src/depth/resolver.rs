//! Constraint-driven depth ordering.

use slotmap::SecondaryMap;

use crate::dom::{Dom, NodeId};

// ---------------------------------------------------------------------------
// DepthResolver
// ---------------------------------------------------------------------------

/// Assigns each node an index on a single front-to-back stack.
///
/// A node can only join the stack once every node it must render in front of
/// is already there. Nodes whose constraints are still open are skipped and
/// the pass is marked dirty; the caller keeps walking until a pass is clean.
#[derive(Debug, Default)]
pub struct DepthResolver {
    stack: Vec<NodeId>,
    index: SecondaryMap<NodeId, usize>,
    offset: usize,
    dirty: bool,
}

impl DepthResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to append `node` to the stack.
    ///
    /// Returns the assigned index (`stack length + offset`), or `None` when some
    /// constraint is not on the stack yet, in which case the pass becomes dirty.
    /// A node that is already on the stack keeps its index.
    pub fn add(&mut self, node: NodeId, constraints: &[NodeId]) -> Option<usize> {
        if let Some(&index) = self.index.get(node) {
            return Some(index);
        }
        if constraints.iter().any(|c| !self.index.contains_key(*c)) {
            self.dirty = true;
            return None;
        }
        let index = self.stack.len() + self.offset;
        self.stack.push(node);
        self.index.insert(node, index);
        Some(index)
    }

    /// Whether some `add` in the current pass was deferred.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Start a new walk.
    pub fn begin_pass(&mut self) {
        self.dirty = false;
    }

    /// Shift every later index by `offset`. Used to reserve a separate range
    /// for an always-in-front layer.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of nodes on the stack.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// One past the largest index handed out so far.
    pub fn max_index(&self) -> usize {
        self.stack.len() + self.offset
    }

    /// The index assigned to `node`, if it has been resolved.
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Resolved nodes, farthest first.
    pub fn order(&self) -> &[NodeId] {
        &self.stack
    }
}

/// Map a depth index to a depth-buffer value.
///
/// Strictly decreasing in `index`: index 0 maps to 1.0 (farthest) and larger
/// indices approach 0.0 (nearest).
///
/// # Panics
///
/// Panics if `max_index` is zero, which means nothing has been resolved yet.
pub fn normalize(index: usize, max_index: usize) -> f32 {
    assert!(max_index > 0, "depth normalization before any node was resolved");
    (max_index - index.min(max_index)) as f32 / max_index as f32
}

// ---------------------------------------------------------------------------
// Tree resolution
// ---------------------------------------------------------------------------

/// Result of resolving every layer of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLayers {
    /// One past the largest index in use.
    pub max_index: usize,
    /// First index reserved for the overlay layer.
    pub overlay_offset: usize,
    /// Walks needed by the primary and overlay layers together.
    pub passes: usize,
}

/// Resolve depth for the primary tree and then the overlay tree.
///
/// Every node's `depth` is cleared first and then written as it resolves. The
/// overlay starts at `overlay_factor` times the primary node count, so it is
/// always in front of primary content. Constraints pointing at deleted nodes
/// are ignored.
pub fn resolve_layers(dom: &mut Dom, primary: NodeId, overlay: NodeId, overlay_factor: usize) -> DepthLayers {
    for (_, data) in dom.iter_mut() {
        data.depth = None;
    }

    let mut resolver = DepthResolver::new();
    let mut passes = resolve_tree(&mut resolver, dom, primary);
    let overlay_offset = overlay_factor.max(1) * resolver.len();
    resolver.set_offset(overlay_offset);
    passes += resolve_tree(&mut resolver, dom, overlay);

    tracing::debug!(nodes = resolver.len(), passes, max_index = resolver.max_index(), "depth resolved");
    DepthLayers { max_index: resolver.max_index(), overlay_offset, passes }
}

/// Walk the tree under `root` until every node is on the stack.
///
/// Returns the number of walks.
///
/// # Panics
///
/// Panics when a walk is dirty yet resolves nothing: the remaining
/// constraints form a cycle or point outside the layers resolved so far.
pub fn resolve_tree(resolver: &mut DepthResolver, dom: &mut Dom, root: NodeId) -> usize {
    let order = dom.walk_depth_first(root);
    let mut passes = 0;
    loop {
        resolver.begin_pass();
        passes += 1;
        let mut progressed = false;
        for &id in &order {
            if resolver.index_of(id).is_some() {
                continue;
            }
            let Some(data) = dom.get(id) else {
                continue;
            };
            let constraints: Vec<NodeId> =
                data.constraints.iter().copied().filter(|c| dom.contains(*c)).collect();
            if let Some(index) = resolver.add(id, &constraints) {
                if let Some(data) = dom.get_mut(id) {
                    data.depth = Some(index);
                }
                progressed = true;
            }
        }
        if !resolver.is_dirty() {
            return passes;
        }
        assert!(
            progressed,
            "depth constraints under {root:?} can never be satisfied (cycle or unresolved layer)"
        );
    }
}
