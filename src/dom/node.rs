//! Node types: NodeId, NodeData.

use slotmap::new_key_type;

use crate::arena::Slot;
use crate::geometry::Region;
use crate::render::CursorKind;
use crate::widget::Paint;

new_key_type! {
    /// Unique identifier for a widget node. Copy, lightweight (u64).
    ///
    /// Every back-reference held outside the tree (focus holder, pressed node,
    /// hit target, focus indicator anchor) is a `NodeId`; a deleted node's id
    /// simply stops resolving.
    pub struct NodeId;
}

/// Data associated with a single widget node.
///
/// This is the shared capability surface of every widget: bounds, visibility,
/// ordering constraints and the arena slots the node owns.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Widget type name (e.g. "Button", "Panel").
    pub widget_type: String,
    /// Optional debug name.
    pub name: Option<String>,
    /// Screen-space bounds in pixels.
    pub bounds: Region,
    /// Whether this node (and therefore its subtree) is drawn and hit-testable.
    pub visible: bool,
    /// Disabled nodes never take focus.
    pub enabled: bool,
    /// Nodes that must render farther than this one.
    pub constraints: Vec<NodeId>,
    /// Resolved depth index, `None` until the depth pass reaches this node.
    pub depth: Option<usize>,
    /// Geometry this node draws.
    pub paint: Paint,
    /// Arena slots owned by this node, sized by `paint.slot_count()`.
    pub slots: Vec<Slot>,
    /// Cursor shown while the pointer is over this node.
    pub cursor: Option<CursorKind>,
    /// Atlas rectangle owned by this node, released when the node is deleted.
    pub atlas_region: Option<Region>,
}

impl NodeData {
    /// Create a new `NodeData` with the given widget type and sensible defaults.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            name: None,
            bounds: Region::EMPTY,
            visible: true,
            enabled: true,
            constraints: Vec::new(),
            depth: None,
            paint: Paint::None,
            slots: Vec::new(),
            cursor: None,
            atlas_region: None,
        }
    }

    /// Set the debug name (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the bounds (builder).
    pub fn with_bounds(mut self, bounds: Region) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the paint (builder).
    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    /// Set the cursor (builder).
    pub fn with_cursor(mut self, cursor: CursorKind) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Require `farther` to render behind this node (builder).
    pub fn behind(mut self, farther: NodeId) -> Self {
        if !self.constraints.contains(&farther) {
            self.constraints.push(farther);
        }
        self
    }

    /// Set whether this node is visible (builder).
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether this node is enabled (builder).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether the point lies inside this node and the node is visible.
    pub fn is_hit(&self, x: i32, y: i32) -> bool {
        self.visible && self.bounds.contains(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn new_defaults() {
        let data = NodeData::new("Button");
        assert_eq!(data.widget_type, "Button");
        assert!(data.name.is_none());
        assert!(data.visible);
        assert!(data.enabled);
        assert!(data.depth.is_none());
        assert!(data.slots.is_empty());
        assert!(matches!(data.paint, Paint::None));
    }

    #[test]
    fn behind_deduplicates() {
        let mut keys: SlotMap<NodeId, ()> = SlotMap::with_key();
        let other = keys.insert(());
        let data = NodeData::new("Panel").behind(other).behind(other);
        assert_eq!(data.constraints, vec![other]);
    }

    #[test]
    fn hidden_nodes_are_never_hit() {
        let data = NodeData::new("Panel").with_bounds(Region::new(0, 0, 10, 10));
        assert!(data.is_hit(5, 5));
        assert!(!data.is_hit(10, 5));
        assert!(!data.visible(false).is_hit(5, 5));
    }
}
