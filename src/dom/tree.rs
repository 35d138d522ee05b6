//! Tree operations: insert, remove, reparent, walk, ancestry queries.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The widget tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// A tree may hold several roots; a screen keeps one per layer.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
}

impl Dom {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    /// Insert a parentless node.
    pub fn insert_root(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        assert!(self.nodes.contains_key(parent), "parent node {parent:?} does not exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns every removed node in pre-order (the node itself first) so the
    /// caller can release the resources they own. Returns an empty vec for a
    /// stale id.
    pub fn remove(&mut self, id: NodeId) -> Vec<(NodeId, NodeData)> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        let order = self.walk_depth_first(id);
        let mut removed = Vec::with_capacity(order.len());
        for current in order {
            self.children.remove(current);
            self.parent.remove(current);
            if let Some(data) = self.nodes.remove(current) {
                removed.push((current, data));
            }
        }
        removed
    }

    /// Move `node` to become the last child of `new_parent`.
    ///
    /// The node keeps its subtree intact.
    ///
    /// # Panics
    ///
    /// Panics if either node is missing or if `new_parent` lies inside the
    /// subtree of `node`.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        assert!(self.nodes.contains_key(node), "node {node:?} does not exist");
        assert!(self.nodes.contains_key(new_parent), "new parent {new_parent:?} does not exist");
        assert!(
            node != new_parent && !self.is_ancestor(node, new_parent),
            "cannot move a node under its own descendant"
        );

        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
        }

        self.parent.insert(node, new_parent);
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.push(node);
        }
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to its root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// The parentless node at the top of `id`'s chain.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(p) = self.parent(current) {
            if p == ancestor {
                return true;
            }
            current = p;
        }
        false
    }

    /// Whether `node` is `other` or one of its descendants.
    pub fn is_same_or_descendant(&self, node: NodeId, other: NodeId) -> bool {
        node == other || self.is_ancestor(other, node)
    }

    /// The deepest node that is `a` or `b` or an ancestor of both.
    ///
    /// Returns `None` when the two nodes live under different roots.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut chain_a = vec![a];
        chain_a.extend(self.ancestors(a));
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|candidate| chain_a.contains(candidate))
    }

    /// The child of `ancestor` on the path down to `descendant`.
    ///
    /// Returns `None` if `descendant` is not strictly below `ancestor`.
    pub fn child_toward(&self, ancestor: NodeId, descendant: NodeId) -> Option<NodeId> {
        let mut current = descendant;
        while let Some(p) = self.parent(current) {
            if p == ancestor {
                return Some(current);
            }
            current = p;
        }
        None
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate over every live node.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }

    /// Mutable iteration over every live node.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut NodeData)> {
        self.nodes.iter_mut()
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Pre-order traversal that reports each node together with its effective
    /// visibility (hidden if it or any ancestor below `start` is hidden).
    pub fn walk_with_visibility(&self, start: NodeId) -> Vec<(NodeId, bool)> {
        let mut result = Vec::new();
        let mut stack = vec![(start, true)];
        while let Some((current, parent_visible)) = stack.pop() {
            let Some(data) = self.nodes.get(current) else {
                continue;
            };
            let visible = parent_visible && data.visible;
            result.push((current, visible));
            for &child in self.children(current).iter().rev() {
                stack.push((child, visible));
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
