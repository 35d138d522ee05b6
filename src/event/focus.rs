//! Focus eligibility and tab order.

use super::handler::ListenerTable;
use super::message::EventName;
use crate::dom::{Dom, NodeId};

/// Whether `node` can take focus: it listens for "focus", is enabled, and
/// neither it nor any ancestor is hidden.
pub fn is_focusable(dom: &Dom, listeners: &ListenerTable, node: NodeId) -> bool {
    let Some(data) = dom.get(node) else {
        return false;
    };
    data.visible
        && data.enabled
        && listeners.has(node, EventName::Focus)
        && dom.ancestors(node).iter().all(|&a| dom.get(a).is_some_and(|d| d.visible))
}

/// `node` itself or its nearest focusable ancestor.
pub fn focusable_ancestor(dom: &Dom, listeners: &ListenerTable, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .find(|&id| is_focusable(dom, listeners, id))
}

/// The next focusable node after `origin` in depth-first pre-order, wrapping
/// around within `origin`'s tree. `reverse` walks the order backwards.
///
/// Returns `None` when the walk comes back to `origin` without finding
/// another focusable node.
pub fn next_focusable(dom: &Dom, listeners: &ListenerTable, origin: NodeId, reverse: bool) -> Option<NodeId> {
    let order = dom.walk_depth_first(dom.root_of(origin));
    let start = order.iter().position(|&id| id == origin)?;
    let len = order.len();
    (1..len)
        .map(|step| if reverse { (start + len - step) % len } else { (start + step) % len })
        .map(|i| order[i])
        .find(|&id| is_focusable(dom, listeners, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;
    use std::rc::Rc;

    /// ```text
    /// root
    ///  ├─ a (focusable)
    ///  │   └─ b (focusable)
    ///  ├─ c
    ///  └─ d (focusable)
    /// ```
    fn build_tree() -> (Dom, ListenerTable, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert_root(NodeData::new("Body"));
        let a = dom.insert_child(root, NodeData::new("Button"));
        let b = dom.insert_child(a, NodeData::new("Button"));
        let c = dom.insert_child(root, NodeData::new("Panel"));
        let d = dom.insert_child(root, NodeData::new("Button"));
        let mut listeners = ListenerTable::new();
        for id in [a, b, d] {
            listeners.set(id, EventName::Focus, Rc::new(|_, _| {}));
        }
        (dom, listeners, root, a, b, c, d)
    }

    #[test]
    fn forward_order_is_pre_order() {
        let (dom, listeners, root, a, b, _c, d) = build_tree();
        assert_eq!(next_focusable(&dom, &listeners, root, false), Some(a));
        assert_eq!(next_focusable(&dom, &listeners, a, false), Some(b));
        assert_eq!(next_focusable(&dom, &listeners, b, false), Some(d));
        assert_eq!(next_focusable(&dom, &listeners, d, false), Some(a));
    }

    #[test]
    fn reverse_order_wraps() {
        let (dom, listeners, _root, a, b, _c, d) = build_tree();
        assert_eq!(next_focusable(&dom, &listeners, a, true), Some(d));
        assert_eq!(next_focusable(&dom, &listeners, d, true), Some(b));
    }

    #[test]
    fn lone_focusable_has_no_other() {
        let (mut dom, listeners, _root, a, b, _c, d) = build_tree();
        dom.remove(d);
        dom.get_mut(b).unwrap().visible = false;
        assert_eq!(next_focusable(&dom, &listeners, a, false), None);
    }

    #[test]
    fn hidden_ancestor_blocks_focus() {
        let (mut dom, listeners, _root, a, b, c, _d) = build_tree();
        assert!(is_focusable(&dom, &listeners, b));
        dom.get_mut(a).unwrap().visible = false;
        assert!(!is_focusable(&dom, &listeners, b));
        assert!(!is_focusable(&dom, &listeners, c));
    }

    #[test]
    fn disabled_nodes_are_skipped() {
        let (mut dom, listeners, root, a, b, _c, _d) = build_tree();
        dom.get_mut(a).unwrap().enabled = false;
        assert_eq!(next_focusable(&dom, &listeners, root, false), Some(b));
        assert_eq!(focusable_ancestor(&dom, &listeners, b), Some(b));
    }
}
