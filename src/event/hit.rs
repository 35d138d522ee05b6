//! Hit-testing against the depth-ordered tree.

use crate::dom::{Dom, NodeId};

/// Find the node under (x, y), starting the search at `start`.
///
/// If `start` does not contain the point the search climbs to its parent
/// until a container does (or the root is reached). From there it descends,
/// at each level choosing among the node and its visible children whichever
/// contains the point and has the greatest resolved depth.
pub fn hit_from(dom: &Dom, start: NodeId, x: i32, y: i32) -> NodeId {
    let mut current = start;
    while !is_hit(dom, current, x, y) {
        match dom.parent(current) {
            Some(parent) => current = parent,
            None => return current,
        }
    }

    loop {
        let own = depth(dom, current);
        let best = dom
            .children(current)
            .iter()
            .copied()
            .filter(|&child| is_hit(dom, child, x, y))
            .max_by_key(|&child| depth(dom, child));
        match best {
            Some(child) if depth(dom, child) > own => current = child,
            _ => return current,
        }
    }
}

fn is_hit(dom: &Dom, id: NodeId, x: i32, y: i32) -> bool {
    dom.get(id).is_some_and(|data| data.is_hit(x, y))
}

// Unresolved nodes sort below every resolved one.
fn depth(dom: &Dom, id: NodeId) -> Option<usize> {
    dom.get(id).and_then(|data| data.depth)
}
