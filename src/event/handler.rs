//! Listener storage: one listener per (node, event name).

use std::collections::HashMap;
use std::rc::Rc;

use slotmap::SecondaryMap;

use super::message::{Event, EventName};
use crate::dom::NodeId;
use crate::screen::Screen;

/// A listener. It receives the event and the screen, so it can mutate any
/// widget, including deleting the node it is attached to.
pub type Listener = Rc<dyn Fn(&mut Event, &mut Screen)>;

/// Per-node listener slots.
///
/// Registering a second listener for the same name replaces the first.
#[derive(Default)]
pub struct ListenerTable {
    slots: SecondaryMap<NodeId, HashMap<EventName, Listener>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener` for `name` on `node`, replacing any previous one.
    pub fn set(&mut self, node: NodeId, name: EventName, listener: Listener) {
        match self.slots.get_mut(node) {
            Some(map) => {
                map.insert(name, listener);
            }
            None => {
                let mut map = HashMap::new();
                map.insert(name, listener);
                self.slots.insert(node, map);
            }
        }
    }

    /// Remove the listener for `name` on `node`. Returns whether one existed.
    pub fn remove(&mut self, node: NodeId, name: EventName) -> bool {
        self.slots.get_mut(node).map(|map| map.remove(&name).is_some()).unwrap_or(false)
    }

    /// Drop every listener on `node`.
    pub fn clear_node(&mut self, node: NodeId) {
        self.slots.remove(node);
    }

    /// A handle to the listener, cloned so the caller can run it while
    /// mutating the table's owner.
    pub fn get(&self, node: NodeId, name: EventName) -> Option<Listener> {
        self.slots.get(node).and_then(|map| map.get(&name)).cloned()
    }

    pub fn has(&self, node: NodeId, name: EventName) -> bool {
        self.slots.get(node).is_some_and(|map| map.contains_key(&name))
    }

    /// Nodes that listen for `name`, in no particular order.
    pub fn nodes_listening(&self, name: EventName) -> Vec<NodeId> {
        self.slots
            .iter()
            .filter(|(_, map)| map.contains_key(&name))
            .map(|(id, _)| id)
            .collect()
    }
}
