//! The focus indicator: an outline drawn around whichever node it is anchored to.

use crate::arena::Slot;
use crate::depth::normalize;
use crate::dom::{Dom, NodeId};
use crate::render::{Surface, NINE_PATCH_SLOTS};
use crate::widget::BorderedBlock;

/// A 9-patch outline that follows one anchor node.
///
/// The indicator owns its slots for the lifetime of the screen. It is drawn
/// just outside the anchor's bounds at the anchor's depth, and hidden when
/// there is no anchor, the anchor was deleted, or the anchor is not visible.
#[derive(Debug, Clone)]
pub struct FocusIndicator {
    anchor: Option<NodeId>,
    block: BorderedBlock,
    slots: Vec<Slot>,
}

impl FocusIndicator {
    pub fn new(surface: &mut Surface, block: BorderedBlock) -> Self {
        let slots = surface.arena_mut().alloc(NINE_PATCH_SLOTS);
        Self { anchor: None, block, slots }
    }

    /// The anchor, if it is still alive.
    pub fn anchor(&self, dom: &Dom) -> Option<NodeId> {
        self.anchor.filter(|&id| dom.contains(id))
    }

    pub fn set_anchor(&mut self, anchor: Option<NodeId>) {
        self.anchor = anchor;
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Write or hide the outline.
    pub fn write(&self, surface: &mut Surface, dom: &Dom, max_index: usize) {
        let placed = self
            .anchor(dom)
            .filter(|&id| {
                std::iter::once(id)
                    .chain(dom.ancestors(id))
                    .all(|n| dom.get(n).is_some_and(|d| d.visible))
            })
            .and_then(|id| dom.get(id));
        match placed {
            Some(data) => {
                let z = normalize(data.depth.unwrap_or(0), max_index);
                let rect = data.bounds.inflate(self.block.thickness);
                surface.write_nine_patch(&self.slots, rect, z, self.block.origin, self.block.thickness, None);
            }
            None => surface.hide(&self.slots),
        }
    }
}
