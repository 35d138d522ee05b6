//! Screen: the widget tree, its geometry, and everything the router tracks.
//!
//! [`Screen`] owns the node tree, the rendering [`Surface`] (arena and
//! atlas), the listener table, the skin and the focus indicator. Widget
//! constructors take `&mut Screen` explicitly; there is no ambient "current
//! parent". Event routing lives in [`crate::event::router`] as further
//! methods on this type.
//!
//! The tree has two roots: the body, holding ordinary content, and the
//! overlay, whose children (popups) always resolve in front of the body.

use std::rc::Rc;

use crate::app::AppConfig;
use crate::depth::{normalize, resolve_layers, DepthLayers};
use crate::dom::{Dom, NodeData, NodeId};
use crate::error::Result;
use crate::event::{ClickTracker, Event, EventName, ListenerTable, PointerState};
use crate::geometry::{Region, Size};
use crate::render::{Backend, CursorKind, FrameStats, Surface};
use crate::widget::{Paint, Skin};
use crate::widgets::FocusIndicator;

/// One rendering surface and its widget tree.
pub struct Screen {
    pub(crate) dom: Dom,
    pub(crate) surface: Surface,
    pub(crate) listeners: ListenerTable,
    pub(crate) pointer: PointerState,
    pub(crate) focus_holder: Option<NodeId>,
    pub(crate) focus_indicator: FocusIndicator,
    pub(crate) clicks: ClickTracker,
    pub(crate) tick: u64,
    body: NodeId,
    overlay: NodeId,
    skin: Skin,
    layers: Option<DepthLayers>,
    overlay_depth_factor: usize,
    layout_dirty: bool,
}

impl Screen {
    /// Create a screen with empty body and overlay layers.
    ///
    /// The skin is packed into the atlas and the focus indicator takes its
    /// slots before any widget exists.
    pub fn new(config: &AppConfig) -> Self {
        let viewport = config.viewport;
        let mut surface = Surface::new(config.arena, config.atlas, viewport);
        let skin = Skin::build(surface.atlas_mut());
        let focus_indicator = FocusIndicator::new(&mut surface, skin.focus);

        let mut dom = Dom::new();
        let body = dom.insert_root(NodeData::new("Body").with_bounds(viewport.to_region()));
        let overlay = dom.insert_root(NodeData::new("Overlay").with_bounds(viewport.to_region()));

        Self {
            dom,
            surface,
            listeners: ListenerTable::new(),
            pointer: PointerState::default(),
            focus_holder: None,
            focus_indicator,
            clicks: ClickTracker::new(config.click),
            tick: 0,
            body,
            overlay,
            skin,
            layers: None,
            overlay_depth_factor: config.overlay_depth_factor,
            layout_dirty: true,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Root of ordinary content.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Root of the always-in-front layer.
    pub fn overlay(&self) -> NodeId {
        self.overlay
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn skin(&self) -> Skin {
        self.skin
    }

    pub fn listeners(&self) -> &ListenerTable {
        &self.listeners
    }

    /// Depth layout from the last layout pass.
    pub fn layers(&self) -> Option<DepthLayers> {
        self.layers
    }

    pub fn viewport(&self) -> Size {
        self.surface.viewport()
    }

    /// Whether the next render has anything to do.
    pub fn needs_redraw(&self) -> bool {
        self.layout_dirty || self.surface.is_dirty() || self.pointer.cursor_pending
    }

    // -----------------------------------------------------------------------
    // Tree mutation
    // -----------------------------------------------------------------------

    /// Add a node under `parent`, allocating the slots its paint needs.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist.
    pub fn spawn(&mut self, parent: NodeId, mut data: NodeData) -> NodeId {
        assert!(self.dom.contains(parent), "cannot spawn under deleted node {parent:?}");
        data.slots = self.surface.arena_mut().alloc(data.paint.slot_count());
        self.layout_dirty = true;
        self.dom.insert_child(parent, data)
    }

    /// Delete `node` and its subtree.
    ///
    /// Slots go back to the arena, owned atlas regions are freed and
    /// listeners are dropped. Deleting a layer root deletes its children and
    /// keeps the root.
    pub fn delete(&mut self, node: NodeId) {
        if node == self.body || node == self.overlay {
            let children = self.dom.children(node).to_vec();
            for child in children {
                self.delete(child);
            }
            return;
        }
        if !self.dom.contains(node) {
            return;
        }
        let removed = self.dom.remove(node);
        for (id, data) in &removed {
            self.surface.arena_mut().dealloc(&data.slots);
            if let Some(region) = data.atlas_region {
                self.surface.atlas_mut().free_region(region);
            }
            self.listeners.clear_node(*id);
        }
        tracing::debug!(?node, nodes = removed.len(), "subtree deleted");
        self.layout_dirty = true;
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Region) {
        if let Some(data) = self.dom.get_mut(node) {
            data.bounds = bounds;
            self.layout_dirty = true;
        }
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(data) = self.dom.get_mut(node) {
            if data.visible != visible {
                data.visible = visible;
                self.layout_dirty = true;
            }
        }
    }

    pub fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Some(data) = self.dom.get_mut(node) {
            data.enabled = enabled;
        }
    }

    /// Change what `node` draws, resizing its slot list to fit.
    pub fn set_paint(&mut self, node: NodeId, paint: Paint) {
        let Some(data) = self.dom.get_mut(node) else {
            return;
        };
        let slots = std::mem::take(&mut data.slots);
        let slots = self.surface.arena_mut().resize(slots, paint.slot_count());
        data.slots = slots;
        data.paint = paint;
        self.layout_dirty = true;
    }

    /// Set the cursor shown over `node`; `None` inherits from ancestors.
    pub fn set_cursor(&mut self, node: NodeId, cursor: Option<CursorKind>) {
        if let Some(data) = self.dom.get_mut(node) {
            data.cursor = cursor;
        }
    }

    /// Require `node` to render in front of `farther`.
    pub fn render_above(&mut self, node: NodeId, farther: NodeId) {
        if let Some(data) = self.dom.get_mut(node) {
            if !data.constraints.contains(&farther) {
                data.constraints.push(farther);
                self.layout_dirty = true;
            }
        }
    }

    /// Install `listener` for `name` on `node`, replacing any previous one.
    pub fn on<F>(&mut self, node: NodeId, name: EventName, listener: F)
    where
        F: Fn(&mut Event, &mut Screen) + 'static,
    {
        if self.dom.contains(node) {
            self.listeners.set(node, name, Rc::new(listener));
        }
    }

    /// Remove the listener for `name` on `node`.
    pub fn off(&mut self, node: NodeId, name: EventName) -> bool {
        self.listeners.remove(node, name)
    }

    /// Resize the viewport. Both layer roots follow it.
    pub fn resize(&mut self, width: i32, height: i32) {
        let size = Size::new(width, height);
        self.surface.set_viewport(size);
        for root in [self.body, self.overlay] {
            if let Some(data) = self.dom.get_mut(root) {
                data.bounds = size.to_region();
            }
        }
        self.layout_dirty = true;
    }

    // -----------------------------------------------------------------------
    // Focus indicator
    // -----------------------------------------------------------------------

    /// Draw the focus outline around `anchor`.
    pub fn show_focus_indicator(&mut self, anchor: NodeId) {
        self.focus_indicator.set_anchor(Some(anchor));
        self.layout_dirty = true;
    }

    pub fn hide_focus_indicator(&mut self) {
        self.focus_indicator.set_anchor(None);
        self.layout_dirty = true;
    }

    /// The node the focus outline is drawn around, if it is still alive.
    pub fn focus_indicator_anchor(&self) -> Option<NodeId> {
        self.focus_indicator.anchor(&self.dom)
    }

    // -----------------------------------------------------------------------
    // Layout and rendering
    // -----------------------------------------------------------------------

    /// Resolve depth and rewrite every node's geometry.
    ///
    /// Visible nodes write their paint at their normalized depth; nodes in a
    /// hidden subtree hide their slots.
    pub fn layout(&mut self) {
        let layers = resolve_layers(&mut self.dom, self.body, self.overlay, self.overlay_depth_factor);
        let max_index = layers.max_index;

        for root in [self.body, self.overlay] {
            for (id, visible) in self.dom.walk_with_visibility(root) {
                let Some(data) = self.dom.get(id) else {
                    continue;
                };
                if visible {
                    let z = normalize(data.depth.unwrap_or(0), max_index);
                    data.paint.write(&mut self.surface, &data.slots, data.bounds, z);
                } else {
                    self.surface.hide(&data.slots);
                }
            }
        }
        self.focus_indicator.write(&mut self.surface, &self.dom, max_index);

        self.layers = Some(layers);
        self.layout_dirty = false;
    }

    /// Draw one frame.
    ///
    /// Claims the backend context, lays out if anything moved, pushes cursor
    /// changes, uploads dirty buffers and the atlas, and draws. The context is
    /// released whether or not the frame succeeds.
    pub fn render(&mut self, backend: &mut dyn Backend) -> Result<FrameStats> {
        backend.make_current()?;
        let result = self.render_current(backend);
        backend.release();
        result
    }

    fn render_current(&mut self, backend: &mut dyn Backend) -> Result<FrameStats> {
        if self.layout_dirty {
            self.layout();
        }
        if self.pointer.cursor_pending {
            backend.set_cursor(self.pointer.cursor);
            self.pointer.cursor_pending = false;
        }
        let stats = self.surface.sync(backend)?;
        backend.draw(stats.vertices)?;
        Ok(stats)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
