//! Widget trait: a typed handle onto a node in the screen's tree.
//!
//! Concrete widgets are thin: they remember their [`NodeId`] and whatever
//! handles they need for their own behavior. Everything every widget can do
//! (move, show, hide, listen, reorder, delete) lives once on [`WidgetExt`] and
//! goes through the [`Screen`].

use crate::dom::NodeId;
use crate::event::{Event, EventName};
use crate::geometry::Region;
use crate::screen::Screen;

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Core trait implemented by all widgets.
pub trait Widget {
    /// The node backing this widget.
    fn id(&self) -> NodeId;

    /// The type name recorded on the node (e.g. "Button").
    fn widget_type(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// WidgetExt
// ---------------------------------------------------------------------------

/// Shared widget operations.
///
/// Automatically implemented for all types that implement `Widget`.
pub trait WidgetExt: Widget {
    /// Make the widget (and its subtree) visible and hit-testable.
    fn show(&self, screen: &mut Screen) {
        screen.set_visible(self.id(), true);
    }

    /// Hide the widget and its subtree.
    fn hide(&self, screen: &mut Screen) {
        screen.set_visible(self.id(), false);
    }

    /// Whether the widget still exists and is visible.
    fn is_visible(&self, screen: &Screen) -> bool {
        screen.dom().get(self.id()).is_some_and(|d| d.visible)
    }

    /// Move and resize the widget.
    fn set_bounds(&self, screen: &mut Screen, bounds: Region) {
        screen.set_bounds(self.id(), bounds);
    }

    /// Current bounds, if the widget still exists.
    fn bounds(&self, screen: &Screen) -> Option<Region> {
        screen.dom().get(self.id()).map(|d| d.bounds)
    }

    /// Install a listener on the widget's node.
    fn on<F>(&self, screen: &mut Screen, name: EventName, listener: F)
    where
        F: Fn(&mut Event, &mut Screen) + 'static,
        Self: Sized,
    {
        screen.on(self.id(), name, listener);
    }

    /// Require this widget to render in front of `other`.
    fn render_above(&self, screen: &mut Screen, other: &dyn Widget) {
        screen.render_above(self.id(), other.id());
    }

    /// Delete the widget and its subtree, releasing their slots.
    fn delete(&self, screen: &mut Screen) {
        screen.delete(self.id());
    }
}

// Blanket implementation: every Widget gets WidgetExt for free.
impl<T: Widget> WidgetExt for T {}
