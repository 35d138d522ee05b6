//! Popup widget: a panel on the overlay layer.

use crate::dom::{NodeData, NodeId};
use crate::geometry::Region;
use crate::screen::Screen;
use crate::widget::skin::PANEL_FILL;
use crate::widget::{Paint, Widget};

/// A panel that renders and hit-tests in front of all body content.
///
/// Popups start hidden. A pointer press outside every visible popup hides
/// them all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Popup {
    id: NodeId,
}

impl Popup {
    pub fn new(screen: &mut Screen, bounds: Region) -> Self {
        let overlay = screen.overlay();
        let paint = Paint::Bordered { block: screen.skin().panel, fill: PANEL_FILL };
        let data = NodeData::new("Popup").with_bounds(bounds).with_paint(paint).visible(false);
        let id = screen.spawn(overlay, data);
        Self { id }
    }

    /// Show the popup and draw the focus outline around it.
    pub fn open(&self, screen: &mut Screen) {
        screen.set_visible(self.id, true);
        screen.show_focus_indicator(self.id);
    }

    /// Hide the popup. The focus outline goes with it if it was on the popup.
    pub fn close(&self, screen: &mut Screen) {
        screen.set_visible(self.id, false);
        if screen.focus_indicator_anchor() == Some(self.id) {
            screen.hide_focus_indicator();
        }
    }
}

impl Widget for Popup {
    fn id(&self) -> NodeId {
        self.id
    }

    fn widget_type(&self) -> &'static str {
        "Popup"
    }
}
