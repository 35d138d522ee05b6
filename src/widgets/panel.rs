//! Panel widget: a bordered background block other widgets sit on.

use crate::dom::{NodeData, NodeId};
use crate::geometry::Region;
use crate::screen::Screen;
use crate::widget::skin::PANEL_FILL;
use crate::widget::{Paint, Widget};

/// A passive bordered container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    id: NodeId,
}

impl Panel {
    /// Create a panel under `parent`.
    pub fn new(screen: &mut Screen, parent: NodeId, bounds: Region) -> Self {
        let paint = Paint::Bordered { block: screen.skin().panel, fill: PANEL_FILL };
        let id = screen.spawn(parent, NodeData::new("Panel").with_bounds(bounds).with_paint(paint));
        Self { id }
    }

    /// Create a panel that draws nothing, for grouping only.
    pub fn invisible(screen: &mut Screen, parent: NodeId, bounds: Region) -> Self {
        let id = screen.spawn(parent, NodeData::new("Panel").with_bounds(bounds));
        Self { id }
    }
}

impl Widget for Panel {
    fn id(&self) -> NodeId {
        self.id
    }

    fn widget_type(&self) -> &'static str {
        "Panel"
    }
}
