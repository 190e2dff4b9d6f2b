use std::cell::RefCell;
use std::rc::Weak;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::decorator::{FrameState, WindowDecorator};
use super::stack::PanelHandle;
use super::workspace::WorkspaceId;
use crate::ui::UiFrame;
use crate::widget::{SharedWidget, Widget};

/// Binds one registered widget to its backing surface and z-order slot.
///
/// The node owns both. Dropping it releases the panel from the deck, which
/// is the only way a surface is destroyed.
pub struct Node {
    widget: Weak<RefCell<dyn Widget>>,
    surface: Buffer,
    panel: PanelHandle,
    scroll: u16,
    workspace: Option<WorkspaceId>,
}

impl Node {
    pub(crate) fn new(widget: &SharedWidget, rect: Rect, panel: PanelHandle) -> Self {
        Self {
            widget: std::rc::Rc::downgrade(widget),
            surface: Buffer::empty(rect),
            panel,
            scroll: 0,
            workspace: None,
        }
    }

    pub fn widget(&self) -> Option<SharedWidget> {
        self.widget.upgrade()
    }

    /// Screen rectangle covered by the surface.
    pub fn rect(&self) -> Rect {
        self.surface.area
    }

    pub fn surface(&self) -> &Buffer {
        &self.surface
    }

    pub fn panel(&self) -> &PanelHandle {
        &self.panel
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub(crate) fn set_scroll(&mut self, scroll: u16) {
        self.scroll = scroll;
    }

    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    pub(crate) fn set_workspace(&mut self, workspace: Option<WorkspaceId>) {
        self.workspace = workspace;
    }

    pub(crate) fn move_to(&mut self, x: u16, y: u16) {
        self.surface.area.x = x;
        self.surface.area.y = y;
    }

    /// Replace the surface with a blank one of the new size. Content is
    /// restored by the next repaint.
    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        let area = self.surface.area;
        if area.width == width && area.height == height {
            return;
        }
        self.surface = Buffer::empty(Rect::new(area.x, area.y, width, height));
        let max_scroll = self.max_scroll(height);
        self.scroll = self.scroll.min(max_scroll);
    }

    fn max_scroll(&self, surface_height: u16) -> u16 {
        self.widget
            .upgrade()
            .map(|w| w.borrow().size().1.saturating_sub(surface_height))
            .unwrap_or(0)
    }

    /// Draw the widget offscreen at its full size, frame it, then copy the
    /// part selected by the scroll offset into the surface.
    pub(crate) fn repaint(
        &mut self,
        widget: &mut dyn Widget,
        decorator: &dyn WindowDecorator,
        state: FrameState<'_>,
    ) {
        let (width, height) = widget.size();
        let full = Rect::new(0, 0, width, height);
        let mut scratch = Buffer::empty(full);
        {
            let mut frame = UiFrame::from_parts(full, &mut scratch);
            widget.draw(&mut frame);
        }
        if widget.has_border() {
            decorator.decorate(&mut scratch, full, state);
        }

        let dest = self.surface.area;
        for dy in 0..dest.height {
            let sy = dy.saturating_add(self.scroll);
            for dx in 0..dest.width {
                let Some(dst) = self
                    .surface
                    .cell_mut((dest.x.saturating_add(dx), dest.y.saturating_add(dy)))
                else {
                    continue;
                };
                match scratch.cell((dx, sy)) {
                    Some(src) => *dst = src.clone(),
                    None => dst.reset(),
                }
            }
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("rect", &self.surface.area)
            .field("panel", &self.panel.id())
            .field("scroll", &self.scroll)
            .field("workspace", &self.workspace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward_widget_base;
    use crate::widget::{WidgetBase, shared};
    use crate::window::decorator::BoxDecorator;
    use crate::window::stack::PanelDeck;

    struct Lines {
        base: WidgetBase,
    }

    impl Widget for Lines {
        forward_widget_base!();

        fn has_border(&self) -> bool {
            false
        }

        fn draw(&mut self, frame: &mut UiFrame<'_>) {
            let area = frame.area();
            let buffer = frame.buffer_mut();
            for y in 0..area.height {
                buffer.set_string(0, y, y.to_string(), ratatui::style::Style::default());
            }
        }
    }

    #[test]
    fn repaint_honors_scroll_offset() {
        let deck = PanelDeck::new();
        let widget = shared(Lines {
            base: WidgetBase::new(3, 6),
        });
        let mut node = Node::new(&widget, Rect::new(10, 4, 3, 3), deck.create());
        node.set_scroll(2);
        node.repaint(
            &mut *widget.borrow_mut(),
            &BoxDecorator,
            FrameState::default(),
        );
        assert_eq!(node.surface().cell((10, 4)).expect("cell").symbol(), "2");
        assert_eq!(node.surface().cell((10, 6)).expect("cell").symbol(), "4");
    }

    #[test]
    fn dropping_node_releases_panel() {
        let deck = PanelDeck::new();
        let widget = shared(Lines {
            base: WidgetBase::new(3, 3),
        });
        let node = Node::new(&widget, Rect::new(0, 0, 3, 3), deck.create());
        assert_eq!(deck.len(), 1);
        drop(node);
        assert!(deck.is_empty());
    }

    #[test]
    fn node_does_not_keep_widget_alive() {
        let deck = PanelDeck::new();
        let widget = shared(Lines {
            base: WidgetBase::new(3, 3),
        });
        let node = Node::new(&widget, Rect::new(0, 0, 3, 3), deck.create());
        drop(widget);
        assert!(node.widget().is_none());
    }

    #[test]
    fn resize_replaces_surface_and_keeps_origin() {
        let deck = PanelDeck::new();
        let widget = shared(Lines {
            base: WidgetBase::new(3, 3),
        });
        let mut node = Node::new(&widget, Rect::new(5, 5, 3, 3), deck.create());
        node.resize(8, 2);
        assert_eq!(node.rect(), Rect::new(5, 5, 8, 2));
    }
}
