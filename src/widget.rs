//! The contract between the window manager and the widgets it stacks.
//!
//! Widgets are owned by the application. The window manager only keeps a
//! [`Weak`](std::rc::Weak) reference inside each node and addresses widgets
//! by their [`WidgetId`], so dropping a widget without closing it simply
//! leaves a dead node that the manager prunes on its next tick.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::{KeyEvent, MouseEventKind};

use crate::ui::UiFrame;

/// Stable identity of a top-level widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Per-axis maximize flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maximize {
    pub x: bool,
    pub y: bool,
}

impl Maximize {
    pub const NONE: Self = Self { x: false, y: false };
    pub const BOTH: Self = Self { x: true, y: true };
}

pub trait Widget {
    fn id(&self) -> WidgetId;

    fn position(&self) -> (u16, u16);
    fn set_position(&mut self, x: u16, y: u16);
    fn size(&self) -> (u16, u16);
    fn set_size(&mut self, width: u16, height: u16);

    /// Veto a pending resize. Refusing makes the resize a silent no-op.
    fn confirm_size(&self, _width: u16, _height: u16) -> bool {
        true
    }

    /// Veto a pending move.
    fn confirm_position(&self, _x: u16, _y: u16) -> bool {
        true
    }

    fn is_visible(&self) -> bool {
        true
    }

    /// Transient widgets (menus, popups) belong to no workspace and always
    /// stack above workspace windows.
    fn is_transient(&self) -> bool {
        false
    }

    fn takes_focus(&self) -> bool {
        true
    }

    fn is_urgent(&self) -> bool;
    fn set_urgent(&mut self, urgent: bool);

    fn has_focus(&self) -> bool;
    fn set_focus(&mut self, focused: bool);

    fn maximize(&self) -> Maximize {
        Maximize::NONE
    }

    fn has_border(&self) -> bool {
        true
    }

    fn title(&self) -> Option<String> {
        None
    }

    fn name(&self) -> Option<String> {
        None
    }

    /// Draw into an offscreen frame whose area is the widget's full size
    /// with its origin at `(0, 0)`.
    fn draw(&mut self, frame: &mut UiFrame<'_>);

    fn key_pressed(&mut self, _key: &KeyEvent) -> bool {
        false
    }

    /// Mouse press inside the widget, in widget-local coordinates.
    fn clicked(&mut self, _kind: MouseEventKind, _x: u16, _y: u16) -> bool {
        false
    }

    /// Menu item bound to `key` in this window's menu, if any.
    fn accelerator(&self, _key: &KeyEvent) -> Option<String> {
        None
    }

    fn activate_menu_item(&mut self, _item: &str) -> bool {
        false
    }

    /// Set once the widget wants to be closed; the window manager closes it
    /// after the event that produced the request.
    fn close_requested(&self) -> bool {
        false
    }
}

pub type SharedWidget = Rc<RefCell<dyn Widget>>;

pub fn shared<W: Widget + 'static>(widget: W) -> SharedWidget {
    Rc::new(RefCell::new(widget))
}

/// Bookkeeping most widgets need to satisfy [`Widget`]. Components embed
/// it and forward the geometry and flag accessors.
#[derive(Debug, Clone)]
pub struct WidgetBase {
    pub id: WidgetId,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub title: Option<String>,
    pub name: Option<String>,
    pub focused: bool,
    pub urgent: bool,
    pub visible: bool,
    pub transient: bool,
    pub maximize: Maximize,
    pub close_requested: bool,
}

impl WidgetBase {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            id: WidgetId::next(),
            x: 0,
            y: 0,
            width,
            height,
            title: None,
            name: None,
            focused: false,
            urgent: false,
            visible: true,
            transient: false,
            maximize: Maximize::NONE,
            close_requested: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// Implements the geometry and flag half of [`Widget`] for a type with a
/// `base: WidgetBase` field.
#[macro_export]
macro_rules! forward_widget_base {
    () => {
        fn id(&self) -> $crate::widget::WidgetId {
            self.base.id
        }
        fn position(&self) -> (u16, u16) {
            (self.base.x, self.base.y)
        }
        fn set_position(&mut self, x: u16, y: u16) {
            self.base.x = x;
            self.base.y = y;
        }
        fn size(&self) -> (u16, u16) {
            (self.base.width, self.base.height)
        }
        fn set_size(&mut self, width: u16, height: u16) {
            self.base.width = width;
            self.base.height = height;
        }
        fn is_visible(&self) -> bool {
            self.base.visible
        }
        fn is_transient(&self) -> bool {
            self.base.transient
        }
        fn is_urgent(&self) -> bool {
            self.base.urgent
        }
        fn set_urgent(&mut self, urgent: bool) {
            self.base.urgent = urgent;
        }
        fn has_focus(&self) -> bool {
            self.base.focused
        }
        fn set_focus(&mut self, focused: bool) {
            self.base.focused = focused;
        }
        fn maximize(&self) -> $crate::widget::Maximize {
            self.base.maximize
        }
        fn title(&self) -> Option<String> {
            self.base.title.clone()
        }
        fn name(&self) -> Option<String> {
            self.base.name.clone()
        }
        fn close_requested(&self) -> bool {
            self.base.close_requested
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_ids_are_unique_and_increasing() {
        let a = WidgetId::next();
        let b = WidgetId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn widget_base_builders_set_fields() {
        let base = WidgetBase::new(10, 4).with_title("Chat").with_name("chat").at(3, 2);
        assert_eq!(base.title.as_deref(), Some("Chat"));
        assert_eq!(base.name.as_deref(), Some("chat"));
        assert_eq!((base.x, base.y, base.width, base.height), (3, 2, 10, 4));
        assert!(base.visible);
        assert!(!base.transient);
    }
}
