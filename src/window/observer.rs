use crate::widget::Widget;

use super::KeyPressMode;

/// Hooks fired by the window manager around window lifecycle changes.
///
/// Every method defaults to doing nothing (or accepting), so observers only
/// implement what they care about. The `confirm_*` hooks can veto a pending
/// geometry change; a single refusal turns the change into a no-op.
pub trait WmObserver {
    fn new_window(&mut self, _widget: &dyn Widget) {}

    fn decorate_window(&mut self, _widget: &dyn Widget) {}

    fn close_window(&mut self, _widget: &dyn Widget) {}

    fn confirm_resize(&mut self, _widget: &dyn Widget, _width: u16, _height: u16) -> bool {
        true
    }

    fn window_resized(&mut self, _widget: &dyn Widget) {}

    fn confirm_move(&mut self, _widget: &dyn Widget, _x: u16, _y: u16) -> bool {
        true
    }

    fn window_moved(&mut self, _widget: &dyn Widget) {}

    fn window_updated(&mut self, _widget: &dyn Widget) {}

    fn give_focus(&mut self, _widget: &dyn Widget) {}

    fn terminal_refresh(&mut self) {}

    fn mode_changed(&mut self, _mode: KeyPressMode) {}
}
