//! Input routing.
//!
//! Keys go through a fixed chain: ignore-keys pass-through, the open menu,
//! the open list, `Alt+digit`, move/resize mode, global bindings, the
//! focused window's menu accelerators and finally the focused widget. The
//! first stage that consumes the key ends the chain.

use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::{Drag, KeyPressMode, WindowManager};
use crate::keybindings::Action;
use crate::taskbar;
use crate::widget::WidgetId;
use crate::window::geometry::rect_contains;
use crate::window::list_popup::{ListEntry, ListKind, PopupOutcome};

fn is_plain_escape(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc && key.modifiers.is_empty()
}

/// `Alt+1`..`Alt+9` select windows 1..9, `Alt+0` the tenth.
fn alt_digit(key: &KeyEvent) -> Option<usize> {
    if !key.modifiers.contains(KeyModifiers::ALT)
        || key.modifiers.contains(KeyModifiers::CONTROL)
    {
        return None;
    }
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let digit = c.to_digit(10)? as usize;
    Some(if digit == 0 { 9 } else { digit - 1 })
}

impl WindowManager {
    /// Route one terminal event. Everything done while handling it counts
    /// as a user action, so windows it opens are raised.
    pub fn process_input(&mut self, event: &Event) -> bool {
        self.begin_user_event();
        let consumed = match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.process_key(*key),
            Event::Mouse(mouse) => self.process_mouse(*mouse),
            Event::Resize(cols, rows) => {
                self.resize_terminal(*cols, *rows);
                true
            }
            _ => false,
        };
        self.end_user_event();
        consumed
    }

    pub fn process_key(&mut self, key: KeyEvent) -> bool {
        self.process_key_at(key, Instant::now())
    }

    /// [`WindowManager::process_key`] with an explicit clock, used to drive
    /// the Esc chord deterministically.
    pub fn process_key_at(&mut self, key: KeyEvent, now: Instant) -> bool {
        self.idle.mark_input();
        if self.mode == KeyPressMode::WaitOnChild {
            return false;
        }

        let key = match self.pending_escape.take() {
            Some(deadline) if now < deadline => {
                let mut chorded = key;
                chorded.modifiers.insert(KeyModifiers::ALT);
                chorded
            }
            Some(_) => {
                self.dispatch_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
                key
            }
            None => key,
        };

        if is_plain_escape(&key) && self.can_hold_escape() {
            self.pending_escape = Some(now + self.escape_timeout);
            return true;
        }
        self.dispatch_key(key)
    }

    fn can_hold_escape(&self) -> bool {
        !self.escape_timeout.is_zero()
            && self.mode == KeyPressMode::Normal
            && !self.ignore_keys
            && self.menu.is_none()
            && self.list_popup.is_none()
    }

    /// Deliver a held Esc as a plain Escape once its chord window passed.
    pub(super) fn expire_escape(&mut self, now: Instant) {
        let Some(deadline) = self.pending_escape else {
            return;
        };
        if now < deadline {
            return;
        }
        self.pending_escape = None;
        self.begin_user_event();
        self.dispatch_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        self.end_user_event();
    }

    pub fn escape_pending(&self) -> bool {
        self.pending_escape.is_some()
    }

    fn dispatch_key(&mut self, key: KeyEvent) -> bool {
        if self.ignore_keys {
            if self.keybindings.matches(Action::IgnoreKeysEnd, &key) {
                self.ignore_keys = false;
                tracing::debug!("ignore-keys mode ended");
                return true;
            }
            return self.focused().is_some_and(|top| self.key_to_widget(top, key));
        }

        if let Some(menu) = self.menu {
            let consumed = self.key_to_widget(menu, key);
            if !consumed && key.code == KeyCode::Esc && self.menu == Some(menu) {
                self.close(menu);
            }
            return true;
        }

        if self.list_popup.is_some() && self.key_to_list_popup(key) {
            return true;
        }

        if let Some(index) = alt_digit(&key) {
            self.switch_window_n(index);
            return true;
        }

        if matches!(self.mode, KeyPressMode::Move | KeyPressMode::Resize) {
            self.modal_key(key);
            return true;
        }

        if let Some(action) = self.keybindings.action_for_key(&key)
            && self.perform_action(action)
        {
            return true;
        }

        let Some(top) = self.focused() else {
            return false;
        };
        if self.accelerate(top, &key) {
            return true;
        }
        self.key_to_widget(top, key)
    }

    fn accelerate(&mut self, id: WidgetId, key: &KeyEvent) -> bool {
        let Some(widget) = self.widget_of(id) else {
            return false;
        };
        let item = widget.borrow().accelerator(key);
        let Some(item) = item else {
            return false;
        };
        let activated = widget.borrow_mut().activate_menu_item(&item);
        if activated {
            tracing::debug!(widget = ?id, %item, "menu accelerator");
            self.after_widget_input(id);
        }
        activated
    }

    fn key_to_widget(&mut self, id: WidgetId, key: KeyEvent) -> bool {
        let Some(widget) = self.widget_of(id) else {
            return false;
        };
        let consumed = widget.borrow_mut().key_pressed(&key);
        self.after_widget_input(id);
        consumed
    }

    /// Close a widget that asked for it, otherwise refresh its surface.
    fn after_widget_input(&mut self, id: WidgetId) {
        let Some(widget) = self.widget_of(id) else {
            return;
        };
        let close = widget.borrow().close_requested();
        if close {
            self.close(id);
        } else {
            self.repaint(id);
        }
    }

    fn key_to_list_popup(&mut self, key: KeyEvent) -> bool {
        let Some(popup) = self.list_popup.as_mut() else {
            return false;
        };
        match popup.handle_key(&key) {
            PopupOutcome::Consumed => true,
            PopupOutcome::Ignored => false,
            PopupOutcome::Close => {
                self.list_popup = None;
                true
            }
            PopupOutcome::Activate(entry) => {
                self.list_popup = None;
                match entry {
                    ListEntry::Window(id) => self.raise(id),
                    ListEntry::Workspace(ws) => {
                        self.switch_workspace(ws.index());
                    }
                    ListEntry::Action(label) => {
                        self.run_action(&label);
                    }
                    ListEntry::Binding(_) => {}
                }
                true
            }
            PopupOutcome::Shift(id, dir) => {
                self.shift_window(id, dir);
                true
            }
        }
    }

    /// Run a global action. Returns `false` when the action does not apply
    /// right now, so the key continues down the chain.
    pub fn perform_action(&mut self, action: Action) -> bool {
        match action {
            Action::WindowNext => self.switch_window(1, false),
            Action::WindowPrev => self.switch_window(-1, false),
            Action::WindowNextUrgent => self.switch_window(1, true),
            Action::WindowPrevUrgent => self.switch_window(-1, true),
            Action::WindowClose => {
                if self.list_popup.is_none() {
                    if let Some(top) = self.focused() {
                        self.close(top);
                    }
                    self.ensure_normal_mode();
                }
            }
            Action::WindowList => self.open_list(ListKind::Windows),
            Action::WorkspaceList => self.open_list(ListKind::Workspaces),
            Action::ActionList => self.open_list(ListKind::Actions),
            Action::WindowShiftLeft | Action::WindowShiftRight => {
                let dir = if action == Action::WindowShiftLeft { -1 } else { 1 };
                if let Some(top) = self.focused() {
                    self.shift_window(top, dir);
                }
            }
            Action::WindowScrollUp => self.scroll_focused(false),
            Action::WindowScrollDown => self.scroll_focused(true),
            Action::WindowTag => {
                if let Some(top) = self.focused() {
                    self.toggle_tag(top);
                }
            }
            Action::PlaceTagged => self.place_tagged(),
            Action::StartMove => self.start_modal(KeyPressMode::Move),
            Action::StartResize => self.start_modal(KeyPressMode::Resize),
            Action::RefreshScreen => self.refresh_screen(),
            Action::HelpForWm => self.open_list(ListKind::Help),
            Action::DumpScreen => {
                let path = self.dump_path.clone();
                if let Err(err) = self.dump_screen(&path) {
                    tracing::warn!(?path, error = %err, "failed to dump screen");
                }
            }
            Action::Quit => self.request_quit(),
            Action::WorkspaceNew => {
                self.workspace_new();
            }
            Action::WorkspaceNext => {
                self.switch_workspace_next();
            }
            Action::WorkspacePrev => {
                self.switch_workspace_prev();
            }
            Action::IgnoreKeysStart => {
                self.ignore_keys = true;
                tracing::debug!("ignore-keys mode started");
            }
            Action::IgnoreKeysEnd => return false,
        }
        true
    }

    pub fn ignoring_keys(&self) -> bool {
        self.ignore_keys
    }

    /// Raise the next (or previous) window in insertion order, or the next
    /// urgent one.
    pub fn switch_window(&mut self, dir: isize, urgent_only: bool) {
        if self.list_popup.is_some() || self.menu.is_some() {
            return;
        }
        let ws = self.current_workspace();
        if ws.is_empty() || ws.is_single() {
            return;
        }
        let list = ws.list().to_vec();
        let Some(origin) = ws.top_widget().and_then(|top| ws.list_position(top)) else {
            return;
        };
        self.ensure_normal_mode();

        let len = list.len() as isize;
        let mut pos = origin;
        let target = loop {
            pos = (pos as isize + dir).rem_euclid(len) as usize;
            if pos == origin {
                return;
            }
            let id = list[pos];
            if !urgent_only || self.widget_of(id).is_some_and(|w| w.borrow().is_urgent()) {
                break id;
            }
        };
        self.raise(target);
    }

    /// Raise the window at `index` in the current workspace's insertion
    /// order.
    pub fn switch_window_n(&mut self, index: usize) -> bool {
        let Some(id) = self.current_workspace().list().get(index).copied() else {
            return false;
        };
        self.raise(id);
        true
    }

    fn scroll_focused(&mut self, down: bool) {
        let Some(top) = self.focused() else {
            return;
        };
        let Some(node) = self.nodes.get(&top) else {
            return;
        };
        let Some(widget) = node.widget() else {
            return;
        };
        let height = widget.borrow().size().1;
        let scroll = node.scroll();
        let next = if down {
            if height.saturating_sub(scroll) <= node.rect().height {
                return;
            }
            scroll + 1
        } else {
            if scroll == 0 {
                return;
            }
            scroll - 1
        };
        if let Some(node) = self.nodes.get_mut(&top) {
            node.set_scroll(next);
        }
        self.repaint(top);
    }

    fn start_modal(&mut self, mode: KeyPressMode) {
        if self.list_popup.is_some() || self.menu.is_some() {
            return;
        }
        let Some(top) = self.focused() else {
            return;
        };
        self.set_mode(mode);
        self.reversed_border = Some(top);
        self.repaint(top);
    }

    fn modal_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            self.ensure_normal_mode();
            return;
        }
        let Some(id) = self.focused() else {
            self.ensure_normal_mode();
            return;
        };
        let Some(widget) = self.widget_of(id) else {
            self.ensure_normal_mode();
            return;
        };
        let ((x, y), (w, h)) = {
            let w = widget.borrow();
            (w.position(), w.size())
        };
        let max_x = self.bounds.max_x;
        let max_y = self.bounds.max_y;
        match (self.mode, key.code) {
            (KeyPressMode::Move, KeyCode::Left) if x > 0 => {
                self.move_to(id, x - 1, y);
            }
            (KeyPressMode::Move, KeyCode::Right) if x.saturating_add(w) < max_x => {
                self.move_to(id, x + 1, y);
            }
            (KeyPressMode::Move, KeyCode::Up) if y > 0 => {
                self.move_to(id, x, y - 1);
            }
            (KeyPressMode::Move, KeyCode::Down) if y.saturating_add(h) < max_y => {
                self.move_to(id, x, y + 1);
            }
            (KeyPressMode::Resize, KeyCode::Left) if w > 1 => {
                self.resize(id, w - 1, h);
            }
            (KeyPressMode::Resize, KeyCode::Right) if x.saturating_add(w) < max_x => {
                self.resize(id, w + 1, h);
            }
            (KeyPressMode::Resize, KeyCode::Up) if h > 1 => {
                self.resize(id, w, h - 1);
            }
            (KeyPressMode::Resize, KeyCode::Down) if y.saturating_add(h) < max_y => {
                self.resize(id, w, h + 1);
            }
            _ => {}
        }
    }

    /// Topmost shown window under a screen cell.
    pub fn widget_at(&self, x: u16, y: u16) -> Option<WidgetId> {
        self.deck
            .visible_order()
            .into_iter()
            .rev()
            .filter_map(|panel| self.panel_owners.get(&panel).copied())
            .find(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|node| rect_contains(node.rect(), x, y))
            })
    }

    pub fn process_mouse(&mut self, mouse: MouseEvent) -> bool {
        self.idle.mark_input();
        if self.mode == KeyPressMode::WaitOnChild {
            return false;
        }
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if row == self.bounds.taskbar_row() {
                    let list = self.current_workspace().list().to_vec();
                    return match taskbar::hit_test(self.bounds.max_x, list.len(), col) {
                        Some(index) => {
                            self.raise(list[index]);
                            true
                        }
                        None => false,
                    };
                }
                let Some(id) = self.widget_at(col, row) else {
                    return false;
                };
                let Some(rect) = self.nodes.get(&id).map(|n| n.rect()) else {
                    return false;
                };
                let transient = self.find_workspace(id).is_none();
                if !transient && !self.current_workspace().is_top(id) {
                    self.raise(id);
                }
                if !transient && row == rect.y {
                    self.drag = Some(Drag {
                        id,
                        offset_x: col - rect.x,
                    });
                }
                self.click_widget(id, mouse.kind, col - rect.x, row - rect.y);
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(drag) = self.drag else {
                    return false;
                };
                self.move_to(drag.id, col.saturating_sub(drag.offset_x), row);
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.take().is_some() {
                    return true;
                }
                self.click_at(mouse.kind, col, row)
            }
            _ => self.click_at(mouse.kind, col, row),
        }
    }

    fn click_at(&mut self, kind: MouseEventKind, col: u16, row: u16) -> bool {
        let Some(id) = self.widget_at(col, row) else {
            return false;
        };
        let Some(rect) = self.nodes.get(&id).map(|n| n.rect()) else {
            return false;
        };
        self.click_widget(id, kind, col - rect.x, row - rect.y)
    }

    fn click_widget(&mut self, id: WidgetId, kind: MouseEventKind, x: u16, y: u16) -> bool {
        let Some(widget) = self.widget_of(id) else {
            return false;
        };
        let scroll = self.nodes.get(&id).map(|n| n.scroll()).unwrap_or(0);
        let consumed = widget.borrow_mut().clicked(kind, x, y.saturating_add(scroll));
        self.after_widget_input(id);
        consumed
    }
}
