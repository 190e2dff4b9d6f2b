//! Window, workspace, action and key binding lists shown on top of
//! everything else.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;

use super::workspace::WorkspaceId;
use crate::components::ListComponent;
use crate::keybindings::Action;
use crate::ui::UiFrame;
use crate::widget::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Windows,
    Workspaces,
    Actions,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    Window(WidgetId),
    Workspace(WorkspaceId),
    Action(String),
    Binding(Action),
}

/// What the window manager should do after a key reached the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupOutcome {
    Consumed,
    Ignored,
    Close,
    Activate(ListEntry),
    /// Move a window one slot in its workspace's insertion order.
    Shift(WidgetId, isize),
}

#[derive(Debug, Clone)]
pub struct ListPopup {
    kind: ListKind,
    entries: Vec<ListEntry>,
    list: ListComponent,
    area: Rect,
}

impl ListPopup {
    pub fn new(kind: ListKind, rows: Vec<(ListEntry, String)>, area: Rect) -> Self {
        let title = match kind {
            ListKind::Windows => "Window List",
            ListKind::Workspaces => "Workspace List",
            ListKind::Actions => "Actions",
            ListKind::Help => "Key Bindings",
        };
        let mut popup = Self {
            kind,
            entries: Vec::new(),
            list: ListComponent::new(title),
            area,
        };
        popup.set_rows(rows);
        popup
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn labels(&self) -> &[String] {
        self.list.items()
    }

    /// Replace the rows, keeping the selection on the same entry when it
    /// survives.
    pub fn set_rows(&mut self, rows: Vec<(ListEntry, String)>) {
        let keep = self.selected_entry().cloned();
        let (entries, labels): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        self.entries = entries;
        self.list.set_items(labels);
        if let Some(keep) = keep {
            self.select(&keep);
        }
    }

    pub fn select(&mut self, entry: &ListEntry) -> bool {
        match self.entries.iter().position(|e| e == entry) {
            Some(index) => {
                self.list.set_selected(index);
                true
            }
            None => false,
        }
    }

    pub fn selected_entry(&self) -> Option<&ListEntry> {
        self.entries.get(self.list.selected())
    }

    pub fn remove_window(&mut self, id: WidgetId) {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| *e == ListEntry::Window(id))
        else {
            return;
        };
        self.entries.remove(index);
        let mut labels = self.list.items().to_vec();
        labels.remove(index);
        self.list.set_items(labels);
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PopupOutcome {
        match key.code {
            KeyCode::Esc => return PopupOutcome::Close,
            KeyCode::Enter => {
                return match self.selected_entry() {
                    Some(entry) => PopupOutcome::Activate(entry.clone()),
                    None => PopupOutcome::Close,
                };
            }
            KeyCode::Char(c @ (',' | '-' | '.' | '=')) if self.kind == ListKind::Windows => {
                let dir = if matches!(c, ',' | '-') {
                    -1
                } else {
                    1
                };
                if let Some(ListEntry::Window(id)) = self.selected_entry() {
                    return PopupOutcome::Shift(*id, dir);
                }
                return PopupOutcome::Consumed;
            }
            _ => {}
        }
        if self.list.handle_key(key) {
            PopupOutcome::Consumed
        } else {
            PopupOutcome::Ignored
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = self.area;
        self.list.render(frame, area);
    }
}
