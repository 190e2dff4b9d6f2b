use crate::constants::UNNAMED_WORKSPACE_LABEL;
use crate::widget::WidgetId;

/// Index of a workspace. Workspaces are never removed at runtime, so the
/// index stays valid for the life of the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkspaceId(pub(crate) usize);

impl WorkspaceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named group of top-level windows.
///
/// `list` keeps insertion order (taskbar, window list, `Alt+digit`), while
/// `ordered` keeps stacking order with the focused window at the front.
/// Both always hold the same set of widgets.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    name: Option<String>,
    list: Vec<WidgetId>,
    ordered: Vec<WidgetId>,
}

impl Workspace {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            list: Vec::new(),
            ordered: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_WORKSPACE_LABEL)
    }

    pub fn list(&self) -> &[WidgetId] {
        &self.list
    }

    pub fn ordered(&self) -> &[WidgetId] {
        &self.ordered
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.list.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.ordered.len() == 1
    }

    pub fn top_widget(&self) -> Option<WidgetId> {
        self.ordered.first().copied()
    }

    pub fn is_top(&self, id: WidgetId) -> bool {
        self.top_widget() == Some(id)
    }

    /// Add a widget as the new top. Returns the previous top, which the
    /// caller unfocuses.
    pub fn add_widget(&mut self, id: WidgetId) -> Option<WidgetId> {
        if self.contains(id) {
            return None;
        }
        let previous = self.top_widget();
        self.list.push(id);
        self.ordered.insert(0, id);
        previous
    }

    /// Add a widget at the bottom of the stack without touching focus.
    pub fn append_widget(&mut self, id: WidgetId) {
        if self.contains(id) {
            return;
        }
        self.list.push(id);
        self.ordered.push(id);
    }

    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        let before = self.list.len();
        self.list.retain(|w| *w != id);
        self.ordered.retain(|w| *w != id);
        before != self.list.len()
    }

    /// Move `id` to the front of the stacking order. Returns the widget that
    /// lost the top spot, or `None` when `id` already was on top or is not a
    /// member.
    pub fn bring_to_front(&mut self, id: WidgetId) -> Option<WidgetId> {
        let pos = self.ordered.iter().position(|w| *w == id)?;
        if pos == 0 {
            return None;
        }
        let previous = self.ordered[0];
        let item = self.ordered.remove(pos);
        self.ordered.insert(0, item);
        Some(previous)
    }

    pub fn list_position(&self, id: WidgetId) -> Option<usize> {
        self.list.iter().position(|w| *w == id)
    }

    /// Reorder `id` in the insertion list by `dir` steps, wrapping around at
    /// either end.
    pub fn shift(&mut self, id: WidgetId, dir: isize) -> bool {
        let Some(pos) = self.list_position(id) else {
            return false;
        };
        if self.list.len() < 2 || dir == 0 {
            return false;
        }
        let item = self.list.remove(pos);
        let len = self.list.len() as isize + 1;
        let target = (pos as isize + dir).rem_euclid(len) as usize;
        self.list.insert(target, item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<WidgetId> {
        (0..n).map(|_| WidgetId::next()).collect()
    }

    #[test]
    fn add_widget_becomes_top_and_reports_previous() {
        let w = ids(2);
        let mut ws = Workspace::new(Some("default".into()));
        assert_eq!(ws.add_widget(w[0]), None);
        assert_eq!(ws.add_widget(w[1]), Some(w[0]));
        assert!(ws.is_top(w[1]));
        assert_eq!(ws.list(), &[w[0], w[1]]);
        assert_eq!(ws.ordered(), &[w[1], w[0]]);
    }

    #[test]
    fn append_widget_goes_to_bottom() {
        let w = ids(2);
        let mut ws = Workspace::new(None);
        ws.append_widget(w[0]);
        ws.append_widget(w[1]);
        assert!(ws.is_top(w[0]));
        assert_eq!(ws.ordered(), &[w[0], w[1]]);
    }

    #[test]
    fn bring_to_front_is_idempotent() {
        let w = ids(3);
        let mut ws = Workspace::new(None);
        for id in &w {
            ws.append_widget(*id);
        }
        assert_eq!(ws.bring_to_front(w[2]), Some(w[0]));
        let once = ws.ordered().to_vec();
        assert_eq!(ws.bring_to_front(w[2]), None);
        assert_eq!(ws.ordered(), once.as_slice());
    }

    #[test]
    fn list_and_stack_hold_same_set() {
        let w = ids(4);
        let mut ws = Workspace::new(None);
        ws.append_widget(w[0]);
        ws.add_widget(w[1]);
        ws.append_widget(w[2]);
        ws.add_widget(w[3]);
        ws.bring_to_front(w[2]);
        ws.remove_widget(w[1]);
        let mut list = ws.list().to_vec();
        let mut ordered = ws.ordered().to_vec();
        list.sort();
        ordered.sort();
        assert_eq!(list, ordered);
        assert!(!ws.contains(w[1]));
    }

    #[test]
    fn single_and_empty_queries() {
        let w = ids(1);
        let mut ws = Workspace::new(None);
        assert!(ws.is_empty());
        ws.append_widget(w[0]);
        assert!(ws.is_single());
        assert_eq!(ws.label(), UNNAMED_WORKSPACE_LABEL);
    }

    #[test]
    fn shift_wraps_around_the_list() {
        let w = ids(3);
        let mut ws = Workspace::new(None);
        for id in &w {
            ws.append_widget(*id);
        }
        assert!(ws.shift(w[0], -1));
        assert_eq!(ws.list(), &[w[1], w[2], w[0]]);
        assert!(ws.shift(w[0], 1));
        assert_eq!(ws.list(), &[w[0], w[1], w[2]]);
        assert!(ws.shift(w[1], 1));
        assert_eq!(ws.list(), &[w[0], w[2], w[1]]);
    }
}
