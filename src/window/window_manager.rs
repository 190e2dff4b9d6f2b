use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::decorator::{BoxDecorator, FrameState, WindowDecorator};
use super::geometry::{ScreenBounds, initial_placement, sanitize_position, surface_size};
use super::idle::IdleTracker;
use super::list_popup::{ListEntry, ListKind, ListPopup};
use super::node::Node;
use super::observer::WmObserver;
use super::positions::PositionStore;
use super::stack::{PanelDeck, PanelId};
use super::workspace::{Workspace, WorkspaceId};
use crate::config::Config;
use crate::constants::{
    DEFAULT_DUMP_FILE, DEFAULT_WORKSPACE_NAME, ESCAPE_CHORD_TIMEOUT, UNTITLED_WINDOW_LABEL,
};
use crate::error::WmResult;
use crate::keybindings::{Action, KeyBindings};
use crate::taskbar::{self, TaskbarItem};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};
use crate::widget::{Maximize, SharedWidget, Widget, WidgetId};

mod input;

/// Keyboard mode of the window manager.
///
/// - Normal: keys are routed through menus, lists, bindings and widgets.
/// - Move/Resize: arrows act on the top window until Enter or Esc.
/// - WaitOnChild: the terminal belongs to a child process; keys are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPressMode {
    #[default]
    Normal,
    Move,
    Resize,
    WaitOnChild,
}

pub type ActionCallback = Box<dyn FnMut(&mut WindowManager)>;

struct NamedAction {
    label: String,
    callback: ActionCallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    id: WidgetId,
    offset_x: u16,
}

/// Stacking window manager over a single terminal surface.
///
/// Widgets stay owned by the application; the manager keeps one [`Node`] per
/// registered widget, grouped into workspaces of which exactly one is
/// current. All timers are deadlines advanced by [`WindowManager::tick`].
pub struct WindowManager {
    bounds: ScreenBounds,
    deck: PanelDeck,
    workspaces: Vec<Workspace>,
    current: WorkspaceId,
    nodes: BTreeMap<WidgetId, Node>,
    panel_owners: BTreeMap<PanelId, WidgetId>,
    mode: KeyPressMode,
    tagged: Vec<WidgetId>,
    menu: Option<WidgetId>,
    list_popup: Option<ListPopup>,
    actions: Vec<NamedAction>,
    positions: PositionStore,
    title_places: BTreeMap<String, WorkspaceId>,
    name_places: BTreeMap<String, WorkspaceId>,
    idle: IdleTracker,
    activity: Vec<WorkspaceId>,
    activity_message: Option<String>,
    observers: Vec<Box<dyn WmObserver>>,
    keybindings: KeyBindings,
    decorator: Box<dyn WindowDecorator>,
    user_event_depth: usize,
    ignore_keys: bool,
    escape_timeout: Duration,
    pending_escape: Option<Instant>,
    reversed_border: Option<WidgetId>,
    drag: Option<Drag>,
    closed_windows: Vec<WidgetId>,
    child_request: Option<Vec<String>>,
    dump_path: PathBuf,
    quit_requested: bool,
    full_redraw: bool,
}

impl WindowManager {
    /// Manager for a `cols` x `rows` terminal with a single "default"
    /// workspace and positions remembered for this session only.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            bounds: ScreenBounds::from_terminal(cols, rows),
            deck: PanelDeck::new(),
            workspaces: vec![Workspace::new(Some(DEFAULT_WORKSPACE_NAME.to_string()))],
            current: WorkspaceId(0),
            nodes: BTreeMap::new(),
            panel_owners: BTreeMap::new(),
            mode: KeyPressMode::Normal,
            tagged: Vec::new(),
            menu: None,
            list_popup: None,
            actions: Vec::new(),
            positions: PositionStore::in_memory(),
            title_places: BTreeMap::new(),
            name_places: BTreeMap::new(),
            idle: IdleTracker::new(Instant::now()),
            activity: Vec::new(),
            activity_message: None,
            observers: Vec::new(),
            keybindings: KeyBindings::default(),
            decorator: Box::new(BoxDecorator),
            user_event_depth: 0,
            ignore_keys: false,
            escape_timeout: ESCAPE_CHORD_TIMEOUT,
            pending_escape: None,
            reversed_border: None,
            drag: None,
            closed_windows: Vec::new(),
            child_request: None,
            dump_path: PathBuf::from(DEFAULT_DUMP_FILE),
            quit_requested: false,
            full_redraw: false,
        }
    }

    /// Build from configuration: declared workspaces and their placement
    /// rules, key overrides, timers and the persisted positions.
    pub fn with_config(config: &Config, cols: u16, rows: u16) -> WmResult<Self> {
        let mut wm = Self::new(cols, rows);
        wm.keybindings = config.keybindings()?;
        wm.idle = IdleTracker::with_interval(Instant::now(), config.idle_check_interval());
        wm.escape_timeout = config.escape_chord_timeout();
        wm.dump_path = config.dump_path();
        if let Some(path) = config.positions_path() {
            wm.positions = PositionStore::open(path).with_write_delay(config.position_write_delay());
        }
        if !config.workspaces.is_empty() {
            wm.workspaces.clear();
            for ws in &config.workspaces {
                let name = (!ws.name.is_empty()).then(|| ws.name.clone());
                let id = wm.add_workspace(name);
                for title in &ws.window_titles {
                    wm.set_place_by_title(title, id);
                }
                for name in &ws.window_names {
                    wm.set_place_by_name(name, id);
                }
            }
        }
        tracing::debug!(
            workspaces = wm.workspaces.len(),
            positions = wm.positions.len(),
            "window manager configured"
        );
        Ok(wm)
    }

    pub fn set_positions(&mut self, positions: PositionStore) {
        self.positions = positions;
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn set_decorator(&mut self, decorator: Box<dyn WindowDecorator>) {
        self.decorator = decorator;
    }

    pub fn set_dump_path(&mut self, path: impl Into<PathBuf>) {
        self.dump_path = path.into();
    }

    pub fn dump_path(&self) -> &Path {
        &self.dump_path
    }

    pub fn set_escape_timeout(&mut self, timeout: Duration) {
        self.escape_timeout = timeout;
    }

    pub fn add_observer(&mut self, observer: Box<dyn WmObserver>) {
        self.observers.push(observer);
    }

    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    pub fn mode(&self) -> KeyPressMode {
        self.mode
    }

    pub fn add_workspace(&mut self, name: Option<String>) -> WorkspaceId {
        self.workspaces.push(Workspace::new(name));
        WorkspaceId(self.workspaces.len() - 1)
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(id.index())
    }

    pub fn current_workspace_id(&self) -> WorkspaceId {
        self.current
    }

    pub fn current_workspace(&self) -> &Workspace {
        &self.workspaces[self.current.index()]
    }

    pub fn find_workspace(&self, id: WidgetId) -> Option<WorkspaceId> {
        self.nodes.get(&id).and_then(Node::workspace)
    }

    /// Windows whose title contains `pattern` are placed on `ws`.
    pub fn set_place_by_title(&mut self, pattern: &str, ws: WorkspaceId) {
        self.title_places.insert(pattern.to_string(), ws);
    }

    /// Windows whose name contains `pattern` are placed on `ws`.
    pub fn set_place_by_name(&mut self, pattern: &str, ws: WorkspaceId) {
        self.name_places.insert(pattern.to_string(), ws);
    }

    fn placement_for(&self, title: Option<&str>, name: Option<&str>) -> WorkspaceId {
        let by_title = title.and_then(|title| {
            self.title_places
                .iter()
                .find(|(pattern, _)| title.contains(pattern.as_str()))
        });
        let by_name = || {
            name.and_then(|name| {
                self.name_places
                    .iter()
                    .find(|(pattern, _)| name.contains(pattern.as_str()))
            })
        };
        match by_title.or_else(by_name) {
            Some((_, ws)) if ws.index() < self.workspaces.len() => *ws,
            _ => self.current,
        }
    }

    /// Make workspace `index` current. Returns `false` when it does not
    /// exist.
    pub fn switch_workspace(&mut self, index: usize) -> bool {
        if index >= self.workspaces.len() {
            return false;
        }
        self.list_popup = None;
        self.ensure_normal_mode();

        let incoming = WorkspaceId(index);
        if incoming != self.current {
            let outgoing = self.workspaces[self.current.index()].ordered().to_vec();
            for id in outgoing {
                if let Some(node) = self.nodes.get(&id) {
                    node.panel().hide();
                }
            }
            self.current = incoming;
        }

        let ordered = self.workspaces[index].ordered().to_vec();
        for id in ordered.iter().rev() {
            if let Some(node) = self.nodes.get(id) {
                node.panel().show();
            }
            self.repaint(*id);
        }
        if let Some(top) = ordered.first() {
            self.give_focus(*top);
        }
        self.restack_transients();

        if let Some(pos) = self.activity.iter().position(|ws| *ws == incoming) {
            self.activity.remove(pos);
            self.rebuild_activity_message();
        }
        tracing::debug!(workspace = index, "switched workspace");
        true
    }

    pub fn switch_workspace_next(&mut self) -> bool {
        self.switch_workspace(self.current.index() + 1)
    }

    pub fn switch_workspace_prev(&mut self) -> bool {
        match self.current.index().checked_sub(1) {
            Some(index) => self.switch_workspace(index),
            None => false,
        }
    }

    /// Create an unnamed workspace and switch to it.
    pub fn workspace_new(&mut self) -> WorkspaceId {
        let id = self.add_workspace(None);
        self.switch_workspace(id.index());
        id
    }

    pub fn move_widget_to_workspace(&mut self, to: WorkspaceId, id: WidgetId) {
        if to.index() >= self.workspaces.len() {
            return;
        }
        let Some(from) = self.find_workspace(id) else {
            return;
        };
        if from == to {
            return;
        }
        self.workspaces[from.index()].remove_widget(id);
        if let Some(previous) = self.workspaces[to.index()].add_widget(id) {
            self.set_widget_focus(previous, false);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_workspace(Some(to));
            if to == self.current {
                node.panel().show();
            } else {
                node.panel().hide();
            }
        }
        self.repaint(id);
        if from == self.current
            && let Some(top) = self.workspaces[from.index()].top_widget()
        {
            self.give_focus(top);
        }
        self.restack_transients();
        tracing::debug!(widget = ?id, from = from.index(), to = to.index(), "moved window to workspace");
    }

    fn mark_activity(&mut self, ws: WorkspaceId) {
        if ws == self.current || self.activity.contains(&ws) {
            return;
        }
        self.activity.insert(0, ws);
        self.rebuild_activity_message();
    }

    fn rebuild_activity_message(&mut self) {
        self.activity_message = if self.activity.is_empty() {
            None
        } else {
            let labels = self
                .activity
                .iter()
                .filter_map(|ws| self.workspaces.get(ws.index()))
                .map(Workspace::label)
                .collect::<Vec<_>>();
            Some(format!("act: {}", labels.join(", ")))
        };
    }

    /// Workspaces with unseen urgent activity, most recent first.
    pub fn pending_activity(&self) -> &[WorkspaceId] {
        &self.activity
    }

    pub fn activity_message(&self) -> Option<&str> {
        self.activity_message.as_deref()
    }

    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: WidgetId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn surface(&self, id: WidgetId) -> Option<&Buffer> {
        self.nodes.get(&id).map(Node::surface)
    }

    fn widget_of(&self, id: WidgetId) -> Option<SharedWidget> {
        self.nodes.get(&id).and_then(Node::widget)
    }

    pub fn register(&mut self, widget: &SharedWidget) {
        let (id, visible, transient, title, name) = {
            let w = widget.borrow();
            (w.id(), w.is_visible(), w.is_transient(), w.title(), w.name())
        };
        if self.nodes.contains_key(&id) {
            return;
        }
        if !visible {
            tracing::debug!(widget = ?id, "not registering hidden widget");
            return;
        }

        if let Some(title) = title.as_deref()
            && let Some(pos) = self.positions.get(title)
        {
            let mut w = widget.borrow_mut();
            let (x, y) = sanitize_position(pos, w.size(), w.maximize(), self.bounds);
            w.set_position(x, y);
        }
        self.notify_widget(widget, |obs, w| obs.new_window(w));

        let rect = self.place_new(widget);
        let panel = self.deck.create();
        self.panel_owners.insert(panel.id(), id);
        self.nodes.insert(id, Node::new(widget, rect, panel));

        if !transient {
            let ws = self.placement_for(title.as_deref(), name.as_deref());
            self.workspaces[ws.index()].append_widget(id);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.set_workspace(Some(ws));
            }
            // Background creation never switches workspace, even for the
            // first window of a hidden workspace.
            let on_top = ws == self.current && self.workspaces[ws.index()].is_top(id);
            if self.in_user_event() || on_top {
                self.raise(id);
            } else {
                {
                    let mut w = widget.borrow_mut();
                    w.set_focus(false);
                    w.set_urgent(true);
                }
                if let Some(node) = self.nodes.get(&id) {
                    node.panel().bottom();
                    if ws != self.current {
                        node.panel().hide();
                    }
                }
                self.mark_activity(ws);
            }
        }
        self.restack_transients();

        self.notify_widget(widget, |obs, w| obs.decorate_window(w));
        self.repaint(id);
        tracing::debug!(widget = ?id, ?title, transient, "registered window");
    }

    /// Ask observers to (re)decorate a window.
    pub fn decorate(&mut self, widget: &SharedWidget) {
        self.notify_widget(widget, |obs, w| obs.decorate_window(w));
    }

    pub fn close(&mut self, id: WidgetId) {
        let Some(node) = self.nodes.get(&id) else {
            tracing::debug!(widget = ?id, "close: window not managed");
            return;
        };
        let ws = node.workspace();
        if let Some(widget) = node.widget() {
            self.notify_widget(&widget, |obs, w| obs.close_window(w));
        }
        if let Some(node) = self.nodes.remove(&id) {
            self.panel_owners.remove(&node.panel().id());
        }

        self.tagged.retain(|t| *t != id);
        if self.menu == Some(id) {
            self.menu = None;
        }
        if let Some(popup) = self.list_popup.as_mut() {
            popup.remove_window(id);
        }
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        if self.reversed_border == Some(id) {
            self.reversed_border = None;
            self.ensure_normal_mode();
        }

        match ws {
            Some(ws) => {
                self.workspaces[ws.index()].remove_widget(id);
                if ws == self.current
                    && let Some(top) = self.workspaces[ws.index()].top_widget()
                {
                    self.raise(top);
                }
            }
            None => {
                if let Some(top) = self.current_workspace().top_widget() {
                    self.repaint(top);
                }
            }
        }
        self.closed_windows.push(id);
        tracing::debug!(widget = ?id, "closed window");
    }

    /// Widgets closed since the last call, in closing order.
    pub fn take_closed_windows(&mut self) -> Vec<WidgetId> {
        std::mem::take(&mut self.closed_windows)
    }

    /// Re-copy a widget's content after it changed. Unknown widgets are
    /// registered.
    pub fn update(&mut self, widget: &SharedWidget) {
        let id = widget.borrow().id();
        let Some(node) = self.nodes.get(&id) else {
            self.register(widget);
            return;
        };
        let ws = node.workspace();
        self.notify_widget(widget, |obs, w| obs.window_updated(w));
        match ws {
            Some(ws) if ws != self.current => {
                if widget.borrow().is_urgent() {
                    self.mark_activity(ws);
                }
            }
            _ => self.repaint(id),
        }
    }

    /// Bring `id` to the front of its workspace, switching workspace when
    /// needed. Raising any window other than the one being moved or resized
    /// ends that mode.
    pub fn raise(&mut self, id: WidgetId) {
        if !self.nodes.contains_key(&id) {
            tracing::debug!(widget = ?id, "raise: window not managed");
            return;
        }
        if self.reversed_border.is_some_and(|modal| modal != id) {
            self.ensure_normal_mode();
        }
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let Some(ws) = node.workspace() {
            if ws != self.current {
                self.switch_workspace(ws.index());
            }
            if let Some(previous) = self.workspaces[ws.index()].bring_to_front(id) {
                self.set_widget_focus(previous, false);
            }
        }
        self.give_focus(id);
    }

    fn give_focus(&mut self, id: WidgetId) {
        let Some(widget) = self.widget_of(id) else {
            return;
        };
        {
            let mut w = widget.borrow_mut();
            w.set_urgent(false);
            if w.takes_focus() {
                w.set_focus(true);
            }
        }
        if let Some(node) = self.nodes.get(&id) {
            node.panel().top();
        }
        self.restack_transients();
        self.repaint(id);
        self.notify_widget(&widget, |obs, w| obs.give_focus(w));
    }

    fn set_widget_focus(&mut self, id: WidgetId, focused: bool) {
        if let Some(widget) = self.widget_of(id) {
            widget.borrow_mut().set_focus(focused);
            self.repaint(id);
        }
    }

    /// Keep transient windows above workspace windows, and the menu above
    /// everything.
    fn restack_transients(&mut self) {
        for panel in self.deck.visible_order() {
            let Some(id) = self.panel_owners.get(&panel) else {
                continue;
            };
            if let Some(node) = self.nodes.get(id)
                && node.workspace().is_none()
                && self.menu != Some(*id)
            {
                node.panel().top();
            }
        }
        if let Some(menu) = self.menu
            && let Some(node) = self.nodes.get(&menu)
        {
            node.panel().top();
        }
    }

    /// Topmost widget of the current workspace.
    pub fn focused(&self) -> Option<WidgetId> {
        self.current_workspace().top_widget()
    }

    /// Mark the widget urgent and refresh its state everywhere.
    pub fn set_urgent(&mut self, id: WidgetId) {
        let Some(widget) = self.widget_of(id) else {
            return;
        };
        widget.borrow_mut().set_urgent(true);
        self.update(&widget);
    }

    fn fit_to_screen(&self, widget: &SharedWidget, honor_maximize: bool) -> Rect {
        let mut w = widget.borrow_mut();
        let maximize = if honor_maximize {
            w.maximize()
        } else {
            Maximize::NONE
        };
        let (x, y) = sanitize_position(w.position(), w.size(), maximize, self.bounds);
        if (x, y) != w.position() {
            w.set_position(x, y);
        }
        let (width, height) = surface_size(w.size(), maximize, self.bounds);
        if maximize.x || maximize.y {
            let (mut ww, mut wh) = w.size();
            if maximize.x {
                ww = width;
            }
            if maximize.y {
                wh = height;
            }
            if (ww, wh) != w.size() {
                w.set_size(ww, wh);
            }
        }
        Rect::new(x, y, width, height)
    }

    fn place_new(&self, widget: &SharedWidget) -> Rect {
        if widget.borrow().maximize() != Maximize::NONE {
            return self.fit_to_screen(widget, true);
        }
        let mut w = widget.borrow_mut();
        let ((x, y), (width, height)) = initial_placement(w.position(), w.size(), self.bounds);
        if (x, y) != w.position() {
            w.set_position(x, y);
        }
        Rect::new(x, y, width, height)
    }

    fn confirm(
        &mut self,
        widget: &SharedWidget,
        own: impl FnOnce(&dyn Widget) -> bool,
        mut ask: impl FnMut(&mut dyn WmObserver, &dyn Widget) -> bool,
    ) -> bool {
        let w = widget.borrow();
        own(&*w) && self.observers.iter_mut().all(|obs| ask(obs.as_mut(), &*w))
    }

    /// Resize a window. Returns `false` when it is unknown or the change was
    /// refused by the widget or an observer.
    pub fn resize(&mut self, id: WidgetId, width: u16, height: u16) -> bool {
        let Some(widget) = self.widget_of(id) else {
            return false;
        };
        if !self.confirm(
            &widget,
            |w| w.confirm_size(width, height),
            |obs, w| obs.confirm_resize(w, width, height),
        ) {
            tracing::debug!(widget = ?id, width, height, "resize refused");
            return false;
        }
        widget.borrow_mut().set_size(width, height);
        let rect = self.fit_to_screen(&widget, false);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.resize(rect.width, rect.height);
            node.move_to(rect.x, rect.y);
        }
        self.repaint(id);
        self.notify_widget(&widget, |obs, w| obs.window_resized(w));
        true
    }

    /// Move a window. A confirmed move of a titled, non-transient window is
    /// remembered by title.
    pub fn move_to(&mut self, id: WidgetId, x: u16, y: u16) -> bool {
        let Some(widget) = self.widget_of(id) else {
            return false;
        };
        if !self.confirm(
            &widget,
            |w| w.confirm_position(x, y),
            |obs, w| obs.confirm_move(w, x, y),
        ) {
            tracing::debug!(widget = ?id, x, y, "move refused");
            return false;
        }
        widget.borrow_mut().set_position(x, y);
        let rect = self.fit_to_screen(&widget, false);
        let transient = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.move_to(rect.x, rect.y);
                node.workspace().is_none()
            }
            None => return false,
        };
        self.notify_widget(&widget, |obs, w| obs.window_moved(w));

        let title = widget.borrow().title();
        if !transient && let Some(title) = title {
            self.positions
                .remember(&title, (rect.x, rect.y), Instant::now());
        }
        true
    }

    /// Re-fit every window to the terminal, re-stack the current workspace
    /// and request a full redraw.
    pub fn refresh_screen(&mut self) {
        let ids = self.nodes.keys().copied().collect::<Vec<_>>();
        for id in ids {
            let Some(widget) = self.widget_of(id) else {
                continue;
            };
            let rect = self.fit_to_screen(&widget, true);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.resize(rect.width, rect.height);
                node.move_to(rect.x, rect.y);
            }
            self.repaint(id);
        }
        self.notify(|obs| obs.terminal_refresh());

        let ordered = self.current_workspace().ordered().to_vec();
        for id in ordered.iter().rev() {
            if let Some(node) = self.nodes.get(id) {
                node.panel().top();
            }
        }
        self.restack_transients();
        self.full_redraw = true;
        tracing::debug!(cols = self.bounds.max_x, rows = self.bounds.max_y + 1, "refreshed screen");
    }

    /// The terminal changed size.
    pub fn resize_terminal(&mut self, cols: u16, rows: u16) {
        self.bounds = ScreenBounds::from_terminal(cols, rows);
        self.refresh_screen();
    }

    pub fn take_full_redraw(&mut self) -> bool {
        std::mem::take(&mut self.full_redraw)
    }

    fn repaint(&mut self, id: WidgetId) {
        let Some(widget) = self.widget_of(id) else {
            return;
        };
        let (title, focused) = {
            let w = widget.borrow();
            (w.title(), w.has_focus())
        };
        let state = FrameState {
            title: title.as_deref(),
            focused,
            reversed: self.reversed_border == Some(id),
            tagged: self.tagged.contains(&id),
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.repaint(&mut *widget.borrow_mut(), self.decorator.as_ref(), state);
        }
    }

    /// Composite every shown surface bottom to top, then the taskbar, the
    /// pending-activity message and any open list.
    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        frame.fill(area, Style::default());
        if self.mode == KeyPressMode::WaitOnChild {
            return;
        }

        for panel in self.deck.visible_order() {
            if let Some(id) = self.panel_owners.get(&panel)
                && let Some(node) = self.nodes.get(id)
            {
                frame.blit_from(node.surface(), node.rect());
            }
        }

        let items = self.taskbar_items();
        let row = Rect::new(0, self.bounds.taskbar_row(), self.bounds.max_x, 1).intersection(area);
        taskbar::render(frame, row, &items);

        if let Some(message) = self.activity_message.as_deref() {
            let width = message.chars().count() as u16;
            let x = self.bounds.max_x.saturating_sub(width);
            let style = Style::default()
                .bg(theme::activity_bg())
                .fg(theme::activity_fg())
                .add_modifier(Modifier::BOLD);
            safe_set_string(frame.buffer_mut(), area, x, 0, message, style);
        }

        if let Some(popup) = self.list_popup.as_mut() {
            popup.render(frame);
        }
    }

    /// The composited screen as text, one line per terminal row with
    /// trailing blanks trimmed.
    pub fn screen_text(&mut self) -> String {
        let area = Rect::new(0, 0, self.bounds.max_x, self.bounds.max_y.saturating_add(1));
        let mut buffer = Buffer::empty(area);
        self.render(&mut UiFrame::from_parts(area, &mut buffer));
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            let row = (area.left()..area.right())
                .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol()))
                .collect::<String>();
            text.push_str(row.trim_end());
            text.push('\n');
        }
        text
    }

    /// Write [`WindowManager::screen_text`] to `path`.
    pub fn dump_screen(&mut self, path: &Path) -> WmResult<()> {
        let text = self.screen_text();
        std::fs::write(path, text)?;
        tracing::info!(?path, "dumped screen");
        Ok(())
    }

    pub fn taskbar_items(&self) -> Vec<TaskbarItem> {
        let ws = self.current_workspace();
        ws.list()
            .iter()
            .map(|id| {
                let (label, urgent) = match self.widget_of(*id) {
                    Some(widget) => {
                        let w = widget.borrow();
                        (window_label(&*w), w.is_urgent())
                    }
                    None => (UNTITLED_WINDOW_LABEL.to_string(), false),
                };
                TaskbarItem {
                    label,
                    focused: ws.is_top(*id),
                    urgent,
                }
            })
            .collect()
    }

    fn set_mode(&mut self, mode: KeyPressMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.notify(|obs| obs.mode_changed(mode));
        tracing::debug!(?mode, "key press mode changed");
    }

    fn ensure_normal_mode(&mut self) {
        if matches!(self.mode, KeyPressMode::Move | KeyPressMode::Resize) {
            self.set_mode(KeyPressMode::Normal);
        }
        if let Some(id) = self.reversed_border.take() {
            self.repaint(id);
        }
    }

    /// Hand the terminal to a child process. Keys are ignored until
    /// [`WindowManager::child_exited`].
    pub fn give_up_terminal(&mut self, command: Vec<String>) {
        self.list_popup = None;
        self.ensure_normal_mode();
        self.pending_escape = None;
        self.child_request = Some(command);
        self.set_mode(KeyPressMode::WaitOnChild);
    }

    pub fn take_child_request(&mut self) -> Option<Vec<String>> {
        self.child_request.take()
    }

    pub fn child_exited(&mut self) {
        self.set_mode(KeyPressMode::Normal);
        self.refresh_screen();
    }

    pub fn request_quit(&mut self) {
        if let Err(err) = self.positions.flush() {
            tracing::warn!(error = %err, "failed to write window positions");
        }
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn flush_positions(&mut self) -> WmResult<()> {
        self.positions.flush()
    }

    pub fn has_window_position(&self, title: &str) -> bool {
        self.positions.contains(title)
    }

    /// Mark the start of processing one user input event. Windows registered
    /// until the matching [`WindowManager::end_user_event`] are raised.
    pub fn begin_user_event(&mut self) {
        self.user_event_depth += 1;
    }

    pub fn end_user_event(&mut self) {
        self.user_event_depth = self.user_event_depth.saturating_sub(1);
    }

    pub fn in_user_event(&self) -> bool {
        self.user_event_depth > 0
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advance every deadline to `now`: the idle check, the debounced
    /// position write, a held Esc, and pruning of dropped widgets.
    pub fn tick_at(&mut self, now: Instant) {
        self.idle.tick(now);
        if let Err(err) = self.positions.flush_due(now) {
            tracing::warn!(error = %err, "failed to write window positions");
        }
        self.expire_escape(now);
        self.prune_dead_nodes();
    }

    /// Earliest instant at which [`WindowManager::tick_at`] has work to do.
    pub fn next_deadline(&self) -> Instant {
        [self.positions.next_deadline(), self.pending_escape]
            .into_iter()
            .flatten()
            .fold(self.idle.next_check(), Instant::min)
    }

    pub fn idle_time(&self) -> Duration {
        self.idle.idle_time(Instant::now())
    }

    pub fn idle_time_at(&self, now: Instant) -> Duration {
        self.idle.idle_time(now)
    }

    fn prune_dead_nodes(&mut self) {
        let dead = self
            .nodes
            .iter()
            .filter(|(_, node)| node.widget().is_none())
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        for id in dead {
            tracing::debug!(widget = ?id, "pruning window whose widget was dropped");
            self.close(id);
        }
    }

    /// Register an entry for the action list. A second registration with the
    /// same label replaces the first.
    pub fn register_action(
        &mut self,
        label: impl Into<String>,
        callback: impl FnMut(&mut WindowManager) + 'static,
    ) {
        self.insert_action(NamedAction {
            label: label.into(),
            callback: Box::new(callback),
        });
    }

    fn insert_action(&mut self, action: NamedAction) {
        match self
            .actions
            .binary_search_by(|a| a.label.as_str().cmp(action.label.as_str()))
        {
            Ok(index) => self.actions[index] = action,
            Err(index) => self.actions.insert(index, action),
        }
    }

    /// Expose a built-in action in the action list under its display label.
    pub fn register_wm_action(&mut self, action: Action) {
        self.register_action(action.to_string(), move |wm| {
            wm.perform_action(action);
        });
    }

    pub fn action_labels(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.label.as_str()).collect()
    }

    /// Run the action registered under `label`.
    pub fn run_action(&mut self, label: &str) -> bool {
        let Some(index) = self.actions.iter().position(|a| a.label == label) else {
            return false;
        };
        let mut action = self.actions.remove(index);
        (action.callback)(self);
        if !self.actions.iter().any(|a| a.label == action.label) {
            self.insert_action(action);
        }
        true
    }

    pub fn list_popup(&self) -> Option<&ListPopup> {
        self.list_popup.as_ref()
    }

    pub fn open_list(&mut self, kind: ListKind) {
        if self.list_popup.is_some() || self.menu.is_some() {
            return;
        }
        self.ensure_normal_mode();
        let rows = self.list_rows(kind);
        let area = self.list_area(kind, &rows);
        let mut popup = ListPopup::new(kind, rows, area);
        match kind {
            ListKind::Windows => {
                if let Some(top) = self.focused() {
                    popup.select(&ListEntry::Window(top));
                }
            }
            ListKind::Workspaces => {
                popup.select(&ListEntry::Workspace(self.current));
            }
            ListKind::Actions | ListKind::Help => {}
        }
        self.list_popup = Some(popup);
    }

    pub fn close_list(&mut self) {
        self.list_popup = None;
    }

    fn list_rows(&self, kind: ListKind) -> Vec<(ListEntry, String)> {
        match kind {
            ListKind::Windows => {
                let prefix = self.workspaces.len() > 1;
                self.workspaces
                    .iter()
                    .flat_map(|ws| ws.list().iter().map(move |id| (ws, *id)))
                    .map(|(ws, id)| {
                        let title = self
                            .widget_of(id)
                            .map(|w| {
                                let w = w.borrow();
                                window_label(&*w)
                            })
                            .unwrap_or_else(|| UNTITLED_WINDOW_LABEL.to_string());
                        let label = if prefix {
                            format!("{}: {title}", ws.label())
                        } else {
                            title
                        };
                        (ListEntry::Window(id), label)
                    })
                    .collect()
            }
            ListKind::Workspaces => self
                .workspaces
                .iter()
                .enumerate()
                .map(|(index, ws)| {
                    (
                        ListEntry::Workspace(WorkspaceId(index)),
                        format!("{} ({})", ws.label(), ws.list().len()),
                    )
                })
                .collect(),
            ListKind::Actions => self
                .actions
                .iter()
                .map(|a| (ListEntry::Action(a.label.clone()), a.label.clone()))
                .collect(),
            ListKind::Help => Action::ALL
                .iter()
                .map(|action| {
                    let combos = self.keybindings.combos_for(*action).join(" ");
                    let label = format!("{:<28}{combos}", action.to_string());
                    (ListEntry::Binding(*action), label.trim_end().to_string())
                })
                .collect(),
        }
    }

    fn list_area(&self, kind: ListKind, rows: &[(ListEntry, String)]) -> Rect {
        let ScreenBounds { max_x, max_y } = self.bounds;
        match kind {
            ListKind::Actions | ListKind::Help => {
                let widest = rows
                    .iter()
                    .map(|(_, label)| label.chars().count())
                    .max()
                    .unwrap_or(0);
                let width = (widest as u16).saturating_add(4).min(max_x);
                let height = (rows.len() as u16).saturating_add(2).min(max_y);
                if kind == ListKind::Help {
                    Rect::new((max_x - width) / 2, (max_y - height) / 2, width, height)
                } else {
                    Rect::new(0, max_y.saturating_sub(height), width, height)
                }
            }
            ListKind::Windows | ListKind::Workspaces => Rect::new(
                max_x / 3,
                max_y / 4,
                (max_x / 3).max(3).min(max_x),
                (max_y / 2).max(3).min(max_y),
            ),
        }
    }

    fn refresh_list_popup(&mut self) {
        let Some(kind) = self.list_popup.as_ref().map(ListPopup::kind) else {
            return;
        };
        let rows = self.list_rows(kind);
        if let Some(popup) = self.list_popup.as_mut() {
            popup.set_rows(rows);
        }
    }

    /// Show a transient menu above everything. It receives every key until
    /// it is closed.
    pub fn open_menu(&mut self, menu: &SharedWidget) {
        if let Some(open) = self.menu {
            self.close(open);
        }
        let id = menu.borrow().id();
        self.register(menu);
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.menu = Some(id);
        self.give_focus(id);
    }

    pub fn menu(&self) -> Option<WidgetId> {
        self.menu
    }

    pub fn tagged(&self) -> &[WidgetId] {
        &self.tagged
    }

    pub fn toggle_tag(&mut self, id: WidgetId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        match self.tagged.iter().position(|t| *t == id) {
            Some(pos) => {
                self.tagged.remove(pos);
            }
            None => self.tagged.push(id),
        }
        self.repaint(id);
    }

    /// Move every tagged window to the current workspace and clear the tags.
    pub fn place_tagged(&mut self) {
        let tagged = std::mem::take(&mut self.tagged);
        for id in tagged {
            self.move_widget_to_workspace(self.current, id);
            self.repaint(id);
        }
    }

    /// Move `id` one step along its workspace's insertion order.
    pub fn shift_window(&mut self, id: WidgetId, dir: isize) -> bool {
        let Some(ws) = self.find_workspace(id) else {
            return false;
        };
        let shifted = self.workspaces[ws.index()].shift(id, dir);
        if shifted {
            self.refresh_list_popup();
        }
        shifted
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn WmObserver)) {
        for obs in &mut self.observers {
            f(obs.as_mut());
        }
    }

    fn notify_widget(
        &mut self,
        widget: &SharedWidget,
        mut f: impl FnMut(&mut dyn WmObserver, &dyn Widget),
    ) {
        if self.observers.is_empty() {
            return;
        }
        let w = widget.borrow();
        for obs in &mut self.observers {
            f(obs.as_mut(), &*w);
        }
    }
}

impl Drop for WindowManager {
    fn drop(&mut self) {
        if let Err(err) = self.positions.flush() {
            tracing::warn!(error = %err, "failed to write window positions");
        }
        for panel in self.deck.visible_order().into_iter().rev() {
            if let Some(id) = self.panel_owners.remove(&panel) {
                self.nodes.remove(&id);
            }
        }
        self.nodes.clear();
    }
}

fn window_label(widget: &dyn Widget) -> String {
    widget
        .title()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED_WINDOW_LABEL.to_string())
}
