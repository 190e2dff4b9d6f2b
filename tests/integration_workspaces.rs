use std::cell::RefCell;
use std::rc::Rc;

use term_ws::components::TextWindow;
use term_ws::widget::{SharedWidget, Widget, WidgetId};
use term_ws::window::{ListKind, WindowManager};

type Win = Rc<RefCell<TextWindow>>;

fn window(title: &str, w: u16, h: u16) -> (Win, SharedWidget) {
    let win = Rc::new(RefCell::new(TextWindow::new(title, w, h)));
    let shared: SharedWidget = win.clone();
    (win, shared)
}

fn id_of(win: &Win) -> WidgetId {
    win.borrow().id()
}

fn labels(wm: &WindowManager) -> Vec<String> {
    wm.taskbar_items().into_iter().map(|item| item.label).collect()
}

#[test]
fn window_opened_by_the_user_is_raised_on_top() {
    let mut wm = WindowManager::new(80, 24);
    let (other, so) = window("Other", 20, 5);
    wm.register(&so);

    let (chat, sc) = window("Chat", 40, 10);
    wm.begin_user_event();
    wm.register(&sc);
    wm.end_user_event();

    let node = wm.node(id_of(&chat)).expect("node");
    assert_eq!(node.workspace(), Some(wm.current_workspace_id()));
    assert_eq!((node.rect().x, node.rect().y), (0, 0));
    assert_eq!((node.rect().width, node.rect().height), (40, 10));
    assert_eq!(wm.focused(), Some(id_of(&chat)));
    assert!(chat.borrow().has_focus());
    assert!(!other.borrow().has_focus());
    assert_eq!(
        wm.current_workspace().ordered(),
        &[id_of(&chat), id_of(&other)]
    );
}

#[test]
fn switching_window_moves_focus_and_taskbar_highlight() {
    let mut wm = WindowManager::new(80, 24);
    let (a, sa) = window("A", 20, 5);
    let (b, sb) = window("B", 20, 5);
    wm.register(&sa);
    wm.register(&sb);
    assert_eq!(wm.focused(), Some(id_of(&a)));

    wm.switch_window(1, false);

    assert_eq!(wm.focused(), Some(id_of(&b)));
    assert!(b.borrow().has_focus());
    assert!(!a.borrow().has_focus());
    let items = wm.taskbar_items();
    assert_eq!(labels(&wm), vec!["A", "B"]);
    assert!(!items[0].focused);
    assert!(items[1].focused);

    wm.switch_window(1, false);
    assert_eq!(wm.focused(), Some(id_of(&a)));
}

#[test]
fn switching_to_next_urgent_skips_quiet_windows() {
    let mut wm = WindowManager::new(80, 24);
    let (a, sa) = window("A", 20, 5);
    let (_b, sb) = window("B", 20, 5);
    let (c, sc) = window("C", 20, 5);
    wm.register(&sa);
    wm.register(&sb);
    wm.register(&sc);
    wm.switch_window_n(1);
    wm.switch_window_n(0);
    assert_eq!(wm.focused(), Some(id_of(&a)));
    assert!(c.borrow().is_urgent());

    wm.switch_window(1, true);
    assert_eq!(wm.focused(), Some(id_of(&c)));
    assert!(!c.borrow().is_urgent());

    // Nothing urgent left: the top stays put.
    wm.switch_window(1, true);
    assert_eq!(wm.focused(), Some(id_of(&c)));
}

#[test]
fn moved_window_follows_its_workspace() {
    let mut wm = WindowManager::new(80, 24);
    let work = wm.add_workspace(Some("work".into()));
    let (chat, sc) = window("Chat", 40, 10);
    let (notes, sn) = window("Notes", 30, 8);
    wm.register(&sc);
    wm.register(&sn);

    wm.move_widget_to_workspace(work, id_of(&chat));

    assert_eq!(labels(&wm), vec!["Notes"]);
    assert!(wm.node(id_of(&chat)).expect("node").panel().is_hidden());
    assert_eq!(wm.focused(), Some(id_of(&notes)));
    assert_eq!(wm.find_workspace(id_of(&chat)), Some(work));

    assert!(wm.switch_workspace(work.index()));
    assert!(!wm.node(id_of(&chat)).expect("node").panel().is_hidden());
    assert!(wm.node(id_of(&notes)).expect("node").panel().is_hidden());
    assert_eq!(wm.focused(), Some(id_of(&chat)));
    assert!(chat.borrow().has_focus());
    assert_eq!(labels(&wm), vec!["Chat"]);
}

#[test]
fn urgent_background_window_flags_its_workspace_until_visited() {
    let mut wm = WindowManager::new(80, 24);
    let work = wm.add_workspace(Some("work".into()));
    let (_local, sl) = window("Local", 20, 5);
    let (mail, sm) = window("Mail", 20, 5);
    wm.register(&sl);
    wm.begin_user_event();
    wm.register(&sm);
    wm.end_user_event();
    wm.move_widget_to_workspace(work, id_of(&mail));
    wm.switch_workspace(0);
    assert!(wm.pending_activity().is_empty());
    assert_eq!(wm.activity_message(), None);

    wm.set_urgent(id_of(&mail));

    assert_eq!(wm.pending_activity(), &[work]);
    assert_eq!(wm.activity_message(), Some("act: work"));
    assert_eq!(wm.current_workspace_id().index(), 0);

    wm.switch_workspace(work.index());
    assert!(wm.pending_activity().is_empty());
    assert_eq!(wm.activity_message(), None);
    assert!(!mail.borrow().is_urgent());
}

#[test]
fn background_creation_on_a_hidden_workspace_stays_hidden() {
    let mut wm = WindowManager::new(80, 24);
    let chat_ws = wm.add_workspace(Some("chat".into()));
    wm.set_place_by_title("Chat", chat_ws);
    let (_home, sh) = window("Home", 20, 5);
    let (chat, sc) = window("Chat with bob", 20, 5);
    wm.register(&sh);
    wm.register(&sc);

    assert_eq!(wm.current_workspace_id().index(), 0);
    assert_eq!(wm.find_workspace(id_of(&chat)), Some(chat_ws));
    assert!(wm.node(id_of(&chat)).expect("node").panel().is_hidden());
    assert!(chat.borrow().is_urgent());
    assert_eq!(wm.pending_activity(), &[chat_ws]);
}

#[test]
fn new_workspace_becomes_current_and_is_listed() {
    let mut wm = WindowManager::new(80, 24);
    let (a, sa) = window("A", 20, 5);
    wm.register(&sa);

    let fresh = wm.workspace_new();
    assert_eq!(wm.current_workspace_id(), fresh);
    assert!(wm.current_workspace().is_empty());
    assert_eq!(wm.focused(), None);
    assert!(wm.node(id_of(&a)).expect("node").panel().is_hidden());

    wm.open_list(ListKind::Workspaces);
    let popup = wm.list_popup().expect("popup");
    assert_eq!(popup.labels(), &["default (1)", "(noname) (0)"]);
    wm.close_list();

    assert!(wm.switch_workspace_prev());
    assert!(!wm.switch_workspace_prev());
    assert_eq!(wm.focused(), Some(id_of(&a)));
    assert!(!wm.switch_workspace(7));
}

#[test]
fn closing_the_top_window_raises_the_next_one() {
    let mut wm = WindowManager::new(80, 24);
    let (a, sa) = window("A", 20, 5);
    let (b, sb) = window("B", 20, 5);
    wm.register(&sa);
    wm.register(&sb);

    wm.close(id_of(&a));

    assert!(!wm.is_registered(id_of(&a)));
    assert_eq!(wm.focused(), Some(id_of(&b)));
    assert!(b.borrow().has_focus());
    assert_eq!(wm.take_closed_windows(), vec![id_of(&a)]);
    assert!(wm.take_closed_windows().is_empty());
}
