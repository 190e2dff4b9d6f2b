use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use indoc::indoc;
use tempfile::TempDir;
use term_ws::components::TextWindow;
use term_ws::config::Config;
use term_ws::widget::{Maximize, SharedWidget, Widget};
use term_ws::window::WindowManager;

type Win = Rc<RefCell<TextWindow>>;

fn register(wm: &mut WindowManager, window: TextWindow) -> Win {
    let win = Rc::new(RefCell::new(window));
    let shared: SharedWidget = win.clone();
    wm.register(&shared);
    win
}

fn config_with_positions(path: &Path) -> Config {
    Config {
        positions_file: Some(path.to_path_buf()),
        ..Config::default()
    }
}

#[test]
fn positions_survive_a_restart() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("positions.toml");
    let config = config_with_positions(&path);

    {
        let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
        let win = register(&mut wm, TextWindow::new("Editor", 30, 8).at(5, 5));
        let win_id = win.borrow().id();
        assert!(wm.move_to(win_id, 12, 7));
        wm.flush_positions().expect("flush");
    }
    assert!(fs::read_to_string(&path).expect("written").contains("12;7"));

    let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
    assert!(wm.has_window_position("Editor"));
    let win = register(&mut wm, TextWindow::new("Editor", 30, 8));
    assert_eq!(win.borrow().position(), (12, 7));
    let other = register(&mut wm, TextWindow::new("Scratch", 30, 8).at(3, 4));
    assert_eq!(other.borrow().position(), (3, 4));
}

#[test]
fn pending_positions_are_written_on_drop() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("positions.toml");
    let config = config_with_positions(&path);

    let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
    let win = register(&mut wm, TextWindow::new("Mail", 20, 5));
    let win_id = win.borrow().id();
    wm.move_to(win_id, 4, 2);
    assert!(!path.exists());
    drop(wm);

    let text = fs::read_to_string(&path).expect("written on drop");
    assert!(text.contains("Mail"));
    assert!(text.contains("4;2"));
}

#[test]
fn writes_wait_for_the_debounce_delay() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("positions.toml");
    let config = Config {
        position_write_delay_secs: 10,
        ..config_with_positions(&path)
    };

    let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
    let win = register(&mut wm, TextWindow::new("Chat", 20, 5));
    let win_id = win.borrow().id();
    wm.move_to(win_id, 1, 1);
    let moved_at = Instant::now();
    assert!(wm.next_deadline() <= moved_at + Duration::from_secs(10));

    wm.tick_at(moved_at + Duration::from_secs(2));
    assert!(!path.exists());

    wm.tick_at(moved_at + Duration::from_secs(11));
    assert!(path.exists());
}

#[test]
fn remembered_position_is_pulled_back_on_screen() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("positions.toml");
    fs::write(
        &path,
        indoc! {r#"
            [positions]
            "Buddy List" = "75;3"
            "Broken" = "nope"
        "#},
    )
    .expect("seed positions");
    let config = config_with_positions(&path);

    let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
    assert!(!wm.has_window_position("Broken"));
    let win = register(&mut wm, TextWindow::new("Buddy List", 20, 5));
    assert_eq!(win.borrow().position(), (60, 3));
}

#[test]
fn maximized_axis_is_forced_to_the_origin() {
    let mut wm = WindowManager::new(80, 24);
    let win = register(
        &mut wm,
        TextWindow::new("Wide", 20, 5)
            .at(5, 3)
            .maximized(Maximize { x: true, y: false }),
    );
    assert_eq!(win.borrow().position(), (0, 3));
    let node = wm.node(win.borrow().id()).expect("node");
    assert_eq!((node.rect().x, node.rect().width), (0, 80));

    // A move request cannot pull it off the origin either.
    let win_id = win.borrow().id();
    wm.move_to(win_id, 9, 3);
    wm.refresh_screen();
    assert_eq!(win.borrow().position(), (0, 3));
}

#[test]
fn turning_remembering_off_writes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("positions.toml");
    let config = Config {
        remember_positions: false,
        ..config_with_positions(&path)
    };

    let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
    let win = register(&mut wm, TextWindow::new("Chat", 20, 5));
    let win_id = win.borrow().id();
    wm.move_to(win_id, 2, 2);
    wm.flush_positions().expect("flush");
    drop(wm);
    assert!(!path.exists());
}

#[test]
fn config_file_places_windows_by_title_and_name() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        indoc! {r#"
            remember-positions = false

            [[workspaces]]
            name = "main"

            [[workspaces]]
            name = "chat"
            window-titles = ["Chat"]
            window-names = ["conversation"]

            [keys]
            window-next = "f2"
        "#},
    )
    .expect("write config");
    let config = Config::load(&path).expect("config");

    let mut wm = WindowManager::with_config(&config, 80, 24).expect("wm");
    assert_eq!(wm.workspaces().len(), 2);
    assert_eq!(wm.current_workspace().label(), "main");

    let by_title = register(&mut wm, TextWindow::new("Chat with ann", 20, 5));
    let by_name = register(
        &mut wm,
        TextWindow::new("Untitled", 20, 5).with_name("conversation-2"),
    );
    let local = register(&mut wm, TextWindow::new("Notes", 20, 5));

    let chat = wm.find_workspace(by_title.borrow().id()).expect("placed");
    assert_eq!(wm.workspace(chat).expect("ws").label(), "chat");
    assert_eq!(wm.find_workspace(by_name.borrow().id()), Some(chat));
    assert_eq!(
        wm.find_workspace(local.borrow().id()),
        Some(wm.current_workspace_id())
    );
    assert_eq!(wm.activity_message(), Some("act: chat"));
}
