use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind};

use term_ws::components::{MenuWidget, TextWindow};
use term_ws::config::{self, Config, EXAMPLE_CONFIG};
use term_ws::drivers::OutputDriver;
use term_ws::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_ws::error::WmResult;
use term_ws::keybindings::Action;
use term_ws::runner::{WmApp, run_wm_app};
use term_ws::tracing_sub;
use term_ws::widget::{SharedWidget, Widget, WidgetId};
use term_ws::window::{WindowManager, WorkspaceId};

#[derive(Debug, Parser)]
#[command(version, about = "A stacking window manager with workspaces for the terminal")]
struct Args {
    /// Configuration file (defaults to term-ws/config.toml in the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to remember window positions.
    #[arg(long)]
    positions: Option<PathBuf>,
    /// Append debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Do not remember window positions.
    #[arg(long)]
    no_remember: bool,
    /// Print an annotated example configuration and exit.
    #[arg(long)]
    print_config: bool,
}

enum Request {
    NewWindow,
    BackgroundWindow,
}

struct App {
    wm: WindowManager,
    windows: Vec<Rc<RefCell<TextWindow>>>,
    menu: Option<Rc<RefCell<MenuWidget>>>,
    requests: Rc<RefCell<Vec<Request>>>,
    notices: Option<WorkspaceId>,
    created: usize,
}

impl App {
    fn new(config: &Config, cols: u16, rows: u16) -> WmResult<Self> {
        let mut wm = WindowManager::with_config(config, cols, rows)?;
        let requests = Rc::new(RefCell::new(Vec::new()));

        let queue = Rc::clone(&requests);
        wm.register_action("New window", move |_| {
            queue.borrow_mut().push(Request::NewWindow);
        });
        let queue = Rc::clone(&requests);
        wm.register_action("Background notice", move |_| {
            queue.borrow_mut().push(Request::BackgroundWindow);
        });
        if let Some(command) = config.pager_command() {
            wm.register_action("Run pager", move |wm| wm.give_up_terminal(command.clone()));
        }
        wm.register_action("Quit", |wm| wm.request_quit());
        wm.register_wm_action(Action::IgnoreKeysStart);
        wm.register_wm_action(Action::HelpForWm);

        let mut app = Self {
            wm,
            windows: Vec::new(),
            menu: None,
            requests,
            notices: None,
            created: 0,
        };
        app.open_window(
            TextWindow::new("Welcome", 44, 9).with_lines([
                "Alt+digit raises a window, F10 opens the menu.",
                "Drag windows by their title row.",
                "Type here to edit this text.",
            ]),
        );
        app.open_window(
            TextWindow::new("Chat", 30, 8)
                .with_name("conversation")
                .with_lines(["(nothing new)"]),
        );
        Ok(app)
    }

    fn open_window(&mut self, window: TextWindow) {
        let window = Rc::new(RefCell::new(window));
        let shared: SharedWidget = window.clone();
        self.wm.register(&shared);
        self.windows.push(window);
    }

    fn serve_requests(&mut self) {
        let requests = std::mem::take(&mut *self.requests.borrow_mut());
        for request in requests {
            match request {
                // Windows created while handling input are raised; keep the
                // notice for the next tick so it lands in the background.
                Request::BackgroundWindow if self.wm.in_user_event() => {
                    self.requests.borrow_mut().push(request);
                }
                Request::BackgroundWindow => {
                    self.created += 1;
                    let title = format!("Notice {}", self.created);
                    let ws = *self
                        .notices
                        .get_or_insert_with(|| self.wm.add_workspace(Some("notices".into())));
                    self.wm.set_place_by_title(&title, ws);
                    self.open_window(
                        TextWindow::new(title, 30, 5).with_lines(["Something happened."]),
                    );
                }
                Request::NewWindow => {
                    self.created += 1;
                    let title = format!("Window {}", self.created);
                    self.open_window(TextWindow::new(title, 32, 8).with_lines([""]));
                }
            }
        }
    }

    fn open_menu(&mut self) {
        let labels = self
            .wm
            .action_labels()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let menu = Rc::new(RefCell::new(MenuWidget::new(labels).at(2, 1)));
        let shared: SharedWidget = menu.clone();
        self.wm.open_menu(&shared);
        self.menu = Some(menu);
    }
}

impl WmApp for App {
    fn windows(&mut self) -> &mut WindowManager {
        &mut self.wm
    }

    fn handle_event(&mut self, event: &Event, consumed: bool) {
        if !consumed
            && let Event::Key(key) = event
            && key.kind != KeyEventKind::Release
            && key.code == KeyCode::F(10)
        {
            self.open_menu();
        }
        self.serve_requests();
    }

    fn window_closed(&mut self, id: WidgetId) {
        let menu_closed = self
            .menu
            .as_ref()
            .is_some_and(|menu| menu.borrow().id() == id);
        if menu_closed {
            let activated = self
                .menu
                .take()
                .and_then(|menu| menu.borrow_mut().take_activated());
            if let Some(label) = activated {
                self.wm.run_action(&label);
                self.serve_requests();
            }
            return;
        }
        self.windows.retain(|w| w.borrow().id() != id);
        if self.windows.is_empty() {
            self.wm.request_quit();
        }
    }

    fn tick(&mut self) {
        self.serve_requests();
    }
}

fn load_config(args: &Args) -> WmResult<Config> {
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => match config::default_config_path() {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        },
    };
    if args.positions.is_some() {
        config.positions_file = args.positions.clone();
    }
    if args.log_file.is_some() {
        config.log_file = args.log_file.clone();
    }
    if args.no_remember {
        config.remember_positions = false;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    tracing_sub::init_default(config.log_file.as_deref())?;

    let mut output = ConsoleOutputDriver::new()?;
    let (cols, rows) = output.size()?;
    let mut app = App::new(&config, cols, rows)?;
    let mut driver = ConsoleInputDriver::new();

    output.enter()?;
    let result = run_wm_app(&mut driver, &mut output, &mut app, Duration::from_millis(250));
    output.exit()?;
    app.wm.flush_positions()?;
    result?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return ExitCode::SUCCESS;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("term-ws: {err}");
            ExitCode::FAILURE
        }
    }
}
