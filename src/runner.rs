use std::io;
use std::process::Command;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::widget::WidgetId;
use crate::window::WindowManager;

/// An application hosted by the window manager.
///
/// The application owns its widgets; the runner owns the loop and feeds the
/// manager input, timers and redraws on the application's behalf.
pub trait WmApp {
    fn windows(&mut self) -> &mut WindowManager;

    /// Called after the window manager routed `event`. Windows the
    /// application registers from here count as user-initiated.
    fn handle_event(&mut self, _event: &Event, _consumed: bool) {}

    /// A window was closed and unregistered; drop it if it is not reused.
    fn window_closed(&mut self, _id: WidgetId) {}

    /// Called on every wake-up of the loop.
    fn tick(&mut self) {}
}

/// Run `app` until the window manager asks to quit.
///
/// `output` must already be entered; it is suspended while a child process
/// owns the terminal.
pub fn run_wm_app<D, O, A>(
    driver: &mut D,
    output: &mut O,
    app: &mut A,
    poll_interval: Duration,
) -> io::Result<()>
where
    D: InputDriver,
    O: OutputDriver,
    A: WmApp,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    event_loop.driver().set_mouse_capture(true)?;
    let (cols, rows) = output.size()?;
    app.windows().resize_terminal(cols, rows);

    event_loop.run(|driver, event| {
        if let Some(evt) = event {
            app.windows().begin_user_event();
            let consumed = app.windows().process_input(&evt);
            app.handle_event(&evt, consumed);
            dispatch_closed(app);
            app.windows().end_user_event();
            return Ok(ControlFlow::Continue);
        }

        app.windows().tick();
        app.tick();
        dispatch_closed(app);
        if app.windows().quit_requested() {
            return Ok(ControlFlow::Quit);
        }
        if let Some(command) = app.windows().take_child_request() {
            run_child(driver, output, app.windows(), &command)?;
        }
        if app.windows().take_full_redraw() {
            output.clear()?;
        }
        let wm = app.windows();
        output.draw(|mut frame| wm.render(&mut frame))?;
        Ok(ControlFlow::WaitUntil(wm.next_deadline()))
    })
}

fn dispatch_closed<A: WmApp>(app: &mut A) {
    for id in app.windows().take_closed_windows() {
        app.window_closed(id);
    }
}

fn run_child<D, O>(
    driver: &mut D,
    output: &mut O,
    wm: &mut WindowManager,
    command: &[String],
) -> io::Result<()>
where
    D: InputDriver,
    O: OutputDriver,
{
    let Some((program, args)) = command.split_first() else {
        wm.child_exited();
        return Ok(());
    };
    output.suspend()?;
    tracing::debug!(%program, "running child process");
    match Command::new(program).args(args).status() {
        Ok(status) if !status.success() => {
            tracing::warn!(%program, %status, "child process failed");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(%program, error = %err, "failed to start child process"),
    }
    output.resume()?;
    driver.set_mouse_capture(true)?;
    let (cols, rows) = output.size()?;
    wm.resize_terminal(cols, rows);
    wm.child_exited();
    Ok(())
}
