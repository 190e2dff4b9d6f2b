use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    /// Keep running, but do not wait for input past this instant.
    WaitUntil(Instant),
    Quit,
}

/// The single loop that owns the UI thread.
///
/// It polls the input driver and hands each event to a handler closure. The
/// handler is also called with `None` whenever the wait ends without input,
/// which is where timers run and the screen is drawn.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// How long to wait for input given what the handler last asked for.
    /// Never longer than the poll interval.
    pub fn wait_for(&self, flow: ControlFlow, now: Instant) -> Duration {
        match flow {
            ControlFlow::WaitUntil(deadline) => deadline
                .saturating_duration_since(now)
                .min(self.poll_interval),
            _ => self.poll_interval,
        }
    }

    /// Runs the loop on the current thread until the handler returns
    /// [`ControlFlow::Quit`].
    ///
    /// The handler is called with:
    /// - `Some(event)` for each input event,
    /// - `None` once per wake-up, before waiting again.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            let flow = handler(&mut self.driver, None)?;
            if flow == ControlFlow::Quit {
                break;
            }

            let timeout = self.wait_for(flow, Instant::now());
            if self.driver.poll(timeout)? {
                // Drain bursts (mouse drags, pasted text) before the next draw.
                loop {
                    let event = self.driver.read()?;
                    if handler(&mut self.driver, Some(event))? == ControlFlow::Quit {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
