use crate::ui::UiFrame;
use ratatui::backend::Backend;
use std::io;

pub trait OutputDriver {
    type Backend: Backend;

    fn enter(&mut self) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;

    /// Screen size as `(cols, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Forget what is on screen so the next draw repaints every cell.
    fn clear(&mut self) -> io::Result<()>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>);

    /// Give the terminal to another program; undone by [`OutputDriver::resume`].
    fn suspend(&mut self) -> io::Result<()> {
        self.exit()
    }

    fn resume(&mut self) -> io::Result<()> {
        self.enter()?;
        self.clear()
    }
}
