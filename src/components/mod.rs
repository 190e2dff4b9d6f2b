pub mod list;
pub mod menu;
pub mod text_window;

pub use list::ListComponent;
pub use menu::MenuWidget;
pub use text_window::TextWindow;
