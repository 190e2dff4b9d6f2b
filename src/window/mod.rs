pub mod decorator;
pub mod geometry;
pub mod idle;
pub mod list_popup;
pub mod node;
pub mod observer;
pub mod positions;
pub mod stack;
pub mod workspace;

mod window_manager;

pub use decorator::{BoxDecorator, FrameState, WindowDecorator};
pub use geometry::ScreenBounds;
pub use list_popup::{ListEntry, ListKind};
pub use node::Node;
pub use observer::WmObserver;
pub use positions::PositionStore;
pub use window_manager::{ActionCallback, KeyPressMode, WindowManager};
pub use workspace::{Workspace, WorkspaceId};
