//! A stacking window manager for character-cell terminals.
//!
//! Widgets are drawn into offscreen surfaces that the [`window`] module
//! stacks, decorates and composites, grouped into workspaces of which one is
//! shown at a time. [`runner`] drives it from a terminal through the
//! [`drivers`].

pub mod components;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod keybindings;
pub mod runner;
pub mod taskbar;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod widget;
pub mod window;
