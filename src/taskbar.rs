//! Bottom-row task list for the current workspace.
//!
//! Items are laid out in insertion order with equal widths; each item after
//! the first starts with a `│` separator.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarItem {
    pub label: String,
    pub focused: bool,
    pub urgent: bool,
}

/// Column width of each item when `count` items share `width` columns.
pub fn item_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 0;
    }
    let count = u16::try_from(count).unwrap_or(u16::MAX);
    (width / count).max(1)
}

/// Index of the item under column `x`.
pub fn hit_test(width: u16, count: usize, x: u16) -> Option<usize> {
    let item = item_width(width, count);
    if item == 0 {
        return None;
    }
    let index = (x / item) as usize;
    (index < count).then_some(index)
}

pub fn render(frame: &mut UiFrame<'_>, area: Rect, items: &[TaskbarItem]) {
    let base = Style::default()
        .bg(theme::taskbar_bg())
        .fg(theme::taskbar_fg());
    frame.fill(area, base);
    let width = item_width(area.width, items.len());
    if width == 0 {
        return;
    }

    let bounds = frame.area().intersection(area);
    let buffer = frame.buffer_mut();
    for (index, item) in items.iter().enumerate() {
        let x = area.x.saturating_add(width.saturating_mul(index as u16));
        let style = if item.focused {
            Style::default()
                .bg(theme::taskbar_focused_bg())
                .fg(theme::taskbar_focused_fg())
                .add_modifier(Modifier::BOLD)
        } else if item.urgent {
            base.fg(theme::taskbar_urgent_fg())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            base
        };
        let mut text = String::new();
        if index > 0 {
            text.push('│');
        }
        if item.urgent && !item.focused {
            text.push('*');
        }
        text.push_str(&item.label);
        let padded = format!("{text:<w$}", w = width as usize);
        let cell_bounds = Rect::new(x, area.y, width, 1).intersection(bounds);
        safe_set_string(buffer, cell_bounds, x, area.y, &padded, style);
    }
}
