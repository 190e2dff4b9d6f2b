use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Modifier, Style};

use crate::constants::TAG_MARKER;
use crate::ui::{safe_set_string, truncate_to_width};

/// How a window frame should look on this pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameState<'a> {
    pub title: Option<&'a str>,
    pub focused: bool,
    /// Move/resize mode is active on this window.
    pub reversed: bool,
    pub tagged: bool,
}

pub trait WindowDecorator: std::fmt::Debug {
    /// Draw the frame of a window occupying `rect` of `buffer`.
    fn decorate(&self, buffer: &mut Buffer, rect: Rect, state: FrameState<'_>);
}

#[derive(Debug, Default)]
pub struct BoxDecorator;

impl WindowDecorator for BoxDecorator {
    fn decorate(&self, buffer: &mut Buffer, rect: Rect, state: FrameState<'_>) {
        let bounds = rect.intersection(buffer.area);
        if bounds.width < 2 || bounds.height < 2 {
            return;
        }
        let mut border_style = if state.focused {
            Style::default()
                .fg(crate::theme::decorator_focused_border())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(crate::theme::decorator_border())
        };
        if state.reversed {
            border_style = border_style.add_modifier(Modifier::REVERSED);
        }

        let left = bounds.x;
        let top = bounds.y;
        let right = bounds.x + bounds.width - 1;
        let bottom = bounds.y + bounds.height - 1;

        for x in left..=right {
            let (top_symbol, bottom_symbol) = if x == left {
                ("┌", "└")
            } else if x == right {
                ("┐", "┘")
            } else {
                ("─", "─")
            };
            if let Some(cell) = buffer.cell_mut((x, top)) {
                cell.set_symbol(top_symbol);
                cell.set_style(border_style);
            }
            if let Some(cell) = buffer.cell_mut((x, bottom)) {
                cell.set_symbol(bottom_symbol);
                cell.set_style(border_style);
            }
        }
        for y in top.saturating_add(1)..bottom {
            for x in [left, right] {
                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.set_symbol("│");
                    cell.set_style(border_style);
                }
            }
        }

        // Title centered in the top border.
        let inner_width = bounds.width.saturating_sub(2);
        if let Some(title) = state.title
            && inner_width > 2
        {
            let title_style = if state.focused {
                Style::default()
                    .bg(crate::theme::decorator_header_bg())
                    .fg(crate::theme::decorator_header_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                border_style
            };
            let label = truncate_to_width(&format!(" {title} "), inner_width as usize);
            let label_width = label.chars().count() as u16;
            let start_x = left + 1 + (inner_width - label_width) / 2;
            safe_set_string(buffer, bounds, start_x, top, &label, title_style);
        }

        if state.tagged {
            safe_set_string(
                buffer,
                bounds,
                left.saturating_add(1),
                top,
                TAG_MARKER,
                border_style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buffer: &Buffer, y: u16) -> String {
        (buffer.area.x..buffer.area.x + buffer.area.width)
            .map(|x| buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn draws_corners_and_centered_title() {
        let area = Rect::new(0, 0, 12, 3);
        let mut buffer = Buffer::empty(area);
        BoxDecorator.decorate(
            &mut buffer,
            area,
            FrameState {
                title: Some("Chat"),
                focused: true,
                ..Default::default()
            },
        );
        assert_eq!(row(&buffer, 0), "┌── Chat ──┐");
        assert_eq!(row(&buffer, 1), "│          │");
        assert_eq!(row(&buffer, 2), "└──────────┘");
    }

    #[test]
    fn reversed_frame_uses_reversed_modifier() {
        let area = Rect::new(0, 0, 6, 3);
        let mut buffer = Buffer::empty(area);
        BoxDecorator.decorate(
            &mut buffer,
            area,
            FrameState {
                reversed: true,
                ..Default::default()
            },
        );
        let cell = buffer.cell((0, 0)).expect("corner");
        assert!(cell.modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn tagged_frame_shows_marker() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        BoxDecorator.decorate(
            &mut buffer,
            area,
            FrameState {
                tagged: true,
                ..Default::default()
            },
        );
        assert!(row(&buffer, 0).starts_with("┌[T]"));
    }

    #[test]
    fn tiny_rect_is_ignored() {
        let area = Rect::new(0, 0, 1, 1);
        let mut buffer = Buffer::empty(area);
        BoxDecorator.decorate(&mut buffer, area, FrameState::default());
        assert_eq!(buffer.cell((0, 0)).expect("cell").symbol(), " ");
    }
}
