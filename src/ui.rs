//! UiFrame: a thin wrapper around a `ratatui` buffer that clamps drawing to
//! a visible area.
//!
//! The window manager hands widgets a `UiFrame` over an offscreen buffer the
//! size of the widget, then composites node surfaces onto the terminal frame
//! through another `UiFrame`. Routing every write through the clip keeps a
//! widget that draws past its own edges from corrupting its neighbours.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{StatefulWidget, Widget};

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible area.
///
/// Components render through this type so they can keep calling familiar
/// `render_widget` / `render_stateful_widget` helpers while automatically
/// clipping any rectangles that drift outside the buffer.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer.
    ///
    /// This powers offscreen rendering paths where components should draw into
    /// their logical window size before being composited onto the visible
    /// terminal buffer.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    pub fn render_stateful_widget<W>(&mut self, widget: W, area: Rect, state: &mut W::State)
    where
        W: StatefulWidget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer, state);
        }
    }

    pub fn blit_from(&mut self, src: &Buffer, src_area: Rect) {
        let overlap = src_area.intersection(self.area);
        if overlap.width == 0 || overlap.height == 0 {
            return;
        }
        for y in overlap.y..overlap.y.saturating_add(overlap.height) {
            for x in overlap.x..overlap.x.saturating_add(overlap.width) {
                if let (Some(src_cell), Some(dst_cell)) =
                    (src.cell((x, y)), self.buffer.cell_mut((x, y)))
                {
                    *dst_cell = src_cell.clone();
                }
            }
        }
    }

    /// Paint every cell of `area` with `style`, clearing its symbol.
    pub fn fill(&mut self, area: Rect, style: Style) {
        let Some(clipped) = self.clip_rect(area) else {
            return;
        };
        for y in clipped.y..clipped.y.saturating_add(clipped.height) {
            for x in clipped.x..clipped.x.saturating_add(clipped.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_style(style);
                }
            }
        }
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    #[test]
    fn fill_clips_and_resets_cells() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 2,
        };
        let mut buf = Buffer::empty(area);
        if let Some(cell) = buf.cell_mut((1, 1)) {
            cell.set_symbol("x");
        }
        let mut frame = UiFrame::from_parts(area, &mut buf);
        frame.fill(
            Rect {
                x: 1,
                y: 1,
                width: 10,
                height: 10,
            },
            Style::default().bg(ratatui::style::Color::Blue),
        );
        let cell = buf.cell((1, 1)).expect("cell present");
        assert_eq!(cell.symbol(), " ");
        assert_eq!(cell.bg, ratatui::style::Color::Blue);
        assert_eq!(
            buf.cell((0, 0)).expect("cell present").bg,
            ratatui::style::Color::Reset
        );
    }

    #[test]
    fn truncate_to_width_short_and_long() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
    }

    #[test]
    fn safe_set_string_writes_within_bounds() {
        let bounds = ratatui::layout::Rect {
            x: 0,
            y: 0,
            width: 10,
            height: 2,
        };
        let mut buf = Buffer::empty(bounds);
        safe_set_string(&mut buf, bounds, 1, 0, "hello", Style::default());
        let cell = buf.cell_mut((1, 0)).expect("cell present");
        let first = cell.symbol().chars().next().unwrap();
        assert_eq!(first, 'h');

        // outside bounds should be ignored (no panic)
        safe_set_string(&mut buf, bounds, 100, 0, "x", Style::default());
    }

    #[test]
    fn render_widget_clips_to_frame_area() {
        use ratatui::layout::Rect;

        let area = Rect {
            x: 0,
            y: 0,
            width: 5,
            height: 3,
        };
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);

        struct FillWidget;
        impl Widget for FillWidget {
            fn render(self, area: Rect, buf: &mut Buffer) {
                for y in area.y..area.y.saturating_add(area.height) {
                    for x in area.x..area.x.saturating_add(area.width) {
                        if let Some(cell) = buf.cell_mut((x, y)) {
                            cell.set_symbol("A");
                        }
                    }
                }
            }
        }

        // Request an area that partially lies outside the right edge.
        ui.render_widget(
            FillWidget,
            Rect {
                x: 3,
                y: 1,
                width: 5,
                height: 2,
            },
        );

        // Inside clipped region
        let inside = buf.cell_mut((3, 1)).expect("cell present");
        assert!(inside.symbol().starts_with('A'));

        // Outside clipped region (left of the filled area)
        let outside = buf.cell_mut((2, 1)).expect("cell present");
        assert!(!outside.symbol().starts_with('A'));
    }

    #[test]
    fn blit_from_copies_overlapping_region() {
        use ratatui::layout::Rect;

        let dest_area = Rect {
            x: 0,
            y: 0,
            width: 5,
            height: 3,
        };
        let mut dest = Buffer::empty(dest_area);
        for y in dest_area.y..dest_area.y.saturating_add(dest_area.height) {
            for x in dest_area.x..dest_area.x.saturating_add(dest_area.width) {
                if let Some(cell) = dest.cell_mut((x, y)) {
                    cell.set_symbol(".");
                }
            }
        }
        let mut frame = UiFrame::from_parts(dest_area, &mut dest);

        let src_area = Rect {
            x: 3,
            y: 1,
            width: 4,
            height: 3,
        };
        let mut src = Buffer::empty(src_area);
        for y in src_area.y..src_area.y.saturating_add(src_area.height) {
            for x in src_area.x..src_area.x.saturating_add(src_area.width) {
                if let Some(cell) = src.cell_mut((x, y)) {
                    cell.set_symbol("Z");
                }
            }
        }

        frame.blit_from(&src, src_area);

        let buffer = frame.buffer_mut();
        assert_eq!(buffer.cell((3, 1)).unwrap().symbol(), "Z");
        assert_eq!(buffer.cell((4, 2)).unwrap().symbol(), "Z");
        assert_eq!(buffer.cell((2, 1)).unwrap().symbol(), ".");
        assert_eq!(buffer.cell((4, 0)).unwrap().symbol(), ".");
    }
}
