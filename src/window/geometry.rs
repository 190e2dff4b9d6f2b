//! Screen bounds and window geometry sanitation.
//!
//! The usable area is `max_x` columns by `max_y` rows; the row below
//! `max_y` belongs to the taskbar.

use ratatui::layout::Rect;

use crate::widget::Maximize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub max_x: u16,
    pub max_y: u16,
}

impl ScreenBounds {
    /// Bounds for a terminal of `cols` x `rows`, reserving the last row.
    pub fn from_terminal(cols: u16, rows: u16) -> Self {
        Self {
            max_x: cols,
            max_y: rows.saturating_sub(1),
        }
    }

    pub fn taskbar_row(&self) -> u16 {
        self.max_y
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.max_x, self.max_y)
    }
}

/// Pull a window back on screen. Maximized axes snap to the origin; other
/// axes shift left/up just enough to fit, never past zero.
pub fn sanitize_position(
    (x, y): (u16, u16),
    (width, height): (u16, u16),
    maximize: Maximize,
    bounds: ScreenBounds,
) -> (u16, u16) {
    let x = if maximize.x {
        0
    } else if x.saturating_add(width) > bounds.max_x {
        bounds.max_x.saturating_sub(width)
    } else {
        x
    };
    let y = if maximize.y {
        0
    } else if y.saturating_add(height) > bounds.max_y {
        bounds.max_y.saturating_sub(height)
    } else {
        y
    };
    (x, y)
}

/// Size a node's surface may take: the full axis when maximized, otherwise
/// the requested size clamped to the bounds.
pub fn surface_size(
    (width, height): (u16, u16),
    maximize: Maximize,
    bounds: ScreenBounds,
) -> (u16, u16) {
    let width = if maximize.x {
        bounds.max_x
    } else {
        width.min(bounds.max_x)
    };
    let height = if maximize.y {
        bounds.max_y
    } else {
        height.min(bounds.max_y)
    };
    (width, height)
}

/// Placement applied when a node is first created: a window touching the
/// right or bottom edge is shifted in, then shrunk to fit.
pub fn initial_placement(
    (x, y): (u16, u16),
    (width, height): (u16, u16),
    bounds: ScreenBounds,
) -> ((u16, u16), (u16, u16)) {
    // `>=` where `sanitize_position` has `>`: a window touching the edge
    // shifts by zero, so both comparisons place it identically.
    let x = if x.saturating_add(width) >= bounds.max_x {
        bounds.max_x.saturating_sub(width)
    } else {
        x
    };
    let y = if y.saturating_add(height) >= bounds.max_y {
        bounds.max_y.saturating_sub(height)
    } else {
        y
    };
    ((x, y), (width.min(bounds.max_x), height.min(bounds.max_y)))
}

pub fn rect_contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && y >= rect.y
        && x < rect.x.saturating_add(rect.width)
        && y < rect.y.saturating_add(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: ScreenBounds = ScreenBounds {
        max_x: 80,
        max_y: 23,
    };

    #[test]
    fn bounds_reserve_taskbar_row() {
        let bounds = ScreenBounds::from_terminal(80, 24);
        assert_eq!(bounds, SCREEN);
        assert_eq!(bounds.taskbar_row(), 23);
    }

    #[test]
    fn maximize_x_forces_origin() {
        let maximize = Maximize { x: true, y: false };
        assert_eq!(sanitize_position((5, 3), (20, 5), maximize, SCREEN), (0, 3));
    }

    #[test]
    fn overflowing_window_shifts_back_on_screen() {
        assert_eq!(
            sanitize_position((70, 20), (20, 5), Maximize::NONE, SCREEN),
            (60, 18)
        );
    }

    #[test]
    fn oversized_window_stops_at_zero() {
        assert_eq!(
            sanitize_position((10, 10), (100, 40), Maximize::NONE, SCREEN),
            (0, 0)
        );
    }

    #[test]
    fn fitting_window_is_untouched() {
        assert_eq!(
            sanitize_position((10, 2), (20, 5), Maximize::NONE, SCREEN),
            (10, 2)
        );
    }

    #[test]
    fn surface_size_clamps_and_maximizes() {
        assert_eq!(surface_size((100, 5), Maximize::NONE, SCREEN), (80, 5));
        assert_eq!(surface_size((10, 5), Maximize::BOTH, SCREEN), (80, 23));
    }

    #[test]
    fn initial_placement_shifts_edge_windows_and_clamps_size() {
        let ((x, y), (w, h)) = initial_placement((70, 20), (10, 5), SCREEN);
        assert_eq!((x, y), (70, 18));
        assert_eq!((w, h), (10, 5));
        let ((x, y), (w, h)) = initial_placement((0, 0), (120, 30), SCREEN);
        assert_eq!((x, y), (0, 0));
        assert_eq!((w, h), (80, 23));
    }

    #[test]
    fn edge_touching_window_is_placed_like_sanitize() {
        let ((x, y), _) = initial_placement((60, 18), (20, 5), SCREEN);
        assert_eq!((x, y), (60, 18));
        assert_eq!(
            sanitize_position((60, 18), (20, 5), Maximize::NONE, SCREEN),
            (x, y)
        );
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 2, 3, 3);
        assert!(rect_contains(rect, 2, 2));
        assert!(rect_contains(rect, 4, 4));
        assert!(!rect_contains(rect, 5, 4));
        assert!(!rect_contains(rect, 1, 2));
    }
}
