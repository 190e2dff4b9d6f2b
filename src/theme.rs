use ratatui::style::Color;

// Centralized theme colors. Keep these as small helpers so drawing code
// never hardcodes a palette.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Taskbar
pub fn taskbar_bg() -> Color {
    Color::DarkGray
}
pub fn taskbar_fg() -> Color {
    Color::White
}
pub fn taskbar_focused_bg() -> Color {
    Color::Gray
}
pub fn taskbar_focused_fg() -> Color {
    Color::Black
}
pub fn taskbar_urgent_fg() -> Color {
    accent()
}

// Menu / list popups
pub fn menu_bg() -> Color {
    Color::DarkGray
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}

// Pending-activity message on the top row
pub fn activity_bg() -> Color {
    accent()
}
pub fn activity_fg() -> Color {
    Color::Black
}

// Decorator
pub fn decorator_header_bg() -> Color {
    Color::Blue
}
pub fn decorator_header_fg() -> Color {
    Color::White
}
pub fn decorator_border() -> Color {
    Color::DarkGray
}
pub fn decorator_focused_border() -> Color {
    Color::White
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_items_stand_out_from_the_taskbar() {
        assert_ne!(taskbar_urgent_fg(), taskbar_fg());
        assert_ne!(taskbar_urgent_fg(), taskbar_bg());
    }
}
