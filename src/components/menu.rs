use crossterm::event::{KeyCode, KeyEvent, MouseEventKind};
use ratatui::style::{Modifier, Style};

use crate::forward_widget_base;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};
use crate::widget::{Widget, WidgetBase};

/// Transient pop-up menu. Choosing an item records it and asks to be closed;
/// the owner picks the choice up with [`MenuWidget::take_activated`].
#[derive(Debug, Clone)]
pub struct MenuWidget {
    base: WidgetBase,
    items: Vec<String>,
    selected: usize,
    activated: Option<String>,
}

impl MenuWidget {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let width = items
            .iter()
            .map(|item| item.chars().count())
            .max()
            .unwrap_or(0)
            .saturating_add(4);
        let height = items.len().saturating_add(2);
        let mut base = WidgetBase::new(
            u16::try_from(width).unwrap_or(u16::MAX),
            u16::try_from(height).unwrap_or(u16::MAX),
        );
        base.transient = true;
        Self {
            base,
            items,
            selected: 0,
            activated: None,
        }
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.base = self.base.at(x, y);
        self
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn take_activated(&mut self) -> Option<String> {
        self.activated.take()
    }

    fn activate(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        self.activated = Some(item.clone());
        self.base.close_requested = true;
        true
    }
}

impl Widget for MenuWidget {
    forward_widget_base!();

    fn draw(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        let base = Style::default().bg(theme::menu_bg()).fg(theme::menu_fg());
        frame.fill(area, base);
        let buffer = frame.buffer_mut();
        for (index, item) in self.items.iter().enumerate() {
            let y = area.y.saturating_add(1).saturating_add(index as u16);
            let style = if index == self.selected {
                Style::default()
                    .bg(theme::menu_selected_bg())
                    .fg(theme::menu_selected_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                base
            };
            let row = format!(" {item:<w$} ", w = (area.width as usize).saturating_sub(4));
            safe_set_string(buffer, area, area.x.saturating_add(1), y, &row, style);
        }
    }

    fn key_pressed(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(self.items.len().saturating_sub(1));
                true
            }
            KeyCode::Enter => self.activate(self.selected),
            _ => false,
        }
    }

    fn clicked(&mut self, kind: MouseEventKind, _x: u16, y: u16) -> bool {
        if !matches!(kind, MouseEventKind::Down(_)) || y == 0 {
            return false;
        }
        self.activate(usize::from(y - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};

    #[test]
    fn menu_is_transient_and_sized_to_items() {
        let menu = MenuWidget::new(["Open", "Close window"]);
        assert!(menu.is_transient());
        assert_eq!(menu.size(), (16, 4));
    }

    #[test]
    fn enter_activates_selection_and_requests_close() {
        let mut menu = MenuWidget::new(["a", "b"]);
        menu.key_pressed(&KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert!(menu.key_pressed(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(menu.close_requested());
        assert_eq!(menu.take_activated().as_deref(), Some("b"));
        assert!(menu.take_activated().is_none());
    }

    #[test]
    fn escape_is_left_to_the_window_manager() {
        let mut menu = MenuWidget::new(["a"]);
        assert!(!menu.key_pressed(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    }

    #[test]
    fn click_on_a_row_activates_it() {
        let mut menu = MenuWidget::new(["a", "b"]);
        assert!(menu.clicked(MouseEventKind::Down(MouseButton::Left), 2, 2));
        assert_eq!(menu.take_activated().as_deref(), Some("b"));
    }
}
