use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::forward_widget_base;
use crate::keybindings::KeyCombo;
use crate::ui::UiFrame;
use crate::widget::{Maximize, Widget, WidgetBase};

/// A framed window of text lines that echoes typed characters.
///
/// It is the stock widget of the demo binary and what the test suites
/// register, so it also keeps a log of the keys, clicks and menu items it
/// received.
#[derive(Debug, Clone)]
pub struct TextWindow {
    base: WidgetBase,
    lines: Vec<String>,
    keys: Vec<KeyEvent>,
    clicks: Vec<(u16, u16)>,
    accelerators: Vec<(KeyCombo, String)>,
    activated: Vec<String>,
    accept_moves: bool,
    accept_resizes: bool,
}

impl TextWindow {
    pub fn new(title: impl Into<String>, width: u16, height: u16) -> Self {
        Self {
            base: WidgetBase::new(width, height).with_title(title),
            lines: Vec::new(),
            keys: Vec::new(),
            clicks: Vec::new(),
            accelerators: Vec::new(),
            activated: Vec::new(),
            accept_moves: true,
            accept_resizes: true,
        }
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.base = self.base.at(x, y);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base = self.base.with_name(name);
        self
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn transient(mut self) -> Self {
        self.base.transient = true;
        self
    }

    pub fn maximized(mut self, maximize: Maximize) -> Self {
        self.base.maximize = maximize;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.base.visible = false;
        self
    }

    /// Bind `combo` to the menu item `item`.
    pub fn with_accelerator(mut self, combo: KeyCombo, item: impl Into<String>) -> Self {
        self.accelerators.push((combo, item.into()));
        self
    }

    pub fn refuse_moves(mut self) -> Self {
        self.accept_moves = false;
        self
    }

    pub fn refuse_resizes(mut self) -> Self {
        self.accept_resizes = false;
        self
    }

    pub fn base(&self) -> &WidgetBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn keys(&self) -> &[KeyEvent] {
        &self.keys
    }

    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    pub fn activated(&self) -> &[String] {
        &self.activated
    }

    pub fn request_close(&mut self) {
        self.base.close_requested = true;
    }
}

impl Widget for TextWindow {
    forward_widget_base!();

    fn confirm_size(&self, _width: u16, _height: u16) -> bool {
        self.accept_resizes
    }

    fn confirm_position(&self, _x: u16, _y: u16) -> bool {
        self.accept_moves
    }

    fn draw(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        let inner = if self.has_border() && area.width > 2 && area.height > 2 {
            ratatui::layout::Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2)
        } else {
            area
        };
        let text = self
            .lines
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(text).style(Style::default()), inner);
    }

    fn key_pressed(&mut self, key: &KeyEvent) -> bool {
        self.keys.push(*key);
        if key
            .modifiers
            .intersects(KeyModifiers::ALT | KeyModifiers::CONTROL)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                match self.lines.last_mut() {
                    Some(line) => line.push(c),
                    None => self.lines.push(c.to_string()),
                }
                true
            }
            KeyCode::Enter => {
                self.lines.push(String::new());
                true
            }
            KeyCode::Backspace => {
                if let Some(line) = self.lines.last_mut() {
                    line.pop();
                }
                true
            }
            _ => false,
        }
    }

    fn clicked(&mut self, _kind: MouseEventKind, x: u16, y: u16) -> bool {
        self.clicks.push((x, y));
        true
    }

    fn accelerator(&self, key: &KeyEvent) -> Option<String> {
        self.accelerators
            .iter()
            .find(|(combo, _)| combo.matches(key))
            .map(|(_, item)| item.clone())
    }

    fn activate_menu_item(&mut self, item: &str) -> bool {
        self.activated.push(item.to_string());
        if item == "close" {
            self.request_close();
        }
        true
    }
}
