use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::WmError;

/// Global window-manager actions. The kebab-case names are what the
/// configuration file's `[keys]` table refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    WindowNext,
    WindowPrev,
    WindowNextUrgent,
    WindowPrevUrgent,
    WindowClose,
    WindowList,
    WindowShiftLeft,
    WindowShiftRight,
    WindowScrollUp,
    WindowScrollDown,
    WindowTag,
    PlaceTagged,
    ActionList,
    StartMove,
    StartResize,
    RefreshScreen,
    HelpForWm,
    DumpScreen,
    Quit,
    WorkspaceNew,
    WorkspaceNext,
    WorkspacePrev,
    WorkspaceList,
    IgnoreKeysStart,
    IgnoreKeysEnd,
}

impl Action {
    pub const ALL: [Action; 25] = [
        Action::WindowNext,
        Action::WindowPrev,
        Action::WindowNextUrgent,
        Action::WindowPrevUrgent,
        Action::WindowClose,
        Action::WindowList,
        Action::WindowShiftLeft,
        Action::WindowShiftRight,
        Action::WindowScrollUp,
        Action::WindowScrollDown,
        Action::WindowTag,
        Action::PlaceTagged,
        Action::ActionList,
        Action::StartMove,
        Action::StartResize,
        Action::RefreshScreen,
        Action::HelpForWm,
        Action::DumpScreen,
        Action::Quit,
        Action::WorkspaceNew,
        Action::WorkspaceNext,
        Action::WorkspacePrev,
        Action::WorkspaceList,
        Action::IgnoreKeysStart,
        Action::IgnoreKeysEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::WindowNext => "window-next",
            Action::WindowPrev => "window-prev",
            Action::WindowNextUrgent => "window-next-urgent",
            Action::WindowPrevUrgent => "window-prev-urgent",
            Action::WindowClose => "window-close",
            Action::WindowList => "window-list",
            Action::WindowShiftLeft => "shift-left",
            Action::WindowShiftRight => "shift-right",
            Action::WindowScrollUp => "window-scroll-up",
            Action::WindowScrollDown => "window-scroll-down",
            Action::WindowTag => "window-tag",
            Action::PlaceTagged => "place-tagged",
            Action::ActionList => "action-list",
            Action::StartMove => "start-move",
            Action::StartResize => "start-resize",
            Action::RefreshScreen => "refresh-screen",
            Action::HelpForWm => "help-for-wm",
            Action::DumpScreen => "dump-screen",
            Action::Quit => "wm-quit",
            Action::WorkspaceNew => "workspace-new",
            Action::WorkspaceNext => "workspace-next",
            Action::WorkspacePrev => "workspace-prev",
            Action::WorkspaceList => "workspace-list",
            Action::IgnoreKeysStart => "ignore-keys-start",
            Action::IgnoreKeysEnd => "ignore-keys-end",
        }
    }
}

impl FromStr for Action {
    type Err = WmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| WmError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::WindowNext => "Next window",
            Action::WindowPrev => "Previous window",
            Action::WindowNextUrgent => "Next urgent window",
            Action::WindowPrevUrgent => "Previous urgent window",
            Action::WindowClose => "Close window",
            Action::WindowList => "Window list",
            Action::WindowShiftLeft => "Shift window left",
            Action::WindowShiftRight => "Shift window right",
            Action::WindowScrollUp => "Scroll window up",
            Action::WindowScrollDown => "Scroll window down",
            Action::WindowTag => "Tag window",
            Action::PlaceTagged => "Place tagged windows",
            Action::ActionList => "Action list",
            Action::StartMove => "Move window",
            Action::StartResize => "Resize window",
            Action::RefreshScreen => "Refresh screen",
            Action::HelpForWm => "Key bindings",
            Action::DumpScreen => "Dump screen to file",
            Action::Quit => "Quit",
            Action::WorkspaceNew => "New workspace",
            Action::WorkspaceNext => "Next workspace",
            Action::WorkspacePrev => "Previous workspace",
            Action::WorkspaceList => "Workspace list",
            Action::IgnoreKeysStart => "Pass keys through",
            Action::IgnoreKeysEnd => "Stop passing keys through",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn alt(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::ALT)
    }

    pub fn alt_ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::ALT | KeyModifiers::CONTROL)
    }

    /// Character keys ignore SHIFT: terminals disagree on whether `Alt+>`
    /// carries it, and the character already encodes the shifted glyph.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        match self.code {
            KeyCode::Char(_) => {
                key.modifiers.difference(KeyModifiers::SHIFT)
                    == self.mods.difference(KeyModifiers::SHIFT)
            }
            _ => key.modifiers == self.mods,
        }
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Parses combos such as `alt+n`, `ctrl+alt+g`, `f9` or `alt+tab`.
impl FromStr for KeyCombo {
    type Err = WmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || WmError::KeyParse(s.to_string());
        let mut mods = KeyModifiers::NONE;
        let mut parts: Vec<&str> = s.split('+').collect();
        // A trailing `+` means the key itself is `+`.
        if s.ends_with("++") {
            parts.pop();
            parts.pop();
            parts.push("+");
        }
        let (key, modifiers) = parts.split_last().ok_or_else(err)?;
        for m in modifiers {
            match m.trim().to_ascii_lowercase().as_str() {
                "alt" | "meta" | "m" => mods |= KeyModifiers::ALT,
                "ctrl" | "control" | "c" => mods |= KeyModifiers::CONTROL,
                "shift" | "s" => mods |= KeyModifiers::SHIFT,
                _ => return Err(err()),
            }
        }
        let lower = key.to_ascii_lowercase();
        let function = lower
            .strip_prefix('f')
            .filter(|n| !n.is_empty())
            .and_then(|n| n.parse::<u8>().ok());
        let code = match lower.as_str() {
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "delete" => KeyCode::Delete,
            "insert" => KeyCode::Insert,
            "space" => KeyCode::Char(' '),
            _ if function.is_some() => KeyCode::F(function.unwrap_or_default()),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(err()),
                }
            }
        };
        Ok(KeyCombo::new(code, mods))
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(WindowNext, KeyCombo::alt('n'));
        kb.add(WindowPrev, KeyCombo::alt('p'));
        kb.add(WindowNextUrgent, KeyCombo::new(KeyCode::Tab, KeyModifiers::ALT));
        kb.add(
            WindowPrevUrgent,
            KeyCombo::new(KeyCode::BackTab, KeyModifiers::ALT),
        );
        kb.add(WindowClose, KeyCombo::alt('c'));
        kb.add(WindowList, KeyCombo::alt('w'));
        kb.add(WindowShiftLeft, KeyCombo::alt(','));
        kb.add(WindowShiftRight, KeyCombo::alt('.'));
        kb.add(WindowScrollDown, KeyCombo::alt_ctrl('j'));
        kb.add(WindowScrollUp, KeyCombo::alt_ctrl('k'));
        kb.add(WindowTag, KeyCombo::alt('t'));
        kb.add(PlaceTagged, KeyCombo::alt('T'));
        kb.add(ActionList, KeyCombo::alt('a'));
        kb.add(StartMove, KeyCombo::alt('m'));
        kb.add(StartResize, KeyCombo::alt('r'));
        kb.add(RefreshScreen, KeyCombo::alt('l'));
        kb.add(HelpForWm, KeyCombo::alt('\\'));
        kb.add(DumpScreen, KeyCombo::alt('D'));
        kb.add(Quit, KeyCombo::alt('q'));
        kb.add(WorkspaceNew, KeyCombo::new(KeyCode::F(9), KeyModifiers::NONE));
        kb.add(WorkspaceNext, KeyCombo::alt('>'));
        kb.add(WorkspacePrev, KeyCombo::alt('<'));
        kb.add(WorkspaceList, KeyCombo::alt('s'));
        kb.add(IgnoreKeysEnd, KeyCombo::alt_ctrl('g'));
        // IgnoreKeysStart has no default combo so a stray key cannot lock the
        // user out. Applications expose it with `register_wm_action` or a
        // `[keys]` override.
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    /// Replace every combo bound to `action`.
    pub fn rebind(&mut self, action: Action, combos: Vec<KeyCombo>) {
        self.map.insert(action, combos);
    }

    /// Apply `action-name = "combo"` overrides on top of the current map.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<(), WmError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, combo) in overrides {
            let action: Action = name.parse()?;
            let combos = combo
                .split_whitespace()
                .map(KeyCombo::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            self.rebind(action, combos);
        }
        Ok(())
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    /// First action bound to `key`, checked in [`Action::ALL`] order so the
    /// lookup is deterministic when a combo is bound twice.
    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| self.matches(*action, key))
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_cover_window_cycling() {
        let kb = KeyBindings::default();
        let ev = key(KeyCode::Char('n'), KeyModifiers::ALT);
        assert_eq!(kb.action_for_key(&ev), Some(Action::WindowNext));
        let ev = key(KeyCode::F(9), KeyModifiers::NONE);
        assert_eq!(kb.action_for_key(&ev), Some(Action::WorkspaceNew));
    }

    #[test]
    fn char_combos_ignore_shift() {
        let kb = KeyBindings::default();
        let ev = key(KeyCode::Char('>'), KeyModifiers::ALT | KeyModifiers::SHIFT);
        assert!(kb.matches(Action::WorkspaceNext, &ev));
        let tag = key(KeyCode::Char('t'), KeyModifiers::ALT);
        let place = key(KeyCode::Char('T'), KeyModifiers::ALT | KeyModifiers::SHIFT);
        assert_eq!(kb.action_for_key(&tag), Some(Action::WindowTag));
        assert_eq!(kb.action_for_key(&place), Some(Action::PlaceTagged));
    }

    #[test]
    fn help_and_dump_are_bound_but_ignore_keys_start_is_not() {
        let kb = KeyBindings::default();
        assert_eq!(kb.combos_for(Action::HelpForWm), vec!["Alt+\\"]);
        let dump = key(KeyCode::Char('D'), KeyModifiers::ALT | KeyModifiers::SHIFT);
        assert_eq!(kb.action_for_key(&dump), Some(Action::DumpScreen));
        assert!(kb.combos_for(Action::IgnoreKeysStart).is_empty());
        assert_eq!(kb.combos_for(Action::IgnoreKeysEnd), vec!["Ctrl+Alt+g"]);
    }

    #[test]
    fn plain_letters_are_not_bound() {
        let kb = KeyBindings::default();
        let ev = key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(kb.action_for_key(&ev), None);
    }

    #[test]
    fn parses_combo_strings() {
        assert_eq!(
            "alt+ctrl+g".parse::<KeyCombo>().expect("valid"),
            KeyCombo::alt_ctrl('g')
        );
        assert_eq!(
            "F9".parse::<KeyCombo>().expect("valid"),
            KeyCombo::new(KeyCode::F(9), KeyModifiers::NONE)
        );
        assert_eq!(
            "alt++".parse::<KeyCombo>().expect("valid"),
            KeyCombo::alt('+')
        );
        assert!("hyper+x".parse::<KeyCombo>().is_err());
        assert!("alt+nope".parse::<KeyCombo>().is_err());
    }

    #[test]
    fn overrides_replace_default_combos() {
        let mut kb = KeyBindings::default();
        kb.apply_overrides([("window-next", "ctrl+n alt+j")])
            .expect("valid overrides");
        assert!(!kb.matches(
            Action::WindowNext,
            &key(KeyCode::Char('n'), KeyModifiers::ALT)
        ));
        assert!(kb.matches(
            Action::WindowNext,
            &key(KeyCode::Char('j'), KeyModifiers::ALT)
        ));
        assert_eq!(kb.combos_for(Action::WindowNext), vec!["Ctrl+n", "Alt+j"]);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut kb = KeyBindings::default();
        let err = kb.apply_overrides([("fly", "alt+f")]).unwrap_err();
        assert!(matches!(err, WmError::UnknownAction(name) if name == "fly"));
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>().expect("known"), action);
        }
    }
}
