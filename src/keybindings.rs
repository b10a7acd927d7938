use std::collections::BTreeMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Quit,
    CloseWindow,
    MinimizeWindow,
    OpenSwitcher,
    OpenSwitcherBackwards,
    ToggleBar,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::CloseWindow => "Close focused window",
            Action::MinimizeWindow => "Minimize focused window",
            Action::OpenSwitcher => "Window switcher",
            Action::OpenSwitcherBackwards => "Window switcher (reverse)",
            Action::ToggleBar => "Show / hide window bar",
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

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
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
        parts.push(key_name(self.code));
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        other => format!("{:?}", other),
    }
}

/// Parse a key name such as `f1`, `F12` or `tab` as given on the command line.
pub fn parse_key(value: &str) -> Option<KeyCode> {
    let lower = value.trim().to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&n).then_some(KeyCode::F(n));
    }
    match lower.as_str() {
        "tab" => Some(KeyCode::Tab),
        "esc" | "escape" => Some(KeyCode::Esc),
        "insert" => Some(KeyCode::Insert),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: BTreeMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn default() -> Self {
        Self::with_switcher_key(KeyCode::F(1))
    }

    pub fn with_switcher_key(switcher: KeyCode) -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        kb.add(
            MinimizeWindow,
            KeyCombo::new(KeyCode::Char('d'), KeyModifiers::CONTROL),
        );
        kb.add(OpenSwitcher, KeyCombo::new(switcher, KeyModifiers::NONE));
        kb.add(
            OpenSwitcherBackwards,
            KeyCombo::new(switcher, KeyModifiers::SHIFT),
        );
        kb.add(
            ToggleBar,
            KeyCombo::new(KeyCode::Char('b'), KeyModifiers::CONTROL),
        );
        kb
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, list)| list.iter().any(|c| c.matches(key)))
            .map(|(act, _)| *act)
    }

    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        self.map
            .iter()
            .map(|(act, list)| (*act, list.iter().map(KeyCombo::display).collect()))
            .collect()
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }
}
