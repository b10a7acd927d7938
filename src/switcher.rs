//! Alt-Tab style modal over the registry's focus order.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Clear, Widget};

use crate::keybindings::key_name;
use crate::layout::rect_contains;
use crate::theme;
use crate::ui::{centered, safe_set_string};
use crate::window::{RegistryHandle, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitcherEntry {
    Window { id: WindowId, label: String },
    Desktop,
}

impl SwitcherEntry {
    fn label(&self) -> &str {
        match self {
            SwitcherEntry::Window { label, .. } => label,
            SwitcherEntry::Desktop => "Desktop",
        }
    }
}

#[derive(Debug)]
pub struct WindowSwitcher {
    cycle_key: KeyCode,
    entries: Vec<SwitcherEntry>,
    selected: usize,
    open: bool,
    hits: Vec<(usize, Rect)>,
}

impl WindowSwitcher {
    pub fn new(cycle_key: KeyCode) -> Self {
        Self {
            cycle_key,
            entries: Vec::new(),
            selected: 0,
            open: false,
            hits: Vec::new(),
        }
    }

    pub fn cycle_key(&self) -> KeyCode {
        self.cycle_key
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn entries(&self) -> &[SwitcherEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Snapshot the focus order (most recent first) plus the desktop entry.
    pub fn show(&mut self, registry: &RegistryHandle) {
        self.entries = registry
            .get_focus_order()
            .iter()
            .map(|w| SwitcherEntry::Window {
                id: w.id(),
                label: w.label(),
            })
            .collect();
        self.entries.push(SwitcherEntry::Desktop);
        self.selected = 0;
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.open = false;
        self.hits.clear();
    }

    pub fn cycle_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn cycle_previous(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + self.entries.len() - 1) % self.entries.len();
        }
    }

    /// Act on the selected entry and close. Picking the window that already
    /// has focus minimizes it; any other window is opened and focused.
    pub fn confirm(&mut self, registry: &RegistryHandle) {
        if let Some(entry) = self.entries.get(self.selected).cloned() {
            match entry {
                SwitcherEntry::Window { id, .. } => {
                    if let Some(window) = registry.get_window(id.as_str()) {
                        let current = registry.last_focused().as_ref() == Some(&window);
                        if current && window.is_visible() {
                            window.minimize();
                        } else {
                            window.open();
                            window.focus();
                        }
                    }
                }
                SwitcherEntry::Desktop => registry.minimize_all(),
            }
        }
        self.cancel();
    }

    fn activate(&mut self, idx: usize, registry: &RegistryHandle) {
        match self.entries.get(idx) {
            Some(SwitcherEntry::Window { id, .. }) => {
                if let Some(window) = registry.get_window(id.as_str()) {
                    window.open();
                }
            }
            Some(SwitcherEntry::Desktop) => registry.minimize_all(),
            None => {}
        }
        self.cancel();
    }

    /// Returns whether the key was used by the switcher.
    pub fn handle_key(&mut self, key: &KeyEvent, registry: &RegistryHandle) -> bool {
        if !self.open {
            return false;
        }
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            code if code == self.cycle_key && shifted => self.cycle_previous(),
            code if code == self.cycle_key => self.cycle_next(),
            KeyCode::Right | KeyCode::Tab => self.cycle_next(),
            KeyCode::Left | KeyCode::BackTab => self.cycle_previous(),
            KeyCode::Enter => self.confirm(registry),
            KeyCode::Esc => self.cancel(),
            _ => {}
        }
        true
    }

    /// Clicking an entry opens that window (or minimizes everything for the
    /// desktop entry); releasing anywhere else dismisses the switcher.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent, registry: &RegistryHandle) -> bool {
        if !self.open {
            return false;
        }
        if let MouseEventKind::Up(_) = mouse.kind {
            let hit = self
                .hits
                .iter()
                .find(|(_, rect)| rect_contains(*rect, mouse.column, mouse.row))
                .map(|(idx, _)| *idx);
            match hit {
                Some(idx) => self.activate(idx, registry),
                None => self.cancel(),
            }
        }
        true
    }

    pub fn render(&mut self, buffer: &mut Buffer, area: Rect) {
        self.hits.clear();
        if !self.open {
            return;
        }
        let label_width = self
            .entries
            .iter()
            .map(|e| e.label().chars().count() as u16)
            .max()
            .unwrap_or(0);
        let width = (label_width + 6).max(15);
        let height = self.entries.len() as u16 + 2;
        let rect = centered(area, width, height);
        let style = Style::default()
            .bg(theme::switcher_bg())
            .fg(theme::switcher_fg());
        let selected_style = Style::default()
            .bg(theme::switcher_selected_bg())
            .fg(theme::switcher_fg())
            .add_modifier(Modifier::BOLD);
        Clear.render(rect, buffer);
        let block = Block::bordered()
            .style(style)
            .title_bottom(format!(" Cycle: {} ", key_name(self.cycle_key)));
        let inner = block.inner(rect);
        block.render(rect, buffer);
        for (idx, entry) in self.entries.iter().enumerate().take(inner.height as usize) {
            let row = Rect::new(inner.x, inner.y + idx as u16, inner.width, 1);
            let row_style = if idx == self.selected {
                selected_style
            } else {
                style
            };
            buffer.set_style(row, row_style);
            safe_set_string(buffer, row, row.x + 1, row.y, entry.label(), row_style);
            self.hits.push((idx, row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowConfig;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn desktop() -> (RegistryHandle, Vec<crate::window::WindowRef>) {
        let registry = RegistryHandle::new();
        registry.set_viewport(Rect::new(0, 0, 80, 24));
        let windows = ["a", "b", "c"]
            .iter()
            .map(|id| {
                registry
                    .create_window(
                        WindowConfig::new(*id)
                            .with_start_open(true)
                            .with_animated(false),
                    )
                    .unwrap()
            })
            .collect();
        (registry, windows)
    }

    #[test]
    fn lists_focus_order_then_desktop_and_wraps() {
        let (registry, windows) = desktop();
        windows[0].focus();
        let mut switcher = WindowSwitcher::new(KeyCode::F(1));
        switcher.show(&registry);
        let labels: Vec<&str> = switcher.entries().iter().map(SwitcherEntry::label).collect();
        assert_eq!(labels, vec!["A", "C", "B", "Desktop"]);

        switcher.handle_key(&key(KeyCode::F(1), KeyModifiers::SHIFT), &registry);
        assert_eq!(switcher.selected(), 3);
        switcher.handle_key(&key(KeyCode::F(1), KeyModifiers::NONE), &registry);
        assert_eq!(switcher.selected(), 0);
    }

    #[test]
    fn entries_carry_the_icon() {
        let registry = RegistryHandle::new();
        registry.set_viewport(Rect::new(0, 0, 80, 24));
        registry
            .create_window(WindowConfig::new("log").with_icon("#").with_animated(false))
            .unwrap();
        let mut switcher = WindowSwitcher::new(KeyCode::F(1));
        switcher.show(&registry);
        assert_eq!(switcher.entries()[0].label(), "# Log");
    }

    #[test]
    fn confirm_on_current_window_minimizes_it() {
        let (registry, windows) = desktop();
        let mut switcher = WindowSwitcher::new(KeyCode::F(1));
        switcher.show(&registry);
        // "c" was opened last and holds focus
        switcher.handle_key(&key(KeyCode::Enter, KeyModifiers::NONE), &registry);
        assert!(!windows[2].is_open());
        assert!(!switcher.is_open());
    }

    #[test]
    fn confirm_on_other_window_focuses_it() {
        let (registry, windows) = desktop();
        windows[0].minimize();
        let mut switcher = WindowSwitcher::new(KeyCode::F(1));
        switcher.show(&registry);
        switcher.cycle_next();
        switcher.cycle_next();
        assert_eq!(
            switcher.entries()[switcher.selected()],
            SwitcherEntry::Window {
                id: windows[0].id(),
                label: "A".into()
            }
        );
        switcher.confirm(&registry);
        assert!(windows[0].is_open());
        assert_eq!(registry.get_focus_order()[0], windows[0]);
    }

    #[test]
    fn desktop_entry_minimizes_everything() {
        let (registry, windows) = desktop();
        let mut switcher = WindowSwitcher::new(KeyCode::F(1));
        switcher.show(&registry);
        switcher.cycle_previous();
        switcher.confirm(&registry);
        assert!(windows.iter().all(|w| !w.is_open()));
    }

    #[test]
    fn click_opens_window_and_escape_cancels() {
        let (registry, windows) = desktop();
        windows[1].minimize();
        let mut switcher = WindowSwitcher::new(KeyCode::F(1));
        switcher.show(&registry);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 80, 24));
        switcher.render(&mut buffer, Rect::new(0, 0, 80, 24));
        let target = switcher
            .entries()
            .iter()
            .position(|e| matches!(e, SwitcherEntry::Window { id, .. } if *id == windows[1].id()))
            .unwrap();
        let (_, row) = *switcher.hits.iter().find(|(idx, _)| *idx == target).unwrap();
        let click = MouseEvent {
            kind: MouseEventKind::Up(crossterm::event::MouseButton::Left),
            column: row.x + 1,
            row: row.y,
            modifiers: KeyModifiers::NONE,
        };
        switcher.handle_mouse(&click, &registry);
        assert!(windows[1].is_open());
        assert!(!switcher.is_open());

        switcher.show(&registry);
        switcher.handle_key(&key(KeyCode::Esc, KeyModifiers::NONE), &registry);
        assert!(!switcher.is_open());
        assert!(!switcher.handle_key(&key(KeyCode::Enter, KeyModifiers::NONE), &registry));
    }
}
