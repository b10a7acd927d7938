//! Popup menu used by the bar and by window hamburger buttons.
//!
//! The menu is generic over the value each entry yields, so the bar can fill
//! it with [`crate::bar::BarCommand`]s and still reuse the same drawing and
//! hit testing.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::constants::MENU_WIDTH;
use crate::layout::rect_contains;
use crate::theme;
use crate::ui::{fill, safe_set_string, truncate_to_width};

/// Which way the menu grows from its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuDirection {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome<A> {
    Pending,
    Chosen(A),
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct PopupMenu<A: Clone> {
    anchor: (u16, u16),
    direction: MenuDirection,
    items: Vec<(String, A)>,
    selected: usize,
    bounds: Option<Rect>,
}

impl<A: Clone> PopupMenu<A> {
    pub fn new(anchor: (u16, u16), direction: MenuDirection, items: Vec<(String, A)>) -> Self {
        Self {
            anchor,
            direction,
            items,
            selected: 0,
            bounds: None,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }

    /// Where the menu lands inside `area`, kept fully on screen.
    pub fn layout(&self, area: Rect) -> Rect {
        let label_width = self
            .items
            .iter()
            .map(|(label, _)| label.chars().count() as u16)
            .max()
            .unwrap_or(0);
        let width = (label_width + 4).max(MENU_WIDTH).min(area.width);
        let height = (self.items.len() as u16).min(area.height);
        let max_x = area.x + area.width - width;
        let x = self.anchor.0.clamp(area.x, max_x);
        let y = match self.direction {
            MenuDirection::Down => self.anchor.1.saturating_add(1),
            MenuDirection::Up => self.anchor.1.saturating_sub(height),
        };
        let max_y = area.y + area.height - height;
        Rect {
            x,
            y: y.clamp(area.y, max_y),
            width,
            height,
        }
    }

    pub fn render(&mut self, buffer: &mut Buffer, area: Rect) {
        if self.items.is_empty() || area.width == 0 || area.height == 0 {
            self.bounds = None;
            return;
        }
        let rect = self.layout(area);
        self.bounds = Some(rect);
        let menu_style = Style::default()
            .bg(theme::menu_bg())
            .fg(theme::menu_fg());
        let selected_style = Style::default()
            .bg(theme::menu_selected_bg())
            .fg(theme::menu_selected_fg())
            .add_modifier(Modifier::BOLD);
        fill(buffer, rect, menu_style);
        for (idx, (label, _)) in self.items.iter().enumerate().take(rect.height as usize) {
            let y = rect.y + idx as u16;
            let style = if idx == self.selected {
                selected_style
            } else {
                menu_style
            };
            let row = Rect::new(rect.x, y, rect.width, 1);
            fill(buffer, row, style);
            let text = truncate_to_width(label, rect.width.saturating_sub(2) as usize);
            safe_set_string(buffer, row, rect.x + 1, y, &text, style);
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.bounds
            .is_some_and(|rect| rect_contains(rect, column, row))
    }

    fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let rect = self.bounds?;
        if !rect_contains(rect, column, row) {
            return None;
        }
        let idx = (row - rect.y) as usize;
        (idx < self.items.len()).then_some(idx)
    }

    fn choose(&self, idx: usize) -> MenuOutcome<A> {
        match self.items.get(idx) {
            Some((_, action)) => MenuOutcome::Chosen(action.clone()),
            None => MenuOutcome::Dismissed,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> MenuOutcome<A> {
        match key.code {
            KeyCode::Up => {
                self.select_prev();
                MenuOutcome::Pending
            }
            KeyCode::Down | KeyCode::Tab => {
                self.select_next();
                MenuOutcome::Pending
            }
            KeyCode::Enter => self.choose(self.selected),
            KeyCode::Esc => MenuOutcome::Dismissed,
            _ => MenuOutcome::Pending,
        }
    }

    /// Hovering moves the selection; releasing over an item picks it and
    /// pressing outside the menu dismisses it.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> MenuOutcome<A> {
        let hit = self.item_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if let Some(idx) = hit {
                    self.selected = idx;
                }
                MenuOutcome::Pending
            }
            MouseEventKind::Down(_) if hit.is_none() => MenuOutcome::Dismissed,
            MouseEventKind::Up(_) => match hit {
                Some(idx) => self.choose(idx),
                None => MenuOutcome::Pending,
            },
            _ => MenuOutcome::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn menu() -> PopupMenu<u8> {
        PopupMenu::new(
            (70, 23),
            MenuDirection::Up,
            vec![("Open all".into(), 1), ("Close all".into(), 2), ("Reset all".into(), 3)],
        )
    }

    fn click(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn layout_stays_on_screen() {
        let rect = menu().layout(Rect::new(0, 0, 80, 24));
        assert_eq!(rect, Rect::new(66, 20, MENU_WIDTH, 3));

        let down = PopupMenu::new((0, 0), MenuDirection::Down, vec![("A".into(), 0u8)]);
        assert_eq!(down.layout(Rect::new(0, 0, 80, 24)).y, 1);
    }

    #[test]
    fn keyboard_selection_wraps() {
        let mut menu = menu();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        menu.handle_key(&key(KeyCode::Up));
        assert_eq!(menu.selected(), 2);
        menu.handle_key(&key(KeyCode::Down));
        assert_eq!(menu.handle_key(&key(KeyCode::Enter)), MenuOutcome::Chosen(1));
        assert_eq!(menu.handle_key(&key(KeyCode::Esc)), MenuOutcome::Dismissed);
    }

    #[test]
    fn mouse_release_over_item_chooses_it() {
        let mut menu = menu();
        let mut buffer = Buffer::empty(Rect::new(0, 0, 80, 24));
        menu.render(&mut buffer, Rect::new(0, 0, 80, 24));
        assert_eq!(buffer[(67, 21)].symbol(), "C");
        assert_eq!(
            menu.handle_mouse(&click(MouseEventKind::Up(MouseButton::Left), 70, 21)),
            MenuOutcome::Chosen(2)
        );
        assert_eq!(
            menu.handle_mouse(&click(MouseEventKind::Down(MouseButton::Left), 5, 5)),
            MenuOutcome::Dismissed
        );
    }
}
