//! Taskbar with one button per registered window.
//!
//! The bar only records what the registry tells it through [`BarAdapter`];
//! clicks are turned into [`BarResponse`]s that the host applies after the
//! bar borrow has been released.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::constants::MINIMIZED_MARKER;
use crate::error::WmError;
use crate::layout::rect_contains;
use crate::menu::{MenuDirection, PopupMenu};
use crate::theme;
use crate::ui::{fill, safe_set_string};
use crate::window::{BarAdapter, RegistryHandle, WeakRegistry, WindowId, WindowMode, WindowRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Dock {
    Top,
    #[default]
    Bottom,
}

impl Dock {
    fn flipped(self) -> Dock {
        match self {
            Dock::Top => Dock::Bottom,
            Dock::Bottom => Dock::Top,
        }
    }

    fn menu_direction(self) -> MenuDirection {
        match self {
            Dock::Top => MenuDirection::Down,
            Dock::Bottom => MenuDirection::Up,
        }
    }
}

/// Action picked from a bar button or one of the bar menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarCommand {
    ToggleWindow(WindowId),
    ToggleSnap(WindowId),
    CloseWindow(WindowId),
    ResetWindow(WindowId),
    WindowMenuOption(WindowId, usize),
    OpenAll,
    MinimizeAll,
    CloseAll,
    SnapAll,
    UnsnapAll,
    ResetAll,
    ToggleDock,
}

impl BarCommand {
    /// Run the command against the registry. `ToggleDock` is left to the
    /// caller since it needs the bar itself.
    pub fn apply(&self, registry: &RegistryHandle) {
        let window = |id: &WindowId| registry.get_window(id.as_str());
        match self {
            BarCommand::ToggleWindow(id) => {
                if let Some(w) = window(id) {
                    w.toggle_window();
                }
            }
            BarCommand::ToggleSnap(id) => {
                if let Some(w) = window(id) {
                    w.toggle_snap();
                }
            }
            BarCommand::CloseWindow(id) => {
                if let Some(w) = window(id) {
                    w.close_or_minimize();
                }
            }
            BarCommand::ResetWindow(id) => {
                if let Some(w) = window(id) {
                    w.reset();
                }
            }
            BarCommand::WindowMenuOption(id, index) => {
                if let Some(w) = window(id) {
                    w.invoke_menu_option(*index);
                }
            }
            BarCommand::OpenAll => registry.open_all(),
            BarCommand::MinimizeAll => registry.minimize_all(),
            BarCommand::CloseAll => registry.close_all(),
            BarCommand::SnapAll => registry.snap_all(),
            BarCommand::UnsnapAll => registry.unsnap_all(),
            BarCommand::ResetAll => registry.reset_all(),
            BarCommand::ToggleDock => {}
        }
    }
}

#[derive(Debug, Clone)]
pub enum BarResponse {
    Ignored,
    Consumed,
    Command(BarCommand),
    Menu(PopupMenu<BarCommand>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BarControl {
    id: WindowId,
    label: String,
    open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Button(usize),
    Background,
}

#[derive(Debug)]
pub struct WindowBar {
    registry: WeakRegistry,
    controls: Vec<BarControl>,
    dock: Dock,
    visible: bool,
    area: Rect,
    hits: Vec<(usize, Rect)>,
    pressed: Option<(Target, MouseButton)>,
}

impl WindowBar {
    pub fn new(registry: &RegistryHandle, dock: Dock) -> Self {
        Self {
            registry: registry.downgrade(),
            controls: Vec::new(),
            dock,
            visible: true,
            area: Rect::default(),
            hits: Vec::new(),
            pressed: None,
        }
    }

    /// Create a bar and bind it to `registry`.
    pub fn bind(registry: &RegistryHandle, dock: Dock) -> Result<Rc<RefCell<WindowBar>>, WmError> {
        let bar = Rc::new(RefCell::new(WindowBar::new(registry, dock)));
        registry.register_bar(bar.clone())?;
        Ok(bar)
    }

    pub fn dock(&self) -> Dock {
        self.dock
    }

    pub fn set_dock(&mut self, dock: Dock) {
        self.dock = dock;
    }

    pub fn toggle_dock(&mut self) {
        self.dock = self.dock.flipped();
        tracing::debug!(dock = ?self.dock, "bar dock toggled");
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    /// Button texts in order, with the minimized marker applied.
    pub fn button_labels(&self) -> Vec<String> {
        self.controls.iter().map(Self::button_text).collect()
    }

    fn button_text(control: &BarControl) -> String {
        if control.open {
            control.label.clone()
        } else {
            format!("{MINIMIZED_MARKER}{}", control.label)
        }
    }

    /// Carve the bar row off `area` and return the area left for windows.
    pub fn split_area(&mut self, area: Rect) -> Rect {
        if !self.visible || area.height == 0 {
            self.area = Rect::default();
            return area;
        }
        let managed_height = area.height - 1;
        match self.dock {
            Dock::Top => {
                self.area = Rect::new(area.x, area.y, area.width, 1);
                Rect::new(area.x, area.y + 1, area.width, managed_height)
            }
            Dock::Bottom => {
                self.area = Rect::new(area.x, area.y + managed_height, area.width, 1);
                Rect::new(area.x, area.y, area.width, managed_height)
            }
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn render(&mut self, buffer: &mut Buffer, focused: Option<&WindowId>) {
        self.hits.clear();
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default().bg(theme::bar_bg()).fg(theme::bar_fg());
        fill(buffer, area, base);

        let chunks: Vec<String> = self
            .controls
            .iter()
            .map(|c| format!(" {} ", Self::button_text(c)))
            .collect();
        let total: u16 = chunks.iter().map(|c| c.chars().count() as u16).sum();
        let max_x = area.x + area.width;
        let mut x = area.x + area.width.saturating_sub(total) / 2;
        for (idx, (control, chunk)) in self.controls.iter().zip(&chunks).enumerate() {
            let width = chunk.chars().count() as u16;
            if x + width > max_x {
                break;
            }
            let mut style = if focused == Some(&control.id) {
                base.bg(theme::bar_focused_bg()).add_modifier(Modifier::BOLD)
            } else if control.open {
                base
            } else {
                base.fg(theme::bar_minimized_fg())
            };
            if matches!(self.pressed, Some((Target::Button(i), _)) if i == idx) {
                style = style.bg(theme::accent());
            }
            safe_set_string(buffer, area, x, area.y, chunk, style);
            self.hits.push((idx, Rect::new(x, area.y, width, 1)));
            x += width;
        }
    }

    fn target_at(&self, column: u16, row: u16) -> Option<Target> {
        if !rect_contains(self.area, column, row) {
            return None;
        }
        Some(
            self.hits
                .iter()
                .find(|(_, rect)| rect_contains(*rect, column, row))
                .map(|(idx, _)| Target::Button(*idx))
                .unwrap_or(Target::Background),
        )
    }

    /// Buttons fire on release when the press started on them; leaving the
    /// button cancels the press.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> BarResponse {
        let target = self.target_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(button) => match target {
                Some(target) => {
                    self.pressed = Some((target, button));
                    BarResponse::Consumed
                }
                None => BarResponse::Ignored,
            },
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if let Some((pressed, _)) = self.pressed
                    && target != Some(pressed)
                {
                    self.pressed = None;
                }
                BarResponse::Ignored
            }
            MouseEventKind::Up(_) => {
                let Some((pressed, button)) = self.pressed.take() else {
                    return BarResponse::Ignored;
                };
                if target != Some(pressed) {
                    return BarResponse::Consumed;
                }
                let anchor = (mouse.column, self.area.y);
                match (pressed, button) {
                    (Target::Button(idx), MouseButton::Left) => match self.controls.get(idx) {
                        Some(control) => BarResponse::Command(BarCommand::ToggleWindow(control.id.clone())),
                        None => BarResponse::Consumed,
                    },
                    (Target::Button(idx), _) => match self.controls.get(idx) {
                        Some(control) => BarResponse::Menu(self.window_menu(&control.id, anchor)),
                        None => BarResponse::Consumed,
                    },
                    (Target::Background, _) => BarResponse::Menu(self.global_menu(anchor)),
                }
            }
            _ => BarResponse::Ignored,
        }
    }

    pub fn window_menu(&self, id: &WindowId, anchor: (u16, u16)) -> PopupMenu<BarCommand> {
        let window = self
            .registry
            .upgrade()
            .and_then(|registry| registry.get_window(id.as_str()));
        let snapped = window.as_ref().is_some_and(WindowRef::is_snapped);
        let permanent = window
            .as_ref()
            .is_some_and(|w| w.mode() == WindowMode::Permanent);
        let items = vec![
            (
                if snapped { "Unsnap" } else { "Snap" }.to_string(),
                BarCommand::ToggleSnap(id.clone()),
            ),
            (
                if permanent { "Minimize" } else { "Close" }.to_string(),
                BarCommand::CloseWindow(id.clone()),
            ),
            ("Reset".to_string(), BarCommand::ResetWindow(id.clone())),
        ];
        PopupMenu::new(anchor, self.dock.menu_direction(), items)
    }

    pub fn global_menu(&self, anchor: (u16, u16)) -> PopupMenu<BarCommand> {
        let items = vec![
            ("Open all".to_string(), BarCommand::OpenAll),
            ("Minimize all".to_string(), BarCommand::MinimizeAll),
            ("Close all".to_string(), BarCommand::CloseAll),
            ("Snap all".to_string(), BarCommand::SnapAll),
            ("Unsnap all".to_string(), BarCommand::UnsnapAll),
            ("Reset all".to_string(), BarCommand::ResetAll),
            ("Toggle dock".to_string(), BarCommand::ToggleDock),
        ];
        PopupMenu::new(anchor, self.dock.menu_direction(), items)
    }
}

impl BarAdapter for WindowBar {
    fn add_window_control(&mut self, window: &WindowRef) {
        let id = window.id();
        let control = BarControl {
            label: window.label(),
            open: window.is_open(),
            id,
        };
        match self.controls.iter_mut().find(|c| c.id == control.id) {
            Some(existing) => *existing = control,
            None => self.controls.push(control),
        }
    }

    fn remove_window_control(&mut self, id: &WindowId) {
        self.controls.retain(|c| &c.id != id);
        self.pressed = None;
    }

    fn update_window_control_state(&mut self, window: &WindowRef, open: bool) {
        let id = window.id();
        if let Some(control) = self.controls.iter_mut().find(|c| c.id == id) {
            control.open = open;
        }
    }
}
