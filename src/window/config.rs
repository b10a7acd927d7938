use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::{WindowId, WindowRef};
use crate::constants::{DEFAULT_ANIMATION_DURATION, DEFAULT_MIN_SIZE, DEFAULT_WINDOW_SIZE};
use crate::error::WmError;
use crate::layout::Size;
use crate::layout::floating::{Horizontal, Vertical, resolve_size};

/// Whether closing a window destroys it or only minimizes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WindowMode {
    Permanent,
    #[default]
    Temporary,
}

pub type MenuAction = Rc<dyn Fn(&WindowRef)>;

/// Entry in a window's hamburger menu.
#[derive(Clone)]
pub struct MenuOption {
    pub label: String,
    pub action: MenuAction,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, action: impl Fn(&WindowRef) + 'static) -> Self {
        Self {
            label: label.into(),
            action: Rc::new(action),
        }
    }
}

impl fmt::Debug for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuOption")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Everything a window can be configured with at construction time.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub id: String,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub mode: WindowMode,
    pub starting_horizontal: Horizontal,
    pub starting_vertical: Vertical,
    pub start_open: bool,
    pub start_snapped: bool,
    pub allow_resize: bool,
    pub allow_maximize: bool,
    pub animated: bool,
    pub animation_duration: Duration,
    pub show_title: bool,
    pub auto_focus: bool,
    pub auto_bring_forward: bool,
    pub size: Size,
    pub min_size: Size,
    pub max_size: Option<Size>,
    pub menu_options: Vec<MenuOption>,
}

impl WindowConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            icon: None,
            mode: WindowMode::Temporary,
            starting_horizontal: Horizontal::Center,
            starting_vertical: Vertical::Middle,
            start_open: false,
            start_snapped: true,
            allow_resize: true,
            allow_maximize: false,
            animated: true,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            show_title: true,
            auto_focus: true,
            auto_bring_forward: true,
            size: DEFAULT_WINDOW_SIZE,
            min_size: DEFAULT_MIN_SIZE,
            max_size: None,
            menu_options: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_placement(mut self, horizontal: Horizontal, vertical: Vertical) -> Self {
        self.starting_horizontal = horizontal;
        self.starting_vertical = vertical;
        self
    }

    pub fn with_start_open(mut self, open: bool) -> Self {
        self.start_open = open;
        self
    }

    pub fn with_start_snapped(mut self, snapped: bool) -> Self {
        self.start_snapped = snapped;
        self
    }

    pub fn with_allow_resize(mut self, allow: bool) -> Self {
        self.allow_resize = allow;
        self
    }

    pub fn with_allow_maximize(mut self, allow: bool) -> Self {
        self.allow_maximize = allow;
        self
    }

    pub fn with_animation(mut self, animated: bool, duration: Duration) -> Self {
        self.animated = animated;
        self.animation_duration = duration;
        self
    }

    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn with_show_title(mut self, show: bool) -> Self {
        self.show_title = show;
        self
    }

    pub fn with_auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    pub fn with_auto_bring_forward(mut self, auto: bool) -> Self {
        self.auto_bring_forward = auto;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_min_size(mut self, min: Size) -> Self {
        self.min_size = min;
        self
    }

    pub fn with_max_size(mut self, max: Size) -> Self {
        self.max_size = Some(max);
        self
    }

    pub fn with_menu_option(
        mut self,
        label: impl Into<String>,
        action: impl Fn(&WindowRef) + 'static,
    ) -> Self {
        self.menu_options.push(MenuOption::new(label, action));
        self
    }

    /// Check the configuration and produce the window's identity.
    pub(crate) fn validate(&self) -> Result<WindowId, WmError> {
        let id = WindowId::new(self.id.clone())?;
        if self.min_size.is_empty() {
            return Err(WmError::InvalidMinSize {
                id: self.id.clone(),
                min: self.min_size,
            });
        }
        if let Some(max) = self.max_size
            && !max.covers(self.min_size)
        {
            return Err(WmError::InvalidMaxSize {
                id: self.id.clone(),
                min: self.min_size,
                max,
            });
        }
        Ok(id)
    }

    /// Name shown in the title bar, the bar and the switcher.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| humanize_id(&self.id))
    }

    /// Resolve `(size, min, max)` against the current parent size.
    pub(crate) fn resolve_sizes(&self, parent: Size) -> (Size, Size, Size) {
        let max = self.max_size.unwrap_or(parent);
        let size = resolve_size(self.size, self.min_size, max);
        (size, self.min_size, max)
    }
}

// "system_log" -> "System log"
fn humanize_id(id: &str) -> String {
    let spaced = id.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
