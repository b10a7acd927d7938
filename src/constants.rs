//! Shared crate-wide constants.

use std::time::Duration;

use crate::layout::Size;

/// Size a window asks for when its configuration does not name one.
pub const DEFAULT_WINDOW_SIZE: Size = Size::new(25, 12);

/// Smallest size a window may be resized down to unless configured otherwise.
pub const DEFAULT_MIN_SIZE: Size = Size::new(12, 6);

/// Duration of the fade played when a window opens, minimizes or closes.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Width in columns of each title-bar button.
pub const CHROME_BUTTON_WIDTH: u16 = 3;

pub const SYMBOL_CLOSE: &str = "X";
pub const SYMBOL_MAXIMIZE: &str = "☐";
pub const SYMBOL_RESTORE: &str = "❐";
pub const SYMBOL_MINIMIZE: &str = "—";
pub const SYMBOL_HAMBURGER: &str = "☰";
pub const SYMBOL_RESIZER: &str = "◢";

/// Prefix shown on a bar button while its window is not open.
pub const MINIMIZED_MARKER: &str = "•";

/// Width of popup menus opened from the bar and from window chrome.
pub const MENU_WIDTH: u16 = 14;
