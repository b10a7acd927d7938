use ratatui::style::Color;

// Centralized theme colors for the desktop, its bar and window chrome.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Bar
pub fn bar_bg() -> Color {
    Color::DarkGray
}
pub fn bar_fg() -> Color {
    Color::Black
}
pub fn bar_minimized_fg() -> Color {
    Color::Gray
}
pub fn bar_focused_bg() -> Color {
    Color::Gray
}

// Menu
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

// Decorator
pub fn decorator_header_bg() -> Color {
    Color::Blue
}
pub fn decorator_header_fg() -> Color {
    Color::White
}
pub fn decorator_inactive_header_bg() -> Color {
    Color::DarkGray
}
pub fn decorator_border() -> Color {
    Color::DarkGray
}
pub fn decorator_pressed_bg() -> Color {
    accent()
}

// Switcher
pub fn switcher_bg() -> Color {
    Color::Black
}
pub fn switcher_fg() -> Color {
    Color::White
}
pub fn switcher_selected_bg() -> Color {
    accent()
}
