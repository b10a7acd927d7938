use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Modifier, Style};

use super::chrome::{Chrome, ControlKind};
use crate::layout::FloatRect;
use crate::theme;

/// Draws window chrome (title bar, buttons, bottom bar) into a buffer.
pub trait WindowDecorator: std::fmt::Debug {
    fn render_window(
        &self,
        buffer: &mut Buffer,
        rect: FloatRect,
        bounds: Rect,
        title: &str,
        chrome: &Chrome,
        focused: bool,
        faded: bool,
    );
}

#[derive(Debug, Default)]
pub struct FlatDecorator;

fn put(buffer: &mut Buffer, bounds: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    if x < bounds.x as i32
        || y < bounds.y as i32
        || x >= bounds.x as i32 + bounds.width as i32
        || y >= bounds.y as i32 + bounds.height as i32
    {
        return;
    }
    if let Some(cell) = buffer.cell_mut((x as u16, y as u16)) {
        cell.set_symbol(symbol);
        cell.set_style(style);
    }
}

impl WindowDecorator for FlatDecorator {
    fn render_window(
        &self,
        buffer: &mut Buffer,
        rect: FloatRect,
        bounds: Rect,
        title: &str,
        chrome: &Chrome,
        focused: bool,
        faded: bool,
    ) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let mut header_style = if focused {
            Style::default()
                .bg(theme::decorator_header_bg())
                .fg(theme::decorator_header_fg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .bg(theme::decorator_inactive_header_bg())
                .fg(theme::decorator_header_fg())
        };
        let mut border_style = Style::default().fg(theme::decorator_border());
        if faded {
            header_style = header_style.add_modifier(Modifier::DIM);
            border_style = border_style.add_modifier(Modifier::DIM);
        }

        // Clear the body so windows below do not show through.
        for y in rect.y.saturating_add(1)..rect.bottom() {
            for x in rect.x..rect.right() {
                put(buffer, bounds, x, y, " ", Style::default());
            }
        }

        let layout = chrome.layout(rect);
        for (kind, area) in &layout {
            match kind {
                ControlKind::Title => {
                    for x in area.x..area.right() {
                        put(buffer, bounds, x, area.y, " ", header_style);
                    }
                    for (idx, ch) in title.chars().take(area.width.saturating_sub(1) as usize).enumerate() {
                        let mut buf = [0u8; 4];
                        put(
                            buffer,
                            bounds,
                            area.x + 1 + idx as i32,
                            area.y,
                            ch.encode_utf8(&mut buf),
                            header_style,
                        );
                    }
                }
                ControlKind::Resize => {}
                _ => {
                    let style = if chrome.is_pressed(*kind) {
                        header_style.bg(theme::decorator_pressed_bg())
                    } else {
                        header_style
                    };
                    put(buffer, bounds, area.x, area.y, " ", style);
                    put(buffer, bounds, area.x + 1, area.y, chrome.glyph(*kind), style);
                    put(buffer, bounds, area.x + 2, area.y, " ", style);
                }
            }
        }

        // Bottom bar
        if rect.height >= 2 {
            let y = rect.bottom() - 1;
            for x in rect.x..rect.right() {
                put(buffer, bounds, x, y, "─", border_style);
            }
            if let Some((_, grip)) = layout.iter().find(|(k, _)| *k == ControlKind::Resize) {
                let style = if chrome.maximized() {
                    border_style.add_modifier(Modifier::DIM)
                } else {
                    border_style
                };
                put(buffer, bounds, grip.x, grip.y, chrome.glyph(ControlKind::Resize), style);
            }
        }
    }
}
