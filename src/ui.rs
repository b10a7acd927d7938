//! Small clipping helpers shared by everything that paints straight into a
//! ratatui `Buffer` (bar, menus, switcher).

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    let bounds = bounds.intersection(buffer.area);
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let text = truncate_to_width(text, max_x.saturating_sub(x) as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

/// Paint every cell of `rect` (clipped to the buffer) blank with `style`.
pub(crate) fn fill(buffer: &mut Buffer, rect: Rect, style: Style) {
    let rect = rect.intersection(buffer.area);
    for y in rect.y..rect.y.saturating_add(rect.height) {
        for x in rect.x..rect.x.saturating_add(rect.width) {
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.reset();
                cell.set_symbol(" ");
                cell.set_style(style);
            }
        }
    }
}

/// Rectangle of `width` x `height` centered in `area`, shrunk to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_to_width_short_and_long() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
    }

    #[test]
    fn safe_set_string_clips_to_bounds() {
        let bounds = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 2));
        safe_set_string(&mut buf, bounds, 1, 0, "hello", Style::default());
        assert_eq!(buf[(1, 0)].symbol(), "h");
        assert_eq!(buf[(3, 0)].symbol(), "l");
        assert_eq!(buf[(4, 0)].symbol(), " ");
        // outside bounds is ignored
        safe_set_string(&mut buf, bounds, 100, 0, "x", Style::default());
    }

    #[test]
    fn centered_shrinks_to_area() {
        let area = Rect::new(2, 1, 20, 6);
        assert_eq!(centered(area, 10, 4), Rect::new(7, 2, 10, 4));
        assert_eq!(centered(area, 40, 40), area);
    }
}
