pub mod floating;

pub use floating::{Horizontal, Vertical};

use std::fmt;
use std::ops::{Add, Sub};

use ratatui::prelude::Rect;

/// Signed position of a window relative to its parent viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

/// Size in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when both dimensions are at least as large as `other`'s.
    pub fn covers(self, other: Size) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<Rect> for Size {
    fn from(rect: Rect) -> Self {
        Size::new(rect.width, rect.height)
    }
}

/// Signed floating rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn new(offset: Offset, size: Size) -> Self {
        Self {
            x: offset.x,
            y: offset.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Place a parent-relative rect onto the screen, given the parent origin.
    pub fn on_screen(offset: Offset, size: Size, parent: Rect) -> Self {
        Self::new(
            Offset::new(
                (parent.x as i32).saturating_add(offset.x),
                (parent.y as i32).saturating_add(offset.y),
            ),
            size,
        )
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        let (column, row) = (column as i32, row as i32);
        column >= self.x && column < self.right() && row >= self.y && row < self.bottom()
    }

    /// Portion of the rect that is visible inside `bounds`; empty when the
    /// rect lies entirely outside.
    pub fn visible(&self, bounds: Rect) -> Rect {
        let left = self.x.max(bounds.x as i32);
        let top = self.y.max(bounds.y as i32);
        let right = self.right().min(bounds.x as i32 + bounds.width as i32);
        let bottom = self.bottom().min(bounds.y as i32 + bounds.height as i32);
        if right <= left || bottom <= top {
            return Rect::default();
        }
        Rect {
            x: left as u16,
            y: top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        }
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_rect_visible_clips_negative_offsets() {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: 80,
            height: 24,
        };
        let rect = FloatRect {
            x: -5,
            y: 3,
            width: 20,
            height: 6,
        };
        let visible = rect.visible(bounds);
        assert_eq!(visible.x, 0);
        assert_eq!(visible.y, 3);
        assert_eq!(visible.width, 15);
        assert_eq!(visible.height, 6);
    }

    #[test]
    fn float_rect_fully_outside_is_empty() {
        let bounds = Rect::new(0, 0, 10, 10);
        let rect = FloatRect {
            x: 12,
            y: 0,
            width: 4,
            height: 4,
        };
        assert_eq!(rect.visible(bounds), Rect::default());
        assert!(!rect.contains(5, 1));
    }

    #[test]
    fn on_screen_shifts_by_parent_origin() {
        let parent = Rect::new(0, 1, 80, 23);
        let rect = FloatRect::on_screen(Offset::new(3, 2), Size::new(10, 5), parent);
        assert_eq!((rect.x, rect.y), (3, 3));
        assert!(rect.contains(12, 7));
        assert!(!rect.contains(13, 7));
    }

    #[test]
    fn far_offsets_saturate_instead_of_overflowing() {
        let parent = Rect::new(0, 1, 80, 23);
        let rect = FloatRect::on_screen(Offset::new(i32::MAX, i32::MAX), Size::new(10, 5), parent);
        assert_eq!((rect.x, rect.y), (i32::MAX, i32::MAX));
        assert_eq!(rect.right(), i32::MAX);
        assert_eq!(rect.visible(parent), Rect::default());
        assert!(!rect.contains(79, 23));
    }

    #[test]
    fn offset_arithmetic_saturates() {
        let a = Offset::new(i32::MAX, 0);
        assert_eq!((a + Offset::new(1, 1)).x, i32::MAX);
        assert_eq!(Offset::new(5, 5) - Offset::new(2, 7), Offset::new(3, -2));
    }
}
