//! Placement and drag arithmetic for floating windows.
//!
//! Everything here is a pure function of its inputs so it can be exercised
//! without a registry, a terminal, or a window.

use std::str::FromStr;

use super::{Offset, Size};
use crate::error::WmError;

/// Horizontal anchor used to compute a window's starting column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Horizontal {
    Left,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    Right,
}

/// Vertical anchor used to compute a window's starting row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Vertical {
    Top,
    UpperMiddle,
    #[default]
    Middle,
    LowerMiddle,
    Bottom,
}

impl Horizontal {
    pub const ALL: [Horizontal; 5] = [
        Horizontal::Left,
        Horizontal::CenterLeft,
        Horizontal::Center,
        Horizontal::CenterRight,
        Horizontal::Right,
    ];

    fn place(self, free: i32) -> i32 {
        split_free_space(free, self as usize)
    }
}

impl Vertical {
    pub const ALL: [Vertical; 5] = [
        Vertical::Top,
        Vertical::UpperMiddle,
        Vertical::Middle,
        Vertical::LowerMiddle,
        Vertical::Bottom,
    ];

    fn place(self, free: i32) -> i32 {
        split_free_space(free, self as usize)
    }
}

// Five-point split of the free space: 0, 1/4, 1/2, 1 - 1/4, 1 (floor division).
fn split_free_space(free: i32, step: usize) -> i32 {
    match step {
        0 => 0,
        1 => free.div_euclid(4),
        2 => free.div_euclid(2),
        3 => free - free.div_euclid(4),
        _ => free,
    }
}

impl FromStr for Horizontal {
    type Err = WmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Horizontal::Left),
            "centerleft" => Ok(Horizontal::CenterLeft),
            "center" => Ok(Horizontal::Center),
            "centerright" => Ok(Horizontal::CenterRight),
            "right" => Ok(Horizontal::Right),
            _ => Err(WmError::InvalidPlacement(s.to_string())),
        }
    }
}

impl FromStr for Vertical {
    type Err = WmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Vertical::Top),
            "uppermiddle" => Ok(Vertical::UpperMiddle),
            "middle" => Ok(Vertical::Middle),
            "lowermiddle" => Ok(Vertical::LowerMiddle),
            "bottom" => Ok(Vertical::Bottom),
            _ => Err(WmError::InvalidPlacement(s.to_string())),
        }
    }
}

/// Starting offset of a window inside its parent.
///
/// The free space may be negative when the window is larger than the parent;
/// the result is then negative too and callers clamp it when snapping.
pub fn starting_offset(parent: Size, window: Size, h: Horizontal, v: Vertical) -> Offset {
    let free_x = parent.width as i32 - window.width as i32;
    let free_y = parent.height as i32 - window.height as i32;
    Offset::new(h.place(free_x), v.place(free_y))
}

/// Clamp a dimension into `[min, max]`. When the range is inverted the
/// minimum wins.
pub fn clamp_cells(value: i32, min: u16, max: u16) -> u16 {
    let clamped = value.min(max as i32).max(min as i32);
    clamped.clamp(0, u16::MAX as i32) as u16
}

pub fn resolve_size(requested: Size, min: Size, max: Size) -> Size {
    Size::new(
        clamp_cells(requested.width as i32, min.width, max.width),
        clamp_cells(requested.height as i32, min.height, max.height),
    )
}

/// Pull an offset back so the window lies inside the parent. A window larger
/// than its parent is pinned to the top-left corner.
pub fn clamp_into_parent(offset: Offset, window: Size, parent: Size) -> Offset {
    let max_x = parent.width as i32 - window.width as i32;
    let max_y = parent.height as i32 - window.height as i32;
    Offset::new(offset.x.min(max_x).max(0), offset.y.min(max_y).max(0))
}

/// New size for a resize drag, measured from the size at mouse-down plus the
/// cumulative pointer delta since mouse-down.
pub fn drag_delta(total_delta: Offset, size_on_down: Size, min: Size, max: Size) -> Size {
    Size::new(
        clamp_cells(size_on_down.width as i32 + total_delta.x, min.width, max.width),
        clamp_cells(size_on_down.height as i32 + total_delta.y, min.height, max.height),
    )
}

/// Captured state of a resize-grip drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDrag {
    pub position_on_down: (u16, u16),
    pub size_on_down: Size,
}

impl ResizeDrag {
    pub fn new(column: u16, row: u16, size_on_down: Size) -> Self {
        Self {
            position_on_down: (column, row),
            size_on_down,
        }
    }

    pub fn apply(&self, column: u16, row: u16, min: Size, max: Size) -> Size {
        let delta = pointer_delta(self.position_on_down, (column, row));
        drag_delta(delta, self.size_on_down, min, max)
    }
}

/// Captured state of a title-bar drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderDrag {
    pub position_on_down: (u16, u16),
    pub offset_on_down: Offset,
}

impl HeaderDrag {
    pub fn new(column: u16, row: u16, offset_on_down: Offset) -> Self {
        Self {
            position_on_down: (column, row),
            offset_on_down,
        }
    }

    pub fn apply(&self, column: u16, row: u16) -> Offset {
        self.offset_on_down + pointer_delta(self.position_on_down, (column, row))
    }
}

fn pointer_delta(from: (u16, u16), to: (u16, u16)) -> Offset {
    Offset::new(to.0 as i32 - from.0 as i32, to.1 as i32 - from.1 as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_window_in_standard_terminal() {
        let offset = starting_offset(
            Size::new(80, 24),
            Size::new(20, 10),
            Horizontal::Center,
            Vertical::Middle,
        );
        assert_eq!(offset, Offset::new(30, 7));
    }

    #[test]
    fn five_point_split_uses_floor_division() {
        let parent = Size::new(30, 30);
        let window = Size::new(10, 9);
        let xs: Vec<i32> = Horizontal::ALL
            .iter()
            .map(|h| starting_offset(parent, window, *h, Vertical::Top).x)
            .collect();
        assert_eq!(xs, vec![0, 5, 10, 15, 20]);
        let ys: Vec<i32> = Vertical::ALL
            .iter()
            .map(|v| starting_offset(parent, window, Horizontal::Left, *v).y)
            .collect();
        // free_y = 21
        assert_eq!(ys, vec![0, 5, 10, 16, 21]);
    }

    #[test]
    fn every_anchor_fits_when_window_fits() {
        for (pw, ph, ww, wh) in [(80, 24, 20, 10), (13, 7, 12, 6), (100, 40, 99, 1)] {
            let parent = Size::new(pw, ph);
            let window = Size::new(ww, wh);
            for h in Horizontal::ALL {
                for v in Vertical::ALL {
                    let o = starting_offset(parent, window, h, v);
                    assert!(o.x >= 0 && o.x <= (pw - ww) as i32, "{h:?} {v:?}");
                    assert!(o.y >= 0 && o.y <= (ph - wh) as i32, "{h:?} {v:?}");
                    assert_eq!(o, starting_offset(parent, window, h, v));
                }
            }
        }
    }

    #[test]
    fn oversized_window_gets_negative_offset() {
        let o = starting_offset(
            Size::new(10, 5),
            Size::new(15, 8),
            Horizontal::Right,
            Vertical::Middle,
        );
        // free_y = -3, floored half is -2
        assert_eq!(o, Offset::new(-5, -2));
    }

    #[test]
    fn resolve_size_clamps_each_axis() {
        let min = Size::new(12, 6);
        let max = Size::new(80, 24);
        assert_eq!(resolve_size(Size::new(20, 10), min, max), Size::new(20, 10));
        assert_eq!(resolve_size(Size::new(2, 100), min, max), Size::new(12, 24));
    }

    #[test]
    fn inverted_range_prefers_minimum() {
        assert_eq!(clamp_cells(5, 12, 10), 12);
        assert_eq!(clamp_cells(-4, 0, 10), 0);
    }

    #[test]
    fn clamp_into_parent_pins_edges() {
        let parent = Size::new(80, 24);
        let window = Size::new(20, 10);
        assert_eq!(
            clamp_into_parent(Offset::new(-3, 50), window, parent),
            Offset::new(0, 14)
        );
        assert_eq!(
            clamp_into_parent(Offset::new(70, 2), window, parent),
            Offset::new(60, 2)
        );
        // larger than the parent: top-left stays visible
        assert_eq!(
            clamp_into_parent(Offset::new(4, 4), Size::new(90, 30), parent),
            Offset::ZERO
        );
    }

    #[test]
    fn resize_drag_is_cumulative_from_mouse_down() {
        let min = Size::new(12, 6);
        let max = Size::new(40, 20);
        let drag = ResizeDrag::new(50, 20, Size::new(20, 10));
        // intermediate moves do not compound
        assert_eq!(drag.apply(52, 21, min, max), Size::new(22, 11));
        assert_eq!(drag.apply(55, 25, min, max), Size::new(25, 15));

        let second = ResizeDrag::new(55, 25, Size::new(25, 15));
        let size = drag_delta(Offset::new(-100, -100), second.size_on_down, min, max);
        assert_eq!(size, Size::new(12, 6));
    }

    #[test]
    fn header_drag_moves_from_origin() {
        let drag = HeaderDrag::new(10, 3, Offset::new(4, 2));
        assert_eq!(drag.apply(15, 1), Offset::new(9, 0));
        assert_eq!(drag.apply(0, 3), Offset::new(-6, 2));
    }

    #[test]
    fn placement_names_parse() {
        assert_eq!("centerRight".parse::<Horizontal>(), Ok(Horizontal::CenterRight));
        assert_eq!("lowermiddle".parse::<Vertical>(), Ok(Vertical::LowerMiddle));
        assert!(matches!(
            "middle-ish".parse::<Vertical>(),
            Err(WmError::InvalidPlacement(_))
        ));
    }
}
