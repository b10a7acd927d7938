//! Title bar and bottom bar controls of a window.
//!
//! Every control shares the same press contract: a mouse-down arms it, a
//! mouse-up fires it only if the press started on it, and leaving it disarms
//! it. The title and the resize grip capture the pointer instead, so they
//! ignore `leave` and always receive the matching mouse-up.

use crossterm::event::MouseButton;

use crate::constants::{
    CHROME_BUTTON_WIDTH, SYMBOL_CLOSE, SYMBOL_HAMBURGER, SYMBOL_MAXIMIZE, SYMBOL_MINIMIZE,
    SYMBOL_RESIZER, SYMBOL_RESTORE,
};
use crate::layout::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Title,
    Hamburger,
    Minimize,
    Maximize,
    Close,
    Resize,
}

impl ControlKind {
    fn captures_pointer(self) -> bool {
        matches!(self, ControlKind::Title | ControlKind::Resize)
    }
}

/// What the window should do in response to a control interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeCommand {
    BeginMove,
    EndMove,
    BeginResize,
    EndResize,
    Minimize,
    ToggleMaximize,
    Close,
    ShowMenu,
}

pub trait PressableControl {
    fn mouse_down(&mut self, button: MouseButton) -> Option<ChromeCommand>;
    fn mouse_up(&mut self) -> Option<ChromeCommand>;
    fn leave(&mut self);
    fn is_pressed(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PressState {
    pressed: bool,
    click_started_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeControl {
    kind: ControlKind,
    press: PressState,
}

impl ChromeControl {
    fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            press: PressState::default(),
        }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }
}

impl PressableControl for ChromeControl {
    fn mouse_down(&mut self, button: MouseButton) -> Option<ChromeCommand> {
        if button != MouseButton::Left {
            return None;
        }
        self.press = PressState {
            pressed: true,
            click_started_on: true,
        };
        match self.kind {
            ControlKind::Title => Some(ChromeCommand::BeginMove),
            ControlKind::Resize => Some(ChromeCommand::BeginResize),
            _ => None,
        }
    }

    fn mouse_up(&mut self) -> Option<ChromeCommand> {
        let fired = self.press.click_started_on;
        self.press = PressState::default();
        if !fired {
            return None;
        }
        Some(match self.kind {
            ControlKind::Title => ChromeCommand::EndMove,
            ControlKind::Resize => ChromeCommand::EndResize,
            ControlKind::Hamburger => ChromeCommand::ShowMenu,
            ControlKind::Minimize => ChromeCommand::Minimize,
            ControlKind::Maximize => ChromeCommand::ToggleMaximize,
            ControlKind::Close => ChromeCommand::Close,
        })
    }

    fn leave(&mut self) {
        if !self.kind.captures_pointer() {
            self.press = PressState::default();
        }
    }

    fn is_pressed(&self) -> bool {
        self.press.pressed
    }
}

#[derive(Debug, Clone)]
pub struct Chrome {
    controls: Vec<ChromeControl>,
    maximized: bool,
    hovered: Option<ControlKind>,
}

impl Chrome {
    pub fn new(has_menu: bool, allow_maximize: bool, closable: bool, allow_resize: bool) -> Self {
        let mut controls = vec![ChromeControl::new(ControlKind::Title)];
        if has_menu {
            controls.push(ChromeControl::new(ControlKind::Hamburger));
        }
        controls.push(ChromeControl::new(ControlKind::Minimize));
        if allow_maximize {
            controls.push(ChromeControl::new(ControlKind::Maximize));
        }
        if closable {
            controls.push(ChromeControl::new(ControlKind::Close));
        }
        if allow_resize {
            controls.push(ChromeControl::new(ControlKind::Resize));
        }
        Self {
            controls,
            maximized: false,
            hovered: None,
        }
    }

    pub fn has(&self, kind: ControlKind) -> bool {
        self.controls.iter().any(|c| c.kind == kind)
    }

    pub fn controls(&self) -> &[ChromeControl] {
        &self.controls
    }

    pub fn is_pressed(&self, kind: ControlKind) -> bool {
        self.controls
            .iter()
            .any(|c| c.kind == kind && c.is_pressed())
    }

    pub fn hovered(&self) -> Option<ControlKind> {
        self.hovered
    }

    pub fn maximized(&self) -> bool {
        self.maximized
    }

    /// Swap the maximize button between its maximize and restore icons.
    pub fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
    }

    pub fn glyph(&self, kind: ControlKind) -> &'static str {
        match kind {
            ControlKind::Title => "",
            ControlKind::Hamburger => SYMBOL_HAMBURGER,
            ControlKind::Minimize => SYMBOL_MINIMIZE,
            ControlKind::Maximize if self.maximized => SYMBOL_RESTORE,
            ControlKind::Maximize => SYMBOL_MAXIMIZE,
            ControlKind::Close => SYMBOL_CLOSE,
            ControlKind::Resize => SYMBOL_RESIZER,
        }
    }

    pub fn tooltip(&self, kind: ControlKind) -> Option<&'static str> {
        match kind {
            ControlKind::Maximize if self.maximized => Some("Restore"),
            ControlKind::Maximize => Some("Maximize"),
            ControlKind::Minimize => Some("Minimize"),
            _ => None,
        }
    }

    /// Screen rectangles of every control for a window drawn at `rect`.
    pub fn layout(&self, rect: FloatRect) -> Vec<(ControlKind, FloatRect)> {
        let mut out = Vec::with_capacity(self.controls.len());
        if rect.width == 0 || rect.height == 0 {
            return out;
        }
        let buttons: Vec<ControlKind> = self
            .controls
            .iter()
            .map(|c| c.kind)
            .filter(|k| !matches!(k, ControlKind::Title | ControlKind::Resize))
            .collect();
        let buttons_width = (buttons.len() as u16)
            .saturating_mul(CHROME_BUTTON_WIDTH)
            .min(rect.width);
        let title_width = rect.width - buttons_width;
        out.push((
            ControlKind::Title,
            FloatRect {
                x: rect.x,
                y: rect.y,
                width: title_width,
                height: 1,
            },
        ));
        let mut x = rect.x.saturating_add(title_width as i32);
        for kind in buttons {
            if x.saturating_add(CHROME_BUTTON_WIDTH as i32) > rect.right() {
                break;
            }
            out.push((
                kind,
                FloatRect {
                    x,
                    y: rect.y,
                    width: CHROME_BUTTON_WIDTH,
                    height: 1,
                },
            ));
            x += CHROME_BUTTON_WIDTH as i32;
        }
        if self.has(ControlKind::Resize) && rect.height >= 2 {
            out.push((
                ControlKind::Resize,
                FloatRect {
                    x: rect.right() - 1,
                    y: rect.bottom() - 1,
                    width: 1,
                    height: 1,
                },
            ));
        }
        out
    }

    /// Area left for window content: everything between the title bar and
    /// the bottom bar.
    pub fn content_rect(rect: FloatRect) -> FloatRect {
        FloatRect {
            x: rect.x,
            y: rect.y.saturating_add(1),
            width: rect.width,
            height: rect.height.saturating_sub(2),
        }
    }

    pub fn hit_test(&self, rect: FloatRect, column: u16, row: u16) -> Option<ControlKind> {
        self.layout(rect)
            .into_iter()
            .find(|(_, r)| r.contains(column, row))
            .map(|(kind, _)| kind)
    }

    fn control_mut(&mut self, kind: ControlKind) -> Option<&mut ChromeControl> {
        self.controls.iter_mut().find(|c| c.kind == kind)
    }

    fn captured(&self) -> Option<ControlKind> {
        self.controls
            .iter()
            .find(|c| c.kind.captures_pointer() && c.is_pressed())
            .map(|c| c.kind)
    }

    /// Track which control is under the pointer, disarming the one it left.
    pub fn pointer_over(&mut self, kind: Option<ControlKind>) {
        if self.hovered == kind {
            return;
        }
        if let Some(previous) = self.hovered
            && let Some(control) = self.control_mut(previous)
        {
            control.leave();
        }
        self.hovered = kind;
    }

    pub fn mouse_down(&mut self, kind: ControlKind, button: MouseButton) -> Option<ChromeCommand> {
        self.hovered = Some(kind);
        if kind == ControlKind::Resize && self.maximized {
            return None;
        }
        self.control_mut(kind)?.mouse_down(button)
    }

    /// Deliver a mouse-up to the capturing control if there is one, otherwise
    /// to the control under the pointer.
    pub fn mouse_up(&mut self, under_pointer: Option<ControlKind>) -> Option<ChromeCommand> {
        let target = self.captured().or(under_pointer)?;
        self.control_mut(target)?.mouse_up()
    }

    pub fn is_capturing(&self) -> bool {
        self.captured().is_some()
    }

    pub fn release_all(&mut self) {
        for control in &mut self.controls {
            control.press = PressState::default();
        }
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> FloatRect {
        FloatRect {
            x: 10,
            y: 5,
            width: 20,
            height: 8,
        }
    }

    #[test]
    fn controls_follow_configuration() {
        let chrome = Chrome::new(false, false, false, false);
        assert!(chrome.has(ControlKind::Minimize));
        assert!(!chrome.has(ControlKind::Close));
        assert!(!chrome.has(ControlKind::Resize));

        let full = Chrome::new(true, true, true, true);
        let kinds: Vec<ControlKind> = full.layout(rect()).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                ControlKind::Title,
                ControlKind::Hamburger,
                ControlKind::Minimize,
                ControlKind::Maximize,
                ControlKind::Close,
                ControlKind::Resize,
            ]
        );
    }

    #[test]
    fn buttons_are_right_aligned_on_top_row() {
        let chrome = Chrome::new(false, true, true, true);
        // 3 buttons * 3 columns = 9, window spans 10..30
        assert_eq!(chrome.hit_test(rect(), 21, 5), Some(ControlKind::Minimize));
        assert_eq!(chrome.hit_test(rect(), 24, 5), Some(ControlKind::Maximize));
        assert_eq!(chrome.hit_test(rect(), 29, 5), Some(ControlKind::Close));
        assert_eq!(chrome.hit_test(rect(), 12, 5), Some(ControlKind::Title));
        assert_eq!(chrome.hit_test(rect(), 29, 12), Some(ControlKind::Resize));
        assert_eq!(chrome.hit_test(rect(), 15, 8), None);
    }

    #[test]
    fn click_fires_only_when_started_on_control() {
        let mut chrome = Chrome::new(false, true, true, true);
        assert_eq!(chrome.mouse_down(ControlKind::Close, MouseButton::Left), None);
        assert_eq!(
            chrome.mouse_up(Some(ControlKind::Close)),
            Some(ChromeCommand::Close)
        );

        // press then leave cancels
        chrome.mouse_down(ControlKind::Close, MouseButton::Left);
        chrome.pointer_over(Some(ControlKind::Title));
        assert_eq!(chrome.mouse_up(Some(ControlKind::Close)), None);

        // right button never arms
        chrome.mouse_down(ControlKind::Minimize, MouseButton::Right);
        assert_eq!(chrome.mouse_up(Some(ControlKind::Minimize)), None);
    }

    #[test]
    fn drags_capture_the_pointer() {
        let mut chrome = Chrome::new(false, false, true, true);
        assert_eq!(
            chrome.mouse_down(ControlKind::Resize, MouseButton::Left),
            Some(ChromeCommand::BeginResize)
        );
        chrome.pointer_over(None);
        assert!(chrome.is_capturing());
        assert_eq!(chrome.mouse_up(None), Some(ChromeCommand::EndResize));
        assert!(!chrome.is_capturing());
    }

    #[test]
    fn resize_grip_is_inert_while_maximized() {
        let mut chrome = Chrome::new(false, true, true, true);
        chrome.set_maximized(true);
        assert_eq!(chrome.glyph(ControlKind::Maximize), SYMBOL_RESTORE);
        assert_eq!(chrome.mouse_down(ControlKind::Resize, MouseButton::Left), None);
        assert!(!chrome.is_capturing());
        chrome.set_maximized(false);
        assert_eq!(chrome.glyph(ControlKind::Maximize), SYMBOL_MAXIMIZE);
    }
}
