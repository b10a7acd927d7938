use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::bar::{BarCommand, BarResponse, Dock, WindowBar};
use crate::drivers::InputDriver;
use crate::error::WmError;
use crate::event_loop::{ControlFlow, EventLoop};
use crate::keybindings::{Action, KeyBindings};
use crate::menu::{MenuDirection, MenuOutcome, PopupMenu};
use crate::switcher::WindowSwitcher;
use crate::window::decorator::{FlatDecorator, WindowDecorator};
use crate::window::{MouseResponse, RegistryHandle, WindowRef, WindowSignal};

/// Content side of a desktop: what goes inside each window.
pub trait DesktopApp {
    fn render_content(&mut self, buffer: &mut Buffer, window: &WindowRef, area: Rect, focused: bool);

    /// Keys the desktop did not use, offered with the focused window.
    fn handle_key(&mut self, _window: Option<&WindowRef>, _key: &KeyEvent) -> bool {
        false
    }

    /// Mouse events over a window's content area, or over empty desktop when
    /// `window` is `None`.
    fn handle_mouse(&mut self, _window: Option<&WindowRef>, _mouse: &MouseEvent) -> bool {
        false
    }

    fn on_signal(&mut self, _signal: &WindowSignal) {}
}

/// Owns everything drawn around the windows and routes input between them.
pub struct Desktop {
    registry: RegistryHandle,
    bar: Option<Rc<RefCell<WindowBar>>>,
    decorator: Box<dyn WindowDecorator>,
    popup: Option<PopupMenu<BarCommand>>,
    switcher: WindowSwitcher,
    bindings: KeyBindings,
    mouse_owner: Option<WindowRef>,
    viewport: Rect,
}

impl Desktop {
    pub fn new(registry: RegistryHandle, bindings: KeyBindings) -> Self {
        let cycle_key = bindings
            .first_combo(Action::OpenSwitcher)
            .map(|combo| combo.code)
            .unwrap_or(KeyCode::F(1));
        Self {
            registry,
            bar: None,
            decorator: Box::new(FlatDecorator),
            popup: None,
            switcher: WindowSwitcher::new(cycle_key),
            bindings,
            mouse_owner: None,
            viewport: Rect::default(),
        }
    }

    /// Create and bind a window bar docked at `dock`.
    pub fn with_bar(mut self, dock: Dock) -> Result<Self, WmError> {
        self.bar = Some(WindowBar::bind(&self.registry, dock)?);
        Ok(self)
    }

    pub fn with_decorator(mut self, decorator: Box<dyn WindowDecorator>) -> Self {
        self.decorator = decorator;
        self
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn bar(&self) -> Option<&Rc<RefCell<WindowBar>>> {
        self.bar.as_ref()
    }

    pub fn popup(&self) -> Option<&PopupMenu<BarCommand>> {
        self.popup.as_ref()
    }

    pub fn switcher(&self) -> &WindowSwitcher {
        &self.switcher
    }

    /// Area windows were last laid out in.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn apply_command(&mut self, command: &BarCommand) {
        tracing::debug!(?command, "bar command");
        match command {
            BarCommand::ToggleDock => {
                if let Some(bar) = &self.bar {
                    bar.borrow_mut().toggle_dock();
                }
            }
            other => other.apply(&self.registry),
        }
    }

    fn focused_window(&self) -> Option<WindowRef> {
        self.registry.focused()
    }

    fn window_menu(&self, window: &WindowRef, column: u16, row: u16) -> Option<PopupMenu<BarCommand>> {
        let labels = window.menu_labels();
        if labels.is_empty() {
            return None;
        }
        let id = window.id();
        let items = labels
            .into_iter()
            .enumerate()
            .map(|(idx, label)| (label, BarCommand::WindowMenuOption(id.clone(), idx)))
            .collect();
        Some(PopupMenu::new((column, row), MenuDirection::Down, items))
    }

    /// Route one input event. Returns `Quit` when the quit binding fires.
    pub fn handle_event<A: DesktopApp>(&mut self, event: &Event, app: &mut A) -> ControlFlow {
        let flow = match event {
            Event::Key(key) => self.handle_key(key, app),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, app);
                ControlFlow::Continue
            }
            _ => ControlFlow::Continue,
        };
        self.flush_signals(app);
        flow
    }

    fn handle_key<A: DesktopApp>(&mut self, key: &KeyEvent, app: &mut A) -> ControlFlow {
        if let Some(popup) = self.popup.as_mut() {
            match popup.handle_key(key) {
                MenuOutcome::Pending => {}
                MenuOutcome::Dismissed => self.popup = None,
                MenuOutcome::Chosen(command) => {
                    self.popup = None;
                    self.apply_command(&command);
                }
            }
            return ControlFlow::Continue;
        }
        if self.switcher.handle_key(key, &self.registry) {
            return ControlFlow::Continue;
        }
        match self.bindings.action_for_key(key) {
            Some(Action::Quit) => return ControlFlow::Quit,
            Some(Action::CloseWindow) => {
                if let Some(window) = self.focused_window() {
                    window.close_or_minimize();
                }
            }
            Some(Action::MinimizeWindow) => {
                if let Some(window) = self.focused_window() {
                    window.minimize();
                }
            }
            Some(Action::OpenSwitcher) => self.switcher.show(&self.registry),
            Some(Action::OpenSwitcherBackwards) => {
                self.switcher.show(&self.registry);
                self.switcher.cycle_previous();
            }
            Some(Action::ToggleBar) => {
                if let Some(bar) = &self.bar {
                    bar.borrow_mut().toggle_visible();
                }
            }
            None => {
                let focused = self.focused_window();
                app.handle_key(focused.as_ref(), key);
            }
        }
        ControlFlow::Continue
    }

    fn handle_mouse<A: DesktopApp>(&mut self, mouse: &MouseEvent, app: &mut A) {
        if let Some(popup) = self.popup.as_mut() {
            match popup.handle_mouse(mouse) {
                MenuOutcome::Pending => {}
                MenuOutcome::Dismissed => self.popup = None,
                MenuOutcome::Chosen(command) => {
                    self.popup = None;
                    self.apply_command(&command);
                }
            }
            return;
        }
        if self.switcher.handle_mouse(mouse, &self.registry) {
            return;
        }
        if self.mouse_owner.is_none()
            && let Some(bar) = &self.bar
        {
            // Bar borrow must end before the response touches the registry.
            let response = bar.borrow_mut().handle_mouse(mouse);
            match response {
                BarResponse::Ignored => {}
                BarResponse::Consumed => return,
                BarResponse::Command(command) => return self.apply_command(&command),
                BarResponse::Menu(menu) => {
                    self.popup = Some(menu);
                    return;
                }
            }
        }
        let viewport = self.viewport;
        let target = match mouse.kind {
            MouseEventKind::Down(_) => {
                let hit = self.registry.window_at(mouse.column, mouse.row);
                self.mouse_owner = hit.clone();
                hit
            }
            MouseEventKind::Drag(_) | MouseEventKind::Up(_) => self
                .mouse_owner
                .clone()
                .or_else(|| self.registry.captured_window())
                .or_else(|| self.registry.window_at(mouse.column, mouse.row)),
            MouseEventKind::Moved => {
                for window in self.registry.get_windows() {
                    window.handle_mouse(mouse, viewport);
                }
                return;
            }
            _ => self.registry.window_at(mouse.column, mouse.row),
        };
        if matches!(mouse.kind, MouseEventKind::Up(_)) {
            self.mouse_owner = None;
        }
        let Some(window) = target else {
            app.handle_mouse(None, mouse);
            return;
        };
        match window.handle_mouse(mouse, viewport) {
            MouseResponse::ShowMenu { column, row } => {
                self.popup = self.window_menu(&window, column, row);
            }
            MouseResponse::Consumed | MouseResponse::Ignored => {
                if !window.is_capturing()
                    && window.content_rect(viewport).contains(mouse.column, mouse.row)
                {
                    app.handle_mouse(Some(&window), mouse);
                }
            }
        }
    }

    fn flush_signals<A: DesktopApp>(&mut self, app: &mut A) {
        for signal in self.registry.take_signals() {
            tracing::trace!(?signal, "window signal");
            app.on_signal(&signal);
        }
    }

    /// Advance fades. Returns whether anything is still animating.
    pub fn tick<A: DesktopApp>(&mut self, now: Instant, app: &mut A) -> bool {
        let animating = self.registry.tick(now);
        self.flush_signals(app);
        animating
    }

    /// Paint the whole desktop into `buffer`. The first call doubles as the
    /// registry's layout-ready signal.
    pub fn render<A: DesktopApp>(&mut self, buffer: &mut Buffer, area: Rect, app: &mut A) {
        let managed = match &self.bar {
            Some(bar) => bar.borrow_mut().split_area(area),
            None => area,
        };
        self.viewport = managed;
        self.registry.set_viewport(managed);
        self.flush_signals(app);

        let focused = self.focused_window();
        for window in self.registry.windows_in_layer_order() {
            if !window.is_visible() {
                continue;
            }
            let is_focused = focused.as_ref() == Some(&window);
            let faded = window.opacity() < 1.0;
            self.decorator.render_window(
                buffer,
                window.screen_rect(managed),
                managed,
                &window.title(),
                &window.chrome(),
                is_focused,
                faded,
            );
            let content = window.content_rect(managed).visible(managed);
            if content.width > 0 && content.height > 0 {
                app.render_content(buffer, &window, content, is_focused);
            }
        }
        if let Some(bar) = &self.bar {
            let focused_id = focused.as_ref().map(WindowRef::id);
            bar.borrow_mut().render(buffer, focused_id.as_ref());
        }
        if let Some(popup) = self.popup.as_mut() {
            popup.render(buffer, area);
        }
        self.switcher.render(buffer, area);
    }
}

/// Drive `desktop` until the quit binding fires: ticks animate and redraw,
/// input is routed through [`Desktop::handle_event`].
pub fn run_desktop<B, D, A, E>(
    terminal: &mut Terminal<B>,
    driver: &mut D,
    desktop: &mut Desktop,
    app: &mut A,
    poll_interval: Duration,
) -> Result<(), E>
where
    B: Backend,
    D: InputDriver,
    A: DesktopApp,
    E: From<io::Error>,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    event_loop.driver().set_mouse_capture(true)?;

    event_loop.run(|_driver, event| match event {
        Some(evt) => Ok(desktop.handle_event(&evt, app)),
        None => {
            desktop.tick(Instant::now(), app);
            terminal
                .draw(|frame| {
                    let area = frame.area();
                    desktop.render(frame.buffer_mut(), area, app);
                })
                .map_err(|e| io::Error::other(e.to_string()))?;
            Ok(ControlFlow::Continue)
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInput;
    use crate::window::WindowConfig;
    use crossterm::event::{KeyModifiers, MouseButton};
    use ratatui::backend::TestBackend;
    use ratatui::style::Style;

    #[derive(Default)]
    struct Recorder {
        signals: Vec<WindowSignal>,
        keys: Vec<KeyCode>,
        clicks: usize,
    }

    impl DesktopApp for Recorder {
        fn render_content(&mut self, buffer: &mut Buffer, window: &WindowRef, area: Rect, _focused: bool) {
            buffer.set_string(area.x, area.y, window.id().as_str(), Style::default());
        }

        fn handle_key(&mut self, _window: Option<&WindowRef>, key: &KeyEvent) -> bool {
            self.keys.push(key.code);
            true
        }

        fn handle_mouse(&mut self, window: Option<&WindowRef>, _mouse: &MouseEvent) -> bool {
            if window.is_some() {
                self.clicks += 1;
            }
            true
        }

        fn on_signal(&mut self, signal: &WindowSignal) {
            self.signals.push(signal.clone());
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn desktop() -> (Desktop, WindowRef, Recorder) {
        let registry = RegistryHandle::new();
        let window = registry
            .create_window(
                WindowConfig::new("notes")
                    .with_start_open(true)
                    .with_animated(false),
            )
            .unwrap();
        let desktop = Desktop::new(registry, KeyBindings::default())
            .with_bar(Dock::Bottom)
            .unwrap();
        (desktop, window, Recorder::default())
    }

    fn render(desktop: &mut Desktop, app: &mut Recorder) -> Buffer {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        desktop.render(&mut buffer, area, app);
        buffer
    }

    #[test]
    fn first_render_lays_out_and_draws_windows() {
        let (mut desktop, window, mut app) = desktop();
        let buffer = render(&mut desktop, &mut app);
        assert_eq!(desktop.viewport(), Rect::new(0, 0, 80, 23));
        assert!(window.is_initialized() && window.is_open());
        let rect = window.screen_rect(desktop.viewport());
        assert_eq!(buffer[(rect.x as u16 + 1, rect.y as u16)].symbol(), "N");
        assert_eq!(buffer[(rect.x as u16, rect.y as u16 + 1)].symbol(), "n");
        assert!(matches!(app.signals.first(), Some(WindowSignal::Initialized(_))));
    }

    #[test]
    fn bindings_route_to_focused_window_and_quit() {
        let (mut desktop, window, mut app) = desktop();
        render(&mut desktop, &mut app);
        assert_eq!(
            desktop.handle_event(&key(KeyCode::Char('x'), KeyModifiers::NONE), &mut app),
            ControlFlow::Continue
        );
        assert_eq!(app.keys, vec![KeyCode::Char('x')]);

        desktop.handle_event(&key(KeyCode::Char('d'), KeyModifiers::CONTROL), &mut app);
        assert!(!window.is_open());

        desktop.handle_event(&key(KeyCode::Char('b'), KeyModifiers::CONTROL), &mut app);
        render(&mut desktop, &mut app);
        assert_eq!(desktop.viewport(), Rect::new(0, 0, 80, 24));

        assert_eq!(
            desktop.handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), &mut app),
            ControlFlow::Quit
        );
    }

    #[test]
    fn switcher_opens_and_confirms() {
        let (mut desktop, window, mut app) = desktop();
        render(&mut desktop, &mut app);
        desktop.handle_event(&key(KeyCode::F(1), KeyModifiers::NONE), &mut app);
        assert!(desktop.switcher().is_open());
        desktop.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &mut app);
        assert!(!desktop.switcher().is_open());
        // the only window was focused, so confirming it minimizes
        assert!(!window.is_open());
    }

    #[test]
    fn dragging_the_title_moves_the_window() {
        let (mut desktop, window, mut app) = desktop();
        render(&mut desktop, &mut app);
        let start = window.offset();
        let rect = window.screen_rect(desktop.viewport());
        let (x, y) = (rect.x as u16 + 2, rect.y as u16);
        desktop.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), x, y), &mut app);
        desktop.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), x + 5, y + 2), &mut app);
        desktop.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), x + 5, y + 2), &mut app);
        assert_eq!(window.offset(), crate::layout::Offset::new(start.x + 5, start.y + 2));
        assert_eq!(app.clicks, 0);

        let content = window.content_rect(desktop.viewport());
        desktop.handle_event(
            &mouse(MouseEventKind::Down(MouseButton::Left), content.x as u16 + 1, content.y as u16 + 1),
            &mut app,
        );
        assert_eq!(app.clicks, 1);
    }

    #[test]
    fn bar_background_menu_toggles_dock() {
        let (mut desktop, _window, mut app) = desktop();
        render(&mut desktop, &mut app);
        desktop.handle_event(&mouse(MouseEventKind::Down(MouseButton::Right), 0, 23), &mut app);
        desktop.handle_event(&mouse(MouseEventKind::Up(MouseButton::Right), 0, 23), &mut app);
        assert!(desktop.popup().is_some());
        for _ in 0..6 {
            desktop.handle_event(&key(KeyCode::Down, KeyModifiers::NONE), &mut app);
        }
        desktop.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &mut app);
        assert!(desktop.popup().is_none());
        render(&mut desktop, &mut app);
        assert_eq!(desktop.viewport(), Rect::new(0, 1, 80, 23));
    }

    #[test]
    fn run_desktop_quits_on_binding() {
        let (mut desktop, window, mut app) = desktop();
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut driver = ScriptedInput::new([key(KeyCode::Char('q'), KeyModifiers::CONTROL)]);
        run_desktop::<_, _, _, io::Error>(
            &mut terminal,
            &mut driver,
            &mut desktop,
            &mut app,
            Duration::ZERO,
        )
        .unwrap();
        assert!(driver.mouse_capture());
        assert!(window.is_initialized());
    }
}
