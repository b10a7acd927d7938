pub mod chrome;
pub mod config;
pub mod decorator;
pub mod registry;
pub mod transition;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use crossterm::event::{MouseEvent, MouseEventKind};
use ratatui::prelude::Rect;

pub use chrome::{Chrome, ChromeCommand, ControlKind, PressableControl};
pub use config::{MenuOption, WindowConfig, WindowMode};
pub use registry::{
    BarAdapter, BarRef, CloseHandshake, MountFn, RegistryHandle, WeakRegistry, WindowRegistry,
};
pub use transition::{TransitionHandle, TransitionKind};

use crate::error::WmError;
use crate::layout::floating::{
    HeaderDrag, ResizeDrag, clamp_into_parent, resolve_size, starting_offset,
};
use crate::layout::{FloatRect, Offset, Size};
use transition::Fade;

/// Unique, non-empty window identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Result<Self, WmError> {
        let id = id.into();
        if id.is_empty() {
            return Err(WmError::InvalidId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for WindowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Z-order token. Handed out from a counter that only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerIndex(pub u64);

/// Geometry captured when a window is maximized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedRect {
    pub size: Size,
    pub offset: Offset,
}

/// Observable window events, drained from the registry with
/// [`RegistryHandle::take_signals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSignal {
    Initialized(WindowId),
    Opened(WindowId),
    Closed(WindowId),
    Minimized(WindowId),
    Unregistered(WindowId),
}

impl WindowSignal {
    pub fn window_id(&self) -> &WindowId {
        match self {
            WindowSignal::Initialized(id)
            | WindowSignal::Opened(id)
            | WindowSignal::Closed(id)
            | WindowSignal::Minimized(id)
            | WindowSignal::Unregistered(id) => id,
        }
    }
}

/// Result of offering a mouse event to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseResponse {
    Ignored,
    Consumed,
    /// The hamburger button was clicked; the host should show the window menu.
    ShowMenu { column: u16, row: u16 },
}

/// Side effects of a window state change, applied by the registry once the
/// window's own borrow has been released.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    Focus,
    Blur,
    BringToFront,
    Signal(WindowSignal),
    BarState(bool),
    Ready,
    Unregister,
}

#[derive(Debug)]
pub(crate) struct Window {
    id: WindowId,
    config: WindowConfig,
    layer: LayerIndex,
    registry: WeakRegistry,
    parent: Option<Size>,
    offset: Offset,
    size: Size,
    min_size: Size,
    max_size: Size,
    starting_offset: Option<Offset>,
    starting_size: Option<Size>,
    open: bool,
    visible: bool,
    open_on_layout: bool,
    snapped: bool,
    saved_rect: Option<SavedRect>,
    initialized: bool,
    destroyed: bool,
    opacity: f32,
    fade: Option<Fade>,
    pending: Option<TransitionHandle>,
    generation: u64,
    chrome: Chrome,
    header_drag: Option<HeaderDrag>,
    resize_drag: Option<ResizeDrag>,
}

impl Window {
    fn new(
        id: WindowId,
        config: WindowConfig,
        layer: LayerIndex,
        registry: WeakRegistry,
    ) -> Self {
        let chrome = Chrome::new(
            !config.menu_options.is_empty(),
            config.allow_maximize,
            config.mode == WindowMode::Temporary,
            config.allow_resize,
        );
        Self {
            id,
            layer,
            registry,
            parent: None,
            offset: Offset::ZERO,
            size: config.size,
            min_size: config.min_size,
            max_size: config.max_size.unwrap_or(config.size),
            starting_offset: None,
            starting_size: None,
            open: false,
            visible: false,
            open_on_layout: config.start_open,
            snapped: config.start_snapped,
            saved_rect: None,
            initialized: false,
            destroyed: false,
            opacity: 0.0,
            fade: None,
            pending: None,
            generation: 0,
            chrome,
            header_drag: None,
            resize_drag: None,
            config,
        }
    }

    fn signal(&self, make: fn(WindowId) -> WindowSignal) -> Effect {
        Effect::Signal(make(self.id.clone()))
    }

    /// Compute starting geometry against the parent. Runs once.
    fn first_layout(&mut self, parent: Size, now: Instant) -> Vec<Effect> {
        if self.initialized || self.destroyed {
            return Vec::new();
        }
        let (size, min, max) = self.config.resolve_sizes(parent);
        let mut offset = starting_offset(
            parent,
            size,
            self.config.starting_horizontal,
            self.config.starting_vertical,
        );
        if self.snapped {
            offset = clamp_into_parent(offset, size, parent);
        }
        self.parent = Some(parent);
        self.size = size;
        self.min_size = min;
        self.max_size = max;
        self.offset = offset;
        self.starting_offset = Some(offset);
        self.starting_size = Some(size);
        self.initialized = true;
        tracing::debug!(
            window_id = %self.id,
            x = offset.x,
            y = offset.y,
            size = %size,
            "window initialized"
        );

        let mut effects = vec![self.signal(WindowSignal::Initialized), Effect::Ready];
        if self.open_on_layout {
            effects.extend(self.begin_open(now));
        }
        effects
    }

    fn parent_resized(&mut self, parent: Size) {
        if !self.initialized || self.destroyed {
            return;
        }
        self.parent = Some(parent);
        if self.config.max_size.is_none() {
            self.max_size = parent;
        }
        if self.saved_rect.is_some() {
            self.size = resolve_size(self.max_size, self.min_size, self.max_size);
            self.offset = clamp_into_parent(self.offset, self.size, parent);
            return;
        }
        self.size = resolve_size(self.size, self.min_size, self.max_size);
        if self.snapped {
            self.offset = clamp_into_parent(self.offset, self.size, parent);
        }
    }

    fn clamp_if_snapped(&mut self) {
        if self.snapped {
            self.clamp();
        }
    }

    fn clamp(&mut self) {
        if let Some(parent) = self.parent {
            self.offset = clamp_into_parent(self.offset, self.size, parent);
        }
    }

    fn begin_open(&mut self, now: Instant) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        if !self.initialized {
            self.open_on_layout = true;
            return Vec::new();
        }
        match self.pending.map(|p| p.kind) {
            Some(TransitionKind::Close) => {
                tracing::debug!(window_id = %self.id, "open ignored while close is pending");
                return Vec::new();
            }
            Some(TransitionKind::Open) => return Vec::new(),
            Some(TransitionKind::Minimize) => {
                tracing::debug!(window_id = %self.id, "open cancels pending minimize");
            }
            None if self.open => return Vec::new(),
            None => {}
        }
        self.open = true;
        self.visible = true;
        let mut effects = vec![self.signal(WindowSignal::Opened), Effect::BarState(true)];
        if self.config.auto_focus {
            effects.push(Effect::Focus);
        }
        if self.config.auto_bring_forward {
            effects.push(Effect::BringToFront);
        }
        effects.extend(self.start_transition(TransitionKind::Open, 1.0, now));
        effects
    }

    fn begin_hide(&mut self, requested: TransitionKind, now: Instant) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        let kind = match (requested, self.config.mode) {
            (TransitionKind::Close, WindowMode::Permanent) => TransitionKind::Minimize,
            (kind, _) => kind,
        };
        if self.pending.map(|p| p.kind) == Some(TransitionKind::Close) {
            return Vec::new();
        }
        if !self.visible {
            // Nothing is on screen, so no fade will ever complete.
            self.open_on_layout = false;
            self.open = false;
            return match kind {
                TransitionKind::Close => self.destroy(),
                _ => Vec::new(),
            };
        }
        if kind == TransitionKind::Minimize && !self.open {
            return Vec::new();
        }
        self.open = false;
        let mut effects = vec![Effect::Blur];
        effects.extend(self.start_transition(kind, 0.0, now));
        effects
    }

    fn start_transition(&mut self, kind: TransitionKind, target: f32, now: Instant) -> Vec<Effect> {
        self.generation += 1;
        let handle = TransitionHandle {
            generation: self.generation,
            kind,
        };
        self.pending = Some(handle);
        let duration = self.config.animation_duration;
        if self.config.animated && !duration.is_zero() {
            self.fade = Some(Fade::new(self.opacity, target, now, duration));
            tracing::debug!(
                window_id = %self.id,
                ?kind,
                generation = handle.generation,
                "transition started"
            );
            return Vec::new();
        }
        self.finish_transition(handle)
    }

    fn finish_transition(&mut self, handle: TransitionHandle) -> Vec<Effect> {
        if self.pending != Some(handle) {
            tracing::debug!(
                window_id = %self.id,
                generation = handle.generation,
                "stale transition completion ignored"
            );
            return Vec::new();
        }
        self.pending = None;
        self.fade = None;
        tracing::debug!(window_id = %self.id, kind = ?handle.kind, "transition completed");
        match handle.kind {
            TransitionKind::Open => {
                self.opacity = 1.0;
                Vec::new()
            }
            TransitionKind::Minimize => {
                self.opacity = 0.0;
                self.visible = false;
                vec![self.signal(WindowSignal::Minimized), Effect::BarState(false)]
            }
            TransitionKind::Close => self.destroy(),
        }
    }

    fn destroy(&mut self) -> Vec<Effect> {
        self.tear_down();
        vec![Effect::Unregister, self.signal(WindowSignal::Closed)]
    }

    fn tear_down(&mut self) {
        self.destroyed = true;
        self.open = false;
        self.visible = false;
        self.opacity = 0.0;
        self.pending = None;
        self.fade = None;
        self.header_drag = None;
        self.resize_drag = None;
        self.chrome.release_all();
    }

    fn advance(&mut self, now: Instant) -> Vec<Effect> {
        let Some(fade) = self.fade else {
            return Vec::new();
        };
        self.opacity = fade.opacity_at(now);
        match self.pending {
            Some(handle) if fade.finished(now) => self.finish_transition(handle),
            _ => Vec::new(),
        }
    }

    fn maximize(&mut self) {
        if self.saved_rect.is_some() || self.destroyed {
            return;
        }
        let Some(parent) = self.parent else {
            tracing::debug!(window_id = %self.id, "maximize before layout ignored");
            return;
        };
        self.saved_rect = Some(SavedRect {
            size: self.size,
            offset: self.offset,
        });
        self.size = resolve_size(self.max_size, self.min_size, self.max_size);
        self.offset = clamp_into_parent(self.offset, self.size, parent);
        self.resize_drag = None;
        self.chrome.set_maximized(true);
    }

    fn restore(&mut self) {
        match self.saved_rect.take() {
            Some(saved) => {
                self.size = saved.size;
                self.offset = saved.offset;
                self.chrome.set_maximized(false);
            }
            None => tracing::debug!(window_id = %self.id, "restore on a window that is not maximized"),
        }
    }

    fn reset(&mut self, now: Instant) -> Vec<Effect> {
        if !self.initialized || self.destroyed {
            return Vec::new();
        }
        let parent = self.parent.unwrap_or(self.max_size);
        let (_, min, max) = self.config.resolve_sizes(parent);
        self.min_size = min;
        self.max_size = max;
        self.saved_rect = None;
        self.chrome.set_maximized(false);
        let size = self.starting_size.unwrap_or(self.config.size);
        self.size = resolve_size(size, min, max);
        self.offset = self.starting_offset.unwrap_or(Offset::ZERO);
        self.snapped = self.config.start_snapped;
        self.clamp_if_snapped();
        if self.config.start_open {
            self.begin_open(now)
        } else {
            self.begin_hide(TransitionKind::Minimize, now)
        }
    }

    fn screen_rect(&self, viewport: Rect) -> FloatRect {
        FloatRect::on_screen(self.offset, self.size, viewport)
    }

    fn handle_mouse(&mut self, event: &MouseEvent, viewport: Rect) -> (MouseResponse, Vec<Effect>) {
        if !self.visible || self.destroyed {
            return (MouseResponse::Ignored, Vec::new());
        }
        let (column, row) = (event.column, event.row);
        let rect = self.screen_rect(viewport);
        let inside = rect.contains(column, row);
        let hit = self.chrome.hit_test(rect, column, row);
        match event.kind {
            MouseEventKind::Down(button) => {
                if !inside {
                    return (MouseResponse::Ignored, Vec::new());
                }
                let effects = vec![Effect::Focus, Effect::BringToFront];
                if let Some(kind) = hit {
                    match self.chrome.mouse_down(kind, button) {
                        Some(ChromeCommand::BeginMove) => {
                            self.header_drag = Some(HeaderDrag::new(column, row, self.offset));
                        }
                        Some(ChromeCommand::BeginResize) => {
                            self.resize_drag = Some(ResizeDrag::new(column, row, self.size));
                        }
                        _ => {}
                    }
                }
                (MouseResponse::Consumed, effects)
            }
            MouseEventKind::Drag(_) => {
                if let Some(drag) = self.header_drag {
                    self.offset = drag.apply(column, row);
                    self.clamp_if_snapped();
                    return (MouseResponse::Consumed, Vec::new());
                }
                if let Some(drag) = self.resize_drag {
                    self.size = drag.apply(column, row, self.min_size, self.max_size);
                    self.clamp_if_snapped();
                    return (MouseResponse::Consumed, Vec::new());
                }
                self.chrome.pointer_over(hit);
                (Self::consumed_if(inside), Vec::new())
            }
            MouseEventKind::Moved => {
                self.chrome.pointer_over(hit);
                (Self::consumed_if(inside), Vec::new())
            }
            MouseEventKind::Up(_) => {
                let was_dragging = self.header_drag.is_some() || self.resize_drag.is_some();
                let command = self.chrome.mouse_up(hit);
                self.header_drag = None;
                self.resize_drag = None;
                let now = Instant::now();
                let effects = match command {
                    Some(ChromeCommand::EndResize) => {
                        self.clamp();
                        Vec::new()
                    }
                    Some(ChromeCommand::Minimize) => self.begin_hide(TransitionKind::Minimize, now),
                    Some(ChromeCommand::Close) => self.begin_hide(TransitionKind::Close, now),
                    Some(ChromeCommand::ToggleMaximize) => {
                        if self.saved_rect.is_some() {
                            self.restore();
                        } else {
                            self.maximize();
                        }
                        Vec::new()
                    }
                    Some(ChromeCommand::ShowMenu) => {
                        return (MouseResponse::ShowMenu { column, row }, Vec::new());
                    }
                    _ => Vec::new(),
                };
                (Self::consumed_if(inside || was_dragging), effects)
            }
            _ => (Self::consumed_if(inside), Vec::new()),
        }
    }

    fn consumed_if(consumed: bool) -> MouseResponse {
        if consumed {
            MouseResponse::Consumed
        } else {
            MouseResponse::Ignored
        }
    }
}

/// Shared handle to a window. Equality is identity.
#[derive(Clone)]
pub struct WindowRef(Rc<RefCell<Window>>);

impl PartialEq for WindowRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for WindowRef {}

impl fmt::Debug for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(window) => f.debug_tuple("WindowRef").field(&window.id).finish(),
            Err(_) => f.write_str("WindowRef(<borrowed>)"),
        }
    }
}

impl WindowRef {
    pub(crate) fn new(
        config: WindowConfig,
        layer: LayerIndex,
        registry: WeakRegistry,
    ) -> Result<Self, WmError> {
        let id = config.validate()?;
        Ok(Self(Rc::new(RefCell::new(Window::new(
            id, config, layer, registry,
        )))))
    }

    /// Run a state change and hand its side effects to the registry after the
    /// window borrow is released.
    fn update(&self, change: impl FnOnce(&mut Window) -> Vec<Effect>) {
        let (effects, registry) = {
            let mut window = self.0.borrow_mut();
            let effects = change(&mut window);
            (effects, window.registry.clone())
        };
        if effects.is_empty() {
            return;
        }
        match registry.upgrade() {
            Some(handle) => handle.apply_effects(self, effects),
            None => tracing::warn!(window_id = %self.id(), "registry dropped; window effects discarded"),
        }
    }

    fn mutate(&self, change: impl FnOnce(&mut Window)) {
        change(&mut self.0.borrow_mut());
    }

    pub fn id(&self) -> WindowId {
        self.0.borrow().id.clone()
    }

    pub fn display_name(&self) -> String {
        self.0.borrow().config.display_name()
    }

    /// Name prefixed with the configured icon, as shown on the bar and in
    /// the switcher.
    pub fn label(&self) -> String {
        let window = self.0.borrow();
        let name = window.config.display_name();
        match &window.config.icon {
            Some(icon) => format!("{icon} {name}"),
            None => name,
        }
    }

    /// Text for the title bar; empty when titles are hidden.
    pub fn title(&self) -> String {
        if self.0.borrow().config.show_title {
            self.label()
        } else {
            String::new()
        }
    }

    pub fn mode(&self) -> WindowMode {
        self.0.borrow().config.mode
    }

    pub fn layer(&self) -> LayerIndex {
        self.0.borrow().layer
    }

    pub fn is_open(&self) -> bool {
        self.0.borrow().open
    }

    /// Whether the window is drawn at all, including while fading out.
    pub fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    pub fn is_snapped(&self) -> bool {
        self.0.borrow().snapped
    }

    pub fn is_maximized(&self) -> bool {
        self.0.borrow().saved_rect.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.0.borrow().initialized
    }

    /// True once the window has been destroyed or unregistered.
    pub fn is_closed(&self) -> bool {
        self.0.borrow().destroyed
    }

    pub fn offset(&self) -> Offset {
        self.0.borrow().offset
    }

    pub fn size(&self) -> Size {
        self.0.borrow().size
    }

    pub fn min_size(&self) -> Size {
        self.0.borrow().min_size
    }

    pub fn max_size(&self) -> Size {
        self.0.borrow().max_size
    }

    pub fn parent_size(&self) -> Option<Size> {
        self.0.borrow().parent
    }

    pub fn starting_offset(&self) -> Option<Offset> {
        self.0.borrow().starting_offset
    }

    pub fn starting_size(&self) -> Option<Size> {
        self.0.borrow().starting_size
    }

    pub fn saved_rect(&self) -> Option<SavedRect> {
        self.0.borrow().saved_rect
    }

    pub fn opacity(&self) -> f32 {
        self.0.borrow().opacity
    }

    pub fn screen_rect(&self, viewport: Rect) -> FloatRect {
        self.0.borrow().screen_rect(viewport)
    }

    /// Screen area between the title bar and the bottom bar.
    pub fn content_rect(&self, viewport: Rect) -> FloatRect {
        Chrome::content_rect(self.screen_rect(viewport))
    }

    pub fn chrome(&self) -> Chrome {
        self.0.borrow().chrome.clone()
    }

    pub fn is_capturing(&self) -> bool {
        self.0.borrow().chrome.is_capturing()
    }

    pub fn open(&self) {
        let now = Instant::now();
        self.update(|w| w.begin_open(now));
    }

    /// Close a temporary window (destroying it once its fade completes) or
    /// minimize a permanent one.
    pub fn close(&self) {
        let now = Instant::now();
        self.update(|w| w.begin_hide(TransitionKind::Close, now));
    }

    pub fn close_or_minimize(&self) {
        self.close();
    }

    pub fn minimize(&self) {
        let now = Instant::now();
        self.update(|w| w.begin_hide(TransitionKind::Minimize, now));
    }

    pub fn toggle_window(&self) {
        if self.is_open() {
            self.minimize();
        } else {
            self.open();
        }
    }

    pub fn maximize(&self) {
        self.mutate(Window::maximize);
    }

    pub fn restore(&self) {
        self.mutate(Window::restore);
    }

    pub fn toggle_maximize(&self) {
        if self.is_maximized() {
            self.restore();
        } else {
            self.maximize();
        }
    }

    pub fn enable_snap(&self) {
        self.mutate(|w| {
            w.snapped = true;
            w.clamp();
        });
    }

    pub fn disable_snap(&self) {
        self.mutate(|w| w.snapped = false);
    }

    pub fn toggle_snap(&self) {
        if self.is_snapped() {
            self.disable_snap();
        } else {
            self.enable_snap();
        }
    }

    pub fn clamp_into_parent(&self) {
        self.mutate(Window::clamp);
    }

    /// Put the window back to its starting geometry, snap and open state.
    pub fn reset(&self) {
        let now = Instant::now();
        self.update(|w| w.reset(now));
    }

    pub fn move_to(&self, offset: Offset) {
        self.mutate(|w| {
            w.offset = offset;
            w.clamp_if_snapped();
        });
    }

    pub fn resize_to(&self, size: Size) {
        self.mutate(|w| {
            if w.saved_rect.is_some() {
                tracing::debug!(window_id = %w.id, "resize ignored while maximized");
                return;
            }
            w.size = resolve_size(size, w.min_size, w.max_size);
            w.clamp_if_snapped();
        });
    }

    pub fn bring_forward(&self) {
        self.update(|_| vec![Effect::BringToFront]);
    }

    pub fn focus(&self) {
        self.update(|w| {
            if !w.visible || w.destroyed {
                return Vec::new();
            }
            let mut effects = vec![Effect::Focus];
            if w.config.auto_bring_forward {
                effects.push(Effect::BringToFront);
            }
            effects
        });
    }

    pub fn pending_transition(&self) -> Option<TransitionHandle> {
        self.0.borrow().pending
    }

    /// Run the side effects of a finished fade. Handles from superseded
    /// transitions are ignored.
    pub fn complete_transition(&self, handle: TransitionHandle) {
        self.update(|w| w.finish_transition(handle));
    }

    pub(crate) fn advance(&self, now: Instant) -> bool {
        let animating = self.0.borrow().fade.is_some();
        if animating {
            self.update(|w| w.advance(now));
        }
        animating
    }

    pub(crate) fn first_layout(&self, parent: Size) {
        let now = Instant::now();
        self.update(|w| w.first_layout(parent, now));
    }

    pub(crate) fn parent_resized(&self, parent: Size) {
        self.mutate(|w| w.parent_resized(parent));
    }

    pub(crate) fn tear_down(&self) {
        self.mutate(Window::tear_down);
    }

    pub(crate) fn rebind(&self, registry: WeakRegistry, layer: LayerIndex) {
        self.mutate(|w| {
            w.registry = registry;
            w.layer = layer;
        });
    }

    pub(crate) fn belongs_to(&self, registry: &WeakRegistry) -> bool {
        self.0.borrow().registry.ptr_eq(registry)
    }

    pub fn menu_labels(&self) -> Vec<String> {
        self.0
            .borrow()
            .config
            .menu_options
            .iter()
            .map(|option| option.label.clone())
            .collect()
    }

    /// Run the hamburger menu entry at `index`. Returns false when there is no
    /// such entry.
    pub fn invoke_menu_option(&self, index: usize) -> bool {
        let action = self
            .0
            .borrow()
            .config
            .menu_options
            .get(index)
            .map(|option| option.action.clone());
        match action {
            Some(action) => {
                action(self);
                true
            }
            None => false,
        }
    }

    /// Offer a mouse event to the window's chrome. `viewport` is the screen
    /// area the window's offset is relative to.
    pub fn handle_mouse(&self, event: &MouseEvent, viewport: Rect) -> MouseResponse {
        let mut response = MouseResponse::Ignored;
        self.update(|w| {
            let (r, effects) = w.handle_mouse(event, viewport);
            response = r;
            effects
        });
        response
    }
}
