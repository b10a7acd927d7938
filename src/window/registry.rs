//! The window registry: every live window, the most-recently-focused order,
//! the layer stack, the optional bar, mounting callbacks and the close-all
//! barrier.
//!
//! The registry is shared through [`RegistryHandle`]. Windows keep only a
//! [`WeakRegistry`], so dropping the last handle tears the desktop down
//! without reference cycles. Every method borrows the registry for as short a
//! time as possible and never calls into a window or the bar while holding
//! the borrow.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

use ratatui::prelude::Rect;

use super::{Effect, LayerIndex, WindowConfig, WindowId, WindowMode, WindowRef, WindowSignal};
use crate::error::WmError;
use crate::layout::Size;

/// Contract the registry relies on from a taskbar.
pub trait BarAdapter {
    fn add_window_control(&mut self, window: &WindowRef);
    fn remove_window_control(&mut self, id: &WindowId);
    fn update_window_control_state(&mut self, window: &WindowRef, open: bool);
}

pub type BarRef = Rc<RefCell<dyn BarAdapter>>;

/// Places a window into some destination, typically by registering it.
pub type MountFn = Rc<dyn Fn(&RegistryHandle, WindowRef) -> Result<(), WmError>>;

/// Snapshot of the close-all handshake counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseHandshake {
    pub closing_in_progress: bool,
    pub temporary_count: u32,
    pub checked_in: u32,
}

#[derive(Debug, Default)]
struct CloseBarrier {
    in_progress: bool,
    temporary_count: u32,
    checked_in: u32,
    generation: u64,
    awaiting: BTreeSet<WindowId>,
}

impl CloseBarrier {
    /// Add temporaries to the barrier, starting a new generation if idle.
    /// Windows already awaited are not counted twice.
    fn join(&mut self, temporaries: impl IntoIterator<Item = WindowId>) {
        if !self.in_progress {
            self.in_progress = true;
            self.generation += 1;
            self.temporary_count = 0;
            self.checked_in = 0;
        }
        for id in temporaries {
            if self.awaiting.insert(id) {
                self.temporary_count += 1;
            }
        }
        self.finish_if_done();
    }

    fn check_in(&mut self, id: &WindowId) {
        if self.in_progress && self.awaiting.remove(id) {
            self.checked_in += 1;
            self.finish_if_done();
        }
    }

    fn finish_if_done(&mut self) {
        if self.in_progress && self.checked_in == self.temporary_count {
            tracing::debug!(
                generation = self.generation,
                closed = self.checked_in,
                "close-all finished"
            );
            self.in_progress = false;
            self.temporary_count = 0;
            self.checked_in = 0;
            self.awaiting.clear();
        }
    }

    fn snapshot(&self) -> CloseHandshake {
        CloseHandshake {
            closing_in_progress: self.in_progress,
            temporary_count: self.temporary_count,
            checked_in: self.checked_in,
        }
    }
}

#[derive(Default)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, WindowRef>,
    registration_order: Vec<WindowId>,
    focus_order: Vec<WindowRef>,
    layers: Vec<LayerIndex>,
    next_layer: u64,
    bar: Option<BarRef>,
    last_focused: Option<WindowRef>,
    focused: Option<WindowRef>,
    mounting_callbacks: BTreeMap<String, MountFn>,
    closing: CloseBarrier,
    signals: VecDeque<WindowSignal>,
    viewport: Option<Rect>,
}

impl fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("windows", &self.registration_order)
            .field("layers", &self.layers)
            .field("closing", &self.closing)
            .field("bar_bound", &self.bar.is_some())
            .finish_non_exhaustive()
    }
}

impl WindowRegistry {
    fn next_layer(&mut self) -> LayerIndex {
        let layer = LayerIndex(self.next_layer);
        self.next_layer += 1;
        layer
    }

    fn ordered_windows(&self) -> Vec<WindowRef> {
        self.registration_order
            .iter()
            .filter_map(|id| self.windows.get(id).cloned())
            .collect()
    }

    /// Panics when the focus order does not hold exactly the registered
    /// windows. Skipped while a close-all is in flight.
    fn check_focus_order(&self) {
        if self.closing.in_progress {
            return;
        }
        assert_eq!(
            self.focus_order.len(),
            self.windows.len(),
            "focus order out of sync with registered windows"
        );
        for (idx, window) in self.focus_order.iter().enumerate() {
            assert!(
                !self.focus_order[..idx].contains(window),
                "window {window:?} appears twice in the focus order"
            );
            assert!(
                self.windows.values().any(|w| w == window),
                "window {window:?} is in the focus order but not registered"
            );
        }
    }
}

/// Shared handle to a [`WindowRegistry`].
#[derive(Clone, Default)]
pub struct RegistryHandle(Rc<RefCell<WindowRegistry>>);

/// Non-owning registry reference held by windows.
#[derive(Clone, Default)]
pub struct WeakRegistry(Weak<RefCell<WindowRegistry>>);

impl WeakRegistry {
    pub fn upgrade(&self) -> Option<RegistryHandle> {
        self.0.upgrade().map(RegistryHandle)
    }

    pub fn ptr_eq(&self, other: &WeakRegistry) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl fmt::Debug for WeakRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakRegistry")
    }
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(registry) => fmt::Debug::fmt(&*registry, f),
            Err(_) => f.write_str("RegistryHandle(<borrowed>)"),
        }
    }
}

impl RegistryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry(Rc::downgrade(&self.0))
    }

    /// Construct a window bound to this registry without registering it.
    pub fn build_window(&self, config: WindowConfig) -> Result<WindowRef, WmError> {
        let layer = self.0.borrow_mut().next_layer();
        WindowRef::new(config, layer, self.downgrade())
    }

    /// Construct and register a window.
    pub fn create_window(&self, config: WindowConfig) -> Result<WindowRef, WmError> {
        let window = self.build_window(config)?;
        self.register_window(&window)?;
        Ok(window)
    }

    pub fn register_window(&self, window: &WindowRef) -> Result<(), WmError> {
        let id = window.id();
        if window.is_closed() {
            return Err(WmError::WindowDestroyed(id));
        }
        let viewport = {
            let mut registry = self.0.borrow_mut();
            if registry.windows.contains_key(&id) {
                return Err(WmError::DuplicateId(id));
            }
            if !window.belongs_to(&self.downgrade()) {
                let layer = registry.next_layer();
                window.rebind(self.downgrade(), layer);
            }
            registry.windows.insert(id.clone(), window.clone());
            registry.registration_order.push(id.clone());
            registry.focus_order.push(window.clone());
            registry.layers.push(window.layer());
            registry.check_focus_order();
            registry.viewport
        };
        tracing::debug!(window_id = %id, layer = window.layer().0, "registered window");
        if let Some(area) = viewport {
            window.first_layout(Size::from(area));
        }
        Ok(())
    }

    /// Remove a window, drop its bar control and tear it down.
    pub fn unregister_window(&self, id: &WindowId) -> Result<WindowRef, WmError> {
        let (window, bar) = {
            let mut registry = self.0.borrow_mut();
            let window = registry
                .windows
                .remove(id)
                .ok_or_else(|| WmError::NotFound(id.clone()))?;
            registry.registration_order.retain(|other| other != id);
            match registry.focus_order.iter().position(|w| *w == window) {
                Some(pos) => {
                    registry.focus_order.remove(pos);
                }
                None if registry.closing.in_progress => {}
                None => panic!("window `{id}` is registered but missing from the focus order"),
            }
            let layer = window.layer();
            registry.layers.retain(|l| *l != layer);
            if registry.last_focused.as_ref() == Some(&window) {
                registry.last_focused = None;
            }
            if registry.focused.as_ref() == Some(&window) {
                registry.focused = None;
            }
            registry.closing.check_in(id);
            registry
                .signals
                .push_back(WindowSignal::Unregistered(id.clone()));
            registry.check_focus_order();
            (window, registry.bar.clone())
        };
        window.tear_down();
        if let Some(bar) = bar {
            bar.borrow_mut().remove_window_control(id);
        }
        tracing::debug!(window_id = %id, "unregistered window");
        Ok(window)
    }

    pub fn is_registered(&self, window: &WindowRef) -> bool {
        self.0.borrow().windows.values().any(|w| w == window)
    }

    /// Bind the bar. Windows that already finished their first layout get
    /// their controls right away.
    pub fn register_bar(&self, bar: BarRef) -> Result<(), WmError> {
        let ready = {
            let mut registry = self.0.borrow_mut();
            if registry.bar.is_some() {
                return Err(WmError::BarAlreadyBound);
            }
            registry.bar = Some(bar.clone());
            registry.ordered_windows()
        };
        tracing::debug!("window bar bound");
        let mut bar = bar.borrow_mut();
        for window in ready.iter().filter(|w| w.is_initialized()) {
            bar.add_window_control(window);
            bar.update_window_control_state(window, window.is_open());
        }
        Ok(())
    }

    pub fn unregister_bar(&self) -> Result<BarRef, WmError> {
        let bar = self.0.borrow_mut().bar.take().ok_or(WmError::NoBarBound)?;
        tracing::debug!("window bar unbound");
        Ok(bar)
    }

    pub fn bar(&self) -> Option<BarRef> {
        self.0.borrow().bar.clone()
    }

    /// Ask the bar to materialize a control for `window`. Returns whether a
    /// bar is bound.
    pub fn window_ready(&self, window: &WindowRef) -> bool {
        if !self.is_registered(window) {
            return false;
        }
        let Some(bar) = self.bar() else {
            return false;
        };
        bar.borrow_mut().add_window_control(window);
        true
    }

    /// Tell the bar whether `window` is open so it can update its marker.
    pub fn signal_window_state(&self, window: &WindowRef, open: bool) {
        if !self.is_registered(window) {
            return;
        }
        if let Some(bar) = self.bar() {
            bar.borrow_mut().update_window_control_state(window, open);
        }
    }

    pub fn register_mounting_callback(
        &self,
        callback_id: impl Into<String>,
        callback: impl Fn(&RegistryHandle, WindowRef) -> Result<(), WmError> + 'static,
    ) {
        let callback_id = callback_id.into();
        let previous = self
            .0
            .borrow_mut()
            .mounting_callbacks
            .insert(callback_id.clone(), Rc::new(callback));
        if previous.is_some() {
            tracing::warn!(callback_id = %callback_id, "overwriting existing mounting callback");
        } else {
            tracing::debug!(callback_id = %callback_id, "registered mounting callback");
        }
    }

    /// Hand `window` to the destination registered under `callback_id`.
    pub fn mount_window(&self, window: WindowRef, callback_id: &str) -> Result<(), WmError> {
        let callback = self.0.borrow().mounting_callbacks.get(callback_id).cloned();
        let Some(callback) = callback else {
            tracing::error!(
                callback_id,
                window_id = %window.id(),
                "no mounting callback registered; window not mounted"
            );
            return Err(WmError::UnknownCallback(callback_id.to_string()));
        };
        tracing::debug!(callback_id, window_id = %window.id(), "mounting window");
        callback(self, window)
    }

    /// Windows in registration order.
    pub fn get_windows(&self) -> Vec<WindowRef> {
        self.0.borrow().ordered_windows()
    }

    pub fn get_window(&self, id: &str) -> Option<WindowRef> {
        self.0.borrow().windows.get(id).cloned()
    }

    /// Most recently focused first.
    pub fn get_focus_order(&self) -> Vec<WindowRef> {
        self.0.borrow().focus_order.clone()
    }

    pub fn last_focused(&self) -> Option<WindowRef> {
        self.0.borrow().last_focused.clone()
    }

    /// Window holding keyboard focus, if any. Cleared when that window hides.
    pub fn focused(&self) -> Option<WindowRef> {
        self.0.borrow().focused.clone()
    }

    pub fn handshake(&self) -> CloseHandshake {
        self.0.borrow().closing.snapshot()
    }

    pub fn take_signals(&self) -> Vec<WindowSignal> {
        self.0.borrow_mut().signals.drain(..).collect()
    }

    pub fn layers(&self) -> Vec<LayerIndex> {
        self.0.borrow().layers.clone()
    }

    /// Registered windows bottom to top.
    pub fn windows_in_layer_order(&self) -> Vec<WindowRef> {
        let registry = self.0.borrow();
        registry
            .layers
            .iter()
            .filter_map(|layer| {
                registry
                    .windows
                    .values()
                    .find(|w| w.layer() == *layer)
                    .cloned()
            })
            .collect()
    }

    /// Topmost visible window whose rectangle contains the cell.
    pub fn window_at(&self, column: u16, row: u16) -> Option<WindowRef> {
        let viewport = self.viewport()?;
        self.windows_in_layer_order()
            .into_iter()
            .rev()
            .find(|w| w.is_visible() && w.screen_rect(viewport).contains(column, row))
    }

    /// Window currently dragging its title or resize grip.
    pub fn captured_window(&self) -> Option<WindowRef> {
        self.get_windows().into_iter().find(WindowRef::is_capturing)
    }

    pub fn viewport(&self) -> Option<Rect> {
        self.0.borrow().viewport
    }

    pub fn layout_ready(&self) -> bool {
        self.viewport().is_some()
    }

    /// Report the managed area. The first call is the layout-ready signal that
    /// gives every registered window its starting geometry; later calls
    /// re-fit windows to the new size.
    pub fn set_viewport(&self, area: Rect) {
        let (previous, windows) = {
            let mut registry = self.0.borrow_mut();
            let previous = registry.viewport.replace(area);
            (previous, registry.ordered_windows())
        };
        match previous {
            None => {
                tracing::debug!(width = area.width, height = area.height, "layout ready");
                for window in &windows {
                    window.first_layout(Size::from(area));
                }
            }
            Some(old) if Size::from(old) != Size::from(area) => {
                tracing::debug!(width = area.width, height = area.height, "viewport resized");
                for window in &windows {
                    window.parent_resized(Size::from(area));
                }
            }
            Some(_) => {}
        }
    }

    /// Advance every running fade. Returns whether any window is animating.
    pub fn tick(&self, now: Instant) -> bool {
        let mut animating = false;
        for window in self.get_windows() {
            animating |= window.advance(now);
        }
        animating
    }

    pub fn bring_to_front(&self, window: &WindowRef) {
        let layer = window.layer();
        let mut registry = self.0.borrow_mut();
        if let Some(pos) = registry.layers.iter().position(|l| *l == layer) {
            registry.layers.remove(pos);
            registry.layers.push(layer);
        }
    }

    /// Move `window` to the head of the focus order and remember it as the
    /// last focused window.
    pub fn change_window_focus_order(&self, window: &WindowRef) {
        let id = window.id();
        let mut registry = self.0.borrow_mut();
        if !registry.windows.contains_key(&id) {
            tracing::debug!(window_id = %id, "focus ignored for unregistered window");
            return;
        }
        match registry.focus_order.iter().position(|w| w == window) {
            Some(pos) => {
                registry.focus_order.remove(pos);
            }
            None if registry.closing.in_progress => return,
            None => panic!("window `{id}` is registered but missing from the focus order"),
        }
        registry.focus_order.insert(0, window.clone());
        registry.last_focused = Some(window.clone());
        registry.focused = Some(window.clone());
        registry.check_focus_order();
        tracing::debug!(window_id = %id, "focus changed");
    }

    fn blur(&self, window: &WindowRef) {
        let mut registry = self.0.borrow_mut();
        if registry.focused.as_ref() == Some(window) {
            registry.focused = None;
        }
    }

    pub(crate) fn apply_effects(&self, window: &WindowRef, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Focus => self.change_window_focus_order(window),
                Effect::Blur => self.blur(window),
                Effect::BringToFront => self.bring_to_front(window),
                Effect::Signal(signal) => self.0.borrow_mut().signals.push_back(signal),
                Effect::BarState(open) => self.signal_window_state(window, open),
                Effect::Ready => {
                    self.window_ready(window);
                }
                Effect::Unregister => {
                    if !self.is_registered(window) {
                        continue;
                    }
                    if let Err(err) = self.unregister_window(&window.id()) {
                        tracing::error!(%err, "failed to unregister closed window");
                    }
                }
            }
        }
    }

    /// Close every temporary window and minimize every permanent one, each
    /// through its own transition. Temporaries are tracked by a barrier until
    /// each has unregistered.
    pub fn close_all(&self) {
        let windows = {
            let mut registry = self.0.borrow_mut();
            let windows = registry.ordered_windows();
            let temporaries = windows
                .iter()
                .filter(|w| w.mode() == WindowMode::Temporary)
                .map(WindowRef::id);
            registry.closing.join(temporaries);
            tracing::debug!(
                generation = registry.closing.generation,
                awaiting = registry.closing.temporary_count,
                "close-all started"
            );
            windows
        };
        for window in windows {
            match window.mode() {
                WindowMode::Temporary => window.close(),
                WindowMode::Permanent => window.minimize(),
            }
        }
    }

    pub fn open_all(&self) {
        for window in self.get_windows() {
            window.open();
        }
    }

    pub fn minimize_all(&self) {
        for window in self.get_windows() {
            window.minimize();
        }
    }

    pub fn snap_all(&self) {
        for window in self.get_windows() {
            window.enable_snap();
        }
    }

    pub fn unsnap_all(&self) {
        for window in self.get_windows() {
            window.disable_snap();
        }
    }

    pub fn reset_all(&self) {
        for window in self.get_windows() {
            window.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingBar {
        log: Vec<String>,
    }

    impl BarAdapter for RecordingBar {
        fn add_window_control(&mut self, window: &WindowRef) {
            self.log.push(format!("add {}", window.id()));
        }

        fn remove_window_control(&mut self, id: &WindowId) {
            self.log.push(format!("remove {id}"));
        }

        fn update_window_control_state(&mut self, window: &WindowRef, open: bool) {
            self.log.push(format!("state {} {open}", window.id()));
        }
    }

    fn area() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    fn quick(id: &str) -> WindowConfig {
        WindowConfig::new(id).with_animated(false)
    }

    #[test]
    fn duplicate_and_empty_ids_are_rejected() {
        let registry = RegistryHandle::new();
        registry.create_window(quick("a")).unwrap();
        assert_eq!(
            registry.create_window(quick("a")).unwrap_err(),
            WmError::DuplicateId(WindowId::new("a").unwrap())
        );
        assert_eq!(
            registry.create_window(quick("")).unwrap_err(),
            WmError::InvalidId
        );
        assert_eq!(registry.get_windows().len(), 1);
        assert_eq!(registry.get_focus_order().len(), 1);
    }

    #[test]
    fn unregister_unknown_is_not_found() {
        let registry = RegistryHandle::new();
        let id = WindowId::new("ghost").unwrap();
        assert_eq!(
            registry.unregister_window(&id).unwrap_err(),
            WmError::NotFound(id)
        );
    }

    #[test]
    fn torn_down_window_cannot_come_back() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let a = registry.create_window(quick("a").with_start_open(true)).unwrap();
        let id = a.id();
        let back = registry.unregister_window(&id).unwrap();
        assert!(back.is_closed());
        assert_eq!(
            registry.register_window(&back),
            Err(WmError::WindowDestroyed(id))
        );
        assert!(registry.get_windows().is_empty());
        registry.close_all();
        assert!(!registry.handshake().closing_in_progress);
    }

    #[test]
    fn second_bar_is_rejected() {
        let registry = RegistryHandle::new();
        let bar: BarRef = Rc::new(RefCell::new(RecordingBar::default()));
        registry.register_bar(bar.clone()).unwrap();
        assert_eq!(
            registry.register_bar(bar).unwrap_err(),
            WmError::BarAlreadyBound
        );
        assert!(registry.unregister_bar().is_ok());
        assert_eq!(registry.unregister_bar().err(), Some(WmError::NoBarBound));
    }

    #[test]
    fn focus_moves_window_to_front() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let a = registry.create_window(quick("a").with_start_open(true)).unwrap();
        let b = registry.create_window(quick("b").with_start_open(true)).unwrap();
        a.focus();
        b.focus();
        assert_eq!(registry.get_focus_order(), vec![b.clone(), a.clone()]);
        assert_eq!(registry.last_focused(), Some(b.clone()));
        a.focus();
        assert_eq!(registry.get_focus_order(), vec![a.clone(), b]);
        assert_eq!(registry.layers().last(), Some(&a.layer()));
    }

    #[test]
    fn layers_are_never_reused() {
        let registry = RegistryHandle::new();
        let a = registry.create_window(quick("a")).unwrap();
        let first = a.layer();
        a.close();
        let again = registry.create_window(quick("a")).unwrap();
        assert!(again.layer() > first);
    }

    #[test]
    fn bar_receives_controls_in_order() {
        let registry = RegistryHandle::new();
        let bar = Rc::new(RefCell::new(RecordingBar::default()));
        registry.register_bar(bar.clone()).unwrap();
        let a = registry.create_window(quick("a").with_start_open(true)).unwrap();
        registry.set_viewport(area());
        a.minimize();
        a.close();
        assert_eq!(
            bar.borrow().log,
            vec!["add a", "state a true", "state a false", "remove a"]
        );
    }

    #[test]
    fn late_bar_gets_existing_windows() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        registry.create_window(quick("a").with_start_open(true)).unwrap();
        registry.create_window(quick("b")).unwrap();
        let bar = Rc::new(RefCell::new(RecordingBar::default()));
        registry.register_bar(bar.clone()).unwrap();
        assert_eq!(
            bar.borrow().log,
            vec!["add a", "state a true", "add b", "state b false"]
        );
    }

    #[test]
    fn signals_fire_in_lifecycle_order() {
        let registry = RegistryHandle::new();
        let a = registry.create_window(quick("a")).unwrap();
        registry.set_viewport(area());
        a.open();
        a.minimize();
        a.close();
        let id = WindowId::new("a").unwrap();
        assert_eq!(
            registry.take_signals(),
            vec![
                WindowSignal::Initialized(id.clone()),
                WindowSignal::Opened(id.clone()),
                WindowSignal::Minimized(id.clone()),
                WindowSignal::Unregistered(id.clone()),
                WindowSignal::Closed(id),
            ]
        );
        assert!(registry.take_signals().is_empty());
    }

    #[test]
    fn animated_close_all_waits_for_every_fade() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let slow = WindowConfig::new("slow")
            .with_start_open(true)
            .with_animation(true, Duration::from_millis(100));
        let fast = WindowConfig::new("fast")
            .with_start_open(true)
            .with_animation(true, Duration::from_millis(10));
        registry.create_window(slow).unwrap();
        registry.create_window(fast).unwrap();
        registry.tick(Instant::now() + Duration::from_secs(1));

        registry.close_all();
        assert_eq!(
            registry.handshake(),
            CloseHandshake {
                closing_in_progress: true,
                temporary_count: 2,
                checked_in: 0,
            }
        );
        // overlapping call joins the same barrier
        registry.close_all();
        assert_eq!(registry.handshake().temporary_count, 2);

        registry.tick(Instant::now() + Duration::from_secs(5));
        assert_eq!(registry.handshake(), CloseHandshake::default());
        assert!(registry.get_windows().is_empty());
    }

    #[test]
    fn close_all_without_temporaries_finishes_at_once() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let p = registry
            .create_window(
                quick("p")
                    .with_mode(WindowMode::Permanent)
                    .with_start_open(true),
            )
            .unwrap();
        registry.close_all();
        assert_eq!(registry.handshake(), CloseHandshake::default());
        assert!(!p.is_open());
        assert_eq!(registry.get_windows(), vec![p]);
    }

    #[test]
    fn mount_resolves_registered_callback() {
        let registry = RegistryHandle::new();
        registry.register_mounting_callback("desktop", |registry, window| {
            registry.register_window(&window)
        });
        let window = registry.build_window(quick("spawned")).unwrap();
        assert_eq!(
            registry.mount_window(window.clone(), "elsewhere").unwrap_err(),
            WmError::UnknownCallback("elsewhere".into())
        );
        registry.mount_window(window.clone(), "desktop").unwrap();
        assert!(registry.is_registered(&window));
    }

    #[test]
    fn windows_registered_after_layout_are_laid_out() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let a = registry
            .create_window(quick("a").with_size(Size::new(20, 10)))
            .unwrap();
        assert!(a.is_initialized());
        assert_eq!(a.offset(), crate::layout::Offset::new(30, 7));
    }

    #[test]
    fn window_at_prefers_topmost() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let a = registry.create_window(quick("a").with_start_open(true)).unwrap();
        let b = registry.create_window(quick("b").with_start_open(true)).unwrap();
        // both centered on the same cells
        assert_eq!(registry.window_at(40, 12), Some(b));
        a.bring_forward();
        assert_eq!(registry.window_at(40, 12), Some(a.clone()));
        a.minimize();
        assert_ne!(registry.window_at(40, 12), Some(a));
    }

    #[test]
    fn focused_clears_on_minimize_but_last_focused_stays() {
        let registry = RegistryHandle::new();
        registry.set_viewport(area());
        let a = registry.create_window(quick("a").with_start_open(true)).unwrap();
        assert_eq!(registry.focused(), Some(a.clone()));
        a.minimize();
        assert_eq!(registry.focused(), None);
        assert_eq!(registry.last_focused(), Some(a));
    }
}
