//! Floating, draggable, minimizable windows for ratatui applications.
//!
//! A [`window::RegistryHandle`] owns every window's focus and stacking
//! order; [`bar::WindowBar`] and [`switcher::WindowSwitcher`] present the
//! registry, and [`runner::Desktop`] routes terminal input between them.

pub mod bar;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod keybindings;
pub mod layout;
pub mod menu;
pub mod runner;
pub mod switcher;
pub mod theme;
pub mod tracing_sub;
pub(crate) mod ui;
pub mod window;

pub use bar::{BarCommand, Dock, WindowBar};
pub use error::WmError;
pub use runner::{Desktop, DesktopApp, run_desktop};
pub use window::{RegistryHandle, WindowConfig, WindowMode, WindowRef, WindowSignal};
