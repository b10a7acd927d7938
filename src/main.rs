use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent};
use indoc::indoc;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use term_window::bar::Dock;
use term_window::drivers::{ConsoleInputDriver, ConsoleOutputDriver, OutputDriver};
use term_window::keybindings::{KeyBindings, parse_key};
use term_window::layout::{Horizontal, Vertical};
use term_window::runner::{Desktop, DesktopApp, run_desktop};
use term_window::tracing_sub::{self, LogTarget};
use term_window::window::{RegistryHandle, WindowConfig, WindowMode, WindowRef, WindowSignal};

#[derive(Debug, Parser)]
#[command(
    name = "term-window",
    about = "Floating terminal windows with a taskbar",
    long_about = indoc! {"
        Opens a desktop of floating windows. Drag a title bar to move a window,
        drag the bottom-right grip to resize it, and use the bar to restore
        minimized windows. Right-click a bar button for per-window actions or
        the empty bar for global ones.

        Keys: Ctrl+W close, Ctrl+D minimize, F1 window switcher,
        Ctrl+B toggle the bar, Ctrl+Q quit.
    "}
)]
struct Args {
    /// Number of demo windows to open.
    #[arg(long, default_value_t = 3)]
    windows: usize,

    /// Skip fade animations.
    #[arg(long)]
    no_animation: bool,

    /// Where the window bar sits.
    #[arg(long, value_enum, default_value_t = Dock::Bottom)]
    dock: Dock,

    /// Write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Key that opens and cycles the window switcher.
    #[arg(long, default_value = "f1", value_parser = parse_switcher_key)]
    switcher_key: KeyCode,
}

fn parse_switcher_key(value: &str) -> Result<KeyCode, String> {
    parse_key(value).ok_or_else(|| format!("unknown key `{value}`"))
}

const PLACEMENTS: [(Horizontal, Vertical); 5] = [
    (Horizontal::Center, Vertical::Middle),
    (Horizontal::Left, Vertical::Top),
    (Horizontal::Right, Vertical::Top),
    (Horizontal::Left, Vertical::Bottom),
    (Horizontal::Right, Vertical::Bottom),
];

#[derive(Default)]
struct Demo {
    typed: BTreeMap<String, String>,
    last_signal: Option<String>,
}

impl DesktopApp for Demo {
    fn render_content(&mut self, buffer: &mut Buffer, window: &WindowRef, area: Rect, focused: bool) {
        let id = window.id();
        let size = window.size();
        let mut lines = vec![
            format!("id: {id}"),
            format!("size: {size}"),
            format!("snapped: {}", window.is_snapped()),
        ];
        if let Some(text) = self.typed.get(id.as_str()) {
            lines.push(format!("> {text}"));
        } else if focused {
            lines.push("> type here".to_string());
        }
        if let Some(signal) = &self.last_signal {
            lines.push(signal.clone());
        }
        for (row, line) in lines.iter().enumerate().take(area.height as usize) {
            let text: String = line.chars().take(area.width as usize).collect();
            buffer.set_string(area.x, area.y + row as u16, text, Style::default());
        }
    }

    fn handle_key(&mut self, window: Option<&WindowRef>, key: &KeyEvent) -> bool {
        let Some(window) = window else {
            return false;
        };
        let entry = self.typed.entry(window.id().to_string()).or_default();
        match key.code {
            KeyCode::Char(c) => entry.push(c),
            KeyCode::Backspace => {
                entry.pop();
            }
            _ => return false,
        }
        true
    }

    fn on_signal(&mut self, signal: &WindowSignal) {
        self.last_signal = Some(format!("{signal:?}"));
    }
}

fn build_windows(registry: &RegistryHandle, args: &Args) -> io::Result<()> {
    for idx in 0..args.windows {
        let (horizontal, vertical) = PLACEMENTS[idx % PLACEMENTS.len()];
        let mut config = WindowConfig::new(format!("window-{}", idx + 1))
            .with_placement(horizontal, vertical)
            .with_start_open(true)
            .with_animated(!args.no_animation)
            .with_menu_option("Reset", |w: &WindowRef| w.reset())
            .with_menu_option("Toggle snap", |w: &WindowRef| w.toggle_snap());
        if idx == 0 {
            config = config.with_mode(WindowMode::Permanent).with_icon("*");
        }
        registry.create_window(config).map_err(io::Error::other)?;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let log_target = match &args.log_file {
        Some(path) => LogTarget::File(path.clone()),
        None => LogTarget::Off,
    };
    tracing_sub::init_default(&log_target)?;

    let registry = RegistryHandle::new();
    build_windows(&registry, &args)?;
    let mut desktop = Desktop::new(registry, KeyBindings::with_switcher_key(args.switcher_key))
        .with_bar(args.dock)
        .map_err(io::Error::other)?;

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut driver = ConsoleInputDriver::new();
    let mut demo = Demo::default();

    let result = run_desktop::<_, _, _, io::Error>(
        output.terminal_mut(),
        &mut driver,
        &mut desktop,
        &mut demo,
        Duration::from_millis(16),
    );

    output.exit()?;
    result
}
