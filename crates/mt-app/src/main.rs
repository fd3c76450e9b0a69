// ABOUTME: Main entry point for microterm.
// ABOUTME: Sets up the window and routes input and session events to the workspace.

mod action;
mod cli;
mod clipboard;
mod commander;
mod dispatch;
mod keys;
#[cfg(test)]
mod testing;
mod workspace;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use mt_core::{canonical_chord, Config};
use mt_terminal::{EventSink, PtyFactory, SessionEvent};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::cli::Cli;
use crate::clipboard::Clipboard;
use crate::dispatch::Dispatch;
use crate::workspace::{SessionTemplate, Workspace};

/// Pixel size of one character cell at scale 1.0
const CELL_WIDTH: f64 = 8.0;
const CELL_HEIGHT: f64 = 16.0;

struct App {
    window: Option<Arc<Window>>,
    workspace: Workspace,
    modifiers: ModifiersState,
}

impl App {
    fn new(workspace: Workspace) -> Self {
        Self {
            window: None,
            workspace,
            modifiers: ModifiersState::empty(),
        }
    }

    fn grid_size(&self, size: PhysicalSize<u32>) -> (u16, u16) {
        let scale = self.window.as_ref().map(|w| w.scale_factor()).unwrap_or(1.0);
        let columns = (size.width as f64 / (CELL_WIDTH * scale)).floor();
        let rows = (size.height as f64 / (CELL_HEIGHT * scale)).floor();
        (columns.clamp(1.0, u16::MAX as f64) as u16, rows.clamp(1.0, u16::MAX as f64) as u16)
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if self.workspace.commander().visible() {
            self.handle_commander_key(event);
            return;
        }

        // Modifier-only presses have no name and are dropped
        let Some(name) = keys::key_name(&event.logical_key, event.location) else {
            return;
        };
        let mods = keys::modifiers(self.modifiers);
        let chord = canonical_chord(mods, &name);
        if self.workspace.handle_chord(&chord) == Dispatch::Handled {
            return;
        }

        if let Some(bytes) = keys::key_to_bytes(&event.logical_key, mods) {
            self.workspace.feed_focused(&bytes);
        }
    }

    fn handle_commander_key(&mut self, event: &KeyEvent) {
        match &event.logical_key {
            Key::Named(NamedKey::Enter) => {
                self.workspace.submit_command();
            }
            Key::Named(NamedKey::Escape) => self.workspace.commander_mut().cancel(),
            Key::Named(NamedKey::Backspace) => self.workspace.commander_mut().backspace(),
            _ => {
                if let Some(text) = &event.text {
                    self.workspace.commander_mut().push_str(text);
                }
            }
        }
    }

    /// Reflect workspace state on the window and stop when it is done
    fn sync_window(&mut self, event_loop: &ActiveEventLoop) {
        if self.workspace.should_quit() {
            tracing::info!("All sessions closed, exiting");
            event_loop.exit();
            return;
        }
        let title = self.workspace.window_title();
        if let Some(window) = &self.window {
            if window.title() != title {
                window.set_title(&title);
            }
        }
    }
}

impl ApplicationHandler<SessionEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.workspace.title())
            .with_inner_size(LogicalSize::new(80.0 * CELL_WIDTH, 24.0 * CELL_HEIGHT));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let physical_size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            physical_size.width,
            physical_size.height,
            window.scale_factor()
        );
        self.window = Some(window);

        let (columns, rows) = self.grid_size(physical_size);
        self.workspace.set_grid(columns, rows);
        if self.workspace.layout().is_empty() {
            self.workspace.start();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: SessionEvent) {
        self.workspace.handle_session_event(event);
        self.sync_window(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(new_size) => {
                let (columns, rows) = self.grid_size(new_size);
                self.workspace.set_grid(columns, rows);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    self.handle_key(&event);
                }
            }
            _ => {}
        }
        self.sync_window(event_loop);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    tracing::info!("Starting microterm");

    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };

    let event_loop = EventLoop::<SessionEvent>::with_user_event().build()?;

    // Sessions report from their own threads; the proxy wakes the UI loop
    let proxy = Mutex::new(event_loop.create_proxy());
    let sink = EventSink::new(move |event| {
        if let Ok(proxy) = proxy.lock() {
            if proxy.send_event(event).is_err() {
                tracing::debug!("Event loop closed, dropping session event");
            }
        }
    });

    let template = SessionTemplate::new(cli.workdir, cli.command.as_deref());
    let workspace = Workspace::new(
        config,
        config_path,
        Box::new(PtyFactory::new(sink)),
        Clipboard::system(),
    )
    .with_template(template)
    .with_title(cli.title);

    let mut app = App::new(workspace);
    event_loop.run_app(&mut app)?;

    Ok(())
}
