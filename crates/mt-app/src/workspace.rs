// ABOUTME: Application context tying the layout tree to live sessions.
// ABOUTME: Spawns, focuses, resizes and destroys sessions as the layout changes.

use std::collections::HashMap;
use std::path::PathBuf;

use mt_core::{Config, HotkeyTable};
use mt_layout::{LayoutError, LayoutTree, Orientation, PaneId, Placement, Rect, Removal};
use mt_terminal::{Session, SessionEvent, SessionEventKind, SessionFactory, SpawnRequest};

use crate::clipboard::Clipboard;
use crate::commander::Commander;

pub const DEFAULT_TITLE: &str = "µterm";

/// Process settings shared by every session the workspace spawns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTemplate {
    pub working_dir: Option<PathBuf>,
    /// Empty means the user's login shell
    pub argv: Vec<String>,
}

impl SessionTemplate {
    /// Run `command` through `$SHELL -c` when given, otherwise a plain shell
    pub fn new(working_dir: Option<PathBuf>, command: Option<&str>) -> Self {
        let argv = match command {
            Some(command) => vec![user_shell(), "-c".to_string(), command.to_string()],
            None => Vec::new(),
        };
        Self { working_dir, argv }
    }
}

fn user_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|shell| !shell.is_empty())
        .unwrap_or_else(|| "/bin/sh".to_string())
}

pub struct Workspace {
    pub(crate) layout: LayoutTree,
    pub(crate) sessions: HashMap<PaneId, Box<dyn Session>>,
    factory: Box<dyn SessionFactory>,
    pub(crate) config: Config,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) hotkeys: HotkeyTable,
    pub(crate) commander: Commander,
    pub(crate) clipboard: Clipboard,
    template: SessionTemplate,
    /// Window size in character cells
    grid: (u16, u16),
    fixed_title: Option<String>,
    session_title: Option<String>,
    pub(crate) quit_requested: bool,
}

impl Workspace {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        factory: Box<dyn SessionFactory>,
        clipboard: Clipboard,
    ) -> Self {
        let hotkeys = HotkeyTable::from_bindings(&config.hotkeys);
        let commander = Commander::new(config.commander_position);
        Self {
            layout: LayoutTree::new(),
            sessions: HashMap::new(),
            factory,
            config,
            config_path,
            hotkeys,
            commander,
            clipboard,
            template: SessionTemplate::default(),
            grid: (80, 24),
            fixed_title: None,
            session_title: None,
            quit_requested: false,
        }
    }

    pub fn with_template(mut self, template: SessionTemplate) -> Self {
        self.template = template;
        self
    }

    /// Keep the window title fixed instead of following the sessions
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.fixed_title = title;
        self
    }

    /// Open the first tab
    pub fn start(&mut self) -> PaneId {
        tracing::info!("Starting workspace ({}x{} cells)", self.grid.0, self.grid.1);
        self.add_tab()
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn commander(&self) -> &Commander {
        &self.commander
    }

    pub fn commander_mut(&mut self) -> &mut Commander {
        &mut self.commander
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// True once quit was requested or the last session is gone
    pub fn should_quit(&self) -> bool {
        self.quit_requested || self.layout.is_empty()
    }

    pub fn title(&self) -> &str {
        self.fixed_title
            .as_deref()
            .or(self.session_title.as_deref())
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Title for the window: the command line while it is open, otherwise
    /// the session title, prefixed with the tab position when the tab bar
    /// would be shown
    pub fn window_title(&self) -> String {
        if self.commander.visible() {
            return format!(":{}", self.commander.input());
        }
        match self.layout.active_index() {
            Some(active) if self.layout.tabs_visible() => {
                format!("[{}/{}] {}", active + 1, self.layout.tab_count(), self.title())
            }
            _ => self.title().to_string(),
        }
    }

    /// Send typed bytes to the focused session
    pub fn feed_focused(&mut self, bytes: &[u8]) {
        if let Some(session) = self.focused_session_mut() {
            session.feed_text(bytes);
        }
    }

    pub(crate) fn focused_session_mut(&mut self) -> Option<&mut dyn Session> {
        let pane = self.layout.focused_pane()?;
        match self.sessions.get_mut(&pane) {
            Some(session) => Some(session.as_mut()),
            None => None,
        }
    }

    /// Resize every visible session to the new window grid
    pub fn set_grid(&mut self, columns: u16, rows: u16) {
        self.grid = (columns.max(1), rows.max(1));
        self.relayout();
    }

    pub fn add_tab(&mut self) -> PaneId {
        let pane = self.layout.add_tab();
        self.spawn_session(pane);
        self.layout_changed();
        pane
    }

    /// Split the focused pane; the new session takes focus
    pub fn split(&mut self, orientation: Orientation) -> Result<PaneId, LayoutError> {
        self.split_placed(orientation, Placement::Before)
    }

    pub fn split_placed(&mut self, orientation: Orientation, placement: Placement) -> Result<PaneId, LayoutError> {
        let target = self.layout.focused_pane().ok_or(LayoutError::NoFocus)?;
        let pane = self.layout.split_placed(target, orientation, placement)?;
        self.spawn_session(pane);
        self.layout_changed();
        Ok(pane)
    }

    /// Close the active tab and destroy its sessions; refused on the last tab
    pub fn close_active_tab(&mut self) -> bool {
        let Some(closed) = self.layout.close_active_tab() else {
            tracing::debug!("Refusing to close the last tab");
            return false;
        };
        for pane in closed {
            self.sessions.remove(&pane);
        }
        self.layout_changed();
        true
    }

    pub fn goto_tab(&mut self, n: i32) -> Result<(), LayoutError> {
        self.layout.goto_tab(n)?;
        self.layout_changed();
        Ok(())
    }

    pub fn next_tab(&mut self) {
        if self.layout.next_tab() {
            self.layout_changed();
        }
    }

    pub fn prev_tab(&mut self) {
        if self.layout.prev_tab() {
            self.layout_changed();
        }
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        let pane = PaneId(event.session);
        match event.kind {
            SessionEventKind::Spawned(Ok(pid)) => {
                tracing::debug!("Pane {:?} running PID {}", pane, pid);
            }
            SessionEventKind::Spawned(Err(e)) => {
                // The pane stays in the layout without a process
                tracing::warn!("Pane {:?} failed to start: {}", pane, e);
            }
            SessionEventKind::Exited => self.pane_exited(pane),
            SessionEventKind::TitleChanged(title) => {
                if self.sessions.contains_key(&pane) {
                    self.session_title = Some(title);
                }
            }
            SessionEventKind::FocusGained => match self.layout.set_focus(pane) {
                Ok(()) => self.layout_changed(),
                Err(e) => tracing::debug!("Ignoring focus event: {}", e),
            },
        }
    }

    fn pane_exited(&mut self, pane: PaneId) {
        self.sessions.remove(&pane);
        match self.layout.remove_pane(pane) {
            Removal::NotFound => tracing::trace!("Exit of unknown pane {:?}", pane),
            Removal::Collapsed { focus } | Removal::TabClosed { focus } => {
                tracing::info!(
                    "Pane {:?} exited, focus on {:?}, {} sessions left",
                    pane,
                    focus,
                    self.session_count()
                );
                self.layout_changed();
            }
            Removal::Empty => tracing::info!("Last pane exited"),
        }
    }

    fn spawn_session(&mut self, pane: PaneId) {
        let (columns, rows) = self
            .layout
            .pane_rects()
            .get(&pane)
            .map(|rect| cells(rect, self.grid))
            .unwrap_or(self.grid);

        let mut env = HashMap::new();
        env.insert("LANG".to_string(), self.config.locale.clone());

        let request = SpawnRequest {
            working_dir: self.template.working_dir.clone(),
            argv: self.template.argv.clone(),
            env,
            columns,
            rows,
            word_chars: self.config.word_chars.clone(),
        };
        let mut session = self.factory.spawn(pane.0, request);
        apply_settings(session.as_mut(), &self.config);
        self.sessions.insert(pane, session);
    }

    /// Bring focus flags and sizes in line with the layout
    pub(crate) fn layout_changed(&mut self) {
        self.sync_focus();
        self.relayout();
    }

    fn sync_focus(&mut self) {
        let focused = self.layout.focused_pane();
        for (pane, session) in self.sessions.iter_mut() {
            let wanted = Some(*pane) == focused;
            if session.has_focus() != wanted {
                session.set_focus(wanted);
            }
        }
    }

    fn relayout(&mut self) {
        for (pane, rect) in self.layout.pane_rects() {
            if let Some(session) = self.sessions.get_mut(&pane) {
                let (columns, rows) = cells(&rect, self.grid);
                session.resize(columns, rows);
            }
        }
    }

    /// Re-read the config file and apply it to hotkeys and the focused session.
    ///
    /// A missing or unreadable file leaves everything unchanged.
    pub fn reload(&mut self) -> bool {
        let Some(path) = self.config_path.clone() else {
            tracing::warn!("No config file to reload");
            return false;
        };
        let config = match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Reload failed: {}", e);
                return false;
            }
        };

        self.hotkeys = HotkeyTable::from_bindings(&config.hotkeys);
        self.commander.set_position(config.commander_position);
        self.config = config;
        if let Some(pane) = self.layout.focused_pane() {
            if let Some(session) = self.sessions.get_mut(&pane) {
                apply_settings(session.as_mut(), &self.config);
            }
        }
        tracing::info!("Reloaded config from {}", path.display());
        true
    }
}

/// Font, colors and cursor shape from the config
fn apply_settings(session: &mut dyn Session, config: &Config) {
    session.set_font(&config.font_family, config.font_size);
    session.set_colors(&config.term_colors());
    session.set_cursor_shape(config.cursor_shape);
}

/// Cell size of a normalized pane rectangle
fn cells(rect: &Rect, grid: (u16, u16)) -> (u16, u16) {
    let columns = (rect.width * grid.0 as f32).floor() as u16;
    let rows = (rect.height * grid.1 as f32).floor() as u16;
    (columns.max(1), rows.max(1))
}
