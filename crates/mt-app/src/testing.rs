// ABOUTME: In-memory sessions for exercising the workspace without a PTY.
// ABOUTME: Every fake records what it was asked to do into a shared log.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use mt_core::{Config, CursorShape, TermColors};
use mt_layout::PaneId;
use mt_terminal::{Session, SessionFactory, SessionId, SpawnRequest};

use crate::clipboard::Clipboard;
use crate::workspace::Workspace;

#[derive(Debug, Default)]
pub struct SessionLog {
    pub fed: Vec<String>,
    pub pasted: Vec<String>,
    pub selection: Option<String>,
    pub font: (String, u32),
    pub colors: Option<TermColors>,
    pub cursor_shape: Option<CursorShape>,
    pub size: (u16, u16),
    pub focused: bool,
    pub alive: bool,
}

struct FakeSession {
    log: Rc<RefCell<SessionLog>>,
}

impl Session for FakeSession {
    fn feed_text(&mut self, bytes: &[u8]) {
        self.log
            .borrow_mut()
            .fed
            .push(String::from_utf8_lossy(bytes).into_owned());
    }

    fn copy_selection(&mut self) -> Option<String> {
        self.log.borrow().selection.clone()
    }

    fn paste(&mut self, text: &str) {
        self.log.borrow_mut().pasted.push(text.to_string());
    }

    fn set_font(&mut self, family: &str, size: u32) {
        self.log.borrow_mut().font = (family.to_string(), size);
    }

    fn font_size(&self) -> u32 {
        self.log.borrow().font.1
    }

    fn set_colors(&mut self, colors: &TermColors) {
        self.log.borrow_mut().colors = Some(colors.clone());
    }

    fn set_cursor_shape(&mut self, shape: CursorShape) {
        self.log.borrow_mut().cursor_shape = Some(shape);
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        self.log.borrow_mut().size = (columns, rows);
    }

    fn set_focus(&mut self, focused: bool) {
        self.log.borrow_mut().focused = focused;
    }

    fn has_focus(&self) -> bool {
        self.log.borrow().focused
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.log.borrow_mut().alive = false;
    }
}

/// Handle onto every session a fake factory created
#[derive(Clone, Default)]
pub struct Spawned {
    logs: Rc<RefCell<BTreeMap<SessionId, Rc<RefCell<SessionLog>>>>>,
    requests: Rc<RefCell<Vec<SpawnRequest>>>,
}

impl Spawned {
    pub fn log(&self, pane: PaneId) -> Rc<RefCell<SessionLog>> {
        Rc::clone(&self.logs.borrow()[&pane.0])
    }

    pub fn requests(&self) -> Vec<SpawnRequest> {
        self.requests.borrow().clone()
    }
}

struct FakeFactory {
    spawned: Spawned,
}

impl SessionFactory for FakeFactory {
    fn spawn(&mut self, id: SessionId, request: SpawnRequest) -> Box<dyn Session> {
        let log = Rc::new(RefCell::new(SessionLog {
            size: (request.columns, request.rows),
            alive: true,
            ..Default::default()
        }));
        self.spawned.logs.borrow_mut().insert(id, Rc::clone(&log));
        self.spawned.requests.borrow_mut().push(request);
        Box::new(FakeSession { log })
    }
}

/// Workspace with default config, fake sessions and a detached clipboard
pub fn fake_workspace() -> (Workspace, Spawned) {
    fake_workspace_with(Config::default(), None)
}

pub fn fake_workspace_with(config: Config, path: Option<std::path::PathBuf>) -> (Workspace, Spawned) {
    let spawned = Spawned::default();
    let factory = FakeFactory {
        spawned: spawned.clone(),
    };
    let workspace = Workspace::new(config, path, Box::new(factory), Clipboard::detached());
    (workspace, spawned)
}
