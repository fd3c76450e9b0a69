// ABOUTME: The capability set a terminal session offers to the layout core.
// ABOUTME: Defines spawn requests and the notifications sessions emit.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use mt_core::{CursorShape, TermColors};

/// Matches the layout's pane id; one session per pane
pub type SessionId = u64;

/// Everything needed to start the process behind a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnRequest {
    pub working_dir: Option<PathBuf>,
    /// Program followed by its arguments; empty runs the default shell
    pub argv: Vec<String>,
    /// Extra environment on top of the inherited one
    pub env: HashMap<String, String>,
    pub columns: u16,
    pub rows: u16,
    /// Characters besides alphanumerics that belong to a word when selecting
    pub word_chars: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    /// Async spawn completion: child pid or the failure message
    Spawned(Result<u32, String>),
    /// The child process is gone
    Exited,
    TitleChanged(String),
    FocusGained,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn new(session: SessionId, kind: SessionEventKind) -> Self {
        Self { session, kind }
    }
}

/// Where sessions post their notifications; called from background threads
#[derive(Clone)]
pub struct EventSink(Arc<dyn Fn(SessionEvent) + Send + Sync>);

impl EventSink {
    pub fn new(f: impl Fn(SessionEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn send(&self, event: SessionEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventSink")
    }
}

/// One running shell and its surface. Dropping a session destroys it.
pub trait Session {
    /// Write bytes to the process as if typed
    fn feed_text(&mut self, bytes: &[u8]);

    /// Current selection text, if any
    fn copy_selection(&mut self) -> Option<String>;

    fn paste(&mut self, text: &str);

    fn set_font(&mut self, family: &str, size: u32);

    fn font_size(&self) -> u32;

    fn set_colors(&mut self, colors: &TermColors);

    fn set_cursor_shape(&mut self, shape: CursorShape);

    fn resize(&mut self, columns: u16, rows: u16);

    fn set_focus(&mut self, focused: bool);

    fn has_focus(&self) -> bool;
}

/// Creates sessions. `spawn` must return at once; the outcome arrives
/// later as a `Spawned` notification.
pub trait SessionFactory {
    fn spawn(&mut self, id: SessionId, request: SpawnRequest) -> Box<dyn Session>;
}
