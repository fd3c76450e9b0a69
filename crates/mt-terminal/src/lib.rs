// ABOUTME: Terminal sessions and PTY handling.
// ABOUTME: Wraps alacritty_terminal behind the session capability trait.

pub mod session;
pub mod terminal;

pub use session::{EventSink, Session, SessionEvent, SessionEventKind, SessionFactory, SessionId, SpawnRequest};
pub use terminal::{PtyFactory, Terminal, TerminalError};
