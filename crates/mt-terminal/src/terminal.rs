// ABOUTME: Terminal session wrapping alacritty_terminal.
// ABOUTME: Spawns the PTY off the UI thread and forwards exit/title events.

use alacritty_terminal::event::{Event, EventListener, WindowSize};
use alacritty_terminal::event_loop::{EventLoop, EventLoopSender, Msg};
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::sync::FairMutex;
use alacritty_terminal::term::{Term, TermMode, SEMANTIC_ESCAPE_CHARS};
use alacritty_terminal::tty;
use alacritty_terminal::vte::ansi::{self, Rgb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mt_core::{CursorShape, TermColors};

use crate::session::{EventSink, Session, SessionEvent, SessionEventKind, SessionId, SessionFactory, SpawnRequest};

/// State of the connection to the PTY event loop
enum PtyLink {
    /// Spawn still running; input is buffered until the PTY exists
    Starting(Vec<u8>),
    Running(EventLoopSender),
    Failed,
}

impl PtyLink {
    fn send_input(&mut self, bytes: &[u8]) {
        match self {
            PtyLink::Starting(pending) => pending.extend_from_slice(bytes),
            PtyLink::Running(sender) => {
                let _ = sender.send(Msg::Input(bytes.to_vec().into()));
            }
            PtyLink::Failed => {}
        }
    }
}

/// Proxy for terminal events
#[derive(Clone)]
struct EventProxy {
    id: SessionId,
    exited: Arc<AtomicBool>,
    link: Arc<FairMutex<PtyLink>>,
    colors: Arc<FairMutex<Option<TermColors>>>,
    sink: EventSink,
}

impl EventListener for EventProxy {
    fn send_event(&self, event: Event) {
        match event {
            Event::Exit => {
                // Only the first exit is reported
                if !self.exited.swap(true, Ordering::SeqCst) {
                    self.sink.send(SessionEvent::new(self.id, SessionEventKind::Exited));
                }
            }
            Event::Title(title) => {
                self.sink.send(SessionEvent::new(self.id, SessionEventKind::TitleChanged(title)));
            }
            Event::ResetTitle => {
                self.sink
                    .send(SessionEvent::new(self.id, SessionEventKind::TitleChanged(String::new())));
            }
            Event::PtyWrite(text) => self.link.lock().send_input(text.as_bytes()),
            Event::ColorRequest(index, formatter) => {
                // Called with the terminal locked, so answer from our own copy
                let rgb = self.colors.lock().as_ref().and_then(|c| c.rgb_at(index));
                if let Some(rgb) = rgb {
                    let reply = (*formatter)(Rgb {
                        r: (rgb >> 16) as u8,
                        g: (rgb >> 8) as u8,
                        b: rgb as u8,
                    });
                    self.link.lock().send_input(reply.as_bytes());
                }
            }
            _ => {}
        }
    }
}

/// Simple size type that implements Dimensions
struct TermSize {
    columns: usize,
    lines: usize,
}

impl TermSize {
    fn new(columns: usize, lines: usize) -> Self {
        Self { columns, lines }
    }
}

impl Dimensions for TermSize {
    fn columns(&self) -> usize {
        self.columns
    }

    fn screen_lines(&self) -> usize {
        self.lines
    }

    fn total_lines(&self) -> usize {
        self.lines
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("Failed to create PTY: {0}")]
    PtyError(#[from] std::io::Error),
}

/// Terminal session with PTY and terminal state
pub struct Terminal {
    id: SessionId,
    term: Arc<FairMutex<Term<EventProxy>>>,
    term_config: alacritty_terminal::term::Config,
    link: Arc<FairMutex<PtyLink>>,
    colors: Arc<FairMutex<Option<TermColors>>>,
    focused: bool,
    font_size: u32,
}

impl Terminal {
    /// Create the terminal state now and start its process in the background.
    ///
    /// The outcome is reported through `sink` as a `Spawned` event.
    pub fn spawn(id: SessionId, request: SpawnRequest, sink: EventSink) -> Self {
        let columns = request.columns.max(1);
        let rows = request.rows.max(1);

        let link = Arc::new(FairMutex::new(PtyLink::Starting(Vec::new())));
        let colors = Arc::new(FairMutex::new(None));
        let event_proxy = EventProxy {
            id,
            exited: Arc::new(AtomicBool::new(false)),
            link: Arc::clone(&link),
            colors: Arc::clone(&colors),
            sink: sink.clone(),
        };

        let term_size = TermSize::new(columns as usize, rows as usize);
        let term_config = alacritty_terminal::term::Config {
            semantic_escape_chars: semantic_escape_chars(&request.word_chars),
            ..Default::default()
        };
        let term = Term::new(term_config.clone(), &term_size, event_proxy.clone());
        let term = Arc::new(FairMutex::new(term));

        let thread_term = Arc::clone(&term);
        let thread_link = Arc::clone(&link);
        let spawned = std::thread::Builder::new()
            .name(format!("pty-spawn-{}", id))
            .spawn(move || {
                let outcome = start_pty(id, &request, thread_term, event_proxy)
                    .map_err(|e| e.to_string());
                match &outcome {
                    Ok(pid) => tracing::info!("Session {} started (PID: {})", id, pid),
                    Err(e) => {
                        tracing::error!("Error starting session {}: {}", id, e);
                        *thread_link.lock() = PtyLink::Failed;
                    }
                }
                sink.send(SessionEvent::new(id, SessionEventKind::Spawned(outcome)));
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to start spawn thread for session {}: {}", id, e);
            *link.lock() = PtyLink::Failed;
        }

        Self {
            id,
            term,
            term_config,
            link,
            colors,
            focused: false,
            font_size: 0,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        let term = self.term.lock();
        let grid = term.grid();
        (grid.columns() as u16, grid.screen_lines() as u16)
    }
}

fn start_pty(
    id: SessionId,
    request: &SpawnRequest,
    term: Arc<FairMutex<Term<EventProxy>>>,
    event_proxy: EventProxy,
) -> Result<u32, TerminalError> {
    let shell = request
        .argv
        .split_first()
        .map(|(program, args)| tty::Shell::new(program.clone(), args.to_vec()));

    let pty_config = tty::Options {
        shell,
        working_directory: request.working_dir.clone(),
        drain_on_exit: true,
        env: request.env.clone(),
    };

    // The grid may have been resized while we were starting
    let (columns, rows) = {
        let term = term.lock();
        (term.grid().columns() as u16, term.grid().screen_lines() as u16)
    };
    let window_size = WindowSize {
        num_cols: columns,
        num_lines: rows,
        cell_width: 1,
        cell_height: 1,
    };

    let pty = tty::new(&pty_config, window_size, id)?;
    let pid = pty.child().id();

    let link = Arc::clone(&event_proxy.link);
    let event_loop = EventLoop::new(term, event_proxy, pty, pty_config.drain_on_exit, false)?;
    let sender = event_loop.channel();

    {
        let mut link = link.lock();
        if let PtyLink::Starting(pending) = &mut *link {
            if !pending.is_empty() {
                let _ = sender.send(Msg::Input(std::mem::take(pending).into()));
            }
        }
        *link = PtyLink::Running(sender);
    }

    event_loop.spawn();
    Ok(pid)
}

/// Word-breaking characters for selection: alacritty's defaults minus the
/// characters configured as part of words
fn semantic_escape_chars(word_chars: &str) -> String {
    SEMANTIC_ESCAPE_CHARS
        .chars()
        .filter(|c| !word_chars.contains(*c))
        .collect()
}

fn ansi_cursor_shape(shape: CursorShape) -> ansi::CursorShape {
    match shape {
        CursorShape::Block => ansi::CursorShape::Block,
        CursorShape::IBeam => ansi::CursorShape::Beam,
        CursorShape::Underline => ansi::CursorShape::Underline,
    }
}

/// Bytes to write for a paste, honoring bracketed paste mode
fn paste_payload(text: &str, bracketed: bool) -> Vec<u8> {
    if bracketed {
        // Strip ESC so the pasted text cannot end the bracket early
        let body = text.replace('\x1b', "");
        let mut bytes = Vec::with_capacity(body.len() + 12);
        bytes.extend_from_slice(b"\x1b[200~");
        bytes.extend_from_slice(body.as_bytes());
        bytes.extend_from_slice(b"\x1b[201~");
        bytes
    } else {
        text.replace("\r\n", "\r").replace('\n', "\r").into_bytes()
    }
}

impl Session for Terminal {
    fn feed_text(&mut self, bytes: &[u8]) {
        self.link.lock().send_input(bytes);
    }

    fn copy_selection(&mut self) -> Option<String> {
        self.term.lock().selection_to_string()
    }

    fn paste(&mut self, text: &str) {
        let bracketed = self.term.lock().mode().contains(TermMode::BRACKETED_PASTE);
        let payload = paste_payload(text, bracketed);
        self.feed_text(&payload);
    }

    fn set_font(&mut self, family: &str, size: u32) {
        tracing::debug!("Session {} font: {} {}", self.id, family, size);
        self.font_size = size;
    }

    fn font_size(&self) -> u32 {
        self.font_size
    }

    fn set_colors(&mut self, colors: &TermColors) {
        *self.colors.lock() = Some(colors.clone());
    }

    fn set_cursor_shape(&mut self, shape: CursorShape) {
        let shape = ansi_cursor_shape(shape);
        if self.term_config.default_cursor_style.shape == shape {
            return;
        }
        self.term_config.default_cursor_style.shape = shape;
        self.term.lock().set_options(self.term_config.clone());
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        let columns = columns.max(1);
        let rows = rows.max(1);
        if self.size() == (columns, rows) {
            return;
        }

        let window_size = WindowSize {
            num_cols: columns,
            num_lines: rows,
            cell_width: 1,
            cell_height: 1,
        };

        if let PtyLink::Running(sender) = &*self.link.lock() {
            let _ = sender.send(Msg::Resize(window_size));
        }
        self.term.lock().resize(TermSize::new(columns as usize, rows as usize));
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        self.term.lock().is_focused = focused;
    }

    fn has_focus(&self) -> bool {
        self.focused
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let PtyLink::Running(sender) = &*self.link.lock() {
            let _ = sender.send(Msg::Shutdown);
        }
        tracing::debug!("Session {} destroyed", self.id);
    }
}

/// Spawns alacritty-backed sessions that report to one event sink
pub struct PtyFactory {
    sink: EventSink,
}

impl PtyFactory {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl SessionFactory for PtyFactory {
    fn spawn(&mut self, id: SessionId, request: SpawnRequest) -> Box<dyn Session> {
        tracing::info!("Spawning session {} ({}x{})", id, request.columns, request.rows);
        Box::new(Terminal::spawn(id, request, self.sink.clone()))
    }
}
