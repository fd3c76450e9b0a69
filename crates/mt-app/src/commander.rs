// ABOUTME: State of the one-line command entry shown over the terminal.
// ABOUTME: Collects text until Enter submits it or Escape cancels.

use mt_core::Position;

/// Command line overlay
#[derive(Debug, Clone)]
pub struct Commander {
    visible: bool,
    input: String,
    position: Position,
}

impl Commander {
    pub fn new(position: Position) -> Self {
        Self {
            visible: false,
            input: String::new(),
            position,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Show the command line with empty input
    pub fn show(&mut self) {
        self.visible = true;
        self.input.clear();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.input.clear();
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn push_str(&mut self, text: &str) {
        if self.visible {
            self.input.extend(text.chars().filter(|c| !c.is_control()));
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Take what was typed, unless blank. The line stays visible so the
    /// caller decides when to hide it.
    pub fn take_line(&mut self) -> Option<String> {
        if !self.visible {
            return None;
        }
        let line = std::mem::take(&mut self.input);
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }

    pub fn cancel(&mut self) {
        self.hide();
    }
}
