// ABOUTME: Textual actions shared by hotkeys and the command line.
// ABOUTME: Parses "verb [args]" into a typed Action.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copy,
    Paste,
    Reload,
    Quit,
    FontInc,
    FontDec,
    FontReset,
    /// Split the focused pane, new pane on top
    SplitV,
    /// Split the focused pane, new pane on the left
    SplitH,
    /// Split the focused pane, new pane below
    SplitDown,
    /// Split the focused pane, new pane on the right
    SplitRight,
    NewTab,
    Next,
    Prev,
    Close,
    /// Type the tokens into the focused session, then Enter
    Exec(Vec<String>),
    /// Activate tab `n` (1-based)
    Goto(i32),
    /// Toggle the command line
    Cmd,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown action {0:?}")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument {value:?} for {verb}")]
    InvalidArgument { verb: &'static str, value: String },
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Copy => "copy",
            Action::Paste => "paste",
            Action::Reload => "reload",
            Action::Quit => "quit",
            Action::FontInc => "font_inc",
            Action::FontDec => "font_dec",
            Action::FontReset => "font_reset",
            Action::SplitV => "split_v",
            Action::SplitH => "split_h",
            Action::SplitDown => "split_down",
            Action::SplitRight => "split_right",
            Action::NewTab => "new_tab",
            Action::Next => "next",
            Action::Prev => "prev",
            Action::Close => "close",
            Action::Exec(_) => "exec",
            Action::Goto(_) => "goto",
            Action::Cmd => "cmd",
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    /// Words are split on whitespace. Verbs without arguments ignore
    /// anything after them.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ActionError::Empty)?;

        let action = match verb {
            "copy" => Action::Copy,
            "paste" => Action::Paste,
            "reload" => Action::Reload,
            "quit" => Action::Quit,
            "font_inc" => Action::FontInc,
            "font_dec" => Action::FontDec,
            "font_reset" => Action::FontReset,
            "split_v" => Action::SplitV,
            "split_h" => Action::SplitH,
            "split_down" => Action::SplitDown,
            "split_right" => Action::SplitRight,
            "new_tab" => Action::NewTab,
            "next" => Action::Next,
            "prev" => Action::Prev,
            "close" => Action::Close,
            "cmd" => Action::Cmd,
            "exec" => {
                let tokens: Vec<String> = words.map(str::to_string).collect();
                if tokens.is_empty() {
                    return Err(ActionError::MissingArgument("exec"));
                }
                Action::Exec(tokens)
            }
            "goto" => {
                let arg = words.next().ok_or(ActionError::MissingArgument("goto"))?;
                let n = arg.parse::<i32>().map_err(|_| ActionError::InvalidArgument {
                    verb: "goto",
                    value: arg.to_string(),
                })?;
                Action::Goto(n)
            }
            other => return Err(ActionError::Unknown(other.to_string())),
        };
        Ok(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Exec(tokens) => write!(f, "exec {}", tokens.join(" ")),
            Action::Goto(n) => write!(f, "goto {}", n),
            other => f.write_str(other.verb()),
        }
    }
}
