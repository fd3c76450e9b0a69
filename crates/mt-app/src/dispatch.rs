// ABOUTME: Runs actions against the workspace.
// ABOUTME: Entry points for hotkey chords, action strings and the command line.

use mt_layout::{Orientation, Placement};

use crate::action::Action;
use crate::workspace::Workspace;

/// Whether an input was consumed; unhandled keys go on to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    NotHandled,
}

impl Dispatch {
    fn from_bool(handled: bool) -> Self {
        if handled {
            Dispatch::Handled
        } else {
            Dispatch::NotHandled
        }
    }
}

impl Workspace {
    /// Look up a canonical chord and run its action
    pub fn handle_chord(&mut self, chord: &str) -> Dispatch {
        let Some(action) = self.hotkeys.lookup(chord).map(str::to_string) else {
            return Dispatch::NotHandled;
        };
        tracing::debug!("Hotkey {} -> {}", chord, action);
        self.dispatch_str(&action)
    }

    /// Run what was typed into the command line, then hide it
    pub fn submit_command(&mut self) -> Dispatch {
        let result = match self.commander.take_line() {
            Some(line) => self.dispatch_str(&line),
            None => Dispatch::NotHandled,
        };
        self.commander.hide();
        result
    }

    pub fn dispatch_str(&mut self, line: &str) -> Dispatch {
        match line.parse::<Action>() {
            Ok(action) => self.dispatch(&action),
            Err(e) => {
                tracing::warn!("Cannot run {:?}: {}", line, e);
                Dispatch::NotHandled
            }
        }
    }

    pub fn dispatch(&mut self, action: &Action) -> Dispatch {
        tracing::debug!("Dispatching {}", action);
        match action {
            Action::Copy => {
                let text = self.focused_session_mut().and_then(|s| s.copy_selection());
                if let Some(text) = text {
                    self.clipboard.set_text(&text);
                }
                Dispatch::Handled
            }
            Action::Paste => {
                if let Some(text) = self.clipboard.get_text() {
                    if let Some(session) = self.focused_session_mut() {
                        session.paste(&text);
                    }
                }
                Dispatch::Handled
            }
            Action::Reload => {
                self.reload();
                Dispatch::Handled
            }
            Action::Quit => {
                tracing::info!("Quit requested");
                self.quit_requested = true;
                Dispatch::Handled
            }
            Action::FontInc => self.change_font_size(|size| size.saturating_add(1)),
            Action::FontDec => self.change_font_size(|size| size.saturating_sub(1).max(1)),
            Action::FontReset => {
                let default = self.config.font_size;
                self.change_font_size(|_| default)
            }
            Action::SplitV => Dispatch::from_bool(self.split(Orientation::Vertical).is_ok()),
            Action::SplitH => Dispatch::from_bool(self.split(Orientation::Horizontal).is_ok()),
            Action::SplitDown => Dispatch::from_bool(
                self.split_placed(Orientation::Vertical, Placement::After).is_ok(),
            ),
            Action::SplitRight => Dispatch::from_bool(
                self.split_placed(Orientation::Horizontal, Placement::After).is_ok(),
            ),
            Action::NewTab => {
                self.add_tab();
                Dispatch::Handled
            }
            Action::Next => {
                self.next_tab();
                Dispatch::Handled
            }
            Action::Prev => {
                self.prev_tab();
                Dispatch::Handled
            }
            Action::Close => {
                self.close_active_tab();
                Dispatch::Handled
            }
            Action::Exec(tokens) => self.exec(tokens),
            Action::Goto(n) => match self.goto_tab(*n) {
                Ok(()) => Dispatch::Handled,
                Err(e) => {
                    tracing::warn!("goto {}: {}", n, e);
                    Dispatch::NotHandled
                }
            },
            Action::Cmd => {
                self.commander.toggle();
                tracing::debug!(
                    "Command line {} ({:?})",
                    if self.commander.visible() { "shown" } else { "hidden" },
                    self.commander.position()
                );
                Dispatch::Handled
            }
        }
    }

    /// Type each token followed by a space, then Enter
    fn exec(&mut self, tokens: &[String]) -> Dispatch {
        if tokens.is_empty() {
            return Dispatch::NotHandled;
        }
        let Some(session) = self.focused_session_mut() else {
            return Dispatch::NotHandled;
        };
        for token in tokens {
            session.feed_text(token.as_bytes());
            session.feed_text(b" ");
        }
        session.feed_text(b"\n");
        Dispatch::Handled
    }

    fn change_font_size(&mut self, f: impl FnOnce(u32) -> u32) -> Dispatch {
        let family = self.config.font_family.clone();
        let Some(session) = self.focused_session_mut() else {
            return Dispatch::NotHandled;
        };
        let size = f(session.font_size());
        session.set_font(&family, size);
        Dispatch::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_workspace, fake_workspace_with};
    use mt_core::{canonical_chord, Config, CursorShape, Modifiers};
    use mt_layout::{Node, PaneId};
    use mt_terminal::{SessionEvent, SessionEventKind};

    fn ctrl_shift(key: &str) -> String {
        let mods = Modifiers {
            control: true,
            shift: true,
            ..Default::default()
        };
        canonical_chord(mods, key)
    }

    #[test]
    fn split_then_exit_restores_single_pane() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();

        assert_eq!(ws.dispatch_str("split_v"), Dispatch::Handled);
        let b = ws.layout().focused_pane().unwrap();
        assert_ne!(a, b);
        assert_eq!(ws.layout().tabs()[0].root().split_count(), 1);

        ws.handle_session_event(SessionEvent::new(b.0, SessionEventKind::Exited));

        assert_eq!(ws.layout().tabs()[0].root(), &Node::Pane(a));
        assert_eq!(ws.layout().focused_pane(), Some(a));
        assert!(spawned.log(a).borrow().focused);
        assert!(!spawned.log(b).borrow().alive);
    }

    #[test]
    fn tabs_open_switch_and_close() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();

        assert_eq!(ws.dispatch_str("new_tab"), Dispatch::Handled);
        let b = ws.layout().focused_pane().unwrap();
        assert_eq!(ws.layout().labels(), vec!["1", "2"]);
        assert!(ws.layout().tabs_visible());

        assert_eq!(ws.dispatch_str("goto 1"), Dispatch::Handled);
        assert_eq!(ws.layout().active_index(), Some(0));
        assert!(spawned.log(a).borrow().focused);

        assert_eq!(ws.dispatch_str("close"), Dispatch::Handled);
        assert_eq!(ws.layout().tab_count(), 1);
        assert_eq!(ws.layout().labels(), vec!["1"]);
        assert!(!ws.layout().tabs_visible());
        assert_eq!(ws.layout().focused_pane(), Some(b));
        assert!(!spawned.log(a).borrow().alive);
        assert!(spawned.log(b).borrow().focused);
    }

    #[test]
    fn close_on_last_tab_is_a_noop() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        assert_eq!(ws.dispatch(&Action::Close), Dispatch::Handled);
        assert_eq!(ws.layout().panes(), vec![a]);
        assert!(spawned.log(a).borrow().alive);
        assert!(!ws.should_quit());
    }

    #[test]
    fn goto_out_of_range_is_not_handled() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();
        ws.dispatch(&Action::NewTab);
        assert_eq!(ws.dispatch_str("goto 3"), Dispatch::NotHandled);
        assert_eq!(ws.dispatch_str("goto 0"), Dispatch::NotHandled);
        assert_eq!(ws.layout().active_index(), Some(1));
    }

    #[test]
    fn next_and_prev_stop_at_the_ends() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();
        ws.dispatch(&Action::NewTab);
        ws.dispatch(&Action::NewTab);

        assert_eq!(ws.dispatch(&Action::Next), Dispatch::Handled);
        assert_eq!(ws.layout().active_index(), Some(2));
        ws.dispatch(&Action::Prev);
        ws.dispatch(&Action::Prev);
        ws.dispatch(&Action::Prev);
        assert_eq!(ws.layout().active_index(), Some(0));
    }

    #[test]
    fn quit_chord_is_handled() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();
        assert_eq!(ws.handle_chord(&ctrl_shift("q")), Dispatch::Handled);
        assert!(ws.should_quit());
    }

    #[test]
    fn down_and_right_chords_place_new_pane_second() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();

        assert_eq!(ws.handle_chord(&ctrl_shift("Down")), Dispatch::Handled);
        let b = ws.layout().focused_pane().unwrap();
        assert_eq!(ws.layout().tabs()[0].panes(), vec![a, b]);
        assert!(spawned.log(b).borrow().focused);

        assert_eq!(ws.handle_chord(&ctrl_shift("Right")), Dispatch::Handled);
        let c = ws.layout().focused_pane().unwrap();
        assert_eq!(ws.layout().tabs()[0].panes(), vec![a, b, c]);
        match ws.layout().tabs()[0].root() {
            Node::Split { orientation, first, .. } => {
                assert_eq!(*orientation, Orientation::Vertical);
                assert_eq!(**first, Node::Pane(a));
            }
            Node::Pane(_) => panic!("expected a split"),
        }
    }

    #[test]
    fn reset_chord_reachable_without_equal_key() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        ws.dispatch(&Action::FontInc);
        ws.dispatch(&Action::FontInc);

        assert_eq!(ws.handle_chord(&ctrl_shift("parenright")), Dispatch::Handled);
        assert_eq!(spawned.log(a).borrow().font.1, 9);

        ws.dispatch(&Action::FontInc);
        assert_eq!(ws.handle_chord(&ctrl_shift("KP_Enter")), Dispatch::Handled);
        assert_eq!(spawned.log(a).borrow().font.1, 9);
    }

    #[test]
    fn unmapped_chord_passes_through() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        assert_eq!(ws.handle_chord(&ctrl_shift("z")), Dispatch::NotHandled);
        assert!(!ws.should_quit());
        assert!(spawned.log(a).borrow().fed.is_empty());
    }

    #[test]
    fn chord_with_broken_action_passes_through() {
        let config = Config::parse("hotkey Control+Shift+J launch_rockets");
        let (mut ws, _spawned) = fake_workspace_with(config, None);
        ws.start();
        assert_eq!(ws.handle_chord("Control+Shift+J"), Dispatch::NotHandled);
    }

    #[test]
    fn exec_types_tokens_then_enter() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();

        assert_eq!(ws.dispatch_str("exec ls -la"), Dispatch::Handled);
        assert_eq!(spawned.log(a).borrow().fed, vec!["ls", " ", "-la", " ", "\n"]);
    }

    #[test]
    fn exec_without_arguments_fails() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        assert_eq!(ws.dispatch_str("exec"), Dispatch::NotHandled);
        assert_eq!(ws.dispatch(&Action::Exec(Vec::new())), Dispatch::NotHandled);
        assert!(spawned.log(a).borrow().fed.is_empty());
    }

    #[test]
    fn unknown_verb_is_not_handled() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();
        assert_eq!(ws.dispatch_str("teleport"), Dispatch::NotHandled);
        assert_eq!(ws.dispatch_str(""), Dispatch::NotHandled);
    }

    #[test]
    fn font_size_steps_and_resets() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();

        ws.dispatch(&Action::FontInc);
        ws.dispatch(&Action::FontInc);
        assert_eq!(spawned.log(a).borrow().font.1, 11);

        ws.dispatch(&Action::FontReset);
        assert_eq!(spawned.log(a).borrow().font.1, 9);

        for _ in 0..20 {
            ws.dispatch(&Action::FontDec);
        }
        assert_eq!(spawned.log(a).borrow().font, ("Monospace".to_string(), 1));
    }

    #[test]
    fn font_change_only_touches_focused_session() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        let b = ws.split(Orientation::Horizontal).unwrap();

        ws.dispatch(&Action::FontInc);
        assert_eq!(spawned.log(b).borrow().font.1, 10);
        assert_eq!(spawned.log(a).borrow().font.1, 9);
    }

    #[test]
    fn copy_then_paste_through_clipboard() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        spawned.log(a).borrow_mut().selection = Some("hello".to_string());

        assert_eq!(ws.dispatch(&Action::Copy), Dispatch::Handled);
        let b = ws.split(Orientation::Vertical).unwrap();
        assert_eq!(ws.dispatch(&Action::Paste), Dispatch::Handled);
        assert_eq!(spawned.log(b).borrow().pasted, vec!["hello"]);
    }

    #[test]
    fn paste_with_empty_clipboard_does_nothing() {
        let (mut ws, spawned) = fake_workspace();
        let a = ws.start();
        ws.dispatch(&Action::Paste);
        assert!(spawned.log(a).borrow().pasted.is_empty());
    }

    #[test]
    fn command_line_runs_submitted_action() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();

        assert_eq!(ws.handle_chord(&ctrl_shift("colon")), Dispatch::Handled);
        assert!(ws.commander().visible());
        ws.commander_mut().push_str("new_tab");
        assert_eq!(ws.submit_command(), Dispatch::Handled);
        assert!(!ws.commander().visible());
        assert_eq!(ws.layout().tab_count(), 2);
    }

    #[test]
    fn submitted_cmd_leaves_command_line_hidden() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();

        ws.dispatch(&Action::Cmd);
        ws.commander_mut().push_str("cmd");
        assert_eq!(ws.submit_command(), Dispatch::Handled);
        assert!(!ws.commander().visible());
    }

    #[test]
    fn blank_or_bad_command_still_hides() {
        let (mut ws, _spawned) = fake_workspace();
        ws.start();

        ws.dispatch(&Action::Cmd);
        assert_eq!(ws.submit_command(), Dispatch::NotHandled);
        assert!(!ws.commander().visible());

        ws.dispatch(&Action::Cmd);
        ws.commander_mut().push_str("goto 9");
        assert_eq!(ws.submit_command(), Dispatch::NotHandled);
        assert!(!ws.commander().visible());
    }

    #[test]
    fn reload_applies_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("microterm.conf");
        std::fs::write(&path, "font Monospace 9\n").unwrap();

        let config = Config::load(&path).unwrap();
        let (mut ws, spawned) = fake_workspace_with(config, Some(path.clone()));
        let a = ws.start();
        assert_eq!(ws.handle_chord("Control+Shift+K"), Dispatch::NotHandled);

        std::fs::write(
            &path,
            "font DejaVu Sans Mono 12\ncursor_shape underline\nhotkey Control+Shift+K split_h\n",
        )
        .unwrap();
        assert_eq!(ws.dispatch(&Action::Reload), Dispatch::Handled);

        let log = spawned.log(a);
        assert_eq!(log.borrow().font, ("DejaVu Sans Mono".to_string(), 12));
        assert_eq!(log.borrow().cursor_shape, Some(CursorShape::Underline));
        assert_eq!(ws.handle_chord("Control+Shift+K"), Dispatch::Handled);
        assert_eq!(ws.layout().panes().len(), 2);
    }

    #[test]
    fn reload_with_missing_file_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.conf");
        let (mut ws, spawned) = fake_workspace_with(Config::default(), Some(path));
        let a = ws.start();
        ws.dispatch(&Action::FontInc);

        assert_eq!(ws.dispatch(&Action::Reload), Dispatch::Handled);
        assert_eq!(spawned.log(a).borrow().font.1, 10);
        assert_eq!(ws.config.font_size, 9);
    }

    #[test]
    fn split_spawns_session_for_new_pane() {
        let (mut ws, spawned) = fake_workspace();
        ws.start();
        ws.dispatch(&Action::SplitH);
        ws.dispatch(&Action::SplitV);
        assert_eq!(ws.session_count(), 3);
        assert_eq!(spawned.requests().len(), 3);
        let focused = ws.layout().focused_pane().unwrap();
        assert_eq!(focused, PaneId(3));
    }
}
