// ABOUTME: Focus repair after a pane disappears.
// ABOUTME: Detaches the pane, collapses its split, and picks the next focus target.

use crate::layout::LayoutTree;
use crate::tree::{detach, Node, PaneId};

/// What removing a pane did to the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The pane was not in the layout; nothing changed
    NotFound,
    /// The pane's split collapsed into its sibling; `focus` holds focus now
    Collapsed { focus: PaneId },
    /// The pane was its tab's only content, so the tab was removed
    TabClosed { focus: PaneId },
    /// The last tab is gone; the application should exit
    Empty,
}

impl LayoutTree {
    /// Remove a pane whose session ended.
    ///
    /// The split that held the pane is replaced by the surviving sibling,
    /// and when that happens in the active tab the first pane of the subtree
    /// now in the split's slot takes focus. Panes in background tabs leave
    /// focus alone. A pane that was a tab's whole content takes the tab with
    /// it, and the layout becomes empty when that was the last tab.
    pub fn remove_pane(&mut self, pane: PaneId) -> Removal {
        let Some(index) = self.tab_of(pane) else {
            return Removal::NotFound;
        };

        if matches!(self.tabs[index].root, Node::Pane(id) if id == pane) {
            self.remove_tab(index);
            tracing::debug!("Pane {:?} was the last in its tab, tab removed", pane);
            return match self.focused {
                Some(focus) => Removal::TabClosed { focus },
                None => Removal::Empty,
            };
        }

        let Some(candidate) = detach(&mut self.tabs[index].root, pane) else {
            // tab_of found the pane below a split, so detach cannot miss it
            debug_assert!(false, "pane {:?} vanished during removal", pane);
            return Removal::NotFound;
        };

        if index == self.active {
            self.focused = Some(candidate);
        }
        self.check_invariants();

        let focus = self.focused.unwrap_or(candidate);
        tracing::debug!("Pane {:?} removed, focus on {:?}", pane, focus);
        Removal::Collapsed { focus }
    }
}
