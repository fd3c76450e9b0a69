// ABOUTME: Tab groups and the window-wide layout tree.
// ABOUTME: Owns every tab, tracks the active tab and the focused pane.

use std::collections::HashMap;

use crate::tree::{split_node, Node, Orientation, PaneId, Placement, Rect};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Tab {requested} is out of range (1..={count})")]
    TabOutOfRange { requested: i32, count: usize },

    #[error("Pane {0:?} is not in the layout")]
    UnknownPane(PaneId),

    #[error("No pane has focus")]
    NoFocus,
}

/// One tab: a root node plus its 1-based display label
#[derive(Debug, Clone, PartialEq)]
pub struct TabGroup {
    pub(crate) root: Node,
    pub(crate) label: usize,
}

impl TabGroup {
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn label(&self) -> usize {
        self.label
    }

    pub fn panes(&self) -> Vec<PaneId> {
        self.root.panes()
    }

    pub fn contains(&self, pane: PaneId) -> bool {
        self.root.contains(pane)
    }
}

#[derive(Debug)]
pub struct LayoutTree {
    pub(crate) tabs: Vec<TabGroup>,
    pub(crate) active: usize,
    pub(crate) focused: Option<PaneId>,
    next_id: u64,
}

impl LayoutTree {
    /// An empty layout; callers add the first tab
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active: 0,
            focused: None,
            next_id: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tabs(&self) -> &[TabGroup] {
        &self.tabs
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.tabs.is_empty()).then_some(self.active)
    }

    pub fn active_tab(&self) -> Option<&TabGroup> {
        self.tabs.get(self.active)
    }

    pub fn focused_pane(&self) -> Option<PaneId> {
        self.focused
    }

    /// Tab labels in display order
    pub fn labels(&self) -> Vec<String> {
        self.tabs.iter().map(|tab| tab.label.to_string()).collect()
    }

    /// The tab bar is only shown when there is more than one tab
    pub fn tabs_visible(&self) -> bool {
        self.tabs.len() > 1
    }

    /// Every pane in every tab
    pub fn panes(&self) -> Vec<PaneId> {
        self.tabs.iter().flat_map(TabGroup::panes).collect()
    }

    pub fn tab_of(&self, pane: PaneId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.contains(pane))
    }

    /// Layout rectangles of the active tab's panes
    pub fn pane_rects(&self) -> HashMap<PaneId, Rect> {
        self.active_tab().map(|tab| tab.root.rects()).unwrap_or_default()
    }

    fn alloc_id(&mut self) -> PaneId {
        let id = PaneId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a tab holding one new pane, activate it and focus the pane
    pub fn add_tab(&mut self) -> PaneId {
        let id = self.alloc_id();
        self.tabs.push(TabGroup {
            root: Node::Pane(id),
            label: 0,
        });
        self.renumber();
        self.active = self.tabs.len() - 1;
        self.focused = Some(id);
        tracing::debug!("Added tab {} with pane {:?}", self.tabs.len(), id);
        self.check_invariants();
        id
    }

    /// Close the active tab unless it is the only one.
    ///
    /// Returns the panes that lived in the closed tab so their sessions can
    /// be destroyed, or `None` when the close was refused.
    pub fn close_active_tab(&mut self) -> Option<Vec<PaneId>> {
        if self.tabs.len() <= 1 {
            return None;
        }
        let closed = self.remove_tab(self.active);
        tracing::debug!("Closed tab holding {} panes", closed.len());
        Some(closed)
    }

    /// Remove the tab at `index`, keeping labels contiguous and the active
    /// index and focus valid. Returns the panes that lived in it.
    pub(crate) fn remove_tab(&mut self, index: usize) -> Vec<PaneId> {
        let tab = self.tabs.remove(index);
        self.renumber();

        if self.tabs.is_empty() {
            self.active = 0;
            self.focused = None;
        } else if index == self.active {
            self.activate(index.min(self.tabs.len() - 1));
        } else if index < self.active {
            self.active -= 1;
        }

        self.check_invariants();
        tab.root.panes()
    }

    /// Activate tab `n` (1-based) and focus its first pane
    pub fn goto_tab(&mut self, n: i32) -> Result<PaneId, LayoutError> {
        let count = self.tabs.len();
        let index = usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|index| *index < count)
            .ok_or(LayoutError::TabOutOfRange { requested: n, count })?;
        Ok(self.activate(index))
    }

    /// Move to the following tab; a no-op on the last tab
    pub fn next_tab(&mut self) -> bool {
        if self.active + 1 >= self.tabs.len() {
            return false;
        }
        self.activate(self.active + 1);
        true
    }

    /// Move to the preceding tab; a no-op on the first tab
    pub fn prev_tab(&mut self) -> bool {
        if self.active == 0 || self.tabs.is_empty() {
            return false;
        }
        self.activate(self.active - 1);
        true
    }

    fn activate(&mut self, index: usize) -> PaneId {
        self.active = index;
        let pane = self.tabs[index].root.first_pane();
        self.focused = Some(pane);
        pane
    }

    /// Split `pane` and focus the new pane, which becomes the split's first child
    pub fn split(&mut self, pane: PaneId, orientation: Orientation) -> Result<PaneId, LayoutError> {
        self.split_placed(pane, orientation, Placement::Before)
    }

    /// Split `pane` with the new pane on the given side, and focus it
    pub fn split_placed(
        &mut self,
        pane: PaneId,
        orientation: Orientation,
        placement: Placement,
    ) -> Result<PaneId, LayoutError> {
        let index = self.tab_of(pane).ok_or(LayoutError::UnknownPane(pane))?;
        let new_id = self.alloc_id();

        if !split_node(&mut self.tabs[index].root, pane, orientation, new_id, placement) {
            return Err(LayoutError::UnknownPane(pane));
        }

        self.active = index;
        self.focused = Some(new_id);
        tracing::debug!("Split {:?} {:?} {:?}, new pane {:?}", pane, orientation, placement, new_id);
        self.check_invariants();
        Ok(new_id)
    }

    /// Record that `pane` gained input focus, switching to its tab
    pub fn set_focus(&mut self, pane: PaneId) -> Result<(), LayoutError> {
        let index = self.tab_of(pane).ok_or(LayoutError::UnknownPane(pane))?;
        self.active = index;
        self.focused = Some(pane);
        Ok(())
    }

    fn renumber(&mut self) {
        for (index, tab) in self.tabs.iter_mut().enumerate() {
            tab.label = index + 1;
        }
    }

    pub(crate) fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for (index, tab) in self.tabs.iter().enumerate() {
            debug_assert_eq!(tab.label, index + 1, "tab labels must be contiguous");
            debug_assert_eq!(
                tab.root.split_count() + 1,
                tab.root.panes().len(),
                "every split must hold two children"
            );
        }
        if self.tabs.is_empty() {
            debug_assert!(self.focused.is_none(), "empty layout cannot hold focus");
            return;
        }
        debug_assert!(self.active < self.tabs.len(), "active tab out of range");
        if let Some(focused) = self.focused {
            debug_assert!(
                self.tabs[self.active].contains(focused),
                "focused pane must live in the active tab"
            );
        }
        let mut panes = self.panes();
        let total = panes.len();
        panes.sort();
        panes.dedup();
        debug_assert_eq!(panes.len(), total, "pane ids must be unique");
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}
