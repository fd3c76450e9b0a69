// ABOUTME: Pane layout management for terminal emulator.
// ABOUTME: Tabs of binary split trees, with focus tracking and collapse on pane exit.

mod focus;
mod layout;
mod tree;

pub use focus::Removal;
pub use layout::{LayoutError, LayoutTree, TabGroup};
pub use tree::{Node, Orientation, PaneId, Placement, Rect};
