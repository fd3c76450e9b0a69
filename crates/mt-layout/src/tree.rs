// ABOUTME: Binary split tree holding the panes of a single tab.
// ABOUTME: Supports splitting, detaching with collapse, and rectangle layout.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u64);

/// How a split arranges its two children.
///
/// `Horizontal` places them side by side (first on the left), `Vertical`
/// stacks them (first on top).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which side of a split the new pane lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Left of or above the split pane
    Before,
    /// Right of or below the split pane
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Pane(PaneId),
    Split {
        orientation: Orientation,
        /// Share of the space given to `first` (0.0 to 1.0)
        ratio: f32,
        first: Box<Node>,
        second: Box<Node>,
    },
}

/// Rectangle in normalized coordinates (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

impl Node {
    /// First pane reached by always descending into `first`
    pub fn first_pane(&self) -> PaneId {
        match self {
            Node::Pane(id) => *id,
            Node::Split { first, .. } => first.first_pane(),
        }
    }

    pub fn contains(&self, target: PaneId) -> bool {
        match self {
            Node::Pane(id) => *id == target,
            Node::Split { first, second, .. } => first.contains(target) || second.contains(target),
        }
    }

    /// All panes in first-to-second order
    pub fn panes(&self) -> Vec<PaneId> {
        let mut result = Vec::new();
        collect_panes(self, &mut result);
        result
    }

    pub fn rects(&self) -> HashMap<PaneId, Rect> {
        let mut result = HashMap::new();
        collect_rects(self, Rect::full(), &mut result);
        result
    }

    pub fn split_count(&self) -> usize {
        match self {
            Node::Pane(_) => 0,
            Node::Split { first, second, .. } => 1 + first.split_count() + second.split_count(),
        }
    }
}

fn collect_rects(node: &Node, rect: Rect, out: &mut HashMap<PaneId, Rect>) {
    match node {
        Node::Pane(id) => {
            out.insert(*id, rect);
        }
        Node::Split {
            orientation,
            ratio,
            first,
            second,
        } => {
            let (first_rect, second_rect) = match orientation {
                Orientation::Horizontal => (
                    Rect {
                        x: rect.x,
                        y: rect.y,
                        width: rect.width * ratio,
                        height: rect.height,
                    },
                    Rect {
                        x: rect.x + rect.width * ratio,
                        y: rect.y,
                        width: rect.width * (1.0 - ratio),
                        height: rect.height,
                    },
                ),
                Orientation::Vertical => (
                    Rect {
                        x: rect.x,
                        y: rect.y,
                        width: rect.width,
                        height: rect.height * ratio,
                    },
                    Rect {
                        x: rect.x,
                        y: rect.y + rect.height * ratio,
                        width: rect.width,
                        height: rect.height * (1.0 - ratio),
                    },
                ),
            };
            collect_rects(first, first_rect, out);
            collect_rects(second, second_rect, out);
        }
    }
}

fn collect_panes(node: &Node, out: &mut Vec<PaneId>) {
    match node {
        Node::Pane(id) => out.push(*id),
        Node::Split { first, second, .. } => {
            collect_panes(first, out);
            collect_panes(second, out);
        }
    }
}

/// Replace the `target` leaf with a split holding the old leaf and `new_id`,
/// the new pane on the `placement` side. Returns false if `target` is not
/// in this subtree.
pub(crate) fn split_node(
    node: &mut Node,
    target: PaneId,
    orientation: Orientation,
    new_id: PaneId,
    placement: Placement,
) -> bool {
    match node {
        Node::Pane(id) if *id == target => {
            let (first, second) = match placement {
                Placement::Before => (new_id, target),
                Placement::After => (target, new_id),
            };
            *node = Node::Split {
                orientation,
                ratio: 0.5,
                first: Box::new(Node::Pane(first)),
                second: Box::new(Node::Pane(second)),
            };
            true
        }
        Node::Pane(_) => false,
        Node::Split { first, second, .. } => {
            split_node(first, target, orientation, new_id, placement)
                || split_node(second, target, orientation, new_id, placement)
        }
    }
}

/// Remove the `target` leaf from below `node`.
///
/// The split that held the leaf is replaced, in its own slot, by the
/// surviving sibling. Returns the first pane of the subtree now in that
/// slot, or `None` if `target` was not found below `node`. A `node` that
/// is itself the target leaf cannot be detached here; the owner of the
/// slot has to handle that case.
pub(crate) fn detach(node: &mut Node, target: PaneId) -> Option<PaneId> {
    let Node::Split { first, second, .. } = node else {
        return None;
    };

    let first_is_target = matches!(first.as_ref(), Node::Pane(id) if *id == target);
    let second_is_target = matches!(second.as_ref(), Node::Pane(id) if *id == target);

    if first_is_target || second_is_target {
        let taken = std::mem::replace(node, Node::Pane(target));
        if let Node::Split { first, second, .. } = taken {
            *node = if first_is_target { *second } else { *first };
        }
        return Some(node.first_pane());
    }

    detach(first, target).or_else(|| detach(second, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane(id: u64) -> Node {
        Node::Pane(PaneId(id))
    }

    #[test]
    fn split_puts_new_pane_first() {
        let mut root = pane(1);
        assert!(split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(2), Placement::Before));

        match &root {
            Node::Split {
                orientation,
                first,
                second,
                ..
            } => {
                assert_eq!(*orientation, Orientation::Vertical);
                assert_eq!(**first, pane(2));
                assert_eq!(**second, pane(1));
            }
            Node::Pane(_) => panic!("expected a split"),
        }
    }

    #[test]
    fn split_after_puts_new_pane_second() {
        let mut root = pane(1);
        assert!(split_node(&mut root, PaneId(1), Orientation::Horizontal, PaneId(2), Placement::After));
        assert_eq!(root.panes(), vec![PaneId(1), PaneId(2)]);
        assert_eq!(root.first_pane(), PaneId(1));
    }

    #[test]
    fn split_missing_pane_is_noop() {
        let mut root = pane(1);
        assert!(!split_node(&mut root, PaneId(9), Orientation::Horizontal, PaneId(2), Placement::Before));
        assert_eq!(root, pane(1));
    }

    #[test]
    fn split_nested_keeps_sibling_untouched() {
        let mut root = pane(1);
        split_node(&mut root, PaneId(1), Orientation::Horizontal, PaneId(2), Placement::Before);
        split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(3), Placement::Before);

        assert_eq!(root.panes(), vec![PaneId(2), PaneId(3), PaneId(1)]);
        assert_eq!(root.split_count(), 2);
    }

    #[test]
    fn detach_collapses_parent_split() {
        let mut root = pane(1);
        split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(2), Placement::Before);

        assert_eq!(detach(&mut root, PaneId(2)), Some(PaneId(1)));
        assert_eq!(root, pane(1));
    }

    #[test]
    fn detach_deep_leaf_replaces_only_its_split() {
        let mut root = pane(1);
        split_node(&mut root, PaneId(1), Orientation::Horizontal, PaneId(2), Placement::Before);
        split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(3), Placement::Before);

        // [2 | [3 / 1]] -> [2 | 1]
        assert_eq!(detach(&mut root, PaneId(3)), Some(PaneId(1)));
        assert_eq!(root.panes(), vec![PaneId(2), PaneId(1)]);
        assert_eq!(root.split_count(), 1);
    }

    #[test]
    fn detach_surfaces_first_leaf_of_surviving_subtree() {
        let mut root = pane(1);
        split_node(&mut root, PaneId(1), Orientation::Horizontal, PaneId(2), Placement::Before);
        split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(3), Placement::Before);

        // [2 | [3 / 1]] minus 2 leaves [3 / 1], whose first leaf is 3
        assert_eq!(detach(&mut root, PaneId(2)), Some(PaneId(3)));
        assert_eq!(root.panes(), vec![PaneId(3), PaneId(1)]);
    }

    #[test]
    fn detach_unknown_or_root_leaf_returns_none() {
        let mut root = pane(1);
        assert_eq!(detach(&mut root, PaneId(1)), None);
        split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(2), Placement::Before);
        assert_eq!(detach(&mut root, PaneId(7)), None);
        assert_eq!(root.panes().len(), 2);
    }

    #[test]
    fn split_gives_equal_space() {
        let mut root = pane(1);
        split_node(&mut root, PaneId(1), Orientation::Horizontal, PaneId(2), Placement::Before);

        let rects = root.rects();
        let old_rect = rects.get(&PaneId(1)).unwrap();
        let new_rect = rects.get(&PaneId(2)).unwrap();

        assert!((old_rect.width - 0.5).abs() < 0.001);
        assert!((new_rect.width - 0.5).abs() < 0.001);
        assert!(new_rect.x < old_rect.x);
    }

    #[test]
    fn vertical_split_stacks_panes() {
        let mut root = pane(1);
        split_node(&mut root, PaneId(1), Orientation::Vertical, PaneId(2), Placement::Before);

        let rects = root.rects();
        let top = rects.get(&PaneId(2)).unwrap();
        let bottom = rects.get(&PaneId(1)).unwrap();
        assert!((top.height - 0.5).abs() < 0.001);
        assert!((bottom.y - 0.5).abs() < 0.001);
        assert!((bottom.width - 1.0).abs() < 0.001);
    }
}
