// Copyright 2026 the Screenstack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory native view tree.

use kurbo::{Rect, Size};
use screenstack_core::backend::{NodeKind, ViewHierarchy};
use screenstack_core::stage::NodeId;

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    frame: Rect,
}

/// A view tree with single focus and recorded measure/layout calls.
///
/// Node ids are indices into the tree and are never reused.
#[derive(Clone, Debug, Default)]
pub struct ViewTree {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
    measures: Vec<(NodeId, Size)>,
    layouts: Vec<(NodeId, Rect)>,
}

impl ViewTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root view. `fragment_host` says whether its activity can own
    /// fragments.
    pub fn create_root(&mut self, fragment_host: bool, frame: Rect) -> NodeId {
        let id = self.push(NodeKind::Root { fragment_host });
        self.node_mut(id).frame = frame;
        id
    }

    /// Creates a plain view, appended to `parent` if given.
    pub fn create_view(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = self.push(NodeKind::View);
        if let Some(parent) = parent {
            self.append_child(parent, id);
        }
        id
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
            frame: Rect::ZERO,
        });
        id
    }

    /// Reclassifies a node.
    pub fn set_kind(&mut self, node: NodeId, kind: NodeKind) {
        self.node_mut(node).kind = kind;
    }

    /// Appends `child` to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.node(child).parent.is_none(),
            "{child:?} already has a parent; remove it first"
        );
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Detaches `child` from its parent, if it has one.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).parent else {
            return;
        };
        if let Some(index) = self.index_of(parent, child) {
            self.remove_child_at(parent, index);
        }
    }

    /// Returns the children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// Returns the position of `child` among `parent`'s children.
    #[must_use]
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.node(parent).children.iter().position(|&c| c == child)
    }

    /// Sets the frame of `node`.
    pub fn set_frame(&mut self, node: NodeId, frame: Rect) {
        self.node_mut(node).frame = frame;
    }

    /// Moves input focus to `node`, or clears it.
    pub fn focus(&mut self, node: Option<NodeId>) {
        self.focused = node;
    }

    /// Returns the focused node.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Returns every recorded measure call in order.
    #[must_use]
    pub fn measures(&self) -> &[(NodeId, Size)] {
        &self.measures
    }

    /// Returns every recorded layout call in order.
    #[must_use]
    pub fn layouts(&self) -> &[(NodeId, Rect)] {
        &self.layouts
    }

    /// Clears the measure and layout records.
    pub fn clear_records(&mut self) {
        self.measures.clear();
        self.layouts.clear();
    }

    /// Returns whether `ancestor` is `node` or one of its ancestors.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.node(n).parent;
        }
        false
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "node ids are vector indices"
    )]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "node ids are vector indices"
    )]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }
}

impl ViewHierarchy for ViewTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn classify(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.node(node).children.len()
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.node(node).children.get(index).copied()
    }

    fn focused_child(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.focused?;
        loop {
            let parent = self.node(current).parent?;
            if parent == node {
                return Some(current);
            }
            current = parent;
        }
    }

    fn remove_child_at(&mut self, node: NodeId, index: usize) {
        let child = self.node_mut(node).children.remove(index);
        self.node_mut(child).parent = None;
        if self.focused.is_some_and(|f| self.contains(child, f)) {
            self.focused = None;
        }
    }

    fn frame(&self, node: NodeId) -> Rect {
        self.node(node).frame
    }

    fn measure(&mut self, node: NodeId, size: Size) {
        self.measures.push((node, size));
    }

    fn layout(&mut self, node: NodeId, frame: Rect) {
        self.layouts.push((node, frame));
        self.node_mut(node).frame = frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_child_finds_direct_child_of_focus() {
        let mut tree = ViewTree::new();
        let root = tree.create_root(true, Rect::ZERO);
        let a = tree.create_view(Some(root));
        let b = tree.create_view(Some(root));
        let input = tree.create_view(Some(b));

        assert_eq!(tree.focused_child(root), None);
        tree.focus(Some(input));
        assert_eq!(tree.focused_child(root), Some(b));
        assert_eq!(tree.focused_child(b), Some(input));
        assert_eq!(tree.focused_child(a), None);
    }

    #[test]
    fn removing_focused_subtree_clears_focus() {
        let mut tree = ViewTree::new();
        let root = tree.create_root(true, Rect::ZERO);
        let a = tree.create_view(Some(root));
        let input = tree.create_view(Some(a));
        tree.focus(Some(input));

        tree.remove_child_at(root, 0);
        assert_eq!(tree.focused(), None);
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.child_count(root), 0);
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn append_twice_panics() {
        let mut tree = ViewTree::new();
        let root = tree.create_root(true, Rect::ZERO);
        let a = tree.create_view(Some(root));
        tree.append_child(root, a);
    }
}
