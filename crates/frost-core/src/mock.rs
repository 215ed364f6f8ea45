//! In-memory widget tree for tests and headless demos
//!
//! Stores absolute bounds per node. Scrolling is simulated by translating a
//! subtree; screens share one manager whose current page is selected by name.

use std::collections::HashMap;

use crate::host::{AncestorKind, Capabilities, NodeId, WidgetTree};
use crate::types::{Rect, Size};

#[derive(Debug, Clone)]
struct MockNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: AncestorKind,
    capabilities: Capabilities,
    bounds: Rect,
    screen_name: Option<String>,
}

/// A simple host tree
#[derive(Debug, Clone)]
pub struct MockTree {
    nodes: HashMap<NodeId, MockNode>,
    next_id: u64,
    root: NodeId,
    window: Size,
    current_screen: Option<String>,
}

impl MockTree {
    /// Create a tree with a root covering the window
    pub fn new(window: Size) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            MockNode {
                parent: None,
                children: Vec::new(),
                kind: AncestorKind::Generic,
                capabilities: Capabilities::GEOMETRY,
                bounds: Rect::new(0.0, 0.0, window.width, window.height),
                screen_name: None,
            },
        );
        Self {
            nodes,
            next_id: 1,
            root,
            window,
            current_screen: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a node with the default capabilities of its kind
    pub fn add(&mut self, parent: NodeId, kind: AncestorKind, bounds: Rect) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            MockNode {
                parent: Some(parent),
                children: Vec::new(),
                kind,
                capabilities: Capabilities::for_kind(kind),
                bounds,
                screen_name: None,
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Add a page to the shared screen manager. The first page becomes current.
    pub fn add_screen(&mut self, parent: NodeId, name: &str, bounds: Rect) -> NodeId {
        let id = self.add(parent, AncestorKind::ScreenPage, bounds);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.screen_name = Some(name.to_string());
        }
        if self.current_screen.is_none() {
            self.current_screen = Some(name.to_string());
        }
        id
    }

    pub fn set_current_screen(&mut self, name: &str) {
        self.current_screen = Some(name.to_string());
    }

    pub fn set_capabilities(&mut self, node: NodeId, capabilities: Capabilities) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.capabilities = capabilities;
        }
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.bounds = bounds;
        }
    }

    pub fn set_window_size(&mut self, window: Size) {
        self.window = window;
    }

    /// Move a node and all of its descendants by (dx, dy)
    pub fn translate_subtree(&mut self, node: NodeId, dx: f32, dy: f32) {
        for id in self.descendants_inclusive(node) {
            if let Some(n) = self.nodes.get_mut(&id) {
                n.bounds.x += dx;
                n.bounds.y += dy;
            }
        }
    }

    /// Move `node` under `new_parent`
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        let old_parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|c| *c != node);
        }
        if let Some(p) = self.nodes.get_mut(&new_parent) {
            p.children.push(node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(new_parent);
        }
    }

    /// Disconnect a node from its parent (closing a popup)
    pub fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != node);
        }
    }
}

impl WidgetTree for MockTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.get(&node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn kind(&self, node: NodeId) -> AncestorKind {
        self.nodes.get(&node).map(|n| n.kind).unwrap_or_default()
    }

    fn capabilities(&self, node: NodeId) -> Capabilities {
        self.nodes.get(&node).map(|n| n.capabilities).unwrap_or_default()
    }

    fn bounds(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(&node).map(|n| n.bounds)
    }

    fn window_size(&self) -> Size {
        self.window
    }

    fn screen_is_active(&self, screen: NodeId) -> Option<bool> {
        let name = self.nodes.get(&screen)?.screen_name.as_ref()?;
        Some(self.current_screen.as_ref() == Some(name))
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.ancestors_inclusive(node).last() == Some(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_moves_descendants() {
        let mut tree = MockTree::new(Size::new(100.0, 100.0));
        let a = tree.add(tree.root(), AncestorKind::Generic, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = tree.add(a, AncestorKind::Generic, Rect::new(10.0, 10.0, 5.0, 5.0));
        tree.translate_subtree(a, 0.0, -20.0);
        assert_eq!(tree.bounds(b), Some(Rect::new(10.0, -10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_detach_disconnects_subtree() {
        let mut tree = MockTree::new(Size::new(100.0, 100.0));
        let popup = tree.add(tree.root(), AncestorKind::ModalContainer, Rect::default());
        let inner = tree.add(popup, AncestorKind::Generic, Rect::default());
        assert!(tree.is_attached(inner));
        tree.detach(popup);
        assert!(!tree.is_attached(inner));
    }

    #[test]
    fn test_unmanaged_node_has_no_screen_state() {
        let tree = MockTree::new(Size::new(100.0, 100.0));
        assert_eq!(tree.screen_is_active(tree.root()), None);
    }
}
