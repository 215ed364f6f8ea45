//! Screen-space geometry tracking
//!
//! Classifies the widget's ancestor chain once per attach and reads fresh
//! absolute geometry every tick.

use crate::host::{AncestorKind, NodeId, WidgetTree};
use crate::types::{Point, Rect, Size};

/// Classified ancestors of a node, nearest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AncestorChain {
    pub nodes: Vec<(NodeId, AncestorKind)>,
    /// Some ancestor scrolls, so the widget moves without its own notifications
    pub is_movable: bool,
    /// Nearest modal/overlay container
    pub modal: Option<NodeId>,
    /// Nearest screen page
    pub screen: Option<NodeId>,
}

impl AncestorChain {
    /// Walk from the parent of `node` to the root
    pub fn resolve(tree: &dyn WidgetTree, node: NodeId) -> Self {
        let mut chain = AncestorChain::default();
        for ancestor in tree.ancestors_inclusive(node).into_iter().skip(1) {
            let kind = tree.kind(ancestor);
            match kind {
                AncestorKind::Scrollable => chain.is_movable = true,
                AncestorKind::ModalContainer if chain.modal.is_none() => chain.modal = Some(ancestor),
                AncestorKind::ScreenPage if chain.screen.is_none() => chain.screen = Some(ancestor),
                _ => {}
            }
            chain.nodes.push((ancestor, kind));
        }
        chain
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.iter().any(|(n, _)| *n == node)
    }
}

/// Per-tick scratch geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Absolute screen bounds of the widget
    pub bounds: Rect,
    pub window: Size,
}

impl FrameState {
    pub fn position(&self) -> Point {
        self.bounds.origin()
    }

    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    /// (window width + window height) / 2
    pub fn mean_resolution(&self) -> f32 {
        self.window.mean()
    }

    pub fn is_offscreen(&self) -> bool {
        self.bounds.is_outside(self.window)
    }
}

/// Reasons a tick may be skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    pub not_current_screen: bool,
    pub popup_closed: bool,
    pub out_of_window: bool,
}

/// Tracks one widget's place in the tree and on screen
#[derive(Debug, Clone)]
pub struct GeometryTracker {
    node: NodeId,
    chain: AncestorChain,
    last: Option<FrameState>,
}

impl GeometryTracker {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            chain: AncestorChain::default(),
            last: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn chain(&self) -> &AncestorChain {
        &self.chain
    }

    pub fn is_movable(&self) -> bool {
        self.chain.is_movable
    }

    /// Re-resolve the ancestor chain. Returns true if movability flipped.
    pub fn attach(&mut self, tree: &dyn WidgetTree) -> bool {
        let was_movable = self.chain.is_movable;
        self.chain = AncestorChain::resolve(tree, self.node);
        log::debug!(
            "Widget {} attached under {} ancestors (movable={}, modal={:?}, screen={:?})",
            self.node,
            self.chain.nodes.len(),
            self.chain.is_movable,
            self.chain.modal,
            self.chain.screen
        );
        was_movable != self.chain.is_movable
    }

    pub fn detach(&mut self) {
        self.chain = AncestorChain::default();
        self.last = None;
    }

    /// Read the widget's current geometry; `None` if it is not laid out
    pub fn read(&self, tree: &dyn WidgetTree) -> Option<FrameState> {
        let bounds = tree.bounds(self.node)?;
        Some(FrameState {
            bounds,
            window: tree.window_size(),
        })
    }

    pub fn visibility(&self, tree: &dyn WidgetTree, frame: &FrameState) -> Visibility {
        Visibility {
            not_current_screen: self.screen_inactive(tree),
            popup_closed: self.chain.modal.is_some_and(|m| !tree.is_attached(m)),
            out_of_window: frame.is_offscreen(),
        }
    }

    /// The nearest screen page exists, has a manager, and is not current
    pub fn screen_inactive(&self, tree: &dyn WidgetTree) -> bool {
        self.chain
            .screen
            .is_some_and(|screen| tree.screen_is_active(screen) == Some(false))
    }

    pub fn last(&self) -> Option<&FrameState> {
        self.last.as_ref()
    }

    /// Store the geometry applied by the last executed tick
    pub fn remember(&mut self, frame: FrameState) {
        self.last = Some(frame);
    }

    /// True if `frame` differs in size from the last applied frame
    pub fn size_changed(&self, frame: &FrameState) -> bool {
        self.last.is_none_or(|last| last.size() != frame.size() || last.window != frame.window)
    }

    /// True if `frame` moved relative to the last applied frame
    pub fn moved(&self, frame: &FrameState) -> bool {
        self.last.is_none_or(|last| last.position() != frame.position())
    }
}
