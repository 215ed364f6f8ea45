//! Host contract
//!
//! The widget tree, layout and window belong to the host GUI framework. This
//! module defines the narrow view of them the glass needs: tree enumeration,
//! absolute geometry, screen activity, and a closed classification of each
//! node resolved once at bind time.

use std::fmt;

use crate::types::{Point, Rect, Size};

/// Opaque identity of a node in the host tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node means to the glass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AncestorKind {
    /// Scroll viewport; anything below it can move without its own notification
    Scrollable,
    /// Popup/overlay whose visibility gates rendering
    ModalContainer,
    /// Page of a screen manager; only the current page renders
    ScreenPage,
    #[default]
    Generic,
}

/// Observable property or event of a host node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Position,
    Size,
    ScrollOffsetX,
    ScrollOffsetY,
    /// A transition towards becoming the active screen started
    ActiveStateEntering,
    EnteredActiveState,
    ExitedActiveState,
    PopupOpening,
    /// Rendered content changed without geometry changing (image, video frame)
    ContentTextureChanged,
}

impl Property {
    pub const ALL: [Property; 9] = [
        Property::Position,
        Property::Size,
        Property::ScrollOffsetX,
        Property::ScrollOffsetY,
        Property::ActiveStateEntering,
        Property::EnteredActiveState,
        Property::ExitedActiveState,
        Property::PopupOpening,
        Property::ContentTextureChanged,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of properties a node can be subscribed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const NONE: Self = Self(0);
    /// Position and size, which every laid-out widget exposes
    pub const GEOMETRY: Self = Self(Property::Position.bit() | Property::Size.bit());
    pub const SCROLL: Self = Self(
        Property::Position.bit()
            | Property::Size.bit()
            | Property::ScrollOffsetX.bit()
            | Property::ScrollOffsetY.bit(),
    );
    pub const SCREEN: Self = Self(
        Property::Position.bit()
            | Property::Size.bit()
            | Property::ActiveStateEntering.bit()
            | Property::EnteredActiveState.bit()
            | Property::ExitedActiveState.bit(),
    );
    pub const MODAL: Self =
        Self(Property::Position.bit() | Property::Size.bit() | Property::PopupOpening.bit());

    pub const fn contains(&self, property: Property) -> bool {
        self.0 & property.bit() != 0
    }

    pub const fn with(self, property: Property) -> Self {
        Self(self.0 | property.bit())
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        Property::ALL.into_iter().filter(|p| self.contains(*p))
    }

    /// Default capability set for a node of the given kind
    pub const fn for_kind(kind: AncestorKind) -> Self {
        match kind {
            AncestorKind::Scrollable => Self::SCROLL,
            AncestorKind::ModalContainer => Self::MODAL,
            AncestorKind::ScreenPage => Self::SCREEN,
            AncestorKind::Generic => Self::GEOMETRY,
        }
    }
}

/// Read access to the host widget tree
///
/// Bounds are absolute screen-space rectangles; a node that is not laid out
/// (or no longer in the tree) returns `None`.
pub trait WidgetTree {
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn kind(&self, node: NodeId) -> AncestorKind;

    fn capabilities(&self, node: NodeId) -> Capabilities {
        Capabilities::for_kind(self.kind(node))
    }

    fn bounds(&self, node: NodeId) -> Option<Rect>;

    fn window_size(&self) -> Size;

    /// Whether a screen page is the current page of its manager.
    /// `None` when the page has no manager.
    fn screen_is_active(&self, screen: NodeId) -> Option<bool>;

    /// Whether a node is still connected to the root (closed popups are not)
    fn is_attached(&self, node: NodeId) -> bool;

    /// Convert a node-local point to screen space
    fn to_screen(&self, node: NodeId, local: Point) -> Point {
        let origin = self.bounds(node).map(|b| b.origin()).unwrap_or(Point::ORIGIN);
        Point::new(origin.x + local.x, origin.y + local.y)
    }

    /// Node followed by each ancestor up to the root
    fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if parent == current || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Node followed by every descendant, breadth first
    fn descendants_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut all = vec![node];
        let mut frontier = vec![node];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for n in frontier {
                for child in self.children(n) {
                    if !all.contains(&child) {
                        all.push(child);
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        all
    }
}
