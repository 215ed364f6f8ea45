//! Subscriptions on the nodes whose changes can move or repaint the glass
//!
//! Three groups of nodes are bound: the widget itself, the ancestors of the
//! widget and of the background (subscribed per [`AncestorKind`]), and every
//! descendant of the background (subscribed per declared capabilities). A
//! node reached from more than one group is bound once with the union of its
//! properties.

use std::collections::BTreeMap;
use std::rc::Weak;

use crate::host::{AncestorKind, NodeId, Property, WidgetTree};
use crate::notify::{ChangeListener, NotificationProvider, Subscription};

/// Properties subscribed on an ancestor of the given kind
pub fn ancestor_properties(kind: AncestorKind) -> &'static [Property] {
    match kind {
        AncestorKind::Scrollable => &[
            Property::Position,
            Property::Size,
            Property::ScrollOffsetX,
            Property::ScrollOffsetY,
        ],
        AncestorKind::ModalContainer => &[Property::PopupOpening, Property::Size, Property::Position],
        AncestorKind::ScreenPage => &[
            Property::ActiveStateEntering,
            Property::EnteredActiveState,
            Property::ExitedActiveState,
        ],
        AncestorKind::Generic => &[Property::Size, Property::Position],
    }
}

/// Properties subscribed on the widget's own node
pub const WIDGET_PROPERTIES: &[Property] = &[Property::Position, Property::Size];

/// Properties subscribed on the background and each of its descendants
pub const BACKGROUND_PROPERTIES: &[Property] = &[
    Property::Position,
    Property::Size,
    Property::ScrollOffsetX,
    Property::ScrollOffsetY,
    Property::PopupOpening,
    Property::EnteredActiveState,
    Property::ContentTextureChanged,
];

/// Live subscriptions on one node
#[derive(Debug)]
pub struct AncestorBinding {
    node: NodeId,
    kind: AncestorKind,
    subscriptions: Vec<Subscription>,
}

impl AncestorBinding {
    fn new(node: NodeId, kind: AncestorKind) -> Self {
        Self {
            node,
            kind,
            subscriptions: Vec::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> AncestorKind {
        self.kind
    }

    /// Properties actually subscribed, in subscription order
    pub fn properties(&self) -> Vec<Property> {
        self.subscriptions.iter().map(Subscription::property).collect()
    }

    pub fn is_subscribed(&self, property: Property) -> bool {
        self.subscriptions.iter().any(|s| s.property() == property)
    }

    /// Subscribe every supported property in `wanted` not yet subscribed
    fn subscribe(
        &mut self,
        tree: &dyn WidgetTree,
        provider: &dyn NotificationProvider,
        wanted: &[Property],
        listener: &Weak<dyn ChangeListener>,
    ) {
        let capabilities = tree.capabilities(self.node);
        for &property in wanted {
            if self.is_subscribed(property) {
                continue;
            }
            if !capabilities.contains(property) {
                log::debug!("Node {} does not expose {:?}, skipping", self.node, property);
                continue;
            }
            self.subscriptions
                .push(provider.subscribe(self.node, property, listener.clone()));
        }
    }
}

/// Every binding held by one widget
///
/// Dropping the set releases all of its subscriptions.
#[derive(Debug, Default)]
pub struct BindingSet {
    bindings: BTreeMap<NodeId, AncestorBinding>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind_node(
        &mut self,
        tree: &dyn WidgetTree,
        provider: &dyn NotificationProvider,
        node: NodeId,
        wanted: &[Property],
        listener: &Weak<dyn ChangeListener>,
    ) {
        let kind = tree.kind(node);
        self.bindings
            .entry(node)
            .or_insert_with(|| AncestorBinding::new(node, kind))
            .subscribe(tree, provider, wanted, listener);
    }

    /// Bind the widget, its ancestors, and (if any) the background subtree
    pub fn bind(
        tree: &dyn WidgetTree,
        provider: &dyn NotificationProvider,
        widget: NodeId,
        background: Option<NodeId>,
        listener: &Weak<dyn ChangeListener>,
    ) -> Self {
        let mut set = Self::new();
        set.bind_node(tree, provider, widget, WIDGET_PROPERTIES, listener);
        set.bind_ancestors(tree, provider, widget, listener);
        if let Some(bg) = background {
            set.bind_background(tree, provider, bg, listener);
        }
        log::debug!(
            "Bound {} nodes ({} subscriptions) for widget {}",
            set.len(),
            set.subscription_count(),
            widget
        );
        set
    }

    fn bind_ancestors(
        &mut self,
        tree: &dyn WidgetTree,
        provider: &dyn NotificationProvider,
        node: NodeId,
        listener: &Weak<dyn ChangeListener>,
    ) {
        for ancestor in tree.ancestors_inclusive(node).into_iter().skip(1) {
            let wanted = ancestor_properties(tree.kind(ancestor));
            self.bind_node(tree, provider, ancestor, wanted, listener);
        }
    }

    /// Bind the background's ancestors and its whole subtree
    pub fn bind_background(
        &mut self,
        tree: &dyn WidgetTree,
        provider: &dyn NotificationProvider,
        background: NodeId,
        listener: &Weak<dyn ChangeListener>,
    ) {
        self.bind_ancestors(tree, provider, background, listener);
        for node in tree.descendants_inclusive(background) {
            self.bind_node(tree, provider, node, BACKGROUND_PROPERTIES, listener);
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&AncestorBinding> {
        self.bindings.get(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AncestorBinding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn subscription_count(&self) -> usize {
        self.bindings.values().map(|b| b.subscriptions.len()).sum()
    }

    /// Release every subscription
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
