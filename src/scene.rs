//! Simulated host for the demo and integration tests
//!
//! A window with a full-size background drawable, a scroll viewport, and one
//! glass panel that starts outside the viewport. Scrolling moves the
//! viewport's content and emits the offset notification a real host would.

use std::time::Instant;

use frost_core::{
    AncestorKind, Capabilities, MockTree, NodeId, NotificationHub, Property, PropertyValue, Rect, Size,
};

/// Window used by the demo
pub const WINDOW: Size = Size::new(800.0, 600.0);

pub struct DemoScene {
    pub tree: MockTree,
    pub hub: NotificationHub,
    pub background: NodeId,
    pub scroll: NodeId,
    pub panel: NodeId,
    scroll_offset: f32,
}

impl DemoScene {
    pub fn new(window: Size) -> Self {
        let mut tree = MockTree::new(window);
        let root = tree.root();

        let background = tree.add(
            root,
            AncestorKind::Generic,
            Rect::new(0.0, 0.0, window.width, window.height),
        );
        tree.set_capabilities(
            background,
            Capabilities::GEOMETRY.with(Property::ContentTextureChanged),
        );

        let scroll = tree.add(
            root,
            AncestorKind::Scrollable,
            Rect::new(300.0, 0.0, window.width - 300.0, window.height),
        );
        let panel = tree.add(root, AncestorKind::Generic, Rect::new(50.0, 50.0, 200.0, 200.0));

        Self {
            tree,
            hub: NotificationHub::new(),
            background,
            scroll,
            panel,
            scroll_offset: 0.0,
        }
    }

    /// Move the panel into the scroll viewport, keeping its size
    pub fn move_panel_into_scroll(&mut self, now: Instant) {
        self.tree.reparent(self.panel, self.scroll);
        self.tree
            .set_bounds(self.panel, Rect::new(400.0, 100.0, 200.0, 200.0));
        self.hub.emit(
            self.panel,
            Property::Position,
            PropertyValue::Vector([400.0, 100.0]),
            now,
        );
    }

    /// Scroll the viewport content by `dy` pixels
    pub fn scroll_by(&mut self, dy: f32, now: Instant) {
        self.scroll_offset += dy;
        for child in frost_core::WidgetTree::children(&self.tree, self.scroll) {
            self.tree.translate_subtree(child, 0.0, -dy);
        }
        self.hub.emit(
            self.scroll,
            Property::ScrollOffsetY,
            PropertyValue::Scalar(self.scroll_offset as f64),
            now,
        );
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }
}

/// Procedural background: diagonal color bands over a vertical gradient
pub fn background_pixels(width: u32, height: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(width, height, |x, y| {
        let band = ((x + y) / 40) % 3;
        let shade = (255.0 * (1.0 - y as f32 / height.max(1) as f32 * 0.6)) as u8;
        match band {
            0 => image::Rgba([shade, 40, 60, 255]),
            1 => image::Rgba([30, shade, 90, 255]),
            _ => image::Rgba([40, 70, shade, 255]),
        }
    })
}
