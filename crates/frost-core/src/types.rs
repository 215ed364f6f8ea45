//! Plain value types shared by the geometry, scheduling and rendering code
//!
//! Screen space is top-left origin, y down, in physical pixels.

use serde::{Deserialize, Serialize};

/// RGBA color as floats (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a new color with alpha
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit components
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// True if every channel is within [0, 1]
    pub fn is_normalized(&self) -> bool {
        self.to_array().iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// White color
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Black color
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Transparent
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

/// A point in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Self = Self::new(0.0, 0.0);
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Average of width and height, used to keep blur radius resolution-independent
    pub fn mean(&self) -> f32 {
        (self.width + self.height) / 2.0
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Rectangle with position and size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Get the right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True if this rectangle lies entirely outside `0..size` on either axis
    pub fn is_outside(&self, size: Size) -> bool {
        self.right() < 0.0 || self.bottom() < 0.0 || self.x > size.width || self.y > size.height
    }
}

/// Corner radii clockwise from top-left: top-left, top-right, bottom-right, bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub const fn uniform(r: f32) -> Self {
        Self::new(r, r, r, r)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Radii actually drawn for a box of `size`: each corner clamped to `1..=min(w,h)/2`
    pub fn effective(&self, size: Size) -> Self {
        let max = (size.min_side() / 2.0).max(1.0);
        let clamp = |r: f32| r.clamp(1.0, max);
        Self::new(
            clamp(self.top_left),
            clamp(self.top_right),
            clamp(self.bottom_right),
            clamp(self.bottom_left),
        )
    }
}

impl From<[f32; 4]> for CornerRadii {
    fn from(r: [f32; 4]) -> Self {
        Self::new(r[0], r[1], r[2], r[3])
    }
}

impl From<CornerRadii> for [f32; 4] {
    fn from(r: CornerRadii) -> Self {
        r.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_u8() {
        let c = Color::from_u8(255, 128, 0, 255);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.5).abs() < 0.01);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_color_normalized() {
        assert!(Color::WHITE.is_normalized());
        assert!(!Color::rgba(1.5, 0.0, 0.0, 1.0).is_normalized());
    }

    #[test]
    fn test_rect_outside() {
        let window = Size::new(480.0, 854.0);
        assert!(!Rect::new(10.0, 10.0, 100.0, 100.0).is_outside(window));
        assert!(Rect::new(-200.0, 10.0, 100.0, 100.0).is_outside(window));
        assert!(Rect::new(10.0, 900.0, 100.0, 100.0).is_outside(window));
        // Partially visible still counts as inside
        assert!(!Rect::new(-50.0, -50.0, 100.0, 100.0).is_outside(window));
    }

    #[test]
    fn test_effective_radii_clamped() {
        let radii = CornerRadii::new(0.0, 20.0, 500.0, 40.0);
        let eff = radii.effective(Size::new(100.0, 60.0));
        assert_eq!(eff, CornerRadii::new(1.0, 20.0, 30.0, 30.0));
    }

    #[test]
    fn test_effective_radii_tiny_box() {
        // A 1px box still gets the 1px minimum rather than a panic from clamp(min > max)
        let eff = CornerRadii::uniform(10.0).effective(Size::new(1.0, 1.0));
        assert_eq!(eff, CornerRadii::uniform(1.0));
    }

    #[test]
    fn test_color_serde_as_array() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            color: Color,
        }
        let parsed: Wrapper = toml::from_str("color = [1.0, 0.5, 0.0, 0.25]").unwrap();
        assert_eq!(parsed.color, Color::rgba(1.0, 0.5, 0.0, 0.25));
    }
}
