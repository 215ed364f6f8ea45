//! Render-target size policy
//!
//! Blur targets are capped so that a large widget does not pay for a
//! full-resolution blur; the cap is tighter while the widget can scroll
//! because it is then re-blurred at the refresh rate.

use crate::config::PerformanceConfig;
use crate::types::Size;

/// Pixel size of a render target, always at least 1x1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    /// Build a size, clamping zero dimensions to 1
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Round a float size up to whole pixels
    pub fn from_size(size: Size) -> Self {
        Self::new(ceil_px(size.width), ceil_px(size.height))
    }

    pub fn as_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

fn ceil_px(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.ceil() as u32
    } else {
        0
    }
}

/// Blur target cap for the widget's current classification
pub fn blur_cap(perf: &PerformanceConfig, movable: bool) -> u32 {
    let cap = if movable { perf.movable_cap } else { perf.static_cap };
    cap.max(1)
}

/// `clamp(widget, 1, cap) / downscale`, rounded up, at least 1x1
pub fn blur_target_size(widget: Size, cap: u32, downscale: u32) -> TargetSize {
    let cap = cap.max(1);
    let downscale = downscale.max(1);
    let axis = |v: f32| ceil_px(v).clamp(1, cap).div_ceil(downscale);
    TargetSize::new(axis(widget.width), axis(widget.height))
}

/// Noise is generated at the widget's own resolution
pub fn noise_target_size(widget: Size) -> TargetSize {
    TargetSize::from_size(widget)
}
