//! Widget construction parameters and performance tuning
//!
//! Both structs deserialize from partial TOML tables; missing keys fall back
//! to the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Color, CornerRadii};

/// Invalid widget configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

fn invalid(field: &'static str, expected: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        field,
        expected,
        value: value.to_string(),
    }
}

/// Visual parameters of one frosted-glass widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassConfig {
    /// Blur size in device-independent pixels (scaled by display density)
    pub blur_size: f32,
    /// Opacity of the noise layer (0-1)
    pub noise_opacity: f32,
    /// Saturation multiplier (0 = greyscale, >1 boosts)
    pub saturation: f32,
    /// Luminosity multiplier
    pub luminosity: f32,
    /// Tint mixed over the blurred background by its own alpha
    pub overlay_color: Color,
    /// Corner radii clockwise from top-left
    pub border_radius: CornerRadii,
    pub outline_color: Color,
    pub outline_width: f32,
    /// Extra divisor applied to blur target sizes
    pub downscale_factor: u32,
    /// Output alpha of the composited fill
    pub opacity: f32,
}

impl Default for GlassConfig {
    fn default() -> Self {
        Self {
            blur_size: 25.0,
            noise_opacity: 0.1,
            saturation: 1.2,
            luminosity: 1.3,
            overlay_color: Color::rgba(0.5, 0.5, 0.5, 0.5),
            border_radius: CornerRadii::default(),
            outline_color: Color::WHITE,
            outline_width: 1.0,
            downscale_factor: 1,
            opacity: 1.0,
        }
    }
}

impl GlassConfig {
    /// Check every field against its documented range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.blur_size >= 0.0) {
            return Err(invalid("blur_size", ">= 0", self.blur_size));
        }
        if !(0.0..=1.0).contains(&self.noise_opacity) {
            return Err(invalid("noise_opacity", "within [0, 1]", self.noise_opacity));
        }
        if !(self.saturation >= 0.0) {
            return Err(invalid("saturation", ">= 0", self.saturation));
        }
        if !(self.luminosity >= 0.0) {
            return Err(invalid("luminosity", ">= 0", self.luminosity));
        }
        if !self.overlay_color.is_normalized() {
            return Err(invalid("overlay_color", "channels within [0, 1]", format!("{:?}", self.overlay_color)));
        }
        if !self.outline_color.is_normalized() {
            return Err(invalid("outline_color", "channels within [0, 1]", format!("{:?}", self.outline_color)));
        }
        if self.border_radius.to_array().iter().any(|r| !(*r >= 0.0)) {
            return Err(invalid("border_radius", "four radii >= 0", format!("{:?}", self.border_radius)));
        }
        if !(self.outline_width >= 0.0) {
            return Err(invalid("outline_width", ">= 0", self.outline_width));
        }
        if self.downscale_factor < 1 {
            return Err(invalid("downscale_factor", ">= 1", self.downscale_factor));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid("opacity", "within [0, 1]", self.opacity));
        }
        Ok(())
    }
}

/// Frame-budget knobs shared by every widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Blur target cap for widgets that do not move
    pub static_cap: u32,
    /// Blur target cap while inside a scroll container
    pub movable_cap: u32,
    /// Rate of the periodic refresh timer
    pub refresh_hz: f32,
    /// Minimum spacing between applied change notifications
    pub throttle_ms: u64,
    /// Timer ticks without movement before a movable widget counts as settled
    pub settle_ticks: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            static_cap: 250,
            movable_cap: 150,
            refresh_hz: 30.0,
            throttle_ms: 16,
            settle_ticks: 15,
        }
    }
}

impl PerformanceConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.refresh_hz.max(1.0))
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}
