//! CPU reference for the composite shader
//!
//! Mirrors `composite.wgsl` step for step so the color math and the clip
//! shape can be checked without a GPU.

use crate::config::GlassConfig;
use crate::kernel::LUMA;
use crate::policy::TargetSize;
use crate::types::{Color, CornerRadii, Size};

/// Uniform inputs of the composite step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeParams {
    pub saturation: f32,
    pub luminosity: f32,
    pub overlay: Color,
    pub noise_opacity: f32,
    pub opacity: f32,
}

impl From<&GlassConfig> for ShadeParams {
    fn from(config: &GlassConfig) -> Self {
        Self {
            saturation: config.saturation,
            luminosity: config.luminosity,
            overlay: config.overlay_color,
            noise_opacity: config.noise_opacity,
            opacity: config.opacity,
        }
    }
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

/// Color of one fill fragment before clipping
pub fn shade(blurred: [f32; 3], noise: [f32; 3], params: &ShadeParams) -> [f32; 3] {
    let intensity = blurred[0] * LUMA[0] + blurred[1] * LUMA[1] + blurred[2] * LUMA[2];
    let mut color = mix3([intensity; 3], blurred, params.saturation);
    for c in &mut color {
        *c *= params.luminosity;
    }
    let overlay = [params.overlay.r, params.overlay.g, params.overlay.b];
    color = mix3(color, overlay, params.overlay.a.min(1.0));
    mix3(color, noise, params.noise_opacity.min(1.0))
}

/// Final fill fragment: shaded color with alpha = opacity x clip coverage
pub fn composite(blurred: [f32; 3], noise: [f32; 3], params: &ShadeParams, coverage: f32) -> Color {
    let [r, g, b] = shade(blurred, noise, params);
    Color::rgba(r, g, b, params.opacity * coverage)
}

/// Signed distance to a rounded box centred on the origin (y down).
/// Negative inside.
pub fn rounded_box_sdf(px: f32, py: f32, half_w: f32, half_h: f32, radii: &CornerRadii) -> f32 {
    let r = match (px > 0.0, py > 0.0) {
        (true, true) => radii.bottom_right,
        (true, false) => radii.top_right,
        (false, true) => radii.bottom_left,
        (false, false) => radii.top_left,
    };
    let qx = px.abs() - half_w + r;
    let qy = py.abs() - half_h + r;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    qx.max(qy).min(0.0) + outside - r
}

/// One-pixel anti-aliased coverage of a signed distance
pub fn coverage(distance: f32) -> f32 {
    (0.5 - distance).clamp(0.0, 1.0)
}

/// Clip coverage at a widget-local point (top-left origin)
pub fn clip_coverage(x: f32, y: f32, size: Size, radii: &CornerRadii) -> f32 {
    let eff = radii.effective(size);
    let half_w = size.width / 2.0;
    let half_h = size.height / 2.0;
    coverage(rounded_box_sdf(x - half_w, y - half_h, half_w, half_h, &eff))
}

/// Clip coverage sampled at every pixel centre of a target
#[derive(Debug, Clone, PartialEq)]
pub struct ClipMask {
    pub size: TargetSize,
    pub data: Vec<f32>,
}

impl ClipMask {
    pub fn rasterize(size: TargetSize, radii: &CornerRadii) -> Self {
        let fsize = size.as_size();
        let mut data = Vec::with_capacity(size.area() as usize);
        for y in 0..size.height {
            for x in 0..size.width {
                data.push(clip_coverage(x as f32 + 0.5, y as f32 + 0.5, fsize, radii));
            }
        }
        Self { size, data }
    }

    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.size.width + x) as usize]
    }
}
