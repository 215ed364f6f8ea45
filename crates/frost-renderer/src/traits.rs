//! Backend abstraction for testing
//!
//! The widget orchestrator talks to the GPU only through [`GlassBackend`].
//! `WgpuGlassBackend` implements it for real; `MockBackend` records every
//! call so scheduling and dirty tracking can be tested without a device.

use frost_core::{Color, CornerRadii, TargetSize};

use crate::error::RenderError;

/// Sub-rectangle of the background texture under the widget, in background uv
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceRegion {
    pub origin: [f32; 2],
    pub extent: [f32; 2],
}

/// Inputs of the two blur passes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlurParams {
    pub region: SourceRegion,
    /// Tap spacing in window uv
    pub spacing: f32,
    /// Window height / background screen height
    pub vertical_scale: f32,
    /// Window width / widget screen width
    pub horizontal_scale: f32,
}

/// Uniforms of the composite pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositeUniforms {
    pub position: [f32; 2],
    pub resolution: [f32; 2],
    pub viewport: [f32; 2],
    pub overlay: [f32; 4],
    /// Effective radii: top-left, top-right, bottom-right, bottom-left
    pub radii: [f32; 4],
    pub opacity: f32,
    pub luminosity: f32,
    pub saturation: f32,
    pub noise_opacity: f32,
}

/// Outline stroke drawn over the fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineShape {
    pub size: TargetSize,
    pub radii: CornerRadii,
    pub width: f32,
    pub color: Color,
}

impl OutlineShape {
    /// Nothing would be visible
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.color.a <= 0.0
    }
}

/// Layers a backend puts into the host's frame pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawLayers {
    pub fill: bool,
    pub outline: bool,
}

impl DrawLayers {
    /// The fill needs a bound source and a current blur. The outline is
    /// drawn whenever it exists, background or not.
    pub fn select(has_source: bool, blur_ready: bool, has_outline: bool) -> Self {
        Self {
            fill: has_source && blur_ready,
            outline: has_outline,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.fill && !self.outline
    }
}

/// GPU work the widget can request
pub trait GlassBackend {
    /// A background texture is bound and can be sampled
    fn has_source(&self) -> bool;

    /// Make both blur targets exactly `size`. Returns true if they were reallocated.
    fn prepare_blur_targets(&mut self, size: TargetSize) -> bool;

    /// Run the vertical and horizontal passes into the blur targets
    fn render_blur(&mut self, params: &BlurParams) -> Result<(), RenderError>;

    /// (Re)allocate the noise target at `size` and regenerate the grain
    fn render_noise(&mut self, size: TargetSize);

    /// Stage and upload the composite uniforms
    fn update_composite(&mut self, uniforms: &CompositeUniforms) -> Result<(), RenderError>;

    /// Redraw the outline layer
    fn render_outline(&mut self, shape: &OutlineShape) -> Result<(), RenderError>;

    /// Drop the blurred output so the fill is not drawn
    fn invalidate_blur(&mut self);

    /// Return every render target to the pool and free it
    fn release_targets(&mut self);

    /// What a draw into the host's pass would show right now
    fn layers(&self) -> DrawLayers;
}
