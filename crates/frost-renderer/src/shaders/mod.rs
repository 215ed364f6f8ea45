//! Shader module - WGSL shaders for GPU rendering
//!
//! Shaders are stored as external .wgsl files and included at compile time.

/// Built-in shaders included at compile time
pub mod builtin {
    /// Vertical blur - captures the background region under the widget and
    /// applies the 13-tap kernel along y
    pub const VERTICAL_BLUR: &str = include_str!("vertical_blur.wgsl");

    /// Horizontal blur - applies the 13-tap kernel along x to the vertical result
    pub const HORIZONTAL_BLUR: &str = include_str!("horizontal_blur.wgsl");

    /// Noise - static per-pixel grain
    pub const NOISE: &str = include_str!("noise.wgsl");

    /// Composite - saturation, luminosity, overlay, noise and rounded clip
    pub const COMPOSITE: &str = include_str!("composite.wgsl");

    /// Blit - draws a texture into a screen rectangle
    pub const BLIT: &str = include_str!("blit.wgsl");
}
