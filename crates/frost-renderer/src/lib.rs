//! FROST Renderer - GPU compositing for frosted-glass widgets
//!
//! This crate provides a layered rendering architecture:
//! - Blur layer: background capture + two-pass separable blur, re-run only
//!   when the region under the widget or the background content changes
//! - Noise and outline layers: rendered only when the widget's shape changes
//! - Composite: shades the cached layers into the host's pass every frame
//!
//! [`FrostedGlass`] decides per frame which of these to run. It talks to the
//! GPU through [`GlassBackend`], implemented by [`WgpuGlassBackend`] and, for
//! tests, by [`MockBackend`].

pub mod backend;
pub mod blit;
pub mod blur;
pub mod composite;
pub mod error;
pub mod glass;
pub mod mock;
pub mod noise;
pub mod outline;
pub mod program;
pub mod shaders;
pub mod target_pool;
pub mod traits;

pub use backend::WgpuGlassBackend;
pub use blit::BlitPipeline;
pub use blur::BlurPipeline;
pub use composite::CompositeRenderer;
pub use error::{CompileError, RenderError, UniformTypeError, UnknownUniformError};
pub use glass::{ChangeSink, FrostedGlass};
pub use mock::{BackendCall, MockBackend};
pub use noise::NoiseLayer;
pub use outline::OutlineLayer;
pub use program::{ShaderProgram, UniformLayout, UniformMember, UniformValue};
pub use target_pool::{
    GpuTarget, PoolStats, RenderTarget, RenderTargetPool, TargetAllocator, TargetRole, WgpuAllocator,
};
pub use traits::{
    BlurParams, CompositeUniforms, DrawLayers, GlassBackend, OutlineShape, SourceRegion,
};
