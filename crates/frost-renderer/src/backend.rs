//! wgpu implementation of [`GlassBackend`]
//!
//! Owns the widget's render targets (through its own pool) and the pipelines
//! that fill them. The host calls [`WgpuGlassBackend::draw`] inside its frame
//! pass to composite the cached layers.

use std::sync::{Arc, Mutex};

use frost_core::TargetSize;

use crate::blit::BlitPipeline;
use crate::blur::BlurPipeline;
use crate::composite::CompositeRenderer;
use crate::error::RenderError;
use crate::noise::NoiseLayer;
use crate::outline::OutlineLayer;
use crate::target_pool::{GpuTarget, RenderTarget, RenderTargetPool, TargetRole, WgpuAllocator};
use crate::traits::{BlurParams, CompositeUniforms, DrawLayers, GlassBackend, OutlineShape};

/// Released targets kept around for an immediate resize back
const MAX_FREE_TARGETS: usize = 4;

pub struct WgpuGlassBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pool: RenderTargetPool<WgpuAllocator>,

    blur: BlurPipeline,
    noise: NoiseLayer,
    composite: CompositeRenderer,
    blit: BlitPipeline,
    outline: OutlineLayer,

    source: Option<wgpu::TextureView>,
    vertical: Option<RenderTarget<GpuTarget>>,
    horizontal: Option<RenderTarget<GpuTarget>>,
    noise_target: Option<RenderTarget<GpuTarget>>,
    outline_target: Option<RenderTarget<GpuTarget>>,

    blur_ready: bool,
    composite_group: Option<wgpu::BindGroup>,
    outline_group: Option<wgpu::BindGroup>,
}

impl WgpuGlassBackend {
    /// Create a backend drawing into `target_format` surfaces
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        target_format: wgpu::TextureFormat,
        vello_renderer: Arc<Mutex<Option<vello::Renderer>>>,
    ) -> Result<Self, RenderError> {
        let blur = BlurPipeline::new(&device, WgpuAllocator::FORMAT)?;
        let noise = NoiseLayer::new(&device, WgpuAllocator::FORMAT)?;
        let composite = CompositeRenderer::new(&device, target_format)?;
        let blit = BlitPipeline::new(&device, target_format)?;

        Ok(Self {
            pool: RenderTargetPool::new(WgpuAllocator::new(device.clone()), MAX_FREE_TARGETS),
            device,
            queue,
            blur,
            noise,
            composite,
            blit,
            outline: OutlineLayer::new(vello_renderer),
            source: None,
            vertical: None,
            horizontal: None,
            noise_target: None,
            outline_target: None,
            blur_ready: false,
            composite_group: None,
            outline_group: None,
        })
    }

    /// Bind the background's rendered texture. The widget must be told the
    /// content changed for the blur to pick it up.
    pub fn bind_source(&mut self, view: Option<wgpu::TextureView>) {
        self.source = view;
    }


    /// The final blurred texture, if any
    pub fn blurred(&self) -> Option<&wgpu::Texture> {
        self.horizontal.as_ref().map(|t| &t.resource().texture)
    }

    /// Draw the fill and outline into the host's pass
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let layers = self.layers();
        if layers.fill {
            if let Some(group) = &self.composite_group {
                self.composite.render(render_pass, group);
            }
        }
        if layers.outline {
            if let Some(group) = &self.outline_group {
                self.blit.render(render_pass, group);
            }
        }
    }

    fn give_back(&mut self, target: Option<RenderTarget<GpuTarget>>) {
        if let Some(target) = target {
            self.pool.release(target);
        }
    }

    fn rebuild_composite_group(&mut self) {
        self.composite_group = match (&self.horizontal, &self.noise_target) {
            (Some(blurred), Some(noise)) => self.composite.create_bind_group(
                &self.device,
                &blurred.resource().view,
                &noise.resource().view,
            ),
            _ => None,
        };
    }
}

impl GlassBackend for WgpuGlassBackend {
    fn has_source(&self) -> bool {
        self.source.is_some()
    }

    fn prepare_blur_targets(&mut self, size: TargetSize) -> bool {
        if self.vertical.as_ref().map(|t| t.size()) == Some(size) && self.horizontal.is_some() {
            return false;
        }
        let vertical = self.vertical.take();
        let horizontal = self.horizontal.take();
        self.give_back(vertical);
        self.give_back(horizontal);

        self.vertical = Some(self.pool.acquire(TargetRole::VerticalBlur, size));
        self.horizontal = Some(self.pool.acquire(TargetRole::HorizontalBlur, size));
        self.blur_ready = false;
        self.rebuild_composite_group();
        true
    }

    fn render_blur(&mut self, params: &BlurParams) -> Result<(), RenderError> {
        let (Some(source), Some(vertical), Some(horizontal)) =
            (&self.source, &self.vertical, &self.horizontal)
        else {
            log::debug!("Skipping blur: source or targets missing");
            return Ok(());
        };
        self.blur.run(
            &self.device,
            &self.queue,
            source,
            &vertical.resource().view,
            &horizontal.resource().view,
            params,
        )?;
        self.blur_ready = true;
        if self.composite_group.is_none() {
            self.rebuild_composite_group();
        }
        Ok(())
    }

    fn render_noise(&mut self, size: TargetSize) {
        if self.noise_target.as_ref().map(|t| t.size()) != Some(size) {
            let old = self.noise_target.take();
            self.give_back(old);
            self.noise_target = Some(self.pool.acquire(TargetRole::Noise, size));
            self.rebuild_composite_group();
        }
        if let Some(target) = &self.noise_target {
            self.noise.render(&self.device, &self.queue, &target.resource().view);
        }
    }

    fn update_composite(&mut self, uniforms: &CompositeUniforms) -> Result<(), RenderError> {
        self.composite.set_uniforms(uniforms)?;
        self.composite.flush(&self.queue);
        self.blit.set_placement(
            uniforms.position,
            uniforms.resolution,
            uniforms.viewport,
            uniforms.opacity,
        )?;
        self.blit.flush(&self.queue);
        Ok(())
    }

    fn render_outline(&mut self, shape: &OutlineShape) -> Result<(), RenderError> {
        if shape.is_empty() {
            let old = self.outline_target.take();
            self.give_back(old);
            self.outline_group = None;
            return Ok(());
        }

        if self.outline_target.as_ref().map(|t| t.size()) != Some(shape.size) {
            let old = self.outline_target.take();
            self.give_back(old);
            self.outline_target = Some(self.pool.acquire(TargetRole::Outline, shape.size));
            self.outline_group = None;
        }
        let Some(target) = &self.outline_target else {
            return Ok(());
        };
        self.outline
            .render(&self.device, &self.queue, &target.resource().view, shape)?;
        if self.outline_group.is_none() {
            self.outline_group = self
                .blit
                .create_bind_group(&self.device, &target.resource().view);
        }
        Ok(())
    }

    fn invalidate_blur(&mut self) {
        self.blur_ready = false;
    }

    fn release_targets(&mut self) {
        self.composite_group = None;
        self.outline_group = None;
        self.blur_ready = false;
        for target in [
            self.vertical.take(),
            self.horizontal.take(),
            self.noise_target.take(),
            self.outline_target.take(),
        ] {
            self.give_back(target);
        }
        self.pool.clear();
        log::debug!("Released glass targets ({:?})", self.pool.stats());
    }

    fn layers(&self) -> DrawLayers {
        DrawLayers::select(
            self.source.is_some(),
            self.blur_ready && self.composite_group.is_some(),
            self.outline_group.is_some(),
        )
    }
}
