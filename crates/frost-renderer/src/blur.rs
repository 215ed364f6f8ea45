//! Two-pass separable blur
//!
//! The vertical pass samples the background sub-region under the widget into
//! the first target; the horizontal pass samples that into the second, which
//! is the blurred texture the composite reads.

use crate::error::RenderError;
use crate::program::{ShaderProgram, UniformValue, linear_sampler, sampler_entry, texture_entry, uniform_entry};
use crate::shaders::builtin;
use crate::traits::BlurParams;

/// Stage the uniforms of both passes
pub fn stage_blur_uniforms(
    vertical: &mut ShaderProgram,
    horizontal: &mut ShaderProgram,
    params: &BlurParams,
) -> Result<(), RenderError> {
    vertical.set_uniform("src_origin", UniformValue::Vec2(params.region.origin))?;
    vertical.set_uniform("src_extent", UniformValue::Vec2(params.region.extent))?;
    vertical.set_uniform("spacing", UniformValue::Float(params.spacing))?;
    vertical.set_uniform("tap_scale", UniformValue::Float(params.vertical_scale))?;

    horizontal.set_uniform("src_origin", UniformValue::Vec2([0.0, 0.0]))?;
    horizontal.set_uniform("src_extent", UniformValue::Vec2([1.0, 1.0]))?;
    horizontal.set_uniform("spacing", UniformValue::Float(params.spacing))?;
    horizontal.set_uniform("tap_scale", UniformValue::Float(params.horizontal_scale))?;
    Ok(())
}

pub(crate) fn draw_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: Option<&wgpu::BindGroup>,
    target: &wgpu::TextureView,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    if let Some(bind_group) = bind_group {
        pass.set_bind_group(0, bind_group, &[]);
    }
    pass.draw(0..4, 0..1);
}

pub struct BlurPipeline {
    vertical: ShaderProgram,
    horizontal: ShaderProgram,
    vertical_pipeline: wgpu::RenderPipeline,
    horizontal_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl BlurPipeline {
    /// Compile both passes for targets of `format`
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        let mut vertical = ShaderProgram::compile("Vertical Blur", builtin::VERTICAL_BLUR)?;
        let mut horizontal = ShaderProgram::compile("Horizontal Blur", builtin::HORIZONTAL_BLUR)?;
        vertical.create_uniform_buffer(device);
        horizontal.create_uniform_buffer(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blur Bind Group Layout"),
            entries: &[uniform_entry(0), texture_entry(1), sampler_entry(2)],
        });

        // Each pass overwrites its whole target
        let vertical_pipeline = vertical.create_pipeline(device, &bind_group_layout, format, None);
        let horizontal_pipeline = horizontal.create_pipeline(device, &bind_group_layout, format, None);

        Ok(Self {
            vertical,
            horizontal,
            vertical_pipeline,
            horizontal_pipeline,
            bind_group_layout,
            sampler: linear_sampler(device, "Blur Sampler"),
        })
    }

    fn bind_group(
        &self,
        device: &wgpu::Device,
        program: &ShaderProgram,
        source: &wgpu::TextureView,
    ) -> Option<wgpu::BindGroup> {
        let buffer = program.uniform_buffer()?;
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", program.label())),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }

    /// Blur the region of `source` into `first` (vertical) then `output` (horizontal)
    pub fn run(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &wgpu::TextureView,
        first: &wgpu::TextureView,
        output: &wgpu::TextureView,
        params: &BlurParams,
    ) -> Result<(), RenderError> {
        stage_blur_uniforms(&mut self.vertical, &mut self.horizontal, params)?;
        self.vertical.flush(queue);
        self.horizontal.flush(queue);

        let vertical_group = self.bind_group(device, &self.vertical, source);
        let horizontal_group = self.bind_group(device, &self.horizontal, first);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Blur Encoder"),
        });
        draw_fullscreen(
            &mut encoder,
            "Vertical Blur Pass",
            &self.vertical_pipeline,
            vertical_group.as_ref(),
            first,
        );
        draw_fullscreen(
            &mut encoder,
            "Horizontal Blur Pass",
            &self.horizontal_pipeline,
            horizontal_group.as_ref(),
            output,
        );
        queue.submit(Some(encoder.finish()));
        Ok(())
    }
}
