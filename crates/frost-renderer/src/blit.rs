//! Blit pipeline - alpha blend of a cached layer into a screen rectangle
//! Very fast (1 texture sample per pixel) - runs every frame

use crate::error::RenderError;
use crate::program::{ShaderProgram, UniformValue, linear_sampler, sampler_entry, texture_entry, uniform_entry};
use crate::shaders::builtin;

pub struct BlitPipeline {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl BlitPipeline {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        let mut program = ShaderProgram::compile("Blit", builtin::BLIT)?;
        program.create_uniform_buffer(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blit Bind Group Layout"),
            entries: &[uniform_entry(0), texture_entry(1), sampler_entry(2)],
        });

        // Vello writes straight alpha
        let pipeline = program.create_pipeline(
            device,
            &bind_group_layout,
            target_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        Ok(Self {
            program,
            pipeline,
            bind_group_layout,
            sampler: linear_sampler(device, "Blit Sampler"),
        })
    }

    /// Place the layer at `position` with `resolution` pixels in a `viewport`-sized target
    pub fn set_placement(
        &mut self,
        position: [f32; 2],
        resolution: [f32; 2],
        viewport: [f32; 2],
        opacity: f32,
    ) -> Result<(), RenderError> {
        self.program.set_uniform("position", UniformValue::Vec2(position))?;
        self.program.set_uniform("resolution", UniformValue::Vec2(resolution))?;
        self.program.set_uniform("viewport", UniformValue::Vec2(viewport))?;
        self.program.set_uniform("opacity", UniformValue::Float(opacity))?;
        Ok(())
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        self.program.flush(queue)
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layer: &wgpu::TextureView,
    ) -> Option<wgpu::BindGroup> {
        let buffer = self.program.uniform_buffer()?;
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(layer),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..4, 0..1);
    }
}
