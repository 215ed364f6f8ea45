//! Composite pipeline - shades the blurred texture into the widget rectangle
//!
//! Runs every host frame. The uniforms only change when the widget moves or
//! its look changes, so the upload is skipped otherwise.

use crate::error::RenderError;
use crate::program::{ShaderProgram, UniformValue, linear_sampler, sampler_entry, texture_entry, uniform_entry};
use crate::shaders::builtin;
use crate::traits::CompositeUniforms;

/// Write `uniforms` into the composite program's staging block
pub fn stage_composite_uniforms(
    program: &mut ShaderProgram,
    uniforms: &CompositeUniforms,
) -> Result<(), RenderError> {
    program.set_uniform("overlay", UniformValue::Vec4(uniforms.overlay))?;
    program.set_uniform("radii", UniformValue::Vec4(uniforms.radii))?;
    program.set_uniform("position", UniformValue::Vec2(uniforms.position))?;
    program.set_uniform("resolution", UniformValue::Vec2(uniforms.resolution))?;
    program.set_uniform("viewport", UniformValue::Vec2(uniforms.viewport))?;
    program.set_uniform("opacity", UniformValue::Float(uniforms.opacity))?;
    program.set_uniform("luminosity", UniformValue::Float(uniforms.luminosity))?;
    program.set_uniform("saturation", UniformValue::Float(uniforms.saturation))?;
    program.set_uniform("noise_opacity", UniformValue::Float(uniforms.noise_opacity))?;
    Ok(())
}

pub struct CompositeRenderer {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl CompositeRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        let mut program = ShaderProgram::compile("Composite", builtin::COMPOSITE)?;
        program.create_uniform_buffer(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });

        // Use alpha blending to composite onto whatever the host drew below
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
            sampler: linear_sampler(device, "Composite Sampler"),
        })
    }

    pub fn set_uniforms(&mut self, uniforms: &CompositeUniforms) -> Result<(), RenderError> {
        stage_composite_uniforms(&mut self.program, uniforms)
    }

    /// Upload staged uniforms if they changed
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        self.program.flush(queue)
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        blurred: &wgpu::TextureView,
        noise: &wgpu::TextureView,
    ) -> Option<wgpu::BindGroup> {
        let buffer = self.program.uniform_buffer()?;
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(blurred),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(noise),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
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
