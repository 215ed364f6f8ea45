//! Static grain texture

use crate::blur::draw_fullscreen;
use crate::error::RenderError;
use crate::program::ShaderProgram;
use crate::shaders::builtin;

pub struct NoiseLayer {
    pipeline: wgpu::RenderPipeline,
    // The noise shader binds nothing, but the layout still declares group 0
    bind_group: wgpu::BindGroup,
}

impl NoiseLayer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        let program = ShaderProgram::compile("Noise", builtin::NOISE)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Noise Bind Group Layout"),
            entries: &[],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Noise Bind Group"),
            layout: &bind_group_layout,
            entries: &[],
        });
        let pipeline = program.create_pipeline(device, &bind_group_layout, format, None);

        Ok(Self { pipeline, bind_group })
    }

    /// Fill `target` with grain
    pub fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, target: &wgpu::TextureView) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Noise Encoder"),
        });
        draw_fullscreen(
            &mut encoder,
            "Noise Pass",
            &self.pipeline,
            Some(&self.bind_group),
            target,
        );
        queue.submit(Some(encoder.finish()));
    }
}
