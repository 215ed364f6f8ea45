//! Validated shader programs with reflected uniform blocks
//!
//! Every WGSL source is parsed and validated with naga before wgpu ever sees
//! it, so a broken shader surfaces as a [`CompileError`] carrying the
//! diagnostic instead of a device panic. The first `var<uniform>` struct of
//! the module becomes the program's uniform block: members are addressed by
//! name, staged on the CPU, and uploaded by [`ShaderProgram::flush`] only when
//! something changed.

use std::borrow::Cow;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{CompileError, RenderError, UniformTypeError, UnknownUniformError};

/// A value written into a uniform member
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
}

impl UniformValue {
    fn bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v),
        }
    }
}

/// One member of the uniform struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// Reflected layout of the uniform block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    pub group: u32,
    pub binding: u32,
    /// Struct span in bytes, including trailing padding
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformLayout {
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }

    fn reflect(module: &naga::Module) -> Option<Self> {
        let mut uniforms: Vec<_> = module
            .global_variables
            .iter()
            .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
            .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.group, b.binding, var.ty)))
            .collect();
        uniforms.sort_by_key(|(group, binding, _)| (*group, *binding));
        let (group, binding, ty) = uniforms.into_iter().next()?;

        let naga::TypeInner::Struct { members, span } = &module.types[ty].inner else {
            return None;
        };
        let members = members
            .iter()
            .map(|m| UniformMember {
                name: m.name.clone().unwrap_or_default(),
                offset: m.offset,
                size: module.types[m.ty].inner.size(module.to_ctx()),
            })
            .collect();
        Some(Self {
            group,
            binding,
            size: *span,
            members,
        })
    }
}

/// A compiled program and its staged uniforms
pub struct ShaderProgram {
    label: String,
    source: Cow<'static, str>,
    layout: Option<UniformLayout>,
    staging: Vec<u8>,
    dirty: bool,
    buffer: Option<wgpu::Buffer>,
}

impl ShaderProgram {
    /// Parse and validate `source`
    pub fn compile(label: &str, source: impl Into<Cow<'static, str>>) -> Result<Self, CompileError> {
        let source = source.into();
        let module = naga::front::wgsl::parse_str(&source).map_err(|e| CompileError {
            label: label.to_string(),
            diagnostic: e.emit_to_string(&source),
        })?;
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| CompileError {
                label: label.to_string(),
                diagnostic: e.emit_to_string(&source),
            })?;

        let layout = UniformLayout::reflect(&module);
        let staging = vec![0u8; layout.as_ref().map_or(0, |l| l.size as usize)];
        log::debug!(
            "Compiled shader '{}' ({} uniform members)",
            label,
            layout.as_ref().map_or(0, |l| l.members.len())
        );

        Ok(Self {
            label: label.to_string(),
            source,
            layout,
            staging,
            dirty: true,
            buffer: None,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn layout(&self) -> Option<&UniformLayout> {
        self.layout.as_ref()
    }

    /// Stage a uniform value. Writing the value already staged is a no-op.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), RenderError> {
        let member = self
            .layout
            .as_ref()
            .and_then(|l| l.member(name))
            .ok_or_else(|| UnknownUniformError {
                program: self.label.clone(),
                name: name.to_string(),
            })?;

        let bytes = value.bytes();
        if bytes.len() as u32 != member.size {
            return Err(UniformTypeError {
                program: self.label.clone(),
                name: name.to_string(),
                expected: member.size,
                got: bytes.len() as u32,
            }
            .into());
        }

        let range = member.offset as usize..member.offset as usize + bytes.len();
        if self.staging[range.clone()] != *bytes {
            self.staging[range].copy_from_slice(bytes);
            self.dirty = true;
        }
        Ok(())
    }

    /// Staged uniform block bytes
    pub fn uniform_bytes(&self) -> &[u8] {
        &self.staging
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label),
            source: wgpu::ShaderSource::Wgsl(self.source.clone()),
        })
    }

    /// Allocate the GPU uniform buffer (once). `None` if the program has no uniforms.
    pub fn create_uniform_buffer(&mut self, device: &wgpu::Device) -> Option<&wgpu::Buffer> {
        let size = self.layout.as_ref()?.size as u64;
        if self.buffer.is_none() {
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{} Uniforms", self.label)),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.dirty = true;
        }
        self.buffer.as_ref()
    }

    pub fn uniform_buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Upload the staged block if it changed. Returns true if a write was issued.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        match &self.buffer {
            Some(buffer) if self.dirty => {
                queue.write_buffer(buffer, 0, &self.staging);
                self.dirty = false;
                true
            }
            _ => false,
        }
    }

    /// Build a quad pipeline (triangle strip, `vs_main`/`fs_main`) for this program
    pub fn create_pipeline(
        &self,
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        blend: Option<wgpu::BlendState>,
    ) -> wgpu::RenderPipeline {
        let shader = self.create_module(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", self.label)),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", self.label)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

/// Layout entry for the uniform buffer at binding 0
pub(crate) fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(crate) fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
