//! Per-widget render target pooling
//!
//! Targets are matched by exact size. When no free target fits, one stale
//! free target is destroyed before allocating, so a resize swaps memory
//! instead of accumulating it. The pool is owned by a single widget; targets
//! are never shared across widgets.

use std::sync::Arc;

use frost_core::TargetSize;

/// What a target is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRole {
    /// Background capture + vertical pass output
    VerticalBlur,
    /// Final blurred texture
    HorizontalBlur,
    Noise,
    Outline,
}

impl TargetRole {
    pub fn label(&self) -> &'static str {
        match self {
            TargetRole::VerticalBlur => "Vertical Blur Target",
            TargetRole::HorizontalBlur => "Horizontal Blur Target",
            TargetRole::Noise => "Noise Target",
            TargetRole::Outline => "Outline Target",
        }
    }
}

/// Creates and destroys the backing resources of render targets
pub trait TargetAllocator {
    type Target;

    fn allocate(&mut self, role: TargetRole, size: TargetSize) -> Self::Target;

    fn destroy(&mut self, target: Self::Target);
}

/// A target checked out of the pool
#[derive(Debug)]
pub struct RenderTarget<T> {
    role: TargetRole,
    size: TargetSize,
    resource: T,
}

impl<T> RenderTarget<T> {
    pub fn role(&self) -> TargetRole {
        self.role
    }

    pub fn size(&self) -> TargetSize {
        self.size
    }

    pub fn resource(&self) -> &T {
        &self.resource
    }
}

/// Pool statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub allocations: u64,
    pub reuses: u64,
    pub releases: u64,
    pub destroyed: u64,
}

pub struct RenderTargetPool<A: TargetAllocator> {
    allocator: A,
    free: Vec<RenderTarget<A::Target>>,
    max_free: usize,
    stats: PoolStats,
}

impl<A: TargetAllocator> RenderTargetPool<A> {
    /// Create a pool keeping at most `max_free` released targets
    pub fn new(allocator: A, max_free: usize) -> Self {
        Self {
            allocator,
            free: Vec::new(),
            max_free,
            stats: PoolStats::default(),
        }
    }

    /// Get a target of exactly `size` (zero dimensions are clamped to 1)
    pub fn acquire(&mut self, role: TargetRole, size: TargetSize) -> RenderTarget<A::Target> {
        let size = TargetSize::new(size.width, size.height);

        if let Some(index) = self.free.iter().position(|t| t.size == size) {
            let mut target = self.free.swap_remove(index);
            target.role = role;
            self.stats.reuses += 1;
            log::debug!(
                "Reusing {}x{} target as {} (reuses: {})",
                size.width,
                size.height,
                role.label(),
                self.stats.reuses
            );
            return target;
        }

        if !self.free.is_empty() {
            let stale = self.free.remove(0);
            log::debug!(
                "Destroying stale {}x{} target before reallocating",
                stale.size.width,
                stale.size.height
            );
            self.destroy(stale);
        }

        self.stats.allocations += 1;
        log::debug!(
            "Allocating {} {}x{} (allocations: {})",
            role.label(),
            size.width,
            size.height,
            self.stats.allocations
        );
        RenderTarget {
            role,
            size,
            resource: self.allocator.allocate(role, size),
        }
    }

    /// Return a target for reuse by this widget
    pub fn release(&mut self, target: RenderTarget<A::Target>) {
        self.stats.releases += 1;
        if self.free.len() < self.max_free {
            self.free.push(target);
        } else {
            log::debug!(
                "Pool full, destroying {}x{} target",
                target.size.width,
                target.size.height
            );
            self.destroy(target);
        }
    }

    fn destroy(&mut self, target: RenderTarget<A::Target>) {
        self.stats.destroyed += 1;
        self.allocator.destroy(target.resource);
    }

    /// Destroy every free target
    pub fn clear(&mut self) {
        for target in std::mem::take(&mut self.free) {
            self.destroy(target);
        }
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: TargetAllocator> Drop for RenderTargetPool<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// GPU texture plus its default view
pub struct GpuTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Allocates Rgba8Unorm textures usable as render attachment, sampled
/// texture and storage image (vello writes the outline through storage)
pub struct WgpuAllocator {
    device: Arc<wgpu::Device>,
}

impl WgpuAllocator {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device }
    }
}

impl TargetAllocator for WgpuAllocator {
    type Target = GpuTarget;

    fn allocate(&mut self, role: TargetRole, size: TargetSize) -> GpuTarget {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(role.label()),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        GpuTarget { texture, view }
    }

    fn destroy(&mut self, target: GpuTarget) {
        target.texture.destroy();
    }
}
