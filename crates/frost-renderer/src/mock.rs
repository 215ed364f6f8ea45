//! Mock backend for testing
//!
//! Provides a MockBackend that implements [`GlassBackend`] and records all
//! calls for test assertions, without requiring GPU context.

use frost_core::TargetSize;

use crate::error::RenderError;
use crate::traits::*;

/// Record of a backend call for test inspection
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    PrepareBlurTargets(TargetSize),
    RenderBlur(BlurParams),
    RenderNoise(TargetSize),
    UpdateComposite(CompositeUniforms),
    RenderOutline(OutlineShape),
    InvalidateBlur,
    ReleaseTargets,
}

impl BackendCall {
    /// True for calls that allocate, write or free a render target
    pub fn is_target_op(&self) -> bool {
        !matches!(self, BackendCall::UpdateComposite(_))
    }
}

/// A backend that records all calls instead of rendering
#[derive(Debug, Default)]
pub struct MockBackend {
    /// All calls made to this backend
    pub calls: Vec<BackendCall>,
    /// Whether a background texture counts as bound
    pub source_bound: bool,
    blur_size: Option<TargetSize>,
    /// Number of blur target reallocations
    pub blur_allocations: usize,
    blur_ready: bool,
    has_outline: bool,
    /// Layers shown by each host draw
    pub draws: Vec<DrawLayers>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with a background texture already bound
    pub fn with_source() -> Self {
        Self {
            source_bound: true,
            ..Default::default()
        }
    }

    /// Clear all recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Model the host drawing the glass into its frame pass
    pub fn draw(&mut self) -> DrawLayers {
        let layers = self.layers();
        self.draws.push(layers);
        layers
    }

    pub fn last_draw(&self) -> Option<DrawLayers> {
        self.draws.last().copied()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    // === Assertion helpers ===

    pub fn target_ops(&self) -> usize {
        self.calls.iter().filter(|c| c.is_target_op()).count()
    }

    pub fn blur_runs(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::RenderBlur(_)))
            .count()
    }

    pub fn noise_runs(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::RenderNoise(_)))
            .count()
    }

    pub fn outline_runs(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::RenderOutline(_)))
            .count()
    }

    /// Current size of the blur targets, if allocated
    pub fn blur_size(&self) -> Option<TargetSize> {
        self.blur_size
    }

    pub fn last_blur(&self) -> Option<&BlurParams> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::RenderBlur(params) => Some(params),
            _ => None,
        })
    }

    pub fn last_composite(&self) -> Option<&CompositeUniforms> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::UpdateComposite(uniforms) => Some(uniforms),
            _ => None,
        })
    }
}

impl GlassBackend for MockBackend {
    fn has_source(&self) -> bool {
        self.source_bound
    }

    fn prepare_blur_targets(&mut self, size: TargetSize) -> bool {
        self.calls.push(BackendCall::PrepareBlurTargets(size));
        if self.blur_size == Some(size) {
            return false;
        }
        self.blur_size = Some(size);
        self.blur_allocations += 1;
        self.blur_ready = false;
        true
    }

    fn render_blur(&mut self, params: &BlurParams) -> Result<(), RenderError> {
        self.calls.push(BackendCall::RenderBlur(*params));
        self.blur_ready = self.source_bound && self.blur_size.is_some();
        Ok(())
    }

    fn render_noise(&mut self, size: TargetSize) {
        self.calls.push(BackendCall::RenderNoise(size));
    }

    fn update_composite(&mut self, uniforms: &CompositeUniforms) -> Result<(), RenderError> {
        self.calls.push(BackendCall::UpdateComposite(*uniforms));
        Ok(())
    }

    fn render_outline(&mut self, shape: &OutlineShape) -> Result<(), RenderError> {
        self.calls.push(BackendCall::RenderOutline(*shape));
        self.has_outline = !shape.is_empty();
        Ok(())
    }

    fn invalidate_blur(&mut self) {
        self.calls.push(BackendCall::InvalidateBlur);
        self.blur_ready = false;
    }

    fn release_targets(&mut self) {
        self.calls.push(BackendCall::ReleaseTargets);
        self.blur_size = None;
        self.blur_ready = false;
        self.has_outline = false;
    }

    fn layers(&self) -> DrawLayers {
        DrawLayers::select(self.source_bound, self.blur_ready, self.has_outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls() {
        let mut backend = MockBackend::with_source();
        assert!(backend.prepare_blur_targets(TargetSize::new(10, 10)));
        assert!(!backend.prepare_blur_targets(TargetSize::new(10, 10)));
        backend.update_composite(&CompositeUniforms::default()).unwrap();
        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.target_ops(), 2);
        assert_eq!(backend.blur_allocations, 1);
    }

    #[test]
    fn test_outline_drawn_without_fill() {
        let mut backend = MockBackend::new();
        let shape = OutlineShape {
            size: TargetSize::new(10, 10),
            radii: frost_core::CornerRadii::uniform(2.0),
            width: 1.0,
            color: frost_core::Color::WHITE,
        };
        backend.render_outline(&shape).unwrap();
        assert_eq!(
            backend.draw(),
            DrawLayers {
                fill: false,
                outline: true
            }
        );

        backend.release_targets();
        assert!(backend.draw().is_empty());
        assert_eq!(backend.draws.len(), 2);
    }

    #[test]
    fn test_release_forgets_size() {
        let mut backend = MockBackend::new();
        backend.prepare_blur_targets(TargetSize::new(10, 10));
        backend.release_targets();
        assert_eq!(backend.blur_size(), None);
    }
}
