//! Outline layer - rounded-rectangle stroke rendered through vello
//!
//! The stroke is drawn into its own target only when its shape changes and is
//! blitted over the fill every frame.

use std::sync::{Arc, Mutex};

use vello::kurbo::{Affine, RoundedRect, RoundedRectRadii, Stroke};
use vello::peniko::{Brush, Color};
use vello::{AaConfig, RenderParams, Renderer, Scene};

use crate::error::RenderError;
use crate::traits::OutlineShape;

/// Stroke geometry for `shape`, inset by half the width so the line stays inside the target
pub fn outline_path(shape: &OutlineShape) -> RoundedRect {
    let width = shape.size.width as f64;
    let height = shape.size.height as f64;
    let inset = (shape.width as f64 / 2.0).min(width / 2.0).min(height / 2.0);
    let radii = shape.radii;
    RoundedRect::new(
        inset,
        inset,
        width - inset,
        height - inset,
        RoundedRectRadii::new(
            (radii.top_left as f64 - inset).max(0.0),
            (radii.top_right as f64 - inset).max(0.0),
            (radii.bottom_right as f64 - inset).max(0.0),
            (radii.bottom_left as f64 - inset).max(0.0),
        ),
    )
}

pub struct OutlineLayer {
    /// Shared Vello renderer, created on first use
    vello_renderer: Arc<Mutex<Option<Renderer>>>,
    scene: Scene,
}

impl OutlineLayer {
    pub fn new(vello_renderer: Arc<Mutex<Option<Renderer>>>) -> Self {
        Self {
            vello_renderer,
            scene: Scene::new(),
        }
    }

    fn ensure_renderer(&self, device: &wgpu::Device) -> Result<(), RenderError> {
        let mut guard = self
            .vello_renderer
            .lock()
            .map_err(|_| RenderError::Outline("vello renderer lock poisoned".into()))?;
        if guard.is_none() {
            log::info!("Lazy-loading Vello renderer for glass outlines");
            let renderer = Renderer::new(
                device,
                vello::RendererOptions {
                    pipeline_cache: None,
                    ..Default::default()
                },
            )
            .map_err(|e| RenderError::Outline(e.to_string()))?;
            *guard = Some(renderer);
        }
        Ok(())
    }

    /// Redraw the outline into `target`, which must be `shape.size`
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        shape: &OutlineShape,
    ) -> Result<(), RenderError> {
        self.ensure_renderer(device)?;

        self.scene.reset();
        if !shape.is_empty() {
            let c = shape.color;
            let color = Color::new([c.r, c.g, c.b, c.a]);
            self.scene.stroke(
                &Stroke::new(shape.width as f64),
                Affine::IDENTITY,
                &Brush::Solid(color),
                None,
                &outline_path(shape),
            );
        }

        let mut guard = self
            .vello_renderer
            .lock()
            .map_err(|_| RenderError::Outline("vello renderer lock poisoned".into()))?;
        let Some(renderer) = guard.as_mut() else {
            return Err(RenderError::Outline("vello renderer unavailable".into()));
        };

        let params = RenderParams {
            base_color: Color::TRANSPARENT,
            width: shape.size.width,
            height: shape.size.height,
            antialiasing_method: AaConfig::Area,
        };
        renderer
            .render_to_texture(device, queue, &self.scene, target, &params)
            .map_err(|e| RenderError::Outline(e.to_string()))
    }
}
