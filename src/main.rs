//! FROST headless demo
//!
//! Renders a frosted panel over a procedural background, moves it into a
//! scroll viewport, scrolls, and lets it settle. Every tenth frame is written
//! as a PNG into the directory given as the first argument.

mod capture;
mod gpu;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use frost::{DemoScene, WINDOW, background_pixels};
use frost_config::Config;
use frost_core::{RedrawPump, UpdateState};
use frost_renderer::{BlitPipeline, FrostedGlass, WgpuGlassBackend};
use gpu::{FRAME_FORMAT, GpuContext};

/// Total frames rendered
const FRAMES: u32 = 100;
/// Frame at which the panel is reparented into the scroll viewport
const REPARENT_FRAME: u32 = 10;
/// Frames during which the viewport scrolls
const SCROLL_FRAMES: std::ops::Range<u32> = 20..60;
/// Pixels scrolled per frame
const SCROLL_STEP: f32 = 4.0;
/// Simulated display refresh
const FRAME_PERIOD: Duration = Duration::from_micros(16_667);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,frost=info"))
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("frost-frames"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        Config::default()
    });

    let gpu = GpuContext::new()?;
    let (width, height) = (WINDOW.width as u32, WINDOW.height as u32);

    let mut scene = DemoScene::new(WINDOW);
    let background = gpu.upload("Demo Background", &background_pixels(width, height));
    let background_view = background.create_view(&Default::default());

    let mut backend = WgpuGlassBackend::new(
        gpu.device.clone(),
        gpu.queue.clone(),
        FRAME_FORMAT,
        gpu.vello_renderer.clone(),
    )?;
    backend.bind_source(Some(background.create_view(&Default::default())));

    let pump = RedrawPump::new();
    let mut glass = FrostedGlass::new(
        scene.panel,
        config.glass.clone(),
        config.performance.clone(),
        pump.clone(),
        backend,
    )?
    .with_density(config.display.density);

    let start = Instant::now();
    glass.attach(&scene.tree, &scene.hub, start);
    glass.set_background(&scene.tree, &scene.hub, Some(scene.background));

    // The same blit that places the outline presents the background
    let mut presenter = BlitPipeline::new(&gpu.device, FRAME_FORMAT)?;
    let full = [WINDOW.width, WINDOW.height];
    presenter.set_placement([0.0, 0.0], full, full, 1.0)?;
    presenter.flush(&gpu.queue);
    let background_group = presenter
        .create_bind_group(&gpu.device, &background_view)
        .context("Blit pipeline has no uniform buffer")?;

    let frame_texture = gpu.frame_target(width, height);
    let frame_view = frame_texture.create_view(&Default::default());

    for index in 0..FRAMES {
        let now = start + FRAME_PERIOD * index;

        if index == REPARENT_FRAME {
            scene.move_panel_into_scroll(now);
            glass.attach(&scene.tree, &scene.hub, now);
        }
        if SCROLL_FRAMES.contains(&index) {
            scene.scroll_by(SCROLL_STEP, now);
        }

        let state = glass.frame(now, &scene.tree)?;
        if state != UpdateState::Idle {
            log::info!(
                "frame {:3}: {:?} (movable={}, timer={}, pump={})",
                index,
                state,
                glass.is_movable(),
                glass.scheduler().timer_running(),
                pump.is_running()
            );
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Demo Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Demo Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            presenter.render(&mut pass, &background_group);
            glass.backend().draw(&mut pass);
        }
        gpu.queue.submit(Some(encoder.finish()));

        if index % 10 == 0 || index == FRAMES - 1 {
            let image = capture::read_texture(&gpu.device, &gpu.queue, &frame_texture)?;
            let path = out_dir.join(format!("frame_{:03}.png", index));
            image
                .save(&path)
                .with_context(|| format!("Failed to write {:?}", path))?;
            log::info!("Wrote {:?}", path);
        }
    }

    log::info!(
        "Done: movable={}, timer running={}, pump running={}",
        glass.is_movable(),
        glass.scheduler().timer_running(),
        pump.is_running()
    );
    glass.detach();
    Ok(())
}
