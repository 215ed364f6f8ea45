//! Config file tests
//!
//! Loads configuration files from an isolated directory and checks that the
//! values reach a widget built from them.

mod common;

use common::{FRAME, TestEnvironment};
use frost::{DemoScene, WINDOW};
use frost_config::{Config, ConfigError};
use frost_core::{Color, CornerRadii, RedrawPump, TargetSize, UpdateState};
use frost_renderer::{FrostedGlass, MockBackend};

fn glass_from(config: &Config, scene: &DemoScene) -> FrostedGlass<MockBackend> {
    FrostedGlass::new(
        scene.panel,
        config.glass.clone(),
        config.performance.clone(),
        RedrawPump::new(),
        MockBackend::with_source(),
    )
    .expect("Loaded config should be valid")
    .with_density(config.display.density)
}

#[test]
fn test_loaded_config_drives_widget() {
    let env = TestEnvironment::new();
    let path = env.write_config(
        r#"
[glass]
blur_size = 20.0
overlay_color = [0.1, 0.2, 0.3, 0.4]
border_radius = [16.0, 16.0, 4.0, 4.0]
downscale_factor = 2

[performance]
movable_cap = 100

[display]
density = 2.0
"#,
    );
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.glass.overlay_color, Color::rgba(0.1, 0.2, 0.3, 0.4));
    assert_eq!(config.glass.border_radius, CornerRadii::new(16.0, 16.0, 4.0, 4.0));

    let mut scene = DemoScene::new(WINDOW);
    let mut glass = glass_from(&config, &scene);
    let mut now = std::time::Instant::now();
    glass.attach(&scene.tree, &scene.hub, now);
    glass.set_background(&scene.tree, &scene.hub, Some(scene.background));
    assert_eq!(glass.frame(now, &scene.tree).unwrap(), UpdateState::FullRefresh);

    // Static: min(200, 250) / 2
    assert_eq!(glass.backend().blur_size(), Some(TargetSize::new(100, 100)));
    // Density doubles the effective blur size
    let spacing = glass.backend().last_blur().unwrap().spacing;
    assert_eq!(spacing, frost_core::kernel::tap_spacing(40.0, 1.0, 700.0));

    let composite = glass.backend().last_composite().unwrap();
    assert_eq!(composite.overlay, [0.1, 0.2, 0.3, 0.4]);
    assert_eq!(composite.radii, [16.0, 16.0, 4.0, 4.0]);

    // Movable: min(200, 100) / 2
    now += FRAME;
    scene.move_panel_into_scroll(now);
    glass.attach(&scene.tree, &scene.hub, now);
    glass.frame(now, &scene.tree).unwrap();
    assert_eq!(glass.backend().blur_size(), Some(TargetSize::new(50, 50)));
}

#[test]
fn test_refresh_rate_from_config() {
    let env = TestEnvironment::new();
    let path = env.write_config("[performance]\nrefresh_hz = 60.0\nsettle_ticks = 5\n");
    let config = Config::load_from(&path).unwrap();

    let scene = DemoScene::new(WINDOW);
    let glass = glass_from(&config, &scene);
    let period = glass.scheduler().timer_period().as_secs_f64();
    assert!((period - 1.0 / 60.0).abs() < 1e-4);
}

#[test]
fn test_default_file_round_trips() {
    let env = TestEnvironment::new();
    let path = env.config_path();
    Config::write_default_config(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_invalid_values_are_reported() {
    let env = TestEnvironment::new();
    let path = env.write_config("[glass]\ndownscale_factor = 0\n");
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("downscale_factor"));

    let path = env.write_config("[display]\ndensity = 0.0\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::Invalid(_))
    ));
}
