//! Common test utilities and harness
//!
//! Provides reusable utilities for functional testing including:
//! - Test environment setup (temp directories, configs)
//! - A glass widget driven over the demo scene with a simulated clock
//! - Assertion utilities

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use frost::{DemoScene, WINDOW};
use frost_core::{
    GlassConfig, MockTree, NodeId, NotificationHub, PerformanceConfig, Property, PropertyValue,
    RedrawPump, UpdateState,
};
use frost_renderer::{FrostedGlass, MockBackend};
use tempfile::TempDir;

/// One display refresh at 60Hz
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Test environment with isolated config directory
pub struct TestEnvironment {
    /// Temporary directory for test config
    pub temp_dir: TempDir,
    /// Path to the config directory
    pub config_dir: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            config_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Write a test config file
    pub fn write_config(&self, content: &str) -> PathBuf {
        let config_path = self.config_path();
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// A glass widget over the demo scene, driven frame by frame
pub struct GlassTestHarness {
    pub scene: DemoScene,
    pub glass: FrostedGlass<MockBackend>,
    pub pump: RedrawPump,
    now: Instant,
}

impl GlassTestHarness {
    /// Panel at (50, 50) 200x200 over a full-window background, default config
    pub fn new() -> Self {
        Self::with_config(GlassConfig::default())
    }

    pub fn with_config(config: GlassConfig) -> Self {
        let scene = DemoScene::new(WINDOW);
        let pump = RedrawPump::new();
        let now = Instant::now();
        let mut glass = FrostedGlass::new(
            scene.panel,
            config,
            PerformanceConfig::default(),
            pump.clone(),
            MockBackend::with_source(),
        )
        .expect("Test config should be valid");
        glass.attach(&scene.tree, &scene.hub, now);
        glass.set_background(&scene.tree, &scene.hub, Some(scene.background));
        Self {
            scene,
            glass,
            pump,
            now,
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, by: Duration) -> Instant {
        self.now += by;
        self.now
    }

    /// Run one host frame at the current time
    pub fn frame(&mut self) -> UpdateState {
        self.glass
            .frame(self.now, &self.scene.tree)
            .expect("Mock backend never fails")
    }

    /// Advance the clock, then run a frame
    pub fn step(&mut self, by: Duration) -> UpdateState {
        self.advance(by);
        self.frame()
    }

    /// Run frames at 60Hz for `duration`, returning the executed (non-idle) states
    pub fn run_for(&mut self, duration: Duration) -> Vec<UpdateState> {
        let end = self.now + duration;
        let mut executed = Vec::new();
        while self.now < end {
            let state = self.step(FRAME);
            if !state.is_idle() {
                executed.push(state);
            }
        }
        executed
    }

    pub fn tree(&self) -> &MockTree {
        &self.scene.tree
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.scene.hub
    }

    pub fn backend(&self) -> &MockBackend {
        self.glass.backend()
    }

    pub fn clear_calls(&mut self) {
        self.glass.backend_mut().clear_calls();
    }

    /// Emit a notification on `node` at the current time
    pub fn emit(&self, node: NodeId, property: Property, value: PropertyValue) -> usize {
        self.scene.hub.emit(node, property, value, self.now)
    }

    /// Move the panel into the scroll viewport and re-resolve its ancestors
    pub fn reparent_into_scroll(&mut self) {
        self.scene.move_panel_into_scroll(self.now);
        self.glass.attach(&self.scene.tree, &self.scene.hub, self.now);
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scene.scroll_by(dy, self.now);
    }

    // === Assertion helpers ===

    /// Assert that nothing was sent to the backend since the last clear
    pub fn assert_quiet(&self) {
        assert!(
            self.backend().calls.is_empty(),
            "Expected no backend calls, got {:?}",
            self.backend().calls
        );
    }

    pub fn assert_timer_stopped(&self) {
        assert!(
            !self.glass.scheduler().timer_running(),
            "Refresh timer should be stopped"
        );
        assert!(!self.pump.is_running(), "Redraw pump should be idle");
    }
}

impl Default for GlassTestHarness {
    fn default() -> Self {
        Self::new()
    }
}
