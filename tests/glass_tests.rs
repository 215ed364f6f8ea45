//! Functional tests for the frosted-glass widget
//!
//! Drives `FrostedGlass` over an in-memory host tree with a simulated clock
//! and checks what reaches the backend.

mod common;

use std::time::{Duration, Instant};

use common::{FRAME, GlassTestHarness};
use frost_core::kernel::{LUMA, tap_spacing};
use frost_core::shading::{ClipMask, ShadeParams, shade};
use frost_core::{
    AncestorKind, Capabilities, Color, CornerRadii, GlassConfig, MockTree, NodeId,
    NotificationHub, PerformanceConfig, Property, PropertyValue, Rect, RedrawPump, Size,
    TargetSize, UpdateState, WidgetTree,
};
use frost_renderer::{BackendCall, DrawLayers, FrostedGlass, MockBackend};

// === Size policy and motion tracking ===

#[test]
fn test_static_panel_renders_once_then_idles() {
    let mut h = GlassTestHarness::new();

    assert_eq!(h.frame(), UpdateState::FullRefresh);
    assert_eq!(h.backend().blur_size(), Some(TargetSize::new(200, 200)));
    assert!(!h.glass.is_movable());
    h.assert_timer_stopped();

    h.clear_calls();
    let executed = h.run_for(Duration::from_millis(500));
    assert!(executed.is_empty(), "Static panel ran {:?}", executed);
    h.assert_quiet();
}

#[test]
fn test_reparent_into_scroll_caps_targets_and_starts_timer() {
    let mut h = GlassTestHarness::new();
    h.frame();

    h.advance(FRAME);
    h.reparent_into_scroll();
    assert_eq!(h.frame(), UpdateState::FullRefresh);

    assert!(h.glass.is_movable());
    assert_eq!(h.backend().blur_size(), Some(TargetSize::new(150, 150)));
    assert_eq!(h.backend().blur_allocations, 2);
    assert!(h.glass.scheduler().timer_running());
    assert!(h.pump.is_running());

    let period = h.glass.scheduler().timer_period();
    let expected = Duration::from_secs_f64(1.0 / 30.0);
    let diff = if period > expected { period - expected } else { expected - period };
    assert!(diff < Duration::from_millis(1), "Timer period {:?}", period);
}

#[test]
fn test_scrolling_reblurs_every_frame_without_realloc() {
    let mut h = GlassTestHarness::new();
    h.reparent_into_scroll();
    h.frame();
    h.advance(FRAME);
    h.clear_calls();

    for _ in 0..20 {
        h.scroll_by(4.0);
        assert_eq!(h.step(FRAME), UpdateState::PositionOnly);
    }

    let backend = h.backend();
    assert_eq!(backend.blur_runs(), 20);
    assert_eq!(backend.blur_allocations, 1);
    assert_eq!(backend.noise_runs(), 0);
    assert_eq!(backend.outline_runs(), 0);

    let composite = backend.last_composite().unwrap();
    assert_eq!(composite.position, [400.0, 20.0]);
    assert_eq!(composite.resolution, [200.0, 200.0]);
}

#[test]
fn test_scrolled_panel_settles_and_resumes() {
    let mut h = GlassTestHarness::new();
    h.reparent_into_scroll();
    h.frame();
    h.advance(FRAME);
    for _ in 0..10 {
        h.scroll_by(4.0);
        h.step(FRAME);
    }
    assert!(h.glass.scheduler().timer_running());

    // 15 still timer ticks at 30Hz
    h.run_for(Duration::from_millis(700));
    h.assert_timer_stopped();
    assert!(h.glass.is_movable());

    h.clear_calls();
    assert!(h.run_for(Duration::from_millis(300)).is_empty());
    h.assert_quiet();

    h.scroll_by(4.0);
    assert_eq!(h.step(FRAME), UpdateState::PositionOnly);
    assert!(h.glass.scheduler().timer_running());
    assert!(h.pump.is_running());
}

#[test]
fn test_detach_stops_timer_and_releases() {
    let mut h = GlassTestHarness::new();
    h.reparent_into_scroll();
    h.frame();
    assert!(h.pump.is_running());

    h.glass.detach();

    h.assert_timer_stopped();
    assert_eq!(h.hub().subscription_count(), 0);
    assert_eq!(h.backend().calls.last(), Some(&BackendCall::ReleaseTargets));

    h.clear_calls();
    h.scroll_by(4.0);
    assert_eq!(h.step(FRAME), UpdateState::Idle);
    h.assert_quiet();
}

// === Change notifications ===

#[test]
fn test_notification_burst_runs_one_pass() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let root = h.scene.tree.root();

    h.advance(Duration::from_millis(100));
    h.emit(root, Property::Position, PropertyValue::Vector([60.0, 50.0]));
    h.advance(Duration::from_millis(5));
    h.emit(root, Property::Position, PropertyValue::Vector([61.0, 50.0]));

    assert_eq!(h.frame(), UpdateState::PositionOnly);
    assert_eq!(h.step(Duration::from_millis(1)), UpdateState::Idle);
}

#[test]
fn test_notification_below_rounding_is_ignored() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let root = h.scene.tree.root();

    h.advance(Duration::from_millis(100));
    h.emit(root, Property::Position, PropertyValue::Vector([60.0, 50.0]));
    assert_eq!(h.frame(), UpdateState::PositionOnly);

    h.advance(Duration::from_millis(100));
    h.emit(root, Property::Position, PropertyValue::Vector([60.001, 50.0]));
    assert_eq!(h.frame(), UpdateState::Idle);
}

#[test]
fn test_own_moves_are_never_debounced() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let panel = h.scene.panel;

    h.advance(Duration::from_millis(20));
    h.scene.tree.set_bounds(panel, Rect::new(80.0, 50.0, 200.0, 200.0));
    h.emit(panel, Property::Position, PropertyValue::Vector([80.0, 50.0]));
    assert_eq!(h.frame(), UpdateState::PositionOnly);

    // Final move of a drag, well inside the debounce window
    h.advance(Duration::from_millis(8));
    h.scene.tree.set_bounds(panel, Rect::new(120.0, 50.0, 200.0, 200.0));
    h.emit(panel, Property::Position, PropertyValue::Vector([120.0, 50.0]));
    assert_eq!(h.frame(), UpdateState::PositionOnly);
    assert_eq!(h.backend().last_composite().unwrap().position, [120.0, 50.0]);

    h.run_for(Duration::from_secs(1));
    assert_eq!(h.backend().last_composite().unwrap().position, [120.0, 50.0]);
    let region = h.backend().last_blur().unwrap().region;
    assert_eq!(region.origin, [120.0 / 800.0, 50.0 / 600.0]);
}

#[test]
fn test_content_change_bypasses_debounce() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let (panel, background) = (h.scene.panel, h.scene.background);

    h.advance(Duration::from_millis(100));
    h.emit(panel, Property::Position, PropertyValue::Vector([60.0, 50.0]));
    h.emit(background, Property::ContentTextureChanged, PropertyValue::Event);

    h.clear_calls();
    assert_eq!(h.frame(), UpdateState::FullRefresh);
    assert_eq!(h.backend().blur_runs(), 1);
}

#[test]
fn test_background_swap_moves_subscriptions() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let old = h.scene.background;
    assert!(h.hub().subscriptions_on(old) > 0);

    let root = h.scene.tree.root();
    let replacement = h
        .scene
        .tree
        .add(root, AncestorKind::Generic, Rect::new(0.0, 0.0, 400.0, 300.0));
    h.glass
        .set_background(&h.scene.tree, &h.scene.hub, Some(replacement));

    assert_eq!(h.hub().subscriptions_on(old), 0);
    assert!(h.hub().subscriptions_on(replacement) > 0);

    h.clear_calls();
    assert_eq!(h.step(FRAME), UpdateState::FullRefresh);
    let region = h.backend().last_blur().unwrap().region;
    assert_eq!(region.origin, [50.0 / 400.0, 50.0 / 300.0]);
    assert_eq!(region.extent, [0.5, 200.0 / 300.0]);

    h.glass.set_background(&h.scene.tree, &h.scene.hub, None);
    h.clear_calls();
    h.step(FRAME);
    assert!(h.backend().calls.contains(&BackendCall::InvalidateBlur));
    assert_eq!(h.backend().blur_runs(), 0);
}

#[test]
fn test_outline_drawn_without_background() {
    let mut h = GlassTestHarness::new();
    h.frame();
    assert_eq!(
        h.glass.backend_mut().draw(),
        DrawLayers {
            fill: true,
            outline: true
        }
    );

    h.glass.set_background(&h.scene.tree, &h.scene.hub, None);
    h.step(FRAME);
    assert_eq!(
        h.glass.backend_mut().draw(),
        DrawLayers {
            fill: false,
            outline: true
        }
    );

    h.glass.configure(|c| c.outline_width = 0.0).unwrap();
    h.step(FRAME);
    assert!(h.glass.backend_mut().draw().is_empty());
}

// === Blur and composite inputs ===

#[test]
fn test_tap_spacing_grows_with_blur_size() {
    let mut h = GlassTestHarness::new();
    h.frame();

    let mut previous = 0.0;
    for blur_size in [5.0, 10.0, 25.0, 50.0, 100.0] {
        h.glass.configure(|c| c.blur_size = blur_size).unwrap();
        assert_eq!(h.step(FRAME), UpdateState::FullRefresh);
        let spacing = h.backend().last_blur().unwrap().spacing;
        assert!(spacing > previous, "{} !> {} at {}", spacing, previous, blur_size);
        assert_eq!(spacing, tap_spacing(blur_size, 1.0, 700.0));
        previous = spacing;
    }
}

#[test]
fn test_noise_opacity_does_not_touch_blur() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let before = *h.backend().last_blur().unwrap();

    h.glass.configure(|c| c.noise_opacity = 0.9).unwrap();
    h.clear_calls();
    assert_eq!(h.step(FRAME), UpdateState::PositionOnly);
    assert_eq!(h.backend().blur_runs(), 0);
    assert_eq!(h.backend().last_composite().unwrap().noise_opacity, 0.9);

    h.glass.mark_content_changed();
    h.step(FRAME);
    assert_eq!(*h.backend().last_blur().unwrap(), before);
}

#[test]
fn test_uniform_radius_clips_symmetrically() {
    let mut h = GlassTestHarness::new();
    h.frame();

    for (radius, expected) in [(0.0, 1.0), (10.0, 10.0), (40.0, 40.0), (500.0, 100.0)] {
        h.glass
            .configure(|c| c.border_radius = CornerRadii::uniform(radius))
            .unwrap();
        h.step(FRAME);
        let radii = h.backend().last_composite().unwrap().radii;
        assert_eq!(radii, [expected; 4], "radius {}", radius);

        let mask = ClipMask::rasterize(TargetSize::new(200, 200), &CornerRadii::from(radii));
        for (x, y) in [(0, 0), (2, 7), (15, 3), (30, 30), (99, 0)] {
            let v = mask.at(x, y);
            assert!((v - mask.at(199 - x, y)).abs() < 1e-5);
            assert!((v - mask.at(x, 199 - y)).abs() < 1e-5);
            assert!((v - mask.at(199 - x, 199 - y)).abs() < 1e-5);
        }
        assert_eq!(mask.at(100, 100), 1.0);
        if expected >= 10.0 {
            assert!(mask.at(0, 0) < 0.5);
        }
    }
}

#[test]
fn test_full_refresh_is_idempotent() {
    let mut h = GlassTestHarness::new();
    h.frame();
    let blur = *h.backend().last_blur().unwrap();
    let composite = *h.backend().last_composite().unwrap();
    let size = h.backend().blur_size();

    for _ in 0..2 {
        h.glass.mark_content_changed();
        h.clear_calls();
        assert_eq!(h.step(FRAME), UpdateState::FullRefresh);
        let backend = h.backend();
        assert_eq!(backend.last_blur(), Some(&blur));
        assert_eq!(backend.last_composite(), Some(&composite));
        assert_eq!(backend.blur_size(), size);
        assert_eq!(backend.blur_allocations, 1);
        assert_eq!(backend.noise_runs(), 0);
        assert_eq!(backend.outline_runs(), 0);
    }
}

#[test]
fn test_zero_saturation_renders_grey() {
    let config = GlassConfig {
        saturation: 0.0,
        luminosity: 1.0,
        overlay_color: Color::TRANSPARENT,
        noise_opacity: 0.0,
        ..Default::default()
    };
    let mut h = GlassTestHarness::with_config(config);
    h.frame();
    assert_eq!(h.backend().last_composite().unwrap().saturation, 0.0);

    let params = ShadeParams::from(h.glass.config());
    let [r, g, b] = shade([1.0, 0.0, 0.0], [0.5, 0.5, 0.5], &params);
    assert!((r - g).abs() < 1e-6 && (g - b).abs() < 1e-6);
    assert!((r - LUMA[0]).abs() < 1e-6);
}

// === Visibility gating ===

struct ScreenHost {
    tree: MockTree,
    hub: NotificationHub,
    home: NodeId,
    background: NodeId,
    glass: FrostedGlass<MockBackend>,
    now: Instant,
}

/// Two screens sharing a manager; the panel lives on "home"
fn screen_host() -> ScreenHost {
    let window = Size::new(800.0, 600.0);
    let mut tree = MockTree::new(window);
    let root = tree.root();
    let full = Rect::new(0.0, 0.0, window.width, window.height);
    let home = tree.add_screen(root, "home", full);
    tree.add_screen(root, "settings", full);

    let background = tree.add(home, AncestorKind::Generic, full);
    tree.set_capabilities(
        background,
        Capabilities::GEOMETRY.with(Property::ContentTextureChanged),
    );
    let panel = tree.add(home, AncestorKind::Generic, Rect::new(100.0, 100.0, 300.0, 200.0));

    let hub = NotificationHub::new();
    let now = Instant::now();
    let mut glass = FrostedGlass::new(
        panel,
        GlassConfig::default(),
        PerformanceConfig::default(),
        RedrawPump::new(),
        MockBackend::with_source(),
    )
    .unwrap();
    glass.attach(&tree, &hub, now);
    glass.set_background(&tree, &hub, Some(background));
    ScreenHost {
        tree,
        hub,
        home,
        background,
        glass,
        now,
    }
}

impl ScreenHost {
    fn step(&mut self) -> UpdateState {
        self.now += FRAME;
        self.glass.frame(self.now, &self.tree).unwrap()
    }
}

#[test]
fn test_inactive_screen_does_no_target_work() {
    let mut s = screen_host();
    assert_eq!(s.step(), UpdateState::FullRefresh);

    s.tree.set_current_screen("settings");
    s.hub
        .emit(s.home, Property::ExitedActiveState, PropertyValue::Event, s.now);
    s.glass.backend_mut().clear_calls();

    s.hub.emit(
        s.background,
        Property::ContentTextureChanged,
        PropertyValue::Event,
        s.now,
    );
    s.tree
        .set_bounds(s.glass.node(), Rect::new(120.0, 100.0, 300.0, 200.0));
    s.glass.mark_content_changed();
    for _ in 0..20 {
        assert_eq!(s.step(), UpdateState::Idle);
    }
    assert_eq!(s.glass.backend().target_ops(), 0);
    assert!(s.glass.backend().calls.is_empty());

    // The skipped full refresh replays once the screen is current again
    s.tree.set_current_screen("home");
    s.hub
        .emit(s.home, Property::EnteredActiveState, PropertyValue::Event, s.now);
    assert_eq!(s.step(), UpdateState::FullRefresh);
    assert_eq!(s.glass.backend().blur_runs(), 1);
    assert_eq!(
        s.glass.backend().last_composite().unwrap().position,
        [120.0, 100.0]
    );
}

#[test]
fn test_screen_transition_runs_timer_until_entered() {
    let mut s = screen_host();
    s.step();
    assert!(!s.glass.scheduler().timer_running());

    s.hub
        .emit(s.home, Property::ActiveStateEntering, PropertyValue::Event, s.now);
    s.step();
    assert!(s.glass.scheduler().timer_running());

    s.hub
        .emit(s.home, Property::EnteredActiveState, PropertyValue::Event, s.now);
    assert_eq!(s.step(), UpdateState::FullRefresh);
    assert!(!s.glass.scheduler().timer_running());
}

#[test]
fn test_hidden_widget_lets_host_idle() {
    let mut s = screen_host();
    s.step();

    s.tree.set_current_screen("settings");
    s.hub
        .emit(s.home, Property::ExitedActiveState, PropertyValue::Event, s.now);
    s.glass.configure(|c| c.blur_size = 40.0).unwrap();
    s.glass.backend_mut().clear_calls();

    let mut busy = 0;
    for _ in 0..100 {
        assert_eq!(s.step(), UpdateState::Idle);
        if s.glass.wants_frame() {
            busy += 1;
        }
    }
    assert_eq!(busy, 0);
    assert!(s.glass.scheduler().has_deferred());
    assert!(s.glass.backend().calls.is_empty());

    s.tree.set_current_screen("home");
    s.hub
        .emit(s.home, Property::EnteredActiveState, PropertyValue::Event, s.now);
    assert!(s.glass.wants_frame());
    assert_eq!(s.step(), UpdateState::FullRefresh);
    assert_eq!(
        s.glass.backend().last_blur().unwrap().spacing,
        tap_spacing(40.0, 1.0, 700.0)
    );
}

#[test]
fn test_screen_left_and_reentered_within_one_frame() {
    let mut s = screen_host();
    s.step();

    s.tree.set_current_screen("settings");
    s.hub
        .emit(s.home, Property::ExitedActiveState, PropertyValue::Event, s.now);
    s.tree.set_current_screen("home");
    s.hub
        .emit(s.home, Property::ActiveStateEntering, PropertyValue::Event, s.now);
    s.hub
        .emit(s.home, Property::EnteredActiveState, PropertyValue::Event, s.now);

    assert_eq!(s.step(), UpdateState::FullRefresh);
    assert!(!s.glass.scheduler().timer_running());
}

#[test]
fn test_screen_left_then_entering_keeps_transition_timer() {
    let mut s = screen_host();
    s.step();

    s.hub
        .emit(s.home, Property::ExitedActiveState, PropertyValue::Event, s.now);
    s.hub
        .emit(s.home, Property::ActiveStateEntering, PropertyValue::Event, s.now);
    s.step();
    assert!(s.glass.scheduler().timer_running());
}

#[test]
fn test_closed_popup_skips_ticks() {
    let mut tree = MockTree::new(Size::new(800.0, 600.0));
    let root = tree.root();
    let background = tree.add(root, AncestorKind::Generic, Rect::new(0.0, 0.0, 800.0, 600.0));
    let popup = tree.add(
        root,
        AncestorKind::ModalContainer,
        Rect::new(200.0, 150.0, 400.0, 300.0),
    );
    let panel = tree.add(popup, AncestorKind::Generic, Rect::new(220.0, 170.0, 360.0, 260.0));
    let hub = NotificationHub::new();
    let mut now = Instant::now();

    let mut glass = FrostedGlass::new(
        panel,
        GlassConfig::default(),
        PerformanceConfig::default(),
        RedrawPump::new(),
        MockBackend::with_source(),
    )
    .unwrap();
    glass.attach(&tree, &hub, now);
    glass.set_background(&tree, &hub, Some(background));
    assert_eq!(glass.frame(now, &tree).unwrap(), UpdateState::FullRefresh);
    assert!(tree.is_attached(panel));

    tree.detach(popup);
    glass.backend_mut().clear_calls();
    glass.mark_content_changed();
    now += FRAME;
    assert_eq!(glass.frame(now, &tree).unwrap(), UpdateState::Idle);
    assert!(glass.backend().calls.is_empty());
}
