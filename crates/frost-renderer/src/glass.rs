//! The frosted-glass widget
//!
//! [`FrostedGlass`] ties the host tree, the notification hub and a
//! [`GlassBackend`] together. Notifications only record work in a shared
//! [`ChangeSink`]; the host then calls [`FrostedGlass::frame`] once per frame
//! and the widget decides there whether to skip, reposition, or re-render.
//!
//! Per tick, in order: drain notifications into the scheduler, read geometry,
//! gate on visibility, prepare targets, run blur/noise/outline passes whose
//! inputs changed, and stage the composite uniforms.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use frost_core::kernel::{tap_scale, tap_spacing};
use frost_core::policy::{blur_cap, blur_target_size, noise_target_size};
use frost_core::{
    BindingSet, Change, ChangeListener, ChangeThrottle, ConfigError, FrameState, GeometryTracker,
    GlassConfig, NodeId, NotificationProvider, PerformanceConfig, Property, Rect, RedrawPump,
    TargetSize, Trigger, UpdateScheduler, UpdateState, WidgetTree,
};

use crate::error::RenderError;
use crate::traits::{BlurParams, CompositeUniforms, GlassBackend, OutlineShape, SourceRegion};

/// Receives notifications and records what the next tick has to do
pub struct ChangeSink {
    /// The glass widget's own node; its geometry is never debounced
    widget: NodeId,
    throttle: RefCell<ChangeThrottle>,
    /// Nearest screen page of the widget
    screen: Cell<Option<NodeId>>,
    update: Trigger,
    refresh: Trigger,
    content: Trigger,
    motion: Trigger,
    entering: Trigger,
    entered: Trigger,
    exited: Trigger,
}

impl ChangeSink {
    fn new(widget: NodeId, perf: &PerformanceConfig) -> Self {
        Self {
            widget,
            throttle: RefCell::new(ChangeThrottle::new(perf.throttle_window())),
            screen: Cell::new(None),
            update: Trigger::new(),
            refresh: Trigger::new(),
            content: Trigger::new(),
            motion: Trigger::new(),
            entering: Trigger::new(),
            entered: Trigger::new(),
            exited: Trigger::new(),
        }
    }

    /// Any notification is waiting for the next tick
    fn is_armed(&self) -> bool {
        [
            &self.update,
            &self.refresh,
            &self.content,
            &self.motion,
            &self.entering,
            &self.entered,
            &self.exited,
        ]
        .iter()
        .any(|t| t.is_armed())
    }

    fn clear(&self) {
        for trigger in [
            &self.update,
            &self.refresh,
            &self.content,
            &self.motion,
            &self.entering,
            &self.entered,
            &self.exited,
        ] {
            trigger.cancel();
        }
    }
}

impl ChangeListener for ChangeSink {
    fn on_change(&self, change: &Change) {
        let own_screen = self.screen.get() == Some(change.node);
        match change.property {
            // Lifecycle events are never debounced
            Property::ActiveStateEntering if own_screen => self.entering.fire(),
            Property::EnteredActiveState if own_screen => self.entered.fire(),
            Property::ExitedActiveState if own_screen => self.exited.fire(),
            Property::EnteredActiveState => self.refresh.fire(),
            Property::ActiveStateEntering | Property::ExitedActiveState => {}
            Property::ContentTextureChanged => self.content.fire(),
            // A debounced final move of the widget itself would never be applied
            Property::Position | Property::Size if change.node == self.widget => {
                self.update.fire();
                self.motion.fire();
            }
            Property::PopupOpening => {
                if self.throttle.borrow_mut().admit(&change.value, change.at) {
                    self.refresh.fire();
                }
            }
            Property::Position | Property::Size | Property::ScrollOffsetX | Property::ScrollOffsetY => {
                if self.throttle.borrow_mut().admit(&change.value, change.at) {
                    self.update.fire();
                    self.motion.fire();
                }
            }
        }
    }
}

/// Inputs that decide whether the blur output is still valid
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlurKey {
    params: BlurParams,
    size: TargetSize,
    generation: u64,
}

/// A frosted-glass widget bound to one host node
pub struct FrostedGlass<B: GlassBackend> {
    node: NodeId,
    config: GlassConfig,
    perf: PerformanceConfig,
    /// Display density scaling `blur_size`
    density: f32,
    background: Option<NodeId>,
    backend: B,

    tracker: GeometryTracker,
    scheduler: UpdateScheduler,
    sink: Rc<ChangeSink>,
    bindings: BindingSet,
    attached: bool,
    eligible: bool,

    blur_target: Option<TargetSize>,
    blur_key: Option<BlurKey>,
    noise_size: Option<TargetSize>,
    outline: Option<OutlineShape>,
    composite: Option<CompositeUniforms>,
    content_generation: u64,
    /// Bounds seen by the previous tick, applied or not
    last_seen: Option<Rect>,
}

impl<B: GlassBackend> FrostedGlass<B> {
    /// Create a detached widget for `node`
    pub fn new(
        node: NodeId,
        config: GlassConfig,
        perf: PerformanceConfig,
        pump: RedrawPump,
        backend: B,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            node,
            scheduler: UpdateScheduler::new(&perf, pump),
            sink: Rc::new(ChangeSink::new(node, &perf)),
            config,
            perf,
            density: 1.0,
            background: None,
            backend,
            tracker: GeometryTracker::new(node),
            bindings: BindingSet::new(),
            attached: false,
            eligible: false,
            blur_target: None,
            blur_key: None,
            noise_size: None,
            outline: None,
            composite: None,
            content_generation: 0,
            last_seen: None,
        })
    }

    /// Scale blur size for a display of `density` pixels per dp
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density.max(0.0);
        self
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn config(&self) -> &GlassConfig {
        &self.config
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_movable(&self) -> bool {
        self.tracker.is_movable()
    }

    fn listener(&self) -> Weak<dyn ChangeListener> {
        let sink: Rc<dyn ChangeListener> = self.sink.clone();
        Rc::downgrade(&sink)
    }

    fn rebind(&mut self, tree: &dyn WidgetTree, provider: &dyn NotificationProvider) {
        // Release the old subscriptions before taking new ones
        self.bindings.clear();
        let listener = self.listener();
        self.bindings = BindingSet::bind(tree, provider, self.node, self.background, &listener);
    }

    /// Attach to the tree, or re-resolve ancestors after a reparent
    pub fn attach(&mut self, tree: &dyn WidgetTree, provider: &dyn NotificationProvider, now: Instant) {
        if self.tracker.attach(tree) {
            log::info!(
                "Widget {} is now {}",
                self.node,
                if self.tracker.is_movable() { "movable" } else { "static" }
            );
        }
        self.sink.screen.set(self.tracker.chain().screen);
        self.rebind(tree, provider);
        self.attached = true;
        self.eligible = self.tracker.is_movable() && !self.tracker.screen_inactive(tree);
        self.scheduler.set_tracking_eligible(self.eligible, now);
        self.scheduler.request(UpdateState::FullRefresh);
    }

    /// Swap the sampled background. Bindings move to the new subtree.
    pub fn set_background(
        &mut self,
        tree: &dyn WidgetTree,
        provider: &dyn NotificationProvider,
        background: Option<NodeId>,
    ) {
        if self.background == background {
            return;
        }
        log::info!("Widget {} background: {:?} -> {:?}", self.node, self.background, background);
        if background.is_some() && !self.backend.has_source() {
            log::warn!("Widget {} has no background texture bound; fill is skipped", self.node);
        }
        self.background = background;
        self.content_generation += 1;
        if self.attached {
            self.rebind(tree, provider);
        }
        self.scheduler.request(UpdateState::FullRefresh);
    }

    /// The bound texture changed without a notification from the tree
    pub fn mark_content_changed(&mut self) {
        self.content_generation += 1;
        self.scheduler.request(UpdateState::FullRefresh);
    }

    /// Replace the configuration. Blur size and downscale changes need new
    /// targets; anything else only restages uniforms.
    pub fn set_config(&mut self, config: GlassConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let full = config.blur_size != self.config.blur_size
            || config.downscale_factor != self.config.downscale_factor;
        self.config = config;
        self.scheduler.request(if full {
            UpdateState::FullRefresh
        } else {
            UpdateState::PositionOnly
        });
        Ok(())
    }

    /// Edit the configuration in place
    pub fn configure(&mut self, edit: impl FnOnce(&mut GlassConfig)) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        edit(&mut config);
        self.set_config(config)
    }

    /// Drop every subscription, timer and render target
    pub fn detach(&mut self) {
        log::info!("Widget {} detached", self.node);
        self.bindings.clear();
        self.sink.clear();
        self.sink.screen.set(None);
        self.scheduler.reset();
        self.tracker.detach();
        self.backend.release_targets();
        self.attached = false;
        self.eligible = false;
        self.blur_target = None;
        self.blur_key = None;
        self.noise_size = None;
        self.outline = None;
        self.composite = None;
        self.last_seen = None;
    }

    /// Something is pending for the next frame regardless of timers
    pub fn wants_frame(&self) -> bool {
        self.attached && (self.scheduler.wants_frame() || self.sink.is_armed())
    }

    /// Earliest timer deadline, for hosts that sleep between frames
    pub fn next_wake(&self) -> Option<Instant> {
        self.scheduler.next_wake()
    }

    /// Touches inside the widget are consumed; everything else passes through
    pub fn hit_test(&self, tree: &dyn WidgetTree, x: f32, y: f32) -> bool {
        self.attached && tree.bounds(self.node).is_some_and(|b| b.contains(x, y))
    }

    /// Lifecycle triggers are applied in the order a screen goes through
    /// them, so a screen that left and came back within one frame ends up
    /// entered with a full refresh.
    fn drain_events(&mut self, now: Instant) {
        if self.sink.exited.take() {
            log::debug!("Widget {} screen exited", self.node);
            self.scheduler.suspend(now);
        }
        if self.sink.entering.take() {
            self.scheduler.begin_transition(now);
        }
        if self.sink.entered.take() {
            self.scheduler.end_transition(now);
            self.scheduler.request(UpdateState::FullRefresh);
        }
        if self.sink.content.take() {
            self.content_generation += 1;
            self.scheduler.request(UpdateState::FullRefresh);
        }
        if self.sink.refresh.take() {
            self.scheduler.request(UpdateState::FullRefresh);
        }
        if self.sink.update.take() {
            self.scheduler.request(UpdateState::PositionOnly);
        }
        if self.sink.motion.take() {
            self.scheduler.note_motion(now);
        }
    }

    /// Run one host frame. Returns the work actually performed.
    pub fn frame(&mut self, now: Instant, tree: &dyn WidgetTree) -> Result<UpdateState, RenderError> {
        if !self.attached {
            return Ok(UpdateState::Idle);
        }
        self.drain_events(now);

        let eligible = self.tracker.is_movable() && !self.tracker.screen_inactive(tree);
        if eligible != self.eligible {
            self.eligible = eligible;
            self.scheduler.set_tracking_eligible(eligible, now);
        }

        let mut state = self.scheduler.poll(now);
        if state.is_idle() {
            return Ok(UpdateState::Idle);
        }

        let Some(frame) = self.tracker.read(tree) else {
            log::debug!("Widget {} has no layout yet", self.node);
            self.scheduler.defer(state);
            return Ok(UpdateState::Idle);
        };

        let moved = self.last_seen != Some(frame.bounds);
        self.last_seen = Some(frame.bounds);
        self.scheduler.report_motion(moved, now);

        let visibility = self.tracker.visibility(tree, &frame);
        if visibility.not_current_screen
            || visibility.popup_closed
            || (visibility.out_of_window && self.blur_key.is_some())
        {
            log::debug!("Widget {} skipped tick: {:?}", self.node, visibility);
            self.scheduler.defer(state);
            return Ok(UpdateState::Idle);
        }

        if self.tracker.size_changed(&frame) {
            state = UpdateState::FullRefresh;
        }
        self.apply(state, tree, &frame)?;
        self.tracker.remember(frame);
        Ok(state)
    }

    fn apply(&mut self, state: UpdateState, tree: &dyn WidgetTree, frame: &FrameState) -> Result<(), RenderError> {
        let size = frame.size();
        let full = state == UpdateState::FullRefresh;

        if full || self.blur_target.is_none() {
            let cap = blur_cap(&self.perf, self.tracker.is_movable());
            let target = blur_target_size(size, cap, self.config.downscale_factor);
            if self.backend.prepare_blur_targets(target) {
                log::debug!(
                    "Widget {} blur targets {}x{} (cap {})",
                    self.node,
                    target.width,
                    target.height,
                    cap
                );
                self.blur_key = None;
            }
            self.blur_target = Some(target);

            let noise = noise_target_size(size);
            if self.noise_size != Some(noise) {
                self.backend.render_noise(noise);
                self.noise_size = Some(noise);
            }
        }

        match (self.blur_params(tree, frame), self.blur_target) {
            (Some(params), Some(size)) => {
                let key = BlurKey {
                    params,
                    size,
                    generation: self.content_generation,
                };
                if full || self.blur_key != Some(key) {
                    self.backend.render_blur(&params)?;
                    self.blur_key = Some(key);
                }
            }
            _ => {
                if self.blur_key.take().is_some() {
                    self.backend.invalidate_blur();
                }
            }
        }

        let uniforms = self.composite_uniforms(frame);
        if full || self.composite != Some(uniforms) {
            self.backend.update_composite(&uniforms)?;
            self.composite = Some(uniforms);
        }

        let shape = OutlineShape {
            size: TargetSize::from_size(size),
            radii: self.config.border_radius.effective(size),
            width: self.config.outline_width,
            color: self.config.outline_color,
        };
        if self.outline != Some(shape) {
            self.backend.render_outline(&shape)?;
            self.outline = Some(shape);
        }
        Ok(())
    }

    /// Blur inputs for the current frame; `None` without a usable background
    fn blur_params(&self, tree: &dyn WidgetTree, frame: &FrameState) -> Option<BlurParams> {
        if !self.backend.has_source() {
            return None;
        }
        let bg = tree.bounds(self.background?)?;
        if bg.width <= 0.0 || bg.height <= 0.0 {
            return None;
        }
        let position = frame.position();
        let size = frame.size();
        Some(BlurParams {
            region: SourceRegion {
                origin: [(position.x - bg.x) / bg.width, (position.y - bg.y) / bg.height],
                extent: [size.width / bg.width, size.height / bg.height],
            },
            spacing: tap_spacing(self.config.blur_size, self.density, frame.mean_resolution()),
            vertical_scale: tap_scale(frame.window.height, bg.height),
            horizontal_scale: tap_scale(frame.window.width, size.width),
        })
    }

    fn composite_uniforms(&self, frame: &FrameState) -> CompositeUniforms {
        let position = frame.position();
        let size = frame.size();
        CompositeUniforms {
            position: [position.x, position.y],
            resolution: [size.width, size.height],
            viewport: [frame.window.width, frame.window.height],
            overlay: self.config.overlay_color.to_array(),
            radii: self.config.border_radius.effective(size).to_array(),
            opacity: self.config.opacity,
            luminosity: self.config.luminosity,
            saturation: self.config.saturation,
            noise_opacity: self.config.noise_opacity,
        }
    }
}
