//! Update scheduling
//!
//! The host drives every widget by calling its `frame` once per presented
//! frame. This module decides what each call has to do: nothing, the cheap
//! reposition path, or a full refresh. It also owns the periodic refresh timer
//! used while a widget can move without notifying us (scrolling, screen
//! transitions) and the [`RedrawPump`] that tells the host continuous
//! presentation is needed while that timer runs.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::PerformanceConfig;

/// Work required by the next tick, ordered by cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum UpdateState {
    #[default]
    Idle,
    /// Recompute position/resolution uniforms, reuse render targets
    PositionOnly,
    /// Re-plan render targets, regenerate noise, re-run every pass
    FullRefresh,
}

impl UpdateState {
    /// Coalesce two requests; the more expensive one wins
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, UpdateState::Idle)
    }
}

/// One-shot zero-delay request; firing it repeatedly before the next tick
/// still runs the work once
#[derive(Debug, Default)]
pub struct Trigger {
    armed: Cell<bool>,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.armed.set(true);
    }

    pub fn cancel(&self) {
        self.armed.set(false);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Consume the request; true if it was armed
    pub fn take(&self) -> bool {
        self.armed.replace(false)
    }
}

/// Cancelable fixed-period timer polled from the frame loop
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the timer; keeps the current phase if already running
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.period);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns true once per elapsed period. Missed periods collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let mut next = due + self.period;
                if next <= now {
                    next = now + self.period;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// Shared "keep presenting frames" request
///
/// Created once by the application and handed to every widget. A widget holds
/// a [`PumpGuard`] while it needs continuous redraw; the host keeps requesting
/// frames while any guard is alive.
#[derive(Debug, Clone, Default)]
pub struct RedrawPump {
    holders: Rc<Cell<usize>>,
}

impl RedrawPump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self) -> PumpGuard {
        self.holders.set(self.holders.get() + 1);
        PumpGuard {
            holders: self.holders.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.holders.get() > 0
    }

    pub fn holders(&self) -> usize {
        self.holders.get()
    }
}

/// Keeps the pump running until dropped
#[derive(Debug)]
pub struct PumpGuard {
    holders: Rc<Cell<usize>>,
}

impl Drop for PumpGuard {
    fn drop(&mut self) {
        self.holders.set(self.holders.get().saturating_sub(1));
    }
}

/// Per-widget tick planner
#[derive(Debug)]
pub struct UpdateScheduler {
    pending: UpdateState,
    /// Full refresh skipped by visibility gating, replayed once visible
    deferred_full: bool,
    timer: IntervalTimer,
    /// Widget is movable and its screen is active
    tracking_eligible: bool,
    /// Motion timer armed (eligible and not yet settled)
    tracking: bool,
    /// Parent screen transition in flight
    transition: bool,
    still_ticks: u32,
    settle_ticks: u32,
    pump: RedrawPump,
    guard: Option<PumpGuard>,
}

impl UpdateScheduler {
    pub fn new(perf: &PerformanceConfig, pump: RedrawPump) -> Self {
        Self {
            pending: UpdateState::Idle,
            deferred_full: false,
            timer: IntervalTimer::new(perf.refresh_period()),
            tracking_eligible: false,
            tracking: false,
            transition: false,
            still_ticks: 0,
            settle_ticks: perf.settle_ticks.max(1),
            pump,
            guard: None,
        }
    }

    /// Defer work to the next tick, coalescing with anything already pending
    pub fn request(&mut self, state: UpdateState) {
        self.pending = self.pending.merge(state);
    }

    pub fn pending(&self) -> UpdateState {
        self.pending
    }

    /// True if the next tick has work regardless of timers. A gated full
    /// refresh does not count: it waits for the notification that makes the
    /// widget visible again, so a hidden widget lets the host go idle.
    pub fn wants_frame(&self) -> bool {
        !self.pending.is_idle()
    }

    /// A full refresh was skipped by visibility gating and is still owed
    pub fn has_deferred(&self) -> bool {
        self.deferred_full
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn timer_period(&self) -> Duration {
        self.timer.period()
    }

    /// Earliest instant a tick will have timer work
    pub fn next_wake(&self) -> Option<Instant> {
        self.timer.next_due()
    }

    /// Movable/active classification changed
    pub fn set_tracking_eligible(&mut self, eligible: bool, now: Instant) {
        if self.tracking_eligible != eligible {
            log::debug!("Motion tracking eligibility: {}", eligible);
        }
        self.tracking_eligible = eligible;
        self.tracking = eligible;
        self.still_ticks = 0;
        self.sync_timer(now);
    }

    /// Geometry moved; (re)arm motion tracking if eligible
    pub fn note_motion(&mut self, now: Instant) {
        self.still_ticks = 0;
        if self.tracking_eligible && !self.tracking {
            self.tracking = true;
            self.sync_timer(now);
        }
    }

    /// A parent screen started transitioning towards active
    pub fn begin_transition(&mut self, now: Instant) {
        self.transition = true;
        self.sync_timer(now);
    }

    /// The parent screen transition finished
    pub fn end_transition(&mut self, now: Instant) {
        self.transition = false;
        self.sync_timer(now);
    }

    /// Screen went inactive: stop every timer until it comes back
    pub fn suspend(&mut self, now: Instant) {
        self.transition = false;
        self.tracking = false;
        self.sync_timer(now);
    }

    /// Report whether the tick just executed observed movement
    pub fn report_motion(&mut self, moved: bool, now: Instant) {
        if moved {
            self.still_ticks = 0;
            return;
        }
        if self.tracking {
            self.still_ticks += 1;
            if self.still_ticks >= self.settle_ticks {
                log::debug!("Widget settled after {} still ticks", self.still_ticks);
                self.tracking = false;
                self.sync_timer(now);
            }
        }
    }

    fn sync_timer(&mut self, now: Instant) {
        let wanted = self.transition || (self.tracking_eligible && self.tracking);
        if wanted {
            self.timer.start(now);
            if self.guard.is_none() {
                self.guard = Some(self.pump.hold());
            }
        } else {
            self.timer.cancel();
            self.guard = None;
        }
    }

    /// Take the work for this tick
    pub fn poll(&mut self, now: Instant) -> UpdateState {
        let mut state = std::mem::take(&mut self.pending);
        if self.deferred_full {
            self.deferred_full = false;
            state = state.merge(UpdateState::FullRefresh);
        }
        if self.timer.poll(now) {
            state = state.merge(UpdateState::PositionOnly);
        }
        state
    }

    /// The tick was skipped by visibility gating. Full refreshes are kept for
    /// when the widget becomes visible again; position updates are dropped.
    pub fn defer(&mut self, state: UpdateState) {
        if state == UpdateState::FullRefresh {
            self.deferred_full = true;
        }
    }

    /// Drop every pending request and timer (detach)
    pub fn reset(&mut self) {
        self.pending = UpdateState::Idle;
        self.deferred_full = false;
        self.tracking_eligible = false;
        self.tracking = false;
        self.transition = false;
        self.timer.cancel();
        self.guard = None;
    }
}
