//! FROST Core - GPU-agnostic frosted-glass logic
//!
//! This crate provides:
//! - Value types and widget configuration
//! - The host contract (widget tree, notifications) and an in-process hub
//! - Ancestor classification, bindings and change throttling
//! - Update scheduling, render-target size policy and blur kernel math
//! - A CPU reference of the composite shading used by tests

pub mod binding;
pub mod config;
pub mod geometry;
pub mod host;
pub mod kernel;
pub mod mock;
pub mod notify;
pub mod policy;
pub mod scheduler;
pub mod shading;
pub mod throttle;
pub mod types;

pub use binding::{AncestorBinding, BindingSet};
pub use config::{ConfigError, GlassConfig, PerformanceConfig};
pub use geometry::{AncestorChain, FrameState, GeometryTracker, Visibility};
pub use host::{AncestorKind, Capabilities, NodeId, Property, WidgetTree};
pub use mock::MockTree;
pub use notify::{Change, ChangeListener, NotificationHub, NotificationProvider, PropertyValue, Subscription};
pub use policy::TargetSize;
pub use scheduler::{IntervalTimer, PumpGuard, RedrawPump, Trigger, UpdateScheduler, UpdateState};
pub use throttle::ChangeThrottle;
pub use types::{Color, CornerRadii, Point, Rect, Size};
