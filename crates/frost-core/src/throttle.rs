//! Debounce for change-notification storms
//!
//! A notification is admitted only when the throttle window has elapsed since
//! the last admitted one and its value, rounded, differs from the last
//! admitted value of the same shape. Scalars round to 3 decimals, vectors to 2.
//! The time window is consumed as soon as it opens, even if the value check
//! then rejects the notification.

use std::time::{Duration, Instant};

use crate::notify::PropertyValue;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[derive(Debug, Clone)]
pub struct ChangeThrottle {
    window: Duration,
    last_admit: Option<Instant>,
    last_scalar: f64,
    last_vector: [f64; 2],
}

impl ChangeThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admit: None,
            last_scalar: 0.0,
            last_vector: [0.0, 0.0],
        }
    }

    fn window_open(&mut self, now: Instant) -> bool {
        let open = match self.last_admit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if open {
            self.last_admit = Some(now);
        }
        open
    }

    /// Decide whether a notification should trigger an update
    pub fn admit(&mut self, value: &PropertyValue, now: Instant) -> bool {
        if !self.window_open(now) {
            return false;
        }
        match *value {
            PropertyValue::Scalar(v) => {
                let rounded = round_to(v, 3);
                if rounded != self.last_scalar {
                    self.last_scalar = rounded;
                    true
                } else {
                    false
                }
            }
            PropertyValue::Vector([x, y]) => {
                let rounded = [round_to(x, 2), round_to(y, 2)];
                if rounded != self.last_vector {
                    self.last_vector = rounded;
                    true
                } else {
                    false
                }
            }
            PropertyValue::Event => true,
        }
    }
}

impl Default for ChangeThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}
