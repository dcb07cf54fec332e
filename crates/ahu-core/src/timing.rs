//! Wall-clock caps and simple timers.
//!
//! The saturation iterator and the parameter search are bounded loops; a
//! [`Deadline`] adds an optional wall-clock budget on top of their iteration
//! caps so a single design point cannot stall a sweep.

use std::time::{Duration, Instant};

/// Optional wall-clock budget started at construction.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    /// A deadline expiring `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    /// Build from an optional budget in seconds (`None` means unbounded).
    pub fn from_secs(budget_s: Option<f64>) -> Self {
        match budget_s {
            Some(s) if s.is_finite() && s >= 0.0 => Self::after(Duration::from_secs_f64(s)),
            _ => Self::unbounded(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() > budget,
            None => false,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_deadline_never_expires() {
        let d = Deadline::unbounded();
        assert!(!d.is_expired());
        assert!(!Deadline::from_secs(None).is_expired());
    }

    #[test]
    fn zero_budget_expires() {
        let d = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(d.is_expired());
    }

    #[test]
    fn negative_budget_is_treated_as_unbounded() {
        assert!(!Deadline::from_secs(Some(-1.0)).is_expired());
    }

    #[test]
    fn timer_reports_elapsed() {
        let t = Timer::start("solve");
        assert_eq!(t.label(), "solve");
        assert!(t.stop() >= 0.0);
    }
}
