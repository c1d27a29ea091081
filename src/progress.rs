//! Progress reporting and cooperative cancellation for render calls.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Capability a target calls into while rendering.
///
/// `report` may be invoked concurrently from worker threads; observers must
/// merge reports into a single monotonically non-decreasing fraction.
/// Cancellation is cooperative: targets poll `cancelled` at least once per
/// scan-line or frame and return promptly when it is set.
pub trait ProgressObserver: Send + Sync {
    /// Report fractional completion in `[0, 1]`.
    fn report(&self, fraction: f64);

    /// Poll the cancellation flag.
    fn cancelled(&self) -> bool;
}

/// Concrete observer carrying a job label, a monotonic fraction and a
/// cancellation flag settable by an external controller.
#[derive(Debug)]
pub struct RenderProgress {
    label: String,
    // IEEE-754 bit patterns of non-negative finite f64 order like the values
    // themselves, so fetch_max on the bits gives a lock-free monotonic merge.
    fraction_bits: AtomicU64,
    cancel: AtomicBool,
}

impl RenderProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fraction_bits: AtomicU64::new(0),
            cancel: AtomicBool::new(false),
        }
    }

    /// Human-readable description of the work being observed.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Highest fraction reported so far.
    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.fraction_bits.load(Ordering::Relaxed))
    }

    /// Request cooperative cancellation of the observed render.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl ProgressObserver for RenderProgress {
    fn report(&self, fraction: f64) {
        let clamped = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            return;
        };
        let prev = self
            .fraction_bits
            .fetch_max(clamped.to_bits(), Ordering::Relaxed);
        if clamped.to_bits() > prev {
            tracing::trace!(label = %self.label, fraction = clamped, "progress");
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_merge_is_monotonic() {
        let p = RenderProgress::new("job");
        p.report(0.25);
        p.report(0.75);
        p.report(0.5); // late worker report must not regress the fraction
        assert_eq!(p.fraction(), 0.75);
    }

    #[test]
    fn fraction_is_clamped_to_unit_interval() {
        let p = RenderProgress::new("job");
        p.report(3.0);
        assert_eq!(p.fraction(), 1.0);
        p.report(f64::NAN);
        assert_eq!(p.fraction(), 1.0);

        let q = RenderProgress::new("job");
        q.report(-1.0);
        assert_eq!(q.fraction(), 0.0);
    }

    #[test]
    fn cancellation_flag_is_pollable() {
        let p = RenderProgress::new("job");
        assert!(!p.cancelled());
        p.cancel();
        assert!(p.cancelled());
    }

    #[test]
    fn concurrent_reports_never_regress() {
        let p = std::sync::Arc::new(RenderProgress::new("job"));
        let mut handles = Vec::new();
        for t in 0..4 {
            let p = p.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    p.report(f64::from(t * 100 + i) / 400.0);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(p.fraction(), 399.0 / 400.0);
    }
}
