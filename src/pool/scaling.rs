//! Scale-out policy.
//!
//! Compares the pool-wide average load against a threshold and emits a
//! grow/hold decision. Deliberately threshold-only: no cooldown window, no
//! scale-down, no upper bound on pool size. Each admission that leaves the
//! average above the threshold grows the pool by exactly one worker.

use serde::Serialize;

use crate::core::config::DEFAULT_SCALE_THRESHOLD;

/// Outcome of a scale evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScaleDecision {
    /// Append one empty worker to the pool.
    Grow,
    /// Leave the pool unchanged.
    Hold,
}

/// Threshold policy over the pool-wide average load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalePolicy {
    threshold: f64,
}

impl ScalePolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Grow when the average load strictly exceeds the threshold.
    pub fn evaluate(&self, average_load: f64) -> ScaleDecision {
        if average_load > self.threshold {
            ScaleDecision::Grow
        } else {
            ScaleDecision::Hold
        }
    }
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_strictly_above_threshold() {
        let policy = ScalePolicy::new(50.0);
        assert_eq!(policy.evaluate(50.1), ScaleDecision::Grow);
        assert_eq!(policy.evaluate(95.0), ScaleDecision::Grow);
    }

    #[test]
    fn holds_at_or_below_threshold() {
        let policy = ScalePolicy::new(50.0);
        assert_eq!(policy.evaluate(50.0), ScaleDecision::Hold);
        assert_eq!(policy.evaluate(0.0), ScaleDecision::Hold);
        assert_eq!(policy.evaluate(42.5), ScaleDecision::Hold);
    }

    #[test]
    fn default_threshold_is_fifty() {
        assert_eq!(ScalePolicy::default().threshold(), 50.0);
    }
}
