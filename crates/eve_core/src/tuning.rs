//! Global tuning values and the control loop that adapts entropy to tick
//! duration.
//!
//! Tuning is owned by the driver and handed explicitly to the functions that
//! consume it; nothing in the core reads process-wide state.

use crate::config::TuningConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// Scales how many roots a freshly generated net may have.
    pub computational_difficulty: i64,
    /// Scales the operand range of freshly generated computations.
    pub global_entropy: i64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from(&TuningConfig::default())
    }
}

impl From<&TuningConfig> for Tuning {
    fn from(config: &TuningConfig) -> Self {
        Self {
            computational_difficulty: config.computational_difficulty,
            global_entropy: config.global_entropy,
        }
    }
}

/// Nudges entropy after each tick so the tick time tracks a target.
///
/// Slow ticks (more than half the target over) lower entropy by a step
/// proportional to the overshoot in hundreds of milliseconds, falling back to
/// a single step when that would breach the floor. Ticks off target in the
/// other direction raise it by one.
#[derive(Debug, Clone)]
pub struct TuningController {
    tuning: Tuning,
    time_to_expand: Duration,
    min_entropy: i64,
}

impl TuningController {
    pub fn new(config: &TuningConfig) -> Self {
        Self {
            tuning: Tuning::from(config),
            time_to_expand: Duration::from_millis(config.time_to_expand_ms),
            min_entropy: config.min_entropy,
        }
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning
    }

    /// Feeds one tick's wall time into the controller and returns the
    /// adjusted tuning.
    pub fn observe(&mut self, elapsed: Duration) -> Tuning {
        let target = self.time_to_expand.as_millis() as i64;
        let half = target / 2;
        let diff = elapsed.as_millis() as i64 - target;
        let entropy = self.tuning.global_entropy;

        let adjusted = if diff > half {
            let step = (diff / 100).abs();
            if entropy - step >= self.min_entropy {
                entropy - step
            } else if entropy - 1 >= self.min_entropy {
                entropy - 1
            } else {
                entropy
            }
        } else if diff.abs() > half {
            entropy + 1
        } else {
            entropy
        };

        if adjusted != entropy {
            tracing::debug!(
                from = entropy,
                to = adjusted,
                elapsed_ms = elapsed.as_millis() as u64,
                "Global entropy adjusted"
            );
        }
        self.tuning.global_entropy = adjusted;
        self.tuning
    }
}
