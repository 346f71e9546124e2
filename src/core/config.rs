//! # Program configuration.
//!
//! Provides [`ProgramConfig`], centralized settings for one behavioral program.
//!
//! ## Sentinel values
//! - `max_steps = 0` → unlimited internal steps per run
//! - `snapshot_queue_capacity = 0` → clamped to 1

use crate::policies::SelectionStrategy;

/// Configuration for a behavioral program.
///
/// ## Field semantics
/// - `strategy`: how the winner of each internal step is chosen
/// - `max_steps`: upper bound on strategy-selected steps per `trigger()` run (`0` = unlimited)
/// - `snapshot_queue_capacity`: default per-subscriber queue size (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct ProgramConfig {
    /// Selection strategy for internal steps.
    pub strategy: SelectionStrategy,

    /// Maximum number of strategy-selected steps in one run.
    ///
    /// - `0` = unlimited (a program with a request that is never blocked loops forever)
    /// - `n > 0` = the run stops after `n` steps and publishes `StepLimitExceeded`
    pub max_steps: usize,

    /// Default queue capacity for snapshot subscribers.
    ///
    /// Subscribers returning a non-zero [`queue_capacity`](crate::Subscribe::queue_capacity)
    /// override it.
    pub snapshot_queue_capacity: usize,
}

impl ProgramConfig {
    /// Returns the step limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` steps per run
    #[inline]
    pub fn step_limit(&self) -> Option<usize> {
        if self.max_steps == 0 {
            None
        } else {
            Some(self.max_steps)
        }
    }

    /// Returns the snapshot queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn snapshot_capacity_clamped(&self) -> usize {
        self.snapshot_queue_capacity.max(1)
    }

    /// Same configuration with another strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for ProgramConfig {
    /// Default configuration:
    ///
    /// - `strategy = SelectionStrategy::Priority` (deterministic)
    /// - `max_steps = 0` (unlimited)
    /// - `snapshot_queue_capacity = 1024`
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            max_steps: 0,
            snapshot_queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_options() {
        let cfg = ProgramConfig::default();
        assert_eq!(cfg.step_limit(), None);
        assert_eq!(cfg.snapshot_capacity_clamped(), 1024);

        let cfg = ProgramConfig {
            max_steps: 5,
            snapshot_queue_capacity: 0,
            ..ProgramConfig::default()
        };
        assert_eq!(cfg.step_limit(), Some(5));
        assert_eq!(cfg.snapshot_capacity_clamped(), 1);
    }
}
