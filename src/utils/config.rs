//! Benchmark configuration.
//!
//! Worker count and lock kind come from the command line; everything else
//! defaults to the fixed constants of the benchmark and is only overridden by
//! tests or explicit tuning flags.

use std::time::Duration;

use crate::engine::lock::LockKind;
use crate::utils::error::{BenchError, Result};

/// Measured iterations per worker per run.
pub const ITERATIONS: u64 = 10_000_000;
/// Warmup iterations per worker per run (not timed).
pub const WARMUP_ITERATIONS: u64 = 1_000;
/// Runs per benchmark invocation.
pub const NUM_RUNS: usize = 5;
/// Upper bound (exclusive) of the simulated critical-section work.
pub const MAX_WORK_NANOS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub num_workers: usize,
    pub lock_kind: LockKind,
    pub iterations: u64,
    pub warmup_iterations: u64,
    pub num_runs: usize,
    pub max_work_nanos: u64,
    /// `None` waits at each rendezvous forever.
    pub barrier_timeout: Option<Duration>,
}

impl BenchmarkConfig {
    pub fn new(num_workers: usize, lock_kind: LockKind) -> Self {
        Self {
            num_workers,
            lock_kind,
            iterations: ITERATIONS,
            warmup_iterations: WARMUP_ITERATIONS,
            num_runs: NUM_RUNS,
            max_work_nanos: MAX_WORK_NANOS,
            barrier_timeout: None,
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_warmup_iterations(mut self, warmup_iterations: u64) -> Self {
        self.warmup_iterations = warmup_iterations;
        self
    }

    pub fn with_num_runs(mut self, num_runs: usize) -> Self {
        self.num_runs = num_runs;
        self
    }

    pub fn with_max_work_nanos(mut self, max_work_nanos: u64) -> Self {
        self.max_work_nanos = max_work_nanos;
        self
    }

    pub fn with_barrier_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.barrier_timeout = timeout;
        self
    }

    /// Total increments expected at the end of a measured phase.
    pub fn total_ops(&self) -> u64 {
        self.iterations.saturating_mul(self.num_workers as u64)
    }

    /// Rejects configurations that cannot produce a measurement.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(BenchError::Config("num_workers must be > 0".into()));
        }
        if self.num_runs == 0 {
            return Err(BenchError::Config("num_runs must be > 0".into()));
        }
        if self.iterations == 0 {
            return Err(BenchError::Config("iterations must be > 0".into()));
        }
        if self.iterations.checked_mul(self.num_workers as u64).is_none() {
            return Err(BenchError::Config(format!(
                "iterations ({}) x num_workers ({}) overflows the shared counter",
                self.iterations, self.num_workers
            )));
        }
        if self.barrier_timeout == Some(Duration::ZERO) {
            return Err(BenchError::Config("barrier timeout must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let cfg = BenchmarkConfig::new(4, LockKind::Reentrant);
        assert_eq!(cfg.iterations, 10_000_000);
        assert_eq!(cfg.warmup_iterations, 1_000);
        assert_eq!(cfg.num_runs, 5);
        assert_eq!(cfg.max_work_nanos, 100);
        assert_eq!(cfg.barrier_timeout, None);
        assert_eq!(cfg.total_ops(), 40_000_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cfg = BenchmarkConfig::new(0, LockKind::Monitor);
        assert!(matches!(cfg.validate(), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_zero_runs_and_iterations_rejected() {
        let cfg = BenchmarkConfig::new(2, LockKind::Monitor).with_num_runs(0);
        assert!(matches!(cfg.validate(), Err(BenchError::Config(_))));

        let cfg = BenchmarkConfig::new(2, LockKind::Monitor).with_iterations(0);
        assert!(matches!(cfg.validate(), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_zero_warmup_is_allowed() {
        let cfg = BenchmarkConfig::new(2, LockKind::Reentrant).with_warmup_iterations(0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_barrier_timeout_rejected() {
        let cfg = BenchmarkConfig::new(2, LockKind::Reentrant)
            .with_barrier_timeout(Some(Duration::ZERO));
        assert!(matches!(cfg.validate(), Err(BenchError::Config(_))));
    }
}
