//! Benchmark engine: work simulation, locks, phases, rendezvous, orchestration.

pub mod barrier;
pub mod lock;
pub mod orchestrator;
pub mod phase;
pub mod work;

use crate::platform::affinity::AffinityBinder;
use crate::utils::{config::BenchmarkConfig, error::Result};
use lock::{LockKind, MonitorLock, ReentrantMutexLock};
use orchestrator::{RunResult, execute};
use work::WorkSimulator;

/// Picks the lock strategy from `config.lock_kind` once and runs the
/// benchmark with the spin-wait work simulator.
pub fn run_benchmark<F>(
    config: &BenchmarkConfig,
    binder: &dyn AffinityBinder,
    on_result: F,
) -> Result<Vec<RunResult>>
where
    F: FnMut(&RunResult) -> Result<()>,
{
    let work = WorkSimulator::new(config.max_work_nanos);
    match config.lock_kind {
        LockKind::Reentrant => execute::<ReentrantMutexLock, _, _>(config, binder, &work, on_result),
        LockKind::Monitor => execute::<MonitorLock, _, _>(config, binder, &work, on_result),
    }
}
