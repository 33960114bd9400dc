//! # lock_bench
//! Measures how much throughput a mutual-exclusion primitive costs when a
//! fixed number of pinned threads hammer the same critical section.
//!
//! ## Layout
//! - `engine`: work simulation, lock strategies, phase runner, barrier, orchestrator.
//! - `platform`: best-effort CPU affinity.
//! - `utils`: configuration, errors, CSV report writer.

pub mod engine;
pub mod platform;
pub mod utils;

pub use engine::{
    lock::{LockKind, LockStrategy, MonitorLock, ReentrantMutexLock},
    orchestrator::{execute, RunResult},
    run_benchmark,
    work::{CriticalWork, WorkSimulator},
};
pub use platform::affinity::{AffinityBinder, AffinityError, CoreAffinityBinder, NoAffinity};
pub use utils::{
    config::BenchmarkConfig,
    error::{BenchError, Result},
};
