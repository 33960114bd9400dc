//! Command-line arguments.
//!
//! Two positionals mirror the classic invocation (`<num_threads> <lock_type>`);
//! the remaining flags default to the benchmark constants.

use std::time::Duration;

use clap::Parser;

use lock_bench::{
    BenchmarkConfig, LockKind,
    utils::config::{ITERATIONS, MAX_WORK_NANOS, NUM_RUNS, WARMUP_ITERATIONS},
};

pub const USAGE: &str = "usage: lock_bench <num_threads> <lock_type>\n\
lock_type: 1 (or reentrant) for ReentrantMutex, 2 (or monitor) for monitor lock";

/// Lock contention throughput benchmark
#[derive(Parser, Debug, Clone)]
#[command(name = "lock_bench")]
#[command(version, about, long_about = None)]
#[command(after_help = USAGE)]
pub struct CliArgs {
    /// Number of worker threads (must be > 0)
    #[arg(value_name = "NUM_THREADS")]
    pub num_threads: usize,

    /// Lock type: 1|reentrant or 2|monitor
    #[arg(value_name = "LOCK_TYPE")]
    pub lock_type: LockKind,

    /// Measured iterations per worker per run
    #[arg(long, default_value_t = ITERATIONS)]
    pub iterations: u64,

    /// Warmup iterations per worker per run
    #[arg(long, default_value_t = WARMUP_ITERATIONS)]
    pub warmup: u64,

    /// Number of runs
    #[arg(long, default_value_t = NUM_RUNS)]
    pub runs: usize,

    /// Upper bound (exclusive) of simulated work inside the lock, in ns
    #[arg(long = "max-work-ns", default_value_t = MAX_WORK_NANOS)]
    pub max_work_ns: u64,

    /// Abort a run if a barrier rendezvous takes longer than this (default: wait forever)
    #[arg(long = "barrier-timeout-secs")]
    pub barrier_timeout_secs: Option<u64>,
}

impl CliArgs {
    pub fn into_config(self) -> BenchmarkConfig {
        BenchmarkConfig::new(self.num_threads, self.lock_type)
            .with_iterations(self.iterations)
            .with_warmup_iterations(self.warmup)
            .with_num_runs(self.runs)
            .with_max_work_nanos(self.max_work_ns)
            .with_barrier_timeout(self.barrier_timeout_secs.map(Duration::from_secs))
    }
}
