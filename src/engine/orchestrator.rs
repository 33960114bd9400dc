//! Benchmark orchestrator.
//!
//! For every run: build a fresh `RunContext`, spawn one scoped thread per
//! worker, rendezvous twice (after warmup and after measurement), and turn the
//! elapsed time seen by worker 0 into a `RunResult`.
//!
//! Worker protocol:
//! 1. pin to core (advisory)
//! 2. warmup phase
//! 3. barrier; worker 0 starts the clock
//! 4. measurement phase
//! 5. barrier; worker 0 stops the clock
//!
//! A panicking worker breaks the barrier so its peers return instead of
//! waiting forever for a rendezvous it will never reach.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::engine::{
    barrier::{BarrierError, RunBarrier},
    lock::LockStrategy,
    phase::{SharedCounter, run_phase},
    work::CriticalWork,
};
use crate::platform::affinity::{AffinityBinder, bind_or_warn};
use crate::utils::{
    config::BenchmarkConfig,
    error::{BenchError, Result},
    export::six_decimals,
};

/// One CSV row: the outcome of a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub run: usize,
    pub threads: usize,
    pub lock_type: &'static str,
    #[serde(serialize_with = "six_decimals")]
    pub elapsed_seconds: f64,
    #[serde(serialize_with = "six_decimals")]
    pub ops_per_second: f64,
    pub final_counter: u64,
}

/// State shared by the workers of a single run; dropped before the next run.
struct RunContext<L> {
    run: usize,
    lock: Arc<L>,
    // Warmup increments go to their own counter so `counter` holds exactly the
    // measured operations.
    warmup_counter: SharedCounter,
    counter: SharedCounter,
    barrier: RunBarrier,
}

impl<L: LockStrategy> RunContext<L> {
    fn new(run: usize, lock: Arc<L>, config: &BenchmarkConfig) -> Self {
        Self {
            run,
            lock,
            warmup_counter: SharedCounter::new(),
            counter: SharedCounter::new(),
            barrier: RunBarrier::new(config.num_workers, config.barrier_timeout),
        }
    }
}

#[derive(Debug)]
enum WorkerOutcome {
    /// Finished both phases; worker 0 carries the measured window.
    Finished(Option<Duration>),
    Barrier(BarrierError),
    Faulted(String),
}

/// Runs `config.num_runs` runs with lock strategy `L`, handing each result to
/// `on_result` as soon as it is available.
///
/// A run that faults or times out produces no result; the remaining runs
/// still execute and the first such failure is returned at the end.
/// Configuration and output errors stop immediately.
pub fn execute<L, W, F>(
    config: &BenchmarkConfig,
    binder: &dyn AffinityBinder,
    work: &W,
    mut on_result: F,
) -> Result<Vec<RunResult>>
where
    L: LockStrategy,
    W: CriticalWork,
    F: FnMut(&RunResult) -> Result<()>,
{
    config.validate()?;
    if config.lock_kind != L::KIND {
        return Err(BenchError::Config(format!(
            "configured lock type '{}' does not match strategy '{}'",
            config.lock_kind,
            L::label()
        )));
    }

    info!(
        "[Benchmark] threads={} lock={} iterations={} warmup={} runs={} max_work_ns={}",
        config.num_workers,
        L::label(),
        config.iterations,
        config.warmup_iterations,
        config.num_runs,
        config.max_work_nanos
    );

    let mut results = Vec::with_capacity(config.num_runs);
    let mut previous_lock: Option<Arc<L>> = None;
    let mut first_failure: Option<BenchError> = None;

    for run in 1..=config.num_runs {
        let lock = L::for_next_run(previous_lock.as_ref());
        previous_lock = Some(Arc::clone(&lock));

        let ctx = RunContext::new(run, lock, config);
        match run_once(&ctx, config, binder, work) {
            Ok(result) => {
                on_result(&result)?;
                results.push(result);
            }
            // A failed run only invalidates its own numbers.
            Err(e) if e.is_run_failure() => {
                error!("[Run {}] discarded: {}", run, e);
                first_failure.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }

    match first_failure {
        Some(e) => {
            warn!(
                "[Benchmark] {} of {} runs failed",
                config.num_runs - results.len(),
                config.num_runs
            );
            Err(e)
        }
        None => Ok(results),
    }
}

fn run_once<L, W>(
    ctx: &RunContext<L>,
    config: &BenchmarkConfig,
    binder: &dyn AffinityBinder,
    work: &W,
) -> Result<RunResult>
where
    L: LockStrategy,
    W: CriticalWork,
{
    debug!("[Run {}] spawning {} workers", ctx.run, config.num_workers);

    let outcomes = thread::scope(|s| -> Result<Vec<WorkerOutcome>> {
        let mut handles = Vec::with_capacity(config.num_workers);
        for index in 0..config.num_workers {
            let spawned = thread::Builder::new()
                .name(format!("lock-worker-{}", index))
                .spawn_scoped(s, move || run_worker(ctx, config, binder, work, index));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Already-running workers would wait for peers that never come.
                    ctx.barrier.break_barrier();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(BenchError::Spawn(e));
                }
            }
        }

        Ok(handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|payload| WorkerOutcome::Faulted(panic_message(payload.as_ref())))
            })
            .collect())
    })?;

    let elapsed = collect_elapsed(ctx.run, outcomes, config.barrier_timeout)?;

    let warmed = ctx.warmup_counter.get();
    let expected_warmup = config.warmup_iterations.saturating_mul(config.num_workers as u64);
    if warmed != expected_warmup {
        warn!(
            "[Run {}] warmup counter {} != expected {}",
            ctx.run, warmed, expected_warmup
        );
    }

    let final_counter = ctx.counter.get();
    let expected = config.total_ops();
    if final_counter != expected {
        error!(
            "[Run {}] lost updates: final_counter={} expected={}",
            ctx.run, final_counter, expected
        );
    }

    let elapsed_seconds = elapsed.max(Duration::from_nanos(1)).as_secs_f64();
    let ops_per_second = expected as f64 / elapsed_seconds;

    info!(
        "[Run {}] elapsed={:.6}s ops/s={:.2} counter={}",
        ctx.run, elapsed_seconds, ops_per_second, final_counter
    );

    Ok(RunResult {
        run: ctx.run,
        threads: config.num_workers,
        lock_type: L::label(),
        elapsed_seconds,
        ops_per_second,
        final_counter,
    })
}

fn run_worker<L, W>(
    ctx: &RunContext<L>,
    config: &BenchmarkConfig,
    binder: &dyn AffinityBinder,
    work: &W,
    index: usize,
) -> WorkerOutcome
where
    L: LockStrategy,
    W: CriticalWork,
{
    let lock = ctx.lock.as_ref();

    let body = panic::catch_unwind(AssertUnwindSafe(
        || -> std::result::Result<Option<Duration>, BarrierError> {
            bind_or_warn(binder, index);
            let mut rng = rand::rng();

            run_phase(lock, &ctx.warmup_counter, work, &mut rng, config.warmup_iterations);
            ctx.barrier.wait()?;

            let start = (index == 0).then(Instant::now);
            run_phase(lock, &ctx.counter, work, &mut rng, config.iterations);
            ctx.barrier.wait()?;

            Ok(start.map(|s| s.elapsed()))
        },
    ));

    match body {
        Ok(Ok(elapsed)) => WorkerOutcome::Finished(elapsed),
        Ok(Err(e)) => {
            debug!("[Run {}] worker {} left barrier: {}", ctx.run, index, e);
            WorkerOutcome::Barrier(e)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                "[Run {}] worker {} faulted: {}",
                ctx.run, index, message
            );
            ctx.barrier.break_barrier();
            WorkerOutcome::Faulted(message)
        }
    }
}

/// Reduces worker outcomes to worker 0's measured window, or the first error.
fn collect_elapsed(
    run: usize,
    outcomes: Vec<WorkerOutcome>,
    timeout: Option<Duration>,
) -> Result<Duration> {
    let mut elapsed = None;
    let mut barrier_error = None;

    for (worker, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            WorkerOutcome::Finished(Some(d)) => elapsed = Some(d),
            WorkerOutcome::Finished(None) => {}
            WorkerOutcome::Faulted(message) => {
                return Err(BenchError::WorkerFault {
                    run,
                    worker,
                    message,
                });
            }
            WorkerOutcome::Barrier(e) => {
                barrier_error.get_or_insert(e);
            }
        }
    }

    match (barrier_error, elapsed) {
        (Some(BarrierError::TimedOut(t)), _) => Err(BenchError::BarrierTimeout { run, timeout: t }),
        (Some(BarrierError::Broken), _) => match timeout {
            Some(t) => Err(BenchError::BarrierTimeout { run, timeout: t }),
            None => Err(BenchError::Barrier {
                run,
                source: BarrierError::Broken,
            }),
        },
        (None, Some(d)) => Ok(d),
        (None, None) => Err(BenchError::WorkerFault {
            run,
            worker: 0,
            message: "worker 0 finished without recording a measurement window".into(),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
